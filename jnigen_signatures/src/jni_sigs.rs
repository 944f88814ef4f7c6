use crate::*;
use pest::error::Error;
use pest_consume::{match_nodes, Parser};
use std::fmt::{Display, Formatter, Write};

#[derive(Parser)]
#[grammar = "jni_signature.pest"]
struct JniParser;
type Result<T> = std::result::Result<T, Error<Rule>>;
type Node<'i> = pest_consume::Node<'i, Rule, ()>;

#[pest_consume::parser]
impl JniParser {
    fn ident(input: Node) -> Result<String> {
        Ok(input.as_str().to_owned())
    }

    fn path(input: Node) -> Result<ClassName> {
        Ok(match_nodes!(input.children();
            [ident(names)..] => {
                let mut vec: Vec<_> = names.collect();
                let name = match vec.pop() {
                    Some(x) => x,
                    None => return Err(input.error("class name has no components")),
                };
                ClassName::new(vec, name)
            },
        ))
    }

    fn ty(input: Node) -> Result<Type> {
        Ok(match_nodes!(input.children();
            [ty_array_head(braces).., ty_prim(prim)] => {
                let ty = match prim {
                    "B" => Type::Byte,
                    "S" => Type::Short,
                    "I" => Type::Int,
                    "J" => Type::Long,
                    "F" => Type::Float,
                    "D" => Type::Double,
                    "Z" => Type::Boolean,
                    "C" => Type::Char,
                    _ => unreachable!(),
                };
                ty.array_dim(braces.count())
            },
            [ty_array_head(braces).., ty_class(class)] =>
                Type::new(BasicType::Class(class)).array_dim(braces.count()),
        ))
    }
    fn ty_prim(input: Node) -> Result<&str> {
        Ok(input.as_str())
    }
    fn ty_class(input: Node) -> Result<ClassName> {
        Ok(match_nodes!(input.children();
            [path(path)] => path,
        ))
    }
    fn ty_array_head(_input: Node) -> Result<()> {
        Ok(())
    }
    fn ty_void(_input: Node) -> Result<()> {
        Ok(())
    }

    fn sig_ret(input: Node) -> Result<Type> {
        Ok(match_nodes!(input.children();
            [ty(ty)] => ty,
            [ty_void(_)] => Type::Void,
        ))
    }
    fn sig(input: Node) -> Result<MethodSig> {
        Ok(match_nodes!(input.children();
            [ty(params).., sig_ret(ret_ty)] => {
                let params: Vec<_> = params.collect();
                MethodSig::new(ret_ty, params)
            },
        ))
    }

    fn full_ty(input: Node) -> Result<Type> {
        Ok(match_nodes!(input.children();
            [ty(ty), EOI(_)] => ty,
        ))
    }
    fn full_sig(input: Node) -> Result<MethodSig> {
        Ok(match_nodes!(input.children();
            [sig(sig), EOI(_)] => sig,
        ))
    }
    fn full_path(input: Node) -> Result<ClassName> {
        Ok(match_nodes!(input.children();
            [path(path), EOI(_)] => path,
        ))
    }
    fn EOI(_input: Node) -> Result<()> {
        Ok(())
    }
}

impl MethodSig {
    /// Parses a method signature from its JNI descriptor form.
    pub fn parse_jni(source: &str) -> Result<Self> {
        let inputs = JniParser::parse(Rule::full_sig, source)?;
        let input = inputs.single()?;
        JniParser::full_sig(input)
    }
}
impl Type {
    /// Parses a type from its JNI descriptor form.
    pub fn parse_jni(source: &str) -> Result<Self> {
        let inputs = JniParser::parse(Rule::full_ty, source)?;
        let input = inputs.single()?;
        JniParser::full_ty(input)
    }
}
impl ClassName {
    /// Parses a slash-separated class name.
    pub fn parse_jni(source: &str) -> Result<Self> {
        let inputs = JniParser::parse(Rule::full_path, source)?;
        let input = inputs.single()?;
        JniParser::full_path(input)
    }
}

struct DisplayMethodSigJni<'a>(&'a MethodSig);
impl<'a> Display for DisplayMethodSigJni<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_char('(')?;
        for param in &self.0.params {
            Display::fmt(&param.display_jni(), f)?;
        }
        f.write_char(')')?;
        Display::fmt(&self.0.ret_ty.display_jni(), f)?;
        Ok(())
    }
}
impl MethodSig {
    /// Displays this object in JNI descriptor syntax.
    pub fn display_jni(&self) -> impl Display + '_ {
        DisplayMethodSigJni(self)
    }
}

struct DisplayTypeJni<'a>(&'a Type);
impl<'a> Display for DisplayTypeJni<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for _ in 0..self.0.array_dim {
            f.write_char('[')?;
        }
        match &self.0.basic_sig {
            BasicType::Void => f.write_char('V'),
            BasicType::Boolean => f.write_char('Z'),
            BasicType::Byte => f.write_char('B'),
            BasicType::Char => f.write_char('C'),
            BasicType::Short => f.write_char('S'),
            BasicType::Int => f.write_char('I'),
            BasicType::Long => f.write_char('J'),
            BasicType::Float => f.write_char('F'),
            BasicType::Double => f.write_char('D'),
            BasicType::Class(class) => {
                f.write_char('L')?;
                Display::fmt(&class.display_jni(), f)?;
                f.write_char(';')
            }
        }
    }
}
impl Type {
    /// Displays this object in JNI descriptor syntax.
    pub fn display_jni(&self) -> impl Display + '_ {
        DisplayTypeJni(self)
    }
}

struct DisplayClassNameJni<'a>(&'a ClassName);
impl<'a> Display for DisplayClassNameJni<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for pkg in &self.0.package {
            f.write_str(pkg)?;
            f.write_char('/')?;
        }
        f.write_str(&self.0.name)
    }
}
impl ClassName {
    /// Displays this object in slash-separated JNI syntax.
    pub fn display_jni(&self) -> impl Display + '_ {
        DisplayClassNameJni(self)
    }
}
