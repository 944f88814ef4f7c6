use crate::*;
use std::fmt::{Display, Formatter, Write};

struct DisplayTypeJava<'a>(&'a Type);
impl<'a> Display for DisplayTypeJava<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0.basic_sig.display_java(), f)?;
        for _ in 0..self.0.array_dim {
            f.write_str("[]")?;
        }
        Ok(())
    }
}
impl Type {
    /// Displays this object in Java syntax.
    pub fn display_java(&self) -> impl Display + '_ {
        DisplayTypeJava(self)
    }
}

struct DisplayBasicTypeJava<'a>(&'a BasicType);
impl<'a> Display for DisplayBasicTypeJava<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            BasicType::Void => f.write_str("void"),
            BasicType::Boolean => f.write_str("boolean"),
            BasicType::Byte => f.write_str("byte"),
            BasicType::Char => f.write_str("char"),
            BasicType::Short => f.write_str("short"),
            BasicType::Int => f.write_str("int"),
            BasicType::Long => f.write_str("long"),
            BasicType::Float => f.write_str("float"),
            BasicType::Double => f.write_str("double"),
            BasicType::Class(class) => Display::fmt(&class.display_java(), f),
        }
    }
}
impl BasicType {
    /// Displays this object in Java syntax.
    pub fn display_java(&self) -> impl Display + '_ {
        DisplayBasicTypeJava(self)
    }
}

struct DisplayClassNameJava<'a>(&'a ClassName);
impl<'a> Display for DisplayClassNameJava<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for pkg in &self.0.package {
            f.write_str(pkg)?;
            f.write_char('.')?;
        }
        f.write_str(&self.0.name)
    }
}
impl ClassName {
    /// Displays this object in dotted Java syntax.
    pub fn display_java(&self) -> impl Display + '_ {
        DisplayClassNameJava(self)
    }
}

struct DisplayMethodSigJava<'a>(&'a MethodSig);
impl<'a> Display for DisplayMethodSigJava<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0.ret_ty.display_java(), f)?;
        f.write_str(" (")?;
        let mut is_first = true;
        for param in &self.0.params {
            if !is_first {
                f.write_str(", ")?;
            }
            Display::fmt(&param.display_java(), f)?;
            is_first = false;
        }
        f.write_char(')')
    }
}
impl MethodSig {
    /// Displays this object in Java syntax.
    pub fn display_java(&self) -> impl Display + '_ {
        DisplayMethodSigJava(self)
    }
}
