//! Parser for declaration source files.
//!
//! This consumes the restricted Java subset the generator cares about: one
//! public class per file with its package, imports, fields and methods.
//! Method bodies are skipped as balanced-brace blocks. Javadoc tags
//! (`@jniclass`, `@field`, `@method`, `@param`) seed the metadata store, and
//! the 64-bit width comments (`int /*long*/` and friends) produce the
//! parallel 32/64-bit type views.

use crate::{
    errors::Error,
    meta::{self, MetaRef, SharedMetaData},
    model::{
        parsed::{ParsedClass, ParsedField, ParsedMethod, ParsedParameter},
        JniClass, Modifier,
    },
    Result,
};
use enumset::EnumSet;
use jnigen_signatures::{display_c_escaped, Type};
use pest::{iterators::Pair, Parser};
use std::{collections::HashSet, fmt::Write as _, path::Path, rc::Rc};

#[derive(pest_derive::Parser)]
#[grammar = "parse/java_decl.pest"]
struct DeclParser;

/// Parses one declaration source file into a [`ParsedClass`] wired to the
/// shared metadata store.
pub fn parse_source(path: &Path, source: &str, store: SharedMetaData) -> Result<Rc<ParsedClass>> {
    let mut pairs = DeclParser::parse(Rule::file, source)
        .map_err(|err| Error::parse(path, err.to_string()))?;
    let file = pairs
        .next()
        .ok_or_else(|| Error::parse(path, "empty parse result"))?;

    let mut package = String::new();
    let mut imports = Vec::new();
    let mut class_doc = None;
    let mut class_decl = None;
    for pair in file.into_inner() {
        match pair.as_rule() {
            Rule::package_decl => {
                package = first_inner(&pair, Rule::qname)
                    .map(|p| p.as_str().to_owned())
                    .unwrap_or_default();
            }
            Rule::import_decl => {
                if let Some(raw) = first_inner(&pair, Rule::import_path) {
                    imports.push(import_package(raw.as_str()));
                }
            }
            Rule::doc_comment => class_doc = Some(pair.as_str()),
            Rule::class_decl => class_decl = Some(pair),
            _ => {}
        }
    }
    let class_decl =
        class_decl.ok_or_else(|| Error::parse(path, "no class declaration found"))?;
    let class_offset = class_decl.as_span().start();

    let mut class_mods = EnumSet::empty();
    let mut simple_name = String::new();
    let mut superclass_name = None;
    let mut body = None;
    for pair in class_decl.into_inner() {
        match pair.as_rule() {
            Rule::modifier => class_mods |= keyword_modifiers(pair.as_str()),
            Rule::ident => simple_name = pair.as_str().to_owned(),
            Rule::extends_clause => {
                superclass_name =
                    first_inner(&pair, Rule::qname).map(|p| p.as_str().to_owned());
            }
            Rule::class_body => body = Some(pair),
            _ => {}
        }
    }
    let body = body.ok_or_else(|| Error::parse(path, "class has no body"))?;

    let fqn = if package.is_empty() {
        simple_name.clone()
    } else {
        format!("{package}.{simple_name}")
    };
    let class_meta = MetaRef::new(store.clone(), meta::class_key(&simple_name));
    if let Some(text) = class_doc.and_then(|doc| DocTags::parse(doc).class) {
        class_meta.seed(&text);
    }

    let class = ParsedClass::new(
        fqn,
        simple_name.clone(),
        package,
        imports,
        class_mods,
        path.to_owned(),
        class_offset,
        superclass_name,
        class_meta,
    );

    // Doc comment and declaration pairs, in source order.
    let mut members = Vec::new();
    for member in body.into_inner() {
        if member.as_rule() != Rule::member {
            continue;
        }
        let mut doc = None;
        for part in member.into_inner() {
            match part.as_rule() {
                Rule::doc_comment => doc = Some(part.as_str()),
                Rule::field_decl | Rule::method_decl => members.push((doc.take(), part)),
                _ => {}
            }
        }
    }

    // Overload mangling needs to know, up front, which native names repeat.
    let mut seen = HashSet::new();
    let mut repeated = HashSet::new();
    for (_, decl) in &members {
        if decl.as_rule() != Rule::method_decl {
            continue;
        }
        let head = MethodHead::split(decl.clone());
        if head.modifiers.contains(Modifier::Native) && !seen.insert(head.name.clone()) {
            repeated.insert(head.name);
        }
    }

    for (doc, decl) in members {
        match decl.as_rule() {
            Rule::field_decl => build_field(source, &class, &store, doc, decl),
            Rule::method_decl => build_method(source, &class, &store, doc, decl, &repeated),
            _ => {}
        }
    }
    Ok(class)
}

fn build_field(
    source: &str,
    class: &Rc<ParsedClass>,
    store: &SharedMetaData,
    doc: Option<&str>,
    decl: Pair<'_, Rule>,
) {
    let decl_offset = decl.as_span().start();
    let mut modifiers = EnumSet::empty();
    let mut ty = None;
    let mut declarators = Vec::new();
    for pair in decl.into_inner() {
        match pair.as_rule() {
            Rule::modifier => modifiers |= keyword_modifiers(pair.as_str()),
            Rule::ty => ty = Some(pair),
            Rule::declarator => declarators.push(pair),
            _ => {}
        }
    }
    let Some(ty) = ty else { return };
    let member_tag = doc.and_then(|doc| DocTags::parse(doc).member);

    for declarator in declarators {
        let mut name = None;
        let mut trailing_dims = 0;
        for pair in declarator.into_inner() {
            match pair.as_rule() {
                Rule::ident => name = Some(pair),
                Rule::array_suffix => trailing_dims += 1,
                _ => {}
            }
        }
        let Some(name) = name else { continue };
        let declared = spelled_type(class, &ty, trailing_dims);
        let decl_text = &source[ty.as_span().start()..name.as_span().start()];
        let (ty32, ty64) = narrow(&declared, decl_text);

        let field_name = name.as_str().to_owned();
        let key = meta::member_key(
            &class.simple_name(),
            &display_c_escaped(&field_name).to_string(),
        );
        let field_meta = MetaRef::new(store.clone(), key);
        if let Some(text) = &member_tag {
            field_meta.seed(text);
        }
        class.push_field(ParsedField::new(
            field_name,
            modifiers,
            ty32,
            ty64,
            decl_offset,
            field_meta,
        ));
    }
}

fn build_method(
    source: &str,
    class: &Rc<ParsedClass>,
    store: &SharedMetaData,
    doc: Option<&str>,
    decl: Pair<'_, Rule>,
    repeated: &HashSet<String>,
) {
    let decl_offset = decl.as_span().start();
    let head = MethodHead::split(decl);
    let (Some(ret_ty), Some(name_pair)) = (head.ret_ty, head.name_pair) else { return };

    let declared_ret = spelled_type(class, &ret_ty, 0);
    let ret_text = &source[ret_ty.as_span().start()..name_pair.as_span().start()];
    let (ret32, ret64) = narrow(&declared_ret, ret_text);

    let mut param_names = Vec::new();
    let mut param_types32 = Vec::new();
    let mut param_types64 = Vec::new();
    for param in &head.params {
        let mut ty = None;
        let mut name = None;
        let mut trailing_dims = 0;
        for pair in param.clone().into_inner() {
            match pair.as_rule() {
                Rule::ty => ty = Some(pair),
                Rule::ident => name = Some(pair),
                Rule::array_suffix => trailing_dims += 1,
                _ => {}
            }
        }
        let (Some(ty), Some(name)) = (ty, name) else { continue };
        let declared = spelled_type(class, &ty, trailing_dims);
        let decl_text = &source[ty.as_span().start()..name.as_span().start()];
        let (ty32, ty64) = narrow(&declared, decl_text);
        param_names.push(name.as_str().to_owned());
        param_types32.push(ty32);
        param_types64.push(ty64);
    }

    // Mirror of `model::function_name`, computed before attachment so the
    // metadata keys are known at construction time.
    let native = head.modifiers.contains(Modifier::Native);
    let function = if !native {
        head.name.clone()
    } else {
        let mut function = display_c_escaped(&head.name).to_string();
        if repeated.contains(&head.name) {
            function.push_str("__");
            for ty in &param_types32 {
                let descriptor = ty.display_jni().to_string();
                let _ = write!(function, "{}", display_c_escaped(&descriptor));
            }
        }
        function
    };

    let tags = doc.map(DocTags::parse).unwrap_or_default();
    let method_meta =
        MetaRef::new(store.clone(), meta::member_key(&class.simple_name(), &function));
    if let Some(text) = tags.member {
        method_meta.seed(&text);
    }

    let method = ParsedMethod::new(
        head.name,
        head.modifiers,
        ret32,
        ret64,
        param_types32,
        param_types64,
        decl_offset,
        method_meta,
    );
    method.attach(class);
    for (index, name) in param_names.into_iter().enumerate() {
        let key = meta::param_key(&class.simple_name(), &function, index);
        let param_meta = MetaRef::new(store.clone(), key);
        if let Some((_, text)) = tags.params.iter().find(|(tag_name, _)| *tag_name == name) {
            param_meta.seed(text);
        }
        let param = ParsedParameter::new(index, name, param_meta);
        param.attach(&method);
        method.push_param(param);
    }
    class.push_method(method);
}

/// The leading pieces of a method declaration, shared between the overload
/// pre-scan and the builder proper.
struct MethodHead<'i> {
    modifiers: EnumSet<Modifier>,
    ret_ty: Option<Pair<'i, Rule>>,
    name_pair: Option<Pair<'i, Rule>>,
    name: String,
    params: Vec<Pair<'i, Rule>>,
}

impl<'i> MethodHead<'i> {
    fn split(decl: Pair<'i, Rule>) -> Self {
        let mut head = MethodHead {
            modifiers: EnumSet::empty(),
            ret_ty: None,
            name_pair: None,
            name: String::new(),
            params: Vec::new(),
        };
        for pair in decl.into_inner() {
            match pair.as_rule() {
                Rule::modifier => head.modifiers |= keyword_modifiers(pair.as_str()),
                Rule::ty => head.ret_ty = Some(pair),
                Rule::ident => {
                    head.name = pair.as_str().to_owned();
                    head.name_pair = Some(pair);
                }
                Rule::param_list => {
                    head.params
                        .extend(pair.into_inner().filter(|p| p.as_rule() == Rule::param));
                }
                _ => {}
            }
        }
        head
    }
}

fn keyword_modifiers(keyword: &str) -> EnumSet<Modifier> {
    match Modifier::from_keyword(keyword) {
        Some(modifier) => EnumSet::only(modifier),
        None => EnumSet::empty(),
    }
}

fn first_inner<'i>(pair: &Pair<'i, Rule>, rule: Rule) -> Option<Pair<'i, Rule>> {
    pair.clone().into_inner().find(|p| p.as_rule() == rule)
}

/// The package a resolver should probe for an import: `a.b.*` and `a.b.C`
/// both contribute `a.b`.
fn import_package(raw: &str) -> String {
    if let Some(package) = raw.strip_suffix(".*") {
        return package.to_owned();
    }
    match raw.rsplit_once('.') {
        Some((package, _)) => package.to_owned(),
        None => raw.to_owned(),
    }
}

/// Resolves a `ty` pair (base name plus `[]` suffixes, with any extra
/// C-style suffixes after the declared name) against the class context.
fn spelled_type(class: &Rc<ParsedClass>, ty: &Pair<'_, Rule>, trailing_dims: usize) -> Type {
    let mut base = "";
    let mut dims = trailing_dims;
    for pair in ty.clone().into_inner() {
        match pair.as_rule() {
            Rule::qname => base = pair.as_str(),
            Rule::array_suffix => dims += 1,
            _ => {}
        }
    }
    class.resolver().resolve_type(base, dims)
}

/// Applies the width-comment convention to a declared type. The comment must
/// match one of the exact spellings below, inside the declaration's own text;
/// anything else leaves both views identical.
fn narrow(declared: &Type, decl_text: &str) -> (Type, Type) {
    let table: [(&str, Type, Type, Type); 8] = [
        ("int /*long*/", Type::Int, Type::Int, Type::Long),
        ("int[] /*long[]*/", Type::Int.array(), Type::Int.array(), Type::Long.array()),
        ("long /*int*/", Type::Long, Type::Int, Type::Long),
        ("long[] /*int[]*/", Type::Long.array(), Type::Int.array(), Type::Long.array()),
        ("float /*double*/", Type::Float, Type::Float, Type::Double),
        (
            "float[] /*double[]*/",
            Type::Float.array(),
            Type::Float.array(),
            Type::Double.array(),
        ),
        ("double /*float*/", Type::Double, Type::Float, Type::Double),
        (
            "double[] /*float[]*/",
            Type::Double.array(),
            Type::Float.array(),
            Type::Double.array(),
        ),
    ];
    for (marker, spelled, ty32, ty64) in table {
        if *declared == spelled && decl_text.contains(marker) {
            return (ty32, ty64);
        }
    }
    (declared.clone(), declared.clone())
}

/// Metadata tags pulled out of one javadoc block.
#[derive(Debug, Default)]
struct DocTags {
    class: Option<String>,
    member: Option<String>,
    params: Vec<(String, String)>,
}

impl DocTags {
    fn parse(doc: &str) -> DocTags {
        let body = doc
            .trim_start_matches("/**")
            .trim_end_matches("*/");
        let mut tags = DocTags::default();
        for line in body.lines() {
            let line = line.trim().trim_start_matches('*').trim();
            if let Some(text) = tag_text(line, "@jniclass") {
                tags.class = Some(text.to_owned());
            } else if let Some(text) = tag_text(line, "@field").or(tag_text(line, "@method")) {
                tags.member = Some(text.to_owned());
            } else if let Some(text) = tag_text(line, "@param") {
                if let Some((name, bag)) = text.split_once(char::is_whitespace) {
                    tags.params.push((name.to_owned(), bag.trim().to_owned()));
                }
            }
        }
        tags
    }
}

fn tag_text<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(tag)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{shared, MetaData};
    use crate::model::{BitMode, JniClass, JniField, JniMethod, JniParameter};

    fn parse(source: &str) -> Rc<ParsedClass> {
        let store = shared(MetaData::new());
        parse_source("Test.java".as_ref(), source, store).unwrap()
    }

    #[test]
    fn package_imports_and_superclass() {
        let class = parse(
            "package org.example.internal.win32;\n\
             import org.example.internal.*;\n\
             public class Test extends Platform {\n}\n",
        );
        assert_eq!(class.fqn(), "org.example.internal.win32.Test");
        assert_eq!(class.package_name(), "org.example.internal.win32");
        assert_eq!(class.imports(), vec!["org.example.internal".to_owned()]);
        assert_eq!(class.superclass_name().as_deref(), Some("Platform"));
    }

    #[test]
    fn width_comments_split_the_type_views() {
        let class = parse(
            "public class Test {\n\
             public static final native int /*long*/ GetParent(int /*long*/ hWnd);\n\
             public static final native void Fill(int[] /*long[]*/ values, double /*float*/ x);\n\
             }\n",
        );
        let methods = class.methods();
        assert_eq!(methods[0].return_type(BitMode::B32), Type::Int);
        assert_eq!(methods[0].return_type(BitMode::B64), Type::Long);
        assert_eq!(methods[0].param_types(BitMode::B64), vec![Type::Long]);
        assert_eq!(
            methods[1].param_types(BitMode::B32),
            vec![Type::Int.array(), Type::Float]
        );
        assert_eq!(
            methods[1].param_types(BitMode::B64),
            vec![Type::Long.array(), Type::Double]
        );
    }

    #[test]
    fn width_comment_requires_exact_spelling() {
        let class = parse(
            "public class Test {\n\
             public static final native int  /* long */ f(int x);\n\
             }\n",
        );
        let methods = class.methods();
        assert_eq!(methods[0].return_type(BitMode::B64), Type::Int);
    }

    #[test]
    fn javadoc_tags_seed_the_store() {
        let class = parse(
            "public class Test {\n\
             /**\n\
              * @method flags=dynamic\n\
              * @param hWnd cast=(HWND)\n\
              * @param lParam flags=no_out\n\
              */\n\
             public static final native int SendMessage(int hWnd, int lParam);\n\
             }\n",
        );
        let methods = class.methods();
        assert_eq!(methods[0].meta().flags(), vec!["dynamic".to_owned()]);
        let params = methods[0].params();
        assert_eq!(params[0].meta().cast(), "(HWND)");
        assert_eq!(params[0].meta().key(), "Test_SendMessage_0");
        assert!(params[1].meta().has_flag(crate::meta::Flag::NoOut));
    }

    #[test]
    fn class_tag_and_field_tag() {
        let class = parse(
            "/** @jniclass flags=cpp */\n\
             public class Test {\n\
             /** @field cast=(void *) */\n\
             public int /*long*/ handle;\n\
             }\n",
        );
        assert!(class.meta().has_flag(crate::meta::Flag::Cpp));
        let fields = class.fields();
        assert_eq!(fields[0].meta().cast(), "(void *)");
        assert_eq!(fields[0].ty(BitMode::B64), Type::Long);
        assert_eq!(fields[0].ty(BitMode::B32), Type::Int);
    }

    #[test]
    fn overload_keys_use_mangled_names() {
        let store = shared(MetaData::new());
        let class = parse_source(
            "Test.java".as_ref(),
            "public class Test {\n\
             /** @method flags=no_gen */\n\
             public static final native void f(int x);\n\
             public static final native void f(byte[] x);\n\
             }\n",
            store.clone(),
        )
        .unwrap();
        let methods = class.methods();
        assert_eq!(methods[0].meta().key(), "Test_f__I");
        assert_eq!(methods[1].meta().key(), "Test_f___3B");
        assert_eq!(store.borrow().get("Test_f__I"), Some("flags=no_gen"));
    }

    #[test]
    fn bodies_comments_and_initializers_are_skipped() {
        let class = parse(
            "public class Test {\n\
             // line comment with { unbalanced\n\
             public static final int FLAG = 1 << 4; /* trailing */\n\
             public static String label = \"br{ace\";\n\
             static {\n    int x = '{';\n    if (x > 0) { x--; }\n}\n\
             public Test() {\n}\n\
             public static int helper(int a) {\n    return a + FLAG;\n}\n\
             }\n",
        );
        assert_eq!(class.fields().len(), 2);
        let methods = class.methods();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name(), "helper");
        assert!(!crate::model::is_native(methods[0].as_ref()));
    }

    #[test]
    fn decl_offsets_point_at_members() {
        let source = "public class Test {\n\
                      public int x;\n\
                      public static final native void f();\n\
                      }\n";
        let class = parse(source);
        let field_offset = class.fields()[0].decl_offset().unwrap();
        assert_eq!(&source[field_offset..field_offset + 10], "public int");
        let method_offset = class.methods()[0].decl_offset().unwrap();
        assert!(source[method_offset..].starts_with("public static final native"));
    }
}
