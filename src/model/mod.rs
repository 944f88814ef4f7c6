//! The declaration model: a typed IR for Java classes, fields, methods and
//! parameters, annotated through the metadata store.
//!
//! Two producers populate this IR behind the same trait surface: the source
//! parser ([`parsed`]) and the classfile introspector ([`introspected`]).
//! Shared behavior (attribute bags, name mangling, classification) lives in
//! [`MetaRef`] and free functions rather than a common base type.

pub mod introspected;
pub mod parsed;
mod resolver;

pub use resolver::Resolver;

use crate::meta::MetaRef;
use enumset::{EnumSet, EnumSetType};
use jnigen_signatures::{display_c_escaped, Type};
use std::{fmt::Write, path::PathBuf, rc::Rc};

/// Java declaration modifiers.
#[derive(EnumSetType, Debug)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Native,
    Abstract,
    Synchronized,
    Transient,
    Volatile,
}

impl Modifier {
    pub fn from_keyword(keyword: &str) -> Option<Modifier> {
        Some(match keyword {
            "public" => Modifier::Public,
            "protected" => Modifier::Protected,
            "private" => Modifier::Private,
            "static" => Modifier::Static,
            "final" => Modifier::Final,
            "native" => Modifier::Native,
            "abstract" => Modifier::Abstract,
            "synchronized" => Modifier::Synchronized,
            "transient" => Modifier::Transient,
            "volatile" => Modifier::Volatile,
            _ => return None,
        })
    }
}

/// Which build variant's types to read. Declarations marked with the inline
/// `int /*long*/` convention widen between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitMode {
    B32,
    B64,
}

pub type ClassRef = Rc<dyn JniClass>;
pub type FieldRef = Rc<dyn JniField>;
pub type MethodRef = Rc<dyn JniMethod>;
pub type ParamRef = Rc<dyn JniParameter>;

/// A top-level class declaration.
///
/// Identity is the fully-qualified name; two instances for the same name are
/// not guaranteed to be the same object.
pub trait JniClass {
    fn fqn(&self) -> String;
    fn simple_name(&self) -> String;
    fn package_name(&self) -> String;
    fn imports(&self) -> Vec<String>;
    fn modifiers(&self) -> EnumSet<Modifier>;
    fn fields(&self) -> Vec<FieldRef>;
    fn methods(&self) -> Vec<MethodRef>;
    /// The resolved superclass, memoized on first access. `None` both for
    /// `java.lang.Object` roots and for names the resolver cannot find.
    fn superclass(&self) -> Option<ClassRef>;
    fn superclass_name(&self) -> Option<String>;
    fn source_path(&self) -> Option<PathBuf>;
    fn decl_offset(&self) -> Option<usize>;
    fn meta(&self) -> MetaRef;
}

/// A declared field.
pub trait JniField {
    fn name(&self) -> String;
    fn modifiers(&self) -> EnumSet<Modifier>;
    fn ty(&self, mode: BitMode) -> Type;
    fn decl_offset(&self) -> Option<usize>;
    fn meta(&self) -> MetaRef;
}

/// A declared method.
pub trait JniMethod {
    fn name(&self) -> String;
    fn modifiers(&self) -> EnumSet<Modifier>;
    fn declaring_class(&self) -> Option<ClassRef>;
    fn params(&self) -> Vec<ParamRef>;
    fn return_type(&self, mode: BitMode) -> Type;
    fn param_types(&self, mode: BitMode) -> Vec<Type>;
    fn decl_offset(&self) -> Option<usize>;
    /// Whether no *other* native method in the declaring class shares this
    /// method's plain name. Computed once and cached by implementations.
    fn is_name_unique(&self) -> bool;
    fn meta(&self) -> MetaRef;
}

/// A method parameter. Its type is never stored here; it is always looked up
/// by index from the owning method's parameter-type vectors.
pub trait JniParameter {
    fn index(&self) -> usize;
    fn name(&self) -> String;
    fn ty(&self, mode: BitMode) -> Type;
    fn meta(&self) -> MetaRef;
}

pub fn is_native(method: &dyn JniMethod) -> bool {
    method.modifiers().contains(Modifier::Native)
}

/// The C-safe export name of a method.
///
/// Non-native methods keep their plain name. A native method's name is
/// C-escaped; when another native sibling shares the plain name, the escaped
/// 32-bit parameter descriptors are appended after `__`, following the JNI
/// overload-disambiguation convention.
pub fn function_name(method: &dyn JniMethod) -> String {
    if !is_native(method) {
        return method.name();
    }
    let mut name = display_c_escaped(&method.name()).to_string();
    if !method.is_name_unique() {
        name.push_str("__");
        for ty in method.param_types(BitMode::B32) {
            let descriptor = ty.display_jni().to_string();
            let _ = write!(name, "{}", display_c_escaped(&descriptor));
        }
    }
    name
}

/// The simple name of the method's declaring class, or `""` if the
/// back-reference is gone.
pub fn declaring_simple_name(method: &dyn JniMethod) -> String {
    method
        .declaring_class()
        .map(|c| c.simple_name())
        .unwrap_or_default()
}

/// Whether a class has at least one native method.
pub fn has_natives(class: &dyn JniClass) -> bool {
    class.methods().iter().any(|m| is_native(m.as_ref()))
}

/// Whether a class is struct-shaped: public non-static non-final instance
/// fields and no native methods, destined for marshalling accessor
/// generation.
pub fn is_struct_class(class: &dyn JniClass) -> bool {
    if has_natives(class) {
        return false;
    }
    class.fields().iter().any(|f| is_instance_field(f.as_ref()))
}

/// Whether a field takes part in struct marshalling.
pub fn is_instance_field(field: &dyn JniField) -> bool {
    let mods = field.modifiers();
    mods.contains(Modifier::Public)
        && !mods.contains(Modifier::Static)
        && !mods.contains(Modifier::Final)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{shared, MetaData};
    use crate::model::parsed::ParsedClass;

    fn parse_class(source: &str) -> Rc<ParsedClass> {
        let store = shared(MetaData::new());
        crate::parse::parse_source("Test.java".as_ref(), source, store).unwrap()
    }

    #[test]
    fn unique_native_name_is_unmangled() {
        let class = parse_class(
            "public class Test {\npublic static final native int create(int arg);\n}\n",
        );
        let methods = class.methods();
        assert_eq!(function_name(methods[0].as_ref()), "create");
    }

    #[test]
    fn overloaded_natives_get_descriptor_suffix() {
        let class = parse_class(
            "public class Test {\n\
             public static final native int create(int arg);\n\
             public static final native int create(String arg);\n\
             }\n",
        );
        let methods = class.methods();
        let names: Vec<_> = methods.iter().map(|m| function_name(m.as_ref())).collect();
        assert!(names.contains(&"create__I".to_owned()), "{names:?}");
        assert!(names.contains(&"create__Ljava_lang_String_2".to_owned()), "{names:?}");
    }

    #[test]
    fn underscore_names_are_escaped() {
        let class = parse_class(
            "public class Test {\npublic static final native void g_main_loop_run(int loop);\n}\n",
        );
        let methods = class.methods();
        assert_eq!(function_name(methods[0].as_ref()), "g_1main_1loop_1run");
    }

    #[test]
    fn struct_shape_classification() {
        let structish = parse_class("public class Test {\npublic int x;\npublic int y;\n}\n");
        assert!(is_struct_class(&*structish));
        let nativeish =
            parse_class("public class Test {\npublic static final native void f();\n}\n");
        assert!(!is_struct_class(&*nativeish));
        assert!(has_natives(&*nativeish));
        let constants = parse_class("public class Test {\npublic static final int X = 1;\n}\n");
        assert!(!is_struct_class(&*constants));
    }
}
