//! The C-side renderings of a [`Type`] that the glue generators need.
//!
//! Each rendering matches one spelling convention in the emitted C source:
//! the JNI accessor infix (`Get<X>Field`, `Get<X>ArrayElements`), the JNI
//! typedef (`jint`, `jintArray`), the natural Java spelling used in struct
//! code, and the struct-marshalling spelling (`RECT *`).

use crate::*;
use std::fmt::{Display, Formatter, Write};

impl Type {
    /// The capitalized infix used in JNI accessor names, such as the `Int` in
    /// `GetIntField` or `GetIntArrayElements`. Class types use `Object`.
    pub fn jni_accessor(&self) -> &'static str {
        match &self.basic_sig {
            _ if self.array_dim != 0 => "Object",
            BasicType::Void => "Void",
            BasicType::Boolean => "Boolean",
            BasicType::Byte => "Byte",
            BasicType::Char => "Char",
            BasicType::Short => "Short",
            BasicType::Int => "Int",
            BasicType::Long => "Long",
            BasicType::Float => "Float",
            BasicType::Double => "Double",
            BasicType::Class(_) => "Object",
        }
    }

    /// The JNI C type used in function prototypes and locals: `jint`,
    /// `jbyteArray`, `jstring`, `jobject`, `void`.
    pub fn c_type(&self) -> String {
        if self.array_dim != 0 {
            let component = self.component();
            return if component.is_primitive() {
                format!("{}Array", component.c_type())
            } else {
                "jobjectArray".to_owned()
            };
        }
        match &self.basic_sig {
            BasicType::Void => "void".to_owned(),
            BasicType::Boolean => "jboolean".to_owned(),
            BasicType::Byte => "jbyte".to_owned(),
            BasicType::Char => "jchar".to_owned(),
            BasicType::Short => "jshort".to_owned(),
            BasicType::Int => "jint".to_owned(),
            BasicType::Long => "jlong".to_owned(),
            BasicType::Float => "jfloat".to_owned(),
            BasicType::Double => "jdouble".to_owned(),
            BasicType::Class(_) => {
                if self.is_string() {
                    "jstring".to_owned()
                } else {
                    "jobject".to_owned()
                }
            }
        }
    }

    /// The natural Java spelling: `int`, `byte[]`, `String`, `RECT`.
    pub fn natural_name(&self) -> String {
        let mut name = match &self.basic_sig {
            BasicType::Void => "void".to_owned(),
            BasicType::Boolean => "boolean".to_owned(),
            BasicType::Byte => "byte".to_owned(),
            BasicType::Char => "char".to_owned(),
            BasicType::Short => "short".to_owned(),
            BasicType::Int => "int".to_owned(),
            BasicType::Long => "long".to_owned(),
            BasicType::Float => "float".to_owned(),
            BasicType::Double => "double".to_owned(),
            BasicType::Class(class) => class.name.clone(),
        };
        for _ in 0..self.array_dim {
            name.push_str("[]");
        }
        name
    }

    /// The spelling used in struct-marshalling code. Class types render as the
    /// struct's simple name, as a pointer unless `as_struct` asks for the
    /// embedded form. Arrays decay to a pointer to their component spelling.
    pub fn c_struct_type(&self, as_struct: bool) -> String {
        if self.array_dim != 0 {
            return format!("{} *", self.component().c_struct_type(as_struct));
        }
        match &self.basic_sig {
            BasicType::Class(class) => {
                if as_struct {
                    class.name.clone()
                } else {
                    format!("{} *", class.name)
                }
            }
            _ => self.c_type(),
        }
    }

    /// Byte width of a primitive component, used to scale `sizeof` in bulk
    /// array-region copies.
    pub fn byte_width(&self) -> usize {
        match &self.basic_sig {
            BasicType::Boolean | BasicType::Byte => 1,
            BasicType::Char | BasicType::Short => 2,
            BasicType::Int | BasicType::Float => 4,
            BasicType::Long | BasicType::Double => 8,
            BasicType::Void | BasicType::Class(_) => 0,
        }
    }
}

struct DisplayCEscaped<'a>(&'a str);
impl<'a> Display for DisplayCEscaped<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for char in self.0.chars() {
            match char {
                '_' => f.write_str("_1")?,
                ';' => f.write_str("_2")?,
                '[' => f.write_str("_3")?,
                '.' | '/' => f.write_char('_')?,
                _ => f.write_char(char)?,
            }
        }
        Ok(())
    }
}

/// Displays a name in C-safe escaped form, following the JNI convention for
/// native symbol names: `_` becomes `_1`, `;` becomes `_2`, `[` becomes `_3`,
/// and `.`/`/` both become `_`.
pub fn display_c_escaped(name: &str) -> impl Display + '_ {
    DisplayCEscaped(name)
}
