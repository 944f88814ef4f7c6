#![deny(unused_must_use)]

mod c_sigs;
mod java_sigs;
mod jni_sigs;

pub use c_sigs::display_c_escaped;

/// The signature of a given method.
#[derive(Debug, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct MethodSig {
    pub ret_ty: Type,
    pub params: Vec<Type>,
}
impl MethodSig {
    /// Creates a new method signature.
    pub fn new(ret_ty: Type, params: impl Into<Vec<Type>>) -> Self {
        MethodSig { ret_ty, params: params.into() }
    }

    /// Creates a new method signature that returns void.
    pub fn void(params: impl Into<Vec<Type>>) -> Self {
        MethodSig { ret_ty: Type::Void, params: params.into() }
    }
}

/// A type signature to be used with JNI.
///
/// Two types with the same JNI descriptor compare and hash equal; the derived
/// implementations match descriptor equality because the representation is
/// exactly the descriptor's structure.
#[derive(Debug, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct Type {
    pub basic_sig: BasicType,
    pub array_dim: usize,
}
#[allow(non_upper_case_globals)]
impl Type {
    pub const Void: Type = Type::new(BasicType::Void);
    pub const Boolean: Type = Type::new(BasicType::Boolean);
    pub const Byte: Type = Type::new(BasicType::Byte);
    pub const Char: Type = Type::new(BasicType::Char);
    pub const Short: Type = Type::new(BasicType::Short);
    pub const Int: Type = Type::new(BasicType::Int);
    pub const Long: Type = Type::new(BasicType::Long);
    pub const Float: Type = Type::new(BasicType::Float);
    pub const Double: Type = Type::new(BasicType::Double);

    /// Create a new type for a given basic type.
    pub const fn new(ty: BasicType) -> Self {
        Type { basic_sig: ty, array_dim: 0 }
    }

    /// Create a new class type.
    pub fn class(package: impl Into<Vec<String>>, name: impl Into<String>) -> Self {
        Type::new(BasicType::Class(ClassName::new(package, name)))
    }

    /// Create a new class type from a dotted fully-qualified name.
    pub fn class_fqn(fqn: &str) -> Self {
        Type::new(BasicType::Class(ClassName::from_dotted(fqn)))
    }

    /// Create a new type for an array.
    pub fn array(mut self) -> Self {
        self.array_dim += 1;
        self
    }

    /// Create a new type for a multidimensional array.
    pub fn array_dim(mut self, dims: usize) -> Self {
        self.array_dim += dims;
        self
    }

    /// The element type of an array, with one array dimension removed.
    pub fn component(&self) -> Type {
        assert!(self.array_dim != 0, "component() on a non-array type");
        Type { basic_sig: self.basic_sig.clone(), array_dim: self.array_dim - 1 }
    }

    /// Returns whether this is a non-array primitive type (or void).
    pub fn is_primitive(&self) -> bool {
        self.array_dim == 0 && self.basic_sig.is_primitive()
    }

    /// Returns whether this is an array type.
    pub fn is_array(&self) -> bool {
        self.array_dim != 0
    }

    /// Returns whether this is an array of non-array primitives.
    pub fn is_primitive_array(&self) -> bool {
        self.array_dim == 1 && self.basic_sig.is_primitive()
    }

    pub fn is_void(&self) -> bool {
        self.array_dim == 0 && matches!(self.basic_sig, BasicType::Void)
    }

    /// Returns whether this is `java.lang.String`.
    pub fn is_string(&self) -> bool {
        self.array_dim == 0 && self.basic_sig.is_named_class(&["java", "lang"], "String")
    }

    /// Returns whether this is `java.lang.Object` or `java.lang.Class`.
    ///
    /// These pass through marshalling untouched, like primitives do.
    pub fn is_system_class(&self) -> bool {
        self.array_dim == 0
            && (self.basic_sig.is_named_class(&["java", "lang"], "Object")
                || self.basic_sig.is_named_class(&["java", "lang"], "Class"))
    }

    /// Returns whether generated code marshals this type by value (no local
    /// pointer variable, no get/set bracketing).
    pub fn is_unmarshalled(&self) -> bool {
        self.is_primitive() || self.is_system_class()
    }

    /// The simple class name, for class types.
    pub fn simple_name(&self) -> Option<&str> {
        match &self.basic_sig {
            BasicType::Class(name) => Some(&name.name),
            _ => None,
        }
    }
}
impl From<ClassName> for Type {
    fn from(cn: ClassName) -> Self {
        Type::new(BasicType::Class(cn))
    }
}

/// A basic Java type.
///
/// This is a reference to a particular class or a non-array primitive. As arrays can be recursive,
/// [`Type`] is used to represent array dimensionality.
#[derive(Debug, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub enum BasicType {
    Void,
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Class(ClassName),
}
impl BasicType {
    /// Returns whether this is a primitive type (or void).
    pub fn is_primitive(&self) -> bool {
        !matches!(self, BasicType::Class(_))
    }

    fn is_named_class(&self, package: &[&str], name: &str) -> bool {
        match self {
            BasicType::Class(cn) => {
                cn.name == name && cn.package.iter().map(String::as_str).eq(package.iter().copied())
            }
            _ => false,
        }
    }

    /// Maps a Java primitive spelling to its basic type.
    pub fn from_java_name(name: &str) -> Option<BasicType> {
        Some(match name {
            "void" => BasicType::Void,
            "boolean" => BasicType::Boolean,
            "byte" => BasicType::Byte,
            "char" => BasicType::Char,
            "short" => BasicType::Short,
            "int" => BasicType::Int,
            "long" => BasicType::Long,
            "float" => BasicType::Float,
            "double" => BasicType::Double,
            _ => return None,
        })
    }
}

/// The name of a Java class, including its full package path.
#[derive(Debug, Clone, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct ClassName {
    pub package: Vec<String>,
    pub name: String,
}
impl ClassName {
    /// Create a new class name.
    pub fn new(package: impl Into<Vec<String>>, name: impl Into<String>) -> Self {
        ClassName { package: package.into(), name: name.into() }
    }

    /// Create a new class name from a dotted fully-qualified name.
    pub fn from_dotted(fqn: &str) -> Self {
        let mut package: Vec<String> = fqn.split('.').map(str::to_owned).collect();
        let name = package.pop().unwrap_or_default();
        ClassName { package, name }
    }
}
