//! The classfile-introspected variant of the declaration model.
//!
//! Compiled classes carry modifiers and erased descriptors but lose
//! parameter names, width comments and declaration offsets. When the sibling
//! `.java` file is present next to the `.class` file, each member is
//! cross-referenced against the parsed source to recover those pieces;
//! otherwise parameters get positional names and both width views collapse
//! to the descriptor type.

use crate::{
    errors::Error,
    meta::{self, MetaRef, SharedMetaData},
    model::{
        parsed::ParsedClass, BitMode, ClassRef, FieldRef, JniClass, JniField, JniMethod,
        JniParameter, MethodRef, Modifier, ParamRef,
    },
    Result,
};
use cafebabe::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
use enumset::EnumSet;
use jnigen_signatures::{display_c_escaped, MethodSig, Type};
use std::{
    cell::{OnceCell, RefCell},
    collections::{HashMap, HashSet},
    fmt::Write as _,
    path::{Path, PathBuf},
    rc::{Rc, Weak},
};

/// Loads and caches introspected classes by classfile path.
pub struct ClassFileLoader {
    store: SharedMetaData,
    cache: RefCell<HashMap<PathBuf, Rc<IntrospectedClass>>>,
}

impl ClassFileLoader {
    pub fn new(store: SharedMetaData) -> Rc<Self> {
        Rc::new(ClassFileLoader { store, cache: RefCell::new(HashMap::new()) })
    }

    /// Parses a compiled classfile, reusing the cached class when the same
    /// path was loaded before.
    pub fn load(self: &Rc<Self>, path: &Path) -> Result<Rc<IntrospectedClass>> {
        if let Some(cached) = self.cache.borrow().get(path) {
            return Ok(cached.clone());
        }
        let bytes = std::fs::read(path)?;
        let class_file = cafebabe::parse_class(&bytes)
            .map_err(|err| Error::class_file(path, err.to_string()))?;
        let class = self.build(path, &class_file)?;
        self.cache.borrow_mut().insert(path.to_owned(), class.clone());
        Ok(class)
    }

    fn build(
        self: &Rc<Self>,
        path: &Path,
        class_file: &cafebabe::ClassFile<'_>,
    ) -> Result<Rc<IntrospectedClass>> {
        let fqn = class_file.this_class.replace('/', ".");
        let simple_name = match fqn.rsplit_once('.') {
            Some((_, simple)) => simple.to_owned(),
            None => fqn.clone(),
        };
        let package = match fqn.rsplit_once('.') {
            Some((package, _)) => package.to_owned(),
            None => String::new(),
        };
        let superclass_name = class_file
            .super_class
            .as_ref()
            .map(|name| name.replace('/', "."));

        let source = self.sibling_source(path, &simple_name);
        let class_meta = MetaRef::new(self.store.clone(), meta::class_key(&simple_name));

        let class = Rc::new(IntrospectedClass {
            fqn,
            simple_name: simple_name.clone(),
            package,
            modifiers: class_modifiers(class_file.access_flags),
            class_path: path.to_owned(),
            superclass_name,
            source,
            fields: RefCell::new(Vec::new()),
            methods: RefCell::new(Vec::new()),
            superclass: OnceCell::new(),
            meta: class_meta,
            loader: RefCell::new(Rc::downgrade(self)),
        });

        for field in &class_file.fields {
            class.push_field(self.build_field(&class, field)?);
        }
        let mut seen = HashSet::new();
        let mut repeated = HashSet::new();
        for method in &class_file.methods {
            if method.access_flags.contains(MethodAccessFlags::NATIVE)
                && !seen.insert(method.name.to_string())
            {
                repeated.insert(method.name.to_string());
            }
        }
        for method in &class_file.methods {
            if method.name.as_ref() == "<init>" || method.name.as_ref() == "<clinit>" {
                continue;
            }
            let built = self.build_method(&class, method, &repeated)?;
            built.attach(&class);
            class.push_method(built);
        }
        Ok(class)
    }

    /// Parses the `.java` file next to the classfile, when one exists.
    fn sibling_source(&self, path: &Path, simple_name: &str) -> Option<Rc<ParsedClass>> {
        let source_path = path.with_file_name(format!("{simple_name}.java"));
        if !source_path.exists() {
            return None;
        }
        let text = match std::fs::read_to_string(&source_path) {
            Ok(text) => text,
            Err(err) => {
                log::warn!("failed to read {}: {err}", source_path.display());
                return None;
            }
        };
        match crate::parse::parse_source(&source_path, &text, self.store.clone()) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                log::warn!("ignoring sibling source of {}: {err}", path.display());
                None
            }
        }
    }

    fn build_field(
        &self,
        class: &Rc<IntrospectedClass>,
        field: &cafebabe::FieldInfo<'_>,
    ) -> Result<Rc<IntrospectedField>> {
        let name = field.name.to_string();
        let ty = Type::parse_jni(&field.descriptor.to_string())
            .map_err(|err| Error::class_file(&class.class_path, err.to_string()))?;
        let counterpart = class.source.as_ref().and_then(|source| {
            source.fields().into_iter().find(|f| f.name() == name)
        });
        let key = meta::member_key(
            &class.simple_name,
            &display_c_escaped(&name).to_string(),
        );
        Ok(Rc::new(IntrospectedField {
            name,
            modifiers: field_modifiers(field.access_flags),
            ty,
            counterpart,
            meta: MetaRef::new(self.store.clone(), key),
        }))
    }

    fn build_method(
        &self,
        class: &Rc<IntrospectedClass>,
        method: &cafebabe::MethodInfo<'_>,
        repeated: &HashSet<String>,
    ) -> Result<Rc<IntrospectedMethod>> {
        let name = method.name.to_string();
        let sig = MethodSig::parse_jni(&method.descriptor.to_string())
            .map_err(|err| Error::class_file(&class.class_path, err.to_string()))?;
        let modifiers = method_modifiers(method.access_flags);
        let native = modifiers.contains(Modifier::Native);
        let unique = !repeated.contains(&name);

        let function = if !native {
            name.clone()
        } else {
            let mut function = display_c_escaped(&name).to_string();
            if !unique {
                function.push_str("__");
                for ty in &sig.params {
                    let descriptor = ty.display_jni().to_string();
                    let _ = write!(function, "{}", display_c_escaped(&descriptor));
                }
            }
            function
        };

        let counterpart = class
            .source
            .as_ref()
            .and_then(|source| matching_method(source, &name, &sig));

        let built = Rc::new(IntrospectedMethod {
            class: RefCell::new(Weak::new()),
            name,
            modifiers,
            sig: sig.clone(),
            counterpart: counterpart.clone(),
            params: RefCell::new(Vec::new()),
            unique,
            meta: MetaRef::new(
                self.store.clone(),
                meta::member_key(&class.simple_name, &function),
            ),
        });
        for index in 0..sig.params.len() {
            let name = counterpart
                .as_ref()
                .and_then(|m| m.params().get(index).map(|p| p.name()))
                .unwrap_or_else(|| format!("arg{index}"));
            let key = meta::param_key(&class.simple_name, &function, index);
            let param = Rc::new(IntrospectedParameter {
                method: RefCell::new(Rc::downgrade(&built)),
                index,
                name,
                meta: MetaRef::new(self.store.clone(), key),
            });
            built.params.borrow_mut().push(param);
        }
        Ok(built)
    }
}

/// Finds the source method matching a compiled name and descriptor. The
/// compiled parameter types must equal one of the two width views at every
/// position, which distinguishes overloads without reconstructing the exact
/// source spelling.
fn matching_method(source: &Rc<ParsedClass>, name: &str, sig: &MethodSig) -> Option<MethodRef> {
    source.methods().into_iter().find(|m| {
        if m.name() != name {
            return false;
        }
        let ty32 = m.param_types(BitMode::B32);
        let ty64 = m.param_types(BitMode::B64);
        ty32.len() == sig.params.len()
            && sig
                .params
                .iter()
                .enumerate()
                .all(|(i, ty)| *ty == ty32[i] || *ty == ty64[i])
    })
}

fn class_modifiers(flags: ClassAccessFlags) -> EnumSet<Modifier> {
    let mut set = EnumSet::empty();
    if flags.contains(ClassAccessFlags::PUBLIC) {
        set |= Modifier::Public;
    }
    if flags.contains(ClassAccessFlags::FINAL) {
        set |= Modifier::Final;
    }
    if flags.contains(ClassAccessFlags::ABSTRACT) {
        set |= Modifier::Abstract;
    }
    set
}

fn field_modifiers(flags: FieldAccessFlags) -> EnumSet<Modifier> {
    let mut set = EnumSet::empty();
    if flags.contains(FieldAccessFlags::PUBLIC) {
        set |= Modifier::Public;
    }
    if flags.contains(FieldAccessFlags::PROTECTED) {
        set |= Modifier::Protected;
    }
    if flags.contains(FieldAccessFlags::PRIVATE) {
        set |= Modifier::Private;
    }
    if flags.contains(FieldAccessFlags::STATIC) {
        set |= Modifier::Static;
    }
    if flags.contains(FieldAccessFlags::FINAL) {
        set |= Modifier::Final;
    }
    if flags.contains(FieldAccessFlags::TRANSIENT) {
        set |= Modifier::Transient;
    }
    if flags.contains(FieldAccessFlags::VOLATILE) {
        set |= Modifier::Volatile;
    }
    set
}

fn method_modifiers(flags: MethodAccessFlags) -> EnumSet<Modifier> {
    let mut set = EnumSet::empty();
    if flags.contains(MethodAccessFlags::PUBLIC) {
        set |= Modifier::Public;
    }
    if flags.contains(MethodAccessFlags::PROTECTED) {
        set |= Modifier::Protected;
    }
    if flags.contains(MethodAccessFlags::PRIVATE) {
        set |= Modifier::Private;
    }
    if flags.contains(MethodAccessFlags::STATIC) {
        set |= Modifier::Static;
    }
    if flags.contains(MethodAccessFlags::FINAL) {
        set |= Modifier::Final;
    }
    if flags.contains(MethodAccessFlags::NATIVE) {
        set |= Modifier::Native;
    }
    if flags.contains(MethodAccessFlags::ABSTRACT) {
        set |= Modifier::Abstract;
    }
    if flags.contains(MethodAccessFlags::SYNCHRONIZED) {
        set |= Modifier::Synchronized;
    }
    set
}

/// A class introspected from a compiled classfile.
pub struct IntrospectedClass {
    fqn: String,
    simple_name: String,
    package: String,
    modifiers: EnumSet<Modifier>,
    class_path: PathBuf,
    superclass_name: Option<String>,
    source: Option<Rc<ParsedClass>>,
    fields: RefCell<Vec<Rc<IntrospectedField>>>,
    methods: RefCell<Vec<Rc<IntrospectedMethod>>>,
    superclass: OnceCell<Option<ClassRef>>,
    meta: MetaRef,
    loader: RefCell<Weak<ClassFileLoader>>,
}

impl IntrospectedClass {
    fn push_field(&self, field: Rc<IntrospectedField>) {
        self.fields.borrow_mut().push(field);
    }

    fn push_method(&self, method: Rc<IntrospectedMethod>) {
        self.methods.borrow_mut().push(method);
    }

    fn resolve_superclass(&self) -> Option<ClassRef> {
        let name = self.superclass_name.as_deref()?;
        if name == "java.lang.Object" {
            return None;
        }
        let simple = name.rsplit('.').next()?;
        let sibling = self.class_path.with_file_name(format!("{simple}.class"));
        if !sibling.exists() {
            return None;
        }
        let loader = self.loader.borrow().upgrade()?;
        match loader.load(&sibling) {
            Ok(class) => Some(class as ClassRef),
            Err(err) => {
                log::warn!("failed to load superclass {name} of {}: {err}", self.fqn);
                None
            }
        }
    }
}

impl JniClass for IntrospectedClass {
    fn fqn(&self) -> String {
        self.fqn.clone()
    }
    fn simple_name(&self) -> String {
        self.simple_name.clone()
    }
    fn package_name(&self) -> String {
        self.package.clone()
    }
    fn imports(&self) -> Vec<String> {
        self.source.as_ref().map(|s| s.imports()).unwrap_or_default()
    }
    fn modifiers(&self) -> EnumSet<Modifier> {
        self.modifiers
    }
    fn fields(&self) -> Vec<FieldRef> {
        self.fields.borrow().iter().map(|f| f.clone() as FieldRef).collect()
    }
    fn methods(&self) -> Vec<MethodRef> {
        self.methods.borrow().iter().map(|m| m.clone() as MethodRef).collect()
    }
    fn superclass(&self) -> Option<ClassRef> {
        self.superclass.get_or_init(|| self.resolve_superclass()).clone()
    }
    fn superclass_name(&self) -> Option<String> {
        self.superclass_name.clone()
    }
    fn source_path(&self) -> Option<PathBuf> {
        self.source.as_ref().and_then(|s| s.source_path())
    }
    fn decl_offset(&self) -> Option<usize> {
        self.source.as_ref().and_then(|s| s.decl_offset())
    }
    fn meta(&self) -> MetaRef {
        self.meta.clone()
    }
}

/// A field introspected from a compiled classfile.
pub struct IntrospectedField {
    name: String,
    modifiers: EnumSet<Modifier>,
    ty: Type,
    counterpart: Option<FieldRef>,
    meta: MetaRef,
}

impl JniField for IntrospectedField {
    fn name(&self) -> String {
        self.name.clone()
    }
    fn modifiers(&self) -> EnumSet<Modifier> {
        self.modifiers
    }
    fn ty(&self, mode: BitMode) -> Type {
        match &self.counterpart {
            Some(field) => field.ty(mode),
            None => self.ty.clone(),
        }
    }
    fn decl_offset(&self) -> Option<usize> {
        self.counterpart.as_ref().and_then(|f| f.decl_offset())
    }
    fn meta(&self) -> MetaRef {
        self.meta.clone()
    }
}

/// A method introspected from a compiled classfile.
pub struct IntrospectedMethod {
    class: RefCell<Weak<IntrospectedClass>>,
    name: String,
    modifiers: EnumSet<Modifier>,
    sig: MethodSig,
    counterpart: Option<MethodRef>,
    params: RefCell<Vec<Rc<IntrospectedParameter>>>,
    unique: bool,
    meta: MetaRef,
}

impl IntrospectedMethod {
    fn attach(self: &Rc<Self>, class: &Rc<IntrospectedClass>) {
        *self.class.borrow_mut() = Rc::downgrade(class);
    }
}

impl JniMethod for IntrospectedMethod {
    fn name(&self) -> String {
        self.name.clone()
    }
    fn modifiers(&self) -> EnumSet<Modifier> {
        self.modifiers
    }
    fn declaring_class(&self) -> Option<ClassRef> {
        self.class.borrow().upgrade().map(|c| c as ClassRef)
    }
    fn params(&self) -> Vec<ParamRef> {
        self.params.borrow().iter().map(|p| p.clone() as ParamRef).collect()
    }
    fn return_type(&self, mode: BitMode) -> Type {
        match &self.counterpart {
            Some(method) => method.return_type(mode),
            None => self.sig.ret_ty.clone(),
        }
    }
    fn param_types(&self, mode: BitMode) -> Vec<Type> {
        match &self.counterpart {
            Some(method) => method.param_types(mode),
            None => self.sig.params.clone(),
        }
    }
    fn decl_offset(&self) -> Option<usize> {
        self.counterpart.as_ref().and_then(|m| m.decl_offset())
    }
    fn is_name_unique(&self) -> bool {
        self.unique
    }
    fn meta(&self) -> MetaRef {
        self.meta.clone()
    }
}

/// A parameter of an introspected method.
pub struct IntrospectedParameter {
    method: RefCell<Weak<IntrospectedMethod>>,
    index: usize,
    name: String,
    meta: MetaRef,
}

impl JniParameter for IntrospectedParameter {
    fn index(&self) -> usize {
        self.index
    }
    fn name(&self) -> String {
        self.name.clone()
    }
    fn ty(&self, mode: BitMode) -> Type {
        match self.method.borrow().upgrade() {
            Some(method) => method.param_types(mode)[self.index].clone(),
            None => Type::Void,
        }
    }
    fn meta(&self) -> MetaRef {
        self.meta.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{shared, MetaData};

    #[test]
    fn source_match_accepts_either_width_view() {
        let store = shared(MetaData::new());
        let class = crate::parse::parse_source(
            "Test.java".as_ref(),
            "public class Test {\n\
             public static final native void f(int /*long*/ a);\n\
             public static final native void f(byte[] b);\n\
             }\n",
            store,
        )
        .unwrap();
        let found = matching_method(&class, "f", &MethodSig::void(vec![Type::Long])).unwrap();
        assert_eq!(found.param_types(BitMode::B32), vec![Type::Int]);
        assert!(matching_method(&class, "f", &MethodSig::void(vec![Type::Byte.array()])).is_some());
        assert!(matching_method(&class, "f", &MethodSig::void(vec![Type::Float])).is_none());
    }

    #[test]
    fn modifier_mapping() {
        let set = method_modifiers(
            MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC | MethodAccessFlags::NATIVE,
        );
        assert!(set.contains(Modifier::Public));
        assert!(set.contains(Modifier::Static));
        assert!(set.contains(Modifier::Native));
        assert!(!set.contains(Modifier::Final));
    }
}
