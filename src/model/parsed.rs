//! The source-parsed variant of the declaration model.

use crate::{
    meta::{MetaRef, SharedMetaData},
    model::{BitMode, ClassRef, FieldRef, JniClass, JniField, JniMethod, JniParameter, MethodRef,
            Modifier, ParamRef, Resolver},
    Result,
};
use enumset::EnumSet;
use jnigen_signatures::Type;
use std::{
    cell::{Cell, OnceCell, RefCell},
    collections::HashMap,
    path::{Path, PathBuf},
    rc::{Rc, Weak},
};

/// Loads and caches parsed classes by fully-qualified name.
///
/// Superclass resolution funnels through here so each source file is parsed
/// at most once per run.
pub struct Loader {
    store: SharedMetaData,
    cache: RefCell<HashMap<PathBuf, Rc<ParsedClass>>>,
}

impl Loader {
    pub fn new(store: SharedMetaData) -> Rc<Self> {
        Rc::new(Loader { store, cache: RefCell::new(HashMap::new()) })
    }

    /// Parses a source file, reusing the cached class when the same path was
    /// loaded before.
    pub fn load(self: &Rc<Self>, path: &Path) -> Result<Rc<ParsedClass>> {
        if let Some(cached) = self.cache.borrow().get(path) {
            return Ok(cached.clone());
        }
        let source = std::fs::read_to_string(path)?;
        let class = crate::parse::parse_source(path, &source, self.store.clone())?;
        *class.loader.borrow_mut() = Rc::downgrade(self);
        self.cache.borrow_mut().insert(path.to_owned(), class.clone());
        Ok(class)
    }
}

/// A class parsed from declaration source.
pub struct ParsedClass {
    fqn: String,
    simple_name: String,
    package: String,
    imports: Vec<String>,
    modifiers: EnumSet<Modifier>,
    source_path: PathBuf,
    decl_offset: usize,
    superclass_name: Option<String>,
    fields: RefCell<Vec<Rc<ParsedField>>>,
    methods: RefCell<Vec<Rc<ParsedMethod>>>,
    superclass: OnceCell<Option<ClassRef>>,
    meta: MetaRef,
    loader: RefCell<Weak<Loader>>,
}

impl ParsedClass {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        fqn: String,
        simple_name: String,
        package: String,
        imports: Vec<String>,
        modifiers: EnumSet<Modifier>,
        source_path: PathBuf,
        decl_offset: usize,
        superclass_name: Option<String>,
        meta: MetaRef,
    ) -> Rc<Self> {
        Rc::new(ParsedClass {
            fqn,
            simple_name,
            package,
            imports,
            modifiers,
            source_path,
            decl_offset,
            superclass_name,
            fields: RefCell::new(Vec::new()),
            methods: RefCell::new(Vec::new()),
            superclass: OnceCell::new(),
            meta,
            loader: RefCell::new(Weak::new()),
        })
    }

    pub(crate) fn push_field(&self, field: Rc<ParsedField>) {
        self.fields.borrow_mut().push(field);
    }

    pub(crate) fn push_method(&self, method: Rc<ParsedMethod>) {
        self.methods.borrow_mut().push(method);
    }

    /// The resolution context for names referenced by this class.
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.simple_name, &self.package, &self.source_path, &self.imports)
    }

    fn resolve_superclass(&self) -> Option<ClassRef> {
        let name = self.superclass_name.as_deref()?;
        if name == "Object" || name == "java.lang.Object" {
            return None;
        }
        let loader = self.loader.borrow().upgrade()?;
        let path = if name.contains('.') {
            let mut path = self.resolver().source_root();
            for component in name.split('.') {
                path.push(component);
            }
            path.set_extension("java");
            path.exists().then_some(path)?
        } else {
            self.resolver().find_path(name)?
        };
        match loader.load(&path) {
            Ok(class) => Some(class as ClassRef),
            Err(err) => {
                log::warn!("failed to load superclass {name} of {}: {err}", self.fqn);
                None
            }
        }
    }
}

impl JniClass for ParsedClass {
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
        self.imports.clone()
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
        Some(self.source_path.clone())
    }
    fn decl_offset(&self) -> Option<usize> {
        Some(self.decl_offset)
    }
    fn meta(&self) -> MetaRef {
        self.meta.clone()
    }
}

/// A field parsed from declaration source.
pub struct ParsedField {
    name: String,
    modifiers: EnumSet<Modifier>,
    ty32: Type,
    ty64: Type,
    decl_offset: usize,
    meta: MetaRef,
}

impl ParsedField {
    pub(crate) fn new(
        name: String,
        modifiers: EnumSet<Modifier>,
        ty32: Type,
        ty64: Type,
        decl_offset: usize,
        meta: MetaRef,
    ) -> Rc<Self> {
        Rc::new(ParsedField { name, modifiers, ty32, ty64, decl_offset, meta })
    }
}

impl JniField for ParsedField {
    fn name(&self) -> String {
        self.name.clone()
    }
    fn modifiers(&self) -> EnumSet<Modifier> {
        self.modifiers
    }
    fn ty(&self, mode: BitMode) -> Type {
        match mode {
            BitMode::B32 => self.ty32.clone(),
            BitMode::B64 => self.ty64.clone(),
        }
    }
    fn decl_offset(&self) -> Option<usize> {
        Some(self.decl_offset)
    }
    fn meta(&self) -> MetaRef {
        self.meta.clone()
    }
}

/// A method parsed from declaration source.
pub struct ParsedMethod {
    class: RefCell<Weak<ParsedClass>>,
    name: String,
    modifiers: EnumSet<Modifier>,
    params: RefCell<Vec<Rc<ParsedParameter>>>,
    ret32: Type,
    ret64: Type,
    param_types32: Vec<Type>,
    param_types64: Vec<Type>,
    decl_offset: usize,
    unique: Cell<Option<bool>>,
    meta: MetaRef,
}

impl ParsedMethod {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        modifiers: EnumSet<Modifier>,
        ret32: Type,
        ret64: Type,
        param_types32: Vec<Type>,
        param_types64: Vec<Type>,
        decl_offset: usize,
        meta: MetaRef,
    ) -> Rc<Self> {
        Rc::new(ParsedMethod {
            class: RefCell::new(Weak::new()),
            name,
            modifiers,
            params: RefCell::new(Vec::new()),
            ret32,
            ret64,
            param_types32,
            param_types64,
            decl_offset,
            unique: Cell::new(None),
            meta,
        })
    }

    pub(crate) fn attach(self: &Rc<Self>, class: &Rc<ParsedClass>) {
        *self.class.borrow_mut() = Rc::downgrade(class);
    }

    pub(crate) fn push_param(&self, param: Rc<ParsedParameter>) {
        self.params.borrow_mut().push(param);
    }
}

impl JniMethod for ParsedMethod {
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
        match mode {
            BitMode::B32 => self.ret32.clone(),
            BitMode::B64 => self.ret64.clone(),
        }
    }
    fn param_types(&self, mode: BitMode) -> Vec<Type> {
        match mode {
            BitMode::B32 => self.param_types32.clone(),
            BitMode::B64 => self.param_types64.clone(),
        }
    }
    fn decl_offset(&self) -> Option<usize> {
        Some(self.decl_offset)
    }
    fn is_name_unique(&self) -> bool {
        if let Some(unique) = self.unique.get() {
            return unique;
        }
        let unique = match self.class.borrow().upgrade() {
            Some(class) => {
                let siblings = class.methods.borrow();
                let natives_sharing_name = siblings
                    .iter()
                    .filter(|m| m.modifiers.contains(Modifier::Native) && m.name == self.name)
                    .count();
                natives_sharing_name <= 1
            }
            None => true,
        };
        self.unique.set(Some(unique));
        unique
    }
    fn meta(&self) -> MetaRef {
        self.meta.clone()
    }
}

/// A parameter of a parsed method. The type always comes from the owning
/// method's parameter-type vectors.
pub struct ParsedParameter {
    method: RefCell<Weak<ParsedMethod>>,
    index: usize,
    name: String,
    meta: MetaRef,
}

impl ParsedParameter {
    pub(crate) fn new(index: usize, name: String, meta: MetaRef) -> Rc<Self> {
        Rc::new(ParsedParameter { method: RefCell::new(Weak::new()), index, name, meta })
    }

    pub(crate) fn attach(self: &Rc<Self>, method: &Rc<ParsedMethod>) {
        *self.method.borrow_mut() = Rc::downgrade(method);
    }
}

impl JniParameter for ParsedParameter {
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
