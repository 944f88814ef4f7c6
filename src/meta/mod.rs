//! The metadata store and per-entity attribute bags.
//!
//! Generation metadata lives in `.properties`-style files keyed by
//! `<ClassSimpleName>_<member>[_<paramIndex>]`, with one file per dotted
//! prefix of the main class name. Entities hold a [`MetaRef`] into the shared
//! store; every bag mutation is immediately reflattened and written back so
//! the serialized form never drifts from the in-memory view.

mod bag;
mod flags;

pub use bag::{ItemData, Value};
pub use flags::Flag;

use crate::Result;
use jnigen_signatures::display_c_escaped;
use std::{
    cell::RefCell,
    collections::BTreeMap,
    path::Path,
    rc::Rc,
};

/// The flat string-keyed store backing all attribute bags in a run.
#[derive(Debug, Clone, Default)]
pub struct MetaData {
    values: BTreeMap<String, String>,
}

impl MetaData {
    pub fn new() -> Self {
        MetaData::default()
    }

    /// Loads the store for a main class by walking its dotted name prefix by
    /// prefix and merging each `<prefix>.properties` that exists under `dir`.
    /// Later prefixes override earlier keys.
    pub fn load(dir: &Path, main_class: &str) -> Result<Self> {
        let mut meta = MetaData::new();
        let mut prefix = String::new();
        for component in main_class.split('.') {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(component);
            let path = dir.join(format!("{prefix}.properties"));
            if path.exists() {
                let text = std::fs::read_to_string(&path)?;
                meta.merge_properties(&text);
            }
        }
        Ok(meta)
    }

    /// Merges `key=value` properties text into the store, overriding existing
    /// keys. Supports `#`/`!` comments and trailing-backslash continuations.
    pub fn merge_properties(&mut self, text: &str) {
        let mut lines = text.lines();
        while let Some(line) = lines.next() {
            let mut line = line.trim_start().to_owned();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            while line.ends_with('\\') {
                line.pop();
                match lines.next() {
                    Some(next) => line.push_str(next.trim_start()),
                    None => break,
                }
            }
            if let Some((key, value)) = line.split_once('=') {
                self.values.insert(key.trim().to_owned(), value.to_owned());
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Sets a key; an empty value removes it.
    pub fn set(&mut self, key: &str, value: &str) {
        if value.is_empty() {
            self.values.remove(key);
        } else {
            self.values.insert(key.to_owned(), value.to_owned());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// The store handle shared by every entity of a run.
pub type SharedMetaData = Rc<RefCell<MetaData>>;

pub fn shared(meta: MetaData) -> SharedMetaData {
    Rc::new(RefCell::new(meta))
}

/// Key for a class entity. The simple name is C-escaped, matching the
/// convention used for generated symbol names.
pub fn class_key(class_simple_name: &str) -> String {
    display_c_escaped(class_simple_name).to_string()
}

/// Key for a field or method member. Method members pass their mangled
/// function name, which is already C-escaped.
pub fn member_key(class_simple_name: &str, member: &str) -> String {
    format!("{}_{}", display_c_escaped(class_simple_name), member)
}

/// Key for a method parameter by zero-based index.
pub fn param_key(class_simple_name: &str, function_name: &str, index: usize) -> String {
    format!("{}_{}_{}", display_c_escaped(class_simple_name), function_name, index)
}

/// One entity's live view into the store.
///
/// The bag is not cached: reads reparse the stored text and writes reflatten
/// the whole bag back into the store.
#[derive(Clone)]
pub struct MetaRef {
    store: SharedMetaData,
    key: String,
}

impl MetaRef {
    pub fn new(store: SharedMetaData, key: String) -> Self {
        MetaRef { store, key }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reconstructs the bag from its stored serialized form.
    pub fn bag(&self) -> ItemData {
        match self.store.borrow().get(&self.key) {
            Some(text) => ItemData::parse(text),
            None => ItemData::new(),
        }
    }

    fn write(&self, bag: &ItemData) {
        self.store.borrow_mut().set(&self.key, &bag.flatten());
    }

    /// Seeds this entity's bag from javadoc tag text, overriding any store
    /// entry; the declaration's own annotations win over the properties file.
    pub fn seed(&self, text: &str) {
        self.write(&ItemData::parse(text));
    }

    pub fn flags(&self) -> Vec<String> {
        self.bag().flags()
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        self.bag().has_flag(flag)
    }

    pub fn param(&self, key: &str) -> String {
        self.bag().param(key)
    }

    pub fn cast(&self) -> String {
        self.bag().cast()
    }

    pub fn exclude(&self) -> String {
        self.bag().exclude()
    }

    pub fn accessor(&self) -> String {
        self.bag().accessor()
    }

    pub fn generate(&self) -> bool {
        self.bag().generate()
    }

    pub fn set_flags(&self, flags: &[&str]) {
        let mut bag = self.bag();
        bag.set_flags(flags);
        self.write(&bag);
    }

    pub fn set_flag(&self, flag: Flag, value: bool) {
        let mut bag = self.bag();
        bag.set_flag(flag, value);
        self.write(&bag);
    }

    pub fn set_param(&self, key: &str, value: &str) {
        let mut bag = self.bag();
        bag.set_param(key, value);
        self.write(&bag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_merge_and_override() {
        let mut meta = MetaData::new();
        meta.merge_properties("# comment\nOS_foo=flags=no_gen\nOS_bar=cast=int\n");
        meta.merge_properties("OS_foo=flags=critical\n");
        assert_eq!(meta.get("OS_foo"), Some("flags=critical"));
        assert_eq!(meta.get("OS_bar"), Some("cast=int"));
    }

    #[test]
    fn properties_continuation() {
        let mut meta = MetaData::new();
        meta.merge_properties("OS_long=a=1,\\\n    b=2\n");
        assert_eq!(meta.get("OS_long"), Some("a=1,b=2"));
    }

    #[test]
    fn load_walks_prefixes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("org.properties"), "OS_x=flags=no_gen\nOS_y=a=1\n")
            .unwrap();
        std::fs::write(dir.path().join("org.example.properties"), "OS_x=flags=critical\n")
            .unwrap();
        let meta = MetaData::load(dir.path(), "org.example.OS").unwrap();
        assert_eq!(meta.get("OS_x"), Some("flags=critical"));
        assert_eq!(meta.get("OS_y"), Some("a=1"));
    }

    #[test]
    fn meta_ref_mutation_writes_back() {
        let store = shared(MetaData::new());
        let item = MetaRef::new(store.clone(), "OS_foo".to_owned());
        item.set_param("cast", "(int)");
        item.set_flag(Flag::Critical, true);
        assert_eq!(store.borrow().get("OS_foo"), Some("cast=(int),flags=critical"));
        assert!(item.has_flag(Flag::Critical));
        assert_eq!(item.cast(), "(int)");
    }

    #[test]
    fn keys_are_escaped() {
        assert_eq!(member_key("NSObject_ext", "alloc"), "NSObject_1ext_alloc");
        assert_eq!(param_key("OS", "memmove", 1), "OS_memmove_1");
    }
}
