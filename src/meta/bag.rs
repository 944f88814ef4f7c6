//! The attribute-bag mini-DSL.
//!
//! A bag serializes to comma-separated `key=value` segments. Values may be
//! unquoted, single-quoted or double-quoted; the reserved key `flags` holds a
//! space-separated list. The serialized form is the source of truth: bags are
//! reparsed from it on demand and rewritten in full after every mutation.

use crate::meta::Flag;
use log::warn;
use std::collections::BTreeMap;

/// A single attribute value: a scalar, or (for `flags` only) a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Scalar(String),
    List(Vec<String>),
}

impl Value {
    fn flattened(&self) -> String {
        match self {
            Value::Scalar(s) => s.clone(),
            Value::List(items) => items.join(" "),
        }
    }
}

/// An entity's parsed attribute bag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemData {
    values: BTreeMap<String, Value>,
}

impl ItemData {
    pub fn new() -> Self {
        ItemData::default()
    }

    /// Parses the serialized bag format.
    ///
    /// A segment without `=` is reported and skipped; parsing continues with
    /// the remaining segments. Text between a closing quote and the next comma
    /// is discarded.
    pub fn parse(text: &str) -> Self {
        let mut values = BTreeMap::new();
        let chars: Vec<char> = text.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            // key runs to the first '=' in the segment
            let start = i;
            while i < chars.len() && chars[i] != '=' && chars[i] != ',' {
                i += 1;
            }
            if i >= chars.len() || chars[i] == ',' {
                let segment: String = chars[start..i].iter().collect();
                if !segment.is_empty() {
                    warn!("bad attribute segment (no '='): {segment:?}");
                }
                i += 1;
                continue;
            }
            let key: String = chars[start..i].iter().collect();
            i += 1;

            // value: quoted or plain, terminated by the next comma
            let value: String;
            if i < chars.len() && (chars[i] == '"' || chars[i] == '\'') {
                let quote = chars[i];
                i += 1;
                let value_start = i;
                while i < chars.len() && chars[i] != quote {
                    i += 1;
                }
                value = chars[value_start..i].iter().collect();
                // skip the closing quote and any stray text before the comma
                while i < chars.len() && chars[i] != ',' {
                    i += 1;
                }
            } else {
                let value_start = i;
                while i < chars.len() && chars[i] != ',' {
                    i += 1;
                }
                value = chars[value_start..i].iter().collect();
            }
            i += 1;

            if key == "flags" {
                let flags = value.split_whitespace().map(str::to_owned).collect();
                values.insert(key, Value::List(flags));
            } else {
                values.insert(key, Value::Scalar(value));
            }
        }
        ItemData { values }
    }

    /// Serializes the bag deterministically: keys sorted ascending, lists
    /// joined with single spaces, empty values omitted. A value is quoted only
    /// if it contains a comma; double quotes are preferred unless the value
    /// itself contains one.
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.values {
            let flat = value.flattened();
            if flat.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(',');
            }
            out.push_str(key);
            out.push('=');
            if flat.contains(',') {
                let quote = if flat.contains('"') { '\'' } else { '"' };
                out.push(quote);
                out.push_str(&flat);
                out.push(quote);
            } else {
                out.push_str(&flat);
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(|v| v.flattened().is_empty())
    }

    /// The `flags` list, or empty if absent.
    pub fn flags(&self) -> Vec<String> {
        match self.values.get("flags") {
            Some(Value::List(flags)) => flags.clone(),
            Some(Value::Scalar(s)) => s.split_whitespace().map(str::to_owned).collect(),
            None => Vec::new(),
        }
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        self.has_flag_str(flag.as_str())
    }

    pub fn has_flag_str(&self, flag: &str) -> bool {
        match self.values.get("flags") {
            Some(Value::List(flags)) => flags.iter().any(|f| f == flag),
            _ => false,
        }
    }

    pub fn set_flags(&mut self, flags: &[&str]) {
        let flags: Vec<String> = flags.iter().map(|f| (*f).to_owned()).collect();
        self.values.insert("flags".to_owned(), Value::List(flags));
    }

    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        let mut flags = self.flags();
        let name = flag.as_str();
        if value {
            if !flags.iter().any(|f| f == name) {
                flags.push(name.to_owned());
            }
        } else {
            flags.retain(|f| f != name);
        }
        self.values.insert("flags".to_owned(), Value::List(flags));
    }

    /// A scalar parameter, or `""` if absent.
    pub fn param(&self, key: &str) -> String {
        match self.values.get(key) {
            Some(value) => value.flattened(),
            None => String::new(),
        }
    }

    pub fn set_param(&mut self, key: &str, value: &str) {
        if key == "flags" {
            let flags = value.split_whitespace().map(str::to_owned).collect();
            self.values.insert(key.to_owned(), Value::List(flags));
        } else {
            self.values.insert(key.to_owned(), Value::Scalar(value.to_owned()));
        }
    }

    /// The `exclude` conditional-compilation guard text, or `""`.
    pub fn exclude(&self) -> String {
        self.param("exclude")
    }

    /// The `cast` text with parentheses added when the raw value lacks them.
    pub fn cast(&self) -> String {
        let mut cast = self.param("cast").trim().to_owned();
        if !cast.is_empty() {
            if !cast.starts_with('(') {
                cast.insert(0, '(');
            }
            if !cast.ends_with(')') {
                cast.push(')');
            }
        }
        cast
    }

    /// The `accessor` override used by C++ method/field call shapes, or `""`.
    pub fn accessor(&self) -> String {
        self.param("accessor")
    }

    /// Whether code should be generated for this entity (`no_gen` absent).
    pub fn generate(&self) -> bool {
        !self.has_flag(Flag::NoGen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_scenario() {
        let bag = ItemData::parse("exclude=#ifdef _WIN32,cast=(int),flags=no_gen struct");
        assert_eq!(bag.exclude(), "#ifdef _WIN32");
        assert_eq!(bag.cast(), "(int)");
        assert_eq!(bag.flags(), vec!["no_gen".to_owned(), "struct".to_owned()]);
        assert!(!bag.generate());
        assert!(bag.has_flag(Flag::Struct));
        assert!(!bag.has_flag(Flag::Critical));
    }

    #[test]
    fn cast_auto_parens() {
        let bag = ItemData::parse("cast=int *");
        assert_eq!(bag.cast(), "(int *)");
    }

    #[test]
    fn flatten_sorts_and_omits_empty() {
        let mut bag = ItemData::new();
        bag.set_flags(&["a", "b"]);
        bag.set_param("name", "");
        assert_eq!(bag.flatten(), "flags=a b");
    }

    #[test]
    fn flatten_quotes_commas() {
        let mut bag = ItemData::new();
        bag.set_param("exclude", "#if defined(a), defined(b)");
        assert_eq!(bag.flatten(), "exclude=\"#if defined(a), defined(b)\"");
        let reparsed = ItemData::parse(&bag.flatten());
        assert_eq!(reparsed, bag);
    }

    #[test]
    fn flatten_single_quotes_when_value_has_double_quote() {
        let mut bag = ItemData::new();
        bag.set_param("msg", "a \"b\", c");
        assert_eq!(bag.flatten(), "msg='a \"b\", c'");
        let reparsed = ItemData::parse(&bag.flatten());
        assert_eq!(reparsed, bag);
    }

    #[test]
    fn quoted_value_skips_trailing_garbage() {
        let bag = ItemData::parse("a=\"x,y\"zzz,b=2");
        assert_eq!(bag.param("a"), "x,y");
        assert_eq!(bag.param("b"), "2");
    }

    #[test]
    fn bad_segment_is_skipped() {
        let bag = ItemData::parse("oops,a=1");
        assert_eq!(bag.param("a"), "1");
        assert_eq!(bag.param("oops"), "");
    }

    #[test]
    fn round_trip() {
        let cases = [
            "a=1,b=two,flags=x y z",
            "cast=(jint),exclude=\"#if a, b\"",
            "accessor=foo_bar",
        ];
        for case in cases {
            let bag = ItemData::parse(case);
            assert_eq!(ItemData::parse(&bag.flatten()), bag, "case {case:?}");
        }
    }

    #[test]
    fn set_flag_round_trips_through_flatten() {
        let mut bag = ItemData::parse("flags=no_in");
        bag.set_flag(Flag::Critical, true);
        bag.set_flag(Flag::NoIn, false);
        assert_eq!(bag.flatten(), "flags=critical");
    }
}
