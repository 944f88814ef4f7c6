//! Writes the metadata store back out in properties form, with every
//! attribute bag re-flattened so hand-edited spacing and tag ordering
//! normalize to one canonical spelling.

use crate::meta::{ItemData, SharedMetaData};
use std::fmt::Write;

pub fn generate(store: &SharedMetaData) -> String {
    let mut out = String::new();
    for (key, value) in store.borrow().iter() {
        // Keys outside the entity namespaces (the copyright block among
        // them) hold free text, not bags; those pass through untouched.
        let value = if key.starts_with("swt_") {
            value.to_owned()
        } else {
            ItemData::parse(value).flatten()
        };
        let _ = writeln!(out, "{key}={value}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{shared, MetaData};

    #[test]
    fn bags_are_normalized_and_keys_sorted() {
        let mut meta = MetaData::new();
        meta.set("Test_f", "flags=no_gen  no_in,cast='(HWND)'");
        meta.set("Test_a", "accessor=foo,flags=dynamic");
        meta.set("swt_copyright", "/* hello */");
        let text = generate(&shared(meta));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Test_a=accessor=foo,flags=dynamic");
        assert_eq!(lines[1], "Test_f=cast=(HWND),flags=no_gen no_in");
        assert_eq!(lines[2], "swt_copyright=/* hello */");
    }
}
