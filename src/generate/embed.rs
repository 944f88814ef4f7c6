//! Embeds attribute bags back into the Java source as javadoc tags, so the
//! metadata travels with the declarations it describes.

use crate::{
    model::{JniClass, JniMethod},
    Result,
};
use std::ops::Range;

const TAGS: [&str; 4] = ["@jniclass", "@field", "@method", "@param"];

/// Rewrites the class's source file so every declaration carries a javadoc
/// tag block matching its current bag. Existing tag blocks are replaced in
/// place; blocks whose bags have emptied are removed. Plain prose javadoc is
/// never touched. The file is only written when its content changes.
pub fn embed(class: &dyn JniClass) -> Result<()> {
    let Some(path) = class.source_path() else {
        return Ok(());
    };
    let source = std::fs::read_to_string(&path)?;
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();

    if let Some(offset) = class.decl_offset() {
        let mut lines = Vec::new();
        let bag = class.meta().bag();
        if !bag.is_empty() {
            lines.push(format!("@jniclass {}", bag.flatten()));
        }
        push_edit(&mut edits, &source, offset, &lines);
    }
    for field in class.fields() {
        let Some(offset) = field.decl_offset() else {
            continue;
        };
        let mut lines = Vec::new();
        let bag = field.meta().bag();
        if !bag.is_empty() {
            lines.push(format!("@field {}", bag.flatten()));
        }
        push_edit(&mut edits, &source, offset, &lines);
    }
    for method in class.methods() {
        let Some(offset) = method.decl_offset() else {
            continue;
        };
        push_edit(&mut edits, &source, offset, &method_tags(method.as_ref()));
    }

    // Splicing back to front keeps the remaining offsets valid.
    edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));
    let mut updated = source.clone();
    for (range, text) in edits {
        updated.replace_range(range, &text);
    }
    if updated != source {
        std::fs::write(&path, updated)?;
    }
    Ok(())
}

fn method_tags(method: &dyn JniMethod) -> Vec<String> {
    let mut lines = Vec::new();
    let bag = method.meta().bag();
    if !bag.is_empty() {
        lines.push(format!("@method {}", bag.flatten()));
    }
    for param in method.params() {
        let bag = param.meta().bag();
        if !bag.is_empty() {
            lines.push(format!("@param {} {}", param.name(), bag.flatten()));
        }
    }
    lines
}

fn push_edit(
    edits: &mut Vec<(Range<usize>, String)>,
    source: &str,
    offset: usize,
    lines: &[String],
) {
    let existing = tag_doc_range(source, offset);
    if lines.is_empty() {
        if let Some(range) = existing {
            edits.push((range, String::new()));
        }
        return;
    }
    let indent = line_indent(source, offset);
    let mut text = if lines.len() == 1 {
        format!("/** {} */", lines[0])
    } else {
        let mut block = String::from("/**");
        for line in lines {
            block.push('\n');
            block.push_str(&indent);
            block.push_str(" * ");
            block.push_str(line);
        }
        block.push('\n');
        block.push_str(&indent);
        block.push_str(" */");
        block
    };
    text.push('\n');
    text.push_str(&indent);
    match existing {
        Some(range) => edits.push((range, text)),
        None => edits.push((offset..offset, text)),
    }
}

/// The span of a tag-bearing javadoc block immediately preceding `offset`,
/// including the whitespace between it and the declaration. Comments without
/// a recognized tag are left alone.
fn tag_doc_range(source: &str, offset: usize) -> Option<Range<usize>> {
    let head = &source[..offset];
    let trimmed = head.trim_end();
    if !trimmed.ends_with("*/") {
        return None;
    }
    let start = trimmed.rfind("/**")?;
    let block = &trimmed[start..];
    if block[3..].contains("/*") {
        return None;
    }
    if !TAGS.iter().any(|tag| block.contains(tag)) {
        return None;
    }
    Some(start..offset)
}

/// The leading whitespace of the line `offset` sits on, used to indent an
/// inserted block to match its declaration.
fn line_indent(source: &str, offset: usize) -> String {
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let prefix = &source[line_start..offset];
    if prefix.chars().all(|c| c == ' ' || c == '\t') {
        prefix.to_owned()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{shared, MetaData};
    use crate::model::parsed::Loader;

    fn load(dir: &std::path::Path, name: &str, meta: MetaData) -> crate::model::ClassRef {
        Loader::new(shared(meta)).load(&dir.join(name)).unwrap()
    }

    #[test]
    fn inserts_tags_for_seeded_bags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("OS.java");
        std::fs::write(
            &path,
            "public class OS {\n\tpublic static final native int Beep(int hwnd);\n}\n",
        )
        .unwrap();
        let mut meta = MetaData::new();
        meta.set("OS_Beep_0", "cast=(HWND)");
        meta.set("OS_Beep", "flags=dynamic");
        let class = load(dir.path(), "OS.java", meta);
        embed(class.as_ref()).unwrap();
        let updated = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            updated,
            "public class OS {\n\
             \t/**\n\
             \t * @method flags=dynamic\n\
             \t * @param hwnd cast=(HWND)\n\
             \t */\n\
             \tpublic static final native int Beep(int hwnd);\n}\n"
        );
    }

    #[test]
    fn rewrites_stale_tags_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("OS.java");
        std::fs::write(
            &path,
            "public class OS {\n\
             \t/** @method flags=no_gen */\n\
             \tpublic static final native int Beep(int hwnd);\n}\n",
        )
        .unwrap();
        let class = load(dir.path(), "OS.java", MetaData::new());
        class.methods()[0].meta().set_flags(&["dynamic"]);
        embed(class.as_ref()).unwrap();
        let updated = std::fs::read_to_string(&path).unwrap();
        assert!(updated.contains("\t/** @method flags=dynamic */\n\tpublic static"), "{updated}");
        assert!(!updated.contains("no_gen"));

        // a second pass finds nothing to change
        let before = std::fs::metadata(&path).unwrap().modified().unwrap();
        let class = load(dir.path(), "OS.java", MetaData::new());
        embed(class.as_ref()).unwrap();
        let rewritten = std::fs::read_to_string(&path).unwrap();
        assert_eq!(rewritten, updated);
        let after = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn prose_javadoc_is_left_alone_and_empty_bags_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("OS.java");
        std::fs::write(
            &path,
            "public class OS {\n\
             \t/** Rings the speaker. */\n\
             \tpublic static final native int Beep();\n\
             \t/** @field flags=no_gen */\n\
             \tpublic static int COUNT;\n}\n",
        )
        .unwrap();
        let class = load(dir.path(), "OS.java", MetaData::new());
        // clear the field bag after the javadoc seeded it
        class.fields()[0].meta().set_flags(&[]);
        embed(class.as_ref()).unwrap();
        let updated = std::fs::read_to_string(&path).unwrap();
        assert!(updated.contains("/** Rings the speaker. */"), "{updated}");
        assert!(!updated.contains("@field"), "{updated}");
    }
}
