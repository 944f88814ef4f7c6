//! The code generators: JNI natives, struct accessors, call statistics,
//! metadata serialization and source tag embedding.
//!
//! Every generator renders into an [`Output`] buffer and goes to disk through
//! [`write_if_changed`], so a rerun over unchanged input touches nothing.

pub mod embed;
pub mod metadata;
pub mod natives;
pub mod stats;
pub mod structs;

use crate::{meta::SharedMetaData, Result};
use std::{fmt, path::Path};

/// Metadata key holding the verbatim copyright block for generated files.
pub const COPYRIGHT_KEY: &str = "swt_copyright";

const BANNER: &str = "/* Note: This file was auto-generated by jnigen */\n\
                      /* DO NOT EDIT - your changes will be lost. */\n";

/// A generated-file buffer.
///
/// Lines are pushed with the exact indentation they should carry in the
/// output; nothing here reformats.
#[derive(Default)]
pub struct Output {
    buf: String,
}

impl Output {
    pub fn new() -> Self {
        Output::default()
    }

    /// Starts a buffer with the copyright block (when the store has one) and
    /// the auto-generation banner.
    pub fn with_header(store: &SharedMetaData) -> Self {
        let mut out = Output::new();
        if let Some(copyright) = store.borrow().get(COPYRIGHT_KEY) {
            out.push(copyright);
            if !copyright.ends_with('\n') {
                out.push("\n");
            }
        }
        out.push(BANNER);
        out.blank();
        out
    }

    pub fn push(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    pub fn line(&mut self, text: &str) {
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

impl fmt::Write for Output {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buf.push_str(s);
        Ok(())
    }
}

/// A JNI function invocation in either C (`(*env)->F(env, ...)`) or C++
/// (`env->F(...)`) spelling.
pub(crate) fn env_call(cpp: bool, function: &str, args: &[&str]) -> String {
    if cpp {
        format!("env->{function}({})", args.join(", "))
    } else if args.is_empty() {
        format!("(*env)->{function}(env)")
    } else {
        format!("(*env)->{function}(env, {})", args.join(", "))
    }
}

/// Writes `content` to `path` unless the file already holds the same text.
///
/// The leading copyright block is skipped on both sides of the comparison, so
/// a copyright-year change alone never forces a rewrite. Returns whether the
/// file was written.
pub fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    if let Ok(existing) = std::fs::read_to_string(path) {
        if skip_copyright(&existing) == skip_copyright(content) {
            return Ok(false);
        }
    }
    std::fs::write(path, content)?;
    Ok(true)
}

/// Strips the leading `/* ... */` copyright block, if any. The banner block
/// is not a copyright block and is kept.
fn skip_copyright(text: &str) -> &str {
    let trimmed = text.trim_start();
    if trimmed.starts_with("/*") && !trimmed.starts_with("/* Note:") {
        if let Some(end) = trimmed.find("*/") {
            return &trimmed[end + 2..];
        }
    }
    text
}
