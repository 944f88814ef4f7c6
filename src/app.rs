//! The generation driver: loads the metadata store and the platform classes,
//! then runs each generator and writes its output with the change check.

use crate::{
    generate::{self, write_if_changed},
    meta::{shared, MetaData, SharedMetaData},
    model::{
        has_natives, introspected::ClassFileLoader, is_struct_class, parsed::Loader, BitMode,
        ClassRef, JniClass,
    },
    Result,
};
use std::path::{Path, PathBuf};

/// Progress feedback at generation checkpoints. Reporting never affects
/// control flow.
pub trait Progress {
    fn step(&mut self, message: &str);
}

/// The [`Progress`] that reports nothing.
pub struct NoProgress;

impl Progress for NoProgress {
    fn step(&mut self, _message: &str) {}
}

/// One generation run's settings.
pub struct GenConfig {
    /// The main platform class, either a `.java` source or a compiled
    /// `.class` file. Sibling classes are picked up from its directory.
    pub main_class: PathBuf,
    /// Base name of the output files (`<platform>.c` and friends).
    pub platform: String,
    pub output_dir: PathBuf,
    pub metadata_dir: PathBuf,
    pub bit_mode: BitMode,
    /// Emit C++ spellings: `env->F(...)` calls and `extern "C"` prototypes.
    pub cpp: bool,
    /// Emit the enter/exit instrumentation macro calls.
    pub enter_exit: bool,
    /// Run the embed generator, splicing metadata tags back into sources.
    pub embed: bool,
}

enum InputKind {
    Source,
    ClassFile,
}

fn input_kind(path: &Path) -> InputKind {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("class") => InputKind::ClassFile,
        _ => InputKind::Source,
    }
}

/// Runs the whole pipeline. A failing class or generator is logged and
/// skipped; only setup failures (store load, unreadable main class) are
/// fatal.
pub fn run(config: &GenConfig, progress: &mut dyn Progress) -> Result<()> {
    let fqn = main_class_fqn(config)?;
    let store = shared(MetaData::load(&config.metadata_dir, &fqn)?);
    let classes = load_classes(config, &store)?;

    let natives: Vec<ClassRef> = classes
        .iter()
        .filter(|c| has_natives(c.as_ref()))
        .cloned()
        .collect();
    let structs: Vec<ClassRef> = classes
        .iter()
        .filter(|c| is_struct_class(c.as_ref()))
        .cloned()
        .collect();
    log::info!(
        "loaded {} classes ({} with natives, {} struct-shaped)",
        classes.len(),
        natives.len(),
        structs.len()
    );

    let steps: [(&str, String); 6] = [
        (
            "{platform}.c",
            generate::natives::generate(config, &store, &natives, &mut *progress),
        ),
        (
            "{platform}_structs.h",
            generate::structs::generate_header(config, &store, &structs, &mut *progress),
        ),
        (
            "{platform}_structs.c",
            generate::structs::generate_source(config, &store, &structs, &mut *progress),
        ),
        (
            "{platform}_stats.h",
            generate::stats::generate_header(config, &store, &natives),
        ),
        (
            "{platform}_stats.c",
            generate::stats::generate_source(config, &store, &natives),
        ),
        (
            "{platform}.properties",
            generate::metadata::generate(&store),
        ),
    ];
    for (pattern, content) in steps {
        let name = pattern.replace("{platform}", &config.platform);
        let path = config.output_dir.join(&name);
        match write_if_changed(&path, &content) {
            Ok(true) => log::info!("wrote {}", path.display()),
            Ok(false) => log::debug!("unchanged {}", path.display()),
            Err(err) => log::error!("failed to write {}: {err}", path.display()),
        }
        progress.step(&name);
    }

    if config.embed {
        for class in &classes {
            if let Err(err) = generate::embed::embed(class.as_ref()) {
                log::error!("failed to embed metadata for {}: {err}", class.fqn());
            }
            progress.step(&class.simple_name());
        }
    }
    Ok(())
}

/// The main class's fully-qualified name, read from the file itself with a
/// throwaway store so the real store can be loaded by name prefix.
fn main_class_fqn(config: &GenConfig) -> Result<String> {
    let probe = shared(MetaData::new());
    Ok(match input_kind(&config.main_class) {
        InputKind::Source => Loader::new(probe).load(&config.main_class)?.fqn(),
        InputKind::ClassFile => ClassFileLoader::new(probe).load(&config.main_class)?.fqn(),
    })
}

/// Loads the main class and every loadable sibling of the same kind in its
/// directory, sorted by simple name. A class that fails to load is logged
/// and left out of the batch.
fn load_classes(config: &GenConfig, store: &SharedMetaData) -> Result<Vec<ClassRef>> {
    let dir = config
        .main_class
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let wanted_ext = match input_kind(&config.main_class) {
        InputKind::Source => "java",
        InputKind::ClassFile => "class",
    };
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some(wanted_ext) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut classes: Vec<ClassRef> = Vec::new();
    match input_kind(&config.main_class) {
        InputKind::Source => {
            let loader = Loader::new(store.clone());
            for path in &paths {
                match loader.load(path) {
                    Ok(class) => classes.push(class),
                    Err(err) => log::error!("skipping {}: {err}", path.display()),
                }
            }
        }
        InputKind::ClassFile => {
            let loader = ClassFileLoader::new(store.clone());
            for path in &paths {
                match loader.load(path) {
                    Ok(class) => classes.push(class),
                    Err(err) => log::error!("skipping {}: {err}", path.display()),
                }
            }
        }
    }
    classes.sort_by_key(|c| c.simple_name());
    Ok(classes)
}
