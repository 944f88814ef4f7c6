//! jnigen CLI - generates the JNI glue for one platform class batch.

use clap::Parser;
use jnigen::{
    app::{GenConfig, Progress},
    model::BitMode,
};
use std::path::PathBuf;
use std::process;

/// Generate JNI natives, struct marshalling code and call statistics from
/// Java declarations
#[derive(Parser, Debug)]
#[command(name = "jnigen")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the main platform class (.java source or compiled .class);
    /// sibling classes in its directory join the batch
    #[arg(value_name = "MAIN_CLASS")]
    main_class: PathBuf,

    /// Base name of the output files (default: the main class's simple name,
    /// lowercased)
    #[arg(short, long, value_name = "NAME")]
    platform: Option<String>,

    /// Directory the generated files are written to
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    output_dir: PathBuf,

    /// Directory holding the .properties metadata files
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    metadata: PathBuf,

    /// Pointer width of the target build
    #[arg(long, default_value = "64", value_parser = ["32", "64"])]
    bits: String,

    /// Emit C++ spellings (env->F calls, extern "C" prototypes)
    #[arg(long)]
    cpp: bool,

    /// Skip the NATIVE_ENTER/NATIVE_EXIT instrumentation macros
    #[arg(long)]
    no_enter_exit: bool,

    /// Splice metadata back into the Java sources as javadoc tags
    #[arg(long)]
    embed: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Reports each generated function and output file at debug level.
struct LogProgress;

impl Progress for LogProgress {
    fn step(&mut self, message: &str) {
        log::debug!("{message}");
    }
}

fn main() {
    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    pretty_env_logger::formatted_builder()
        .filter_level(level)
        .parse_default_env()
        .init();

    let platform = match args.platform {
        Some(platform) => platform,
        None => match args.main_class.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_lowercase(),
            None => {
                log::error!("cannot derive a platform name from {}", args.main_class.display());
                process::exit(1);
            }
        },
    };
    let config = GenConfig {
        main_class: args.main_class,
        platform,
        output_dir: args.output_dir,
        metadata_dir: args.metadata,
        bit_mode: if args.bits == "32" { BitMode::B32 } else { BitMode::B64 },
        cpp: args.cpp,
        enter_exit: !args.no_enter_exit,
        embed: args.embed,
    };

    if let Err(err) = jnigen::app::run(&config, &mut LogProgress) {
        log::error!("{err}");
        process::exit(1);
    }
}
