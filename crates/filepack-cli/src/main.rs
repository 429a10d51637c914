//! filepack-compile: compile static files into registration source

use clap::Parser;
use filepack_cli::compile::{compile, Options};
use std::path::PathBuf;

/// Compile static files into Rust source that registers their contents
/// with the filepack registry.
///
/// Each matched file is zlib-compressed and embedded into a generated
/// module named after --pkg. By default a file is registered under its
/// input path, less any leading path separators; use --trim to discard a
/// common prefix, --add to join a prefix onto each registered path, and
/// --base to keep only base names.
///
/// To use the compiled data, declare the generated file as a module and
/// call its register_all() function during startup; the files are then
/// readable through filepack::open and filepack::read_file.
#[derive(Parser)]
#[command(name = "filepack-compile", version, verbatim_doc_comment)]
struct Cli {
    /// Name of the generated module
    #[arg(long, short = 'p')]
    pkg: String,

    /// Output directory for the generated module
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Trim this prefix from each input path
    #[arg(long, default_value = "")]
    trim: String,

    /// Join this prefix onto each registered path
    #[arg(long, default_value = "")]
    add: String,

    /// Register each file under its base name only
    #[arg(long)]
    base: bool,

    /// Glob patterns selecting the files to compile
    #[arg(required = true, value_name = "GLOB")]
    globs: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let options = Options {
        pkg: cli.pkg,
        out_dir: cli.out,
        trim_prefix: cli.trim,
        add_prefix: cli.add,
        base_only: cli.base,
    };

    let output = compile(&options, &cli.globs)?;
    for file in &output.files {
        eprintln!(
            "compiled {} ({} bytes) as {} ({} bytes packed)",
            file.input, file.raw_len, file.name, file.packed_len
        );
    }
    eprintln!("wrote {}", output.path.display());
    Ok(())
}
