//! Compilation of input files into registration source
//!
//! One run produces a single generated module: a `register_all` function
//! performing one `filepack::register` call per input, followed by one
//! byte-string payload per input. The caller declares the generated file as
//! a module and calls `register_all()` during startup, which is the Rust
//! analogue of registering on import.

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Options controlling one compiler run.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Name of the generated module; must be a valid Rust identifier. The
    /// output file is named `<pkg>.rs`.
    pub pkg: String,
    /// Directory the generated module is written into.
    pub out_dir: PathBuf,
    /// Prefix trimmed from each input path before registration.
    pub trim_prefix: String,
    /// Prefix joined onto each registered path.
    pub add_prefix: String,
    /// Register each file under its base name only.
    pub base_only: bool,
}

/// One input file compiled into the generated module.
#[derive(Debug)]
pub struct CompiledFile {
    /// The input path as matched on disk.
    pub input: String,
    /// The path the file is registered under.
    pub name: String,
    /// Raw size in bytes.
    pub raw_len: usize,
    /// Compressed payload size in bytes.
    pub packed_len: usize,
}

/// Result of a compiler run.
#[derive(Debug)]
pub struct Output {
    /// Path of the generated module file.
    pub path: PathBuf,
    /// The files it registers, in emission order.
    pub files: Vec<CompiledFile>,
}

/// Compile every file matched by `patterns` into one generated source file
/// under `opts.out_dir`.
///
/// Fails on an empty pattern list, an invalid module name, an invalid glob
/// pattern, an unreadable input, a compression failure, or a write failure.
pub fn compile(opts: &Options, patterns: &[String]) -> Result<Output> {
    if patterns.is_empty() {
        bail!("at least one input glob is required");
    }
    check_module_name(&opts.pkg)?;

    let inputs = expand_globs(patterns)?;
    let mut files = Vec::new();
    let mut calls = Vec::new();
    let mut payloads = Vec::new();

    for (index, input) in inputs.iter().enumerate() {
        let input = input.to_string_lossy().into_owned();
        let raw = fs::read(&input).with_context(|| format!("reading {input:?}"))?;
        let packed = filepack::codec::encode(&raw)
            .with_context(|| format!("encoding {input:?}"))?;
        let name = registered_name(opts, &input);
        let var = format!("FILE_DATA_{}", index + 1);

        writeln!(calls, "    filepack::register({name:?}, {var});")?;
        writeln!(
            payloads,
            "\n// {} bytes generated from {:?}.",
            raw.len(),
            input
        )?;
        write!(payloads, "static {var}: &[u8] = ")?;
        filepack::codec::to_source(&mut payloads, &packed)?;
        writeln!(payloads, ";")?;

        files.push(CompiledFile {
            input,
            name,
            raw_len: raw.len(),
            packed_len: packed.len(),
        });
    }

    let mut src = Vec::new();
    writeln!(src, "//! Compiled static file data. DO NOT EDIT.")?;
    writeln!(src, "//!")?;
    writeln!(src, "//! Generated by: {}", invocation(opts, patterns))?;
    writeln!(src, "//!")?;
    writeln!(
        src,
        "//! Declare this file as a module and call [`register_all`] once during"
    )?;
    writeln!(src, "//! program startup.")?;
    writeln!(src)?;
    writeln!(
        src,
        "/// Register every compiled file with the global filepack registry."
    )?;
    writeln!(src, "pub fn register_all() {{")?;
    src.write_all(&calls)?;
    writeln!(src, "}}")?;
    src.write_all(&payloads)?;

    fs::create_dir_all(&opts.out_dir)
        .with_context(|| format!("creating output directory {:?}", opts.out_dir))?;
    let path = opts.out_dir.join(format!("{}.rs", opts.pkg));
    fs::write(&path, &src).with_context(|| format!("writing {path:?}"))?;

    Ok(Output { path, files })
}

/// Expand glob patterns to the ordinary files they match. Directories and
/// other non-files are silently skipped; each pattern's matches come back
/// in sorted order.
pub fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for pattern in patterns {
        let matches =
            glob::glob(pattern).with_context(|| format!("invalid glob pattern {pattern:?}"))?;
        for entry in matches {
            let path = entry.with_context(|| format!("expanding {pattern:?}"))?;
            if path.is_file() {
                inputs.push(path);
            }
        }
    }
    Ok(inputs)
}

/// The path a file is registered under: the input path with the trim
/// prefix removed and the add prefix joined on, or just its base name under
/// `base_only`. The registry cleans the result again at registration time.
fn registered_name(opts: &Options, input: &str) -> String {
    let trimmed = input.strip_prefix(&opts.trim_prefix).unwrap_or(input);
    let tail = if opts.base_only {
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    } else {
        trimmed
    };
    let tail = tail.trim_start_matches('/');
    if opts.add_prefix.is_empty() {
        tail.to_string()
    } else {
        format!("{}/{}", opts.add_prefix.trim_end_matches('/'), tail)
    }
}

/// Require a valid Rust identifier, since `pkg` names the generated module.
fn check_module_name(pkg: &str) -> Result<()> {
    let mut chars = pkg.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if !valid {
        bail!("package name {pkg:?} is not a valid module identifier");
    }
    Ok(())
}

/// The command line recorded in the generated header.
fn invocation(opts: &Options, patterns: &[String]) -> String {
    let mut parts = vec!["filepack-compile".to_string(), format!("--pkg {}", opts.pkg)];
    if opts.out_dir != Path::new(".") {
        parts.push(format!("--out {}", opts.out_dir.display()));
    }
    if !opts.trim_prefix.is_empty() {
        parts.push(format!("--trim {}", opts.trim_prefix));
    }
    if !opts.add_prefix.is_empty() {
        parts.push(format!("--add {}", opts.add_prefix));
    }
    if opts.base_only {
        parts.push("--base".to_string());
    }
    parts.extend(patterns.iter().cloned());
    parts.join(" ")
}
