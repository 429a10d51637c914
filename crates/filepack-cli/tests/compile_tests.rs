//! End-to-end compiler runs over a temporary directory tree.
//!
//! The emitted byte-string literals are unescaped with the same rules the
//! Rust compiler applies, then decompressed and compared against the input
//! files, so a run is checked all the way from disk to registered payload.

use filepack_cli::compile::{compile, Options};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Unescape a Rust byte-string literal starting at `b"`, applying `\xNN`,
/// `\\`, `\"`, and the line-continuation escape.
fn unescape_literal(literal: &str) -> Vec<u8> {
    let body = literal
        .strip_prefix("b\"")
        .expect("literal starts with b\"");
    let mut out = Vec::new();
    let mut bytes = body.bytes().peekable();
    while let Some(b) = bytes.next() {
        match b {
            b'"' => return out,
            b'\\' => match bytes.next().expect("dangling escape") {
                b'x' => {
                    let hi = bytes.next().expect("hex digit") as char;
                    let lo = bytes.next().expect("hex digit") as char;
                    let hi = hi.to_digit(16).expect("hex digit") as u8;
                    let lo = lo.to_digit(16).expect("hex digit") as u8;
                    out.push(hi << 4 | lo);
                }
                b'\n' => {
                    while bytes
                        .peek()
                        .is_some_and(|&b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
                    {
                        bytes.next();
                    }
                }
                esc @ (b'\\' | b'"') => out.push(esc),
                other => panic!("unexpected escape \\{}", other as char),
            },
            raw => out.push(raw),
        }
    }
    panic!("unterminated literal");
}

/// Pull the payload literal for `var` out of generated source text.
fn extract_payload(src: &str, var: &str) -> Vec<u8> {
    let marker = format!("static {var}: &[u8] = ");
    let start = src.find(&marker).expect("payload static present") + marker.len();
    unescape_literal(&src[start..])
}

fn write_tree(root: &Path) {
    fs::create_dir_all(root.join("static/css")).unwrap();
    fs::write(root.join("static/css/site.css"), "body { margin: 0 }\n").unwrap();
    fs::write(root.join("static/index.html"), "<html>\"quoted\" \\ done</html>").unwrap();
    let binary: Vec<u8> = (0..=255u8).cycle().take(2048).collect();
    fs::write(root.join("static/blob.bin"), &binary).unwrap();
}

#[test]
fn compile_emits_decodable_payloads() {
    let tmp = TempDir::new().unwrap();
    write_tree(tmp.path());

    let options = Options {
        pkg: "assets".to_string(),
        out_dir: tmp.path().join("gen"),
        trim_prefix: format!("{}/", tmp.path().display()),
        ..Options::default()
    };
    let pattern = format!("{}/static/**/*", tmp.path().display());
    let output = compile(&options, &[pattern]).unwrap();

    assert_eq!(output.path, tmp.path().join("gen/assets.rs"));
    // The css subdirectory matched the glob but is not a regular file.
    assert_eq!(output.files.len(), 3);

    let src = fs::read_to_string(&output.path).unwrap();
    assert!(src.starts_with("//! Compiled static file data. DO NOT EDIT."));
    assert!(src.contains("pub fn register_all()"));

    for (index, file) in output.files.iter().enumerate() {
        let registered = format!(
            "filepack::register({:?}, FILE_DATA_{});",
            file.name,
            index + 1
        );
        assert!(src.contains(&registered), "missing {registered}");

        let payload = extract_payload(&src, &format!("FILE_DATA_{}", index + 1));
        assert_eq!(payload.len(), file.packed_len);
        let raw = filepack::codec::decode(&payload).unwrap();
        assert_eq!(raw, fs::read(&file.input).unwrap(), "payload of {}", file.input);
        assert_eq!(raw.len(), file.raw_len);
    }
}

#[test]
fn compile_applies_name_transforms() {
    let tmp = TempDir::new().unwrap();
    write_tree(tmp.path());

    let options = Options {
        pkg: "assets".to_string(),
        out_dir: tmp.path().join("gen"),
        trim_prefix: format!("{}/static/", tmp.path().display()),
        add_prefix: "www".to_string(),
        ..Options::default()
    };
    let pattern = format!("{}/static/*.html", tmp.path().display());
    let output = compile(&options, &[pattern]).unwrap();

    assert_eq!(output.files.len(), 1);
    assert_eq!(output.files[0].name, "www/index.html");
}

#[test]
fn compile_base_only_drops_directories() {
    let tmp = TempDir::new().unwrap();
    write_tree(tmp.path());

    let options = Options {
        pkg: "assets".to_string(),
        out_dir: tmp.path().join("gen"),
        base_only: true,
        ..Options::default()
    };
    let pattern = format!("{}/static/css/*.css", tmp.path().display());
    let output = compile(&options, &[pattern]).unwrap();

    assert_eq!(output.files.len(), 1);
    assert_eq!(output.files[0].name, "site.css");
}

#[test]
fn recompiling_unchanged_inputs_is_stable() {
    let tmp = TempDir::new().unwrap();
    write_tree(tmp.path());

    let options = Options {
        pkg: "assets".to_string(),
        out_dir: tmp.path().join("gen"),
        ..Options::default()
    };
    let pattern = format!("{}/static/blob.bin", tmp.path().display());

    let first = compile(&options, &[pattern.clone()]).unwrap();
    let first_src = fs::read_to_string(&first.path).unwrap();
    let second = compile(&options, &[pattern]).unwrap();
    let second_src = fs::read_to_string(&second.path).unwrap();
    assert_eq!(first_src, second_src);
}

#[test]
fn compile_with_no_matches_writes_an_empty_module() {
    let tmp = TempDir::new().unwrap();

    let options = Options {
        pkg: "assets".to_string(),
        out_dir: tmp.path().join("gen"),
        ..Options::default()
    };
    let pattern = format!("{}/nothing/*.txt", tmp.path().display());
    let output = compile(&options, &[pattern]).unwrap();

    assert!(output.files.is_empty());
    let src = fs::read_to_string(&output.path).unwrap();
    assert!(src.contains("pub fn register_all() {\n}"));
}

#[test]
fn compile_rejects_bad_module_names() {
    let tmp = TempDir::new().unwrap();
    let options = Options {
        pkg: "not-a-module".to_string(),
        out_dir: tmp.path().to_path_buf(),
        ..Options::default()
    };
    assert!(compile(&options, &["*.txt".to_string()]).is_err());
}

#[test]
fn compile_rejects_invalid_globs() {
    let tmp = TempDir::new().unwrap();
    let options = Options {
        pkg: "assets".to_string(),
        out_dir: tmp.path().to_path_buf(),
        ..Options::default()
    };
    assert!(compile(&options, &["a[".to_string()]).is_err());
}
