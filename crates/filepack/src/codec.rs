//! Zlib codec for compiled file payloads
//!
//! Payloads are stored zlib-compressed and restored on first open;
//! `to_source` renders an encoded payload as a Rust byte-string literal for
//! the compiler CLI.

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{self, Read, Write};

/// Column width at which `to_source` wraps the emitted literal.
const MAX_WIDTH: usize = 120;

/// Compress raw file contents with zlib at maximum compression.
///
/// The output is deterministic for a given input and flate2 version, which
/// keeps regenerated payloads byte-identical for unchanged inputs.
pub fn encode(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Decompress encoded file contents back to raw form.
///
/// Corruption or truncation of the input surfaces as an error, never as a
/// panic or silently-wrong bytes.
pub fn decode(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut raw = Vec::new();
    decoder.read_to_end(&mut raw)?;
    Ok(raw)
}

/// Render `data` as a Rust byte-string literal, written to `w`.
///
/// Printable ASCII is emitted verbatim, quotes and backslashes get a
/// backslash escape, and every other byte becomes `\xNN`. Lines are wrapped
/// near [`MAX_WIDTH`] columns with the string-continuation escape. The
/// continuation escape swallows leading whitespace on the following line, so
/// a space that lands at a line start is emitted as `\x20`.
pub fn to_source<W: Write>(w: &mut W, data: &[u8]) -> io::Result<()> {
    w.write_all(b"b\"")?;

    let mut pos = 2;
    let mut at_line_start = false;
    for &b in data {
        if at_line_start && b == b' ' {
            write!(w, "\\x20")?;
            pos += 4;
        } else if b == b'"' || b == b'\\' {
            w.write_all(&[b'\\', b])?;
            pos += 2;
        } else if (b' '..=b'~').contains(&b) {
            w.write_all(&[b])?;
            pos += 1;
        } else {
            write!(w, "\\x{b:02x}")?;
            pos += 4;
        }
        at_line_start = false;
        if pos > MAX_WIDTH {
            w.write_all(b"\\\n")?;
            pos = 0;
            at_line_start = true;
        }
    }
    w.write_all(b"\"")
}
