//! Hex dump formatting for debug logging.

use std::fmt::Write;
use std::sync::OnceLock;

use adabas_encoding::charset::CP037;

/// Bytes shown per dump line.
const ROW: usize = 16;

/// Default cap on dumped bytes.
pub const MAXIMUM_FORMAT_LENGTH: usize = 4096;

/// Environment variable that lifts the dump cap.
pub const DUMP_BIG_ENV: &str = "ADABAS_DUMP_BIG";

fn dump_big() -> bool {
    static DUMP_BIG: OnceLock<bool> = OnceLock::new();
    *DUMP_BIG.get_or_init(|| std::env::var_os(DUMP_BIG_ENV).is_some())
}

/// Render `data` as a hex dump with ASCII and EBCDIC columns.
///
/// Output stops after [`MAXIMUM_FORMAT_LENGTH`] bytes unless
/// `ADABAS_DUMP_BIG` is set. Runs of identical lines collapse to
/// `<offset> ...`.
pub fn format_byte_buffer(header: &str, data: &[u8]) -> String {
    format_with_limit(header, data, MAXIMUM_FORMAT_LENGTH)
}

/// Like [`format_byte_buffer`] with a caller-chosen cap.
pub fn format_with_limit(header: &str, data: &[u8], limit: usize) -> String {
    let limit = if dump_big() {
        data.len()
    } else {
        data.len().min(limit)
    };
    format_limited(header, data, limit)
}

fn format_limited(header: &str, data: &[u8], limit: usize) -> String {
    let mut out = String::new();
    let _ = write!(out, "{}: Dump len={}(0x{:x})", header, data.len(), data.len());

    let shown = &data[..limit];
    let mut previous: Option<&[u8]> = None;
    let mut skipping = false;
    let mut rows = shown.chunks(ROW).enumerate().peekable();
    while let Some((index, row)) = rows.next() {
        let offset = index * ROW;
        let is_last = rows.peek().is_none();
        if !is_last && previous == Some(row) {
            if !skipping {
                let _ = write!(out, "\n{:04x} ...", offset);
                skipping = true;
            }
            continue;
        }
        skipping = false;
        previous = Some(row);

        let _ = write!(out, "\n{:04x} ", offset);
        for i in 0..ROW {
            match row.get(i) {
                Some(b) => {
                    let _ = write!(out, "{:02x}", b);
                }
                None => out.push_str("  "),
            }
            if i % 2 == 1 {
                out.push(' ');
            }
        }
        out.push(' ');
        for i in 0..ROW {
            out.push(match row.get(i) {
                Some(&b) if (0x20..0x7F).contains(&b) => b as char,
                Some(_) => '.',
                None => ' ',
            });
        }
        out.push(' ');
        for &b in row {
            let ch = CP037.decode_byte(b);
            out.push(if ch.is_ascii_graphic() || ch == ' ' { ch } else { '.' });
        }
    }
    if limit < data.len() {
        let _ = write!(out, "\n... {} bytes not shown", data.len() - limit);
    }
    out.push('\n');
    out
}

/// Log a dump at debug level; the dump is built only when debug is on.
pub fn log_dump(header: &str, data: &[u8]) {
    if tracing::enabled!(tracing::Level::DEBUG) {
        tracing::debug!("{}", format_byte_buffer(header, data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let dump = format_limited("ABC", b"ABCDEFGHIC", 10);
        let mut lines = dump.lines();
        assert_eq!(lines.next().unwrap(), "ABC: Dump len=10(0xa)");
        let row = lines.next().unwrap();
        assert!(row.starts_with("0000 4142 4344 4546 4748 4943"));
        assert!(row.contains("ABCDEFGHIC"));
    }

    #[test]
    fn test_ebcdic_column() {
        let dump = format_limited("E", &[0x81, 0x82, 0xC3, 0xC4, 0x86], 5);
        assert!(dump.trim_end().ends_with("abCDf"));
    }

    #[test]
    fn test_repeated_lines_collapse() {
        let data = [0x41u8; 64];
        let dump = format_limited("R", &data, data.len());
        assert!(dump.contains("\n0010 ..."));
        assert!(!dump.contains("\n0020 "));
        assert!(dump.contains("\n0030 "));
    }

    #[test]
    fn test_cap() {
        let data = vec![0u8; MAXIMUM_FORMAT_LENGTH + 10];
        let dump = format_limited("C", &data, MAXIMUM_FORMAT_LENGTH);
        assert!(dump.contains("10 bytes not shown"));
    }
}
