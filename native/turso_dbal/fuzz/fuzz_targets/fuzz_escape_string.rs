#![no_main]
//! Fuzz test for escape_string
//!
//! Output must never contain an unescaped quote, and stripping the escapes
//! must give back the input.

use libfuzzer_sys::fuzz_target;
use turso_dbal::escape_string;

fn unescape(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('\0'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('Z') => out.push('\x1a'),
            Some(other) => out.push(other),
            None => panic!("dangling backslash in {escaped:?}"),
        }
    }
    out
}

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let escaped = escape_string(input);
        assert_eq!(unescape(&escaped), input);
    }
});
