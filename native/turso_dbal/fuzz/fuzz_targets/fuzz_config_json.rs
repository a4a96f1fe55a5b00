#![no_main]
//! Fuzz test for configuration parsing and mode resolution
//!
//! Arbitrary JSON must either fail as a configuration error or resolve to a
//! mode; neither step may panic.

use libfuzzer_sys::fuzz_target;
use turso_dbal::{resolve, ConnectionConfig, ErrorKind};

fuzz_target!(|data: &[u8]| {
    if let Ok(json) = std::str::from_utf8(data) {
        match ConnectionConfig::from_json(json) {
            Ok(config) => {
                let _ = resolve(&config);
            }
            Err(e) => assert_eq!(e.kind(), ErrorKind::Configuration),
        }
    }
});
