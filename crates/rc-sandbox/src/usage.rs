//! Parser for the `time`-shim's `usage.json` side channel.
//!
//! Wire format (contract-stable, see spec §6): `{"exit_status":int,
//! "max_memory":int_kb,"real_time":float_seconds}`.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct UsageFile {
    #[allow(dead_code)]
    exit_status: i64,
    max_memory: i64,
    real_time: f64,
}

/// Returns `(memory_usage_kb, execution_time_ms)`, or `None` if the file is
/// missing or malformed — callers map that to the `-1` / `-1` sentinel pair
/// rather than guessing zero.
pub fn parse_usage(bytes: &[u8]) -> Option<(i64, i64)> {
    let usage: UsageFile = serde_json::from_slice(bytes).ok()?;
    let execution_time_ms = (usage.real_time * 1000.0).round() as i64;
    Some((usage.max_memory, execution_time_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_usage_file() {
        let raw = br#"{"exit_status":0,"max_memory":4096,"real_time":0.123}"#;
        let (mem_kb, exec_ms) = parse_usage(raw).unwrap();
        assert_eq!(mem_kb, 4096);
        assert_eq!(exec_ms, 123);
    }

    #[test]
    fn rounds_real_time_to_nearest_millisecond() {
        let raw = br#"{"exit_status":0,"max_memory":1,"real_time":1.0005}"#;
        let (_, exec_ms) = parse_usage(raw).unwrap();
        assert_eq!(exec_ms, 1001);
    }

    #[test]
    fn malformed_json_yields_none() {
        assert!(parse_usage(b"not json").is_none());
    }

    #[test]
    fn missing_field_yields_none() {
        assert!(parse_usage(br#"{"exit_status":0}"#).is_none());
    }
}
