use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn utc_compact_string(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%dT%H%M%SZ").to_string()
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 8192];

    loop {
        let count = file
            .read(&mut buf)
            .with_context(|| format!("failed to read file for hashing: {}", path.display()))?;
        if count == 0 {
            break;
        }
        hasher.update(&buf[..count]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;

    let mut file = File::create(path)
        .with_context(|| format!("failed to create json file: {}", path.display()))?;
    file.write_all(&data)
        .with_context(|| format!("failed to write json file: {}", path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("failed to finalize json file: {}", path.display()))?;

    Ok(())
}

/// Lenient numeric parse used for every metric cell. Search-console exports
/// are inconsistent about blank and non-numeric cells; those resolve to
/// `default` instead of failing the whole run.
pub fn parse_numeric_or_default(raw: &str, default: f64) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return default;
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => default,
    }
}

/// Count cells go through the same primitive; fractional values truncate and
/// negatives clamp to zero.
pub fn parse_count_or_default(raw: &str, default: u64) -> u64 {
    let value = parse_numeric_or_default(raw, default as f64);
    if value <= 0.0 { 0 } else { value as u64 }
}

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::{parse_count_or_default, parse_numeric_or_default, round_to};

    #[test]
    fn parse_numeric_or_default_falls_back_on_garbage() {
        assert_eq!(parse_numeric_or_default("12.5", 0.0), 12.5);
        assert_eq!(parse_numeric_or_default("  3 ", 0.0), 3.0);
        assert_eq!(parse_numeric_or_default("n/a", 0.0), 0.0);
        assert_eq!(parse_numeric_or_default("", 0.0), 0.0);
        assert_eq!(parse_numeric_or_default("NaN", 7.0), 7.0);
    }

    #[test]
    fn parse_count_or_default_truncates_and_clamps() {
        assert_eq!(parse_count_or_default("42", 0), 42);
        assert_eq!(parse_count_or_default("42.9", 0), 42);
        assert_eq!(parse_count_or_default("-3", 0), 0);
        assert_eq!(parse_count_or_default("oops", 0), 0);
    }

    #[test]
    fn round_to_handles_report_precisions() {
        assert_eq!(round_to(2.666_666, 1), 2.7);
        assert_eq!(round_to(15.0, 1), 15.0);
        assert_eq!(round_to(2.678, 2), 2.68);
    }
}
