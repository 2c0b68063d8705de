//! Limit values and unit conversion
//!
//! Memory sizes are binary: each unit is 1024 times the previous one. The
//! log line shows whole megabytes, enforcement uses the exact byte count.

use crate::errors::{CallError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Unit of a memory limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryUnit {
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
    Terabytes,
}

impl MemoryUnit {
    /// Number of bytes in one unit
    pub fn factor(self) -> f64 {
        match self {
            Self::Bytes => 1.0,
            Self::Kilobytes => 1024.0,
            Self::Megabytes => BYTES_PER_MB,
            Self::Gigabytes => BYTES_PER_MB * 1024.0,
            Self::Terabytes => BYTES_PER_MB * 1024.0 * 1024.0,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::Bytes => "B",
            Self::Kilobytes => "K",
            Self::Megabytes => "M",
            Self::Gigabytes => "G",
            Self::Terabytes => "T",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "" | "B" => Some(Self::Bytes),
            "K" | "KB" | "KIB" => Some(Self::Kilobytes),
            "M" | "MB" | "MIB" => Some(Self::Megabytes),
            "G" | "GB" | "GIB" => Some(Self::Gigabytes),
            "T" | "TB" | "TIB" => Some(Self::Terabytes),
            _ => None,
        }
    }
}

/// A memory limit as a quantity with a unit, e.g. `2G` or `512M`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemoryLimit {
    pub value: f64,
    pub unit: MemoryUnit,
}

impl MemoryLimit {
    pub fn new(value: f64, unit: MemoryUnit) -> Self {
        Self { value, unit }
    }

    pub fn from_bytes(bytes: u64) -> Self {
        Self::new(bytes as f64, MemoryUnit::Bytes)
    }

    fn checked_value(&self) -> Result<f64> {
        if !self.value.is_finite() || self.value <= 0.0 {
            return Err(CallError::InvalidLimitValue(format!(
                "memory limit must be a positive number, got {}",
                self.value
            )));
        }
        Ok(self.value)
    }

    /// Size in megabytes, unrounded
    pub fn megabytes(&self) -> Result<f64> {
        Ok(self.checked_value()? * self.unit.factor() / BYTES_PER_MB)
    }

    /// Size in whole bytes, the value enforced as `RLIMIT_AS`
    pub fn bytes(&self) -> Result<u64> {
        let bytes = (self.checked_value()? * self.unit.factor()).floor();
        if bytes < 1.0 {
            return Err(CallError::InvalidLimitValue(format!(
                "memory limit {} is smaller than one byte",
                self
            )));
        }
        if bytes >= u64::MAX as f64 {
            return Err(CallError::InvalidLimitValue(format!(
                "memory limit {} is too large",
                self
            )));
        }
        Ok(bytes as u64)
    }
}

impl fmt::Display for MemoryLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

impl FromStr for MemoryLimit {
    type Err = CallError;

    /// Parse `"512"`, `"64K"`, `"64KB"`, `"64KiB"`, `"1.5G"`; a bare number is bytes.
    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        let split = upper
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(upper.len());
        let (number, suffix) = upper.split_at(split);

        let unit = MemoryUnit::from_suffix(suffix.trim())
            .ok_or_else(|| CallError::InvalidLimitValue(format!("Invalid memory size: {}", s)))?;
        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| CallError::InvalidLimitValue(format!("Invalid memory size: {}", s)))?;

        let limit = Self::new(value, unit);
        limit.bytes()?;
        Ok(limit)
    }
}

impl TryFrom<String> for MemoryLimit {
    type Error = CallError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MemoryLimit> for String {
    fn from(limit: MemoryLimit) -> Self {
        limit.to_string()
    }
}

/// Convert an optional memory limit to megabytes.
pub fn to_megabytes(limit: Option<MemoryLimit>) -> Result<Option<f64>> {
    limit.map(|l| l.megabytes()).transpose()
}

/// Convert an optional memory limit to bytes.
pub fn to_bytes(limit: Option<MemoryLimit>) -> Result<Option<u64>> {
    limit.map(|l| l.bytes()).transpose()
}

/// A CPU time limit, strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeLimit(Duration);

impl TimeLimit {
    pub fn from_secs(secs: u64) -> Result<Self> {
        Self::from_duration(Duration::from_secs(secs))
    }

    pub fn from_secs_f64(secs: f64) -> Result<Self> {
        let duration = Duration::try_from_secs_f64(secs).map_err(|_| {
            CallError::InvalidLimitValue(format!("time limit must be a positive number, got {}", secs))
        })?;
        Self::from_duration(duration)
    }

    pub fn from_duration(duration: Duration) -> Result<Self> {
        if duration.is_zero() {
            return Err(CallError::InvalidLimitValue(
                "time limit must be positive".to_string(),
            ));
        }
        Ok(Self(duration))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// Whole seconds enforced as `RLIMIT_CPU`, rounded up and at least 1.
    pub fn cpu_seconds(&self) -> u64 {
        let secs = self.0.as_secs();
        if self.0.subsec_nanos() > 0 {
            secs.saturating_add(1)
        } else {
            secs.max(1)
        }
    }
}

impl fmt::Display for TimeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.subsec_nanos() == 0 {
            write!(f, "{}s", self.0.as_secs())
        } else {
            write!(f, "{}s", self.0.as_secs_f64())
        }
    }
}

impl FromStr for TimeLimit {
    type Err = CallError;

    /// Parse `"30"`, `"30s"`, `"5m"`, `"1h"` or a fractional number of seconds.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (number, multiplier) = match trimmed.char_indices().last() {
            Some((i, 's')) => (&trimmed[..i], 1.0),
            Some((i, 'm')) => (&trimmed[..i], 60.0),
            Some((i, 'h')) => (&trimmed[..i], 3600.0),
            _ => (trimmed, 1.0),
        };

        let value: f64 = number
            .trim()
            .parse()
            .map_err(|_| CallError::InvalidLimitValue(format!("Invalid time limit: {}", s)))?;
        if !value.is_finite() {
            return Err(CallError::InvalidLimitValue(format!("Invalid time limit: {}", s)));
        }
        Self::from_secs_f64(value * multiplier)
    }
}

impl TryFrom<String> for TimeLimit {
    type Error = CallError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TimeLimit> for String {
    fn from(limit: TimeLimit) -> Self {
        limit.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gigabyte_is_binary() {
        let limit = MemoryLimit::new(1.0, MemoryUnit::Gigabytes);
        assert_eq!(to_megabytes(Some(limit)).unwrap(), Some(1024.0));
        assert_eq!(to_bytes(Some(limit)).unwrap(), Some(1024 * 1024 * 1024));
    }

    #[test]
    fn test_none_passes_through() {
        assert_eq!(to_megabytes(None).unwrap(), None);
        assert_eq!(to_bytes(None).unwrap(), None);
    }

    #[test]
    fn test_small_units() {
        let kb = MemoryLimit::new(512.0, MemoryUnit::Kilobytes);
        assert_eq!(kb.megabytes().unwrap(), 0.5);
        assert_eq!(kb.bytes().unwrap(), 512 * 1024);
        assert_eq!(MemoryLimit::from_bytes(3).bytes().unwrap(), 3);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for value in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let limit = MemoryLimit::new(value, MemoryUnit::Megabytes);
            assert!(matches!(
                to_megabytes(Some(limit)),
                Err(CallError::InvalidLimitValue(_))
            ));
            assert!(matches!(
                to_bytes(Some(limit)),
                Err(CallError::InvalidLimitValue(_))
            ));
        }
    }

    #[test]
    fn test_sub_byte_limit_rejected() {
        let limit = MemoryLimit::new(0.5, MemoryUnit::Bytes);
        assert!(limit.megabytes().is_ok());
        assert!(limit.bytes().is_err());
    }

    #[test]
    fn test_overflow_rejected() {
        let limit = MemoryLimit::new(1e12, MemoryUnit::Terabytes);
        assert!(limit.bytes().is_err());
    }

    #[test]
    fn test_parse_memory_limit() {
        assert_eq!("100".parse::<MemoryLimit>().unwrap().bytes().unwrap(), 100);
        assert_eq!("100B".parse::<MemoryLimit>().unwrap().bytes().unwrap(), 100);
        assert_eq!("1K".parse::<MemoryLimit>().unwrap().bytes().unwrap(), 1024);
        assert_eq!(
            "64KiB".parse::<MemoryLimit>().unwrap().bytes().unwrap(),
            64 * 1024
        );
        assert_eq!(
            "  3500M  ".parse::<MemoryLimit>().unwrap().megabytes().unwrap(),
            3500.0
        );
        assert_eq!(
            "1.5g".parse::<MemoryLimit>().unwrap().megabytes().unwrap(),
            1536.0
        );
        assert_eq!(
            "2GB".parse::<MemoryLimit>().unwrap().unit,
            MemoryUnit::Gigabytes
        );
    }

    #[test]
    fn test_parse_memory_limit_invalid() {
        assert!("not_a_number".parse::<MemoryLimit>().is_err());
        assert!("10X".parse::<MemoryLimit>().is_err());
        assert!("-5M".parse::<MemoryLimit>().is_err());
        assert!("0".parse::<MemoryLimit>().is_err());
        assert!("".parse::<MemoryLimit>().is_err());
    }

    #[test]
    fn test_memory_limit_display_round_trips() {
        let limit: MemoryLimit = "2G".parse().unwrap();
        assert_eq!(limit.to_string(), "2G");
        assert_eq!(limit.to_string().parse::<MemoryLimit>().unwrap(), limit);
    }

    #[test]
    fn test_parse_time_limit() {
        assert_eq!("30".parse::<TimeLimit>().unwrap().cpu_seconds(), 30);
        assert_eq!("30s".parse::<TimeLimit>().unwrap().cpu_seconds(), 30);
        assert_eq!("5m".parse::<TimeLimit>().unwrap().cpu_seconds(), 300);
        assert_eq!("1h".parse::<TimeLimit>().unwrap().cpu_seconds(), 3600);
        assert_eq!(
            "1.5".parse::<TimeLimit>().unwrap().as_duration(),
            Duration::from_millis(1500)
        );
    }

    #[test]
    fn test_parse_time_limit_invalid() {
        assert!("0".parse::<TimeLimit>().is_err());
        assert!("-3s".parse::<TimeLimit>().is_err());
        assert!("soon".parse::<TimeLimit>().is_err());
        assert!("inf".parse::<TimeLimit>().is_err());
        assert!(TimeLimit::from_secs(0).is_err());
    }

    #[test]
    fn test_cpu_seconds_rounds_up() {
        assert_eq!(TimeLimit::from_secs_f64(1.2).unwrap().cpu_seconds(), 2);
        assert_eq!(TimeLimit::from_secs_f64(0.1).unwrap().cpu_seconds(), 1);
        assert_eq!(TimeLimit::from_secs(7).unwrap().cpu_seconds(), 7);
    }

    #[test]
    fn test_cpu_seconds_saturates() {
        let limit = TimeLimit::from_duration(Duration::MAX).unwrap();
        assert_eq!(limit.cpu_seconds(), u64::MAX);
    }

    #[test]
    fn test_time_limit_display() {
        assert_eq!(TimeLimit::from_secs(30).unwrap().to_string(), "30s");
        assert_eq!(TimeLimit::from_secs_f64(1.5).unwrap().to_string(), "1.5s");
    }

    #[test]
    fn test_limits_serialize_as_strings() {
        let memory: MemoryLimit = serde_json::from_str("\"512M\"").unwrap();
        assert_eq!(memory.megabytes().unwrap(), 512.0);
        assert_eq!(serde_json::to_string(&memory).unwrap(), "\"512M\"");

        let time: TimeLimit = serde_json::from_str("\"2m\"").unwrap();
        assert_eq!(time.cpu_seconds(), 120);
        assert!(serde_json::from_str::<TimeLimit>("\"0s\"").is_err());
    }
}
