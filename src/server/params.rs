//! Query-string decoding and `/start` parameter validation.

use std::time::Duration;

use crate::config::Limits;
use crate::error::ApiError;
use crate::validation::{parse_duration_secs, parse_philosophers};

/// Decoded `key=value` pairs in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn parse(raw: &str) -> Self {
        let pairs = raw
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (key, value) = part.split_once('=').unwrap_or((part, ""));
                (percent_decode(key), percent_decode(value))
            })
            .collect();
        Self { pairs }
    }

    /// First value given for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// `+` becomes a space and `%XX` a byte; malformed escapes are kept as is.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi << 4) | lo);
                        i += 2;
                    }
                    _ => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Validated `/start` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartParams {
    pub philosophers: usize,
    pub duration: Duration,
}

impl StartParams {
    /// Read `n` and `duration` from `query`, applying defaults for missing or
    /// empty values.
    pub fn from_query(query: &Query, limits: &Limits) -> Result<Self, ApiError> {
        let philosophers = match query.get("n").filter(|v| !v.is_empty()) {
            None => limits.default_philosophers,
            Some(raw) => parse_philosophers(raw, limits)?,
        };
        let secs = match query.get("duration").filter(|v| !v.is_empty()) {
            None => limits.default_duration_secs,
            Some(raw) => parse_duration_secs(raw, limits)?,
        };
        Ok(Self {
            philosophers,
            duration: Duration::from_secs(secs),
        })
    }
}

/// Render whole seconds the way `1m0s`, `20m0s` or `1h30m0s` read.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, total / 60 % 60, total % 60);
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}
