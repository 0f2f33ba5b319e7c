use crate::error::{FixError, Result};

/// A `[start, stop)` slice over a sorted file list. Negative bounds count
/// from the end of the list and out-of-range bounds are clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexRange {
    pub start: i64,
    pub stop: Option<i64>,
}

impl IndexRange {
    pub fn new(start: i64, stop: Option<i64>) -> Self {
        IndexRange { start, stop }
    }

    pub fn all() -> Self {
        IndexRange::default()
    }

    /// Resolve against a list length into concrete `(start, end)` offsets.
    pub fn bounds(&self, len: usize) -> (usize, usize) {
        let len_i = len as i64;
        let clamp = |i: i64| -> usize {
            let i = if i < 0 { i + len_i } else { i };
            i.clamp(0, len_i) as usize
        };
        let start = clamp(self.start);
        let end = self.stop.map(clamp).unwrap_or(len);
        (start, end.max(start))
    }

    pub fn apply<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let (start, end) = self.bounds(items.len());
        &items[start..end]
    }
}

/// Parses a signed time offset into milliseconds.
/// Supports: seconds (1.5), MM:SS, MM:SS.mmm, HH:MM:SS, HH:MM:SS.mmm, each with an optional leading `-` or `+`.
pub fn parse_offset(time_str: &str) -> Result<i64> {
    let s = time_str.trim();
    let (negative, body) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let invalid = |what: &str| {
        FixError::InvalidShift(format!("{} in offset '{}'", what, time_str))
    };

    let (time_part, ms) = match body.find('.') {
        Some(dot_pos) if body.contains(':') => {
            (&body[..dot_pos], parse_fraction_ms(&body[dot_pos + 1..]).ok_or_else(|| invalid("invalid milliseconds"))?)
        }
        _ => (body, 0),
    };

    let parts: Vec<&str> = time_part.split(':').collect();
    let total = match parts.len() {
        1 => {
            let secs: f64 = parts[0]
                .trim()
                .parse()
                .map_err(|_| invalid("invalid seconds"))?;
            if !secs.is_finite() {
                return Err(invalid("invalid seconds"));
            }
            (secs * 1000.0).round() as i64
        }
        2 | 3 => {
            let mut total_secs: i64 = 0;
            for (i, part) in parts.iter().enumerate() {
                let v: i64 = part
                    .trim()
                    .parse()
                    .map_err(|_| invalid(component_name(parts.len(), i)))?;
                if v < 0 {
                    return Err(invalid(component_name(parts.len(), i)));
                }
                total_secs = total_secs * 60 + v;
            }
            total_secs * 1000 + ms
        }
        _ => {
            return Err(invalid(
                "invalid format, use seconds (1.5) or HH:MM:SS.mmm (00:01:02.500)",
            ))
        }
    };

    Ok(if negative { -total } else { total })
}

fn component_name(count: usize, index: usize) -> &'static str {
    match (count, index) {
        (3, 0) => "invalid hours",
        (3, 1) | (2, 0) => "invalid minutes",
        _ => "invalid seconds",
    }
}

/// "5" -> 500, "05" -> 50, "005" -> 5; digits past milliseconds are truncated.
fn parse_fraction_ms(digits: &str) -> Option<i64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let padded: String = digits.chars().chain("000".chars()).take(3).collect();
    padded.parse().ok()
}
