//! Subtitle timing shifts on top of `subparse` (load, shift by offset or ratio, save).

use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use subparse::timetypes::{TimePoint, TimeSpan};
use subparse::SubtitleEntry;

use crate::encoding::{decode_strict, encode_strict};
use crate::error::{FixError, Result};

/// Offset and ratio applied to every timestamp. The ratio scales first,
/// then the offset is added.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShiftBy {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub milliseconds: i64,
    pub ratio: Option<f64>,
}

impl ShiftBy {
    pub fn from_millis(milliseconds: i64) -> Self {
        ShiftBy {
            milliseconds,
            ..Default::default()
        }
    }

    /// Total offset in milliseconds, or `InvalidShift` if it overflows.
    pub fn offset_ms(&self) -> Result<i64> {
        self.hours
            .checked_mul(60)
            .and_then(|m| m.checked_add(self.minutes))
            .and_then(|m| m.checked_mul(60))
            .and_then(|s| s.checked_add(self.seconds))
            .and_then(|s| s.checked_mul(1000))
            .and_then(|ms| ms.checked_add(self.milliseconds))
            .ok_or_else(|| FixError::InvalidShift("offset is out of range".to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(ratio) = self.ratio {
            if !ratio.is_finite() || ratio <= 0.0 {
                return Err(FixError::InvalidShift(format!(
                    "ratio must be a positive number, got {}",
                    ratio
                )));
            }
        }
        if self.ratio.is_none() && self.offset_ms()? == 0 {
            return Err(FixError::InvalidShift(
                "nothing to shift by, give an offset or a ratio".to_string(),
            ));
        }
        Ok(())
    }

    /// Shifted timestamp. Times before zero are clamped to zero.
    pub fn apply_ms(&self, ms: i64) -> Result<i64> {
        let scaled = match self.ratio {
            Some(ratio) => (ms as f64 * ratio).round() as i64,
            None => ms,
        };
        Ok(scaled.saturating_add(self.offset_ms()?).max(0))
    }

    pub fn apply(&self, entries: &mut [SubtitleEntry]) -> Result<()> {
        for entry in entries {
            entry.timespan = TimeSpan::new(
                TimePoint::from_msecs(self.apply_ms(entry.timespan.start.msecs())?),
                TimePoint::from_msecs(self.apply_ms(entry.timespan.end.msecs())?),
            );
        }
        Ok(())
    }
}

impl std::fmt::Display for ShiftBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ratio) = self.ratio {
            write!(f, "x{} ", ratio)?;
        }
        match self.offset_ms() {
            Ok(ms) => write!(f, "{}", format_offset(ms)),
            Err(_) => write!(f, "(out of range)"),
        }
    }
}

/// Formats signed milliseconds as `+HH:MM:SS.mmm`.
pub fn format_offset(ms: i64) -> String {
    let sign = if ms < 0 { '-' } else { '+' };
    let ms = ms.unsigned_abs();
    let hours = ms / 3_600_000;
    let minutes = ms / 60_000 % 60;
    let seconds = ms / 1000 % 60;
    let millis = ms % 1000;
    format!("{}{:02}:{:02}:{:02}.{:03}", sign, hours, minutes, seconds, millis)
}

/// Parses the subtitle at `path`, shifts every entry and writes it back in
/// the same encoding. Returns the number of shifted entries.
pub fn shift_file(
    path: &Path,
    by: &ShiftBy,
    encoding: &'static Encoding,
    fps: f64,
) -> Result<usize> {
    let content = fs::read(path).map_err(|e| FixError::io(path, e))?;
    let subtitle_error = |message: String| FixError::Subtitle {
        path: path.to_path_buf(),
        message,
    };

    let format = subparse::get_subtitle_format(path.extension(), &content)
        .ok_or_else(|| subtitle_error("unknown subtitle format".to_string()))?;
    let mut file = subparse::parse_bytes(format, &content, Some(encoding), fps)
        .map_err(|e| subtitle_error(format!("parse failed: {:?}", e)))?;
    let mut entries = file
        .get_subtitle_entries()
        .map_err(|e| subtitle_error(format!("reading entries failed: {:?}", e)))?;

    by.apply(&mut entries)?;

    file.update_subtitle_entries(&entries)
        .map_err(|e| subtitle_error(format!("updating entries failed: {:?}", e)))?;
    let data = file
        .to_data()
        .map_err(|e| subtitle_error(format!("serializing failed: {:?}", e)))?;
    let data = reencode_output(path, data, encoding)?;

    fs::write(path, data).map_err(|e| FixError::io(path, e))?;
    Ok(entries.len())
}

/// Text formats serialize as UTF-8; convert back to the file's own encoding.
fn reencode_output(path: &Path, data: Vec<u8>, encoding: &'static Encoding) -> Result<Vec<u8>> {
    if encoding == UTF_8 {
        return Ok(data);
    }
    let Some(text) = decode_strict(&data, UTF_8) else {
        // binary formats (VobSub) are written as produced
        return Ok(data);
    };
    encode_strict(&text, encoding)
        .map(|bytes| bytes.into_owned())
        .ok_or_else(|| FixError::Encode {
            path: path.to_path_buf(),
            encoding: encoding.name().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_16LE;
    use tempfile::TempDir;

    const SAMPLE_SRT: &str = "1\n00:00:01,000 --> 00:00:02,500\nHello\n\n2\n00:01:00,250 --> 00:01:03,000\nWorld\n";

    fn timings(path: &Path) -> Vec<(i64, i64)> {
        let content = fs::read(path).unwrap();
        let format = subparse::get_subtitle_format(path.extension(), &content).unwrap();
        let file = subparse::parse_bytes(format, &content, Some(UTF_8), 25.0).unwrap();
        file.get_subtitle_entries()
            .unwrap()
            .iter()
            .map(|e| (e.timespan.start.msecs(), e.timespan.end.msecs()))
            .collect()
    }

    #[test]
    fn test_offset_ms() {
        let by = ShiftBy {
            hours: 1,
            minutes: 2,
            seconds: 3,
            milliseconds: 4,
            ratio: None,
        };
        assert_eq!(by.offset_ms().unwrap(), 3_723_004);
        assert_eq!(ShiftBy::from_millis(-1500).offset_ms().unwrap(), -1500);
    }

    #[test]
    fn test_offset_overflow_is_invalid_shift() {
        let by = ShiftBy {
            hours: i64::MAX,
            ..Default::default()
        };
        assert!(matches!(by.offset_ms(), Err(FixError::InvalidShift(_))));
        assert!(matches!(by.validate(), Err(FixError::InvalidShift(_))));
        let by = ShiftBy {
            seconds: 1,
            milliseconds: i64::MAX,
            ..Default::default()
        };
        assert!(by.validate().is_err());
    }

    #[test]
    fn test_apply_ms_ratio_then_offset() {
        let by = ShiftBy {
            seconds: 1,
            ratio: Some(1.5),
            ..Default::default()
        };
        assert_eq!(by.apply_ms(2000).unwrap(), 4000);
        assert_eq!(by.apply_ms(1).unwrap(), 1002);
    }

    #[test]
    fn test_apply_ms_clamps_at_zero() {
        let by = ShiftBy::from_millis(-3000);
        assert_eq!(by.apply_ms(1000).unwrap(), 0);
        assert_eq!(by.apply_ms(5000).unwrap(), 2000);
    }

    #[test]
    fn test_validate() {
        assert!(ShiftBy::default().validate().is_err());
        assert!(ShiftBy::from_millis(10).validate().is_ok());
        let bad_ratio = ShiftBy {
            ratio: Some(0.0),
            ..Default::default()
        };
        assert!(bad_ratio.validate().is_err());
        let ratio_only = ShiftBy {
            ratio: Some(25.0 / 23.976),
            ..Default::default()
        };
        assert!(ratio_only.validate().is_ok());
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(0), "+00:00:00.000");
        assert_eq!(format_offset(3_723_004), "+01:02:03.004");
        assert_eq!(format_offset(-1500), "-00:00:01.500");
    }

    #[test]
    fn test_shift_file_forward_and_back() {
        let tmp = TempDir::new().unwrap();
        let sub = tmp.path().join("a.srt");
        fs::write(&sub, SAMPLE_SRT).unwrap();
        let before = timings(&sub);
        assert_eq!(before, vec![(1000, 2500), (60250, 63000)]);

        assert_eq!(shift_file(&sub, &ShiftBy::from_millis(2000), UTF_8, 25.0).unwrap(), 2);
        assert_eq!(timings(&sub), vec![(3000, 4500), (62250, 65000)]);

        shift_file(&sub, &ShiftBy::from_millis(-2000), UTF_8, 25.0).unwrap();
        assert_eq!(timings(&sub), before);
    }

    #[test]
    fn test_shift_file_before_zero_stays_parseable() {
        let tmp = TempDir::new().unwrap();
        let sub = tmp.path().join("a.srt");
        fs::write(&sub, SAMPLE_SRT).unwrap();

        shift_file(&sub, &ShiftBy::from_millis(-3000), UTF_8, 25.0).unwrap();

        assert_eq!(timings(&sub), vec![(0, 0), (57250, 60000)]);
        let text = fs::read_to_string(&sub).unwrap();
        assert!(!text.contains("-0"));
        assert!(text.contains("00:00:00,000 --> 00:00:00,000"));
    }

    #[test]
    fn test_shift_file_keeps_utf16() {
        let tmp = TempDir::new().unwrap();
        let sub = tmp.path().join("a.srt");
        let utf16 = encode_strict("1\n00:00:01,000 --> 00:00:02,000\nkůň\n", UTF_16LE)
            .unwrap()
            .into_owned();
        fs::write(&sub, &utf16).unwrap();

        shift_file(&sub, &ShiftBy::from_millis(1000), UTF_16LE, 25.0).unwrap();

        let written = fs::read(&sub).unwrap();
        assert!(written.starts_with(&[0x31, 0x00]));
        let text = decode_strict(&written, UTF_16LE).unwrap();
        assert!(text.contains("00:00:02,000 --> 00:00:03,000"));
        assert!(text.contains("kůň"));
    }

    #[test]
    fn test_shift_file_missing_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = shift_file(
            &tmp.path().join("missing.srt"),
            &ShiftBy::from_millis(1),
            UTF_8,
            25.0,
        )
        .unwrap_err();
        assert!(matches!(err, FixError::Io { .. }));
    }
}
