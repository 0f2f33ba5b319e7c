//! File patterns, backup suffix, default encodings and frame rate.

use encoding_rs::Encoding;

use crate::error::{FixError, Result};

pub const MOVIE_PATTERNS: &[&str] = &["*.mkv", "*.avi", "*.mp4"];
pub const SUBTITLE_PATTERNS: &[&str] = &["*.srt", "*.sub"];
pub const BACKUP_SUFFIX: &str = ".bkp";

pub const DEFAULT_SOURCE_ENCODING: &str = "windows-1250";
pub const DEFAULT_TARGET_ENCODING: &str = "utf-8";
pub const DEFAULT_SHIFT_ENCODING: &str = "utf-8";

/// Frame rate used when parsing frame-based (MicroDVD) `.sub` files.
pub const DEFAULT_FPS: f64 = 25.0;

/// Everything an operation needs to know besides its own arguments.
#[derive(Debug, Clone)]
pub struct FixerConfig {
    pub movie_patterns: Vec<String>,
    pub subtitle_patterns: Vec<String>,
    pub backup_suffix: String,
    pub source_encoding: String,
    pub target_encoding: String,
    pub fps: f64,
}

impl Default for FixerConfig {
    fn default() -> Self {
        FixerConfig {
            movie_patterns: MOVIE_PATTERNS.iter().map(|s| s.to_string()).collect(),
            subtitle_patterns: SUBTITLE_PATTERNS.iter().map(|s| s.to_string()).collect(),
            backup_suffix: BACKUP_SUFFIX.to_string(),
            source_encoding: DEFAULT_SOURCE_ENCODING.to_string(),
            target_encoding: DEFAULT_TARGET_ENCODING.to_string(),
            fps: DEFAULT_FPS,
        }
    }
}

impl FixerConfig {
    /// Backup patterns are the subtitle patterns with the backup suffix appended.
    pub fn backup_patterns(&self) -> Vec<String> {
        self.subtitle_patterns
            .iter()
            .map(|p| format!("{}{}", p, self.backup_suffix))
            .collect()
    }
}

/// Look up an encoding by its WHATWG label (`utf-8`, `windows-1250`, `latin2`, ...).
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| FixError::UnknownEncoding(label.to_string()))
}

/// Like [`resolve_encoding`], for encodings files will be written in.
pub fn resolve_output_encoding(label: &str) -> Result<&'static Encoding> {
    let encoding = resolve_encoding(label)?;
    if crate::encoding::can_encode(encoding) {
        Ok(encoding)
    } else {
        Err(FixError::UnwritableEncoding(encoding.name().to_string()))
    }
}

pub fn validate_fps(fps: f64) -> Result<f64> {
    if fps.is_finite() && fps > 0.0 {
        Ok(fps)
    } else {
        Err(FixError::InvalidShift(format!("fps must be positive, got {}", fps)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_patterns() {
        let config = FixerConfig::default();
        assert_eq!(config.backup_patterns(), vec!["*.srt.bkp", "*.sub.bkp"]);
    }

    #[test]
    fn test_resolve_encoding() {
        assert_eq!(resolve_encoding("utf-8").unwrap(), encoding_rs::UTF_8);
        assert_eq!(resolve_encoding("windows-1250").unwrap(), encoding_rs::WINDOWS_1250);
        assert_eq!(resolve_encoding(" CP1250 ").unwrap(), encoding_rs::WINDOWS_1250);
        assert!(matches!(
            resolve_encoding("klingon"),
            Err(FixError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn test_resolve_output_encoding() {
        assert_eq!(resolve_output_encoding("utf-16le").unwrap(), encoding_rs::UTF_16LE);
        assert_eq!(resolve_output_encoding("latin2").unwrap(), encoding_rs::ISO_8859_2);
        assert!(matches!(
            resolve_output_encoding("iso-2022-kr"),
            Err(FixError::UnwritableEncoding(_))
        ));
    }

    #[test]
    fn test_validate_fps() {
        assert_eq!(validate_fps(23.976).unwrap(), 23.976);
        assert!(validate_fps(0.0).is_err());
        assert!(validate_fps(f64::NAN).is_err());
    }
}
