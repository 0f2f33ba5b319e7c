//! Directory listing: `*<suffix>` patterns, sorted case-insensitively per pattern.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{FixError, Result};

/// Lists regular files directly inside `dir` matching any of `patterns`.
///
/// Each pattern's matches are sorted by lowercased path string and the
/// per-pattern lists are concatenated in pattern order, not merged.
pub fn scan<S: AsRef<str>>(dir: &Path, patterns: &[S]) -> Result<Vec<PathBuf>> {
    let names = list_file_names(dir)?;
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let mut matched: Vec<PathBuf> = names
            .iter()
            .filter(|name| matches_pattern(&name.to_string_lossy(), pattern))
            .map(|name| dir.join(name))
            .filter(|path| !seen.contains(path))
            .collect();
        matched.sort_by_cached_key(|p| sort_key(p));
        for path in matched {
            seen.insert(path.clone());
            result.push(path);
        }
    }
    Ok(result)
}

/// Names are kept as `OsString`; patterns match against their lossy form.
fn list_file_names(dir: &Path) -> Result<Vec<OsString>> {
    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            FixError::io(path, source)
        })?;
        if !entry.path().is_file() {
            continue;
        }
        names.push(entry.file_name().to_owned());
    }
    Ok(names)
}

/// `*<suffix>` glob: any name not starting with a dot that ends with `suffix`.
fn matches_pattern(name: &str, pattern: &str) -> bool {
    if name.starts_with('.') {
        return false;
    }
    match pattern.strip_prefix('*') {
        Some(suffix) => name.len() > suffix.len() && name.ends_with(suffix),
        None => name == pattern,
    }
}

pub fn sort_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_matches_pattern() {
        assert!(matches_pattern("a.srt", "*.srt"));
        assert!(!matches_pattern("a.srt.bkp", "*.srt"));
        assert!(matches_pattern("a.srt.bkp", "*.srt.bkp"));
        assert!(!matches_pattern(".hidden.srt", "*.srt"));
        assert!(!matches_pattern("a.SRT", "*.srt"));
    }

    #[test]
    fn test_scan_sorts_case_insensitively() {
        let tmp = TempDir::new().unwrap();
        for name in ["b.srt", "A.srt", "c.srt", "a2.srt"] {
            touch(tmp.path(), name);
        }
        let found = scan(tmp.path(), &["*.srt"]).unwrap();
        assert_eq!(names(&found), vec!["A.srt", "a2.srt", "b.srt", "c.srt"]);
    }

    #[test]
    fn test_scan_concatenates_in_pattern_order() {
        let tmp = TempDir::new().unwrap();
        for name in ["z.mkv", "a.avi", "m.mkv", "b.mp4"] {
            touch(tmp.path(), name);
        }
        let found = scan(tmp.path(), &["*.mkv", "*.avi", "*.mp4"]).unwrap();
        assert_eq!(names(&found), vec!["m.mkv", "z.mkv", "a.avi", "b.mp4"]);
    }

    #[test]
    fn test_scan_skips_directories_and_nested_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("dir.srt")).unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        touch(&tmp.path().join("nested"), "inner.srt");
        touch(tmp.path(), "top.srt");
        let found = scan(tmp.path(), &["*.srt"]).unwrap();
        assert_eq!(names(&found), vec!["top.srt"]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_scan_keeps_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = TempDir::new().unwrap();
        let name = OsStr::from_bytes(b"Mali\xe8k.srt");
        fs::write(tmp.path().join(name), b"x").unwrap();
        touch(tmp.path(), "a.srt");

        let found = scan(tmp.path(), &["*.srt"]).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.contains(&tmp.path().join(name)));
        assert!(found.iter().all(|p| p.is_file()));
    }

    #[test]
    fn test_scan_missing_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing");
        assert!(matches!(
            scan(&missing, &["*.srt"]),
            Err(FixError::Io { .. })
        ));
    }
}
