//! Batch operations over the movies and subtitles of one directory.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{dispatcher, error, info, Dispatch};

use crate::backup;
use crate::config::{self, FixerConfig};
use crate::encoding::{decode_strict, encode_strict};
use crate::error::{FixError, Result};
use crate::options::IndexRange;
use crate::scan::scan;
use crate::shift::{self, ShiftBy};

/// Per-invocation counters. Decode failures count as skipped, every other
/// per-file error as failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub changed: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn record(&mut self, op: &str, path: &Path, result: Result<bool>) {
        match result {
            Ok(true) => self.changed += 1,
            Ok(false) => self.unchanged += 1,
            Err(e @ FixError::Decode { .. }) => {
                error!(op, file = %path.display(), "{}", e);
                self.skipped += 1;
            }
            Err(e) => {
                error!(op, file = %path.display(), "{}", e);
                self.failed += 1;
            }
        }
    }

    fn log(&self, op: &str) {
        info!(
            op,
            changed = self.changed,
            unchanged = self.unchanged,
            skipped = self.skipped,
            failed = self.failed,
            "Finished"
        );
    }
}

#[derive(Debug, Clone)]
pub struct RecodeOptions {
    pub subtitle: Option<PathBuf>,
    pub source: String,
    pub target: String,
    pub range: IndexRange,
    pub force: bool,
}

impl RecodeOptions {
    pub fn from_config(config: &FixerConfig) -> Self {
        RecodeOptions {
            subtitle: None,
            source: config.source_encoding.clone(),
            target: config.target_encoding.clone(),
            range: IndexRange::all(),
            force: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenameOptions {
    pub range: IndexRange,
    pub backup: bool,
    pub force: bool,
}

impl Default for RenameOptions {
    fn default() -> Self {
        RenameOptions {
            range: IndexRange::all(),
            backup: true,
            force: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShiftOptions {
    pub subtitle: Option<PathBuf>,
    pub by: ShiftBy,
    pub range: IndexRange,
    pub encoding: String,
    pub fps: f64,
    pub force: bool,
}

impl ShiftOptions {
    pub fn new(by: ShiftBy, config: &FixerConfig) -> Self {
        ShiftOptions {
            subtitle: None,
            by,
            range: IndexRange::all(),
            encoding: config::DEFAULT_SHIFT_ENCODING.to_string(),
            fps: config.fps,
            force: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RestoreOptions {
    pub backup: Option<PathBuf>,
    pub range: IndexRange,
}

/// Works on one directory. Every operation logs through the injected dispatcher.
pub struct SubtitleFixer {
    dir: PathBuf,
    config: FixerConfig,
    dispatch: Dispatch,
}

impl SubtitleFixer {
    pub fn new(dir: impl Into<PathBuf>, config: FixerConfig, dispatch: Dispatch) -> Self {
        SubtitleFixer {
            dir: dir.into(),
            config,
            dispatch,
        }
    }

    pub fn config(&self) -> &FixerConfig {
        &self.config
    }

    pub fn movies(&self) -> Result<Vec<PathBuf>> {
        scan(&self.dir, &self.config.movie_patterns)
    }

    pub fn subtitles(&self) -> Result<Vec<PathBuf>> {
        scan(&self.dir, &self.config.subtitle_patterns)
    }

    pub fn subtitle_backups(&self) -> Result<Vec<PathBuf>> {
        scan(&self.dir, &self.config.backup_patterns())
    }

    /// Re-encodes subtitles from `source` to `target`, skipping files that do
    /// not decode as `source`.
    pub fn recode(&self, opts: &RecodeOptions) -> Result<BatchSummary> {
        dispatcher::with_default(&self.dispatch, || -> Result<BatchSummary> {
            let source = config::resolve_encoding(&opts.source)?;
            let target = config::resolve_output_encoding(&opts.target)?;
            let subtitles = self.explicit_or(opts.subtitle.as_deref(), || self.subtitles())?;

            let mut summary = BatchSummary::default();
            for sub in opts.range.apply(&subtitles) {
                let result = self.recode_one(sub, source, target, opts.force);
                summary.record("recode", sub, result);
            }
            summary.log("recode");
            Ok(summary)
        })
    }

    fn recode_one(
        &self,
        sub: &Path,
        source: &'static encoding_rs::Encoding,
        target: &'static encoding_rs::Encoding,
        force: bool,
    ) -> Result<bool> {
        let bytes = fs::read(sub).map_err(|e| FixError::io(sub, e))?;
        let text = decode_strict(&bytes, source).ok_or_else(|| FixError::Decode {
            path: sub.to_path_buf(),
            encoding: source.name().to_string(),
        })?;
        let encoded = encode_strict(&text, target).ok_or_else(|| FixError::Encode {
            path: sub.to_path_buf(),
            encoding: target.name().to_string(),
        })?;

        backup::backup(sub, &self.config.backup_suffix, force)?;
        fs::write(sub, &encoded).map_err(|e| FixError::io(sub, e))?;
        info!("Re-encoded {} as {}", display_name(sub), target.name());
        Ok(true)
    }

    /// Renames each subtitle after the movie at the same sorted position.
    pub fn rename(&self, opts: &RenameOptions) -> Result<BatchSummary> {
        dispatcher::with_default(&self.dispatch, || -> Result<BatchSummary> {
            let subtitles = self.subtitles()?;
            let movies = self.movies()?;
            let pairs: Vec<(&PathBuf, &PathBuf)> = subtitles.iter().zip(movies.iter()).collect();

            let mut summary = BatchSummary::default();
            for (sub, movie) in opts.range.apply(&pairs) {
                let result = self.rename_one(sub, movie, opts);
                summary.record("rename", sub, result);
            }
            summary.log("rename");
            Ok(summary)
        })
    }

    fn rename_one(&self, sub: &Path, movie: &Path, opts: &RenameOptions) -> Result<bool> {
        let target = renamed_subtitle(sub, movie);
        if target == sub {
            return Ok(false);
        }
        if opts.backup {
            backup::backup(sub, &self.config.backup_suffix, opts.force)?;
        }
        fs::rename(sub, &target).map_err(|e| FixError::io(sub, e))?;
        info!("Renamed {} to {}", display_name(sub), display_name(&target));
        Ok(true)
    }

    /// Shifts subtitle timestamps, backing each file up first.
    pub fn shift(&self, opts: &ShiftOptions) -> Result<BatchSummary> {
        dispatcher::with_default(&self.dispatch, || -> Result<BatchSummary> {
            opts.by.validate()?;
            let encoding = config::resolve_output_encoding(&opts.encoding)?;
            let fps = config::validate_fps(opts.fps)?;
            let subtitles = self.explicit_or(opts.subtitle.as_deref(), || self.subtitles())?;

            let mut summary = BatchSummary::default();
            for sub in opts.range.apply(&subtitles) {
                let result = backup::backup(sub, &self.config.backup_suffix, opts.force)
                    .and_then(|_| shift::shift_file(sub, &opts.by, encoding, fps))
                    .map(|entries| {
                        info!(entries, "Shifted {} by {}", sub.display(), opts.by);
                        true
                    });
                summary.record("shift", sub, result);
            }
            summary.log("shift");
            Ok(summary)
        })
    }

    /// Moves backups back over the files they were taken from.
    pub fn restore(&self, opts: &RestoreOptions) -> Result<BatchSummary> {
        dispatcher::with_default(&self.dispatch, || -> Result<BatchSummary> {
            let backups = self.explicit_or(opts.backup.as_deref(), || self.subtitle_backups())?;

            let mut summary = BatchSummary::default();
            for bkp in opts.range.apply(&backups) {
                let result = backup::restore(bkp, &self.config.backup_suffix).map(|original| {
                    info!("Restored {} to {}", display_name(bkp), display_name(&original));
                    true
                });
                summary.record("restore", bkp, result);
            }
            summary.log("restore");
            Ok(summary)
        })
    }

    /// Recode with the default encodings, then rename.
    pub fn fix(&self, range: IndexRange) -> Result<(BatchSummary, BatchSummary)> {
        let recode = self.recode(&RecodeOptions {
            range,
            ..RecodeOptions::from_config(&self.config)
        })?;
        let rename = self.rename(&RenameOptions {
            range,
            ..RenameOptions::default()
        })?;
        Ok((recode, rename))
    }

    fn explicit_or(
        &self,
        explicit: Option<&Path>,
        list: impl FnOnce() -> Result<Vec<PathBuf>>,
    ) -> Result<Vec<PathBuf>> {
        match explicit {
            Some(path) => Ok(vec![path.to_path_buf()]),
            None => list(),
        }
    }
}

/// `dir/subA.srt` + `movie.mkv` -> `dir/movie.srt`
pub fn renamed_subtitle(sub: &Path, movie: &Path) -> PathBuf {
    let mut name: OsString = movie.file_stem().unwrap_or_default().to_owned();
    if let Some(ext) = sub.extension() {
        name.push(".");
        name.push(ext);
    }
    sub.with_file_name(name)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
