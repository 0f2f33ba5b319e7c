mod backup;
mod config;
mod encoding;
mod error;
mod fixer;
mod logging;
mod options;
mod scan;
mod shift;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use config::FixerConfig;
use error::FixError;
use fixer::{RecodeOptions, RenameOptions, RestoreOptions, ShiftOptions, SubtitleFixer};
use options::{parse_offset, IndexRange};
use shift::ShiftBy;

#[derive(Parser)]
#[command(name = "subfix")]
#[command(version)]
#[command(about = "Rename, re-encode, time-shift and restore subtitles next to their movies")]
struct Cli {
    /// Directory holding the movies and subtitles
    #[arg(short, long, value_name = "DIR", default_value = ".", global = true)]
    dir: PathBuf,

    /// Log every backup and per-file step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// `[start, stop)` over the sorted file list; negative values count from the end.
#[derive(Args, Debug, Clone, Copy)]
struct RangeArgs {
    #[arg(long, visible_alias = "start-index", default_value_t = 0, allow_negative_numbers = true)]
    start: i64,

    #[arg(long, visible_alias = "stop-index", allow_negative_numbers = true)]
    stop: Option<i64>,
}

impl From<RangeArgs> for IndexRange {
    fn from(args: RangeArgs) -> Self {
        IndexRange::new(args.start, args.stop)
    }
}

#[derive(Subcommand)]
enum Command {
    /// List movie files
    Movies,

    /// List subtitle files
    Subtitles,

    /// List subtitle backups
    Backups,

    /// Re-encode subtitles from one character encoding to another
    Recode {
        /// Recode only this subtitle instead of the directory listing
        #[arg(long, value_name = "FILE")]
        subtitle: Option<PathBuf>,

        #[arg(long, value_name = "ENCODING", default_value = config::DEFAULT_SOURCE_ENCODING)]
        source: String,

        #[arg(long, value_name = "ENCODING", default_value = config::DEFAULT_TARGET_ENCODING)]
        target: String,

        /// Overwrite existing backups
        #[arg(long)]
        force: bool,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Rename subtitles after the movie at the same sorted position
    Rename {
        /// Do not back up subtitles before renaming
        #[arg(long)]
        no_backup: bool,

        /// Overwrite existing backups
        #[arg(long)]
        force: bool,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Shift subtitle timestamps by an offset and/or a ratio
    Shift {
        /// Shift only this subtitle instead of the directory listing
        #[arg(long, value_name = "FILE")]
        subtitle: Option<PathBuf>,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        hours: i64,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        minutes: i64,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        seconds: i64,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        milliseconds: i64,

        /// Offset as seconds (1.5) or [-]HH:MM:SS.mmm, added to the fields above
        #[arg(long, value_name = "TIME", allow_hyphen_values = true, value_parser = parse_offset_arg)]
        offset: Option<i64>,

        /// Scale every timestamp by this ratio before adding the offset
        #[arg(long)]
        ratio: Option<f64>,

        /// Encoding the subtitles are read and written in
        #[arg(long, value_name = "ENCODING", default_value = config::DEFAULT_SHIFT_ENCODING)]
        encoding: String,

        /// Frame rate for frame-based .sub files
        #[arg(long, default_value_t = config::DEFAULT_FPS)]
        fps: f64,

        /// Keep an existing backup instead of overwriting it
        #[arg(long)]
        no_force: bool,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Move backups back over the subtitles they were taken from
    Restore {
        /// Restore only this backup file
        #[arg(long, value_name = "FILE")]
        backup: Option<PathBuf>,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Recode with the default encodings, then rename
    Fix {
        #[command(flatten)]
        range: RangeArgs,
    },
}

fn parse_offset_arg(s: &str) -> Result<i64, String> {
    parse_offset(s).map_err(|e| e.to_string())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let fixer = SubtitleFixer::new(
        cli.dir,
        FixerConfig::default(),
        logging::dispatch(cli.verbose),
    );

    match cli.command {
        Command::Movies => print_paths(&fixer.movies()?),
        Command::Subtitles => print_paths(&fixer.subtitles()?),
        Command::Backups => print_paths(&fixer.subtitle_backups()?),
        Command::Recode {
            subtitle,
            source,
            target,
            force,
            range,
        } => {
            fixer.recode(&RecodeOptions {
                subtitle,
                source,
                target,
                range: range.into(),
                force,
            })?;
        }
        Command::Rename {
            no_backup,
            force,
            range,
        } => {
            fixer.rename(&RenameOptions {
                range: range.into(),
                backup: !no_backup,
                force,
            })?;
        }
        Command::Shift {
            subtitle,
            hours,
            minutes,
            seconds,
            milliseconds,
            offset,
            ratio,
            encoding,
            fps,
            no_force,
            range,
        } => {
            let milliseconds = milliseconds
                .checked_add(offset.unwrap_or(0))
                .ok_or_else(|| FixError::InvalidShift("offset is out of range".to_string()))?;
            let by = ShiftBy {
                hours,
                minutes,
                seconds,
                ratio,
                ..ShiftBy::from_millis(milliseconds)
            };
            fixer.shift(&ShiftOptions {
                subtitle,
                range: range.into(),
                encoding,
                fps,
                force: !no_force,
                ..ShiftOptions::new(by, fixer.config())
            })?;
        }
        Command::Restore { backup, range } => {
            fixer.restore(&RestoreOptions {
                backup,
                range: range.into(),
            })?;
        }
        Command::Fix { range } => {
            fixer.fix(range.into())?;
        }
    }

    Ok(())
}

fn print_paths(paths: &[PathBuf]) {
    for path in paths {
        println!("{}", path.display());
    }
}
