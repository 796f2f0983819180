use std::fs;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;

use crate::config::Config;

/// Simple file logger for merge operations with buffered writes
pub struct FileLogger {
    writer: BufWriter<File>,
}

impl FileLogger {
    /// Create a new file logger, writing to ~/logs/episode-tools/ep_merge_<timestamp>.log
    pub(crate) fn new() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Failed to get home directory")?;
        let log_dir = home_dir.join("logs").join("episode-tools");

        // Create log directory if it doesn't exist
        if !log_dir.exists() {
            fs::create_dir_all(&log_dir).context("Failed to create log directory")?;
        }

        let log_path = log_dir.join(format!("ep_merge_{}.log", Local::now().format("%Y-%m-%d_%H-%M-%S")));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Log when starting the program
    pub(crate) fn log_init(&mut self, config: &Config) {
        let _ = writeln!(self.writer, "[{}] INIT \"{}\"", Self::timestamp(), config.path.display());
        let _ = writeln!(self.writer, "  pattern: {}", config.pattern_text);
        let _ = writeln!(self.writer, "  sample: {}", config.sample);
        if let Some(ref identifier) = config.identifier {
            let _ = writeln!(self.writer, "  identifier: {identifier}");
        }
        let _ = writeln!(self.writer, "  overwrite: {}", config.overwrite);
        let _ = writeln!(self.writer, "  verbose: {}", config.verbose);
        let _ = self.writer.flush();
    }

    /// Log when starting a merge operation
    pub(crate) fn log_start(&mut self, output: &Path, group_index: &str, num_parts: usize) {
        let _ = writeln!(
            self.writer,
            "[{}] START   {} - \"{}\" | {} part(s)",
            Self::timestamp(),
            group_index,
            output.display(),
            num_parts
        );
        let _ = self.writer.flush();
    }

    /// Log when a merge finishes successfully
    pub(crate) fn log_success(&mut self, output: &Path, group_index: &str, duration: Duration) {
        let size_info = fs::metadata(output)
            .map(|m| format!(" | {}", episode_tools::format_size(m.len())))
            .unwrap_or_default();
        let _ = writeln!(
            self.writer,
            "[{}] SUCCESS {} - \"{}\" | Time: {}{}",
            Self::timestamp(),
            group_index,
            output.display(),
            episode_tools::format_duration(duration),
            size_info
        );
        let _ = self.writer.flush();
    }

    /// Log when a merge fails
    pub(crate) fn log_failure(&mut self, output: &Path, group_index: &str, error: &str) {
        let _ = writeln!(
            self.writer,
            "[{}] ERROR   {} - \"{}\" | {}",
            Self::timestamp(),
            group_index,
            output.display(),
            error
        );
        let _ = self.writer.flush();
    }

    /// Log final counts
    pub(crate) fn log_end(&mut self, merged: usize, failed: usize, total_duration: Duration) {
        let _ = writeln!(self.writer, "[{}] STATISTICS", Self::timestamp());
        let _ = writeln!(self.writer, "  Groups merged: {merged}");
        let _ = writeln!(self.writer, "  Groups failed: {failed}");
        let _ = writeln!(
            self.writer,
            "  Total time: {}",
            episode_tools::format_duration(total_duration)
        );
        let _ = writeln!(self.writer, "[{}] END", Self::timestamp());
        let _ = self.writer.flush();
    }
}
