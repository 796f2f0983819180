//! Episode group merging with ffmpeg.

use std::cell::RefCell;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;
use episode_tools::grouping::{self, EpisodePart};
use episode_tools::identifier::IdPattern;
use episode_tools::output_id::OutputIdShape;
use episode_tools::print_error;

use crate::MergeArgs;
use crate::config::{Config, EncodeTarget, EpMergeConfig};
use crate::logger::FileLogger;

const FFMPEG_DEFAULT_ARGS: &[&str] = &["-hide_banner", "-nostdin", "-stats", "-loglevel", "info", "-y"];

/// Merges episode part groups into single files using ffmpeg.
pub struct Merge {
    config: Config,
    logger: RefCell<FileLogger>,
}

impl Merge {
    pub fn new(args: MergeArgs) -> Result<Self> {
        let user_config = EpMergeConfig::get_user_config();
        let config = Config::try_from_args(args, user_config)?;
        let logger = RefCell::new(FileLogger::new()?);
        Ok(Self { config, logger })
    }

    pub fn run(&self) -> Result<()> {
        let pattern = IdPattern::compile_or_default(&self.config.pattern_text);
        let shape = OutputIdShape::from_sample(&self.config.sample);

        if let Some(ref identifier) = self.config.identifier {
            self.merge_single(identifier, &pattern, &shape)
        } else {
            self.merge_batch(&pattern, &shape)
        }
    }

    /// Merge the parts of one episode picked by its identifier.
    fn merge_single(&self, identifier: &str, pattern: &IdPattern, shape: &OutputIdShape) -> Result<()> {
        let Some(id) = pattern.parse(identifier) else {
            anyhow::bail!("Invalid identifier: '{identifier}'");
        };

        let parts = grouping::scan_matching_files(&self.config.path, pattern, id.season, id.episode)?;
        if parts.is_empty() {
            println!("No parts found for {}", shape.format(id.season, id.episode));
            return Ok(());
        }

        if self.config.dryrun {
            for (index, part) in parts.iter().enumerate() {
                println!("{:>2}. {} (part {})", index + 1, part.file_name(), part.part);
            }
            return Ok(());
        }

        ensure_ffmpeg()?;
        self.logger.borrow_mut().log_init(&self.config);

        let start = Instant::now();
        self.merge_group(&parts, id.season, id.episode, shape, "[1/1]")?;
        self.logger.borrow_mut().log_end(1, 0, start.elapsed());
        Ok(())
    }

    /// Merge every episode group found in the directory.
    fn merge_batch(&self, pattern: &IdPattern, shape: &OutputIdShape) -> Result<()> {
        let groups = grouping::scan_all_groups(&self.config.path, pattern)?;
        if groups.is_empty() {
            println!("No episode parts found");
            return Ok(());
        }

        if self.config.dryrun {
            let total_parts: usize = groups.iter().map(|group| group.parts.len()).sum();
            for group in &groups {
                println!("{}: {}", shape.format(group.season, group.episode), group.parts.len());
            }
            println!("{} episode(s), {total_parts} part(s) in total", groups.len());
            return Ok(());
        }

        ensure_ffmpeg()?;
        self.logger.borrow_mut().log_init(&self.config);

        // Set up Ctrl+C handler for graceful abort
        let abort_flag = Arc::new(AtomicBool::new(false));
        let abort_flag_handler = Arc::clone(&abort_flag);

        ctrlc::set_handler(move || {
            if abort_flag_handler.load(Ordering::SeqCst) {
                // Second Ctrl+C - force exit
                std::process::exit(130);
            }
            println!("\n{}", "Received Ctrl+C, finishing current group...".yellow().bold());
            abort_flag_handler.store(true, Ordering::SeqCst);
        })
        .expect("Failed to set Ctrl+C handler");

        let total = groups.len();
        let num_digits = total.to_string().chars().count();
        let mut merged: usize = 0;
        let mut failed: usize = 0;
        let mut aborted = false;

        let start = Instant::now();
        for (index, group) in groups.iter().enumerate() {
            if abort_flag.load(Ordering::SeqCst) {
                aborted = true;
                break;
            }

            let group_index = format!("[{:>num_digits$}/{total}]", index + 1);
            match self.merge_group(&group.parts, group.season, group.episode, shape, &group_index) {
                Ok(()) => merged += 1,
                Err(e) => {
                    print_error!("{e}");
                    failed += 1;
                }
            }
        }

        if aborted {
            println!("\n{}", "Aborted by user".bold().red());
        }

        println!("{}", format!("Merged {merged} of {total} group(s)").green());
        if failed > 0 {
            println!("{}", format!("{failed} group(s) failed").red());
        }
        self.logger.borrow_mut().log_end(merged, failed, start.elapsed());
        Ok(())
    }

    /// Merge one part group into a single output file.
    fn merge_group(
        &self,
        parts: &[EpisodePart],
        season: u32,
        episode: u32,
        shape: &OutputIdShape,
        group_index: &str,
    ) -> Result<()> {
        let out_name = format!("{}.mp4", shape.format(season, episode));
        let mut output = self.config.path.join(out_name);
        if output.exists() && !self.config.overwrite {
            output = episode_tools::next_available_path(&output);
        }

        println!(
            "{}",
            format!(
                "{group_index} Merging {} part(s) into {}",
                parts.len(),
                episode_tools::path_to_filename_string(&output)
            )
            .bold()
        );
        if self.config.verbose {
            for part in parts {
                println!("  {}", part.file_name());
            }
        }

        self.logger.borrow_mut().log_start(&output, group_index, parts.len());

        let inputs: Vec<&Path> = parts.iter().map(|part| part.path.as_path()).collect();
        let mut cmd = build_concat_command(&inputs, &output, &self.config.target);
        if self.config.verbose {
            println!("{cmd:#?}");
        }

        let start = Instant::now();
        let status = run_command_isolated(&mut cmd).context("Failed to execute ffmpeg");
        match status {
            Ok(status) if status.success() => {
                let duration = start.elapsed();
                self.logger.borrow_mut().log_success(&output, group_index, duration);
                println!(
                    "{}",
                    format!("✓ Merged in {}", episode_tools::format_duration(duration)).cyan()
                );
                Ok(())
            }
            Ok(status) => {
                let error = format!("ffmpeg failed with status: {}", status.code().unwrap_or(-1));
                self.logger.borrow_mut().log_failure(&output, group_index, &error);
                // Remove partial output file if it exists
                if output.exists() {
                    let _ = std::fs::remove_file(&output);
                }
                anyhow::bail!(error)
            }
            Err(e) => {
                self.logger.borrow_mut().log_failure(&output, group_index, &e.to_string());
                Err(e)
            }
        }
    }
}

/// Check that ffmpeg can be invoked.
fn ensure_ffmpeg() -> Result<()> {
    match Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            anyhow::bail!("ffmpeg not found in PATH")
        }
        Err(e) => Err(e).context("Failed to run ffmpeg"),
    }
}

/// Build the ffmpeg command that concatenates the inputs into one output.
///
/// Every input is scaled and padded to the target frame size, resampled to the
/// target frame and audio rates, then fed into a concat filter and re-encoded
/// with libx264 and AAC.
fn build_concat_command(inputs: &[&Path], output: &Path, target: &EncodeTarget) -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(FFMPEG_DEFAULT_ARGS);
    for input in inputs {
        cmd.arg("-i").arg(input);
    }
    cmd.arg("-filter_complex")
        .arg(concat_filter(inputs.len(), target))
        .args(["-map", "[v]", "-map", "[a]"])
        .args(["-c:v", "libx264", "-crf", "20", "-preset", "veryfast"])
        .args(["-c:a", "aac", "-b:a", "192k"])
        .arg(output);
    cmd
}

/// Filter graph normalizing each input and concatenating them all.
fn concat_filter(num_inputs: usize, target: &EncodeTarget) -> String {
    use std::fmt::Write;

    let mut video = String::new();
    let mut audio = String::new();
    let mut pairs = String::new();
    for i in 0..num_inputs {
        let _ = write!(
            video,
            "[{i}:v]scale={w}:{h}:force_original_aspect_ratio=decrease,\
             pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=black,\
             fps={fps},format=yuv420p,setsar=1[v{i}];",
            w = target.width,
            h = target.height,
            fps = target.fps
        );
        let _ = write!(
            audio,
            "[{i}:a]aresample={rate},aformat=sample_fmts=fltp:channel_layouts={layout}[a{i}];",
            rate = target.sample_rate,
            layout = target.channel_layout
        );
        let _ = write!(pairs, "[v{i}][a{i}]");
    }

    format!("{video}{audio}{pairs}concat=n={num_inputs}:v=1:a=1[v][a]")
}

/// Run a command in a new process group to prevent Ctrl+C from propagating to it.
/// This allows the main program to handle the signal and finish the current group gracefully.
fn run_command_isolated(cmd: &mut Command) -> std::io::Result<ExitStatus> {
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
    }
    #[cfg(unix)]
    {
        // Set process group to 0 to prevent SIGINT propagation
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }
    cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit()).status()
}

#[cfg(test)]
mod merge_tests {
    use super::*;

    use std::path::PathBuf;

    #[test]
    fn concat_filter_normalizes_each_input() {
        let filter = concat_filter(2, &EncodeTarget::default());
        assert!(filter.starts_with("[0:v]scale=512:384:force_original_aspect_ratio=decrease,"));
        assert!(filter.contains("fps=24000/1001,format=yuv420p,setsar=1[v0];"));
        assert!(filter.contains("[1:a]aresample=48000,aformat=sample_fmts=fltp:channel_layouts=stereo[a1];"));
        assert!(filter.ends_with("[v0][a0][v1][a1]concat=n=2:v=1:a=1[v][a]"));
    }

    #[test]
    fn concat_filter_uses_configured_target() {
        let target = EncodeTarget {
            width: 1280,
            height: 720,
            fps: "25".to_string(),
            sample_rate: 44100,
            channel_layout: "mono".to_string(),
        };
        let filter = concat_filter(1, &target);
        assert!(filter.contains("scale=1280:720"));
        assert!(filter.contains("pad=1280:720"));
        assert!(filter.contains("fps=25,"));
        assert!(filter.contains("aresample=44100,"));
        assert!(filter.contains("channel_layouts=mono"));
    }

    #[test]
    fn concat_command_lists_inputs_in_order() {
        let a = PathBuf::from("S01E01a.mkv");
        let b = PathBuf::from("S01E01b.mkv");
        let inputs: Vec<&Path> = vec![&a, &b];
        let cmd = build_concat_command(&inputs, Path::new("S01E01.mp4"), &EncodeTarget::default());

        let args: Vec<String> = cmd.get_args().map(|a| a.to_string_lossy().to_string()).collect();
        let first_input = args.iter().position(|a| a == "S01E01a.mkv").unwrap();
        assert_eq!(args[first_input - 1], "-i");
        assert_eq!(args[first_input + 1], "-i");
        assert_eq!(args[first_input + 2], "S01E01b.mkv");
        assert!(args.contains(&"-filter_complex".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("S01E01.mp4"));
    }
}
