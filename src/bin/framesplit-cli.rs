use std::{fs, path::PathBuf, sync::Arc};

use clap::Parser;
use colored::Colorize;
use framesplit::{
    ExtractOptions, FfmpegLogLevel, ProgressCallback, ProgressInfo, extract_all, find_videos,
    set_ffmpeg_log_level,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;

const CLI_AFTER_HELP: &str = "Examples:\n  framesplit-cli --input_dir videos --out_dir frames\n  framesplit-cli --input_dir videos --out_dir frames --threads 4 --verbose";

#[derive(Debug, Parser)]
#[command(
    name = "framesplit",
    version,
    about = "Split every .mp4 under a directory into numbered PNG frames",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Directory scanned recursively for .mp4 files.
    #[arg(long = "input_dir", alias = "input-dir")]
    input_dir: PathBuf,

    /// Directory receiving one frame folder per video (created if missing).
    #[arg(long = "out_dir", alias = "out-dir")]
    out_dir: PathBuf,

    /// Number of videos processed concurrently (default: logical CPU count).
    #[arg(long)]
    threads: Option<usize>,

    /// Show debug logging.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, default_value = "error")]
    log_level: FfmpegLogLevel,

    /// Hide the progress bar.
    #[arg(long)]
    no_progress: bool,
}

struct BarProgress {
    bar: ProgressBar,
}

impl ProgressCallback for BarProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_position(info.current);
        if let Some(name) = info.video.file_name() {
            self.bar.set_message(name.to_string_lossy().into_owned());
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn progress_bar(total: u64) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let bar = ProgressBar::new(total);
    let style = ProgressStyle::with_template(
        "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} videos [{elapsed_precise}<{eta_precise}] {msg}",
    )?;
    bar.set_style(style.progress_chars("##-"));
    Ok(bar)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    set_ffmpeg_log_level(cli.log_level);

    fs::create_dir_all(&cli.out_dir)?;

    let videos = find_videos(&cli.input_dir)?;
    if videos.is_empty() {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("no .mp4 files found under {}", cli.input_dir.display()).yellow()
        );
    }

    let mut options = ExtractOptions::new().with_workers(cli.threads.unwrap_or(0));
    let bar = if cli.no_progress {
        None
    } else {
        let bar = progress_bar(videos.len() as u64)?;
        options = options.with_progress(Arc::new(BarProgress { bar: bar.clone() }));
        Some(bar)
    };

    let result = extract_all(&videos, &cli.out_dir, &options);
    if let Some(bar) = bar {
        if result.is_ok() {
            bar.finish_with_message("done");
        } else {
            bar.abandon();
        }
    }
    let report = result?;

    for skipped in &report.skipped {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("skipped {} ({})", skipped.path.display(), skipped.reason).yellow()
        );
    }

    println!(
        "{} {}",
        "success:".green().bold(),
        format!(
            "Extracted {} frame(s) from {} video(s) into {} ({} skipped)",
            report.frames,
            report.extracted,
            cli.out_dir.display(),
            report.skipped.len()
        )
        .green()
    );

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
