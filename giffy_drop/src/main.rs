use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::info;

use giffy_drop::{
    ConversionConfig, ConversionWorker, FrameRate, Profile, Resolution, Severity, StatusEvent,
    DISCORD_SIZE_LIMIT,
};
use shared_utils::colors;
use shared_utils::logging::{init_logging, LogConfig};
use shared_utils::progress::set_pass_fraction;
use shared_utils::{
    create_pass_bar, create_spinner, expand_inputs, is_tool_available, locate_tool,
    print_summary_report, tool_version, BatchResult, GifDropError, FFMPEG,
};

const FFMPEG_ENV: &str = "GIFFY_DROP_FFMPEG";

#[derive(Parser)]
#[command(name = "giffy-drop")]
#[command(version, about = "Two-pass palette GIF converter for Discord avatars and banners", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert videos (or folders of videos) to optimized GIFs
    Convert {
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = Profile::Avatar)]
        profile: Profile,
        /// Frame rate, 1-50 or a preset label (default: the profile's)
        #[arg(long, value_name = "FPS")]
        fps: Option<String>,
        /// Output width in pixels (default: the profile's)
        #[arg(long, conflicts_with = "original_size")]
        width: Option<u32>,
        /// Keep the source resolution
        #[arg(long)]
        original_size: bool,
        /// Default: an `output` folder next to each input
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        #[arg(long, env = FFMPEG_ENV, default_value = FFMPEG)]
        ffmpeg: PathBuf,
        /// Descend into subfolders of folder inputs
        #[arg(short, long)]
        recursive: bool,
        /// Exit with code 2 when an output exceeds the size limit
        #[arg(long)]
        strict: bool,
        /// Print outcomes as JSON instead of the status log
        #[arg(long)]
        json: bool,
        #[arg(short, long, conflicts_with = "verbose")]
        quiet: bool,
        /// Show raw ffmpeg output and log to the console
        #[arg(short, long)]
        verbose: bool,
    },

    /// Check that ffmpeg can be found
    Check {
        #[arg(long, env = FFMPEG_ENV, default_value = FFMPEG)]
        ffmpeg: PathBuf,
    },

    /// List profiles and frame-rate presets
    Profiles,
}

struct ConvertArgs {
    inputs: Vec<PathBuf>,
    profile: Profile,
    fps: Option<String>,
    width: Option<u32>,
    original_size: bool,
    output_dir: Option<PathBuf>,
    ffmpeg: PathBuf,
    recursive: bool,
    strict: bool,
    json: bool,
    quiet: bool,
    verbose: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Convert { verbose: true, .. });
    let _ = init_logging("giffy_drop", LogConfig::default().with_console(verbose));

    match cli.command {
        Commands::Convert {
            inputs,
            profile,
            fps,
            width,
            original_size,
            output_dir,
            ffmpeg,
            recursive,
            strict,
            json,
            quiet,
            verbose,
        } => run_convert(ConvertArgs {
            inputs,
            profile,
            fps,
            width,
            original_size,
            output_dir,
            ffmpeg,
            recursive,
            strict,
            json,
            quiet,
            verbose,
        }),
        Commands::Check { ffmpeg } => Ok(run_check(&ffmpeg)),
        Commands::Profiles => {
            print_profiles();
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Resolution and frame rate from the flags, falling back to the profile.
fn resolve_settings(args: &ConvertArgs) -> shared_utils::Result<(Resolution, FrameRate)> {
    let resolution = if args.original_size {
        Resolution::Original
    } else if let Some(width) = args.width {
        Resolution::width(width)?
    } else {
        args.profile.resolution()
    };
    let frame_rate = match &args.fps {
        Some(fps) => fps.parse::<FrameRate>()?,
        None => args.profile.default_frame_rate(),
    };
    Ok((resolution, frame_rate))
}

fn run_convert(args: ConvertArgs) -> anyhow::Result<ExitCode> {
    // Exit code 2 stays reserved for --strict.
    let (resolution, frame_rate) = match resolve_settings(&args) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", colors::error().apply_to(e.user_message()));
            return Ok(ExitCode::from(1));
        }
    };

    if !is_tool_available(&args.ffmpeg) {
        let err = GifDropError::ToolNotFound {
            tool: args.ffmpeg.display().to_string(),
        };
        eprintln!("{}", colors::error().apply_to(err.user_message()));
        return Ok(ExitCode::from(1));
    }

    let inputs = expand_inputs(&args.inputs, args.recursive);
    if inputs.is_empty() {
        eprintln!("{}", colors::error().apply_to("❌ No video files found"));
        return Ok(ExitCode::from(1));
    }

    info!(
        files = inputs.len(),
        profile = %args.profile,
        resolution = %resolution.label(),
        frame_rate = %frame_rate,
        "Starting conversion run"
    );

    let worker = ConversionWorker::new();
    let mut batch = BatchResult::new();
    let mut outcomes = Vec::new();
    let mut written = HashSet::new();
    let started = Instant::now();

    for input in &inputs {
        let mut config = ConversionConfig::new(input, args.profile)
            .with_resolution(resolution)
            .with_frame_rate(frame_rate)
            .with_ffmpeg(&args.ffmpeg);
        if let Some(dir) = &args.output_dir {
            config = config.with_output_dir(dir);
        }

        let output_path = config.output_path();
        if !written.insert(output_path.clone()) {
            let e = GifDropError::DuplicateOutput(output_path);
            eprintln!("{}", colors::error().apply_to(e.user_message()));
            batch.fail(input.clone(), e.to_string());
            continue;
        }

        let handle = worker.start(config)?;
        let mut printer = EventPrinter::new(args.quiet || args.json, args.verbose);
        for event in handle.events.iter() {
            printer.handle(event);
        }
        printer.finish();

        match handle.wait() {
            Ok(outcome) => {
                batch.success(outcome.size.bytes(), !outcome.verdict.is_within_limit());
                outcomes.push(outcome);
            }
            Err(e) => {
                eprintln!("{}", colors::error().apply_to(e.user_message()));
                batch.fail(input.clone(), e.to_string());
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else if inputs.len() > 1 {
        print_summary_report(&batch, started.elapsed(), "GIF Conversion");
    }

    Ok(exit_code(&batch, args.strict))
}

fn exit_code(batch: &BatchResult, strict: bool) -> ExitCode {
    if batch.failed > 0 {
        ExitCode::from(1)
    } else if strict && batch.oversized > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}

fn run_check(ffmpeg: &Path) -> ExitCode {
    match locate_tool(ffmpeg) {
        Ok(path) => {
            println!(
                "{} {}",
                colors::success().apply_to("✅ ffmpeg found:"),
                path.display()
            );
            let spinner = create_spinner("Probing ffmpeg version...", false);
            let version = tool_version(&path);
            spinner.finish_and_clear();
            if let Some(version) = version {
                println!("   {}", colors::dim().apply_to(version));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", colors::error().apply_to(e.user_message()));
            ExitCode::from(1)
        }
    }
}

fn print_profiles() {
    println!("\n🎞️  Profiles");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for profile in Profile::ALL {
        println!(
            "{} {:>4} px  {}  {}",
            colors::highlight().apply_to(format!("{:<16}", profile.label())),
            profile.width(),
            colors::fmt_fps(profile.default_frame_rate().fps()),
            colors::dim().apply_to(profile.description())
        );
    }
    println!();
    println!("⏱️  Frame rates");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for rate in FrameRate::PRESETS {
        println!("   {}", rate.label());
    }
    println!();
    println!(
        "📦 Size limit: {}",
        colors::info().apply_to(format!("{:.0} MB", DISCORD_SIZE_LIMIT.as_mb()))
    );
}

/// Renders worker events on the main thread: status text, plus one progress
/// bar per pass unless raw ffmpeg output is shown instead.
struct EventPrinter {
    quiet: bool,
    verbose: bool,
    bar: Option<ProgressBar>,
}

impl EventPrinter {
    fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            bar: None,
        }
    }

    fn handle(&mut self, event: StatusEvent) {
        match &event {
            StatusEvent::PassStarted { pass, .. } => {
                self.print(&event);
                if !self.verbose {
                    self.bar = Some(create_pass_bar(&pass.tag(), self.quiet));
                }
            }
            StatusEvent::Progress { fraction, .. } => {
                if let Some(bar) = &self.bar {
                    set_pass_fraction(bar, *fraction);
                }
            }
            StatusEvent::ToolOutput { .. } => {
                if self.verbose {
                    self.print(&event);
                }
            }
            _ => {
                self.finish();
                self.print(&event);
            }
        }
    }

    fn print(&self, event: &StatusEvent) {
        if self.quiet {
            return;
        }
        let Some(text) = event.render() else {
            return;
        };
        let styled = match event.severity() {
            Severity::Info => colors::info().apply_to(text),
            Severity::Success => colors::success().apply_to(text),
            Severity::Warning => colors::warning().apply_to(text),
            Severity::Detail => colors::dim().apply_to(text),
        };
        match &self.bar {
            Some(bar) => bar.println(styled.to_string()),
            None => println!("{}", styled),
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
