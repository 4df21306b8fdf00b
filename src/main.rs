//! Flutter Plugin Detective - finds Flutter plugins that never get registered
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;

use detective_app::{load_settings, DetectiveConfig};
use detective_core::Platform;
use flutter_plugin_detective::{run_monitor, run_scan, MonitorOptions, ReportFormat, ScanOptions};

/// Flutter Plugin Detective - diagnose plugin registration problems
#[derive(Parser, Debug)]
#[command(name = "plugin-detective", version)]
#[command(
    about = "Finds Flutter plugins that are declared but never registered",
    long_about = None
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Diagnose a project once and print a report
    Scan(ScanArgs),

    /// Stream issues from log lines piped on stdin
    Monitor(MonitorArgs),
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Path to the Flutter project (defaults to the current directory)
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    format: ReportFormat,

    /// Write the report to a file instead of stdout
    #[arg(long, short, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Skip resolution steps
    #[arg(long)]
    no_resolutions: bool,

    /// Platform to check; repeatable, `all` for every target
    #[arg(long = "platform", value_name = "P")]
    platforms: Vec<Platform>,

    /// Plugin to leave out of the results; repeatable
    #[arg(long = "exclude", value_name = "NAME")]
    exclude: Vec<String>,

    /// Skip the manifest/registrant analysis
    #[arg(long)]
    no_static: bool,

    /// Skip the log scan
    #[arg(long)]
    no_runtime: bool,

    /// Read fewer log files and skip stack traces
    #[arg(long)]
    performance: bool,

    /// Analysis deadline in seconds; 0 disables it
    #[arg(long, value_name = "SECS")]
    max_duration: Option<u64>,

    /// Do not run `flutter --version` for metadata
    #[arg(long)]
    no_probe: bool,
}

#[derive(Args, Debug)]
struct MonitorArgs {
    /// Stop after this many seconds
    #[arg(long, value_name = "SECS")]
    duration: Option<u64>,

    /// Plugin to leave out of the stream, on top of the project settings;
    /// repeatable
    #[arg(long = "exclude", value_name = "NAME")]
    exclude: Vec<String>,
}

impl ScanArgs {
    /// Project file settings first, then flags on top
    fn into_options(self, verbose: bool) -> ScanOptions {
        let project_path = self
            .path
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let mut config: DetectiveConfig = load_settings(&project_path)
            .with_platforms(self.platforms)
            .excluding(self.exclude)
            .with_verbose(verbose);
        if self.no_static {
            config = config.with_static_analysis(false);
        }
        if self.no_runtime {
            config = config.with_runtime_detection(false);
        }
        if self.no_resolutions {
            config = config.with_resolutions(false);
        }
        if self.performance {
            config = config.with_performance_mode(true);
        }
        if let Some(secs) = self.max_duration {
            config = config.with_max_scan_duration(Duration::from_secs(secs));
        }

        ScanOptions {
            project_path,
            format: self.format,
            output: self.output,
            include_resolutions: config.generate_resolutions,
            probe_toolchain: !self.no_probe,
            config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if let Err(e) = detective_core::logging::init(cli.verbose) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let exit_code = match cli.command {
        Command::Scan(args) => {
            let status = run_scan(args.into_options(cli.verbose)).await?;
            status.exit_code()
        }
        Command::Monitor(args) => {
            let project_path = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            let options = MonitorOptions {
                duration: args.duration.map(Duration::from_secs),
                config: load_settings(&project_path)
                    .excluding(args.exclude)
                    .with_verbose(cli.verbose),
                handle_signals: true,
            };
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            let issues = run_monitor(options, input, &mut stdout).await?;
            i32::from(issues > 0)
        }
    };

    std::process::exit(exit_code);
}
