//! CLI binary for bloodtest-advisor.
//!
//! A thin terminal front end over [`UploadWidget`]: select the image,
//! upload it, optionally generate the report, and render the widget's
//! view after each step.

use anyhow::{Context, Result};
use bloodtest_advisor::{
    analyze_image, analyze_image_with_report, check_backend, AdvisorConfig, SelectedFile, Stage,
    StageError, TerminalRenderer, Theme, UiStatus, UploadWidget, WidgetObserver,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── CLI observer using indicatif ─────────────────────────────────────────────

/// Drives a spinner from widget events and logs one line per finished stage.
struct CliObserver {
    bar: ProgressBar,
    theme: Theme,
}

impl CliObserver {
    fn new(theme: Theme) -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Ready");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar, theme })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Upload => "Uploading",
        Stage::Analyze => "Analyzing",
        Stage::Report => "Generating PDF",
        Stage::HealthCheck => "Checking backend",
    }
}

impl WidgetObserver for CliObserver {
    fn on_status_change(&self, status: &UiStatus) {
        if let UiStatus::Idle = status {
            self.bar.set_prefix("Ready");
            self.bar.set_message("");
        }
    }

    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_prefix(stage_label(stage));
        self.bar.set_message("…");
    }

    fn on_stage_complete(&self, stage: Stage, output_len: usize, duration_ms: u64) {
        let t = &self.theme;
        self.bar.println(format!(
            "  {} {:<18} {}  {}",
            t.green("✓"),
            stage.to_string(),
            t.dim(&format!("{output_len:>7} bytes")),
            t.dim(&format!("{:.1}s", duration_ms as f64 / 1000.0)),
        ));
    }

    fn on_stage_error(&self, error: &StageError) {
        let t = &self.theme;
        self.bar
            .println(format!("  {} {}", t.red("✗"), t.red(&error.to_string())));
    }

    fn on_report_saved(&self, path: &Path) {
        self.bar.println(format!(
            "  {} saved {}",
            self.theme.green("✓"),
            self.theme.bold(&path.display().to_string())
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract and analyze a lab report photo
  bloodtest cbc.jpg

  # Also download the PDF report into ./reports
  bloodtest cbc.jpg --report -o reports

  # Use a local backend
  bloodtest --backend-url http://localhost:8000 cbc.jpg

  # Machine-readable output
  bloodtest --json --report cbc.jpg > result.json

  # Is the backend up?
  bloodtest --check

ENVIRONMENT VARIABLES:
  BLOODTEST_BACKEND_URL   Backend base URL
                          (default: https://bloodtest-advisor-backend.onrender.com)
  BLOODTEST_OUTPUT_DIR    Directory for downloaded reports
  RUST_LOG                Override log filter (e.g. bloodtest_advisor=debug)

Reports are saved as clinical_lab_report_<YYYYMMDD>_<HHMM>.pdf using local time.
"#;

/// Analyze blood-test report images with a remote AI backend.
#[derive(Parser, Debug)]
#[command(
    name = "bloodtest",
    version,
    about = "Analyze blood-test report images with a remote AI backend",
    long_about = "Upload an image of a blood-test report, print the extracted text and the AI \
analysis, and optionally download the analysis as a PDF report.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Image of the blood-test report (JPG, PNG, GIF, …).
    #[arg(required_unless_present = "check")]
    image: Option<PathBuf>,

    /// Generate the PDF report after a successful analysis.
    #[arg(short, long, env = "BLOODTEST_REPORT")]
    report: bool,

    /// Directory to save the PDF report in.
    #[arg(short, long, env = "BLOODTEST_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Backend base URL.
    #[arg(long, env = "BLOODTEST_BACKEND_URL")]
    backend_url: Option<String>,

    /// Per-request timeout in seconds (default: none).
    #[arg(long, env = "BLOODTEST_TIMEOUT",
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Output structured JSON (SessionOutput) instead of text.
    #[arg(long, env = "BLOODTEST_JSON")]
    json: bool,

    /// Only check that the backend is reachable.
    #[arg(long)]
    check: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "BLOODTEST_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BLOODTEST_VERBOSE")]
    verbose: bool,

    /// Suppress all output except results and errors.
    #[arg(short, long, env = "BLOODTEST_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner and stage lines cover what INFO logs would say.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let renderer = TerminalRenderer::mount(Theme::detect());
    let observer = show_progress.then(|| CliObserver::new(*renderer.theme()));
    let config = build_config(&cli, observer.clone())?;

    // ── Health check ─────────────────────────────────────────────────────
    if cli.check {
        let greeting = check_backend(&config).await;
        if let Some(ref o) = observer {
            o.finish();
        }
        let greeting = greeting.context("Backend check failed")?;
        if cli.json {
            println!(
                "{}",
                serde_json::json!({ "base_url": config.base_url, "message": greeting })
            );
        } else {
            println!("{}  {}", config.base_url, greeting);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(image) = cli.image.as_deref() else {
        anyhow::bail!("No image given");
    };

    // ── JSON mode: headless session ──────────────────────────────────────
    if cli.json {
        let output = if cli.report {
            analyze_image_with_report(image, &config).await
        } else {
            analyze_image(image, &config).await
        }
        .context("Analysis failed")?;
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(ExitCode::SUCCESS);
    }

    // ── Interactive mode: drive the widget and render its view ───────────
    let widget = UploadWidget::new(&config).context("Failed to create widget")?;
    let file = SelectedFile::from_path(image)
        .await
        .context("Failed to read image")?;
    widget.select_file(file);

    let mut ok = widget.upload().await.is_ok();
    if ok && cli.report && widget.view().show_report_action {
        ok = widget.generate_report().await.is_ok();
    }

    if let Some(ref o) = observer {
        o.finish();
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if !cli.quiet {
        handle
            .write_all(renderer.header().as_bytes())
            .context("Failed to write to stdout")?;
    }
    handle
        .write_all(renderer.render(&widget.view()).as_bytes())
        .context("Failed to write to stdout")?;

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Map CLI args to `AdvisorConfig`.
fn build_config(cli: &Cli, observer: Option<Arc<CliObserver>>) -> Result<AdvisorConfig> {
    let mut builder = AdvisorConfig::builder().output_dir(cli.output_dir.clone());

    if let Some(ref url) = cli.backend_url {
        builder = builder.base_url(url.clone());
    }
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(o) = observer {
        builder = builder.observer(o as Arc<dyn WidgetObserver>);
    }

    builder.build().context("Invalid configuration")
}
