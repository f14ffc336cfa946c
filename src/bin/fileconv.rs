//! CLI binary for edgequake-fileconv.
//!
//! A thin shim over the library crate: maps CLI flags onto
//! `ConversionConfig` / `ServerConfig`, then runs a batch, lists the
//! conversion table, or starts the upload server.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_fileconv::{
    convert_batch, BatchOutput, Category, ConversionConfig, ConversionProgressCallback,
    ProgressCallback, CONVERSION_TABLE,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the batch plus a log line per
/// file. Files finish out of order when converted concurrently.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self, index: usize) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut times| times.remove(&index))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
    }

    fn on_file_start(&self, index: usize, _total: usize, input: &str) {
        if let Ok(mut times) = self.start_times.lock() {
            times.insert(index, Instant::now());
        }
        self.bar.set_message(input.to_string());
    }

    fn on_file_complete(&self, index: usize, total: usize, output_name: &str, output_bytes: u64) {
        let secs = self.elapsed_secs(index);
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}  {}",
            green("✓"),
            index + 1,
            total,
            output_name,
            dim(&format!("{output_bytes} bytes")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, total: usize, error: &str) {
        let secs = self.elapsed_secs(index);
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long messages to keep output tidy.
        let msg = if error.chars().count() > 100 {
            format!("{}\u{2026}", error.chars().take(99).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index + 1,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let failed = self.errors.load(Ordering::SeqCst);
        if failed == 0 {
            eprintln!(
                "{} {} files converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files converted  ({} failed)",
                cyan("⚠"),
                bold(&success_count.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One file
  fileconv photo.png --to png_to_jpg

  # Many files into a folder
  fileconv data/*.csv --to csv_to_json -o out/

  # Straight from a URL
  fileconv https://example.com/report.xlsx --to excel_to_csv

  # JSON summary of the batch
  fileconv notes/*.md --to md_to_html --json > result.json

  # What can be converted
  fileconv --list

  # Upload form on http://127.0.0.1:5000
  fileconv --serve

ENVIRONMENT VARIABLES:
  Every flag can be set as FILECONV_<FLAG>, e.g. FILECONV_TO=csv_to_json,
  FILECONV_BIND=0.0.0.0:8080. RUST_LOG overrides the log level.
"#;

/// Convert images, spreadsheets, structured data and Markdown between formats.
#[derive(Parser, Debug)]
#[command(
    name = "fileconv",
    version,
    about = "Convert images, spreadsheets, structured data and Markdown between formats",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local file paths or HTTP/HTTPS URLs.
    #[arg(required_unless_present_any = ["list", "serve"])]
    inputs: Vec<String>,

    /// Conversion identifier (see --list).
    #[arg(long, env = "FILECONV_TO", required_unless_present_any = ["list", "serve"])]
    to: Option<String>,

    /// Directory that receives the converted files (created if missing).
    #[arg(short, long, env = "FILECONV_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Print the conversion table and exit.
    #[arg(long)]
    list: bool,

    /// Number of files converted at the same time.
    #[arg(short, long, env = "FILECONV_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// JPEG quality (1–100) for JPEG output and images embedded in PDFs.
    #[arg(long, env = "FILECONV_JPEG_QUALITY", default_value_t = 75,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Indentation width of JSON output.
    #[arg(long, env = "FILECONV_JSON_INDENT", default_value_t = 4)]
    json_indent: usize,

    /// CSV field delimiter (a single ASCII character).
    #[arg(long, env = "FILECONV_DELIMITER", default_value_t = ',')]
    delimiter: char,

    /// Worksheet name for Excel output.
    #[arg(long, env = "FILECONV_SHEET_NAME", default_value = "Sheet1")]
    sheet_name: String,

    /// Keep JSON key order in YAML output instead of sorting keys.
    #[arg(long, env = "FILECONV_KEEP_KEY_ORDER")]
    keep_key_order: bool,

    /// HTTP download timeout in seconds for URL inputs.
    #[arg(long, env = "FILECONV_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Print the batch result as JSON on stdout.
    #[arg(long, env = "FILECONV_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "FILECONV_NO_PROGRESS")]
    no_progress: bool,

    /// Run the upload server instead of converting files.
    #[arg(long, env = "FILECONV_SERVE")]
    serve: bool,

    /// Address the upload server binds to.
    #[arg(long, env = "FILECONV_BIND", default_value = "127.0.0.1:5000")]
    bind: String,

    /// Folder for uploaded files (server mode).
    #[arg(long, env = "FILECONV_UPLOAD_DIR", default_value = "uploads")]
    upload_dir: PathBuf,

    /// Folder for converted files (server mode).
    #[arg(long, env = "FILECONV_DOWNLOAD_DIR", default_value = "downloads")]
    download_dir: PathBuf,

    /// Largest accepted upload in MiB (server mode).
    #[arg(long, env = "FILECONV_MAX_UPLOAD_MB", default_value_t = 32)]
    max_upload_mb: usize,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "FILECONV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "FILECONV_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs during a batch; the server always
    // logs requests at INFO.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.serve && !cli.list;
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

    if cli.list {
        print_table(cli.json)?;
        return Ok(());
    }

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    if cli.serve {
        return serve(&cli, config).await;
    }

    // clap enforces --to unless --list/--serve.
    let conversion = cli.to.as_deref().context("--to is required")?;

    tokio::fs::create_dir_all(&cli.output_dir)
        .await
        .with_context(|| format!("Failed to create output directory {:?}", cli.output_dir))?;

    let output = convert_batch(&cli.inputs, conversion, &cli.output_dir, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet && !show_progress {
        print_summary(&output, &cli.output_dir);
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let delimiter = u8::try_from(cli.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("Delimiter {:?} is not a single ASCII character", cli.delimiter))?;

    let mut builder = ConversionConfig::builder()
        .jpeg_quality(cli.jpeg_quality)
        .json_indent(cli.json_indent)
        .csv_delimiter(delimiter)
        .sheet_name(cli.sheet_name.clone())
        .sort_yaml_keys(!cli.keep_key_order)
        .concurrency(cli.concurrency)
        .download_timeout_secs(cli.download_timeout);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(feature = "server")]
async fn serve(cli: &Cli, conversion: ConversionConfig) -> Result<()> {
    use edgequake_fileconv::ServerConfig;

    let config = ServerConfig {
        bind_address: cli.bind.clone(),
        upload_dir: cli.upload_dir.clone(),
        download_dir: cli.download_dir.clone(),
        max_upload_bytes: cli.max_upload_mb.saturating_mul(1024 * 1024),
        conversion,
    };
    if !cli.quiet {
        eprintln!("{} Serving on {}", cyan("◆"), bold(&format!("http://{}", cli.bind)));
    }
    edgequake_fileconv::server::serve(config)
        .await
        .with_context(|| format!("Server on {} failed", cli.bind))
}

#[cfg(not(feature = "server"))]
async fn serve(_cli: &Cli, _conversion: ConversionConfig) -> Result<()> {
    anyhow::bail!("this build of fileconv does not include the `server` feature")
}

fn print_table(json: bool) -> Result<()> {
    if json {
        let rows: Vec<_> = CONVERSION_TABLE
            .iter()
            .map(|spec| {
                serde_json::json!({
                    "id": spec.id,
                    "category": spec.category,
                    "label": spec.label,
                    "input_extensions": spec.input_extensions,
                    "output_extension": spec.output_extension,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).context("Failed to serialise table")?
        );
        return Ok(());
    }

    for category in [Category::Image, Category::Data, Category::Yaml, Category::Document] {
        println!("{}", bold(category.label()));
        for spec in CONVERSION_TABLE.iter().filter(|s| s.category == category) {
            let inputs = spec
                .input_extensions
                .iter()
                .map(|e| format!(".{e}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!(
                "  {} {:<14} {} → .{}",
                cyan(&format!("{:<14}", spec.id)),
                spec.label,
                dim(&inputs),
                spec.output_extension
            );
        }
    }
    Ok(())
}

fn print_summary(output: &BatchOutput, output_dir: &std::path::Path) {
    for file in &output.files {
        match (&file.output, &file.error) {
            (Some(name), None) => eprintln!(
                "{} {} → {}",
                green("✓"),
                file.input,
                output_dir.join(name).display()
            ),
            (_, Some(e)) => eprintln!("{} {}", red("✗"), e),
            (None, None) => {}
        }
    }
    eprintln!(
        "Converted {}/{} files in {}ms",
        output.stats.converted, output.stats.total_files, output.stats.duration_ms
    );
}
