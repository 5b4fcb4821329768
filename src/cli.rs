use crate::{
    config::{Config, Credentials},
    detect,
    engine::{azure::AzureLayoutEngine, OutputFormat},
    pipeline::{render_comparison, Analyzer},
    util::{ensure_dir, read_text_lossy},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "layout-check")]
#[command(about = "Send documents to a layout-analysis service and check which format came back")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./layout-check.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify a local text file without calling the service.
    Detect {
        #[arg(long)]
        input: PathBuf,
    },
    Analyze {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Default)]
        format: OutputFormat,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Analyze one document once per configured format and summarize.
    Compare {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Compare formats on the first configured document, then analyze all of them.
    Run {
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref());
    let cfg = match args.config {
        Some(_) => Config::load(&cfg_path)?,
        None => Config::load_or_default(&cfg_path)?,
    };

    let log_path = resolve_log_path(&cfg);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;

    match &args.cmd {
        Command::Detect { input } => detect_file(input),
        Command::Analyze {
            input,
            format,
            out_dir,
        } => {
            let analyzer = build_analyzer(&cfg)?;
            let out_dir = resolve_out_dir(&cfg, out_dir.as_deref());
            let out = analyzer.analyze_document(input, *format, &out_dir)?;
            if cfg.global.print_summary {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "input": input,
                        "requested": format,
                        "detected": out.report.detected.to_string(),
                        "content_file": out.content_path,
                        "report_file": out.report_path,
                    }))?
                );
            }
            Ok(())
        }
        Command::Compare { input, out_dir } => {
            let analyzer = build_analyzer(&cfg)?;
            let out_dir = resolve_out_dir(&cfg, out_dir.as_deref());
            let rows = analyzer.compare_formats(input, &cfg.compare.formats, &out_dir);
            print!("{}", render_comparison(&rows));
            Ok(())
        }
        Command::Run { out_dir } => {
            let analyzer = build_analyzer(&cfg)?;
            let out_dir = resolve_out_dir(&cfg, out_dir.as_deref());
            let summary = analyzer.run_batch(&cfg.inputs.documents, &out_dir);
            if summary.compared.is_some() {
                print!("{}", render_comparison(&summary.comparison));
            }
            if cfg.global.print_summary {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            info!("results in {}", out_dir.display());
            Ok(())
        }
    }
}

fn build_analyzer(cfg: &Config) -> Result<Analyzer<AzureLayoutEngine>> {
    let creds = Credentials::from_env(cfg)?;
    info!("service endpoint {}", creds.endpoint);
    let engine = AzureLayoutEngine::new(cfg, &creds)?;
    Ok(Analyzer::new(cfg, engine))
}

fn detect_file(input: &Path) -> Result<()> {
    let content = read_text_lossy(input)?;
    let counts = detect::detect_counts(&content);
    let detection = detect::resolve(counts);
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "input": input,
            "detected": detection.to_string(),
            "format": detection.format,
            "indicators": detection.indicators,
            "counts": counts,
        }))?
    );
    Ok(())
}

fn resolve_config_path(user: Option<&Path>) -> PathBuf {
    if let Some(p) = user {
        return p.to_path_buf();
    }
    let default = PathBuf::from("layout-check.toml");
    if default.exists() {
        default
    } else {
        PathBuf::from("layout-check.example.toml")
    }
}

fn resolve_out_dir(cfg: &Config, user: Option<&Path>) -> PathBuf {
    user.map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.out_dir))
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries command output; logs go to stderr.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    Some(PathBuf::from(&cfg.paths.out_dir).join("layout-check.log"))
}
