//! Application entry point: speech emotion recognition CLI.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] (from `--config`, else the platform settings file,
//!    else defaults) and validate it.
//! 3. Resolve and load the classifier once ([`SharedModel`]).
//! 4. Create a [`tokio`] runtime and analyse every input file concurrently.
//! 5. Print one line (or JSON object) per file.
//!
//! Exit status: `0` when every file was analysed, `1` when at least one
//! analysis was unavailable, `2` when the configuration or model is unusable.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use speech_emotion::{
    config::{AppConfig, AppPaths},
    model::{ModelPaths, SharedModel, MODEL_INFO},
    pipeline::{analyze_files, FileOutcome, InferencePipeline},
};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// Classify the emotion expressed in speech recordings.
#[derive(Parser, Debug)]
#[command(name = "speech-emotion", version, about)]
struct Args {
    /// Audio files to analyse (.wav, .mp3, .flac, .ogg, .m4a).
    #[arg(required_unless_present_any = ["model_info", "init_config"])]
    files: Vec<PathBuf>,

    /// Classifier weights (safetensors).  Overrides the configured path.
    #[arg(long, value_name = "FILE")]
    weights: Option<PathBuf>,

    /// Settings file to use instead of the platform default.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print one JSON object per line instead of plain text.
    #[arg(long)]
    json: bool,

    /// Print model metadata and exit.
    #[arg(long)]
    model_info: bool,

    /// Write the default settings file if none exists yet, then exit.
    #[arg(long)]
    init_config: bool,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn render(outcome: &FileOutcome, json: bool) -> Result<String> {
    let path = outcome.path.display().to_string();
    match (&outcome.result, json) {
        (Ok(r), false) => Ok(format!(
            "{path}: {} ({:.1}%)",
            r.emotion,
            r.confidence * 100.0
        )),
        (Ok(r), true) => Ok(serde_json::to_string(&serde_json::json!({
            "file": path,
            "emotion": r.emotion,
            "confidence": r.confidence,
            "all_scores": r.all_scores,
        }))?),
        (Err(_), false) => Ok(format!("{path}: analysis unavailable")),
        (Err(e), true) => Ok(serde_json::to_string(&serde_json::json!({
            "file": path,
            "error": "analysis unavailable",
            "stage": e.stage().label(),
        }))?),
    }
}

fn print_model_info(paths: &ModelPaths) {
    let status = if paths.is_available(&MODEL_INFO) {
        "installed"
    } else {
        "missing"
    };
    println!("{} v{}", MODEL_INFO.name, MODEL_INFO.version);
    println!("  architecture:   {}", MODEL_INFO.architecture);
    println!("  input features: {}", MODEL_INFO.input_features);
    println!("  accuracy:       {}", MODEL_INFO.accuracy);
    println!("  datasets:       {}", MODEL_INFO.datasets.join(", "));
    println!(
        "  weights:        {} ({status})",
        paths.model_path(&MODEL_INFO).display()
    );
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config ({e}); using defaults");
            AppConfig::default()
        }),
    };
    if let Some(weights) = &args.weights {
        config.model.weights_file = Some(weights.clone());
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn run(args: Args) -> Result<ExitCode> {
    if args.model_info {
        print_model_info(&ModelPaths::from_app_paths(&AppPaths::new()));
        return Ok(ExitCode::SUCCESS);
    }

    if args.init_config {
        let paths = AppPaths::new();
        if AppConfig::is_first_run() {
            AppConfig::default().save()?;
            println!("wrote {}", paths.settings_file.display());
        } else {
            println!("{} already exists", paths.settings_file.display());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(&args)?;

    let model = SharedModel::from_config(&config, &AppPaths::new());
    let classifier = match model.get_or_load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("model unavailable ({}): {e}", model.path().display());
            return Ok(ExitCode::from(2));
        }
    };

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    let pipeline = Arc::new(InferencePipeline::from_config(&config));
    let outcomes = rt.block_on(analyze_files(pipeline, classifier, args.files));

    let mut all_ok = true;
    for outcome in &outcomes {
        all_ok &= outcome.result.is_ok();
        println!("{}", render(outcome, args.json)?);
    }

    Ok(if all_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn main() -> ExitCode {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
