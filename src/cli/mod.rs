//! Wine quality CLI
//!
//! Command-line entry points for each pipeline stage, the full run, one-off
//! predictions and the prediction server.

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::artifact::load_json;
use crate::config::{AppConfig, CONFIG_DIR_ENV};
use crate::inference::{PredictionForm, PredictionOutcome, Predictor};
use crate::metrics::RegressionMetrics;
use crate::pipeline::{EvaluationPaths, EvaluationRecord, PipelineRunner, Stage};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn fail(s: &str) -> ColoredString   { s.truecolor(230, 100, 100) }

fn kv(key: &str, val: &str) {
    println!("  {:<22} {}", muted(key), val.white());
}

fn step_run(msg: &str) {
    println!("  {} {}...", accent("›"), msg);
}

fn step_done(msg: &str, detail: &str) {
    println!("  {} {} {}", ok("✓"), msg, dim(detail));
}

fn step_failed(msg: &str) {
    println!("  {} {}", fail("✗"), msg);
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "winequality")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Wine quality regression pipeline: train, evaluate and serve")]
#[command(long_about = None)]
pub struct Cli {
    /// Directory holding config.toml, schema.toml and params.toml
    #[arg(long, global = true, env = CONFIG_DIR_ENV)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every pipeline stage in order
    Run,
    /// Check that the raw dataset is in place
    Ingest,
    /// Validate raw dataset columns against the schema
    Validate,
    /// Split the raw dataset into train and test CSVs
    Prepare,
    /// Fit the preprocessor and write transformed arrays
    Transform,
    /// Fit the elastic-net model
    Train,
    /// Score the model on both splits
    Evaluate,
    /// Predict the quality of one wine
    Predict(PredictArgs),
    /// Serve predictions over HTTP
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080", env = "API_PORT")]
        port: u16,

        /// Host to bind
        #[arg(long, default_value = "127.0.0.1", env = "API_HOST")]
        host: String,
    },
}

/// Raw measurements for one wine
#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    #[arg(long)]
    pub fixed_acidity: f64,
    #[arg(long)]
    pub volatile_acidity: f64,
    #[arg(long)]
    pub citric_acid: f64,
    #[arg(long)]
    pub residual_sugar: f64,
    #[arg(long)]
    pub chlorides: f64,
    #[arg(long)]
    pub free_sulfur_dioxide: f64,
    #[arg(long)]
    pub total_sulfur_dioxide: f64,
    #[arg(long)]
    pub density: f64,
    #[arg(long = "ph")]
    pub ph: f64,
    #[arg(long)]
    pub sulphates: f64,
    #[arg(long)]
    pub alcohol: f64,
    /// red or white
    #[arg(long)]
    pub color: Option<String>,
}

impl From<PredictArgs> for PredictionForm {
    fn from(args: PredictArgs) -> Self {
        PredictionForm {
            fixed_acidity: args.fixed_acidity,
            volatile_acidity: args.volatile_acidity,
            citric_acid: args.citric_acid,
            residual_sugar: args.residual_sugar,
            chlorides: args.chlorides,
            free_sulfur_dioxide: args.free_sulfur_dioxide,
            total_sulfur_dioxide: args.total_sulfur_dioxide,
            density: args.density,
            ph: args.ph,
            sulphates: args.sulphates,
            alcohol: args.alcohol,
            color: args.color,
        }
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

fn load_config(config_dir: Option<&Path>) -> anyhow::Result<AppConfig> {
    let dir = AppConfig::resolve_dir(config_dir);
    Ok(AppConfig::load(&dir)?)
}

/// Run the given stages in order, stopping at the first failure.
pub fn cmd_stages(config_dir: Option<&Path>, stages: &[Stage]) -> anyhow::Result<()> {
    let config = load_config(config_dir)?;
    let runner = PipelineRunner::new(config);

    section("Pipeline");
    let total = Instant::now();
    for &stage in stages {
        step_run(stage.name());
        let start = Instant::now();
        if let Err(e) = runner.run_stage(stage) {
            step_failed(&format!("{}: {}", stage, e.root()));
            return Err(e.into());
        }
        step_done(stage.name(), &format!("{:?}", start.elapsed()));
    }

    if stages.contains(&Stage::Evaluation) {
        print_scores(&EvaluationPaths::new(&runner.config().stages.model_evaluation).scores)?;
    }
    println!();
    println!("  {} {}", muted("Total"), format!("{:?}", total.elapsed()).white());
    println!();
    Ok(())
}

fn print_scores(path: &Path) -> anyhow::Result<()> {
    let record: EvaluationRecord = load_json(path)?;
    section("Scores");
    print_metrics("Train", &record.train_metrics);
    print_metrics("Test", &record.test_metrics);
    kv("Iterations", &record.model_info.iteration_count.to_string());
    kv("Converged", &record.model_info.converged.to_string());
    kv("Dual gap", &format!("{:.2e}", record.model_info.dual_gap));
    Ok(())
}

fn print_metrics(split: &str, m: &RegressionMetrics) {
    println!("  {}", accent(split));
    kv("  MAE", &format!("{:.2}", m.mae));
    kv("  RMSE", &format!("{:.2}", m.rmse));
    kv("  MAPE", &format!("{:.2}%", m.mape));
    kv("  R²", &format!("{:.2}", m.r2));
    kv("  Adjusted R²", &format!("{:.2}", m.adjusted_r2));
}

pub fn cmd_predict(config_dir: Option<&Path>, args: PredictArgs) -> anyhow::Result<PredictionOutcome> {
    let config = load_config(config_dir)?;
    section("Predict");

    let form = PredictionForm::from(args);
    form.validate()?;
    let predictor = Predictor::load(&config.stages.model_prediction)?;
    let score = predictor.predict(&form.to_raw_row())?;
    let outcome = PredictionOutcome::from_score(score);

    kv("Quality", &outcome.quality.to_string());
    kv("Score", &format!("{:.4}", outcome.score));
    println!();
    Ok(outcome)
}

pub async fn cmd_serve(config_dir: Option<&Path>, host: &str, port: u16) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    let config = load_config(config_dir)?;
    section("Serve");
    kv("Predict", &format!("POST http://{}:{}/api/predict", host, port));
    kv("Health", &format!("GET  http://{}:{}/api/health", host, port));
    println!("  {}", dim("ctrl+c to stop"));
    println!();

    let mut server = ServerConfig::new(config.stages.model_prediction);
    server.host = host.to_string();
    server.port = port;
    run_server(server).await
}
