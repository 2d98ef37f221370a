//! Command-line interface for training, prediction, and serving

use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::artifact::{ArtifactGeneration, ArtifactStore};
use crate::features;
use crate::inference::Predictor;
use crate::pipeline::GrowthPipeline;
use crate::schema;
use crate::training::ForestConfig;

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString {
    s.truecolor(100, 100, 100)
}
fn accent(s: &str) -> ColoredString {
    s.truecolor(120, 170, 255)
}
fn muted(s: &str) -> ColoredString {
    s.truecolor(140, 140, 140)
}
fn ok(s: &str) -> ColoredString {
    s.truecolor(100, 210, 120)
}

fn line_box_top() {
    println!("  {}", dim("┌─────────────────────────────────────────────────────────┐"));
}
fn line_box_bottom() {
    println!("  {}", dim("└─────────────────────────────────────────────────────────┘"));
}
fn line_box_sep() {
    println!("  {}", dim("├─────────────────────────────────────────────────────────┤"));
}

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).len();
    let pad = if visible_len < W { W - visible_len } else { 0 };
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).len();
    let total_pad = if visible_len < W { W - visible_len } else { 0 };
    let left = total_pad / 2;
    let right = total_pad - left;
    println!(
        "  {}  {}{}{} {}",
        dim("│"),
        " ".repeat(left),
        content,
        " ".repeat(right),
        dim("│")
    );
}

fn line_box_empty() {
    line_box("");
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' {
            in_escape = true;
            continue;
        }
        if in_escape {
            if c == 'm' {
                in_escape = false;
            }
            continue;
        }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "growthcast")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Business growth rate prediction service")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a growth model from a CSV file
    Train {
        /// Input data file (CSV)
        #[arg(short, long)]
        data: PathBuf,

        /// Output artifact file (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of trees in the forest
        #[arg(long, default_value = "40")]
        trees: usize,
    },

    /// Score a CSV file with a saved artifact
    Predict {
        /// Saved artifact file (JSON)
        #[arg(short, long)]
        model: PathBuf,

        /// Input data file (CSV)
        #[arg(short, long)]
        data: PathBuf,

        /// Output predictions file (CSV)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the web server
    Serve {
        /// Server port
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Server host
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },
}

// ─── Data loading ──────────────────────────────────────────────────────────────

pub fn load_csv(path: &PathBuf) -> anyhow::Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(1000))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.clone()))?
        .finish()?;
    Ok(df)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(data_path: &PathBuf, output: Option<&Path>, trees: usize) -> anyhow::Result<()> {
    section("Train");

    step_run("Loading data");
    let start = Instant::now();
    let df = load_csv(data_path)?;
    step_done(&format!(
        "{} rows × {} cols in {:?}",
        df.height(),
        df.width(),
        start.elapsed()
    ));

    step_run(&format!("Training forest ({} trees)", trees));
    let start = Instant::now();
    let pipeline = GrowthPipeline::new(ForestConfig::default().with_n_estimators(trees));
    let (table, generation) = pipeline.train(&df)?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    println!(
        "  {:<16} {}",
        muted("RMSE"),
        format!("{:.4}", generation.metrics.rmse).white().bold()
    );
    println!(
        "  {:<16} {}",
        muted("R²"),
        format!("{:.4}", generation.metrics.r2).white().bold()
    );
    println!("  {:<16} {}", muted("Train rows"), generation.metrics.n_train);
    println!("  {:<16} {}", muted("Test rows"), generation.metrics.n_test);
    println!("  {:<16} {}", muted("Rows kept"), table.height());

    section("Feature importance");
    let importances = generation.forest.feature_importances();
    for (name, weight) in generation.feature_names.iter().zip(importances.iter()) {
        println!("  {:<24} {:>8.4}", name, weight);
    }

    if let Some(path) = output {
        println!();
        generation.save(path)?;
        step_ok(&format!("Artifact saved → {}", path.display()));
    }

    println!();
    Ok(())
}

pub fn cmd_predict(
    model_path: &Path,
    data_path: &PathBuf,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    section("Predict");

    step_run("Loading artifact");
    let generation = ArtifactGeneration::load(model_path)?;
    step_done(&format!(
        "generation {} ({} trees)",
        generation.id,
        generation.forest.n_trees()
    ));

    step_run("Loading data");
    let df = load_csv(data_path)?;
    step_done(&format!("{} rows × {} cols", df.height(), df.width()));

    let store = Arc::new(ArtifactStore::new());
    store.put(generation);
    let predictor = Predictor::new(store);

    step_run("Scoring");
    let start = Instant::now();
    let predictions = predictor.predict_batch(&df)?;
    step_done(&format!("{} rows in {:?}", predictions.len(), start.elapsed()));

    let mut scored = features::engineer(&df)?;
    scored.with_column(Series::new(schema::PREDICTED.into(), predictions))?;

    if let Some(path) = output {
        let mut file = std::fs::File::create(path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut scored)?;
        step_ok(&format!("Predictions saved → {}", path.display()));
    } else {
        println!();
        println!("{}", scored.head(Some(10)));
    }

    println!();
    Ok(())
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(host: &str, port: u16) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Growthcast".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("API    ", &format!("http://{}:{}/api", host, port)));
    line_box(&kv("Health ", &format!("http://{}:{}/api/health", host, port)));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    let config = ServerConfig {
        host: host.to_string(),
        port,
        ..Default::default()
    };

    run_server(config).await
}
