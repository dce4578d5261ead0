//! Command-line interface
//!
//! Training, prediction and model inspection commands.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::data::OrderRequest;
use crate::error::Result;
use crate::inference::Predictor;
use crate::training::{Trainer, TrainerConfig};

fn step(msg: &str) {
    println!("{} {}", "›".blue(), msg);
}

fn done(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

fn section(title: &str) {
    println!();
    println!("{}", title.white().bold());
    println!("{}", "─".repeat(48).dimmed());
}

#[derive(Parser)]
#[command(name = "delivery-eta")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Food-delivery duration estimation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a model on synthetic order data and save the bundle
    Train {
        /// Number of synthetic orders to generate
        #[arg(long, default_value_t = 50_000)]
        samples: usize,
        /// Number of trees in the forest
        #[arg(long, default_value_t = 100)]
        trees: usize,
        /// Maximum tree depth
        #[arg(long, default_value_t = 15)]
        max_depth: usize,
        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Output path for the model bundle
        #[arg(long, default_value = "delivery_time_model.bin")]
        output: PathBuf,
        /// Output path for the JSON metadata mirror
        #[arg(long, default_value = "model_metadata.json")]
        metadata: PathBuf,
    },
    /// Predict delivery time for an order described in a JSON file
    Predict {
        /// Path to the model bundle
        #[arg(long, default_value = "delivery_time_model.bin")]
        model: PathBuf,
        /// Path to a JSON file with the order fields
        #[arg(long)]
        input: PathBuf,
    },
    /// Show metadata of a trained model
    Info {
        /// Path to the model bundle
        #[arg(long, default_value = "delivery_time_model.bin")]
        model: PathBuf,
    },
}

pub fn cmd_train(
    samples: usize,
    trees: usize,
    max_depth: usize,
    seed: u64,
    output: &Path,
    metadata: &Path,
) -> Result<()> {
    let start = Instant::now();

    let config = TrainerConfig::default()
        .with_samples(samples)
        .with_estimators(trees)
        .with_max_depth(max_depth)
        .with_seed(seed);

    step(&format!("training on {} synthetic orders", samples));
    let artifacts = Trainer::new(config).run()?;

    section("model performance");
    println!("  mean absolute error   {:.2} min", artifacts.metrics.mae);
    println!("  root mean sq. error   {:.2} min", artifacts.metrics.rmse);
    println!("  r2 score              {:.3}", artifacts.metrics.r2);

    section("top features");
    for fi in artifacts.feature_importance.iter().take(5) {
        println!("  {:<28} {:.3}", fi.feature, fi.importance);
    }

    artifacts.save(output)?;
    artifacts.write_metadata(metadata)?;

    println!();
    done(&format!(
        "model saved to {} ({:.1}s)",
        output.display(),
        start.elapsed().as_secs_f64()
    ));
    done(&format!("metadata saved to {}", metadata.display()));

    Ok(())
}

pub fn cmd_predict(model: &Path, input: &Path) -> Result<()> {
    let mut predictor = Predictor::new();
    predictor.load_model(model)?;

    let json = std::fs::read_to_string(input)?;
    let request: OrderRequest = serde_json::from_str(&json)?;
    let df = request.to_dataframe()?;

    let result = predictor.predict_with_breakdown(&df)?;

    section("prediction");
    println!(
        "  estimated time        {:.1} min",
        result.prediction.estimated_time
    );
    println!(
        "  confidence            {:.2}",
        result.prediction.confidence
    );

    section("breakdown");
    println!("  preparation           {} min", result.breakdown.preparation_time);
    println!("  travel                {} min", result.breakdown.travel_time);
    println!("  weather delay         {} min", result.breakdown.weather_delay);
    println!("  traffic and other     {} min", result.breakdown.traffic_and_other);

    Ok(())
}

pub fn cmd_info(model: &Path) -> Result<()> {
    let mut predictor = Predictor::new();
    predictor.load_model(model)?;

    let info = predictor.model_info()?;

    section("model info");
    println!("  trained               {}", info.training_date);
    println!("  training samples      {}", info.training_samples);
    println!("  mae                   {:.2} min", info.metrics.mae);
    println!("  rmse                  {:.2} min", info.metrics.rmse);
    println!("  r2                    {:.3}", info.metrics.r2);

    section("top features");
    for fi in &info.feature_importance {
        println!("  {:<28} {:.3}", fi.feature, fi.importance);
    }

    Ok(())
}
