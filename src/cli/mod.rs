// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and hands off to Layer 2.
//
//   1. `train`   — train on MNIST, report test accuracy,
//                  optionally save the model
//   2. `serve`   — load the model once, serve POST /predict
//   3. `predict` — classify a local image through the same
//                  path the HTTP endpoint uses
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, PredictArgs, ServeArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "digit-recognizer",
    version,
    about = "Train an MLP on MNIST digits and serve predictions for uploaded images."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Serve(args)   => run_serve(args),
            Commands::Predict(args) => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on MNIST in: {}", args.data_dir);

    let report = TrainUseCase::new(args.into()).execute()?;

    if let Some(last) = report.history.last() {
        println!(
            "Final epoch: loss={:.4}, train accuracy={:.2}%",
            last.train_loss,
            last.train_accuracy * 100.0
        );
    }
    println!(
        "Test accuracy: {:.2}% ({}/{})",
        report.evaluation.accuracy_percent(),
        report.evaluation.correct,
        report.evaluation.total
    );
    match report.artifact {
        Some(path) => println!("Model saved to {}", path.display()),
        None => println!("Model not saved (pass --save-model to keep it)."),
    }
    Ok(())
}

fn run_serve(args: ServeArgs) -> Result<()> {
    let config = args.into();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the tokio runtime")?;
    runtime.block_on(crate::api::serve(&config))
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::{PredictResponse, PredictUseCase};

    let use_case = PredictUseCase::from_model_dir(&args.model_dir)?;
    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("Cannot read image '{}'", args.image))?;

    let response = use_case.respond(&bytes);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        if !response.is_success() {
            anyhow::bail!("Prediction failed for '{}'", args.image);
        }
        return Ok(());
    }

    match response {
        PredictResponse::Success { prediction, probabilities, .. } => {
            println!("\nPrediction: {prediction}");
            for (digit, p) in probabilities.iter().enumerate() {
                println!("  {digit}: {p:.4}");
            }
            Ok(())
        }
        PredictResponse::Failure { message } => anyhow::bail!("{message}"),
    }
}
