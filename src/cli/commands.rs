// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands: `train`, `serve` and `predict`.
//
// Every flag has a default, so `digit-recognizer train` runs
// the standard configuration. Args convert into application
// configs through From, the only place clap types are seen.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::api::ServeConfig;
use crate::application::train_use_case::TrainConfig;
use crate::domain::hyperparameters::Hyperparameters;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the digit classifier on MNIST
    Train(TrainArgs),

    /// Serve POST /predict with a trained model
    Serve(ServeArgs),

    /// Classify one local image file
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Number of full passes through the training set
    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    /// Samples per gradient step
    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// Width of both hidden layers
    #[arg(long, default_value_t = 256)]
    pub hidden_units: usize,

    /// Dropout probability after the first hidden layer
    #[arg(long, default_value_t = 0.45)]
    pub dropout: f64,

    /// Adam step size
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Seeds weight init, shuffling and dropout
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Directory holding the four uncompressed MNIST IDX files
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Where digit_mlp.mpk and metrics.csv are written
    #[arg(long, default_value = "trained_models")]
    pub save_dir: String,

    /// Save the trained model (off by default)
    #[arg(long)]
    pub save_model: bool,

    /// No per-epoch progress lines
    #[arg(long)]
    pub quiet: bool,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir: a.data_dir,
            save_dir: a.save_dir,
            hyperparameters: Hyperparameters {
                hidden_units:  a.hidden_units,
                dropout:       a.dropout,
                epochs:        a.epochs,
                batch_size:    a.batch_size,
                learning_rate: a.lr,
                seed:          a.seed,
            },
            save_model: a.save_model,
            quiet:      a.quiet,
        }
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Directory containing digit_mlp.mpk
    #[arg(long, default_value = "trained_models")]
    pub model_dir: String,

    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, default_value_t = 5000)]
    pub port: u16,
}

impl From<ServeArgs> for ServeConfig {
    fn from(a: ServeArgs) -> Self {
        ServeConfig { model_dir: a.model_dir, host: a.host, port: a.port }
    }
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Directory containing digit_mlp.mpk
    #[arg(long, default_value = "trained_models")]
    pub model_dir: String,

    /// Image file to classify (any format the image crate decodes)
    #[arg(long)]
    pub image: String,

    /// Print the same JSON body the HTTP endpoint returns
    #[arg(long)]
    pub json: bool,
}
