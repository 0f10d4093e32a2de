//! Models whose fields become the trainer's command-line options.

use std::sync::Arc;

use camino::Utf8PathBuf;
use model_opts::{Choice, Model, ModelCheck, ModelError, ModelResult, Secret};
use serde::{Deserialize, Serialize};

/// Learning-rate schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Choice)]
#[serde(rename_all = "kebab-case")]
pub enum Schedule {
    /// Keep the rate fixed.
    Constant,
    /// Anneal the rate along a cosine curve.
    CosineDecay,
}

/// Optimiser settings.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, Model)]
pub struct Optimizer {
    /// Step size.
    #[model(default = 1e-4, gt = 0)]
    pub lr: f64,
    /// Momentum factor.
    #[model(default = 0.9, ge = 0, lt = 1, short = "-m")]
    pub momentum: f64,
    /// How the step size changes over the run.
    #[model(default = Schedule::Constant)]
    pub schedule: Schedule,
}

/// Where the training data comes from.
#[derive(Clone, Debug, Deserialize, Serialize, Model)]
pub struct Dataset {
    /// Directory holding the training shards.
    #[model(default = Utf8PathBuf::from("data"), metavar = "DIR")]
    pub path: Utf8PathBuf,
    /// Token for the remote shard store.
    #[model(env = "TRAINER_TOKEN")]
    #[serde(default, skip_serializing)]
    pub token: Option<Secret>,
}

/// One training run.
///
/// Attributes:
///     epochs: Number of passes over the data.
///     early_stopping: Stop when the validation loss stalls.
///     layers: Hidden layer widths as a JSON list.
#[derive(Clone, Debug, Deserialize, Serialize, Model)]
#[model(check)]
pub struct Training {
    /// Passes over the dataset.
    #[model(short = "-e")]
    pub epochs: u32,
    /// Whether to stop early.
    #[model(default = false)]
    pub early_stopping: bool,
    /// Hidden layer widths.
    #[model(default = vec![64, 64])]
    pub layers: Vec<u32>,
    /// Optimiser settings.
    pub optimizer: Optimizer,
    /// Training data source.
    pub dataset: Dataset,
}

impl ModelCheck for Training {
    fn check(&self) -> ModelResult<()> {
        if self.early_stopping && self.epochs < 2 {
            return Err(Arc::new(ModelError::validation(
                "epochs",
                "early stopping needs at least two epochs",
            )));
        }
        if self.layers.contains(&0) {
            return Err(Arc::new(ModelError::validation(
                "layers",
                "layer widths must be positive",
            )));
        }
        Ok(())
    }
}

/// Diagnostics emitted while training.
#[derive(Clone, Debug, Deserialize, Serialize, Model)]
#[model(prefix = "log")]
pub struct Logging {
    /// Most verbose level written.
    #[model(default = String::from("info"), choices("error", "warn", "info", "debug"))]
    pub level: String,
    /// Emit JSON lines instead of text.
    #[model(default = false)]
    pub json: bool,
}
