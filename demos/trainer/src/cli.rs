//! Command wiring: both models share one clap command.

use std::ffi::OsString;

use camino::Utf8PathBuf;
use clap::Command;
use model_opts::{ModelArgs, ModelConfig, ModelResultExt};

use crate::error::Result;
use crate::models::{Logging, Training};

/// Environment variable naming a TOML file of option overrides.
pub const OVERRIDES_ENV: &str = "TRAINER_OPTIONS";

/// Values rebuilt from one invocation.
#[derive(Debug)]
pub struct Invocation {
    /// Settings for the run itself.
    pub training: Training,
    /// Settings for diagnostics.
    pub logging: Logging,
}

/// Generated options for every model the trainer accepts.
#[derive(Debug)]
pub struct TrainerOptions {
    training: ModelArgs<Training>,
    logging: ModelArgs<Logging>,
}

impl TrainerOptions {
    /// Build the options, applying `overrides` to the training model.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::TrainerError::Options`] when the overrides
    /// name unknown fields or produce invalid flags.
    pub fn new(overrides: Option<ModelConfig>) -> Result<Self> {
        let mut training = ModelArgs::<Training>::builder();
        if let Some(config) = overrides {
            training = training.config(config);
        }
        Ok(Self {
            training: training.build()?,
            logging: ModelArgs::new()?,
        })
    }

    /// Build the options using the override file named by [`OVERRIDES_ENV`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::TrainerError::Options`] when the file cannot
    /// be loaded or the overrides are invalid.
    pub fn from_env() -> Result<Self> {
        let overrides = std::env::var_os(OVERRIDES_ENV)
            .map(|raw| {
                let path = Utf8PathBuf::from(raw.to_string_lossy().into_owned());
                ModelConfig::from_toml_file(path)
            })
            .transpose()?;
        Self::new(overrides)
    }

    /// The trainer's command with every model option attached.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::TrainerError::Options`] when two models
    /// generate the same flag.
    pub fn command(&self) -> Result<Command> {
        let base = Command::new("trainer")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Train a model with options generated from its settings.");
        let with_training = self.training.try_augment(base)?;
        Ok(self.logging.try_augment(with_training)?)
    }

    /// Parse `argv` and rebuild both models.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::TrainerError::Options`] for parse errors,
    /// help requests and validation failures.
    pub fn parse_from<I, S>(&self, argv: I) -> Result<Invocation>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString> + Clone,
    {
        let matches = self.command()?.try_get_matches_from(argv).into_model()?;
        Ok(Invocation {
            training: self.training.extract(&matches)?,
            logging: self.logging.extract(&matches)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Schedule;
    use anyhow::{Result, anyhow, ensure};
    use model_opts::ModelError;
    use rstest::{fixture, rstest};

    #[fixture]
    fn options() -> TrainerOptions {
        #[expect(clippy::expect_used, reason = "fixture construction may panic")]
        TrainerOptions::new(None).expect("default options build")
    }

    #[rstest]
    fn defaults_fill_unset_fields(options: TrainerOptions) -> Result<()> {
        let run = options
            .parse_from(["trainer", "--epochs", "3"])
            .map_err(|err| anyhow!(err))?;
        ensure!(run.training.epochs == 3);
        ensure!(run.training.layers == [64, 64]);
        ensure!(run.training.optimizer.schedule == Schedule::Constant);
        ensure!(run.training.dataset.path.as_str() == "data");
        ensure!(run.training.dataset.token.is_none());
        ensure!(run.logging.level == "info");
        ensure!(!run.logging.json);
        Ok(())
    }

    #[rstest]
    fn shorts_and_prefixed_flags_are_accepted(options: TrainerOptions) -> Result<()> {
        let run = options
            .parse_from([
                "trainer",
                "-e",
                "5",
                "-m",
                "0.5",
                "--optimizer-schedule",
                "cosine-decay",
                "--log-level",
                "debug",
                "--log-json",
            ])
            .map_err(|err| anyhow!(err))?;
        ensure!(run.training.epochs == 5);
        ensure!(run.training.optimizer.momentum.to_string() == "0.5");
        ensure!(run.training.optimizer.schedule == Schedule::CosineDecay);
        ensure!(run.logging.level == "debug");
        ensure!(run.logging.json);
        Ok(())
    }

    #[rstest]
    fn model_checks_name_the_field(options: TrainerOptions) -> Result<()> {
        let Err(crate::error::TrainerError::Options(err)) =
            options.parse_from(["trainer", "--epochs", "1", "--early-stopping"])
        else {
            return Err(anyhow!("early stopping with one epoch should be rejected"));
        };
        ensure!(err.validation_paths() == ["epochs"], "got {err}");
        ensure!(matches!(err.as_ref(), ModelError::Validation { .. }));
        Ok(())
    }

    #[rstest]
    fn overrides_rename_nested_flags() -> Result<()> {
        let overrides = ModelConfig::default().with_rename("optimizer", "--opt");
        let options = TrainerOptions::new(Some(overrides)).map_err(|err| anyhow!(err))?;
        let run = options
            .parse_from(["trainer", "--epochs", "2", "--opt-lr", "0.5"])
            .map_err(|err| anyhow!(err))?;
        ensure!(run.training.optimizer.lr.to_string() == "0.5");
        Ok(())
    }
}
