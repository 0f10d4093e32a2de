//! Attaching model options to a clap command and reading them back.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use clap::{Arg, ArgMatches, Command};

use crate::config::registry;
use crate::reassemble::reassemble;
use crate::synth::{Customizer, synthesize};
use crate::walk::{Plan, nested_attached, walk};
use crate::{
    DocstringStyle, ExtraOptions, Model, ModelConfig, ModelError, ModelResult, ModelResultExt,
};

/// Options generated for the model `T`, ready to attach to a command.
///
/// # Examples
///
/// ```
/// use clap::Command;
/// use model_opts::{Model, ModelArgs};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize, Model)]
/// struct Training {
///     epochs: u32,
///     #[model(default = 1e-4, gt = 0)]
///     lr: f64,
///     #[model(default = false)]
///     early_stopping: bool,
/// }
///
/// let options = ModelArgs::<Training>::builder().build()?;
/// let training = options.parse_from(Command::new("train"), ["train", "--epochs", "10"])?;
/// assert_eq!(training.epochs, 10);
/// assert!((training.lr - 1e-4).abs() < f64::EPSILON);
/// assert!(!training.early_stopping);
/// # Ok::<(), std::sync::Arc<model_opts::ModelError>>(())
/// ```
pub struct ModelArgs<T> {
    plan: Plan,
    customizers: BTreeMap<String, Customizer>,
    marker: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for ModelArgs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelArgs")
            .field("plan", &self.plan)
            .field("customized", &self.customizers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: Model> ModelArgs<T> {
    /// Start configuring the options for `T`.
    #[must_use]
    pub fn builder() -> ModelArgsBuilder<T> {
        ModelArgsBuilder::default()
    }

    /// Options for `T` using only attached and registered configuration.
    ///
    /// # Errors
    ///
    /// See [`ModelArgsBuilder::build`].
    pub fn new() -> ModelResult<Self> {
        Self::builder().build()
    }

    /// The resolved walk behind these options.
    #[must_use]
    pub const fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Every generated argument in declaration order.
    #[must_use]
    pub fn args(&self) -> Vec<Arg> {
        self.plan
            .leaves()
            .iter()
            .flat_map(|leaf| synthesize(leaf, self.customizers.get(&leaf.dotted())))
            .collect()
    }

    /// Attach the generated arguments to `cmd` without checking for clashes.
    #[must_use]
    pub fn augment(&self, cmd: Command) -> Command {
        cmd.args(self.args())
    }

    /// Attach the generated arguments to `cmd`, rejecting any that clash
    /// with arguments already registered there.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Config`] (aggregated when several clash) naming
    /// the field whose flag or destination is already taken.
    pub fn try_augment(&self, cmd: Command) -> ModelResult<Command> {
        let mut args = Vec::new();
        let mut problems = Vec::new();
        for leaf in self.plan.leaves() {
            for arg in synthesize(leaf, self.customizers.get(&leaf.dotted())) {
                problems.extend(
                    cmd.get_arguments()
                        .filter_map(|existing| clash(existing, &arg))
                        .map(|message| ModelError::config(leaf.dotted(), message)),
                );
                args.push(arg);
            }
        }
        if let Some(err) = ModelError::try_aggregate(problems) {
            return Err(Arc::new(err));
        }
        tracing::debug!(
            model = self.plan.model(),
            command = cmd.get_name(),
            args = args.len(),
            "attached model options"
        );
        Ok(cmd.args(args))
    }

    /// Rebuild and validate `T` from matches of a command carrying these
    /// options.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Validation`] errors naming dotted field paths
    /// when the values are rejected, or [`ModelError::Internal`] when the
    /// matches were not produced by these options.
    pub fn extract(&self, matches: &ArgMatches) -> ModelResult<T> {
        reassemble(&self.plan, matches)
    }

    /// Attach the options to `cmd`, parse `argv` and extract `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::CliParsing`] for command-line errors, including
    /// help and version requests (see [`ModelError::is_display_request`]),
    /// in addition to the errors of [`Self::try_augment`] and
    /// [`Self::extract`].
    pub fn parse_from<I, S>(&self, cmd: Command, argv: I) -> ModelResult<T>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString> + Clone,
    {
        let matches = self.try_augment(cmd)?.try_get_matches_from(argv).into_model()?;
        self.extract(&matches)
    }
}

/// Attach the options of `T`, built from attached and registered
/// configuration, to `cmd`.
///
/// # Errors
///
/// Propagates the errors of [`ModelArgsBuilder::build`] and
/// [`ModelArgs::try_augment`].
pub fn from_model<T: Model>(cmd: Command) -> ModelResult<(Command, ModelArgs<T>)> {
    let options = ModelArgs::<T>::new()?;
    let augmented = options.try_augment(cmd)?;
    Ok((augmented, options))
}

fn clash(existing: &Arg, arg: &Arg) -> Option<String> {
    if existing.get_id() == arg.get_id() {
        return Some(format!("destination '{}' is already registered", arg.get_id()));
    }
    let longs = |candidate: &Arg| -> Vec<String> {
        candidate
            .get_long()
            .into_iter()
            .chain(candidate.get_all_aliases().into_iter().flatten())
            .map(str::to_owned)
            .collect()
    };
    let taken = longs(existing);
    if let Some(long) = longs(arg).into_iter().find(|long| taken.contains(long)) {
        return Some(format!("flag '--{long}' is already registered"));
    }
    arg.get_short()
        .filter(|short| existing.get_short() == Some(*short))
        .map(|short| format!("flag '-{short}' is already registered"))
}

/// Builder collecting explicit configuration for [`ModelArgs`].
///
/// Explicit settings take precedence over the registry, which takes
/// precedence over attributes attached to the model.
pub struct ModelArgsBuilder<T> {
    layers: Vec<ModelConfig>,
    config: ModelConfig,
    customizers: BTreeMap<String, Customizer>,
    marker: PhantomData<fn() -> T>,
}

impl<T> Default for ModelArgsBuilder<T> {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            config: ModelConfig::default(),
            customizers: BTreeMap::new(),
            marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ModelArgsBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelArgsBuilder")
            .field("layers", &self.layers)
            .field("config", &self.config)
            .field("customized", &self.customizers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: Model> ModelArgsBuilder<T> {
    /// Prefix every generated flag and destination id.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config = self.config.with_prefix(prefix);
        self
    }

    /// Drop the field at `path` and everything below it.
    #[must_use]
    pub fn exclude(mut self, path: impl Into<String>) -> Self {
        self.config = self.config.with_exclude(path);
        self
    }

    /// Give the field at `path` a different long flag.
    #[must_use]
    pub fn rename(mut self, path: impl Into<String>, flag: impl Into<String>) -> Self {
        self.config = self.config.with_rename(path, flag);
        self
    }

    /// Give the leaf at `path` a short flag such as `-e`.
    #[must_use]
    pub fn shorten(mut self, path: impl Into<String>, flag: impl Into<String>) -> Self {
        self.config = self.config.with_short(path, flag);
        self
    }

    /// Apply registration overrides to the leaf at `path`.
    #[must_use]
    pub fn extra(mut self, path: impl Into<String>, extra: ExtraOptions) -> Self {
        self.config = self.config.with_extra(path, extra);
        self
    }

    /// Toggle reading help text from documentation.
    #[must_use]
    pub fn parse_docstring(mut self, enabled: bool) -> Self {
        self.config = self.config.with_parse_docstring(enabled);
        self
    }

    /// Select the documentation layout.
    #[must_use]
    pub fn docstring_style(mut self, style: DocstringStyle) -> Self {
        self.config = self.config.with_docstring_style(style);
        self
    }

    /// Toggle expanding lists of models into repeatable flags.
    #[must_use]
    pub fn unpack_list(mut self, enabled: bool) -> Self {
        self.config = self.config.with_unpack_list(enabled);
        self
    }

    /// Toggle leaving absent flags out of the reassembled value.
    #[must_use]
    pub fn defer_defaults(mut self, enabled: bool) -> Self {
        self.config = self.config.with_defer_defaults(enabled);
        self
    }

    /// Layer a whole override table, for example one loaded from a file.
    ///
    /// Tables are applied in call order, below the individual settings
    /// given on this builder.
    #[must_use]
    pub fn config(mut self, config: ModelConfig) -> Self {
        self.layers.push(config);
        self
    }

    /// Adjust the primary argument of the leaf at `path` with arbitrary clap
    /// settings. Hooks for the same path run in registration order.
    #[must_use]
    pub fn customize<F>(mut self, path: impl Into<String>, hook: F) -> Self
    where
        F: Fn(Arg) -> Arg + Send + Sync + 'static,
    {
        let key = path.into();
        let combined: Customizer = match self.customizers.remove(&key) {
            Some(previous) => Arc::new(move |arg| hook(previous(arg))),
            None => Arc::new(hook),
        };
        self.customizers.insert(key, combined);
        self
    }

    /// Merge every configuration layer and walk the model.
    ///
    /// Attributes attached to nested models apply below their field path,
    /// under the root model's own attributes.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Gathering`] when the layers cannot be merged
    /// and [`ModelError::Config`] (possibly aggregated) for invalid
    /// overrides, flag collisions or customisers naming unknown leaves.
    pub fn build(self) -> ModelResult<ModelArgs<T>> {
        let schema = T::schema();
        let registered = registry::registered::<T>();
        let own = ModelConfig::layered(
            std::iter::once(schema.attached())
                .chain(registered.as_ref())
                .chain(&self.layers)
                .chain(std::iter::once(&self.config)),
        )?;
        let nested = nested_attached(schema, own.unpacks_lists());
        let mut config = ModelConfig::layered(nested.iter().chain(std::iter::once(&own)))?;
        // Sets are replaced by later layers; nested exclusions accumulate.
        config
            .exclude
            .extend(nested.iter().flat_map(|table| table.exclude.iter().cloned()));
        let plan = walk(schema, &config)?;
        let unknown = self
            .customizers
            .keys()
            .filter(|path| plan.leaf(path).is_none())
            .map(|path| ModelError::config(path, "`customize` refers to an unknown or excluded leaf"));
        if let Some(err) = ModelError::try_aggregate(unknown) {
            return Err(Arc::new(err));
        }
        Ok(ModelArgs {
            plan,
            customizers: self.customizers,
            marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for builder layering and command attachment.

    use anyhow::{Result, anyhow};
    use clap::{Arg, ArgAction, Command};
    use rstest::rstest;
    use serde::Deserialize;

    use super::{ModelArgs, from_model};
    use crate::{Model, ModelConfig};

    #[derive(Debug, Deserialize, Model)]
    #[model(prefix = "svc")]
    struct Service {
        port: u16,
        #[model(default = false)]
        debug: bool,
    }

    #[derive(Debug, Deserialize, Model)]
    struct Limits {
        #[model(rename = "--max-conn", help = "Connection cap.")]
        connections: u32,
    }

    #[derive(Debug, Deserialize, Model)]
    struct Server {
        limits: Limits,
        #[model(exclude)]
        spare: Option<Limits>,
    }

    #[derive(Debug, Deserialize, Model)]
    struct Tls {
        cert: String,
        #[model(exclude)]
        #[serde(default)]
        key: Option<String>,
    }

    #[derive(Debug, Deserialize, Model)]
    struct Auth {
        user: String,
        #[model(exclude)]
        #[serde(default)]
        password: Option<String>,
    }

    #[derive(Debug, Deserialize, Model)]
    struct Gateway {
        tls: Tls,
        auth: Auth,
        #[model(exclude)]
        #[serde(default)]
        note: Option<String>,
    }

    #[test]
    fn nested_exclusions_accumulate() -> Result<()> {
        let options = ModelArgs::<Gateway>::new().map_err(|e| anyhow!("{e}"))?;
        assert_eq!(options.plan().long_flags(), ["--tls-cert", "--auth-user"]);
        Ok(())
    }

    #[test]
    fn nested_attributes_apply_below_their_field() -> Result<()> {
        let options = ModelArgs::<Server>::new().map_err(|e| anyhow!("{e}"))?;
        assert_eq!(options.plan().long_flags(), ["--max-conn"]);
        let leaf = options
            .plan()
            .leaf("limits.connections")
            .ok_or_else(|| anyhow!("limits.connections missing"))?;
        assert_eq!(leaf.identity().help.as_deref(), Some("Connection cap."));
        let server = options
            .parse_from(Command::new("srv"), ["srv", "--max-conn", "8"])
            .map_err(|e| anyhow!("{e}"))?;
        assert_eq!(server.limits.connections, 8);
        assert!(server.spare.is_none());
        Ok(())
    }

    #[test]
    fn attached_configuration_applies_by_default() -> Result<()> {
        let options = ModelArgs::<Service>::new().map_err(|e| anyhow!("{e}"))?;
        assert_eq!(
            options.plan().long_flags(),
            ["--svc-port", "--svc-debug", "--no-svc-debug"]
        );
        Ok(())
    }

    #[test]
    fn builder_settings_beat_attached_configuration() -> Result<()> {
        let options = ModelArgs::<Service>::builder()
            .prefix("api")
            .rename("port", "--listen")
            .build()
            .map_err(|e| anyhow!("{e}"))?;
        assert_eq!(
            options.plan().long_flags(),
            ["--listen", "--api-debug", "--no-api-debug"]
        );
        Ok(())
    }

    #[test]
    fn builder_settings_beat_layered_tables() -> Result<()> {
        let options = ModelArgs::<Service>::builder()
            .rename("port", "--listen")
            .config(ModelConfig::default().with_rename("port", "--bind").with_exclude("debug"))
            .build()
            .map_err(|e| anyhow!("{e}"))?;
        assert_eq!(options.plan().long_flags(), ["--listen"]);
        Ok(())
    }

    #[rstest]
    #[case::long(Arg::new("other").long("svc-port"), "'--svc-port'")]
    #[case::id(Arg::new("svc_port").long("elsewhere"), "destination 'svc_port'")]
    #[case::alias(Arg::new("other").long("x").visible_alias("no-svc-debug"), "'--no-svc-debug'")]
    fn clashes_with_existing_arguments_are_rejected(
        #[case] existing: Arg,
        #[case] fragment: &str,
    ) -> Result<()> {
        let options = ModelArgs::<Service>::new().map_err(|e| anyhow!("{e}"))?;
        let err = options
            .try_augment(Command::new("svc").arg(existing))
            .err()
            .ok_or_else(|| anyhow!("expected a clash"))?;
        assert!(err.to_string().contains(fragment), "{err}");
        Ok(())
    }

    #[test]
    fn customizers_run_in_order() -> Result<()> {
        let options = ModelArgs::<Service>::builder()
            .customize("port", |arg| arg.short('p'))
            .customize("port", |arg| arg.short('P').visible_alias("listen"))
            .build()
            .map_err(|e| anyhow!("{e}"))?;
        let port = options.parse_from(Command::new("svc"), ["svc", "-P", "80"]);
        assert_eq!(port.map(|service| service.port).map_err(|e| anyhow!("{e}"))?, 80);
        Ok(())
    }

    #[test]
    fn customizers_must_name_leaves() -> Result<()> {
        let err = ModelArgs::<Service>::builder()
            .customize("host", |arg| arg.action(ArgAction::Set))
            .build()
            .err()
            .ok_or_else(|| anyhow!("expected a configuration error"))?;
        assert!(err.to_string().contains("unknown or excluded leaf"), "{err}");
        Ok(())
    }

    #[test]
    fn from_model_attaches_and_returns_options() -> Result<()> {
        let (cmd, options) = from_model::<Service>(Command::new("svc")).map_err(|e| anyhow!("{e}"))?;
        let matches = cmd.try_get_matches_from(["svc", "--svc-port", "8080", "--svc-debug"])?;
        let service = options.extract(&matches).map_err(|e| anyhow!("{e}"))?;
        assert_eq!(service.port, 8080);
        assert!(service.debug);
        Ok(())
    }
}
