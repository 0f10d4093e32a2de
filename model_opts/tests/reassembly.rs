//! End-to-end tests: generate options, parse a command line, rebuild models.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::Arc;

use anyhow::{Result, anyhow, ensure};
use clap::Command;
use clap::error::ErrorKind;
use model_opts::{Choice, Email, Model, ModelArgs, ModelCheck, ModelError, ModelResult};
use rstest::rstest;
use serde::{Deserialize, Serialize};

fn parse<T: Model>(args: &[&str]) -> ModelResult<T> {
    ModelArgs::<T>::new()?.parse_from(
        Command::new("prog"),
        std::iter::once("prog").chain(args.iter().copied()),
    )
}

fn help_of<T: Model>() -> Result<String> {
    let mut cmd = ModelArgs::<T>::new()
        .and_then(|options| options.try_augment(Command::new("prog")))
        .map_err(|err| anyhow!("{err}"))?;
    Ok(cmd.render_help().to_string())
}

#[derive(Debug, Deserialize, Model)]
struct Training {
    epochs: u32,
    #[model(default = 1e-4, gt = 0)]
    lr: f64,
    #[model(default = false)]
    early_stopping: bool,
}

#[test]
fn required_field_with_defaults() -> Result<()> {
    let training: Training = parse(&["--epochs", "10"]).map_err(|err| anyhow!("{err}"))?;
    ensure!(training.epochs == 10);
    ensure!(training.lr.to_bits() == 1e-4_f64.to_bits());
    ensure!(!training.early_stopping);
    Ok(())
}

#[test]
fn missing_required_field_names_the_flag() -> Result<()> {
    let Err(err) = parse::<Training>(&[]) else {
        return Err(anyhow!("missing --epochs should fail"));
    };
    let ModelError::CliParsing(clap_err) = err.as_ref() else {
        return Err(anyhow!("expected a parse error, got {err}"));
    };
    ensure!(clap_err.kind() == ErrorKind::MissingRequiredArgument);
    ensure!(clap_err.to_string().contains("--epochs"));
    ensure!(err.exit_code() == 2);
    Ok(())
}

#[rstest]
#[case::on(&["--epochs", "1", "--early-stopping"], true)]
#[case::last_wins(&["--epochs", "1", "--early-stopping", "--no-early-stopping"], false)]
#[case::last_wins_again(&["--epochs", "1", "--no-early-stopping", "--early-stopping"], true)]
fn boolean_pairs_resolve_to_the_last_switch(
    #[case] args: &[&str],
    #[case] expected: bool,
) -> Result<()> {
    let training: Training = parse(args).map_err(|err| anyhow!("{err}"))?;
    ensure!(training.early_stopping == expected);
    Ok(())
}

#[derive(Debug, Deserialize, Model)]
#[model(prefix = "foo")]
struct Foo {
    a: u8,
    b: u8,
}

#[derive(Debug, Deserialize, Model)]
#[model(prefix = "bar")]
struct Bar {
    x: u8,
    y: u8,
}

#[test]
fn prefixed_models_share_one_command() -> Result<()> {
    let foo = ModelArgs::<Foo>::new().map_err(|err| anyhow!("{err}"))?;
    let bar = ModelArgs::<Bar>::new().map_err(|err| anyhow!("{err}"))?;
    let cmd = foo
        .try_augment(Command::new("prog"))
        .and_then(|cmd| bar.try_augment(cmd))
        .map_err(|err| anyhow!("{err}"))?;
    let longs: Vec<&str> = cmd.get_arguments().filter_map(clap::Arg::get_long).collect();
    ensure!(longs == ["foo-a", "foo-b", "bar-x", "bar-y"], "got {longs:?}");

    let matches = cmd.try_get_matches_from([
        "prog", "--foo-a", "1", "--foo-b", "2", "--bar-x", "3", "--bar-y", "4",
    ])?;
    let foo_value = foo.extract(&matches).map_err(|err| anyhow!("{err}"))?;
    let bar_value = bar.extract(&matches).map_err(|err| anyhow!("{err}"))?;
    ensure!((foo_value.a, foo_value.b, bar_value.x, bar_value.y) == (1, 2, 3, 4));
    Ok(())
}

#[test]
fn the_same_model_twice_is_a_clash() -> Result<()> {
    let foo = ModelArgs::<Foo>::new().map_err(|err| anyhow!("{err}"))?;
    let once = foo.try_augment(Command::new("prog")).map_err(|err| anyhow!("{err}"))?;
    let Err(err) = foo.try_augment(once) else {
        return Err(anyhow!("second attachment should clash"));
    };
    ensure!(
        matches!(err.as_ref(), ModelError::Aggregate(_) | ModelError::Config { .. }),
        "got {err}"
    );
    ensure!(err.to_string().contains("already registered"), "got {err}");
    Ok(())
}

#[derive(Debug, Deserialize, Model)]
struct Side {
    x: i32,
}

#[derive(Debug, Deserialize, Model)]
struct Root {
    left: Side,
    right: Side,
    x: i32,
}

#[test]
fn renaming_a_branch_keeps_values_in_place() -> Result<()> {
    let options = ModelArgs::<Root>::builder()
        .rename("right", "--the-other-left")
        .build()
        .map_err(|err| anyhow!("{err}"))?;
    ensure!(options.plan().long_flags() == ["--left-x", "--the-other-left-x", "--x"]);
    let root = options
        .parse_from(
            Command::new("prog"),
            ["prog", "--left-x", "1", "--the-other-left-x", "2", "--x", "3"],
        )
        .map_err(|err| anyhow!("{err}"))?;
    ensure!((root.left.x, root.right.x, root.x) == (1, 2, 3));
    Ok(())
}

#[derive(Debug, Deserialize, Model)]
struct Containers {
    tags: Vec<String>,
    pairs: Vec<(String, u32)>,
    weights: BTreeMap<String, f64>,
}

#[test]
fn complex_values_travel_as_json() -> Result<()> {
    let containers: Containers = parse(&[
        "--tags",
        r#"["a","b"]"#,
        "--pairs",
        r#"[["a",1],["b",2]]"#,
        "--weights",
        r#"{"a":0.5,"b":2}"#,
    ])
    .map_err(|err| anyhow!("{err}"))?;
    ensure!(containers.tags == ["a", "b"]);
    ensure!(containers.pairs == [(String::from("a"), 1), (String::from("b"), 2)]);
    ensure!(containers.weights.len() == 2);
    ensure!(containers.weights.get("b").map(|w| w.to_bits()) == Some(2.0_f64.to_bits()));
    Ok(())
}

#[rstest]
#[case::not_json(r#"["a","#, "invalid JSON")]
#[case::wrong_shape(r#"{"a":1}"#, "expected")]
fn malformed_json_is_a_parse_error(#[case] tags: &str, #[case] fragment: &str) -> Result<()> {
    let Err(err) = parse::<Containers>(&["--tags", tags, "--pairs", "[]", "--weights", "{}"])
    else {
        return Err(anyhow!("'{tags}' should be rejected"));
    };
    let ModelError::CliParsing(clap_err) = err.as_ref() else {
        return Err(anyhow!("expected a parse error, got {err}"));
    };
    ensure!(clap_err.kind() == ErrorKind::InvalidValue);
    ensure!(err.exit_code() == 2);
    ensure!(err.to_string().contains(fragment), "got {err}");
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Choice)]
#[serde(rename_all = "lowercase")]
enum Optimizer {
    Sgd,
    Adam,
}

#[derive(Debug, Deserialize, Model)]
struct Job {
    #[model(default = Optimizer::Sgd)]
    optimizer: Optimizer,
    owner: Email,
    host: IpAddr,
    /// Scratch space, never on the command line.
    #[model(exclude)]
    scratch: Option<String>,
}

#[test]
fn domain_types_and_choices_are_parsed() -> Result<()> {
    let job: Job = parse(&["--owner", "ada@example.org", "--host", "10.0.0.1"])
        .map_err(|err| anyhow!("{err}"))?;
    ensure!(job.optimizer == Optimizer::Sgd);
    ensure!(job.owner.domain() == "example.org");
    ensure!(job.host.is_ipv4());
    ensure!(job.scratch.is_none());

    let tuned: Job = parse(&[
        "--optimizer",
        "adam",
        "--owner",
        "ada@example.org",
        "--host",
        "::1",
    ])
    .map_err(|err| anyhow!("{err}"))?;
    ensure!(tuned.optimizer == Optimizer::Adam);
    ensure!(tuned.host.is_ipv6());
    Ok(())
}

#[rstest]
#[case::choice(&["--optimizer", "adamw", "--owner", "a@b.c", "--host", "::1"])]
#[case::email(&["--owner", "nobody", "--host", "::1"])]
#[case::address(&["--owner", "a@b.c", "--host", "localhost"])]
fn domain_values_are_checked_while_parsing(#[case] args: &[&str]) -> Result<()> {
    let Err(err) = parse::<Job>(args) else {
        return Err(anyhow!("{args:?} should be rejected"));
    };
    let ModelError::CliParsing(clap_err) = err.as_ref() else {
        return Err(anyhow!("expected a parse error, got {err}"));
    };
    ensure!(
        matches!(
            clap_err.kind(),
            ErrorKind::ValueValidation | ErrorKind::InvalidValue
        ),
        "got {:?}",
        clap_err.kind()
    );
    Ok(())
}

#[test]
fn excluded_fields_are_not_offered() -> Result<()> {
    let help = help_of::<Job>()?;
    ensure!(!help.contains("--scratch"), "{help}");
    ensure!(help.contains("--owner <EMAIL>"), "{help}");
    Ok(())
}

/// Service settings.
///
/// Attributes:
///     name: Name from the type docs.
///     port: Port from the type docs.
///     debug: Debug from the type docs.
#[derive(Debug, Deserialize, Model)]
struct Documented {
    /// Name from the field docs.
    #[model(help = "Name from the override.", description = "Name from the description.")]
    name: String,
    /// Port from the field docs.
    #[model(description = "Port from the description.")]
    port: u16,
    /// Debug from the field docs.
    #[model(default = false)]
    debug: bool,
    /// Level from the field docs.
    level: u8,
}

#[rstest]
#[case::override_wins("Name from the override.", &["Name from the description.", "Name from the type docs."])]
#[case::description_beats_docs("Port from the description.", &["Port from the type docs.", "Port from the field docs."])]
#[case::type_docs_beat_field_docs("Debug from the type docs.", &["Debug from the field docs."])]
#[case::field_docs_last("Level from the field docs.", &[])]
fn help_text_follows_precedence(#[case] shown: &str, #[case] hidden: &[&str]) -> Result<()> {
    let help = help_of::<Documented>()?;
    ensure!(help.contains(shown), "missing '{shown}': {help}");
    for text in hidden {
        ensure!(!help.contains(text), "unexpected '{text}': {help}");
    }
    Ok(())
}

#[derive(Debug, Deserialize, Model)]
#[model(check)]
struct Window {
    start: u32,
    end: u32,
}

impl ModelCheck for Window {
    fn check(&self) -> ModelResult<()> {
        if self.end < self.start {
            return Err(Arc::new(ModelError::validation("end", "must not precede start")));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Model)]
struct Schedule {
    window: Window,
    repeats: u8,
}

#[test]
fn nested_checks_report_full_paths() -> Result<()> {
    let Err(err) = parse::<Schedule>(&[
        "--window-start",
        "5",
        "--window-end",
        "1",
        "--repeats",
        "2",
    ]) else {
        return Err(anyhow!("an inverted window should be rejected"));
    };
    ensure!(err.validation_paths() == ["window.end"], "got {err}");
    ensure!(err.exit_code() == 2);

    let schedule: Schedule = parse(&[
        "--window-start",
        "1",
        "--window-end",
        "5",
        "--repeats",
        "2",
    ])
    .map_err(|err| anyhow!("{err}"))?;
    ensure!((schedule.window.start, schedule.window.end) == (1, 5));
    Ok(())
}
