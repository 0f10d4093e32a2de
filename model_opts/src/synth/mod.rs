//! Option synthesiser: builds `clap::Arg` registrations for walked leaves.
//!
//! Every argument stores its parsed value as a [`serde_json::Value`] so the
//! reassembler can rebuild the nested model without knowing field types.

mod parsers;

use std::ops::Bound;
use std::sync::Arc;

use clap::builder::{BoolishValueParser, PossibleValuesParser, TypedValueParser, ValueParser};
use clap::{Arg, ArgAction};
use serde_json::Value;

use crate::walk::Leaf;
use crate::{ExtraOptions, FieldKind, FieldSpec, Limit, TextKind};

use parsers::{JsonParser, NumberParser, Range, TextParser};

/// Caller-supplied hook adjusting the primary argument of one leaf.
pub(crate) type Customizer = Arc<dyn Fn(Arg) -> Arg + Send + Sync>;

/// Build the arguments registering `leaf`: one for value fields, an
/// on/off pair for booleans.
pub(crate) fn synthesize(leaf: &Leaf, customize: Option<&Customizer>) -> Vec<Arg> {
    let mut args = match leaf.spec().kind() {
        FieldKind::Flag => flag_pair(leaf),
        _ => vec![value_arg(leaf)],
    };
    if let Some(hook) = customize {
        if let Some(primary) = args.first_mut() {
            *primary = hook(std::mem::take(primary));
        }
    }
    tracing::trace!(
        path = %leaf.dotted(),
        args = args.len(),
        "synthesised option"
    );
    args
}

fn flag_pair(leaf: &Leaf) -> Vec<Arg> {
    let identity = leaf.identity();
    let mut on = with_help(Arg::new(identity.id.clone()).long(identity.long.clone()), leaf);
    if let Some(short) = identity.short {
        on = on.short(short);
    }
    let (Some(off_id), Some(off_long)) = (identity.negation_id(), identity.negation.clone())
    else {
        return vec![apply_extra(on.action(ArgAction::SetTrue), leaf.extra())];
    };
    let mut off = Arg::new(off_id.clone()).long(off_long);
    if identity.multiple {
        on = repeatable_switch(on, "true");
        off = repeatable_switch(off, "false");
    } else {
        on = on
            .action(ArgAction::SetTrue)
            .overrides_with(off_id.clone());
        off = off
            .action(ArgAction::SetTrue)
            .overrides_with(identity.id.clone());
        if identity.required {
            on = on.required_unless_present(off_id);
        }
    }
    off = hide_with(off, leaf.extra());
    vec![apply_extra(on, leaf.extra()), off]
}

/// Repeatable switch recording every occurrence, so positions survive.
fn repeatable_switch(arg: Arg, recorded: &'static str) -> Arg {
    arg.action(ArgAction::Append)
        .num_args(0..=1)
        .require_equals(true)
        .default_missing_value(recorded)
        .value_parser(BoolishValueParser::new().map(Value::Bool))
}

fn value_arg(leaf: &Leaf) -> Arg {
    let identity = leaf.identity();
    let spec = leaf.spec();
    let mut arg = with_help(Arg::new(identity.id.clone()), leaf)
        .long(identity.long.clone())
        .value_name(identity.metavar.clone())
        .required(identity.required)
        .value_parser(value_parser(spec))
        .action(if identity.multiple {
            ArgAction::Append
        } else {
            ArgAction::Set
        });
    if let Some(short) = identity.short {
        arg = arg.short(short);
    }
    if !identity.multiple {
        if let Some(default) = &identity.default {
            arg = arg.default_value(render_default(spec.kind(), default));
        }
    }
    match spec.kind() {
        FieldKind::Text(TextKind::Secret) => arg = arg.hide_default_value(true),
        FieldKind::Choice(_) => arg = arg.hide_possible_values(true),
        _ => {}
    }
    apply_extra(arg, leaf.extra())
}

fn with_help(arg: Arg, leaf: &Leaf) -> Arg {
    let Some(text) = help_text(leaf) else {
        return arg;
    };
    arg.help(text)
}

fn help_text(leaf: &Leaf) -> Option<String> {
    let help = leaf.identity().help.clone();
    let spec = leaf.spec();
    if !spec.is_bounded() {
        return help;
    }
    let range = match spec.kind() {
        FieldKind::Integer => integer_range(spec).to_string(),
        _ => float_range(spec).to_string(),
    };
    Some(help.map_or_else(|| format!("[{range}]"), |text| format!("{text} [{range}]")))
}

fn apply_extra(mut arg: Arg, extra: &ExtraOptions) -> Arg {
    arg = hide_with(arg, extra);
    if let Some(long_help) = &extra.long_help {
        arg = arg.long_help(long_help.clone());
    }
    if let Some(env) = &extra.env {
        arg = arg.env(env.clone());
    }
    if !extra.aliases.is_empty() {
        arg = arg.visible_aliases(extra.aliases.clone());
    }
    if let Some(hide_default) = extra.hide_default {
        arg = arg.hide_default_value(hide_default);
    }
    arg
}

fn hide_with(mut arg: Arg, extra: &ExtraOptions) -> Arg {
    if let Some(hidden) = extra.hidden {
        arg = arg.hide(hidden);
    }
    if let Some(heading) = &extra.heading {
        arg = arg.help_heading(heading.clone());
    }
    arg
}

fn map_bound<T>(bound: Bound<Limit>, convert: impl Fn(Limit) -> Option<T>) -> Bound<T> {
    match bound {
        Bound::Included(limit) => convert(limit).map_or(Bound::Unbounded, Bound::Included),
        Bound::Excluded(limit) => convert(limit).map_or(Bound::Unbounded, Bound::Excluded),
        Bound::Unbounded => Bound::Unbounded,
    }
}

fn integer_range(spec: &FieldSpec) -> Range<i64> {
    let (lower, upper) = spec.bounds();
    Range::new(map_bound(lower, Limit::as_int), map_bound(upper, Limit::as_int))
}

fn float_range(spec: &FieldSpec) -> Range<f64> {
    let (lower, upper) = spec.bounds();
    let as_float = |limit: Limit| Some(limit.as_float());
    Range::new(map_bound(lower, as_float), map_bound(upper, as_float))
}

fn value_parser(spec: &FieldSpec) -> ValueParser {
    match spec.kind() {
        FieldKind::Integer => ValueParser::new(NumberParser::Integer(integer_range(spec))),
        FieldKind::Float => ValueParser::new(NumberParser::Float(float_range(spec))),
        FieldKind::Choice(values) => ValueParser::new(
            PossibleValuesParser::new(values.iter().map(ToString::to_string)).map(Value::String),
        ),
        FieldKind::Json(json) => ValueParser::new(JsonParser::new(*json)),
        FieldKind::Flag => ValueParser::new(BoolishValueParser::new().map(Value::Bool)),
        FieldKind::Text(kind) => ValueParser::new(TextParser::new(*kind)),
        FieldKind::Nested(_) => ValueParser::new(TextParser::new(TextKind::Plain)),
    }
}

/// Text clap shows and re-parses when the flag is absent.
fn render_default(kind: &FieldKind, default: &Value) -> String {
    match (kind, default) {
        (FieldKind::Json(_), value) => value.to_string(),
        (_, Value::String(text)) => text.clone(),
        (_, value) => value.to_string(),
    }
}
