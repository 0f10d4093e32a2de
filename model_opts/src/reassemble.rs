//! Value reassembler: rebuilds the nested model from parsed matches.
//!
//! Leaves are read by destination id and inserted at their field path.
//! Nested submodels are validated bottom-up before the root model is
//! extracted, so errors name the deepest offending path.

use std::sync::Arc;

use clap::ArgMatches;
use clap::parser::{MatchesError, ValueSource};
use figment::Figment;
use figment::providers::Serialized;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::known::mask;
use crate::walk::{Leaf, Plan};
use crate::{FieldKind, Model, ModelError, ModelResult, TextKind};

/// Deserialize `value` into `T`, reporting failures as validation errors.
pub(crate) fn extract<T: DeserializeOwned>(value: &Value) -> ModelResult<T> {
    Figment::from(Serialized::defaults(value))
        .extract()
        .map_err(ModelError::from_extraction)
}

/// Rebuild and validate `T` from the matches produced by the plan's flags.
pub(crate) fn reassemble<T: Model>(plan: &Plan, matches: &ArgMatches) -> ModelResult<T> {
    let value = collect(plan, matches)?;
    tracing::debug!(
        model = plan.model(),
        values = %redacted(plan, &value),
        "reassembled option values"
    );
    validate_nested(plan, &value)?;
    let model = extract::<T>(&value)?;
    model.check()?;
    Ok(model)
}

fn mismatch(id: &str, err: &MatchesError) -> Arc<ModelError> {
    Arc::new(ModelError::internal(format!(
        "matches for '{id}' do not fit the plan: {err}"
    )))
}

fn is_explicit(matches: &ArgMatches, id: &str) -> bool {
    matches
        .value_source(id)
        .is_some_and(|source| source != ValueSource::DefaultValue)
}

fn collect(plan: &Plan, matches: &ArgMatches) -> ModelResult<Value> {
    let defer = plan.defers_defaults();
    let mut root = Map::new();
    for leaf in plan.leaves().iter().filter(|leaf| !leaf.is_unpacked()) {
        if let Some(value) = leaf_value(leaf, matches, defer)? {
            insert(&mut root, leaf.segments(), value);
        }
    }
    for (index, unpacked) in plan.unpacked.iter().enumerate() {
        if let Some(elements) = unpack(plan, index, matches, unpacked.default.as_ref())? {
            insert(&mut root, &unpacked.path, elements);
        }
    }
    Ok(Value::Object(root))
}

fn leaf_value(leaf: &Leaf, matches: &ArgMatches, defer: bool) -> ModelResult<Option<Value>> {
    let id = leaf.identity().id.as_str();
    if matches!(leaf.spec().kind(), FieldKind::Flag) {
        return flag_value(leaf, matches, defer);
    }
    if defer && !is_explicit(matches, id) {
        return Ok(None);
    }
    matches
        .try_get_one::<Value>(id)
        .map(Option::<&Value>::cloned)
        .map_err(|err| mismatch(id, &err))
}

/// The switch given last wins; absent switches fall back to the default.
fn flag_value(leaf: &Leaf, matches: &ArgMatches, defer: bool) -> ModelResult<Option<Value>> {
    let identity = leaf.identity();
    let on = switch_position(matches, &identity.id)?;
    let off = match identity.negation_id() {
        Some(id) => switch_position(matches, &id)?,
        None => None,
    };
    let chosen = match (on, off) {
        (Some(on_at), Some(off_at)) => Some(on_at > off_at),
        (Some(_), None) => Some(true),
        (None, Some(_)) => Some(false),
        (None, None) => None,
    };
    Ok(chosen
        .map(Value::Bool)
        .or_else(|| if defer { None } else { identity.default.clone() }))
}

fn switch_position(matches: &ArgMatches, id: &str) -> ModelResult<Option<usize>> {
    if !is_explicit(matches, id) {
        return Ok(None);
    }
    let set = matches
        .try_get_one::<bool>(id)
        .map_err(|err| mismatch(id, &err))?
        .copied()
        .unwrap_or(false);
    Ok(set.then(|| matches.index_of(id).unwrap_or_default()))
}

/// Zip per-field occurrences positionally into list elements.
fn unpack(
    plan: &Plan,
    index: usize,
    matches: &ArgMatches,
    default: Option<&Value>,
) -> ModelResult<Option<Value>> {
    let mut columns = Vec::new();
    for (leaf, relative) in plan.unpacked_leaves(index) {
        columns.push((leaf, relative, occurrences(leaf, matches)?));
    }
    let count = columns
        .iter()
        .map(|(_, _, values)| values.len())
        .max()
        .unwrap_or_default();
    if count == 0 {
        // No default means the list is required; leave it out for serde to report.
        if plan.defers_defaults() {
            return Ok(None);
        }
        return Ok(default.cloned());
    }
    let elements = (0..count)
        .map(|position| {
            let mut element = Map::new();
            for (leaf, relative, values) in &columns {
                let value = values
                    .get(position)
                    .cloned()
                    .or_else(|| leaf.identity().default.clone());
                if let Some(value) = value {
                    insert(&mut element, relative, value);
                }
            }
            Value::Object(element)
        })
        .collect();
    Ok(Some(Value::Array(elements)))
}

/// Values of one unpacked leaf in command-line order; boolean on and off
/// switches are merged by position.
fn occurrences(leaf: &Leaf, matches: &ArgMatches) -> ModelResult<Vec<Value>> {
    let identity = leaf.identity();
    let mut found = indexed(matches, &identity.id)?;
    if let Some(off) = identity.negation_id() {
        found.extend(indexed(matches, &off)?);
        found.sort_by_key(|(position, _)| *position);
    }
    Ok(found.into_iter().map(|(_, value)| value).collect())
}

fn indexed(matches: &ArgMatches, id: &str) -> ModelResult<Vec<(usize, Value)>> {
    let values = matches
        .try_get_many::<Value>(id)
        .map_err(|err| mismatch(id, &err))?;
    Ok(match (values, matches.indices_of(id)) {
        (Some(values), Some(indices)) => indices.zip(values.cloned()).collect(),
        (Some(values), None) => values.cloned().enumerate().collect(),
        (None, _) => Vec::new(),
    })
}

fn insert(target: &mut Map<String, Value>, path: &[&'static str], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut node = target;
    for key in parents {
        let entry = node
            .entry(*key)
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(child) = entry else {
            return;
        };
        node = child;
    }
    node.insert((*last).to_owned(), value);
}

fn lookup<'v>(root: &'v Value, path: &[&str]) -> Option<&'v Value> {
    path.iter().try_fold(root, |node, key| node.get(*key))
}

/// Validate present submodels deepest first. Ancestors of a failed node are
/// skipped so each problem is reported once.
fn validate_nested(plan: &Plan, root: &Value) -> ModelResult<()> {
    let mut failed: Vec<&[&'static str]> = Vec::new();
    let mut errors = Vec::new();
    for node in &plan.nested {
        if failed.iter().any(|path| path.starts_with(&node.path)) {
            continue;
        }
        let Some(subtree) = lookup(root, &node.path).filter(|value| value.is_object()) else {
            continue;
        };
        if let Err(err) = node.schema.validate(subtree) {
            errors.push(err.rerooted(&node.path.join(".")));
            failed.push(&node.path);
        }
    }
    ModelError::try_aggregate(errors).map_or(Ok(()), |err| Err(Arc::new(err)))
}

/// Copy of `value` with every secret leaf masked, for logging.
fn redacted(plan: &Plan, value: &Value) -> Value {
    let mut copy = value.clone();
    for leaf in plan.leaves() {
        if matches!(leaf.spec().kind(), FieldKind::Text(TextKind::Secret)) {
            redact(&mut copy, leaf.segments());
        }
    }
    copy
}

fn redact(node: &mut Value, path: &[&str]) {
    match (node, path.split_first()) {
        (Value::Array(items), _) => items.iter_mut().for_each(|item| redact(item, path)),
        (Value::Object(map), Some((key, rest))) => {
            if let Some(child) = map.get_mut(*key) {
                redact(child, rest);
            }
        }
        (target, None) => *target = Value::String(mask().to_owned()),
        (_, Some(_)) => {}
    }
}
