//! Schema walker: turns a model schema and an override table into a [`Plan`].
//!
//! Fields are visited depth-first in declaration order. Every problem found
//! along the way is collected and reported together as configuration errors
//! before any flag is registered.

mod plan;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::docstring::{AttributeDocs, parse_attribute_docs};
use crate::error::join_path;
use crate::naming::{
    RESERVED_LONGS, RESERVED_SHORTS, destination_id, resolve_long, validate_rename,
    validate_short,
};
use crate::{ExtraOptions, FieldKind, FieldSpec, Limit, ModelConfig, ModelError, ModelResult, Schema};

pub use plan::{FlagIdentity, Leaf, Plan};
pub(crate) use plan::{NestedNode, UnpackedRoot};

/// Walk `schema` under the merged override table `config`.
///
/// # Errors
///
/// Returns [`ModelError::Config`] (or an aggregate of them) for malformed
/// renames or short flags, override keys naming unknown fields, flag
/// collisions, recursive models and invalid field declarations.
///
/// # Examples
///
/// ```
/// use model_opts::{Model, ModelConfig, walk::walk};
/// use serde::Deserialize;
///
/// #[derive(Deserialize, Model)]
/// struct Inner {
///     x: i32,
/// }
///
/// #[derive(Deserialize, Model)]
/// struct Root {
///     left: Inner,
///     right: Inner,
///     x: i32,
/// }
///
/// let plan = walk(Root::schema(), &ModelConfig::default())?;
/// assert_eq!(plan.long_flags(), ["--left-x", "--right-x", "--x"]);
/// # Ok::<(), std::sync::Arc<model_opts::ModelError>>(())
/// ```
pub fn walk(schema: &'static Schema, config: &ModelConfig) -> ModelResult<Plan> {
    let mut walker = Walker::new(config);
    walker.visit(schema, &[], None, false);
    walker.check_override_keys();
    walker.check_collisions();
    walker.finish(schema)
}

/// Attribute tables attached to submodels of `schema`, re-rooted at the
/// paths where the submodels occur. Deeper models come first so that
/// their ancestors' entries win when merged in order.
///
/// List elements are only visited when `unpack` is set, matching the walk.
pub(crate) fn nested_attached(schema: &'static Schema, unpack: bool) -> Vec<ModelConfig> {
    fn collect(
        schema: &'static Schema,
        parent: &str,
        unpack: bool,
        ancestry: &mut Vec<*const Schema>,
        out: &mut Vec<ModelConfig>,
    ) {
        ancestry.push(std::ptr::from_ref(schema));
        for field in schema.fields() {
            let (child, element) = match field.kind() {
                FieldKind::Nested(child) => (child(), false),
                FieldKind::Json(json) if unpack => match json.element() {
                    Some(element) => (element(), true),
                    None => continue,
                },
                _ => continue,
            };
            if ancestry.contains(&std::ptr::from_ref(child)) {
                continue;
            }
            let path = join_path(parent, field.name());
            collect(child, &path, unpack && !element, ancestry, out);
            out.push(child.attached().rerooted(&path));
        }
        ancestry.pop();
    }

    let mut out = Vec::new();
    collect(schema, "", unpack, &mut Vec::new(), &mut out);
    out
}

struct Walker<'c> {
    config: &'c ModelConfig,
    shorts: BTreeMap<String, char>,
    known: BTreeSet<String>,
    leaf_paths: BTreeSet<String>,
    ancestry: Vec<*const Schema>,
    leaves: Vec<plan::Leaf>,
    nested: Vec<NestedNode>,
    unpacked: Vec<UnpackedRoot>,
    errors: Vec<ModelError>,
}

impl<'c> Walker<'c> {
    fn new(config: &'c ModelConfig) -> Self {
        let mut errors = Vec::new();
        for (path, flag) in &config.rename {
            if let Err(message) = validate_rename(flag) {
                errors.push(ModelError::config(path, message));
            }
        }
        let shorts = config
            .shorten
            .iter()
            .filter_map(|(path, flag)| match validate_short(flag) {
                Ok(short) => Some((path.clone(), short)),
                Err(message) => {
                    errors.push(ModelError::config(path, message));
                    None
                }
            })
            .collect();
        Self {
            config,
            shorts,
            known: BTreeSet::new(),
            leaf_paths: BTreeSet::new(),
            ancestry: Vec::new(),
            leaves: Vec::new(),
            nested: Vec::new(),
            unpacked: Vec::new(),
            errors,
        }
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ModelError::config(path, message));
    }

    fn is_excluded(&self, dotted: &str) -> bool {
        self.config.exclude.iter().any(|excluded| {
            dotted == excluded.as_str()
                || dotted
                    .strip_prefix(excluded.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    fn attribute_docs(&self, schema: &Schema) -> AttributeDocs {
        if self.config.parses_docstring() {
            parse_attribute_docs(schema.doc(), self.config.style())
        } else {
            AttributeDocs::new()
        }
    }

    fn visit(
        &mut self,
        schema: &'static Schema,
        parent: &[&'static str],
        unpacked: Option<usize>,
        excluded: bool,
    ) {
        let identity = std::ptr::from_ref(schema);
        if self.ancestry.contains(&identity) {
            if !excluded {
                self.error(
                    parent.join("."),
                    format!("model '{}' contains itself", schema.name()),
                );
            }
            return;
        }
        self.ancestry.push(identity);
        let docs = self.attribute_docs(schema);
        for spec in schema.fields() {
            let mut segments = parent.to_vec();
            segments.push(spec.name());
            let dotted = segments.join(".");
            self.known.insert(dotted.clone());
            let skip = excluded || self.is_excluded(&dotted);
            match spec.kind() {
                FieldKind::Nested(child) => {
                    self.visit(child(), &segments, unpacked, skip);
                    if !skip && unpacked.is_none() {
                        self.nested.push(NestedNode {
                            path: segments,
                            schema: child(),
                        });
                    }
                }
                FieldKind::Json(json) if unpacked.is_none() && self.config.unpacks_lists() => {
                    if let Some(element) = json.element() {
                        let index = self.unpacked.len();
                        if !skip {
                            self.unpacked.push(UnpackedRoot {
                                path: segments.clone(),
                                default: spec.default().cloned(),
                            });
                        }
                        self.visit(element(), &segments, Some(index), skip);
                    } else {
                        self.leaf_paths.insert(dotted);
                        if !skip {
                            self.leaf(segments, spec, &docs, unpacked);
                        }
                    }
                }
                _ => {
                    self.leaf_paths.insert(dotted);
                    if !skip {
                        self.leaf(segments, spec, &docs, unpacked);
                    }
                }
            }
        }
        self.ancestry.pop();
    }

    fn leaf(
        &mut self,
        segments: Vec<&'static str>,
        spec: &'static FieldSpec,
        docs: &AttributeDocs,
        unpacked: Option<usize>,
    ) {
        let dotted = segments.join(".");
        for defect in spec.defects() {
            self.error(&dotted, defect.as_str());
        }
        self.check_bounds(&dotted, spec);
        let config = self.config;
        let prefix = config.prefix_or_empty();
        let is_boolean = matches!(spec.kind(), FieldKind::Flag);
        let names = match resolve_long(&segments, &config.rename, prefix, is_boolean) {
            Ok(names) => names,
            Err(message) => {
                self.error(&dotted, message);
                return;
            }
        };
        let extra = config
            .extra_options
            .get(&dotted)
            .cloned()
            .unwrap_or_default();
        let default = extra
            .default
            .clone()
            .filter(|value| !value.is_null())
            .or_else(|| spec.default().cloned());
        let multiple = unpacked.is_some();
        let required = extra
            .required
            .unwrap_or(!multiple && default.is_none() && !spec.nullable());
        let help = resolve_help(
            &extra,
            spec,
            docs.get(spec.name()).map(String::as_str),
            config.parses_docstring(),
        );
        let identity = FlagIdentity {
            id: destination_id(prefix, &segments),
            long: names.on,
            negation: names.off,
            short: self.shorts.get(&dotted).copied(),
            help,
            required,
            default,
            metavar: extra
                .metavar
                .clone()
                .unwrap_or_else(|| spec.kind().metavar()),
            multiple,
        };
        tracing::trace!(path = %dotted, flag = %identity.long, "resolved flag identity");
        self.leaves.push(plan::Leaf {
            path: segments,
            spec,
            identity,
            extra,
            unpacked,
        });
    }

    fn check_bounds(&mut self, dotted: &str, spec: &FieldSpec) {
        if !spec.is_bounded() {
            return;
        }
        let (lower, upper) = spec.bounds();
        match spec.kind() {
            FieldKind::Integer => {
                let fractional = [lower, upper].into_iter().any(|bound| {
                    matches!(
                        bound,
                        std::ops::Bound::Included(Limit::Float(_))
                            | std::ops::Bound::Excluded(Limit::Float(_))
                    )
                });
                if fractional {
                    self.error(dotted, "integer fields require whole-number bounds");
                }
            }
            FieldKind::Float => {}
            _ => self.error(dotted, "bounds require a numeric field"),
        }
    }

    fn check_override_keys(&mut self) {
        let mut problems = Vec::new();
        for (table, path) in self.config.override_keys() {
            if !self.known.contains(path) {
                problems.push(ModelError::config(
                    path,
                    format!("`{table}` refers to an unknown field"),
                ));
            }
        }
        for path in self.config.shorten.keys() {
            if self.known.contains(path) && !self.leaf_paths.contains(path) {
                problems.push(ModelError::config(
                    path,
                    "short flags can only be given to leaf fields",
                ));
            }
        }
        self.errors.extend(problems);
    }

    fn check_collisions(&mut self) {
        let mut ids: BTreeMap<String, String> = BTreeMap::new();
        let mut longs: BTreeMap<String, String> = BTreeMap::new();
        let mut shorts: BTreeMap<char, String> = BTreeMap::new();
        let mut problems = Vec::new();
        for leaf in &self.leaves {
            let dotted = leaf.dotted();
            let identity = &leaf.identity;
            let destinations = std::iter::once(identity.id.clone()).chain(identity.negation_id());
            for id in destinations {
                if let Some(other) = ids.insert(id.clone(), dotted.clone()) {
                    problems.push(collision(&dotted, &other, &format!("destination '{id}'")));
                }
            }
            let names = std::iter::once(&identity.long)
                .chain(identity.negation.as_ref())
                .chain(leaf.extra.aliases.iter());
            for long in names {
                if RESERVED_LONGS.contains(&long.as_str()) {
                    problems.push(ModelError::config(
                        &dotted,
                        format!("flag '--{long}' conflicts with clap's global flags"),
                    ));
                } else if let Some(other) = longs.insert(long.clone(), dotted.clone()) {
                    problems.push(collision(&dotted, &other, &format!("flag '--{long}'")));
                }
            }
            if let Some(short) = identity.short {
                if RESERVED_SHORTS.contains(&short) {
                    problems.push(ModelError::config(
                        &dotted,
                        format!("flag '-{short}' conflicts with clap's global flags"),
                    ));
                } else if let Some(other) = shorts.insert(short, dotted.clone()) {
                    problems.push(collision(&dotted, &other, &format!("flag '-{short}'")));
                }
            }
        }
        self.errors.extend(problems);
    }

    fn finish(self, schema: &'static Schema) -> ModelResult<Plan> {
        if let Some(err) = ModelError::try_aggregate(self.errors) {
            return Err(Arc::new(err));
        }
        tracing::debug!(
            model = schema.name(),
            leaves = self.leaves.len(),
            "walked model schema"
        );
        Ok(Plan {
            model: schema.name(),
            leaves: self.leaves,
            nested: self.nested,
            unpacked: self.unpacked,
            defer_defaults: self.config.defers_defaults(),
        })
    }
}

fn collision(dotted: &str, other: &str, what: &str) -> ModelError {
    ModelError::config(dotted, format!("{what} is already used by '{other}'"))
}

/// Help text precedence: extra options, description, attribute docs, field
/// doc comment. Documentation sources are skipped when parsing is off.
fn resolve_help(
    extra: &ExtraOptions,
    spec: &FieldSpec,
    attribute_doc: Option<&str>,
    use_docs: bool,
) -> Option<String> {
    extra
        .help
        .clone()
        .or_else(|| spec.description_text().map(str::to_owned))
        .or_else(|| {
            use_docs
                .then(|| attribute_doc.or_else(|| spec.doc_text()))
                .flatten()
                .map(str::to_owned)
        })
}
