//! Output of the schema walk: resolved flag identities and tree structure.

use serde_json::Value;

use crate::{ExtraOptions, FieldSpec, Schema};

/// Resolved presentation identity of one leaf field.
#[derive(Clone, Debug, PartialEq)]
pub struct FlagIdentity {
    /// Destination id the parsed value is stored under.
    pub id: String,
    /// Long flag without leading dashes.
    pub long: String,
    /// Negating long flag for booleans, without leading dashes.
    pub negation: Option<String>,
    /// Short flag character.
    pub short: Option<char>,
    /// Help text after precedence resolution.
    pub help: Option<String>,
    /// Whether the flag must be supplied.
    pub required: bool,
    /// Default used when the flag is absent.
    pub default: Option<Value>,
    /// Value placeholder shown in help.
    pub metavar: String,
    /// Whether the flag may repeat (unpacked list fields).
    pub multiple: bool,
}

impl FlagIdentity {
    /// Destination id of the negating flag.
    #[must_use]
    pub fn negation_id(&self) -> Option<String> {
        self.negation.as_ref().map(|_| format!("{}:off", self.id))
    }

    /// Every long flag with its dashes, primary first.
    #[must_use]
    pub fn long_flags(&self) -> Vec<String> {
        std::iter::once(&self.long)
            .chain(self.negation.as_ref())
            .map(|long| format!("--{long}"))
            .collect()
    }
}

/// One leaf field with its resolved identity.
#[derive(Clone, Debug)]
pub struct Leaf {
    pub(crate) path: Vec<&'static str>,
    pub(crate) spec: &'static FieldSpec,
    pub(crate) identity: FlagIdentity,
    pub(crate) extra: ExtraOptions,
    pub(crate) unpacked: Option<usize>,
}

impl Leaf {
    /// Field keys from the model root.
    #[must_use]
    pub fn segments(&self) -> &[&'static str] {
        &self.path
    }

    /// Dotted path used as override key.
    #[must_use]
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }

    /// Field description.
    #[must_use]
    pub const fn spec(&self) -> &'static FieldSpec {
        self.spec
    }

    /// Resolved flag identity.
    #[must_use]
    pub const fn identity(&self) -> &FlagIdentity {
        &self.identity
    }

    /// Registration overrides applied on top of the identity.
    #[must_use]
    pub const fn extra(&self) -> &ExtraOptions {
        &self.extra
    }

    /// Returns `true` when the leaf belongs to an unpacked list element.
    #[must_use]
    pub const fn is_unpacked(&self) -> bool {
        self.unpacked.is_some()
    }
}

/// Nested submodel validated on its own during reassembly.
#[derive(Clone, Debug)]
pub(crate) struct NestedNode {
    pub path: Vec<&'static str>,
    pub schema: &'static Schema,
}

/// List-of-model field expanded into repeatable flags.
#[derive(Clone, Debug)]
pub(crate) struct UnpackedRoot {
    pub path: Vec<&'static str>,
    /// Used when no element flag is given.
    pub default: Option<Value>,
}

/// Everything the synthesiser and reassembler need about one model.
#[derive(Clone, Debug)]
pub struct Plan {
    pub(crate) model: &'static str,
    pub(crate) leaves: Vec<Leaf>,
    pub(crate) nested: Vec<NestedNode>,
    pub(crate) unpacked: Vec<UnpackedRoot>,
    pub(crate) defer_defaults: bool,
}

impl Plan {
    /// Name of the walked model.
    #[must_use]
    pub const fn model(&self) -> &'static str {
        self.model
    }

    /// Leaves in declaration order.
    #[must_use]
    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    /// Look up a leaf by dotted path.
    #[must_use]
    pub fn leaf(&self, dotted: &str) -> Option<&Leaf> {
        self.leaves.iter().find(|leaf| leaf.dotted() == dotted)
    }

    /// Every long flag, with dashes, in declaration order.
    #[must_use]
    pub fn long_flags(&self) -> Vec<String> {
        self.leaves
            .iter()
            .flat_map(|leaf| leaf.identity.long_flags())
            .collect()
    }

    /// Whether absent flags are left out of the reassembled value.
    #[must_use]
    pub const fn defers_defaults(&self) -> bool {
        self.defer_defaults
    }

    /// Leaves belonging to the unpacked root at `index`, with their paths
    /// relative to the list element.
    pub(crate) fn unpacked_leaves(
        &self,
        index: usize,
    ) -> impl Iterator<Item = (&Leaf, &[&'static str])> {
        let depth = self.unpacked.get(index).map_or(0, |root| root.path.len());
        self.leaves
            .iter()
            .filter(move |leaf| leaf.unpacked == Some(index))
            .map(move |leaf| (leaf, leaf.path.get(depth..).unwrap_or_default()))
    }
}
