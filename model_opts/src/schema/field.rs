//! Field descriptors and the closed set of field kinds.

use std::borrow::Cow;
use std::fmt;
use std::ops::Bound;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{FieldType, SchemaFn};

/// Presentation variants of string-like fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TextKind {
    /// Free-form text.
    Plain,
    /// Filesystem path.
    Path,
    /// Sensitive text masked in help and logs.
    Secret,
    /// Absolute URL.
    Url,
    /// E-mail address.
    Email,
    /// IPv4 or IPv6 address.
    IpAddr,
}

impl TextKind {
    /// Placeholder shown in help output.
    #[must_use]
    pub const fn metavar(self) -> &'static str {
        match self {
            Self::Plain => "TEXT",
            Self::Path => "PATH",
            Self::Secret => "SECRET",
            Self::Url => "URL",
            Self::Email => "EMAIL",
            Self::IpAddr => "IP",
        }
    }
}

/// Structured value passed on the command line as a JSON string.
#[derive(Clone, Copy)]
pub struct JsonSpec {
    type_name: &'static str,
    decode: fn(&Value) -> Result<(), String>,
    element: Option<SchemaFn>,
}

impl JsonSpec {
    /// Describe a JSON-encoded field holding a `T`.
    #[must_use]
    pub fn of<T: DeserializeOwned>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            decode: decode_as::<T>,
            element: None,
        }
    }

    /// Record the model held by a list field so it can be unpacked.
    #[must_use]
    pub const fn with_element(mut self, element: SchemaFn) -> Self {
        self.element = Some(element);
        self
    }

    /// Rust type the JSON must decode into.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Schema of the list element, when the container holds models.
    #[must_use]
    pub const fn element(&self) -> Option<SchemaFn> {
        self.element
    }

    /// Check that `value` decodes into the target type.
    ///
    /// # Errors
    ///
    /// Returns the decoder's message when the value has the wrong shape.
    pub fn decode(&self, value: &Value) -> Result<(), String> {
        (self.decode)(value)
    }
}

impl fmt::Debug for JsonSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSpec")
            .field("type_name", &self.type_name)
            .field("unpackable", &self.element.is_some())
            .finish()
    }
}

fn decode_as<T: DeserializeOwned>(value: &Value) -> Result<(), String> {
    T::deserialize(value).map(drop).map_err(|err| err.to_string())
}

/// Closed set of field kinds understood by the option synthesiser.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum FieldKind {
    /// Boolean on/off switch.
    Flag,
    /// String-like scalar.
    Text(TextKind),
    /// Whole number.
    Integer,
    /// Floating-point number.
    Float,
    /// One of a fixed set of literal values.
    Choice(Vec<Cow<'static, str>>),
    /// Container or other complex value encoded as JSON.
    Json(JsonSpec),
    /// Nested model expanded into its own fields.
    Nested(SchemaFn),
}

impl FieldKind {
    /// Returns `true` for numeric kinds that accept bounds.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    /// Default placeholder shown in help output.
    #[must_use]
    pub fn metavar(&self) -> String {
        match self {
            Self::Flag | Self::Nested(_) => String::new(),
            Self::Text(kind) => kind.metavar().to_owned(),
            Self::Integer => "INTEGER".to_owned(),
            Self::Float => "FLOAT".to_owned(),
            Self::Choice(values) => values.join("|"),
            Self::Json(_) => "JSON".to_owned(),
        }
    }
}

/// Numeric bound declared with `gt`, `ge`, `lt` or `le`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Limit {
    /// Whole-number bound.
    Int(i64),
    /// Fractional bound.
    Float(f64),
}

impl Limit {
    /// The bound as an integer, if it has no fractional part.
    #[must_use]
    pub const fn as_int(self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(value),
            Self::Float(_) => None,
        }
    }

    /// The bound as a float.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "bounds beyond 2^53 are compared approximately against floats"
    )]
    pub const fn as_float(self) -> f64 {
        match self {
            Self::Int(value) => value as f64,
            Self::Float(value) => value,
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
        }
    }
}

macro_rules! limit_from_int {
    ($($ty:ty),* $(,)?) => {
        $(impl From<$ty> for Limit {
            fn from(value: $ty) -> Self {
                Self::Int(i64::from(value))
            }
        })*
    };
}

limit_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Limit {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for Limit {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// One declared field of a model.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    name: &'static str,
    kind: FieldKind,
    nullable: bool,
    default: Option<Value>,
    description: Option<Cow<'static, str>>,
    doc: Option<Cow<'static, str>>,
    lower: Bound<Limit>,
    upper: Bound<Limit>,
    defects: Vec<String>,
}

impl FieldSpec {
    /// Describe a field of Rust type `T` serialised under `name`.
    #[must_use]
    pub fn of<T: FieldType>(name: &'static str) -> Self {
        Self::new(name, T::kind(), T::NULLABLE)
    }

    /// Describe a field from an explicit kind.
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind, nullable: bool) -> Self {
        Self {
            name,
            kind,
            nullable,
            default: None,
            description: None,
            doc: None,
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
            defects: Vec::new(),
        }
    }

    /// Record the default value.
    ///
    /// Values that cannot be encoded are kept as defects and reported as
    /// configuration errors when options are built.
    #[must_use]
    pub fn default_value<V: Serialize + ?Sized>(mut self, value: &V) -> Self {
        match serde_json::to_value(value) {
            Ok(Value::Null) => self.default = None,
            Ok(encoded) => self.default = Some(encoded),
            Err(err) => self
                .defects
                .push(format!("default value cannot be encoded: {err}")),
        }
        self
    }

    /// Inline description, ranked above documentation comments.
    #[must_use]
    pub fn description(mut self, text: impl Into<Cow<'static, str>>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Documentation comment written on the field.
    #[must_use]
    pub fn doc(mut self, text: impl Into<Cow<'static, str>>) -> Self {
        let doc: Cow<'static, str> = text.into();
        self.doc = (!doc.trim().is_empty()).then_some(doc);
        self
    }

    /// Restrict the field to a fixed set of literal strings.
    #[must_use]
    pub fn choices(mut self, values: &[&'static str]) -> Self {
        match self.kind {
            FieldKind::Text(TextKind::Plain) | FieldKind::Choice(_) => {
                self.kind = FieldKind::Choice(values.iter().copied().map(Cow::Borrowed).collect());
            }
            _ => self
                .defects
                .push("literal choices require a plain text field".to_owned()),
        }
        self
    }

    /// Exclusive lower bound.
    #[must_use]
    pub fn gt(mut self, limit: impl Into<Limit>) -> Self {
        self.lower = Bound::Excluded(limit.into());
        self
    }

    /// Inclusive lower bound.
    #[must_use]
    pub fn ge(mut self, limit: impl Into<Limit>) -> Self {
        self.lower = Bound::Included(limit.into());
        self
    }

    /// Exclusive upper bound.
    #[must_use]
    pub fn lt(mut self, limit: impl Into<Limit>) -> Self {
        self.upper = Bound::Excluded(limit.into());
        self
    }

    /// Inclusive upper bound.
    #[must_use]
    pub fn le(mut self, limit: impl Into<Limit>) -> Self {
        self.upper = Bound::Included(limit.into());
        self
    }

    /// Serialised key of the field.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Kind selecting the parameter registration.
    #[must_use]
    pub const fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Returns `true` when the field accepts an absent value.
    #[must_use]
    pub const fn nullable(&self) -> bool {
        self.nullable
    }

    /// Declared default, if any.
    #[must_use]
    pub const fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Inline description.
    #[must_use]
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Field documentation comment.
    #[must_use]
    pub fn doc_text(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Lower and upper bounds.
    #[must_use]
    pub const fn bounds(&self) -> (Bound<Limit>, Bound<Limit>) {
        (self.lower, self.upper)
    }

    /// Returns `true` when any bound was declared.
    #[must_use]
    pub const fn is_bounded(&self) -> bool {
        !matches!(
            (self.lower, self.upper),
            (Bound::Unbounded, Bound::Unbounded)
        )
    }

    /// Problems recorded while the field was described.
    #[must_use]
    pub fn defects(&self) -> &[String] {
        &self.defects
    }
}
