//! Schema description shared by the derive macros and the option walker.
//!
//! A [`Schema`] is the explicit, reflection-free description of one model
//! type: its ordered fields, their kinds, defaults and documentation. The
//! `#[derive(Model)]` macro builds one per type and caches it in a static,
//! so the description is resolved once and never per call.

mod field;
mod field_type;

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{ModelConfig, ModelResult};

pub use field::{FieldKind, FieldSpec, JsonSpec, Limit, TextKind};
pub use field_type::FieldType;

/// Function pointer resolving a schema lazily.
///
/// Nested fields store one of these instead of the schema itself so that
/// model statics never initialise each other.
pub type SchemaFn = fn() -> &'static Schema;

/// A data model whose fields can be exposed as command-line options.
///
/// Implement it with `#[derive(Model)]`; the derive also implements
/// [`FieldType`] so the model can be nested inside other models.
///
/// # Examples
///
/// ```
/// use model_opts::Model;
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize, Model)]
/// struct Training {
///     /// Number of passes over the data.
///     epochs: u32,
///     #[model(default = 1e-4, gt = 0)]
///     lr: f64,
/// }
///
/// let schema = Training::schema();
/// assert_eq!(schema.name(), "Training");
/// assert_eq!(schema.fields().len(), 2);
/// ```
pub trait Model: DeserializeOwned + 'static {
    /// Static description of the model's fields.
    fn schema() -> &'static Schema;

    /// Cross-field validation run after the model has been deserialised.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::ModelError::Validation`] naming the offending
    /// dotted path(s) when the instance violates a model-wide constraint.
    fn check(&self) -> ModelResult<()> {
        Ok(())
    }
}

/// Cross-field validation hook wired in by `#[model(check)]`.
///
/// # Examples
///
/// ```
/// use model_opts::{Model, ModelCheck, ModelError, ModelResult};
/// use serde::Deserialize;
/// use std::sync::Arc;
///
/// #[derive(Debug, Deserialize, Model)]
/// #[model(check)]
/// struct Window {
///     start: u32,
///     end: u32,
/// }
///
/// impl ModelCheck for Window {
///     fn check(&self) -> ModelResult<()> {
///         if self.end < self.start {
///             return Err(Arc::new(ModelError::validation("end", "must not precede start")));
///         }
///         Ok(())
///     }
/// }
///
/// let window = Window { start: 3, end: 1 };
/// assert!(Model::check(&window).is_err());
/// ```
pub trait ModelCheck {
    /// Validate the deserialised instance.
    ///
    /// # Errors
    ///
    /// Returns a validation error describing the violated constraint.
    fn check(&self) -> ModelResult<()>;
}

/// Description of one model type.
#[derive(Debug)]
pub struct Schema {
    name: &'static str,
    doc: Cow<'static, str>,
    fields: Vec<FieldSpec>,
    attached: ModelConfig,
    validator: fn(&Value) -> ModelResult<()>,
}

impl Schema {
    /// Start describing the model `T`.
    #[must_use]
    pub fn builder<T: Model>(name: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            schema: Self {
                name,
                doc: Cow::Borrowed(""),
                fields: Vec::new(),
                attached: ModelConfig::default(),
                validator: validate_as::<T>,
            },
        }
    }

    /// Rust type name of the model.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Type-level documentation, one source line per line.
    #[must_use]
    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a field by its serialised key.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Override table attached to the type through derive attributes.
    #[must_use]
    pub const fn attached(&self) -> &ModelConfig {
        &self.attached
    }

    /// Deserialise `value` as this model and run its check hook.
    ///
    /// # Errors
    ///
    /// Returns validation errors keyed by paths relative to this model.
    pub fn validate(&self, value: &Value) -> ModelResult<()> {
        (self.validator)(value)
    }
}

/// Incremental constructor for [`Schema`], used by generated code.
#[derive(Debug)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Attach the type-level documentation.
    #[must_use]
    pub fn doc(mut self, doc: impl Into<Cow<'static, str>>) -> Self {
        self.schema.doc = doc.into();
        self
    }

    /// Append a field.
    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.schema.fields.push(field);
        self
    }

    /// Attach the override table declared on the type.
    #[must_use]
    pub fn attached(mut self, config: ModelConfig) -> Self {
        self.schema.attached = config;
        self
    }

    /// Finish the description.
    #[must_use]
    pub fn build(self) -> Schema {
        self.schema
    }
}

fn validate_as<T: Model>(value: &Value) -> ModelResult<()> {
    crate::reassemble::extract::<T>(value)?.check()
}
