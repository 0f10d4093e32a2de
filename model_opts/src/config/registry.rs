//! Process-wide default override tables keyed by model type.
//!
//! The registry is consulted when options are built: its entry for a model
//! ranks above the model's own attributes and below explicit builder
//! arguments. It is only written by explicit [`register`] calls.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::LazyLock;

use parking_lot::RwLock;

use super::ModelConfig;
use crate::Model;

static REGISTRY: LazyLock<RwLock<HashMap<TypeId, ModelConfig>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Register `config` as the default override table for `T`.
///
/// Returns the table previously registered for `T`, if any.
///
/// # Examples
///
/// ```
/// use model_opts::{Model, ModelConfig, registry};
/// use serde::Deserialize;
///
/// #[derive(Deserialize, Model)]
/// struct Db {
///     host: String,
/// }
///
/// registry::register::<Db>(ModelConfig::default().with_prefix("db"));
/// assert_eq!(
///     registry::registered::<Db>().and_then(|c| c.prefix),
///     Some(String::from("db"))
/// );
/// ```
pub fn register<T: Model>(config: ModelConfig) -> Option<ModelConfig> {
    let previous = REGISTRY.write().insert(TypeId::of::<T>(), config);
    if previous.is_some() {
        tracing::warn!(
            model = T::schema().name(),
            "replacing registered option overrides"
        );
    }
    previous
}

/// Default override table registered for `T`.
#[must_use]
pub fn registered<T: Model>() -> Option<ModelConfig> {
    REGISTRY.read().get(&TypeId::of::<T>()).cloned()
}

/// Remove the table registered for `T`, returning it.
pub fn unregister<T: Model>() -> Option<ModelConfig> {
    REGISTRY.write().remove(&TypeId::of::<T>())
}
