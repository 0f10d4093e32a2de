//! Mapping from Rust types to field kinds.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::de::DeserializeOwned;

use super::{FieldKind, JsonSpec, TextKind};

/// Rust types that can appear as model fields.
///
/// Models and choice enums get an implementation from their derives. Any
/// other `DeserializeOwned` type can opt in by returning
/// [`FieldKind::Json`], which passes it on the command line as JSON.
///
/// # Examples
///
/// ```
/// use model_opts::{FieldKind, FieldType, JsonSpec};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl FieldType for Point {
///     fn kind() -> FieldKind {
///         FieldKind::Json(JsonSpec::of::<Self>())
///     }
/// }
///
/// assert!(matches!(Point::kind(), FieldKind::Json(_)));
/// ```
pub trait FieldType {
    /// Kind used to register the option.
    fn kind() -> FieldKind;

    /// Whether the field may be left unset.
    const NULLABLE: bool = false;
}

impl FieldType for bool {
    fn kind() -> FieldKind {
        FieldKind::Flag
    }
}

macro_rules! text_types {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(impl FieldType for $ty {
            fn kind() -> FieldKind {
                FieldKind::Text(TextKind::$kind)
            }
        })*
    };
}

text_types!(
    String => Plain,
    char => Plain,
    PathBuf => Path,
    Utf8PathBuf => Path,
    IpAddr => IpAddr,
    Ipv4Addr => IpAddr,
    Ipv6Addr => IpAddr,
    url::Url => Url,
    crate::Email => Email,
);

impl<T: DeserializeOwned> FieldType for crate::Secret<T> {
    fn kind() -> FieldKind {
        FieldKind::Text(TextKind::Secret)
    }
}

macro_rules! numeric_types {
    ($kind:ident: $($ty:ty),* $(,)?) => {
        $(impl FieldType for $ty {
            fn kind() -> FieldKind {
                FieldKind::$kind
            }
        })*
    };
}

numeric_types!(Integer: i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
numeric_types!(Float: f32, f64);

impl<T: FieldType> FieldType for Option<T> {
    fn kind() -> FieldKind {
        T::kind()
    }

    const NULLABLE: bool = true;
}

impl<T: FieldType> FieldType for Box<T> {
    fn kind() -> FieldKind {
        T::kind()
    }

    const NULLABLE: bool = T::NULLABLE;
}

/// JSON spec for a sequence of `T`, remembering `T`'s schema when it is a model.
fn sequence<C: DeserializeOwned, T: FieldType>() -> FieldKind {
    let spec = JsonSpec::of::<C>();
    FieldKind::Json(match T::kind() {
        FieldKind::Nested(element) => spec.with_element(element),
        _ => spec,
    })
}

impl<T: FieldType + DeserializeOwned> FieldType for Vec<T> {
    fn kind() -> FieldKind {
        sequence::<Self, T>()
    }
}

impl<T: DeserializeOwned> FieldType for VecDeque<T> {
    fn kind() -> FieldKind {
        FieldKind::Json(JsonSpec::of::<Self>())
    }
}

impl<T: DeserializeOwned + Ord> FieldType for BTreeSet<T> {
    fn kind() -> FieldKind {
        FieldKind::Json(JsonSpec::of::<Self>())
    }
}

impl<T: DeserializeOwned + Eq + Hash> FieldType for HashSet<T> {
    fn kind() -> FieldKind {
        FieldKind::Json(JsonSpec::of::<Self>())
    }
}

impl<K, V> FieldType for BTreeMap<K, V>
where
    K: DeserializeOwned + Ord,
    V: DeserializeOwned,
{
    fn kind() -> FieldKind {
        FieldKind::Json(JsonSpec::of::<Self>())
    }
}

impl<K, V> FieldType for HashMap<K, V>
where
    K: DeserializeOwned + Eq + Hash,
    V: DeserializeOwned,
{
    fn kind() -> FieldKind {
        FieldKind::Json(JsonSpec::of::<Self>())
    }
}

impl FieldType for serde_json::Value {
    fn kind() -> FieldKind {
        FieldKind::Json(JsonSpec::of::<Self>())
    }
}

macro_rules! tuple_types {
    ($(($($name:ident),+)),* $(,)?) => {
        $(impl<$($name: DeserializeOwned),+> FieldType for ($($name,)+) {
            fn kind() -> FieldKind {
                FieldKind::Json(JsonSpec::of::<Self>())
            }
        })*
    };
}

tuple_types!((A, B), (A, B, C), (A, B, C, D));
