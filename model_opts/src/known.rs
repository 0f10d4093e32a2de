//! String-representable domain types with dedicated option handling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

const MASK: &str = "**********";

/// Sensitive value whose textual representations are masked.
///
/// `Debug` and `Display` never reveal the wrapped value, and option help
/// hides any default. Serialisation writes the real value so defaults and
/// configuration round-trip; logged reassembled values redact secret
/// fields separately.
///
/// # Examples
///
/// ```
/// use model_opts::Secret;
///
/// let token = Secret::new(String::from("hunter2"));
/// assert_eq!(token.to_string(), "**********");
/// assert_eq!(token.expose(), "hunter2");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Secret<T = String>(T);

impl<T> Secret<T> {
    /// Wrap a sensitive value.
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the wrapped value.
    #[must_use]
    pub const fn expose(&self) -> &T {
        &self.0
    }

    /// Unwrap the sensitive value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Secret").field(&MASK).finish()
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl<T: Serialize> Serialize for Secret<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Secret<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self)
    }
}

/// Mask used wherever a secret would otherwise be shown.
pub(crate) const fn mask() -> &'static str {
    MASK
}

/// Rejected e-mail address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{input}' is not a valid e-mail address: {reason}")]
pub struct InvalidEmail {
    input: String,
    reason: &'static str,
}

/// Syntactically checked e-mail address.
///
/// The check is deliberately shallow: one `@`, a non-empty local part and
/// a dotted domain with non-empty labels, no whitespace.
///
/// # Examples
///
/// ```
/// use model_opts::Email;
///
/// let email: Email = "ada@example.org".parse()?;
/// assert_eq!(email.domain(), "example.org");
/// assert!("ada@localhost".parse::<Email>().is_err());
/// # Ok::<(), model_opts::InvalidEmail>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// The full address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part after the `@`.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map_or("", |(_, domain)| domain)
    }
}

impl FromStr for Email {
    type Err = InvalidEmail;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let reject = |reason| InvalidEmail {
            input: input.to_owned(),
            reason,
        };
        if input.chars().any(char::is_whitespace) {
            return Err(reject("contains whitespace"));
        }
        let Some((local, domain)) = input.split_once('@') else {
            return Err(reject("missing '@'"));
        };
        if local.is_empty() {
            return Err(reject("empty local part"));
        }
        if domain.contains('@') {
            return Err(reject("more than one '@'"));
        }
        if !domain.contains('.') || domain.split('.').any(str::is_empty) {
            return Err(reject("domain must contain dot-separated labels"));
        }
        Ok(Self(input.to_owned()))
    }
}

impl TryFrom<String> for Email {
    type Error = InvalidEmail;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{Email, Secret};

    #[test]
    fn secret_is_masked_but_serialises_plainly() {
        let secret = Secret::new(String::from("hunter2"));
        assert_eq!(format!("{secret:?}"), "Secret(\"**********\")");
        assert_eq!(secret.to_string(), "**********");
        assert_eq!(
            serde_json::to_value(&secret).ok(),
            Some(serde_json::json!("hunter2"))
        );
    }

    #[rstest]
    #[case("ada@example.org")]
    #[case("first.last+tag@mail.example.co.uk")]
    fn accepts_addresses(#[case] input: &str) {
        assert!(input.parse::<Email>().is_ok(), "{input} should parse");
    }

    #[rstest]
    #[case("", "missing '@'")]
    #[case("ada", "missing '@'")]
    #[case("@example.org", "empty local part")]
    #[case("ada@localhost", "domain must contain dot-separated labels")]
    #[case("ada@example..org", "domain must contain dot-separated labels")]
    #[case("a@b@example.org", "more than one '@'")]
    #[case("ada @example.org", "contains whitespace")]
    fn rejects_malformed_addresses(#[case] input: &str, #[case] reason: &str) {
        match input.parse::<Email>() {
            Ok(email) => panic!("{input} unexpectedly parsed as {email}"),
            Err(err) => assert!(err.to_string().contains(reason), "{err}"),
        }
    }

    #[test]
    fn email_deserialisation_validates() {
        let bad: Result<Email, _> = serde_json::from_value(serde_json::json!("nope"));
        assert!(bad.is_err());
        let good: Result<Email, _> = serde_json::from_value(serde_json::json!("a@b.io"));
        assert_eq!(good.ok().map(String::from), Some(String::from("a@b.io")));
    }
}
