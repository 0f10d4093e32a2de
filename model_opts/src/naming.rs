//! Flag naming rules: prefixes, renames, boolean pairs and destination ids.
//!
//! Long names are returned without their leading dashes, the way
//! [`clap::Arg::long`] expects them.

use std::collections::BTreeMap;

pub(crate) const RESERVED_SHORTS: &[char] = &['h', 'V'];
pub(crate) const RESERVED_LONGS: &[&str] = &["help", "version"];

/// Lower-case `name` and turn `_` and `.` into `-`.
pub(crate) fn kebab(name: &str) -> String {
    name.to_lowercase().replace(['_', '.'], "-")
}

/// Trim leading and trailing dashes.
pub(crate) fn strip_dashes(name: &str) -> &str {
    name.trim_matches('-')
}

fn long_validation_error(long: &str) -> Option<String> {
    if long.is_empty() {
        Some(format!("invalid long flag '--{long}': must be non-empty"))
    } else if long.starts_with(['-', '_']) {
        Some(format!(
            "invalid long flag '--{long}': must start with exactly two dashes"
        ))
    } else if !long.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        Some(format!(
            "invalid long flag '--{long}': must contain only ASCII alphanumeric characters or '-'"
        ))
    } else {
        None
    }
}

fn validate_long(flag: &str) -> Result<(), String> {
    let body = flag
        .strip_prefix("--")
        .ok_or_else(|| format!("invalid long flag '{flag}': must start with '--'"))?;
    long_validation_error(body).map_or(Ok(()), Err)
}

/// Check a rename target: `--name`, or `--on/--off` for booleans.
pub(crate) fn validate_rename(flag: &str) -> Result<(), String> {
    match flag.split_once('/') {
        Some((on, off)) => {
            validate_long(on)?;
            validate_long(off)
        }
        None => validate_long(flag),
    }
}

/// Check a short flag of the exact form `-c`.
pub(crate) fn validate_short(flag: &str) -> Result<char, String> {
    let mut chars = flag.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('-'), Some(c), None) if c.is_ascii_alphanumeric() => Ok(c),
        _ => Err(format!(
            "invalid short flag '{flag}': expected one dash followed by one ASCII alphanumeric character"
        )),
    }
}

/// Long names of one leaf, without leading dashes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LongNames {
    pub on: String,
    pub off: Option<String>,
}

/// Resolve the long name(s) of the leaf at `segments`.
///
/// The longest renamed ancestor wins and replaces the matching path
/// prefix; the remaining segments become a dash-joined suffix. Renames
/// ignore `prefix`. Without a rename the prefix and every segment are
/// joined with dashes.
pub(crate) fn resolve_long(
    segments: &[&str],
    renames: &BTreeMap<String, String>,
    prefix: &str,
    is_boolean: bool,
) -> Result<LongNames, String> {
    let base = renamed_base(segments, renames)?.unwrap_or_else(|| {
        let joined = segments.join("-");
        match strip_dashes(prefix) {
            "" => format!("--{}", kebab(&joined)),
            stripped => format!("--{}", kebab(&format!("{stripped}-{joined}"))),
        }
    });
    match base.split_once('/') {
        Some((on, off)) if is_boolean => Ok(LongNames {
            on: strip_dashes(on).to_owned(),
            off: Some(strip_dashes(off).to_owned()),
        }),
        Some(_) => Err(format!(
            "flag pair '{base}' can only be used for boolean fields"
        )),
        None => {
            let on = strip_dashes(&base).to_owned();
            let off = is_boolean.then(|| format!("no-{on}"));
            Ok(LongNames { on, off })
        }
    }
}

fn renamed_base(
    segments: &[&str],
    renames: &BTreeMap<String, String>,
) -> Result<Option<String>, String> {
    for depth in (1..=segments.len()).rev() {
        let (head, tail) = segments.split_at(depth);
        let parent = head.join(".");
        let Some(alias) = renames.get(&parent) else {
            continue;
        };
        if tail.is_empty() {
            return Ok(Some(alias.clone()));
        }
        let suffix = kebab(&tail.join("-"));
        if alias.contains('/') {
            return Err(format!(
                "flag pair '{alias}' for '{parent}' can only be used for boolean fields, \
                 but '{parent}' has child field '{suffix}'"
            ));
        }
        return Ok(Some(format!("{alias}-{suffix}")));
    }
    Ok(None)
}

/// Destination id: snake-cased prefix, then the path segments joined by `_`.
pub(crate) fn destination_id(prefix: &str, segments: &[&str]) -> String {
    let joined = segments.join("_");
    match strip_dashes(prefix) {
        "" => joined,
        stripped => format!("{}_{joined}", stripped.replace('-', "_")),
    }
}
