//! # Bootkit Core Configuration
//!
//! Helpers for pulling per-family sections out of the unified boot document.
//!
//! The boot document is a single YAML mapping whose top-level keys are
//! section names. Each section is a sequence of per-instance objects carrying
//! at least `name` and `enabled`:
//!
//! ```yaml
//! announcement:
//!   - name: github
//!     enabled: true
//!   - enabled: true      # becomes "announcement-1"
//! ```
//!
//! [`section_entries`] resolves instance names: a blank name becomes
//! `"{section}-{index}"`, and a name already taken gets `"-{index}"` appended.
pub mod error;

pub use error::ConfigError;

#[cfg(feature = "yaml-config")]
use serde::de::DeserializeOwned;
#[cfg(feature = "yaml-config")]
use serde::Deserialize;
#[cfg(feature = "yaml-config")]
use serde_yaml::{Mapping, Value};
#[cfg(feature = "yaml-config")]
use std::collections::HashSet;

/// Result alias for configuration helpers.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// One resolved instance from a multi-instance section.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedEntry<T> {
    /// Final, unique instance name.
    pub name: String,
    /// Position inside the section sequence.
    pub index: usize,
    /// Value of the `enabled` flag (absent means `false`).
    pub enabled: bool,
    /// The full per-instance object decoded into the caller's type.
    pub config: T,
}

#[cfg(feature = "yaml-config")]
#[derive(Debug, Default, Deserialize)]
struct EntryHeader {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    enabled: bool,
}

#[cfg(feature = "yaml-config")]
fn root(raw: &[u8]) -> Result<Option<Mapping>> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    match serde_yaml::from_slice::<Value>(raw).map_err(ConfigError::Yaml)? {
        Value::Null => Ok(None),
        Value::Mapping(map) => Ok(Some(map)),
        other => Err(ConfigError::invalid(format!(
            "boot document must be a mapping of sections, found {}",
            kind(&other)
        ))),
    }
}

#[cfg(feature = "yaml-config")]
fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(feature = "yaml-config")]
fn section_value(raw: &[u8], section: &str) -> Result<Option<Value>> {
    Ok(root(raw)?.and_then(|mut map| map.remove(section)))
}

/// Whether the document has a top-level key named `section`.
/// A document that does not parse has no sections.
#[cfg(feature = "yaml-config")]
pub fn has_section(raw: &[u8], section: &str) -> bool {
    matches!(root(raw), Ok(Some(map)) if map.contains_key(section))
}

/// Re-encoded YAML of a single section, or `None` when it is absent.
#[cfg(feature = "yaml-config")]
pub fn section_raw(raw: &[u8], section: &str) -> Result<Option<Vec<u8>>> {
    match section_value(raw, section)? {
        Some(value) => {
            let text = serde_yaml::to_string(&value).map_err(|source| ConfigError::Section {
                section: section.to_string(),
                source,
            })?;
            Ok(Some(text.into_bytes()))
        }
        None => Ok(None),
    }
}

/// Decode the whole document into `T`.
#[cfg(feature = "yaml-config")]
pub fn unmarshal<T: DeserializeOwned>(raw: &[u8]) -> Result<T> {
    serde_yaml::from_slice(raw).map_err(ConfigError::Yaml)
}

/// Decode one section into `T`; `None` when the section is absent.
#[cfg(feature = "yaml-config")]
pub fn unmarshal_section<T: DeserializeOwned>(raw: &[u8], section: &str) -> Result<Option<T>> {
    section_value(raw, section)?
        .map(|value| {
            serde_yaml::from_value(value).map_err(|source| ConfigError::Section {
                section: section.to_string(),
                source,
            })
        })
        .transpose()
}

/// Decode a multi-instance section and assign every instance a unique name.
///
/// An absent or empty section yields an empty vector. Names are resolved in
/// sequence order, so the result is deterministic for a given document.
#[cfg(feature = "yaml-config")]
pub fn section_entries<T: DeserializeOwned>(raw: &[u8], section: &str) -> Result<Vec<NamedEntry<T>>> {
    let items: Vec<Value> = match section_value(raw, section)? {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(value) => serde_yaml::from_value(value).map_err(|source| ConfigError::Section {
            section: section.to_string(),
            source,
        })?,
    };

    let mut taken = HashSet::with_capacity(items.len());
    let mut entries = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let decode_err = |source| ConfigError::Section {
            section: format!("{}[{}]", section, index),
            source,
        };
        let header: EntryHeader = serde_yaml::from_value(item.clone()).map_err(decode_err)?;
        let config: T = serde_yaml::from_value(item).map_err(decode_err)?;

        let mut name = match header.name {
            Some(n) if !n.trim().is_empty() => n,
            _ => format!("{}-{}", section, index),
        };
        while taken.contains(&name) {
            name = format!("{}-{}", name, index);
        }
        taken.insert(name.clone());

        entries.push(NamedEntry {
            name,
            index,
            enabled: header.enabled,
            config,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests;
