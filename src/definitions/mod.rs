//! Footprint definition libraries.
//!
//! A library is a JSON object mapping footprint names to definitions:
//!
//! ```json
//! {
//!     "SOIC": { "template": true, "type": "smd", "pads": [ ... ] },
//!     "SOIC-8": { "inherit": "SOIC", "body": [4.9, 3.9, 1.5] }
//! }
//! ```
//!
//! Definitions are resolved in document order. `inherit` copies an earlier
//! definition and overrides every key the child sets; nested objects are
//! merged key by key, everything else (arrays included) is replaced.
//! `template` is never inherited.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{DefinitionError, UnresolvedReason};
use crate::footprint::FootprintSpec;

/// Key naming the base definition.
const INHERIT: &str = "inherit";

/// Key marking a definition as template.
const TEMPLATE: &str = "template";

/// Resolved footprint definitions in document order.
#[derive(Debug, Clone, Default)]
pub struct Library {
    footprints: IndexMap<String, FootprintSpec>,
}

impl Library {
    /// Parses and resolves a definition document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a JSON object, a definition
    /// is not an object, contains unknown keys or malformed values, or
    /// inherits a footprint that is not defined before it.
    pub fn from_json_str(json: &str) -> Result<Self, DefinitionError> {
        let raw: IndexMap<String, Value> =
            serde_json::from_str(json).map_err(|source| DefinitionError::Json { source })?;

        let mut resolved: IndexMap<String, Value> = IndexMap::with_capacity(raw.len());
        let mut footprints = IndexMap::with_capacity(raw.len());

        for (name, value) in &raw {
            let Value::Object(mut object) = value.clone() else {
                return Err(DefinitionError::NotAnObject { name: name.clone() });
            };

            let value = match object.remove(INHERIT) {
                None => Value::Object(object),
                Some(base) => {
                    let base: String = serde_json::from_value(base).map_err(|source| {
                        DefinitionError::InvalidDefinition {
                            name: name.clone(),
                            source,
                        }
                    })?;
                    let Some(parent) = resolved.get(&base) else {
                        let reason = if base == *name {
                            UnresolvedReason::SelfReference
                        } else if raw.contains_key(&base) {
                            UnresolvedReason::DefinedLater
                        } else {
                            UnresolvedReason::Unknown
                        };
                        return Err(DefinitionError::unresolved_base(name, base, reason));
                    };
                    debug!(footprint = %name, base = %base, "Inheriting definition");

                    let mut merged = parent.clone();
                    if let Value::Object(fields) = &mut merged {
                        fields.remove(TEMPLATE);
                    }
                    merge(&mut merged, object);
                    merged
                }
            };

            let spec: FootprintSpec = serde_json::from_value(value.clone()).map_err(|source| {
                DefinitionError::InvalidDefinition {
                    name: name.clone(),
                    source,
                }
            })?;
            resolved.insert(name.clone(), value);
            footprints.insert(name.clone(), spec);
        }

        debug!(count = footprints.len(), "Loaded footprint definitions");
        Ok(Self { footprints })
    }

    /// Returns a definition by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FootprintSpec> {
        self.footprints.get(name)
    }

    /// All definitions, templates included, in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FootprintSpec)> {
        self.footprints.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Definitions that produce footprints (no templates), in document
    /// order.
    pub fn generated(&self) -> impl Iterator<Item = (&str, &FootprintSpec)> {
        self.iter().filter(|(_, spec)| !spec.is_template)
    }

    /// Number of definitions, templates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.footprints.len()
    }

    /// True if the library has no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }
}

/// Merges `overrides` into `target`. Objects merge recursively, any other
/// value replaces the target value.
fn merge(target: &mut Value, overrides: Map<String, Value>) {
    let Value::Object(fields) = target else {
        *target = Value::Object(overrides);
        return;
    };
    for (key, value) in overrides {
        match value {
            Value::Object(nested) if fields.get(&key).is_some_and(Value::is_object) => {
                if let Some(existing) = fields.get_mut(&key) {
                    merge(existing, nested);
                }
            }
            value => {
                fields.insert(key, value);
            }
        }
    }
}
