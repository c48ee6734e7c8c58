//! Built-in effect modules.
//!
//! The host treats every module as untrusted third-party code. Compiling
//! user scripts happens outside this repository, so the CLI ships a small
//! registry of ready-made modules that stand in for compiled scripts,
//! including deliberately faulty ones for exercising fault containment.
//!
//! # Modules
//!
//! | name | behavior |
//! |------|----------|
//! | `invert` | inverts color channels |
//! | `grayscale` | replaces color with luminance |
//! | `brightness` | scales channels by `amount`; reports it as diagnostics |
//! | `panic-on-tile` | renders `after` tiles, then panics |
//! | `fail-configure` | setup returns an error |

mod brightness;
mod faulty;
mod pixel;

pub use brightness::Brightness;
pub use faulty::{FailConfigure, PanicOnTile};
pub use pixel::PixelMap;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tilefx_host::{EffectModule, ParameterToken};

/// Errors from building a module out of a registry entry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("Unknown effect: {0}")]
    UnknownEffect(String),

    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },
}

type Builder = fn(&ParameterToken) -> Result<Box<dyn EffectModule>, BuildError>;

/// A registered effect.
#[derive(Clone, Serialize)]
pub struct EffectEntry {
    pub name: &'static str,
    pub description: &'static str,
    /// Parameter names the effect reads.
    pub parameters: &'static [&'static str],
    #[serde(skip)]
    build: Builder,
}

impl std::fmt::Debug for EffectEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectEntry")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Registry of effects the CLI can run.
#[derive(Debug, Clone)]
pub struct EffectRegistry {
    entries: BTreeMap<&'static str, EffectEntry>,
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl EffectRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registry holding all built-in effects.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(EffectEntry {
            name: "invert",
            description: "Invert color channels",
            parameters: &[],
            build: |_| Ok(Box::new(PixelMap::invert())),
        });
        registry.register(EffectEntry {
            name: "grayscale",
            description: "Replace color with luminance",
            parameters: &[],
            build: |_| Ok(Box::new(PixelMap::grayscale())),
        });
        registry.register(EffectEntry {
            name: "brightness",
            description: "Scale color channels by a factor",
            parameters: &["amount"],
            build: |params| Ok(Box::new(Brightness::new(number_param(params, "amount", 1.0)?))),
        });
        registry.register(EffectEntry {
            name: "panic-on-tile",
            description: "Render some tiles, then panic",
            parameters: &["after"],
            build: |params| {
                let after = number_param(params, "after", 0.0)?;
                if after < 0.0 || after.fract() != 0.0 {
                    return Err(BuildError::InvalidParameter {
                        name: "after".to_string(),
                        message: format!("expected a non-negative integer, got {}", after),
                    });
                }
                Ok(Box::new(PanicOnTile::new(after as usize)))
            },
        });
        registry.register(EffectEntry {
            name: "fail-configure",
            description: "Fail during setup",
            parameters: &["message"],
            build: |params| {
                let message = match params.get("message") {
                    Some(Value::String(s)) => s.clone(),
                    _ => "configure rejected".to_string(),
                };
                Ok(Box::new(FailConfigure::new(message)))
            },
        });
        registry
    }

    /// Register an entry, replacing any entry of the same name.
    pub fn register(&mut self, entry: EffectEntry) {
        self.entries.insert(entry.name, entry);
    }

    pub fn get(&self, name: &str) -> Option<&EffectEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entries in name order.
    pub fn list(&self) -> impl Iterator<Item = &EffectEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a fresh module for `name` with the given parameters.
    pub fn build(
        &self,
        name: &str,
        parameters: &ParameterToken,
    ) -> Result<Box<dyn EffectModule>, BuildError> {
        let entry = self
            .get(name)
            .ok_or_else(|| BuildError::UnknownEffect(name.to_string()))?;
        (entry.build)(parameters)
    }
}

/// Read a numeric parameter, falling back to `default` when absent.
pub(crate) fn number_param(
    params: &ParameterToken,
    name: &str,
    default: f64,
) -> Result<f64, BuildError> {
    match params.get(name) {
        None => Ok(default),
        Some(value) => value.as_f64().ok_or_else(|| BuildError::InvalidParameter {
            name: name.to_string(),
            message: format!("expected a number, got {}", value),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_builtin_names() {
        let registry = EffectRegistry::builtin();
        let names: Vec<_> = registry.list().map(|e| e.name).collect();
        assert_eq!(
            names,
            vec!["brightness", "fail-configure", "grayscale", "invert", "panic-on-tile"]
        );
    }

    #[test]
    fn test_unknown_effect() {
        let registry = EffectRegistry::builtin();
        let err = registry.build("blur", &ParameterToken::new()).err().unwrap();
        assert_eq!(err, BuildError::UnknownEffect("blur".to_string()));
    }

    #[test]
    fn test_invalid_parameter() {
        let registry = EffectRegistry::builtin();
        let mut params = ParameterToken::new();
        params.insert("amount".to_string(), json!("lots"));

        let err = registry.build("brightness", &params).err().unwrap();
        assert!(matches!(err, BuildError::InvalidParameter { ref name, .. } if name == "amount"));
    }

    #[test]
    fn test_panic_on_tile_requires_integer() {
        let registry = EffectRegistry::builtin();
        let mut params = ParameterToken::new();
        params.insert("after".to_string(), json!(1.5));
        assert!(registry.build("panic-on-tile", &params).is_err());

        params.insert("after".to_string(), json!(2));
        assert!(registry.build("panic-on-tile", &params).is_ok());
    }
}
