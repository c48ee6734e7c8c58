//! One-shot, best-effort retrieval of a module's debug output.
//!
//! Diagnostics are a convenience for the script author, not part of the
//! render contract: every way the fetch can go wrong (no value, a value that
//! is not a string, an error, a panic) is swallowed here and never becomes a
//! fault.

use serde_json::Value;
use tracing::debug;

use crate::isolation;
use crate::module::EffectModule;
use crate::output::OutputLog;

/// Read the module's diagnostic text.
///
/// Returns `Some` only for a non-empty JSON string.
pub fn fetch(module: &dyn EffectModule) -> Option<String> {
    match isolation::guard(|| module.diagnostics()) {
        Ok(Some(Value::String(text))) if !text.is_empty() => Some(text),
        Ok(Some(Value::String(_))) | Ok(None) => None,
        Ok(Some(other)) => {
            debug!(kind = value_kind(&other), "ignoring non-string module diagnostics");
            None
        }
        Err(cause) => {
            debug!(%cause, "module diagnostics unavailable");
            None
        }
    }
}

/// Fetch diagnostics and append them to `log`. Returns true if text was
/// appended.
pub fn fetch_into(module: &dyn EffectModule, log: &OutputLog) -> bool {
    match fetch(module) {
        Some(text) => {
            log.append(text);
            true
        }
        None => false,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tilefx_surface::Rect;

    use super::*;
    use crate::module::{ModuleError, ModuleResult, RenderContext};

    enum Exposes {
        Nothing,
        Value(Value),
        Fails,
        Panics,
    }

    struct Probe(Exposes);

    impl EffectModule for Probe {
        fn configure(&mut self, _ctx: &RenderContext<'_>) -> ModuleResult {
            Ok(())
        }

        fn render_tile(&self, _ctx: &RenderContext<'_>, _region: Rect) -> ModuleResult {
            Ok(())
        }

        fn diagnostics(&self) -> ModuleResult<Option<Value>> {
            match &self.0 {
                Exposes::Nothing => Ok(None),
                Exposes::Value(v) => Ok(Some(v.clone())),
                Exposes::Fails => Err(ModuleError::msg("no such property")),
                Exposes::Panics => panic!("getter exploded"),
            }
        }
    }

    #[test]
    fn test_string_is_fetched() {
        let probe = Probe(Exposes::Value(json!("scale=2.0")));
        assert_eq!(fetch(&probe), Some("scale=2.0".to_string()));
    }

    #[test]
    fn test_failures_are_swallowed() {
        let cases = [
            Exposes::Nothing,
            Exposes::Value(json!("")),
            Exposes::Value(json!(42)),
            Exposes::Value(json!({ "msg": "hi" })),
            Exposes::Fails,
            Exposes::Panics,
        ];

        for case in cases {
            let log = OutputLog::new();
            assert!(!fetch_into(&Probe(case), &log));
            assert!(log.is_empty());
        }
    }

    #[test]
    fn test_fetch_into_appends() {
        let log = OutputLog::new();
        assert!(fetch_into(&Probe(Exposes::Value(json!("x=1"))), &log));
        assert_eq!(log.entries(), vec!["x=1".to_string()]);
    }
}
