//! Boundary adapters for calls into untrusted modules.
//!
//! Every module call is made through [`guard`] or [`catch`], which turn both
//! returned errors and panics into a [`FaultCause`] value. Nothing a module
//! does may unwind through the host's own stack.
//!
//! The process panic hook still runs for a caught panic, so the default hook
//! prints the module's panic message to stderr.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::fault::FaultCause;
use crate::module::ModuleResult;

/// Run a fallible module call, containing panics and errors.
pub fn guard<T>(call: impl FnOnce() -> ModuleResult<T>) -> Result<T, FaultCause> {
    match catch(call)? {
        Ok(value) => Ok(value),
        Err(err) => Err(FaultCause::error(err.to_string())),
    }
}

/// Run a module call, containing panics only.
pub fn catch<T>(call: impl FnOnce() -> T) -> Result<T, FaultCause> {
    panic::catch_unwind(AssertUnwindSafe(call))
        .map_err(|payload| FaultCause::panic(panic_message(payload.as_ref())))
}

/// Extract a readable message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
