//! tilefx CLI library.
//!
//! Job loading, the built-in effect registry and the tiled render pipeline
//! behind the `tilefx` binary.

pub mod commands;
pub mod effects;
pub mod job;
pub mod pipeline;
