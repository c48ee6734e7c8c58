//! Render job files.
//!
//! A job is a JSON document naming the effect, its parameters and where the
//! source and output images live. Command line flags override job fields.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tilefx_host::{EnvironmentParameters, ParameterToken, RenderPass};
use tilefx_surface::{ColorBgra, Rect};

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 64;

/// Default size of the generated checkerboard source.
pub const DEFAULT_SOURCE_SIZE: u32 = 256;

/// Errors from loading or validating a job.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Failed to read job file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse job file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid job: {0}")]
    Invalid(String),
}

/// Host environment as written in a job file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentJob {
    /// Primary color as `[r, g, b, a]`.
    #[serde(default = "default_primary")]
    pub primary_color: [u8; 4],
    /// Secondary color as `[r, g, b, a]`.
    #[serde(default = "default_secondary")]
    pub secondary_color: [u8; 4],
    #[serde(default = "default_brush_width")]
    pub brush_width: f32,
    /// Selection as `[x, y, width, height]`.
    #[serde(default)]
    pub selection: Option<[u32; 4]>,
}

fn default_primary() -> [u8; 4] {
    ColorBgra::black().to_rgba8()
}

fn default_secondary() -> [u8; 4] {
    ColorBgra::white().to_rgba8()
}

fn default_brush_width() -> f32 {
    2.0
}

impl Default for EnvironmentJob {
    fn default() -> Self {
        Self {
            primary_color: default_primary(),
            secondary_color: default_secondary(),
            brush_width: default_brush_width(),
            selection: None,
        }
    }
}

impl From<&EnvironmentJob> for EnvironmentParameters {
    fn from(job: &EnvironmentJob) -> Self {
        Self {
            primary_color: ColorBgra::from_rgba8(job.primary_color),
            secondary_color: ColorBgra::from_rgba8(job.secondary_color),
            brush_width: job.brush_width,
            selection: job.selection.map(|[x, y, w, h]| Rect::new(x, y, w, h)),
        }
    }
}

/// A render job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderJob {
    /// Registered effect name.
    pub effect: String,
    #[serde(default)]
    pub parameters: ParameterToken,
    /// Render as an interactive preview pass.
    #[serde(default)]
    pub preview: bool,
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    /// Render worker threads; 0 means one per available core.
    #[serde(default)]
    pub workers: usize,
    /// Tiles handed to a worker per call.
    #[serde(default = "default_batch")]
    pub batch: usize,
    /// Source PNG. A checkerboard of `width` x `height` is used when absent.
    #[serde(default)]
    pub input: Option<PathBuf>,
    #[serde(default = "default_source_size")]
    pub width: u32,
    #[serde(default = "default_source_size")]
    pub height: u32,
    /// Output PNG.
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub environment: EnvironmentJob,
}

fn default_tile_size() -> u32 {
    DEFAULT_TILE_SIZE
}

fn default_batch() -> usize {
    1
}

fn default_source_size() -> u32 {
    DEFAULT_SOURCE_SIZE
}

impl RenderJob {
    /// A job for `effect` with every other field at its default.
    pub fn new(effect: impl Into<String>) -> Self {
        Self {
            effect: effect.into(),
            parameters: ParameterToken::new(),
            preview: false,
            tile_size: DEFAULT_TILE_SIZE,
            workers: 0,
            batch: 1,
            input: None,
            width: DEFAULT_SOURCE_SIZE,
            height: DEFAULT_SOURCE_SIZE,
            output: None,
            environment: EnvironmentJob::default(),
        }
    }

    /// Load a job from a JSON file.
    pub fn load(path: &Path) -> Result<Self, JobError> {
        let text = std::fs::read_to_string(path).map_err(|source| JobError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| JobError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check field ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), JobError> {
        if self.effect.trim().is_empty() {
            return Err(JobError::Invalid("effect name is empty".to_string()));
        }
        if self.batch == 0 {
            return Err(JobError::Invalid("batch must be at least 1".to_string()));
        }
        if self.input.is_none() && (self.width == 0 || self.height == 0) {
            return Err(JobError::Invalid(format!(
                "source size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.environment.brush_width.is_finite() || self.environment.brush_width < 0.0 {
            return Err(JobError::Invalid(format!(
                "brush_width must be a non-negative number, got {}",
                self.environment.brush_width
            )));
        }
        Ok(())
    }

    pub fn pass(&self) -> RenderPass {
        if self.preview {
            RenderPass::Preview
        } else {
            RenderPass::Final
        }
    }

    /// Worker count with 0 resolved to the available parallelism.
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}

/// Parse a `key=value` parameter override.
///
/// The value is read as JSON when it parses, otherwise it is kept as a string,
/// so `amount=1.5` yields a number and `label=hello` a string.
pub fn parse_param(text: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", text))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in '{}'", text));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_minimal_job_defaults() {
        let job: RenderJob = serde_json::from_str(r#"{"effect": "invert"}"#).unwrap();
        assert_eq!(job, RenderJob::new("invert"));
        assert_eq!(job.pass(), RenderPass::Final);
        job.validate().unwrap();
    }

    #[test]
    fn test_full_job() {
        let job: RenderJob = serde_json::from_str(
            r#"{
                "effect": "brightness",
                "parameters": {"amount": 1.5},
                "preview": true,
                "tile_size": 32,
                "workers": 4,
                "batch": 2,
                "output": "out.png",
                "environment": {
                    "primary_color": [255, 0, 0, 255],
                    "selection": [1, 2, 3, 4]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(job.parameters.get("amount"), Some(&json!(1.5)));
        assert_eq!(job.pass(), RenderPass::Preview);
        assert_eq!(job.worker_count(), 4);

        let env = EnvironmentParameters::from(&job.environment);
        assert_eq!(env.primary_color, ColorBgra::rgb(255, 0, 0));
        assert_eq!(env.secondary_color, ColorBgra::white());
        assert_eq!(env.selection, Some(Rect::new(1, 2, 3, 4)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<RenderJob, _> =
            serde_json::from_str(r#"{"effect": "invert", "tiles": 3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let mut job = RenderJob::new("invert");
        job.batch = 0;
        assert!(matches!(job.validate(), Err(JobError::Invalid(_))));
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = RenderJob::load(&path).unwrap_err();
        assert!(matches!(err, JobError::Parse { .. }));
        assert!(err.to_string().contains("job.json"));
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("amount=1.5").unwrap(), ("amount".to_string(), json!(1.5)));
        assert_eq!(parse_param("label=hello").unwrap(), ("label".to_string(), json!("hello")));
        assert_eq!(parse_param("flag=true").unwrap(), ("flag".to_string(), json!(true)));
        assert!(parse_param("amount").is_err());
        assert!(parse_param("=1").is_err());
    }
}
