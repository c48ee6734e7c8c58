//! A configuration: one compiled module plus everything needed to run it.

use std::fmt;

use tilefx_surface::Surface;

use crate::fault::FaultRecorder;
use crate::module::{EffectModule, EnvironmentParameters, ParameterToken, RenderContext, RenderPass};
use crate::output::OutputLog;

/// One user configuration as handed to the host.
///
/// Holds the module produced by the compiler collaborator (absent when
/// compilation failed), the render parameters, and the fault and output logs
/// the UI reads back. `EffectHost::prepare` takes ownership of the module.
pub struct EffectConfig {
    module: Option<Box<dyn EffectModule>>,
    pass: RenderPass,
    parameters: ParameterToken,
    environment: EnvironmentParameters,
    faults: FaultRecorder,
    output: OutputLog,
}

impl EffectConfig {
    /// Configuration for a compiled module.
    pub fn new(module: Box<dyn EffectModule>) -> Self {
        Self::from_module(Some(module))
    }

    /// Configuration without a module (the compile step produced nothing).
    pub fn empty() -> Self {
        Self::from_module(None)
    }

    pub fn from_module(module: Option<Box<dyn EffectModule>>) -> Self {
        Self {
            module,
            pass: RenderPass::Final,
            parameters: ParameterToken::new(),
            environment: EnvironmentParameters::default(),
            faults: FaultRecorder::new(),
            output: OutputLog::new(),
        }
    }

    pub fn with_pass(mut self, pass: RenderPass) -> Self {
        self.pass = pass;
        self
    }

    pub fn with_parameters(mut self, parameters: ParameterToken) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_environment(mut self, environment: EnvironmentParameters) -> Self {
        self.environment = environment;
        self
    }

    /// Share an existing fault log, e.g. one the UI is already displaying.
    pub fn with_faults(mut self, faults: FaultRecorder) -> Self {
        self.faults = faults;
        self
    }

    /// Share an existing output log.
    pub fn with_output(mut self, output: OutputLog) -> Self {
        self.output = output;
        self
    }

    pub fn pass(&self) -> RenderPass {
        self.pass
    }

    pub fn parameters(&self) -> &ParameterToken {
        &self.parameters
    }

    pub fn environment(&self) -> &EnvironmentParameters {
        &self.environment
    }

    pub fn faults(&self) -> &FaultRecorder {
        &self.faults
    }

    pub fn output(&self) -> &OutputLog {
        &self.output
    }

    /// Returns true until the host has taken the module.
    pub fn has_module(&self) -> bool {
        self.module.is_some()
    }

    pub(crate) fn take_module(&mut self) -> Option<Box<dyn EffectModule>> {
        self.module.take()
    }

    /// Build the per-call context. The parameter token is only exposed on
    /// preview passes.
    pub fn context<'a>(&'a self, dst: &'a Surface, src: &'a Surface) -> RenderContext<'a> {
        RenderContext {
            dst,
            src,
            pass: self.pass,
            environment: &self.environment,
            token: match self.pass {
                RenderPass::Preview => Some(&self.parameters),
                RenderPass::Final => None,
            },
        }
    }
}

impl fmt::Debug for EffectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectConfig")
            .field("has_module", &self.module.is_some())
            .field("pass", &self.pass)
            .field("parameters", &self.parameters)
            .field("environment", &self.environment)
            .field("faults", &self.faults.len())
            .field("output", &self.output.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tilefx_surface::ColorBgra;

    use super::*;

    #[test]
    fn test_token_only_on_preview() {
        let src = Surface::new(2, 2, ColorBgra::white()).unwrap();
        let dst = Surface::transparent(2, 2).unwrap();
        let mut parameters = ParameterToken::new();
        parameters.insert("amount".to_string(), json!(0.5));

        let preview = EffectConfig::empty()
            .with_parameters(parameters.clone())
            .with_pass(RenderPass::Preview);
        let ctx = preview.context(&dst, &src);
        assert!(ctx.is_preview());
        assert_eq!(ctx.token, Some(&parameters));

        let final_pass = EffectConfig::empty().with_parameters(parameters);
        let ctx = final_pass.context(&dst, &src);
        assert!(!ctx.is_preview());
        assert!(ctx.token.is_none());
    }
}
