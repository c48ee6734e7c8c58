//! Brightness scaling with a user parameter.

use serde_json::Value;
use tilefx_host::{EffectModule, ModuleError, ModuleResult, RenderContext};
use tilefx_surface::Rect;

use super::pixel::map_region;

/// Multiplies color channels by `amount`.
///
/// The amount given at build time is used for final renders; preview passes
/// read the live value from the parameter token instead.
pub struct Brightness {
    built_amount: f64,
    amount: f64,
}

impl Brightness {
    pub fn new(amount: f64) -> Self {
        Self {
            built_amount: amount,
            amount,
        }
    }
}

impl EffectModule for Brightness {
    fn configure(&mut self, ctx: &RenderContext<'_>) -> ModuleResult {
        let amount = match ctx.token.and_then(|t| t.get("amount")) {
            Some(value) => value
                .as_f64()
                .ok_or_else(|| ModuleError::msg(format!("amount must be a number, got {}", value)))?,
            None => self.built_amount,
        };
        if !amount.is_finite() || amount < 0.0 {
            return Err(ModuleError::msg(format!(
                "amount must be a finite non-negative number, got {}",
                amount
            )));
        }
        self.amount = amount;
        Ok(())
    }

    fn render_tile(&self, ctx: &RenderContext<'_>, region: Rect) -> ModuleResult {
        let amount = self.amount;
        map_region(ctx, region, |c| c.scale(amount));
        Ok(())
    }

    fn diagnostics(&self) -> ModuleResult<Option<Value>> {
        Ok(Some(Value::String(format!("amount={}", self.amount))))
    }
}
