use super::state::Bounds;
use crate::config::ConfigError;

/// Linear capacity fade driven by equivalent full cycles.
///
/// Bounds shrink from their initial values to `retention` of them over
/// `rated_cycles` cycles, then stay there. The policy is pure; the runner
/// applies its output to the battery between intervals.
#[derive(Debug, Clone)]
pub struct DegradationPolicy {
    rated_cycles: f64,
    retention: f64,
    initial: Bounds,
}

impl DegradationPolicy {
    /// Creates a fade policy.
    ///
    /// # Arguments
    ///
    /// * `rated_cycles` - Cycles after which only `retention` remains (> 0)
    /// * `retention` - Remaining fraction at end of rated life, in `(0, 1]`
    /// * `initial` - Bounds of the new battery
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a parameter is out of range.
    pub fn new(rated_cycles: f64, retention: f64, initial: Bounds) -> Result<Self, ConfigError> {
        if !(rated_cycles.is_finite() && rated_cycles > 0.0) {
            return Err(ConfigError::new("degradation.rated_cycles", "must be > 0"));
        }
        if !(retention > 0.0 && retention <= 1.0) {
            return Err(ConfigError::new("degradation.retention", "must be in (0, 1]"));
        }
        Ok(Self {
            rated_cycles,
            retention,
            initial,
        })
    }

    /// Remaining fraction of the initial bounds after `cycles`.
    pub fn health(&self, cycles: f64) -> f64 {
        let progress = (cycles.max(0.0) / self.rated_cycles).min(1.0);
        1.0 - (1.0 - self.retention) * progress
    }

    /// Bounds after `cycles` equivalent full cycles.
    pub fn bounds_at(&self, cycles: f64) -> Bounds {
        self.initial.scaled(self.health(cycles))
    }
}
