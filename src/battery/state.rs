use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Which side of the battery absorbs conversion losses.
///
/// The round-trip efficiency is applied exactly once per charge or discharge
/// event, on the configured side only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LossSide {
    /// Stored energy is `charge * efficiency`; discharge delivers everything it removes.
    #[default]
    Charge,
    /// Stored energy equals the charge; only `discharge * efficiency` reaches the load.
    Discharge,
}

/// Snapshot of the allowed state-of-charge window, in Wh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    /// Current usable energy span.
    pub capacity: f64,
    /// Lowest allowed state of charge.
    pub min_charge: f64,
    /// Highest allowed state of charge.
    pub max_charge: f64,
}

impl Bounds {
    /// Scales every bound by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            capacity: self.capacity * factor,
            min_charge: self.min_charge * factor,
            max_charge: self.max_charge * factor,
        }
    }

    /// Component-wise minimum, so bounds never grow back.
    pub fn min(&self, other: &Self) -> Self {
        Self {
            capacity: self.capacity.min(other.capacity),
            min_charge: self.min_charge.min(other.min_charge),
            max_charge: self.max_charge.min(other.max_charge),
        }
    }
}

/// Energy actually moved by one [`BatteryState::apply_flow`] call, in Wh.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Flow {
    /// Energy taken from the surplus (grid side, before losses).
    pub charge: f64,
    /// Energy removed from storage.
    pub discharge: f64,
    /// Energy that reached the load.
    pub delivered: f64,
}

/// The physical battery model: bounds, stored energy and efficiency.
///
/// Owned by exactly one simulation run and mutated once per interval.
///
/// # Examples
///
/// ```
/// use grid_battery_sim::battery::{BatteryState, LossSide};
///
/// let mut battery = BatteryState::new(1000.0, 50.0, 950.0, 500.0, 1.0, LossSide::Charge).unwrap();
/// let flow = battery.apply_flow(300.0, 0.0);
/// assert_eq!(flow.charge, 300.0);
/// assert_eq!(battery.soc(), 800.0);
/// ```
#[derive(Debug, Clone)]
pub struct BatteryState {
    rated_capacity: f64,
    bounds: Bounds,
    soc: f64,
    efficiency: f64,
    loss_side: LossSide,
}

impl BatteryState {
    /// Creates a battery from absolute bounds in Wh.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Nominal usable energy (Wh, must be > 0)
    /// * `min_charge` - Lowest allowed state of charge (Wh)
    /// * `max_charge` - Highest allowed state of charge (Wh)
    /// * `soc` - Initial state of charge, within `[min_charge, max_charge]`
    /// * `efficiency` - Round-trip efficiency in `(0, 1]`
    /// * `loss_side` - Where the efficiency loss is booked
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first violated constraint.
    pub fn new(
        capacity: f64,
        min_charge: f64,
        max_charge: f64,
        soc: f64,
        efficiency: f64,
        loss_side: LossSide,
    ) -> Result<Self, ConfigError> {
        if !(capacity.is_finite() && capacity > 0.0) {
            return Err(ConfigError::new("battery.capacity_wh", "must be > 0"));
        }
        if !(0.0 <= min_charge && min_charge < max_charge && max_charge <= capacity) {
            return Err(ConfigError::new(
                "battery.min_soc",
                format!(
                    "bounds must satisfy 0 <= min ({min_charge}) < max ({max_charge}) \
                     <= capacity ({capacity})"
                ),
            ));
        }
        if !(min_charge..=max_charge).contains(&soc) {
            return Err(ConfigError::new(
                "battery.initial_soc",
                format!("{soc} Wh is outside [{min_charge}, {max_charge}]"),
            ));
        }
        if !(efficiency > 0.0 && efficiency <= 1.0) {
            return Err(ConfigError::new("battery.efficiency", "must be in (0, 1]"));
        }

        Ok(Self {
            rated_capacity: capacity,
            bounds: Bounds {
                capacity,
                min_charge,
                max_charge,
            },
            soc,
            efficiency,
            loss_side,
        })
    }

    /// Creates a battery whose bounds and initial charge are fractions of `capacity`.
    ///
    /// # Errors
    ///
    /// Same as [`BatteryState::new`].
    pub fn from_fractions(
        capacity: f64,
        min_soc: f64,
        max_soc: f64,
        initial_soc: f64,
        efficiency: f64,
        loss_side: LossSide,
    ) -> Result<Self, ConfigError> {
        Self::new(
            capacity,
            capacity * min_soc,
            capacity * max_soc,
            capacity * initial_soc,
            efficiency,
            loss_side,
        )
    }

    /// Current stored energy (Wh).
    pub fn soc(&self) -> f64 {
        self.soc
    }

    /// Current bounds.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Nameplate capacity; constant for the whole run.
    pub fn rated_capacity(&self) -> f64 {
        self.rated_capacity
    }

    /// Round-trip efficiency applied on [`Self::loss_side`].
    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    pub fn loss_side(&self) -> LossSide {
        self.loss_side
    }

    /// Energy to draw from storage so that `deficit` Wh reach the load.
    pub fn discharge_request_for(&self, deficit: f64) -> f64 {
        match self.loss_side {
            LossSide::Charge => deficit,
            LossSide::Discharge => deficit / self.efficiency,
        }
    }

    /// Charges or discharges the battery, clamping to the allowed window.
    ///
    /// Negative requests count as zero. When both requests are positive only
    /// their net is applied, so at most one of `charge`/`discharge` is non-zero.
    ///
    /// # Returns
    ///
    /// The energy actually moved.
    pub fn apply_flow(&mut self, requested_charge: f64, requested_discharge: f64) -> Flow {
        let net = requested_charge.max(0.0) - requested_discharge.max(0.0);
        let Bounds {
            min_charge,
            max_charge,
            ..
        } = self.bounds;

        if net > 0.0 {
            let charge = net.min((max_charge - self.soc).max(0.0));
            let stored = match self.loss_side {
                LossSide::Charge => charge * self.efficiency,
                LossSide::Discharge => charge,
            };
            self.soc = (self.soc + stored).min(max_charge);
            Flow {
                charge,
                discharge: 0.0,
                delivered: 0.0,
            }
        } else if net < 0.0 {
            let discharge = (-net).min((self.soc - min_charge).max(0.0));
            self.soc = (self.soc - discharge).max(min_charge);
            let delivered = match self.loss_side {
                LossSide::Charge => discharge,
                LossSide::Discharge => discharge * self.efficiency,
            };
            Flow {
                charge: 0.0,
                discharge,
                delivered,
            }
        } else {
            Flow::default()
        }
    }

    /// Shrinks the bounds to `bounds` (never grows them) and clamps the charge into the new window.
    ///
    /// # Returns
    ///
    /// The stored energy dropped by the clamp (Wh), zero when the charge still fits.
    pub fn degrade_to(&mut self, bounds: Bounds) -> f64 {
        let before = self.soc;
        self.bounds = self.bounds.min(&bounds);
        self.soc = self
            .soc
            .clamp(self.bounds.min_charge, self.bounds.max_charge);
        before - self.soc
    }
}
