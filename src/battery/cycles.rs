/// Cumulative equivalent-full-cycle counter.
///
/// One equivalent full cycle is charging plus discharging the whole rated
/// capacity once, so each interval adds `(charge + discharge) / (2 * capacity)`.
/// The counter never decreases and has no reset.
#[derive(Debug, Clone)]
pub struct CycleAccountant {
    capacity: f64,
    throughput: f64,
    cycles: f64,
}

impl CycleAccountant {
    /// Creates a counter against the given rated capacity (Wh, > 0).
    pub fn new(capacity: f64) -> Self {
        Self {
            capacity,
            throughput: 0.0,
            cycles: 0.0,
        }
    }

    /// Books one interval's charge and discharge (Wh) and returns the new cycle count.
    ///
    /// Negative amounts are ignored.
    pub fn record(&mut self, charge: f64, discharge: f64) -> f64 {
        let moved = charge.max(0.0) + discharge.max(0.0);
        self.throughput += moved;
        if self.capacity > 0.0 {
            self.cycles += moved / (2.0 * self.capacity);
        }
        self.cycles
    }

    /// Equivalent full cycles so far.
    pub fn cycles(&self) -> f64 {
        self.cycles
    }

    /// Total energy moved through the battery so far (Wh).
    pub fn throughput(&self) -> f64 {
        self.throughput
    }
}
