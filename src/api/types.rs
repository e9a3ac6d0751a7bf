//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::sim::summary::SimulationSummary;
use crate::sim::types::OutputRow;

/// Run totals plus the derived economics.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub scenario: String,
    pub summary: SimulationSummary,
    pub net_cost_without_battery: f64,
    pub net_cost_with_battery: f64,
    pub savings: f64,
    /// Last emitted row, absent for an empty run.
    pub latest_row: Option<OutputRow>,
}

impl SummaryResponse {
    pub fn new(
        scenario: &str,
        summary: &SimulationSummary,
        latest_row: Option<&OutputRow>,
    ) -> Self {
        Self {
            scenario: scenario.to_string(),
            summary: summary.clone(),
            net_cost_without_battery: summary.net_cost_without_battery(),
            net_cost_with_battery: summary.net_cost_with_battery(),
            savings: summary.savings(),
            latest_row: latest_row.cloned(),
        }
    }
}

/// Optional inclusive timestamp range for the rows endpoint.
///
/// Timestamps use the CSV layout, `YYYY-MM-DD HH:MM[:SS]` or `T`-separated.
#[derive(Debug, Deserialize)]
pub struct RowsQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
