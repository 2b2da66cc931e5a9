//! Scheduling configuration threaded into every engine entry point.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::interval::{hhmm, TimeInterval};

/// Working hours, booking horizon and weekday policy.
///
/// Every field has a default, so a config file only needs to name what it
/// overrides. `{}` yields the stock front-desk day (08:00 to 18:00, weekdays,
/// one year ahead).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    #[serde(with = "hhmm")]
    pub working_hours_start: NaiveTime,
    #[serde(with = "hhmm")]
    pub working_hours_end: NaiveTime,
    /// Grid used when suggesting slots. Availability itself ignores it.
    pub slot_granularity_minutes: u32,
    /// Reject Saturday/Sunday on the availability booking path and report
    /// those days as closed.
    pub restrict_to_weekdays: bool,
    /// How many days past today a booking may land.
    pub max_horizon_days: u64,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            working_hours_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            working_hours_end: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default(),
            slot_granularity_minutes: 30,
            restrict_to_weekdays: true,
            max_horizon_days: 365,
        }
    }
}

impl SchedulingConfig {
    /// Parse a JSON config document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SchedulingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.working_hours_end < self.working_hours_start {
            return Err(EngineError::InvalidConfig(format!(
                "working hours end ({}) is before start ({})",
                self.working_hours_end.format("%H:%M"),
                self.working_hours_start.format("%H:%M"),
            )));
        }
        if self.slot_granularity_minutes == 0 {
            return Err(EngineError::InvalidConfig(
                "slot granularity must be at least one minute".to_string(),
            ));
        }
        Ok(())
    }

    pub fn working_hours(&self) -> TimeInterval {
        TimeInterval::new(self.working_hours_start, self.working_hours_end)
    }
}
