//! Configuration record and enums for the export pipeline construct

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Duration granularity labels understood by the pipeline scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display)]
pub enum TimeUnit {
    /// Seconds
    Second,
    /// Minutes
    Minute,
    /// Hours
    Hour,
    /// Days
    Day,
    /// Weeks
    Week,
    /// Months
    Month,
}

/// A duration rendered as `"<value> <unit>"` in the pipeline definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TimePeriod {
    /// Number of units
    pub value: i64,
    /// Duration granularity
    pub format: TimeUnit,
}

impl TimePeriod {
    /// Creates a period of `value` units
    #[must_use]
    pub const fn new(value: i64, format: TimeUnit) -> Self {
        Self { value, format }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.format)
    }
}

/// Pipeline schedule style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display)]
pub enum ScheduleType {
    /// Run on a cron-style schedule
    #[serde(rename = "cron")]
    #[strum(serialize = "cron")]
    Cron,
    /// Run on fixed time-series intervals
    #[serde(rename = "timeseries")]
    #[strum(serialize = "timeseries")]
    Timeseries,
}

/// Rerun behavior when a pipeline activity fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display)]
pub enum FailureAndRerunMode {
    /// Failures do not cascade to dependent objects
    #[serde(rename = "NONE")]
    #[strum(serialize = "NONE")]
    None,
    /// Failures cascade to dependent objects
    #[serde(rename = "CASCADE")]
    #[strum(serialize = "CASCADE")]
    Cascade,
}

/// Configuration for [`crate::ExportPipeline`]
///
/// Values are passed through to the pipeline definition without semantic
/// validation; inconsistent combinations surface when the provisioning
/// engine evaluates the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExportPipelineProps {
    /// Source table to export
    pub table_name: String,
    /// Destination bucket for the exported data
    pub bucket_name: String,
    /// Fraction of the table's read throughput the export may consume
    ///
    /// Defaults to 0.25 when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_throughput_ratio: Option<f64>,
    /// Whether the cluster is resized to match the table before the run
    ///
    /// Defaults to true when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize_cluster_before_running: Option<bool>,
    /// How long the transient EMR cluster may live before termination
    pub emr_terminate_after: TimePeriod,
    /// Interval between scheduled runs
    pub period: TimePeriod,
    /// Number of scheduled runs
    pub run_occurrences: i64,
    /// Schedule style for the pipeline
    pub schedule_type: ScheduleType,
    /// Rerun behavior on activity failure
    pub failure_and_rerun_mode: FailureAndRerunMode,
}
