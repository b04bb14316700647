//! Type-safe configuration types for servboot

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// What the executor does when a command or a component phase fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the remaining batch on the first failure
    #[default]
    #[strum(serialize = "fail-fast")]
    FailFast,
    /// Log the failure, record it, and carry on with the next step
    #[strum(serialize = "continue")]
    Continue,
}

impl FailurePolicy {
    pub fn is_fail_fast(&self) -> bool {
        matches!(self, Self::FailFast)
    }
}
