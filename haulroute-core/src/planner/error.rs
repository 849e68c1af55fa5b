use thiserror::Error;

use crate::TruckProfileError;
use crate::backend::BackendError;
use crate::stops::InfeasibleFuelPlan;

/// Reasons a planning request ends in the `Failed` state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// The truck profile broke the caller contract.
    #[error("invalid truck profile: {0}")]
    InvalidProfile(#[from] TruckProfileError),
    /// The backend did not answer within the configured timeout.
    #[error("routing backend timed out: {source}")]
    BackendTimeout {
        /// Transport error reported by the backend.
        #[source]
        source: BackendError,
    },
    /// The backend could not be reached or returned garbage.
    #[error("routing backend unavailable: {source}")]
    BackendUnavailable {
        /// Transport error reported by the backend.
        #[source]
        source: BackendError,
    },
    /// No refuelling sequence carries the truck to its destination.
    #[error(transparent)]
    InfeasibleFuelPlan(#[from] InfeasibleFuelPlan),
    /// The caller cancelled the request.
    #[error("planning cancelled in state {stage}")]
    Cancelled {
        /// State the planner was in when it observed the signal.
        stage: &'static str,
    },
}

impl From<BackendError> for PlanError {
    fn from(source: BackendError) -> Self {
        if source.is_timeout() {
            Self::BackendTimeout { source }
        } else {
            Self::BackendUnavailable { source }
        }
    }
}
