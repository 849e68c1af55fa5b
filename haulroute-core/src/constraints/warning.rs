use thiserror::Error;

/// Non-fatal findings raised while resolving a truck profile.
///
/// Warnings travel alongside a successful result so that callers can log
/// them; they never abort planning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum ConstraintWarning {
    /// A declared route restriction has no known avoidance.
    #[error("ignoring unknown route restriction '{value}'")]
    UnknownRestriction {
        /// Restriction string as supplied.
        value: String,
    },
    /// A traffic pattern used a level other than `Low`, `Medium` or `High`.
    #[error("ignoring unknown traffic level '{level}' for zone '{zone}'")]
    UnknownTrafficLevel {
        /// Zone the pattern applies to.
        zone: String,
        /// Level string as supplied.
        level: String,
    },
    /// A weather pattern used a value other than `Sunny`, `Rainy` or `Snowy`.
    #[error("ignoring unknown weather '{weather}' for zone '{zone}'")]
    UnknownWeather {
        /// Zone the pattern applies to.
        zone: String,
        /// Weather string as supplied.
        weather: String,
    },
    /// Axle weights do not add up to the declared gross weight.
    #[error("axle weights sum to {axle_total} kg but gross weight is {declared} kg")]
    AxleWeightMismatch {
        /// Declared gross weight.
        declared: u32,
        /// Sum of the per-axle weights.
        axle_total: u64,
    },
    /// Cargo is hazardous but the hazmat flag is not set.
    #[error("cargo type is Hazardous but the hazmat flag is not set; avoiding tunnels anyway")]
    HazmatFlagMismatch,
}
