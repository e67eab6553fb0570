//! Jerk and acceleration limits shared by a planning session.

use serde::Deserialize;

use crate::error::ConfigError;

/// Dynamic limits of the vehicle.
///
/// Sign conventions are enforced at construction: positive jerk and max
/// acceleration are `> 0`, negative jerk and max deceleration are `< 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionParameter {
    positive_jerk: f64,
    negative_jerk: f64,
    max_acceleration: f64,
    max_deceleration: f64,
}

impl MotionParameter {
    /// Create validated motion parameters.
    ///
    /// # Errors
    ///
    /// Returns the `ConfigError` naming the first limit with a wrong sign
    /// (or a non-finite value).
    pub fn new(
        positive_jerk: f64,
        negative_jerk: f64,
        max_acceleration: f64,
        max_deceleration: f64,
    ) -> Result<Self, ConfigError> {
        if !(positive_jerk > 0.0 && positive_jerk.is_finite()) {
            return Err(ConfigError::InvalidPositiveJerk(positive_jerk));
        }
        if !(negative_jerk < 0.0 && negative_jerk.is_finite()) {
            return Err(ConfigError::InvalidNegativeJerk(negative_jerk));
        }
        if !(max_acceleration > 0.0 && max_acceleration.is_finite()) {
            return Err(ConfigError::InvalidMaxAcceleration(max_acceleration));
        }
        if !(max_deceleration < 0.0 && max_deceleration.is_finite()) {
            return Err(ConfigError::InvalidMaxDeceleration(max_deceleration));
        }

        Ok(Self {
            positive_jerk,
            negative_jerk,
            max_acceleration,
            max_deceleration,
        })
    }

    /// Symmetric limits: `±jerk`, `±acceleration`.
    pub fn symmetric(jerk: f64, acceleration: f64) -> Result<Self, ConfigError> {
        Self::new(jerk, -jerk, acceleration, -acceleration)
    }

    /// Jerk used to raise acceleration (`> 0`).
    #[inline]
    pub const fn positive_jerk(&self) -> f64 {
        self.positive_jerk
    }

    /// Jerk used to lower acceleration (`< 0`).
    #[inline]
    pub const fn negative_jerk(&self) -> f64 {
        self.negative_jerk
    }

    /// Largest acceleration (`> 0`).
    #[inline]
    pub const fn max_acceleration(&self) -> f64 {
        self.max_acceleration
    }

    /// Largest deceleration (`< 0`).
    #[inline]
    pub const fn max_deceleration(&self) -> f64 {
        self.max_deceleration
    }
}

#[derive(Deserialize)]
struct RawMotionParameter {
    positive_jerk: f64,
    negative_jerk: f64,
    max_acceleration: f64,
    max_deceleration: f64,
}

impl<'de> Deserialize<'de> for MotionParameter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use core::fmt::Write;
        let raw = RawMotionParameter::deserialize(deserializer)?;
        MotionParameter::new(
            raw.positive_jerk,
            raw.negative_jerk,
            raw.max_acceleration,
            raw.max_deceleration,
        )
        .map_err(|e| {
            let mut buf = heapless::String::<128>::new();
            let _ = write!(buf, "{}", e);
            serde::de::Error::custom(buf.as_str())
        })
    }
}
