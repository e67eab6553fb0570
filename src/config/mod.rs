//! Configuration module for clearance-motion.
//!
//! Provides the motion limits, planner tuning and path description, loaded
//! from TOML files (with `std` feature) or built in code.

mod motion;
mod planner;
mod system;
#[cfg(feature = "std")]
mod loader;
mod validation;

pub use motion::MotionParameter;
pub use planner::{PlannerSettings, PlannerTuning};
pub use system::PlannerConfig;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};
