//! Unit tests for configuration validation.

use clearance_motion::config::{validate_config, PlannerConfig};
use clearance_motion::error::{ConfigError, Error};

fn config_with(planner: &str, segments: &str) -> PlannerConfig {
    let toml_str = format!(
        r#"
[motion]
positive_jerk = 2000.0
negative_jerk = -2000.0
max_acceleration = 500.0
max_deceleration = -500.0

[planner]
{planner}

{segments}
"#
    );
    toml::from_str(&toml_str).expect("Failed to parse TOML")
}

const TWO_SEGMENTS: &str = r#"
[[segments]]
id = 1
length = 1000.0
max_velocity = 800.0
start_node = 1
end_node = 2

[[segments]]
id = 2
length = 1000.0
max_velocity = 800.0
start_node = 2
end_node = 3
"#;

/// Test validation of a valid configuration.
#[test]
fn test_valid_config_passes_validation() {
    let config = config_with("cap_velocity = 800.0", TWO_SEGMENTS);
    assert!(validate_config(&config).is_ok());
}

/// Test validation fails for a non-positive cap velocity.
#[test]
fn test_invalid_cap_velocity() {
    let config = config_with("cap_velocity = 0.0", TWO_SEGMENTS);
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidCapVelocity(_)))
    ));
}

/// Test validation fails for a zero velocity step.
#[test]
fn test_invalid_velocity_decrement() {
    let config = config_with("cap_velocity = 800.0\nvelocity_decrement = 0.0", TWO_SEGMENTS);
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidVelocityDecrement(_)))
    ));
}

/// Test validation fails for a zero repair iteration cap.
#[test]
fn test_invalid_repair_iterations() {
    let config = config_with("cap_velocity = 800.0\nmax_repair_iterations = 0", TWO_SEGMENTS);
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidRepairIterations(0)))
    ));
}

/// Test validation fails for duplicate segment ids.
#[test]
fn test_duplicate_segment_id() {
    let segments = TWO_SEGMENTS.replace("id = 2", "id = 1");
    let config = config_with("cap_velocity = 800.0", &segments);
    assert_eq!(
        validate_config(&config),
        Err(Error::Config(ConfigError::DuplicateSegmentId(1)))
    );
}

/// Test validation fails for a negative segment length.
#[test]
fn test_negative_segment_length() {
    let segments = TWO_SEGMENTS.replacen("length = 1000.0", "length = -5.0", 1);
    let config = config_with("cap_velocity = 800.0", &segments);
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidSegmentLength { id: 1, .. }))
    ));
}

/// Test validation fails for a segment that forbids motion over its length.
#[test]
fn test_zero_velocity_segment() {
    let segments = TWO_SEGMENTS.replacen("max_velocity = 800.0", "max_velocity = 0.0", 1);
    let config = config_with("cap_velocity = 800.0", &segments);
    assert!(matches!(
        validate_config(&config),
        Err(Error::Config(ConfigError::InvalidSegmentVelocity { id: 1, .. }))
    ));
}
