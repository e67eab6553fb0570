//! Unit tests for TOML configuration parsing.

use clearance_motion::config::{parse_config, PlannerConfig};
use clearance_motion::error::{ConfigError, Error};

const MOTION: &str = r#"
[motion]
positive_jerk = 2000.0
negative_jerk = -1500.0
max_acceleration = 500.0
max_deceleration = -400.0
"#;

/// Test parsing motion limits and planner defaults.
#[test]
fn test_parse_motion_and_defaults() {
    let toml_str = format!("{MOTION}\n[planner]\ncap_velocity = 800.0\n");

    let config: PlannerConfig = toml::from_str(&toml_str).expect("Failed to parse TOML");

    assert_eq!(config.motion.positive_jerk(), 2000.0);
    assert_eq!(config.motion.negative_jerk(), -1500.0);
    assert_eq!(config.motion.max_acceleration(), 500.0);
    assert_eq!(config.motion.max_deceleration(), -400.0);

    let tuning = config.planner.tuning();
    assert_eq!(tuning.velocity_decrement, 5.0);
    assert_eq!(tuning.distance_decrement, 10.0);
    assert_eq!(tuning.max_repair_iterations, 10_000);
    assert!(tuning.close_high_tight_gaps);
}

/// Test parsing explicit tuning keys.
#[test]
fn test_parse_tuning_overrides() {
    let toml_str = format!(
        "{MOTION}\n[planner]\ncap_velocity = 600.0\nvelocity_decrement = 2.5\n\
         distance_decrement = 4.0\nmax_repair_iterations = 50\nclose_high_tight_gaps = false\n"
    );

    let config = parse_config(&toml_str).expect("Failed to parse config");
    let tuning = config.planner.tuning();

    assert_eq!(config.planner.cap_velocity, 600.0);
    assert_eq!(tuning.velocity_decrement, 2.5);
    assert_eq!(tuning.distance_decrement, 4.0);
    assert_eq!(tuning.max_repair_iterations, 50);
    assert!(!tuning.close_high_tight_gaps);
}

/// Test parsing a path of segments.
#[test]
fn test_parse_segments() {
    let toml_str = format!(
        r#"{MOTION}
[planner]
cap_velocity = 800.0

[[segments]]
id = 10
length = 1000.0
max_velocity = 800.0
start_node = 1
end_node = 2

[[segments]]
id = 11
length = 250.0
max_velocity = 120.0
start_node = 2
end_node = 3
"#
    );

    let config = parse_config(&toml_str).expect("Failed to parse config");
    let ids: Vec<u32> = config.segment_ids().collect();

    assert_eq!(ids, [10, 11]);
    let second = config.segment(11).expect("Segment not found");
    assert_eq!(second.length, 250.0);
    assert_eq!(second.start_node, 2);
    assert_eq!(second.end_node, 3);
    assert_eq!(config.path_length(), 1250.0);
}

/// Test that motion limits with the wrong sign are rejected during parsing.
#[test]
fn test_invalid_jerk_rejected() {
    let toml_str = r#"
[motion]
positive_jerk = -2000.0
negative_jerk = -2000.0
max_acceleration = 500.0
max_deceleration = -500.0

[planner]
cap_velocity = 800.0
"#;

    let result = parse_config(toml_str);
    match result {
        Err(Error::Config(ConfigError::ParseError(msg))) => {
            assert!(msg.contains("positive jerk"), "unexpected message: {}", msg);
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

/// Test that a missing `[planner]` table is a parse error.
#[test]
fn test_missing_planner_rejected() {
    let result = parse_config(MOTION);
    assert!(matches!(result, Err(Error::Config(ConfigError::ParseError(_)))));
}
