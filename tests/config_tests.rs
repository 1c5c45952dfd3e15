// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use package_dimensions::Config;
use package_dimensions::config::RoiSize;

#[test]
fn test_config_default() {
    // Test that default config can be created and is usable
    let config = Config::default();
    assert!(config.validate().is_ok(), "Default config should validate");

    assert_eq!(
        config.roi,
        RoiSize {
            width: 512,
            height: 424
        },
        "Default region of interest should cover the whole depth grid"
    );
}

#[test]
fn test_config_default_thresholds() {
    let config = Config::default();
    let t = config.thresholds;
    assert_eq!((t.min_depth_mm, t.max_depth_mm), (500, 4000));
    assert_eq!(t.noise_floor_mm, 100);
    assert_eq!(t.edge_density, 10);
    assert_eq!(t.height_outlier_count, 4);
}

#[test]
fn test_config_default_path() {
    let path = Config::default_path();
    assert!(path.ends_with("package-dimensions/config.json"));
}

#[test]
fn test_config_json_round_trip() {
    let mut config = Config::default();
    config.optics.horizontal_fov_deg = 84.1;
    config.thresholds.edge_density = 20;

    let json = serde_json::to_string(&config).expect("serialize");
    let parsed: Config = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(parsed, config);
}
