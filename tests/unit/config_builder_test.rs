//! Unit tests for the configuration builder
//!
//! Tests cover:
//! - Unit conversion of angles, speckle size and color precision
//! - Presets and pass-through of out-of-range values
//! - The flat wire form

use std::f64::consts::PI;

use svgtrace::conversion::{
    build_config, deg2rad, ClusteringMode, ControlValues, ConversionConfig, Hierarchy, PathMode,
    Preset, SurfaceIds,
};
use svgtrace::error::ConversionErrorKind;

#[cfg(test)]
mod config_builder_tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn build(controls: ControlValues) -> ConversionConfig {
        build_config(&controls, &SurfaceIds::default())
    }

    #[test]
    fn test_deg2rad_endpoints() {
        assert_eq!(deg2rad(0.0), 0.0);
        assert!((deg2rad(180.0) - PI).abs() < 1e-12);
        assert!((deg2rad(90.0) - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_default_controls() {
        let config = build(ControlValues::default());

        assert_eq!(config.mode(), PathMode::Spline);
        assert_eq!(config.clustering_mode(), ClusteringMode::Color);
        assert_eq!(config.hierarchical(), Hierarchy::Stacked);
        assert_eq!(config.filter_speckle(), 16);
        assert_eq!(config.color_precision(), 2);
        assert_eq!(config.layer_difference(), 16);
        assert_eq!(config.path_precision(), 8);
        assert_eq!(config.max_iterations(), 10);
        assert!((config.corner_threshold() - deg2rad(60.0)).abs() < 1e-12);
        assert!((config.splice_threshold() - deg2rad(45.0)).abs() < 1e-12);
        assert_eq!(config.length_threshold(), 4.0);
    }

    #[test]
    fn test_speckle_is_squared() {
        for (ui, engine) in [(0, 0), (1, 1), (4, 16), (10, 100), (16, 256)] {
            let config = build(ControlValues::default().with_filter_speckle(ui));
            assert_eq!(config.filter_speckle(), engine, "speckle {}", ui);
        }
    }

    #[test]
    fn test_color_precision_is_inverted() {
        assert_eq!(
            build(ControlValues::default().with_color_precision(6)).color_precision(),
            2
        );
        assert_eq!(
            build(ControlValues::default().with_color_precision(8)).color_precision(),
            0
        );
        assert_eq!(
            build(ControlValues::default().with_color_precision(1)).color_precision(),
            7
        );
    }

    #[test]
    fn test_out_of_range_values_pass_through() {
        let controls = ControlValues::default()
            .with_color_precision(12)
            .with_corner_threshold(400);
        assert!(controls.validate().is_err());

        let config = build(controls);
        assert_eq!(config.color_precision(), -4);
        assert!((config.corner_threshold() - deg2rad(400.0)).abs() < 1e-12);
    }

    #[test]
    fn test_photo_preset() {
        let config = build(ControlValues::from_preset(Preset::Photo));
        assert_eq!(config.filter_speckle(), 100);
        assert_eq!(config.color_precision(), 0);
        assert_eq!(config.layer_difference(), 48);
        assert!((config.corner_threshold() - PI).abs() < 1e-12);
    }

    #[test]
    fn test_bw_preset_is_binary() {
        let controls = ControlValues::from_preset(Preset::Bw);
        assert_eq!(controls.clustering_mode, ClusteringMode::Binary);
        assert!(controls.validate().is_ok());
    }

    #[test]
    fn test_surface_ids_are_carried() {
        let config = build_config(
            &ControlValues::default(),
            &SurfaceIds::new("canvas-2", "svg-2"),
        );
        assert_eq!(config.canvas_id(), "canvas-2");
        assert_eq!(config.svg_id(), "svg-2");
    }

    #[test]
    fn test_wire_form_is_flat_and_lowercase() {
        let config = build(
            ControlValues::default()
                .with_clustering_mode(ClusteringMode::Binary)
                .with_hierarchy(Hierarchy::Cutout),
        );
        let wire: serde_json::Value = serde_json::from_str(&config.to_wire().unwrap()).unwrap();

        assert_eq!(wire["clustering_mode"], "binary");
        assert_eq!(wire["hierarchical"], "cutout");
        assert_eq!(wire["mode"], "spline");
        assert_eq!(wire["filter_speckle"], 16);
        assert_eq!(wire["canvas_id"], "frame");

        let parsed = ConversionConfig::from_wire(&config.to_wire().unwrap()).unwrap();
        assert_eq!(parsed.clustering_mode(), ClusteringMode::Binary);
        assert_eq!(parsed.hierarchical(), Hierarchy::Cutout);
        assert_eq!(parsed.filter_speckle(), config.filter_speckle());
        assert!((parsed.corner_threshold() - config.corner_threshold()).abs() < 1e-12);
    }

    #[test]
    fn test_malformed_wire_is_configuration_error() {
        let err = ConversionConfig::from_wire(r#"{"mode": "bezier"}"#).unwrap_err();
        assert_matches!(err.kind(), Some(ConversionErrorKind::Configuration { .. }));
    }
}
