//! Tests for configuration file loading.

use super::*;
use serial_test::serial;
use std::env;
use std::fs;

#[test]
fn default_config_path_contains_topoview_config_toml() {
    let Some(path) = default_config_path() else {
        return;
    };
    let path_str = path.to_string_lossy();
    assert!(
        path_str.contains("topoview") && path_str.ends_with("config.toml"),
        "Path should contain 'topoview' and end with 'config.toml', got: {}",
        path_str
    );
}

#[test]
fn default_log_path_ends_with_topoview_log() {
    let path = default_log_path();
    assert!(
        path.to_string_lossy().ends_with("topoview.log"),
        "Default log path should end with 'topoview.log', got: {:?}",
        path
    );
}

#[test]
fn load_config_file_returns_ok_none_for_missing_file() {
    let result = load_config_file("/nonexistent/path/to/config.toml");
    assert_eq!(
        result,
        Ok(None),
        "Missing config file should return Ok(None), not an error"
    );
}

#[test]
fn load_config_file_parses_all_sections() {
    let config_path = env::temp_dir().join("topoview_test_config.toml");

    let toml_content = r#"
show_root = false
expand_depth = 3
transition_ms = 150
log_file_path = "/tmp/topoview-test.log"

[font]
height = 14.0
start_code = 65
default_width = 6.0
widths = [7.0, 8.0]

[camera]
duration_ms = 300
tick_ms = 16
easing = "ease-out-cubic"
autopan_margin = 12.0

[minimap]
divisor = 4.0
min_box = 80.0
margin = 8.0

[layout]
padding = 12.0
max_row_width = 900.0

[terminal]
cell_width = 6.0
cell_height = 12.0
"#;

    fs::write(&config_path, toml_content).expect("Failed to write test config");
    let result = load_config_file(&config_path);
    fs::remove_file(&config_path).ok();

    let config = result.unwrap().expect("existing file should load");
    assert_eq!(config.show_root, Some(false));
    assert_eq!(config.expand_depth, Some(3));
    assert_eq!(config.transition_ms, Some(150));
    assert_eq!(
        config.font.as_ref().and_then(|f| f.widths.clone()),
        Some(vec![7.0, 8.0])
    );
    assert_eq!(
        config.camera.as_ref().and_then(|c| c.easing),
        Some(Easing::EaseOutCubic)
    );
    assert_eq!(config.minimap.as_ref().and_then(|m| m.min_box), Some(80.0));
    assert_eq!(config.layout.as_ref().and_then(|l| l.logo_size), None);
    assert_eq!(
        config.terminal.as_ref().and_then(|t| t.cell_height),
        Some(12.0)
    );
}

#[test]
fn load_config_file_returns_error_for_invalid_toml() {
    let config_path = env::temp_dir().join("topoview_test_invalid.toml");
    fs::write(&config_path, "this is not valid TOML ][}{").expect("Failed to write config");

    let result = load_config_file(&config_path);
    fs::remove_file(&config_path).ok();

    match result {
        Err(ConfigError::ParseError { path, reason: _ }) => assert_eq!(path, config_path),
        other => panic!("Expected ParseError, got {:?}", other),
    }
}

#[test]
fn config_file_rejects_unknown_fields() {
    let result: Result<ConfigFile, _> = toml::from_str("theme = \"dark\"");
    assert!(result.is_err(), "Unknown top-level keys must be rejected");

    let result: Result<ConfigFile, _> = toml::from_str("[camera]\nspeed = 3");
    assert!(result.is_err(), "Unknown section keys must be rejected");
}

#[test]
fn config_file_rejects_unknown_easing() {
    let result: Result<ConfigFile, _> = toml::from_str("[camera]\neasing = \"bounce\"");
    assert!(result.is_err());
}

#[test]
fn merge_config_uses_defaults_when_none() {
    assert_eq!(merge_config(None), ResolvedConfig::default());
}

#[test]
fn merge_config_overrides_only_given_fields() {
    let config_file = ConfigFile {
        show_root: Some(false),
        camera: Some(CameraSection {
            duration_ms: Some(500),
            ..CameraSection::default()
        }),
        minimap: Some(MinimapSection {
            margin: Some(4.0),
            ..MinimapSection::default()
        }),
        font: Some(FontSection {
            height: Some(20.0),
            ..FontSection::default()
        }),
        ..ConfigFile::default()
    };

    let resolved = merge_config(Some(config_file));
    let defaults = ResolvedConfig::default();

    assert!(!resolved.layout.show_root);
    assert_eq!(resolved.camera.duration, Duration::from_millis(500));
    assert_eq!(resolved.camera.tick, defaults.camera.tick);
    assert_eq!(resolved.camera.easing, defaults.camera.easing);
    assert_eq!(resolved.minimap.margin, 4.0);
    assert_eq!(resolved.minimap.min_box, defaults.minimap.min_box);
    assert_eq!(resolved.font.height, 20.0);
    assert_eq!(resolved.font.widths, defaults.font.widths);
    assert_eq!(resolved.log_file_path, defaults.log_file_path);
}

#[test]
fn merge_config_replaces_degenerate_geometry_with_defaults() {
    let config_file: ConfigFile = toml::from_str(
        r#"
        [minimap]
        divisor = 0.0
        min_box = -10.0
        margin = 6.0

        [layout]
        max_row_width = -1.0
        padding = -2.0

        [terminal]
        cell_width = 0.0
        cell_height = nan

        [font]
        height = 0.0

        [camera]
        tick_ms = 0
        "#,
    )
    .unwrap();

    let resolved = merge_config(Some(config_file));
    let defaults = ResolvedConfig::default();

    assert_eq!(resolved.minimap.divisor, defaults.minimap.divisor);
    assert_eq!(resolved.minimap.min_box, defaults.minimap.min_box);
    assert_eq!(resolved.minimap.margin, 6.0);
    assert_eq!(resolved.layout.max_row_width, defaults.layout.max_row_width);
    assert_eq!(resolved.layout.padding, defaults.layout.padding);
    assert_eq!(resolved.cell, defaults.cell);
    assert_eq!(resolved.font.height, defaults.font.height);
    assert_eq!(resolved.camera.tick, defaults.camera.tick);
}

#[test]
fn merged_minimap_config_gives_finite_geometry() {
    let config_file = ConfigFile {
        minimap: Some(MinimapSection {
            divisor: Some(0.0),
            ..MinimapSection::default()
        }),
        ..ConfigFile::default()
    };
    let resolved = merge_config(Some(config_file));

    let frame = crate::view_state::MinimapFrame::compute(
        crate::model::Size::new(400.0, 300.0),
        crate::model::Size::new(1000.0, 500.0),
        crate::model::Point::ZERO,
        &resolved.minimap,
    );
    assert!(frame.scale.is_finite());
    assert!(frame.origin.x.is_finite() && frame.origin.y.is_finite());
    assert!(!frame.contains(crate::model::Point::new(10.0, 10.0)));
}

#[test]
fn config_file_log_path_overrides_default() {
    let custom_path = PathBuf::from("/custom/path/to/app.log");
    let resolved = merge_config(Some(ConfigFile {
        log_file_path: Some(custom_path.clone()),
        ..ConfigFile::default()
    }));
    assert_eq!(resolved.log_file_path, custom_path);
}

#[test]
fn view_options_carry_resolved_values() {
    let mut config = ResolvedConfig::default();
    config.expand_depth = 0;
    config.camera.easing = Easing::Linear;
    config.transition = Duration::from_millis(50);

    let options = config.view_options();
    assert_eq!(options.camera.easing, Easing::Linear);
    assert_eq!(options.transition, Duration::from_millis(50));
    assert_eq!(options.font, Some(config.font.clone()));
}

/// RAII guard to ensure environment variable cleanup even under test parallelism.
struct EnvGuard(&'static str);

impl EnvGuard {
    fn new(name: &'static str) -> Self {
        env::remove_var(name);
        EnvGuard(name)
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        env::remove_var(self.0);
    }
}

#[test]
#[serial(topoview_env)]
fn apply_env_overrides_respects_easing() {
    let _guard = EnvGuard::new("TOPOVIEW_EASING");
    env::set_var("TOPOVIEW_EASING", "Linear");

    let result = apply_env_overrides(ResolvedConfig::default());
    assert_eq!(result.camera.easing, Easing::Linear);
}

#[test]
#[serial(topoview_env)]
fn apply_env_overrides_ignores_unknown_easing() {
    let _guard = EnvGuard::new("TOPOVIEW_EASING");
    env::set_var("TOPOVIEW_EASING", "bounce");

    let base = ResolvedConfig::default();
    assert_eq!(apply_env_overrides(base.clone()), base);
}

#[test]
#[serial(topoview_env)]
fn apply_env_overrides_respects_show_root() {
    let _guard = EnvGuard::new("TOPOVIEW_SHOW_ROOT");
    for (value, expected) in [("0", false), ("no", false), ("TRUE", true), ("on", true)] {
        env::set_var("TOPOVIEW_SHOW_ROOT", value);
        let result = apply_env_overrides(ResolvedConfig::default());
        assert_eq!(result.layout.show_root, expected, "value {value:?}");
    }
}

#[test]
#[serial(topoview_env)]
fn apply_env_overrides_no_change_when_env_var_not_set() {
    let _easing = EnvGuard::new("TOPOVIEW_EASING");
    let _root = EnvGuard::new("TOPOVIEW_SHOW_ROOT");

    let base = ResolvedConfig::default();
    assert_eq!(apply_env_overrides(base.clone()), base);
}

#[test]
#[serial(topoview_config)]
fn load_config_with_precedence_prefers_explicit_path() {
    env::remove_var("TOPOVIEW_CONFIG");

    let temp_dir = env::temp_dir();
    let explicit_path = temp_dir.join("topoview_explicit.toml");
    fs::write(&explicit_path, "expand_depth = 4").expect("Failed to write explicit config");

    let env_path = temp_dir.join("topoview_env.toml");
    fs::write(&env_path, "expand_depth = 9").expect("Failed to write env config");
    env::set_var("TOPOVIEW_CONFIG", env_path.to_str().unwrap());

    let result = load_config_with_precedence(Some(explicit_path.clone()));

    fs::remove_file(explicit_path).ok();
    fs::remove_file(env_path).ok();
    env::remove_var("TOPOVIEW_CONFIG");

    assert_eq!(
        result.unwrap().unwrap().expand_depth,
        Some(4),
        "Should use explicit path, not TOPOVIEW_CONFIG env var"
    );
}

#[test]
#[serial(topoview_config)]
fn load_config_with_precedence_uses_env_var_when_no_explicit_path() {
    env::remove_var("TOPOVIEW_CONFIG");

    let env_path = env::temp_dir().join("topoview_env_only.toml");
    fs::write(&env_path, "expand_depth = 2").expect("Failed to write env config");
    env::set_var("TOPOVIEW_CONFIG", env_path.to_str().unwrap());

    let result = load_config_with_precedence(None);

    fs::remove_file(env_path).ok();
    env::remove_var("TOPOVIEW_CONFIG");

    assert_eq!(result.unwrap().unwrap().expand_depth, Some(2));
}

#[test]
fn apply_cli_overrides_wins_over_everything() {
    let base = apply_cli_overrides(ResolvedConfig::default(), None, None);
    assert_eq!(base, ResolvedConfig::default());

    let overridden = apply_cli_overrides(
        ResolvedConfig::default(),
        Some(false),
        Some(Easing::EaseOutCubic),
    );
    assert!(!overridden.layout.show_root);
    assert_eq!(overridden.camera.easing, Easing::EaseOutCubic);
}

#[test]
#[serial(topoview_env)]
fn precedence_chain_full_defaults_to_cli() {
    let _guard = EnvGuard::new("TOPOVIEW_EASING");

    let file = ConfigFile {
        camera: Some(CameraSection {
            easing: Some(Easing::Linear),
            ..CameraSection::default()
        }),
        show_root: Some(false),
        ..ConfigFile::default()
    };
    let merged = merge_config(Some(file));
    assert_eq!(merged.camera.easing, Easing::Linear);

    env::set_var("TOPOVIEW_EASING", "ease-out-cubic");
    let with_env = apply_env_overrides(merged);
    assert_eq!(with_env.camera.easing, Easing::EaseOutCubic);

    let resolved = apply_cli_overrides(with_env, Some(true), Some(Easing::EaseInOut));
    assert_eq!(resolved.camera.easing, Easing::EaseInOut);
    assert!(resolved.layout.show_root);
}
