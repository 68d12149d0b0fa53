//! Configuration file loading with precedence handling.

use crate::controller::ViewOptions;
use crate::layout::{DepthExpandPolicy, FontSpec, LayoutParams};
use crate::scene::DEFAULT_TRANSITION;
use crate::view::CellMetrics;
use crate::view_state::{CameraConfig, Easing, MinimapConfig};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/topoview/config.toml`:
///
/// ```toml
/// show_root = false
/// expand_depth = 2
///
/// [camera]
/// duration_ms = 300
/// easing = "ease-out-cubic"
///
/// [minimap]
/// min_box = 120.0
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Whether the root node is rendered.
    #[serde(default)]
    pub show_root: Option<bool>,

    /// Nodes shallower than this start expanded.
    #[serde(default)]
    pub expand_depth: Option<usize>,

    /// Length of attribute transitions in milliseconds.
    #[serde(default)]
    pub transition_ms: Option<u64>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Header font metrics.
    #[serde(default)]
    pub font: Option<FontSection>,

    /// Camera tuning.
    #[serde(default)]
    pub camera: Option<CameraSection>,

    /// Minimap tuning.
    #[serde(default)]
    pub minimap: Option<MinimapSection>,

    /// Arrangement geometry.
    #[serde(default)]
    pub layout: Option<LayoutSection>,

    /// Terminal rasterisation.
    #[serde(default)]
    pub terminal: Option<TerminalSection>,
}

/// `[font]` section.
///
/// ```toml
/// [font]
/// height = 14.0
/// start_code = 32
/// default_width = 7.0
/// widths = [3.3, 3.3, 4.3]
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FontSection {
    /// Line height in pixels.
    #[serde(default)]
    pub height: Option<f64>,
    /// Character code of the first table entry.
    #[serde(default)]
    pub start_code: Option<u32>,
    /// Width of characters outside the table.
    #[serde(default)]
    pub default_width: Option<f64>,
    /// Per-character widths.
    #[serde(default)]
    pub widths: Option<Vec<f64>>,
}

/// `[camera]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CameraSection {
    /// Length of an animated pan in milliseconds.
    #[serde(default)]
    pub duration_ms: Option<u64>,
    /// Animation tick interval in milliseconds.
    #[serde(default)]
    pub tick_ms: Option<u64>,
    /// Pan easing curve.
    #[serde(default)]
    pub easing: Option<Easing>,
    /// Minimum gap between an auto-panned node and the viewport edge.
    #[serde(default)]
    pub autopan_margin: Option<f64>,
}

/// `[minimap]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MinimapSection {
    /// Viewport-to-box divisor.
    #[serde(default)]
    pub divisor: Option<f64>,
    /// Minimum box side.
    #[serde(default)]
    pub min_box: Option<f64>,
    /// Gap to the bottom-right corner.
    #[serde(default)]
    pub margin: Option<f64>,
}

/// `[layout]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LayoutSection {
    /// Gap around and between child boxes.
    #[serde(default)]
    pub padding: Option<f64>,
    /// Gap around header elements.
    #[serde(default)]
    pub header_padding: Option<f64>,
    /// Side of the kind logo and expander.
    #[serde(default)]
    pub logo_size: Option<f64>,
    /// Row width at which children wrap.
    #[serde(default)]
    pub max_row_width: Option<f64>,
}

/// `[terminal]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TerminalSection {
    /// World pixels per terminal column.
    #[serde(default)]
    pub cell_width: Option<f64>,
    /// World pixels per terminal row.
    #[serde(default)]
    pub cell_height: Option<f64>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Header font metrics.
    pub font: FontSpec,
    /// Arrangement geometry, including root visibility.
    pub layout: LayoutParams,
    /// Camera tuning.
    pub camera: CameraConfig,
    /// Minimap tuning.
    pub minimap: MinimapConfig,
    /// Nodes shallower than this start expanded.
    pub expand_depth: usize,
    /// Length of attribute transitions.
    pub transition: Duration,
    /// Terminal cell size in world pixels.
    pub cell: CellMetrics,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            font: FontSpec::default(),
            layout: LayoutParams::default(),
            camera: CameraConfig::default(),
            minimap: MinimapConfig::default(),
            expand_depth: DepthExpandPolicy::default().max_depth,
            transition: DEFAULT_TRANSITION,
            cell: CellMetrics::default(),
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Controller options for this configuration.
    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            font: Some(self.font.clone()),
            params: self.layout.clone(),
            camera: self.camera,
            minimap: self.minimap,
            transition: self.transition,
            policy: Box::new(DepthExpandPolicy {
                max_depth: self.expand_depth,
            }),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/topoview/topoview.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("topoview").join("topoview.log")
    } else {
        PathBuf::from("topoview.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/topoview/config.toml` on Unix, appropriate path on other
/// platforms. Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("topoview").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `TOPOVIEW_CONFIG` environment variable
/// 3. Default path `~/.config/topoview/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var("TOPOVIEW_CONFIG") {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// `value` when it is finite and strictly positive, else `fallback` with a warning.
fn positive(field: &str, value: Option<f64>, fallback: f64) -> f64 {
    checked(field, value, fallback, |v| v > 0.0, "positive")
}

/// `value` when it is finite and not negative, else `fallback` with a warning.
fn non_negative(field: &str, value: Option<f64>, fallback: f64) -> f64 {
    checked(field, value, fallback, |v| v >= 0.0, "non-negative")
}

fn checked(
    field: &str,
    value: Option<f64>,
    fallback: f64,
    valid: impl Fn(f64) -> bool,
    expected: &str,
) -> f64 {
    match value {
        None => fallback,
        Some(v) if v.is_finite() && valid(v) => v,
        Some(v) => {
            warn!(field, value = v, fallback, "ignoring config value: must be {expected}");
            fallback
        }
    }
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
/// Geometry values out of range (zero or negative sizes, divisors, cell
/// metrics) are logged and replaced by the default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let mut resolved = ResolvedConfig::default();

    let Some(config) = config_file else {
        return resolved;
    };

    if let Some(show_root) = config.show_root {
        resolved.layout.show_root = show_root;
    }
    if let Some(depth) = config.expand_depth {
        resolved.expand_depth = depth;
    }
    if let Some(ms) = config.transition_ms {
        resolved.transition = Duration::from_millis(ms);
    }
    if let Some(path) = config.log_file_path {
        resolved.log_file_path = path;
    }

    if let Some(font) = config.font {
        let f = &mut resolved.font;
        f.height = positive("font.height", font.height, f.height);
        f.start_code = font.start_code.unwrap_or(f.start_code);
        f.default_width = non_negative("font.default_width", font.default_width, f.default_width);
        if let Some(widths) = font.widths {
            if widths.iter().all(|w| w.is_finite() && *w >= 0.0) {
                f.widths = widths;
            } else {
                warn!("ignoring font.widths: entries must be finite and non-negative");
            }
        }
    }

    if let Some(camera) = config.camera {
        let c = &mut resolved.camera;
        c.duration = camera.duration_ms.map(Duration::from_millis).unwrap_or(c.duration);
        match camera.tick_ms {
            Some(0) => warn!("ignoring camera.tick_ms = 0, keeping {:?}", c.tick),
            Some(ms) => c.tick = Duration::from_millis(ms),
            None => {}
        }
        c.easing = camera.easing.unwrap_or(c.easing);
        c.autopan_margin = non_negative("camera.autopan_margin", camera.autopan_margin, c.autopan_margin);
    }

    if let Some(minimap) = config.minimap {
        let m = &mut resolved.minimap;
        m.divisor = positive("minimap.divisor", minimap.divisor, m.divisor);
        m.min_box = positive("minimap.min_box", minimap.min_box, m.min_box);
        m.margin = non_negative("minimap.margin", minimap.margin, m.margin);
    }

    if let Some(layout) = config.layout {
        let l = &mut resolved.layout;
        l.padding = non_negative("layout.padding", layout.padding, l.padding);
        l.header_padding = non_negative("layout.header_padding", layout.header_padding, l.header_padding);
        l.logo_size = non_negative("layout.logo_size", layout.logo_size, l.logo_size);
        l.max_row_width = positive("layout.max_row_width", layout.max_row_width, l.max_row_width);
    }

    if let Some(terminal) = config.terminal {
        let t = &mut resolved.cell;
        t.cell_width = positive("terminal.cell_width", terminal.cell_width, t.cell_width);
        t.cell_height = positive("terminal.cell_height", terminal.cell_height, t.cell_height);
    }

    resolved
}

/// Parse a boolean environment value (`1/true/yes/on`, `0/false/no/off`).
fn parse_env_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `TOPOVIEW_EASING`: pan easing curve
/// - `TOPOVIEW_SHOW_ROOT`: root visibility
///
/// Unparseable values are logged and ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(easing) = std::env::var("TOPOVIEW_EASING") {
        match easing.parse::<Easing>() {
            Ok(easing) => config.camera.easing = easing,
            Err(err) => warn!(%err, "ignoring TOPOVIEW_EASING"),
        }
    }

    if let Ok(show_root) = std::env::var("TOPOVIEW_SHOW_ROOT") {
        match parse_env_bool(&show_root) {
            Some(show_root) => config.layout.show_root = show_root,
            None => warn!(value = %show_root, "ignoring TOPOVIEW_SHOW_ROOT"),
        }
    }

    config
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
///
/// # Arguments
///
/// * `config` - Base resolved config (already merged with defaults, file, and env vars)
/// * `show_root_override` - Root visibility from `--hide-root`
/// * `easing_override` - Easing from `--easing`
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    show_root_override: Option<bool>,
    easing_override: Option<Easing>,
) -> ResolvedConfig {
    if let Some(show_root) = show_root_override {
        config.layout.show_root = show_root;
    }

    if let Some(easing) = easing_override {
        config.camera.easing = easing;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
