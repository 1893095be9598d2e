//! Configuration types for archigraph rendering.
//!
//! This module provides configuration structures that control where diagrams are
//! written, which layout backend renders them and how they look. All types implement
//! [`serde::Deserialize`] with every field defaulted, so a configuration file only
//! needs to mention what it changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining render and theme settings.
//! - [`RenderConfig`] - Backend executable, output directory and per-diagram defaults.
//! - [`ThemeConfig`] - Default DOT attributes for graphs, nodes, edges and clusters.
//! - [`load_config`] - Finds and loads a TOML configuration file.
//!
//! # Example
//!
//! ```
//! # use archigraph::config::AppConfig;
//! let config = AppConfig::from_toml_str(r#"
//!     [render]
//!     format = "svg"
//!     output_dir = "target/diagrams"
//! "#).unwrap();
//! assert_eq!(config.render().format().extension(), "svg");
//! assert_eq!(config.render().executable(), "dot");
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use indexmap::IndexMap;
use log::{debug, info};
use serde::Deserialize;

use archigraph_core::{
    color::Color,
    format::{CurveStyle, Direction, OutputFormat},
};

use crate::error::ConfigurationError;

/// Ordered table of DOT attributes.
pub type Attributes = IndexMap<String, String>;

/// Top-level configuration combining render and theme settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Render configuration section.
    #[serde(default)]
    render: RenderConfig,

    /// Theme configuration section.
    #[serde(default)]
    theme: ThemeConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(render: RenderConfig, theme: ThemeConfig) -> Self {
        Self { render, theme }
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Parse`] if the text is not valid TOML or does not
    /// match the configuration schema.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigurationError> {
        toml::from_str(content).map_err(|err| ConfigurationError::Parse {
            path: PathBuf::from("<inline>"),
            reason: err.to_string(),
        })
    }

    /// Returns the render configuration.
    pub fn render(&self) -> &RenderConfig {
        &self.render
    }

    /// Returns the theme configuration.
    pub fn theme(&self) -> &ThemeConfig {
        &self.theme
    }

    /// Returns the render configuration for modification.
    pub fn render_mut(&mut self) -> &mut RenderConfig {
        &mut self.render
    }
}

/// Backend and output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Layout backend executable, looked up on `PATH` when not absolute.
    executable: String,

    /// Directory the rendered artifacts are written to.
    output_dir: PathBuf,

    /// Output format used when a diagram does not choose one.
    format: OutputFormat,

    /// Direction used when a diagram does not choose one.
    direction: Direction,

    /// Curve style used when a diagram does not choose one.
    curve_style: CurveStyle,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            executable: "dot".to_string(),
            output_dir: PathBuf::from("."),
            format: OutputFormat::default(),
            direction: Direction::default(),
            curve_style: CurveStyle::default(),
        }
    }
}

impl RenderConfig {
    pub fn executable(&self) -> &str {
        &self.executable
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn curve_style(&self) -> CurveStyle {
        self.curve_style
    }

    /// Sets the layout backend executable.
    pub fn set_executable(&mut self, executable: impl Into<String>) {
        self.executable = executable.into();
    }

    /// Sets the output directory.
    pub fn set_output_dir(&mut self, output_dir: impl Into<PathBuf>) {
        self.output_dir = output_dir.into();
    }
}

/// Default DOT attributes applied by the renderer.
///
/// Attributes set by a caller on a cluster or carried by an edge style override
/// these defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    graph: Attributes,
    node: Attributes,
    edge: Attributes,
    cluster: Attributes,

    /// Cluster background colors, picked by nesting depth.
    cluster_palette: Vec<String>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            graph: attributes(&[
                ("pad", "2.0"),
                ("nodesep", "0.60"),
                ("ranksep", "0.75"),
                ("fontname", "Sans-Serif"),
                ("fontsize", "15"),
                ("fontcolor", "#2D3436"),
            ]),
            node: attributes(&[
                ("shape", "box"),
                ("style", "rounded"),
                ("fixedsize", "true"),
                ("width", "1.4"),
                ("height", "1.4"),
                ("labelloc", "b"),
                ("imagescale", "true"),
                ("fontname", "Sans-Serif"),
                ("fontsize", "13"),
                ("fontcolor", "#2D3436"),
            ]),
            edge: attributes(&[("color", "#7B8894")]),
            cluster: attributes(&[
                ("shape", "box"),
                ("style", "rounded"),
                ("labeljust", "l"),
                ("pencolor", "#AEB6BE"),
                ("fontname", "Sans-Serif"),
                ("fontsize", "12"),
            ]),
            cluster_palette: ["#E5F5FD", "#EBF3E7", "#ECE8F6", "#FDF7E3"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl ThemeConfig {
    pub fn graph(&self) -> &Attributes {
        &self.graph
    }

    pub fn node(&self) -> &Attributes {
        &self.node
    }

    pub fn edge(&self) -> &Attributes {
        &self.edge
    }

    pub fn cluster(&self) -> &Attributes {
        &self.cluster
    }

    /// Returns the validated cluster palette.
    ///
    /// # Errors
    ///
    /// Returns an error for the first palette entry that is not a valid color.
    pub fn cluster_palette(&self) -> Result<Vec<Color>, ConfigurationError> {
        self.cluster_palette
            .iter()
            .map(|color| Color::new(color).map_err(ConfigurationError::from))
            .collect()
    }
}

fn attributes(pairs: &[(&str, &str)]) -> Attributes {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (archigraph/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be read or parsed
pub fn load_config(
    explicit_path: Option<impl AsRef<Path>>,
) -> Result<AppConfig, ConfigurationError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("archigraph/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "archigraph", "archigraph") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(
                path = system_config.display().to_string();
                "Loading configuration from system path"
            );
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, ConfigurationError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigurationError::MissingFile(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|err| ConfigurationError::Parse {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.render().executable(), "dot");
        assert_eq!(config.render().format(), OutputFormat::Png);
        assert_eq!(config.render().direction(), Direction::LeftRight);
        assert_eq!(config.theme().edge().get("color").map(String::as_str), Some("#7B8894"));
        assert_eq!(config.theme().cluster_palette().unwrap().len(), 4);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [render]
            direction = "TB"

            [theme.edge]
            color = "black"
            "#,
        )
        .unwrap();

        assert_eq!(config.render().direction(), Direction::TopBottom);
        assert_eq!(config.render().format(), OutputFormat::Png);
        assert_eq!(config.theme().edge().get("color").map(String::as_str), Some("black"));
        // Sections that were not mentioned keep their defaults entirely
        assert!(config.theme().node().contains_key("fixedsize"));
    }

    #[test]
    fn test_unsupported_format_in_toml() {
        let result = AppConfig::from_toml_str("[render]\nformat = \"gif\"\n");
        assert!(matches!(result, Err(ConfigurationError::Parse { .. })));
    }

    #[test]
    fn test_invalid_palette_color() {
        let config =
            AppConfig::from_toml_str("[theme]\ncluster_palette = [\"#E5F5FD\", \"bogus\"]\n")
                .unwrap();
        assert!(matches!(
            config.theme().cluster_palette(),
            Err(ConfigurationError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_load_explicit_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[render]\nexecutable = \"/opt/graphviz/bin/dot\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.render().executable(), "/opt/graphviz/bin/dot");
    }

    #[test]
    fn test_load_missing_explicit_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let result = load_config(Some(&path));
        assert!(matches!(result, Err(ConfigurationError::MissingFile(p)) if p == path));
    }
}
