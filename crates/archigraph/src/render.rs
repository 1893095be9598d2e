//! Rendering of a closed diagram.
//!
//! The renderer serializes the diagram to DOT ([`dot`] module), writes the
//! description to a temporary file, and hands it to a [`LayoutBackend`]. The
//! temporary file is removed when rendering returns, whether the backend succeeded
//! or not. The in-memory model is only read, never modified.

pub mod backend;
mod dot;

pub use backend::{GraphvizBackend, LayoutBackend, RenderRequest};

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, info};

use archigraph_core::format::OutputFormat;

use crate::{Diagram, error::RenderError};

/// File name used when a diagram has neither a name nor an explicit file name.
const DEFAULT_FILE_NAME: &str = "diagrams_image";

/// The artifact written by a successful render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    path: PathBuf,
    format: OutputFormat,
    show: bool,
}

impl RenderOutput {
    /// Returns the path of the written artifact.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Returns whether the caller asked for the artifact to be opened.
    ///
    /// Purely advisory: archigraph never opens files itself.
    pub fn show(&self) -> bool {
        self.show
    }
}

/// Returns the DOT description of `diagram`.
pub(crate) fn to_dot(diagram: &Diagram) -> String {
    dot::print(&dot::describe(diagram))
}

/// Renders `diagram` through its backend.
pub(crate) fn render(diagram: &Diagram) -> Result<RenderOutput, RenderError> {
    let output_dir = diagram.app_config().render().output_dir();
    let path = output_dir.join(output_file_name(
        diagram.name(),
        diagram.filename(),
        diagram.output_format(),
    ));

    fs::create_dir_all(output_dir).map_err(|source| RenderError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let description = to_dot(diagram);
    debug!(bytes = description.len(); "Diagram serialized");

    let mut description_file = tempfile::Builder::new()
        .prefix("archigraph-")
        .suffix(".gv")
        .tempfile()
        .map_err(|source| RenderError::Io {
            path: std::env::temp_dir(),
            source,
        })?;
    let description_path = description_file.path().to_path_buf();
    description_file
        .write_all(description.as_bytes())
        .map_err(|source| RenderError::Io {
            path: description_path.clone(),
            source,
        })?;
    description_file
        .flush()
        .map_err(|source| RenderError::Io {
            path: description_path.clone(),
            source,
        })?;

    let request = RenderRequest::new(
        &description,
        &description_path,
        diagram.output_format(),
        &path,
    );
    diagram.backend().render(&request)?;

    info!(output = path.display().to_string(); "Diagram rendered");
    Ok(RenderOutput {
        path,
        format: diagram.output_format(),
        show: diagram.show(),
    })
}

/// Returns the artifact file name for a diagram.
///
/// An explicit `filename` wins over the slugified `name`. The format's extension is
/// appended unless the base name already carries it.
pub(crate) fn output_file_name(
    name: &str,
    filename: Option<&str>,
    format: OutputFormat,
) -> String {
    let base = match filename.map(str::trim).filter(|f| !f.is_empty()) {
        Some(filename) => filename.to_string(),
        None => slugify(name),
    };
    let base = if base.is_empty() {
        DEFAULT_FILE_NAME.to_string()
    } else {
        base
    };

    let extension = format!(".{}", format.extension());
    if base.to_ascii_lowercase().ends_with(&extension) {
        base
    } else {
        format!("{base}{extension}")
    }
}

/// Lowercases `name` and joins its whitespace-separated words with underscores.
pub(crate) fn slugify(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}
