//! Layout backends.
//!
//! A backend turns a serialized DOT description into an image file. The default
//! [`GraphvizBackend`] runs the Graphviz `dot` executable; other implementations of
//! [`LayoutBackend`] can be plugged into a diagram with
//! [`Diagram::with_backend`](crate::Diagram::with_backend).

use std::{fmt, path::Path, process::Command};

use log::debug;

use archigraph_core::format::OutputFormat;

use crate::error::RenderError;

/// Everything a backend needs for one render.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    description: &'a str,
    description_path: &'a Path,
    format: OutputFormat,
    output: &'a Path,
}

impl<'a> RenderRequest<'a> {
    pub(crate) fn new(
        description: &'a str,
        description_path: &'a Path,
        format: OutputFormat,
        output: &'a Path,
    ) -> Self {
        Self {
            description,
            description_path,
            format,
            output,
        }
    }

    /// Returns the DOT description.
    pub fn description(&self) -> &'a str {
        self.description
    }

    /// Returns the temporary file holding the DOT description.
    ///
    /// The file only exists for the duration of the render call.
    pub fn description_path(&self) -> &'a Path {
        self.description_path
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Returns the path the artifact must be written to.
    pub fn output(&self) -> &'a Path {
        self.output
    }
}

/// Produces an image from a DOT description.
pub trait LayoutBackend: fmt::Debug {
    /// Renders `request`, writing the artifact to [`RenderRequest::output`].
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if the backend is unavailable or fails.
    fn render(&self, request: &RenderRequest<'_>) -> Result<(), RenderError>;
}

/// Backend running a Graphviz executable (`dot` by default).
///
/// Invokes `<executable> -T<format> -o <output> <description>` and waits for it to
/// exit.
#[derive(Debug, Clone)]
pub struct GraphvizBackend {
    executable: String,
}

impl GraphvizBackend {
    /// Creates a backend running `executable`.
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }
}

impl Default for GraphvizBackend {
    fn default() -> Self {
        Self::new("dot")
    }
}

impl LayoutBackend for GraphvizBackend {
    fn render(&self, request: &RenderRequest<'_>) -> Result<(), RenderError> {
        debug!(
            executable = self.executable.as_str(),
            format = request.format().extension(),
            output = request.output().display().to_string();
            "Invoking layout backend"
        );

        let output = Command::new(&self.executable)
            .arg(format!("-T{}", request.format().extension()))
            .arg("-o")
            .arg(request.output())
            .arg(request.description_path())
            .output()
            .map_err(|source| RenderError::BackendMissing {
                executable: self.executable.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(RenderError::BackendFailed {
                executable: self.executable.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}
