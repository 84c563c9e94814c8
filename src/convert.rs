//! External PDF-to-XML conversion boundary.
//!
//! The library does not read PDFs itself. It shells out to `pdftohtml`
//! (poppler) once per document and consumes the annotated XML tree it emits
//! on stdout. The invocation is a single opaque blocking step: it either
//! yields the full tree bytes or fails, and it is never retried.

use std::path::Path;
use std::process::Command;

use crate::error::{Error, Result};

/// Options controlling the external conversion invocation.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Converter binary name or path
    pub binary: String,

    /// Skip embedded images (`-i`)
    pub ignore_images: bool,

    /// Include hidden text layers (`-hidden`)
    pub hidden_text: bool,
}

impl ConvertOptions {
    /// Create new convert options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different converter binary.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Enable or disable image skipping.
    pub fn with_ignore_images(mut self, ignore: bool) -> Self {
        self.ignore_images = ignore;
        self
    }

    /// Enable or disable extraction of hidden text layers.
    pub fn with_hidden_text(mut self, hidden: bool) -> Self {
        self.hidden_text = hidden;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            binary: "pdftohtml".to_string(),
            ignore_images: true,
            hidden_text: true,
        }
    }
}

/// Convert a PDF file into annotated XML bytes.
///
/// Runs `<binary> -xml -stdout [-i] [-hidden] <path>` and captures stdout.
/// A missing binary or non-zero exit status is fatal for this input.
pub fn convert_pdf<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let mut cmd = Command::new(&options.binary);
    cmd.arg("-xml").arg("-stdout");
    if options.ignore_images {
        cmd.arg("-i");
    }
    if options.hidden_text {
        cmd.arg("-hidden");
    }
    cmd.arg(path);

    log::debug!("converting {} with {:?}", path.display(), cmd);

    let output = cmd
        .output()
        .map_err(|e| Error::Convert(format!("failed to run {}: {}", options.binary, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Convert(format!(
            "{} exited with {}: {}",
            options.binary,
            output.status,
            stderr.trim()
        )));
    }

    Ok(output.stdout)
}
