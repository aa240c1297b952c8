use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::error::BordereauError;

/// Outcome of handing a finished document to its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emitted {
    Saved(PathBuf),
    Canceled,
}

/// Destination for exported documents.
///
/// The core only produces bytes, a suggested file name and a MIME type;
/// where they end up (a directory, a save dialog, a download) is up to the
/// implementation.
pub trait Emitter {
    fn emit(
        &self,
        bytes: &[u8],
        suggested_name: &str,
        mime_type: &str,
    ) -> Result<Emitted, BordereauError>;

    /// Name of this backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Writes exports into a directory.
///
/// An existing file is only replaced when `overwrite` is set; otherwise the
/// save is reported as canceled.
pub struct DirectoryEmitter {
    dir: PathBuf,
    overwrite: bool,
}

impl DirectoryEmitter {
    pub fn new(dir: impl Into<PathBuf>, overwrite: bool) -> Self {
        DirectoryEmitter {
            dir: dir.into(),
            overwrite,
        }
    }
}

impl Emitter for DirectoryEmitter {
    fn emit(
        &self,
        bytes: &[u8],
        suggested_name: &str,
        mime_type: &str,
    ) -> Result<Emitted, BordereauError> {
        std::fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(suggested_name);

        if target.exists() && !self.overwrite {
            warn!(path = %target.display(), "file exists, not overwriting");
            return Ok(Emitted::Canceled);
        }

        std::fs::write(&target, bytes)?;
        info!(path = %target.display(), mime_type, bytes = bytes.len(), "saved export");
        Ok(Emitted::Saved(target))
    }

    fn backend_name(&self) -> &str {
        "directory"
    }
}

/// Emit and turn a canceled save into `SaveCanceled`.
pub fn emit_or_cancel(
    emitter: &dyn Emitter,
    bytes: &[u8],
    suggested_name: &str,
    mime_type: &str,
) -> Result<PathBuf, BordereauError> {
    match emitter.emit(bytes, suggested_name, mime_type)? {
        Emitted::Saved(path) => {
            debug!(
                backend = emitter.backend_name(),
                path = %path.display(),
                "export emitted"
            );
            Ok(path)
        }
        Emitted::Canceled => {
            info!(
                backend = emitter.backend_name(),
                name = suggested_name,
                "save canceled"
            );
            Err(BordereauError::SaveCanceled {
                name: suggested_name.to_string(),
            })
        }
    }
}
