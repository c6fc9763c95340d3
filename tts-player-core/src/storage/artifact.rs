use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::error::{EncodeError, StudioError};
use crate::traits::encoder::AudioEncoder;

/// Downloadable encoded copy of the session's audio.
///
/// The artifact lives exactly as long as its playback session: the controller
/// owns it and drops it on teardown. If it was persisted, dropping it (or
/// calling `revoke`) deletes the file, so no reference outlives the session.
///
/// ## Persisted layout
///
/// ```text
/// <artifact_directory>/<uuid>-<file_name>
/// ```
#[derive(Debug)]
pub struct DownloadArtifact {
    file_name: String,
    mime_type: String,
    bytes: Vec<u8>,
    checksum: String,
    location: Option<PathBuf>,
}

impl DownloadArtifact {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let checksum = sha256_hex(&bytes);
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
            checksum,
            location: None,
        }
    }

    /// Encode `samples` with `encoder` and wrap the result.
    pub fn encode(
        encoder: &dyn AudioEncoder,
        samples: &[i16],
        sample_rate: u32,
        file_name: &str,
    ) -> Result<Self, EncodeError> {
        let bytes = encoder.encode(samples, sample_rate)?;
        Ok(Self::new(file_name, encoder.mime_type(), bytes))
    }

    /// Write the artifact into `directory` and remember its path.
    pub fn persist(&mut self, directory: &Path) -> Result<&Path, StudioError> {
        if self.location.is_none() {
            fs::create_dir_all(directory)
                .map_err(|e| StudioError::StorageError(format!("failed to create directory: {}", e)))?;

            let path = directory.join(format!("{}-{}", uuid::Uuid::new_v4(), self.file_name));
            fs::write(&path, &self.bytes)
                .map_err(|e| StudioError::StorageError(format!("failed to write artifact: {}", e)))?;
            log::debug!("persisted download artifact at {}", path.display());
            self.location = Some(path);
        }

        self.location
            .as_deref()
            .ok_or_else(|| StudioError::StorageError("artifact location missing".into()))
    }

    /// Release the artifact, deleting its persisted file if any.
    pub fn revoke(mut self) {
        self.release();
    }

    /// Name offered to the user when saving (e.g., `gemini-audio.mp3`).
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// SHA-256 hex digest of the encoded bytes.
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Path of the persisted file, if `persist` was called.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    fn release(&mut self) {
        if let Some(path) = self.location.take() {
            match fs::remove_file(&path) {
                Ok(()) => log::debug!("revoked download artifact {}", path.display()),
                Err(e) => log::error!("failed to remove artifact {}: {}", path.display(), e),
            }
        }
    }
}

impl Drop for DownloadArtifact {
    fn drop(&mut self) {
        self.release();
    }
}

fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data).iter().map(|b| format!("{:02x}", b)).collect()
}
