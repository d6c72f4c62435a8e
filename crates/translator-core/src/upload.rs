//! Upload collector.
//!
//! Turns whatever a file picker or drop target produced into at most one
//! [`DocumentRef`]. The collector never reads file contents.

use thiserror::Error;
use translator_config::UploadConfig;
use translator_types::{infer_mime, DocumentRef, SelectedFile};

/// MIME type used when none is reported and none can be inferred.
const FALLBACK_MIME: &str = "application/octet-stream";

/// Reasons a selected file is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
	#[error("{name}: unsupported file type {mime}")]
	UnsupportedType { name: String, mime: String },
	#[error("{name}: file is {size} bytes, the limit is {max} bytes")]
	TooLarge { name: String, size: u64, max: u64 },
}

/// Accepts the first selected file when enabled.
#[derive(Debug, Clone)]
pub struct UploadCollector {
	config: UploadConfig,
	enabled: bool,
}

impl UploadCollector {
	pub fn new(config: UploadConfig) -> Self {
		Self {
			config,
			enabled: true,
		}
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	pub fn set_enabled(&mut self, enabled: bool) {
		self.enabled = enabled;
	}

	/// Collects one document from a selection.
	///
	/// Returns `Ok(None)` when disabled or when nothing was selected. Files after
	/// the first are dropped.
	pub fn collect(
		&self,
		files: impl IntoIterator<Item = SelectedFile>,
	) -> Result<Option<DocumentRef>, UploadError> {
		if !self.enabled {
			tracing::debug!("Upload collector disabled, ignoring selection");
			return Ok(None);
		}

		let mut files = files.into_iter();
		let Some(file) = files.next() else {
			tracing::debug!("Empty selection ignored");
			return Ok(None);
		};

		let extra = files.count();
		if extra > 0 {
			tracing::debug!(dropped = extra, "Only the first file is used");
		}

		let mime = file
			.mime
			.clone()
			.filter(|m| !m.is_empty())
			.or_else(|| infer_mime(&file.name).map(str::to_string))
			.unwrap_or_else(|| FALLBACK_MIME.to_string());

		if self.config.enforce {
			if !self.config.accepted_mime.iter().any(|accepted| accepted == &mime) {
				return Err(UploadError::UnsupportedType {
					name: file.name,
					mime,
				});
			}
			if file.size > self.config.max_size_bytes {
				return Err(UploadError::TooLarge {
					name: file.name,
					size: file.size,
					max: self.config.max_size_bytes,
				});
			}
		}

		Ok(Some(DocumentRef {
			name: file.name,
			mime,
			size: file.size,
			path: file.path,
		}))
	}
}
