//! Document references handed from the upload collector to the flow.
//!
//! The flow only ever sees a reference (display name, type, size and an optional
//! local path). File contents are read by the analysis provider, if at all.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A file as reported by a picker or a drop target, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
	/// File name as displayed to the user.
	pub name: String,
	/// MIME type reported by the input device, if any.
	pub mime: Option<String>,
	/// Size in bytes.
	pub size: u64,
	/// Local path when the file lives on disk.
	pub path: Option<PathBuf>,
}

impl SelectedFile {
	/// Builds a selection from a file on disk.
	///
	/// Only metadata is read. The MIME type is inferred from the extension.
	pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
		let path = path.as_ref();
		let metadata = std::fs::metadata(path)?;
		let name = path
			.file_name()
			.map(|n| n.to_string_lossy().into_owned())
			.unwrap_or_else(|| path.display().to_string());

		Ok(Self {
			mime: infer_mime(&name).map(str::to_string),
			name,
			size: metadata.len(),
			path: Some(path.to_path_buf()),
		})
	}
}

/// A validated document accepted for analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
	/// File name as displayed to the user.
	pub name: String,
	/// Resolved MIME type.
	pub mime: String,
	/// Size in bytes.
	pub size: u64,
	/// Local path when the file lives on disk.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub path: Option<PathBuf>,
}

/// Guesses a MIME type from a file name extension.
pub fn infer_mime(name: &str) -> Option<&'static str> {
	let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
	match extension.as_str() {
		"pdf" => Some("application/pdf"),
		"png" => Some("image/png"),
		"jpg" | "jpeg" => Some("image/jpeg"),
		"txt" => Some("text/plain"),
		"doc" => Some("application/msword"),
		"docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_infer_mime() {
		assert_eq!(infer_mime("scan.PDF"), Some("application/pdf"));
		assert_eq!(infer_mime("photo.jpeg"), Some("image/jpeg"));
		assert_eq!(infer_mime("photo.jpg"), Some("image/jpeg"));
		assert_eq!(infer_mime("archive.zip"), None);
		assert_eq!(infer_mime("no_extension"), None);
	}
}
