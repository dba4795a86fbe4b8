//! Portrait and promotional image inputs.
//!
//! An image reference is either empty (no image), an embedded
//! `data:image/...` payload, or a remote URL. Remote URLs must use
//! `http`/`https` and either point at a file with an image extension or be
//! served from a trusted host. Local files are embedded as base64 data URLs
//! after a size check.

use std::path::Path;
use std::sync::OnceLock;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use tracing::debug;

use crate::config::MediaConfig;
use crate::error::{Error, Result};

/// Default upper bound for embedded images: 2 MiB.
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 2 * 1024 * 1024;

/// Recognised image extensions and their MIME types.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("avif", "image/avif"),
];

/// Scheme, host, and path of a remote reference. Query and fragment are
/// captured separately so the extension test ignores them.
fn remote_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^https?://(?P<host>[^/?#\s]+)(?P<path>[^?#\s]*)(?:[?#]\S*)?$")
            .expect("remote image pattern is valid")
    })
}

/// MIME type for a file extension, if it names an image format.
#[must_use]
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, mime)| *mime)
}

/// Rules for accepting image references and files.
#[derive(Debug, Clone)]
pub struct ImagePolicy {
    max_bytes: u64,
    trusted_hosts: Vec<String>,
}

impl Default for ImagePolicy {
    fn default() -> Self {
        Self::from_config(&MediaConfig::default())
    }
}

impl ImagePolicy {
    /// Build a policy from the media configuration.
    #[must_use]
    pub fn from_config(config: &MediaConfig) -> Self {
        Self {
            max_bytes: config.max_image_bytes,
            trusted_hosts: config
                .trusted_hosts
                .iter()
                .map(|h| h.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Maximum size of an embedded image, in bytes.
    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Validate a portrait or promotional image reference.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming `field` when the reference is
    /// neither empty, embedded, nor an acceptable remote URL.
    pub fn validate_reference(&self, field: &'static str, reference: &str) -> Result<()> {
        let reference = reference.trim();
        if reference.is_empty() || is_embedded(reference) {
            return Ok(());
        }

        let Some(caps) = remote_pattern().captures(reference) else {
            return Err(Error::validation(
                field,
                "image URL must start with http:// or https://",
            ));
        };

        let host = caps["host"].to_ascii_lowercase();
        let path = &caps["path"];
        let has_image_extension = path
            .rsplit_once('.')
            .is_some_and(|(_, ext)| mime_for_extension(ext).is_some());

        if has_image_extension || self.trusted_hosts.iter().any(|h| *h == host) {
            Ok(())
        } else {
            Err(Error::validation(
                field,
                format!("'{reference}' does not point at a recognized image"),
            ))
        }
    }

    /// Check an image size against the limit.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming `field` if `size` exceeds the limit.
    pub fn check_size(&self, field: &'static str, size: u64) -> Result<()> {
        if size > self.max_bytes {
            debug!(field, size, limit = self.max_bytes, "Image over size limit");
            return Err(Error::validation(
                field,
                format!("Asset exceeds {} limit.", display_limit(self.max_bytes)),
            ));
        }
        Ok(())
    }

    /// Read a local image and return it as an embedded data URL.
    ///
    /// The size is checked before the file is read.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the file is not an image or is too
    /// large, or an I/O error if it cannot be read.
    pub fn embed_file(&self, field: &'static str, path: &Path) -> Result<String> {
        let mime = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(mime_for_extension)
            .ok_or_else(|| {
                Error::validation(field, "invalid asset type, please provide an image file")
            })?;

        let size = std::fs::metadata(path)?.len();
        self.check_size(field, size)?;

        let bytes = std::fs::read(path)?;
        debug!(path = %path.display(), size, mime, "Embedding image");
        Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
    }
}

fn display_limit(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{bytes} byte")
    }
}

/// Check whether a reference is an embedded image payload.
#[must_use]
pub fn is_embedded(reference: &str) -> bool {
    reference
        .get(..11)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("data:image/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn policy() -> ImagePolicy {
        ImagePolicy::default()
    }

    fn temp_file(name: &str, len: usize) -> PathBuf {
        let path = std::env::temp_dir().join(format!("nodedir_{}_{name}", std::process::id()));
        std::fs::write(&path, vec![0u8; len]).unwrap();
        path
    }

    #[test]
    fn test_wrong_scheme_rejected() {
        let err = policy()
            .validate_reference("photoUrl", "ftp://x.png")
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("photoUrl"));
    }

    #[test]
    fn test_https_image_accepted() {
        assert!(policy()
            .validate_reference("photoUrl", "https://images.example.com/a.png")
            .is_ok());
        assert!(policy()
            .validate_reference("photoUrl", "http://cdn.example.com/p/Portrait.JPEG?w=400#top")
            .is_ok());
    }

    #[test]
    fn test_non_image_path_rejected_unless_trusted() {
        assert!(policy()
            .validate_reference("photoUrl", "https://example.com/profile")
            .is_err());
        assert!(policy()
            .validate_reference(
                "photoUrl",
                "https://images.unsplash.com/photo-1472099645785?q=80&w=400"
            )
            .is_ok());
    }

    #[test]
    fn test_empty_and_embedded_accepted() {
        assert!(policy().validate_reference("photoUrl", "").is_ok());
        assert!(policy().validate_reference("photoUrl", "   ").is_ok());
        assert!(policy()
            .validate_reference("photoUrl", "data:image/png;base64,AAAA")
            .is_ok());
    }

    #[test]
    fn test_is_embedded() {
        assert!(is_embedded("DATA:IMAGE/png;base64,"));
        assert!(!is_embedded("data:text/plain,hi"));
        assert!(!is_embedded("data:"));
    }

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for_extension("JPG"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("svg"), Some("image/svg+xml"));
        assert_eq!(mime_for_extension("pdf"), None);
    }

    #[test]
    fn test_check_size_limit() {
        let policy = policy();
        assert_eq!(policy.max_bytes(), DEFAULT_MAX_IMAGE_BYTES);
        assert!(policy.check_size("photoUrl", DEFAULT_MAX_IMAGE_BYTES).is_ok());
        // 2.1 MB
        assert!(policy.check_size("photoUrl", 2_100_000).is_err());
    }

    #[test]
    fn test_embed_small_file() {
        let path = temp_file("small.png", 3);
        let url = policy().embed_file("photoUrl", &path).unwrap();
        assert_eq!(url, "data:image/png;base64,AAAA");
        assert!(policy().validate_reference("photoUrl", &url).is_ok());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_embed_oversized_file_rejected() {
        let path = temp_file("big.jpg", 2_202_010);
        let err = policy().embed_file("photoUrl", &path).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("Asset exceeds 2MB limit."));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_check_size_message() {
        let err = ImagePolicy::default().check_size("photoUrl", 2_202_010).unwrap_err();
        assert_eq!(err.to_string(), "invalid photoUrl: Asset exceeds 2MB limit.");
        assert!(ImagePolicy::default().check_size("photoUrl", 1024).is_ok());
    }

    #[test]
    fn test_embed_non_image_rejected() {
        let path = temp_file("notes.txt", 4);
        let err = policy().embed_file("photoUrl", &path).unwrap_err();
        assert!(err.to_string().contains("image file"));
        let _ = std::fs::remove_file(path);
    }
}
