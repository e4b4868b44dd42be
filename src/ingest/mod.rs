// Upload ingest: decide where an uploaded byte stream lands on disk

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use regex::Regex;

use crate::constants::{DEFAULT_VIDEO_EXTENSION, VIDEO_EXTENSIONS};
use crate::error::{Result, VidSearchError};

fn reserved_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[\x00-\x1f\x7f/\\:*?"<>|]"#).expect("static regex"))
}

/// Reduce a client-supplied filename to a safe single path component.
/// Returns None when nothing usable is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    // Browsers on Windows may send the full client path
    let last = name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(name)
        .trim();

    let cleaned = reserved_chars().replace_all(last, "_").to_string();
    let cleaned = cleaned.trim_matches(|c: char| c.is_whitespace()).to_string();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return None;
    }
    Some(cleaned)
}

/// Longest filename most filesystems accept, in bytes
const MAX_FILENAME_BYTES: usize = 255;
/// Kept free for the `_N` suffix added on collision
const COLLISION_SUFFIX_BYTES: usize = 6;

/// Split a name into stem and extension. Dots around the stem are dropped,
/// so `.mp4` has an empty stem and `clip.` has no extension.
fn split_name(name: &str) -> (&str, Option<&str>) {
    if let Some((stem, ext)) = name.rsplit_once('.') {
        if !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return (stem.trim_matches('.'), Some(ext));
        }
    }
    (name.trim_matches('.'), None)
}

/// Lowercased extension of a filename, if any
fn extension_of(filename: &str) -> Option<String> {
    split_name(filename).1.map(|e| e.to_lowercase())
}

/// Cut `s` to at most `max_bytes` without splitting a character
fn truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Pick an extension: the filename's own, then the MIME type's, then mp4
pub fn infer_extension(filename: Option<&str>, content_type: Option<&str>) -> String {
    if let Some(ext) = filename.and_then(extension_of) {
        return ext;
    }

    if let Some(ext) = content_type
        .and_then(|ct| mime_guess::get_mime_extensions_str(ct))
        .and_then(|exts| exts.first())
    {
        return ext.to_string();
    }

    DEFAULT_VIDEO_EXTENSION.to_string()
}

pub fn is_video_extension(ext: &str) -> bool {
    VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

/// Resolve the path an upload is written to inside `uploads_dir`.
/// Never returns a path that already exists.
pub fn upload_target(uploads_dir: &Path, filename: Option<&str>, content_type: Option<&str>) -> Result<PathBuf> {
    let safe_name = filename.and_then(sanitize_filename);
    let (stem, own_ext) = match safe_name.as_deref() {
        Some(name) => split_name(name),
        None => ("", None),
    };
    let ext = match own_ext {
        Some(ext) => ext.to_string(),
        None => infer_extension(None, content_type),
    };

    let budget = MAX_FILENAME_BYTES.saturating_sub(COLLISION_SUFFIX_BYTES + ext.len() + 1);
    let stem = truncate_utf8(stem, budget).trim_end_matches(|c: char| c == '.' || c.is_whitespace());

    let name = if stem.is_empty() {
        format!("upload_{}.{}", uuid::Uuid::new_v4().simple(), ext)
    } else {
        format!("{}.{}", stem, ext)
    };

    if !is_video_extension(&ext) {
        log::warn!("Upload '{}' has unrecognized video extension '{}'", name, ext);
    }

    let path = uploads_dir.join(name);
    if path.exists() {
        return generate_unique_path(&path);
    }
    Ok(path)
}

/// Generate a unique path by appending a number
fn generate_unique_path(path: &Path) -> Result<PathBuf> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("upload");
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    for i in 1..10_000 {
        let new_name = if ext.is_empty() {
            format!("{}_{}", stem, i)
        } else {
            format!("{}_{}.{}", stem, i, ext)
        };
        let new_path = parent.join(new_name);
        if !new_path.exists() {
            return Ok(new_path);
        }
    }

    Err(VidSearchError::Other("Could not generate unique filename".to_string()))
}
