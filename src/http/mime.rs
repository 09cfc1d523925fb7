//! MIME type detection module
//!
//! Returns the corresponding Content-Type based on file extension. The
//! built-in table can be extended with per-extension overrides through
//! [`ContentTypeMap`].

use std::collections::HashMap;
use std::path::Path;

/// Served for TypeScript/JSX sources so browsers execute them as modules
pub const JAVASCRIPT: &str = "application/javascript";

/// Extensions forced to [`JAVASCRIPT`] by the dev server
pub const DEV_SCRIPT_EXTENSIONS: [&str; 3] = ["tsx", "ts", "js"];

/// Get MIME Content-Type based on a lower-case file extension
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        // Text
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("csv") => "text/csv",
        Some("xml") => "application/xml",

        // JavaScript/WASM
        Some("js" | "mjs") => "text/javascript",
        Some("json" | "map") => "application/json",
        Some("webmanifest") => "application/manifest+json",
        Some("wasm") => "application/wasm",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/vnd.microsoft.icon",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",

        // Video
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("ogv") => "video/ogg",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("ts") => "video/mp2t",

        // Audio
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("ogg" | "oga") => "audio/ogg",
        Some("m4a") => "audio/mp4",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        Some("eot") => "application/vnd.ms-fontobject",

        // Documents
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz" | "gzip") => "application/gzip",
        Some("tar") => "application/x-tar",

        // Default
        _ => "application/octet-stream",
    }
}

/// Extension to MIME mapping with overrides layered over [`get_content_type`]
///
/// Populated once at startup and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct ContentTypeMap {
    overrides: HashMap<String, &'static str>,
}

impl ContentTypeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default table plus the script overrides for `.tsx`, `.ts` and `.js`
    pub fn with_dev_overrides() -> Self {
        let mut map = Self::new();
        for ext in DEV_SCRIPT_EXTENSIONS {
            map.insert(ext, JAVASCRIPT);
        }
        map
    }

    /// Register an override; a leading dot and letter case are ignored
    pub fn insert(&mut self, extension: &str, content_type: &'static str) {
        let key = extension.trim_start_matches('.').to_ascii_lowercase();
        self.overrides.insert(key, content_type);
    }

    pub fn lookup(&self, extension: Option<&str>) -> &'static str {
        let Some(ext) = extension.map(str::to_ascii_lowercase) else {
            return get_content_type(None);
        };
        self.overrides
            .get(&ext)
            .copied()
            .unwrap_or_else(|| get_content_type(Some(&ext)))
    }

    pub fn for_path(&self, path: &Path) -> &'static str {
        self.lookup(path.extension().and_then(|e| e.to_str()))
    }
}
