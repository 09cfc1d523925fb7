//! Static file serving module
//!
//! Maps request paths onto the document root, then loads files, index
//! files, or directory listings and builds the response.

use crate::config::AppState;
use crate::handler::listing;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, response};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use percent_encoding::percent_decode_str;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Why a request path could not be served
#[derive(Debug)]
pub enum ResolveError {
    /// Path does not percent-decode to UTF-8
    BadRequest,
    /// Path traversal outside the document root
    Forbidden,
    NotFound,
    /// Any other filesystem failure
    Io(io::Error),
}

impl ResolveError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        match self {
            Self::BadRequest => http::build_400_response(),
            Self::Forbidden => http::build_403_response(),
            Self::NotFound => http::build_404_response(),
            Self::Io(_) => http::build_500_response(),
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest => f.write_str("request path is not valid UTF-8"),
            Self::Forbidden => f.write_str("request path escapes the document root"),
            Self::NotFound => f.write_str("file not found"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ResolveError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => Self::NotFound,
            _ => Self::Io(e),
        }
    }
}

/// What a request path points at
#[derive(Debug, PartialEq, Eq)]
pub enum Target {
    File(PathBuf),
    Directory(PathBuf),
    /// Directory requested without its trailing slash
    AddSlash,
}

/// Percent-decode a request path and split it into safe segments
///
/// Empty and `.` segments are dropped; `..` or a segment carrying a
/// backslash or NUL is rejected.
pub fn sanitize_path(raw_path: &str) -> Result<Vec<String>, ResolveError> {
    let decoded = percent_decode_str(raw_path)
        .decode_utf8()
        .map_err(|_| ResolveError::BadRequest)?;

    let mut segments = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(ResolveError::Forbidden),
            s if s.contains(['\\', '\0']) => return Err(ResolveError::Forbidden),
            s => segments.push(s.to_string()),
        }
    }
    Ok(segments)
}

/// Resolve a request path against the canonical document root
pub async fn resolve(root: &Path, raw_path: &str) -> Result<Target, ResolveError> {
    let segments = sanitize_path(raw_path)?;
    let joined = segments.iter().fold(root.to_path_buf(), |p, s| p.join(s));

    let canonical = ensure_within_root(root, &joined, raw_path).await?;
    let metadata = fs::metadata(&canonical).await?;
    let wants_dir = raw_path.ends_with('/');

    if metadata.is_dir() {
        if wants_dir {
            Ok(Target::Directory(canonical))
        } else {
            Ok(Target::AddSlash)
        }
    } else if wants_dir {
        Err(ResolveError::NotFound)
    } else {
        Ok(Target::File(canonical))
    }
}

/// Canonicalize `path` and reject it when symlinks lead outside `root`
async fn ensure_within_root(
    root: &Path,
    path: &Path,
    raw_path: &str,
) -> Result<PathBuf, ResolveError> {
    let canonical = fs::canonicalize(path).await?;
    if canonical.starts_with(root) {
        Ok(canonical)
    } else {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            raw_path,
            canonical.display()
        ));
        Err(ResolveError::Forbidden)
    }
}

/// Serve whatever the request path resolves to
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let result = match resolve(&state.root, ctx.path).await {
        Ok(Target::File(path)) => serve_file(ctx, &path, state).await,
        Ok(Target::Directory(dir)) => serve_directory(ctx, &dir, state).await,
        Ok(Target::AddSlash) => Ok(http::build_redirect_response(&slash_location(ctx))),
        Err(e) => Err(e),
    };

    result.unwrap_or_else(|e| {
        if let ResolveError::Io(ref err) = e {
            logger::log_error(&format!(
                "{} while serving '{}': {err}",
                e.status().as_u16(),
                ctx.path
            ));
        }
        e.into_response()
    })
}

/// Redirect target for a directory requested without trailing slash
fn slash_location(ctx: &RequestContext<'_>) -> String {
    match ctx.query {
        Some(q) => format!("{}/?{q}", ctx.path),
        None => format!("{}/", ctx.path),
    }
}

/// Serve a directory: first existing index file, else a listing
async fn serve_directory(
    ctx: &RequestContext<'_>,
    dir: &Path,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, ResolveError> {
    for index_file in &state.config.http.index_files {
        let candidate = dir.join(index_file);
        match fs::metadata(&candidate).await {
            Ok(meta) if meta.is_file() => {
                let index_path = ensure_within_root(&state.root, &candidate, ctx.path).await?;
                return serve_file(ctx, &index_path, state).await;
            }
            _ => {}
        }
    }

    if !state.config.http.directory_listing {
        return Err(ResolveError::NotFound);
    }

    let html = listing::render_listing(dir, ctx.path).await?;
    Ok(response::build_html_response(html, ctx.is_head))
}

/// Serve a single file with `Last-Modified` and conditional GET support
async fn serve_file(
    ctx: &RequestContext<'_>,
    path: &Path,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, ResolveError> {
    let modified = fs::metadata(path).await?.modified().ok();
    let last_modified = modified.map(cache::format_http_date);

    if let Some(mtime) = modified {
        if cache::is_not_modified(ctx.if_modified_since.as_deref(), ctx.has_if_none_match, mtime)
        {
            let date = last_modified.unwrap_or_default();
            return Ok(http::build_304_response(&date));
        }
    }

    // A file that vanished between resolve and read is a server-side failure
    let content = fs::read(path).await.map_err(ResolveError::Io)?;
    let content_type = state.content_types.for_path(path);

    Ok(response::build_file_response(
        content,
        content_type,
        last_modified.as_deref(),
        ctx.is_head,
    ))
}
