//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, static file
//! dispatch, the response header pass and access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{header, Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Raw (still percent-encoded) request path
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_modified_since: Option<String>,
    pub has_if_none_match: bool,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        let headers = req.headers();
        Self {
            path: req.uri().path(),
            query: req.uri().query(),
            is_head: req.method() == Method::HEAD,
            if_modified_since: headers
                .get(header::IF_MODIFIED_SINCE)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string),
            has_if_none_match: headers.contains_key(header::IF_NONE_MATCH),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// Every response, errors included, passes through
/// [`http::apply_dev_headers`] before it is returned to hyper.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: Option<SocketAddr>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    // Only GET and HEAD are served, so the body is never read
    let (parts, _body) = req.into_parts();
    let req = Request::from_parts(parts, ());

    let access_log = state.config.logging.access_log;
    let entry = access_log.then(|| AccessLogEntry::from_request(remote_addr, &req));

    let mut response = route_request(&req, &state).await;
    http::apply_dev_headers(&mut response, &state.config.http.server_name);

    if let Some(entry) = entry {
        let body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        let entry = entry.with_response(response.status().as_u16(), body_bytes, started.elapsed());
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn route_request(req: &Request<()>, state: &AppState) -> Response<Full<Bytes>> {
    if let Some(resp) = check_http_method(req.method()) {
        return resp;
    }

    let ctx = RequestContext::from_request(req);
    static_files::serve(&ctx, state).await
}

/// Reject everything but GET and HEAD
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        _ => Some(http::build_501_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test_support::ScratchDir;
    use crate::http::cache::NO_STORE;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn state_for(scratch: &ScratchDir) -> Arc<AppState> {
        Arc::new(AppState::for_root(scratch.path()).unwrap())
    }

    async fn send(
        state: &Arc<AppState>,
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
    ) -> (Response<()>, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let req = builder.body(()).unwrap();
        let resp = handle_request(req, Arc::clone(state), None).await.unwrap();
        let (parts, body) = resp.into_parts();
        let bytes = body.collect().await.unwrap().to_bytes().to_vec();
        (Response::from_parts(parts, ()), bytes)
    }

    fn assert_dev_headers(resp: &Response<()>) {
        let headers = resp.headers();
        let cors: Vec<_> = headers.get_all(header::ACCESS_CONTROL_ALLOW_ORIGIN).iter().collect();
        let cache: Vec<_> = headers.get_all(header::CACHE_CONTROL).iter().collect();
        assert_eq!(cors, ["*"], "status {}", resp.status());
        assert_eq!(cache, [NO_STORE], "status {}", resp.status());
    }

    #[tokio::test]
    async fn test_index_html_served_for_root_and_by_name() {
        let scratch = ScratchDir::new("router-index");
        scratch.write("index.html", b"<h1>hi</h1>");
        let state = state_for(&scratch);

        for uri in ["/", "/index.html"] {
            let (resp, body) = send(&state, Method::GET, uri, &[]).await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(body, b"<h1>hi</h1>");
            assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/html");
            assert_dev_headers(&resp);
        }
    }

    #[tokio::test]
    async fn test_typescript_served_as_javascript() {
        let scratch = ScratchDir::new("router-ts");
        scratch.write("app.ts", b"console.log(1)");
        scratch.write("src/App.tsx", b"export default () => null");
        scratch.write("sw.js", b"self.skipWaiting()");
        let state = state_for(&scratch);

        let (resp, body) = send(&state, Method::GET, "/app.ts", &[]).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body, b"console.log(1)");
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/javascript");

        for uri in ["/src/App.tsx", "/sw.js"] {
            let (resp, _) = send(&state, Method::GET, uri, &[]).await;
            assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/javascript");
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_404_with_dev_headers() {
        let scratch = ScratchDir::new("router-missing");
        let state = state_for(&scratch);

        let (resp, body) = send(&state, Method::GET, "/nope.js", &[]).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body, b"404 Not Found");
        assert_dev_headers(&resp);
    }

    #[tokio::test]
    async fn test_traversal_never_leaks_outside_root() {
        let scratch = ScratchDir::new("router-traversal");
        scratch.write("public/ok.txt", b"ok");
        scratch.write("secret.txt", b"top secret");
        let state = Arc::new(AppState::for_root(&scratch.path().join("public")).unwrap());

        for uri in [
            "/../secret.txt",
            "/%2e%2e/secret.txt",
            "/../../etc/passwd",
            "/..%2fsecret.txt",
        ] {
            let (resp, body) = send(&state, Method::GET, uri, &[]).await;
            assert!(resp.status().is_client_error(), "{uri} -> {}", resp.status());
            assert_ne!(body, b"top secret");
            assert_dev_headers(&resp);
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_is_forbidden() {
        let scratch = ScratchDir::new("router-symlink");
        scratch.write("public/ok.txt", b"ok");
        scratch.write("secret.txt", b"top secret");
        std::os::unix::fs::symlink(
            scratch.path().join("secret.txt"),
            scratch.path().join("public/leak.txt"),
        )
        .unwrap();
        let state = Arc::new(AppState::for_root(&scratch.path().join("public")).unwrap());

        let (resp, body) = send(&state, Method::GET, "/leak.txt", &[]).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_ne!(body, b"top secret");
    }

    #[tokio::test]
    async fn test_directory_without_slash_redirects() {
        let scratch = ScratchDir::new("router-redirect");
        scratch.write("docs/index.html", b"docs");
        let state = state_for(&scratch);

        let (resp, _) = send(&state, Method::GET, "/docs?lang=en", &[]).await;
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()[header::LOCATION], "/docs/?lang=en");
        assert_dev_headers(&resp);

        let (resp, body) = send(&state, Method::GET, "/docs/", &[]).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body, b"docs");
    }

    #[tokio::test]
    async fn test_directory_listing_when_no_index() {
        let scratch = ScratchDir::new("router-listing");
        scratch.write("assets/a.png", b"png");
        let state = state_for(&scratch);

        let (resp, body) = send(&state, Method::GET, "/assets/", &[]).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");
        let html = String::from_utf8(body).unwrap();
        assert!(html.contains("Directory listing for /assets/"));
        assert!(html.contains("<a href=\"a.png\">a.png</a>"));
    }

    #[tokio::test]
    async fn test_listing_disabled_gives_404() {
        let scratch = ScratchDir::new("router-nolisting");
        scratch.write("assets/a.png", b"png");
        let mut inner = AppState::for_root(scratch.path()).unwrap();
        inner.config.http.directory_listing = false;
        let state = Arc::new(inner);

        let (resp, _) = send(&state, Method::GET, "/assets/", &[]).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_file_with_trailing_slash_is_404() {
        let scratch = ScratchDir::new("router-fileslash");
        scratch.write("app.js", b"1");
        let state = state_for(&scratch);

        let (resp, _) = send(&state, Method::GET, "/app.js/", &[]).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let (resp, _) = send(&state, Method::GET, "/app.js/inner", &[]).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_head_has_headers_but_no_body() {
        let scratch = ScratchDir::new("router-head");
        scratch.write("app.ts", b"console.log(1)");
        let state = state_for(&scratch);

        let (resp, body) = send(&state, Method::HEAD, "/app.ts", &[]).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body.is_empty());
        assert_eq!(resp.headers()[header::CONTENT_LENGTH], "14");
        assert!(resp.headers().contains_key(header::LAST_MODIFIED));
        assert_dev_headers(&resp);
    }

    #[tokio::test]
    async fn test_unsupported_method_is_501() {
        let scratch = ScratchDir::new("router-method");
        let state = state_for(&scratch);

        for method in [Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS] {
            let (resp, _) = send(&state, method, "/", &[]).await;
            assert_eq!(resp.status(), StatusCode::NOT_IMPLEMENTED);
            assert_eq!(resp.headers()[header::ALLOW], "GET, HEAD");
            assert_dev_headers(&resp);
        }
    }

    #[tokio::test]
    async fn test_if_modified_since_returns_304() {
        let scratch = ScratchDir::new("router-304");
        scratch.write("style.css", b"body {}");
        let state = state_for(&scratch);

        let (first, _) = send(&state, Method::GET, "/style.css", &[]).await;
        let last_modified = first.headers()[header::LAST_MODIFIED].to_str().unwrap().to_string();

        let (resp, body) = send(
            &state,
            Method::GET,
            "/style.css",
            &[("if-modified-since", last_modified.as_str())],
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
        assert!(body.is_empty());
        assert_dev_headers(&resp);

        let (resp, _) = send(
            &state,
            Method::GET,
            "/style.css",
            &[("if-modified-since", "Thu, 01 Jan 1970 00:00:00 GMT")],
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_utf8_path_is_400() {
        let scratch = ScratchDir::new("router-400");
        let state = state_for(&scratch);

        let (resp, _) = send(&state, Method::GET, "/%FF%FE", &[]).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_dev_headers(&resp);
    }

    #[tokio::test]
    async fn test_query_string_ignored_for_lookup() {
        let scratch = ScratchDir::new("router-query");
        scratch.write("app.js", b"ok");
        let state = state_for(&scratch);

        let (resp, body) = send(&state, Method::GET, "/app.js?v=123", &[]).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body, b"ok");
    }
}
