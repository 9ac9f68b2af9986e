//! Embedded static assets
//!
//! In development, falls back to serving from the filesystem.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;
use std::path::PathBuf;

#[derive(Embed)]
#[folder = "ui"]
struct Assets;

/// Serve embedded static files, with filesystem fallback for development
pub async fn serve_static(req: Request<Body>) -> Response {
    let path = req.uri().path().trim_start_matches('/');

    match load(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content,
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Get the index.html content (embedded or from filesystem)
pub fn get_index_html() -> Option<String> {
    load("index.html").and_then(|bytes| String::from_utf8(bytes).ok())
}

fn load(path: &str) -> Option<Vec<u8>> {
    if path.split('/').any(|segment| segment == "..") {
        return None;
    }

    if let Some(content) = Assets::get(path) {
        return Some(content.data.into_owned());
    }

    let fs_path = PathBuf::from("ui").join(path);
    if fs_path.is_file() {
        return std::fs::read(&fs_path).ok();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_is_embedded() {
        let html = get_index_html().expect("index.html should be embedded");
        assert!(html.contains("<form"));
    }

    #[test]
    fn test_missing_asset() {
        assert!(load("does-not-exist.js").is_none());
    }

    #[test]
    fn test_parent_segments_rejected() {
        assert!(load("../Cargo.toml").is_none());
        assert!(load("assets/../../Cargo.toml").is_none());
    }
}
