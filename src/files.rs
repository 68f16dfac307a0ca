use std::fmt::Write as _;
use std::path::{Component, Path, PathBuf};

use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use tokio::fs;
use tracing::error;

use crate::server::AppState;

/// Per-request failures. None of these terminate the server; they map to
/// HTTP status codes.
#[derive(Debug)]
pub enum FileError {
    NotFound,
    BadPath,
    Io(std::io::Error),
}

impl IntoResponse for FileError {
    fn into_response(self) -> Response {
        match self {
            FileError::NotFound => (StatusCode::NOT_FOUND, "File not found").into_response(),
            FileError::BadPath => (StatusCode::BAD_REQUEST, "Invalid path").into_response(),
            FileError::Io(err) => {
                error!(error = %err, "Failed to read file");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Fallback handler: serves the request path from the configured root.
pub async fn serve_path(State(state): State<AppState>, uri: Uri) -> Response {
    match respond(&state.root, uri.path()).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn respond(root: &Path, request_path: &str) -> Result<Response, FileError> {
    let decoded = urlencoding::decode(request_path).map_err(|_| FileError::BadPath)?;
    let path = resolve(root, &decoded)?;
    let metadata = fs::metadata(&path).await.map_err(io_error)?;

    if metadata.is_dir() {
        // Directory URLs are canonicalized to the trailing-slash form so
        // relative links in the listing resolve against the directory.
        if !request_path.ends_with('/') {
            return Ok((
                StatusCode::MOVED_PERMANENTLY,
                [(header::LOCATION, format!("{request_path}/"))],
            )
                .into_response());
        }
        let index = path.join("index.html");
        if fs::try_exists(&index).await.map_err(io_error)? {
            return serve_file(&index).await;
        }
        return render_listing(&path, &decoded).await;
    }

    serve_file(&path).await
}

/// Joins the decoded request path onto the root, keeping the result inside
/// it. `..` components are rejected outright.
fn resolve(root: &Path, decoded: &str) -> Result<PathBuf, FileError> {
    let mut resolved = root.to_path_buf();
    for component in Path::new(decoded).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir | Component::Prefix(_) => return Err(FileError::BadPath),
        }
    }
    Ok(resolved)
}

async fn serve_file(path: &Path) -> Result<Response, FileError> {
    let contents = fs::read(path).await.map_err(io_error)?;
    let mime = new_mime_guess::from_path(path).first_or_octet_stream();
    let content_type = HeaderValue::from_str(mime.as_ref())
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    let mut response = contents.into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, content_type);
    Ok(response)
}

async fn render_listing(dir: &Path, display_path: &str) -> Result<Response, FileError> {
    let mut entries = Vec::new();
    let mut reader = fs::read_dir(dir).await.map_err(io_error)?;
    while let Some(entry) = reader.next_entry().await.map_err(io_error)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry
            .file_type()
            .await
            .map(|kind| kind.is_dir())
            .unwrap_or(false);
        entries.push((name, is_dir));
    }
    entries.sort();

    let title = format!("Directory listing for {display_path}");
    let mut page = String::new();
    let _ = writeln!(page, "<!DOCTYPE HTML>");
    let _ = writeln!(page, "<html lang=\"en\">");
    let _ = writeln!(page, "<head>");
    let _ = writeln!(page, "<meta charset=\"utf-8\">");
    let _ = writeln!(page, "<title>{}</title>", escape_html(&title));
    let _ = writeln!(page, "</head>");
    let _ = writeln!(page, "<body>");
    let _ = writeln!(page, "<h1>{}</h1>", escape_html(&title));
    let _ = writeln!(page, "<hr>");
    let _ = writeln!(page, "<ul>");
    for (name, is_dir) in &entries {
        let suffix = if *is_dir { "/" } else { "" };
        let _ = writeln!(
            page,
            "<li><a href=\"{}{}\">{}{}</a></li>",
            urlencoding::encode(name),
            suffix,
            escape_html(name),
            suffix,
        );
    }
    let _ = writeln!(page, "</ul>");
    let _ = writeln!(page, "<hr>");
    let _ = writeln!(page, "</body>");
    let _ = writeln!(page, "</html>");

    Ok(Html(page).into_response())
}

fn io_error(err: std::io::Error) -> FileError {
    if err.kind() == std::io::ErrorKind::NotFound {
        FileError::NotFound
    } else {
        FileError::Io(err)
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_joins_under_the_root() {
        let root = Path::new("/srv/files");
        let path = resolve(root, "/sub/page.html").unwrap();
        assert_eq!(path, PathBuf::from("/srv/files/sub/page.html"));
    }

    #[test]
    fn resolve_maps_the_root_url_to_the_root_directory() {
        let root = Path::new("/srv/files");
        let path = resolve(root, "/").unwrap();
        assert_eq!(path, PathBuf::from("/srv/files"));
    }

    #[test]
    fn resolve_rejects_parent_components() {
        let root = Path::new("/srv/files");
        assert!(matches!(
            resolve(root, "/../secret.txt"),
            Err(FileError::BadPath)
        ));
        assert!(matches!(
            resolve(root, "/sub/../../secret.txt"),
            Err(FileError::BadPath)
        ));
    }

    #[test]
    fn resolve_skips_current_dir_components() {
        let root = Path::new("/srv/files");
        let path = resolve(root, "/./sub/./page.html").unwrap();
        assert_eq!(path, PathBuf::from("/srv/files/sub/page.html"));
    }

    #[test]
    fn escape_html_escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">&"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;"
        );
    }
}
