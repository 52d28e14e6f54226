//! Local file loading.

use bytes::{Bytes, BytesMut};
use mime::Mime;
use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};
use tapwire_core::{
    BoxError, Capabilities, Request, ResourceHandler, ResponseMeta, ResponseSink, StatusCode,
};
use tokio::io::AsyncReadExt;
use url::Url;

/// Serves `file://` URLs from a root directory.
///
/// The URL path is resolved relative to `root`. Paths that would leave the
/// root, including through symlinks, answer `403`. URLs with a host answer
/// `400`. Missing files and directories answer `404`. Other I/O failures are
/// returned as handler errors.
#[derive(Debug, Clone)]
pub struct FileLoader {
    root: PathBuf,
    chunk_size: usize,
}

impl FileLoader {
    /// The default read size.
    pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

    /// Serve files under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the maximum chunk size. Zero is treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, url: &Url) -> Result<PathBuf, StatusCode> {
        let path = url.to_file_path().map_err(|()| StatusCode::BAD_REQUEST)?;
        let mut resolved = self.root.clone();
        for component in path.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::RootDir | Component::CurDir => {}
                Component::ParentDir | Component::Prefix(_) => return Err(StatusCode::FORBIDDEN),
            }
        }
        Ok(resolved)
    }
}

fn guess_mime_type(path: &Path) -> Mime {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("html" | "htm") => mime::TEXT_HTML,
        Some("js" | "mjs") => mime::TEXT_JAVASCRIPT,
        Some("css") => mime::TEXT_CSS,
        Some("json") => mime::APPLICATION_JSON,
        Some("txt") => mime::TEXT_PLAIN,
        Some("svg") => mime::IMAGE_SVG,
        Some("png") => mime::IMAGE_PNG,
        Some("jpg" | "jpeg") => mime::IMAGE_JPEG,
        Some("gif") => mime::IMAGE_GIF,
        Some("woff") => mime::FONT_WOFF,
        Some("woff2") => mime::FONT_WOFF2,
        Some("wasm") => "application/wasm"
            .parse()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM),
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

impl ResourceHandler for FileLoader {
    fn name(&self) -> &str {
        "file-loader"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::LOAD
    }

    fn will_load(&self, request: &Request) -> bool {
        request.scheme() == "file"
    }

    async fn load(&self, request: Request, sink: ResponseSink) -> Result<(), BoxError> {
        let url = request.url().clone();
        let path = match self.resolve(&url) {
            Ok(path) => path,
            Err(status) => {
                sink.complete(ResponseMeta::new(url, status), Bytes::new())?;
                return Ok(());
            }
        };

        // Symlinks may point anywhere, so the check runs on the real path.
        let real = match tokio::fs::canonicalize(&path).await {
            Ok(real) => real,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                sink.complete(ResponseMeta::new(url, StatusCode::NOT_FOUND), Bytes::new())?;
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        if !real.starts_with(tokio::fs::canonicalize(&self.root).await?) {
            sink.complete(ResponseMeta::new(url, StatusCode::FORBIDDEN), Bytes::new())?;
            return Ok(());
        }

        let mut file = match tokio::fs::File::open(&real).await {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                sink.complete(ResponseMeta::new(url, StatusCode::NOT_FOUND), Bytes::new())?;
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            sink.complete(ResponseMeta::new(url, StatusCode::NOT_FOUND), Bytes::new())?;
            return Ok(());
        }

        let length = metadata.len();
        sink.respond(
            ResponseMeta::ok(url)
                .with_mime_type(guess_mime_type(&path).to_string())
                .with_content_length(length),
        )?;

        let mut buffer = BytesMut::with_capacity(self.chunk_size);
        loop {
            buffer.reserve(self.chunk_size);
            let read = (&mut file)
                .take(self.chunk_size as u64)
                .read_buf(&mut buffer)
                .await?;
            if read == 0 {
                break;
            }
            sink.send_data(buffer.split().freeze())?;
        }
        sink.finish()?;
        Ok(())
    }
}
