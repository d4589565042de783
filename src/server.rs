//! The HTTP front end: one thread per connection, three routes.
//!
//! | Route | Body |
//! |---|---|
//! | `GET /thumb/<path>` | square thumbnail of `<path>`, `image/jpeg` |
//! | `GET /image/<path>` | full-resolution re-encode of `<path>`, `image/jpeg` |
//! | `GET /<path>` | HTML listing of the directory `<path>` |
//!
//! Requests are parsed from a single read and answered with
//! `Connection: close`; no keep-alive, no pipelining. Each accepted
//! connection gets its own thread, and all of them share one
//! [`Gallery`].
//!
//! Failures stay request-scoped: a path that does not exist is a 404, a
//! file the decoder rejects is a 500, and the next request proceeds as
//! if nothing happened. Paths are percent-decoded and normalized before
//! touching the filesystem; anything trying to climb out of the gallery
//! root is a 404.

use crate::browse;
use crate::imaging::{self, ImagingError};
use crate::pages;
use crate::thumbs::Thumbnailer;
use log::{info, warn};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Server configuration, filled in from the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory served as the gallery root.
    pub root: PathBuf,
    /// Thumbnails kept in memory before the oldest is overwritten.
    pub cache_capacity: usize,
    /// Thumbnail edge length in pixels.
    pub thumb_size: u32,
    /// Omit folders whose subtree contains no image.
    pub skip_empty_dirs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            cache_capacity: 300,
            thumb_size: 200,
            skip_empty_dirs: false,
        }
    }
}

/// Process-wide gallery state shared by every request thread.
pub struct Gallery {
    root: PathBuf,
    skip_empty_dirs: bool,
    thumbs: Thumbnailer,
}

impl Gallery {
    pub fn new(settings: Settings) -> Self {
        Self {
            root: settings.root,
            skip_empty_dirs: settings.skip_empty_dirs,
            thumbs: Thumbnailer::new(settings.cache_capacity, settings.thumb_size),
        }
    }

    /// Produce the response for an already-parsed route.
    fn respond_to(&self, route: Route) -> Response {
        match route {
            Route::Thumb(rel) => {
                let source = self.root.join(&rel);
                let result = self
                    .thumbs
                    .get_or_create(&rel, &source)
                    .and_then(|img| imaging::encode_jpeg(&img));
                match result {
                    Ok(bytes) => Response::jpeg(bytes),
                    Err(err) => image_error("thumb", &rel, err),
                }
            }
            Route::Image(rel) => {
                let source = self.root.join(&rel);
                let result =
                    imaging::load_jpeg(&source).and_then(|img| imaging::encode_jpeg(&img));
                match result {
                    Ok(bytes) => Response::jpeg(bytes),
                    Err(err) => image_error("image", &rel, err),
                }
            }
            Route::Listing(rel) => {
                let listing = browse::list_dir(&self.root, &rel, self.skip_empty_dirs);
                let page = pages::render_listing(&listing, self.thumbs.size());
                Response::html(page.into_string())
            }
        }
    }
}

/// Map an imaging failure to a status: unreadable means the resource is
/// absent, undecodable means the server has a broken file.
fn image_error(what: &str, rel: &str, err: ImagingError) -> Response {
    warn!("{what} {rel}: {err}");
    match err {
        ImagingError::Io(_) => Response::not_found(),
        ImagingError::Decode(_) | ImagingError::Encode(_) => Response::internal_error(),
    }
}

/// A parsed request target.
#[derive(Debug, PartialEq, Eq)]
enum Route {
    Thumb(String),
    Image(String),
    Listing(String),
}

/// Split a request target into a route and a normalized relative path.
///
/// The query string is dropped, the path percent-decoded, and leading
/// and trailing slashes trimmed before the route prefix is peeled off.
/// Returns `None` for undecodable paths and for paths that try to
/// escape the root.
fn parse_target(target: &str) -> Option<Route> {
    let path = target.split('?').next().unwrap_or(target);
    let decoded = urlencoding::decode(path).ok()?;
    let trimmed = decoded.trim_matches('/');

    if let Some(rest) = trimmed.strip_prefix("thumb/") {
        Some(Route::Thumb(normalize_rel(rest)?))
    } else if let Some(rest) = trimmed.strip_prefix("image/") {
        Some(Route::Image(normalize_rel(rest)?))
    } else {
        Some(Route::Listing(normalize_rel(trimmed)?))
    }
}

/// Collapse a raw path into clean `a/b/c` form. Empty and `.` segments
/// vanish; any `..` rejects the whole path, so the result always stays
/// under the gallery root when joined.
fn normalize_rel(raw: &str) -> Option<String> {
    let mut parts = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            part => parts.push(part),
        }
    }
    Some(parts.join("/"))
}

/// A response ready to go on the wire.
struct Response {
    status: &'static str,
    content_type: &'static str,
    body: Vec<u8>,
}

impl Response {
    fn html(body: String) -> Self {
        Self {
            status: "200 OK",
            content_type: "text/html; charset=utf-8",
            body: body.into_bytes(),
        }
    }

    fn jpeg(body: Vec<u8>) -> Self {
        Self {
            status: "200 OK",
            content_type: "image/jpeg",
            body,
        }
    }

    fn not_found() -> Self {
        Self {
            status: "404 Not Found",
            content_type: "text/plain; charset=utf-8",
            body: b"Not Found".to_vec(),
        }
    }

    fn internal_error() -> Self {
        Self {
            status: "500 Internal Server Error",
            content_type: "text/plain; charset=utf-8",
            body: b"Internal Server Error".to_vec(),
        }
    }

    fn method_not_allowed() -> Self {
        Self {
            status: "405 Method Not Allowed",
            content_type: "text/plain; charset=utf-8",
            body: b"Method Not Allowed".to_vec(),
        }
    }
}

/// Read one request from the stream, answer it, and let the connection
/// drop.
fn handle_connection(gallery: &Gallery, mut stream: TcpStream) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 4096];
    let n = match stream.read(&mut buf) {
        Ok(n) if n > 0 => n,
        _ => return,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let mut line = request.split_whitespace();
    let method = line.next().unwrap_or("");
    let target = line.next().unwrap_or("/");

    let response = if method != "GET" {
        Response::method_not_allowed()
    } else {
        match parse_target(target) {
            Some(route) => gallery.respond_to(route),
            None => Response::not_found(),
        }
    };

    info!("{method} {target} -> {}", response.status);
    write_response(&mut stream, &response);
}

fn write_response(stream: &mut TcpStream, response: &Response) {
    let header = format!(
        "HTTP/1.1 {}\r\n\
         Content-Type: {}\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n",
        response.status,
        response.content_type,
        response.body.len()
    );
    let _ = stream.write_all(header.as_bytes());
    let _ = stream.write_all(&response.body);
}

/// Accept connections forever, one thread per connection.
pub fn run(gallery: Arc<Gallery>, listener: TcpListener) -> std::io::Result<()> {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let gallery = Arc::clone(&gallery);
                thread::spawn(move || handle_connection(&gallery, stream));
            }
            Err(err) => warn!("accept failed: {err}"),
        }
    }
    Ok(())
}
