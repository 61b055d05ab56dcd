//! Minimal HTTP/1.1 request reader and response writer.
//!
//! One request per connection: the head is read up to [`MAX_HEAD_BYTES`],
//! any declared body is drained and ignored, and every response carries
//! `Connection: close`.

use serde::Serialize;
use std::io::{self, Read, Write};
use thiserror::Error;

use crate::error::ApiError;

/// Largest accepted request line plus headers.
pub const MAX_HEAD_BYTES: usize = 8 * 1024;

/// Bodies up to this size are drained so the client sees a clean close.
const MAX_DRAINED_BODY: usize = 64 * 1024;

const CORS_HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Methods",
        "GET, POST, PUT, DELETE, OPTIONS",
    ),
    ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
    ("Access-Control-Max-Age", "3600"),
];

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("connection closed before a request was received")]
    Closed,

    #[error("failed to read request: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Invalid(#[from] ApiError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: String,
    /// Header names are lower-cased.
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn content_length(&self) -> usize {
        self.header("content-length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// Read one request from `reader`.
pub fn read_request<R: Read>(reader: &mut R) -> Result<Request, RequestError> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        if let Some(pos) = find_head_end(&buf) {
            break pos;
        }
        if buf.len() > MAX_HEAD_BYTES {
            return Err(ApiError::HeaderTooLarge.into());
        }
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            if buf.is_empty() {
                return Err(RequestError::Closed);
            }
            return Err(ApiError::BadRequest("unexpected end of request".to_string()).into());
        }
        buf.extend_from_slice(&chunk[..n]);
    };
    if head_end > MAX_HEAD_BYTES {
        return Err(ApiError::HeaderTooLarge.into());
    }

    let head = std::str::from_utf8(&buf[..head_end])
        .map_err(|_| ApiError::BadRequest("request head is not valid UTF-8".to_string()))?;
    let request = parse_head(head)?;

    let already = buf.len() - (head_end + 4);
    let declared = request.content_length();
    if declared > already && declared <= MAX_DRAINED_BODY {
        let mut rest = (&mut *reader).take((declared - already) as u64);
        io::copy(&mut rest, &mut io::sink())?;
    }

    Ok(request)
}

fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn parse_head(head: &str) -> Result<Request, ApiError> {
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();

    let mut parts = request_line.split(' ');
    let (method, target, version) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(t), Some(v), None) if !m.is_empty() && !t.is_empty() => (m, t, v),
        _ => return Err(bad_request("malformed request line")),
    };
    if !version.starts_with("HTTP/1.") {
        return Err(bad_request("unsupported HTTP version"));
    }
    if !method.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(bad_request("malformed request method"));
    }

    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p, q),
        None => (target, ""),
    };
    if !path.starts_with('/') {
        return Err(bad_request("request target must be an absolute path"));
    }

    let mut headers = Vec::new();
    for line in lines {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| bad_request("malformed header line"))?;
        headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
    }

    Ok(Request {
        method: method.to_string(),
        path: path.to_string(),
        query: query.to_string(),
        headers,
    })
}

fn bad_request(reason: &str) -> ApiError {
    ApiError::BadRequest(reason.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn json<T: Serialize>(status: u16, body: &T) -> Self {
        match serde_json::to_vec(body) {
            Ok(mut bytes) => {
                bytes.push(b'\n');
                Self {
                    status,
                    headers: vec![("Content-Type", "application/json".to_string())],
                    body: bytes,
                }
            }
            Err(e) => Self::error(&ApiError::Internal(e.to_string())),
        }
    }

    /// Plain-text error body: the message followed by a newline.
    pub fn error(err: &ApiError) -> Self {
        let mut headers = vec![
            ("Content-Type", "text/plain; charset=utf-8".to_string()),
            ("X-Content-Type-Options", "nosniff".to_string()),
        ];
        if let ApiError::MethodNotAllowed { allowed } = err {
            headers.push(("Allow", allowed.replace(" or ", ", ")));
        }
        Self {
            status: err.status_code(),
            headers,
            body: format!("{err}\n").into_bytes(),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut out = format!("HTTP/1.1 {} {}\r\n", self.status, reason_phrase(self.status));
        for (name, value) in CORS_HEADERS {
            out.push_str(&format!("{name}: {value}\r\n"));
        }
        for (name, value) in &self.headers {
            out.push_str(&format!("{name}: {value}\r\n"));
        }
        out.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        out.push_str("Connection: close\r\n\r\n");

        writer.write_all(out.as_bytes())?;
        writer.write_all(&self.body)?;
        writer.flush()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        431 => "Request Header Fields Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
