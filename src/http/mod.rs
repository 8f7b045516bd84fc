pub mod server;
pub use server::*;

pub mod request;
pub use request::*;

pub mod response;
pub use response::*;

pub mod client;
pub use client::*;

use std::io::Read;

use crate::errors::{Error, Result};

/// Size of the chunks read from the socket
const CHUNK_SIZE: usize = 4096;

/// Maximum number of headers accepted in a message
pub(crate) const MAX_HEADERS: usize = 64;

/// Largest start line plus headers accepted, in bytes
pub const MAX_HEAD_LEN: usize = 64 * 1024;

/// Largest body accepted, in bytes. Bigger Content-Length values are refused before reading.
pub const MAX_BODY_LEN: usize = 1024 * 1024;

/// Start line and headers of a message, as extracted by one of the httparse parsers
pub(crate) struct Head<H> {
    /// Number of bytes taken by the start line and headers
    pub parsed_len: usize,
    /// Value of the Content-Length header, 0 when absent
    pub body_len: usize,
    pub head: H,
}

/// Read a full HTTP message (request or response) from a byte stream
///
/// `parse_head` is called on everything received so far until it reports a complete head.
/// The body is then read according to Content-Length. Anything sent past the body is
/// dropped, which is fine as long as connections carry a single message. Messages whose head
/// or body exceed `MAX_HEAD_LEN` or `MAX_BODY_LEN` are refused with `Error::BadRequest`.
pub(crate) fn read_message<R, H, F>(reader: &mut R, mut parse_head: F) -> Result<(H, Vec<u8>)>
where
    R: Read,
    F: FnMut(&[u8]) -> Result<Option<Head<H>>>,
{
    let mut chunk = [0; CHUNK_SIZE];
    let mut buf = Vec::new();

    let Head {
        parsed_len,
        body_len,
        head,
    } = loop {
        let bytes_read = reader.read(&mut chunk)?;
        if bytes_read == 0 {
            return Err(Error::ConnectionReset);
        }
        buf.extend_from_slice(&chunk[..bytes_read]);
        if let Some(head) = parse_head(&buf)? {
            break head;
        }
        if buf.len() > MAX_HEAD_LEN {
            return Err(Error::BadRequest(format!(
                "Headers longer than {} bytes",
                MAX_HEAD_LEN
            )));
        }
    };

    if body_len > MAX_BODY_LEN {
        return Err(Error::BadRequest(format!(
            "Body of {} bytes exceeds the {} bytes limit",
            body_len, MAX_BODY_LEN
        )));
    }

    while buf.len() - parsed_len < body_len {
        let bytes_read = reader.read(&mut chunk)?;
        if bytes_read == 0 {
            return Err(Error::ConnectionReset);
        }
        buf.extend_from_slice(&chunk[..bytes_read]);
    }

    Ok((head, buf[parsed_len..parsed_len + body_len].to_vec()))
}

/// Copy httparse headers into owned name/value pairs
pub(crate) fn collect_headers(headers: &[httparse::Header]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|h| {
            (
                h.name.to_string(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect()
}

/// Value of the Content-Length header, if present and valid
pub(crate) fn content_length(headers: &[httparse::Header]) -> usize {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case("Content-Length"))
        .and_then(|length| String::from_utf8_lossy(length.value).trim().parse::<usize>().ok())
        .unwrap_or(0)
}

/// Case insensitive lookup in a list of headers
pub fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
