use std::borrow::Cow;
use std::io::{BufReader, Read};

use serde::Serialize;

use crate::errors::Result;
use crate::http::{collect_headers, content_length, find_header, read_message, Head, MAX_HEADERS};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// An HTTP response to be sent to a client
#[derive(Debug, Clone)]
pub struct Response {
    /// Status code of the response. Optional because that's what httparse returns, but it
    /// shouldn't happen in practice since we control the responses.
    pub status: Option<u16>,
    /// Headers for the response. It is not necessary to add Content-Length to it, this is done
    /// automatically on serialization.
    pub headers: Vec<(String, String)>,
    /// Raw body of the response, empty when there is none
    pub body: Vec<u8>,
}

impl Response {
    /// Creates an OK (200) response with the given body
    pub fn ok_with_body(str: String) -> Response {
        Response {
            status: Some(200),
            headers: vec![],
            body: str.into_bytes(),
        }
    }

    /// Creates a response carrying `value` serialized as JSON
    pub fn json<T: Serialize>(status: u16, value: &T) -> Result<Response> {
        Ok(Response {
            status: Some(status),
            headers: vec![],
            body: serde_json::to_vec(value)?,
        }
        .with_header(CONTENT_TYPE, JSON_CONTENT_TYPE))
    }

    /// Creates an OK (200) response with raw content of the given type
    pub fn content(content_type: &str, body: Vec<u8>) -> Response {
        Response {
            status: Some(200),
            headers: vec![],
            body,
        }
        .with_header(CONTENT_TYPE, content_type)
    }

    /// Creates an error response without body.
    ///
    /// The code must be in the 4xx or 5xx range.
    pub fn error(code: u16) -> Response {
        assert!((400..600).contains(&code), "Invalid error code");
        Response {
            status: Some(code),
            headers: vec![],
            body: vec![],
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Response {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// The body decoded as UTF-8, with invalid sequences replaced
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Parse an HTTP response from a byte stream
pub fn parse_response<T>(mut buf_reader: BufReader<T>) -> Result<Response>
where
    T: Sized + Read,
{
    let ((status, headers), body) = read_message(&mut buf_reader, |buf| {
        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut resp = httparse::Response::new(&mut headers);
        match resp.parse(buf)? {
            httparse::Status::Complete(parsed_len) => Ok(Some(Head {
                parsed_len,
                body_len: content_length(resp.headers),
                head: (resp.code, collect_headers(resp.headers)),
            })),
            httparse::Status::Partial => Ok(None),
        }
    })?;

    Ok(Response {
        status,
        headers,
        body,
    })
}
