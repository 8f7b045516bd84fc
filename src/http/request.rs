use std::io::{BufReader, Read};

use crate::errors::Result;
use crate::http::{collect_headers, content_length, find_header, read_message, Head, MAX_HEADERS};

/// Represents an HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method used in the request
    pub method: String,
    /// The full target of the request, query string included
    pub path: String,
    /// Headers of the request
    pub headers: Vec<(String, String)>,
    /// Body of the request
    pub body: String,
}

impl Request {
    /// Create a new request from scratch
    pub fn new(method: &str, path: &str, headers: Vec<(String, String)>, body: String) -> Request {
        Request {
            method: method.to_string(),
            path: path.to_string(),
            headers,
            body,
        }
    }

    /// Create a new GET request for the given path, with an empty body
    pub fn get(path: &str) -> Request {
        Request::new("GET", path, vec![], String::new())
    }

    /// Create a new POST request for the given path, with the given body
    pub fn post(path: &str, body: String) -> Request {
        Request::new("POST", path, vec![], body)
    }

    /// The path without its query string, which is what routing works on
    pub fn route_path(&self) -> &str {
        self.path
            .split_once('?')
            .map_or(self.path.as_str(), |(path, _)| path)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Parse an HTTP request from a byte stream
///
/// Reads until the head is complete, then reads as many body bytes as Content-Length
/// announces. A stream closed before that is an error.
pub fn parse_request<T>(mut buf_reader: BufReader<T>) -> Result<Request>
where
    T: Sized + Read,
{
    let ((method, path, headers), body) = read_message(&mut buf_reader, |buf| {
        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut req = httparse::Request::new(&mut headers);
        match req.parse(buf)? {
            httparse::Status::Complete(parsed_len) => Ok(Some(Head {
                parsed_len,
                body_len: content_length(req.headers),
                head: (
                    req.method.unwrap_or("GET").to_string(),
                    req.path.unwrap_or("/").to_string(),
                    collect_headers(req.headers),
                ),
            })),
            httparse::Status::Partial => Ok(None),
        }
    })?;

    Ok(Request {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    })
}
