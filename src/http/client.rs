use std::io::{BufReader, Write};
use std::net::TcpStream;

use crate::errors::Result;
use crate::http::{parse_response, Response, JSON_CONTENT_TYPE};

/// Simple HTTP client
///
/// It sends HTTP requests from a set of parameters, then parses and yields the server response.
pub struct HttpClient {
    stream: TcpStream,
    host: String,
}

impl HttpClient {
    /// Create a new client connected to the given server.
    ///
    /// An error is returned if the connection cannot be made for whatever reason
    pub fn new(server: &str) -> Result<Self> {
        Ok(HttpClient {
            stream: TcpStream::connect(server)?,
            host: server.to_string(),
        })
    }

    /// Send an HTTP request on the open connection.
    ///
    /// The server closes the connection after each response, so drop the client once the
    /// response is retrieved.
    pub fn send(&mut self, method: &str, endpoint: &str, body: &str) -> Result<Response> {
        let content_type = if body.is_empty() {
            String::new()
        } else {
            format!("Content-Type: {}\r\n", JSON_CONTENT_TYPE)
        };
        self.stream.write_all(
            format!(
                "{} {} HTTP/1.1\r\nHost: {}\r\n{}Content-Length: {}\r\n\r\n{}",
                method,
                endpoint,
                self.host,
                content_type,
                body.len(),
                body
            )
            .as_bytes(),
        )?;

        let buf_reader = BufReader::new(&mut self.stream);
        parse_response(buf_reader)
    }
}
