use std::io::{BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};

use tracing::{debug, error, warn};

use crate::errors::Result;
use crate::http::{parse_request, Request, Response};
use crate::threadpool::ThreadPool;

/// Turn an HTTP status code into its reason phrase
pub fn code_to_string(code: u16) -> &'static str {
    match code {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// This is the main server.
///
/// It listens for incomming connections on a TCP socket, parses the requests and dispatches them
/// to a handler. Whatever the handler produces is then converted in an HTTP response and sent
/// back to the client.
pub struct HttpServer {
    listener: TcpListener,
}

impl HttpServer {
    /// Create a new server listening on the given address
    pub fn new(addr: &str) -> Result<Self> {
        Ok(HttpServer {
            listener: TcpListener::bind(addr)?,
        })
    }

    /// Address the server actually listens on, useful when binding port 0
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Start the server
    ///
    /// Calls the handler with the incoming requests. Uses a threadpool internally to handle the
    /// requests concurrently on as many threads as the system can handle.
    ///
    /// This function is blocking, with no real way of stopping it (except the socket being
    /// forcefully closed by the OS or the program being killed)
    pub fn serve<F>(&self, handler: F)
    where
        F: Fn(Request) -> Response + Send + Sync + 'static + Clone,
    {
        let threadpool = ThreadPool::new(
            std::thread::available_parallelism()
                .map(|x| x.into())
                .unwrap_or(4),
        );
        for stream in self.listener.incoming() {
            match stream {
                Ok(mut stream) => {
                    let handler = handler.clone();
                    threadpool.execute(move || handle_stream(&mut stream, &handler))
                }
                Err(err) => warn!("Failed to accept connection: {}", err),
            }
        }
    }

    /// Utility function for one-shot servers.
    ///
    /// This is mostly for testing, it listens to a single connection, processes the
    /// request and exit.
    pub fn serve_once<F>(&self, handler: F)
    where
        F: Fn(Request) -> Response,
    {
        match self.listener.accept() {
            Ok((mut stream, _)) => handle_stream(&mut stream, &handler),
            Err(err) => warn!("Failed to accept connection: {}", err),
        }
    }
}

/// Parse an HTTP request from a TCP stream, calls the handler and write back the answer
fn handle_stream<F>(mut stream: &mut TcpStream, handler: F)
where
    F: Fn(Request) -> Response,
{
    let buf_reader = BufReader::new(&mut stream);
    match parse_request(buf_reader) {
        Ok(req) => {
            debug!(method = %req.method, path = %req.path, "Request received");
            respond(stream, handler(req))
        }
        Err(err) => {
            debug!("Unreadable request: {}", err);
            respond(stream, Response::error(400))
        }
    }
}

/// Serialize the status line and headers of a response
fn response_head(resp: &Response) -> String {
    let code = resp.status.unwrap_or(500);
    format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n",
        code,
        code_to_string(code),
        resp.body.len(),
        resp.headers
            .iter()
            .map(|(k, v)| format!("{}: {}\r\n", k, v))
            .collect::<Vec<_>>()
            .join(""),
    )
}

/// Writes an HTTP response to a stream
fn respond(stream: &mut TcpStream, resp: Response) {
    let status = stream
        .write_all(response_head(&resp).as_bytes())
        .and_then(|_| stream.write_all(&resp.body))
        .and_then(|_| stream.flush());

    if let Err(err) = status {
        error!("Failed to respond: {}", err);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_code_to_string() {
        assert_eq!(code_to_string(200), "OK");
        assert_eq!(code_to_string(404), "Not Found");
        assert_eq!(code_to_string(418), "Unknown");
    }

    #[test]
    fn test_response_head() {
        let resp = Response::ok_with_body("[]".to_string()).with_header("Content-Type", "application/json");
        assert_eq!(
            response_head(&resp),
            "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\nContent-Type: application/json\r\n\r\n"
        );
    }
}
