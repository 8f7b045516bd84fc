use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Default address the client talks to
///
/// Matches the default port of the server. The server itself binds on every interface, see
/// `config::ServerConfig`.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:3000";

/// Errors that can occur when parsing the command line arguments
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CLIError {
    #[error("Invalid target format. Should be <host>:<port>")]
    InvalidUrlFormat,
    #[error("Missing parameter '{0}'")]
    MissingParameter(&'static str),
    #[error("Invalid parameter '{0}'")]
    InvalidParameter(String),
}

fn address_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9\.\-]+:\d{1,5}$").unwrap())
}

fn item_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)(?:[xX](\d+))?$").unwrap())
}

/// Validate the format of the TCP address provided by the user
///
/// Returns its input if the address is in the format <host>:<port>, otherwise InvalidUrlFormat
pub fn validate_address(url: &str) -> std::result::Result<&str, CLIError> {
    if address_regex().is_match(url) {
        Ok(url)
    } else {
        Err(CLIError::InvalidUrlFormat)
    }
}

/// Parse an item given on the command line as `<id>` or `<id>x<quantity>`
pub fn parse_item_spec(spec: &str) -> std::result::Result<(u32, u32), CLIError> {
    let invalid = || CLIError::InvalidParameter(spec.to_string());
    let captures = item_regex().captures(spec).ok_or_else(invalid)?;
    let id = captures[1].parse::<u32>().map_err(|_| invalid())?;
    let quantity = match captures.get(2) {
        Some(qty) => qty.as_str().parse::<u32>().map_err(|_| invalid())?,
        None => 1,
    };
    if quantity == 0 {
        return Err(invalid());
    }
    Ok((id, quantity))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validate_address() {
        assert_eq!(validate_address("127.0.0.1:3000"), Ok("127.0.0.1:3000"));
        assert_eq!(validate_address("localhost:80"), Ok("localhost:80"));
        assert_eq!(validate_address("menu"), Err(CLIError::InvalidUrlFormat));
        assert_eq!(
            validate_address("localhost:123456"),
            Err(CLIError::InvalidUrlFormat)
        );
    }

    #[test]
    fn test_parse_item_spec() {
        assert_eq!(parse_item_spec("13"), Ok((13, 1)));
        assert_eq!(parse_item_spec("1x2"), Ok((1, 2)));
        assert_eq!(parse_item_spec("4X3"), Ok((4, 3)));
        assert!(parse_item_spec("1x0").is_err());
        assert!(parse_item_spec("burger").is_err());
        assert!(parse_item_spec("-1").is_err());
    }
}
