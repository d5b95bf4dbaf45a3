use std::str::FromStr;

use fnv::FnvHashMap;
use memchr::memmem;
use strum::{EnumString, IntoStaticStr};

use crate::domain::errors::ParseError;
use crate::infrastructure::server_impl::request::Request;

const CRLF: &str = "\r\n";
const HEAD_SEPARATOR: &[u8] = b"\r\n\r\n";

/// Header names this server reads or writes. Names are matched exactly as spelled here.
#[allow(clippy::upper_case_acronyms, non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, IntoStaticStr)]
#[non_exhaustive]
pub enum Header {
    #[strum(serialize = "Accept-Encoding")]
    ACCEPT_ENCODING,
    #[strum(serialize = "Content-Encoding")]
    CONTENT_ENCODING,
    #[strum(serialize = "Content-Length")]
    CONTENT_LENGTH,
    #[strum(serialize = "Content-Type")]
    CONTENT_TYPE,
    #[strum(serialize = "User-Agent")]
    USER_AGENT,
}

impl Header {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

#[allow(clippy::upper_case_acronyms, non_camel_case_types)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum Method {
    CONNECT,
    DELETE,
    GET,
    HEAD,
    OPTIONS,
    PATCH,
    POST,
    PUT,
    TRACE,
}

/// Returns a [Request] borrowing from `request`.
///
/// The whole message is expected to be in `request`: the head must be terminated by an empty
/// line and, when `Content-Length` is sent, at least that many body bytes must follow it. Errors
/// for which [ParseError::is_incomplete] holds mean the caller may read more and try again.
pub fn parse_http(request: &[u8]) -> Result<Request<'_>, ParseError> {
    let head_end = memmem::find(request, HEAD_SEPARATOR).ok_or(ParseError::MissingSeparator)?;
    let head = &request[..head_end];
    let (request_line, header_block) = match memmem::find(head, CRLF.as_bytes()) {
        Some(idx) => (&head[..idx], &head[idx + CRLF.len()..]),
        None => (head, &[][..]),
    };
    let request_line =
        std::str::from_utf8(request_line).map_err(|_| ParseError::NonUtf8RequestLine)?;

    let mut tokens = request_line.split_ascii_whitespace();
    let (Some(method), Some(resource)) = (tokens.next(), tokens.next()) else {
        return Err(ParseError::MalformedRequestLine);
    };
    let method =
        Method::from_str(method).map_err(|_| ParseError::UnknownMethod(method.into()))?;

    let mut headers = FnvHashMap::default();
    for line in header_lines(header_block).filter(|line| !line.is_empty()) {
        // Lines that are not utf-8 are dropped; the rest of the request still parses.
        let Ok(line) = std::str::from_utf8(line) else {
            tracing::debug!("skipping header line that is not utf-8");
            continue;
        };
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ParseError::MalformedHeader(line.into()))?;
        headers.insert(name, value.trim());
    }

    let rest = &request[head_end + HEAD_SEPARATOR.len()..];
    let body = match headers.get(Header::CONTENT_LENGTH.as_str()) {
        Some(length) => {
            let declared = Some(*length)
                .filter(|l| !l.is_empty() && l.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|l| usize::from_str(l).ok())
                .ok_or_else(|| ParseError::InvalidContentLength((*length).into()))?;
            rest.get(..declared).ok_or(ParseError::IncompleteBody {
                declared,
                available: rest.len(),
            })?
        }
        None => rest,
    };

    Ok(Request {
        method,
        resource,
        headers,
        body,
    })
}

fn header_lines(block: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = Some(block);
    std::iter::from_fn(move || {
        let current = rest?;
        match memmem::find(current, CRLF.as_bytes()) {
            Some(idx) => {
                rest = Some(&current[idx + CRLF.len()..]);
                Some(&current[..idx])
            }
            None => rest.take(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_with_body() {
        let sample = b"POST /somepath HTTP/1.1\r\nHost: ifconfig.me\r\nUser-Agent: curl/8.5.0\r\nAccept: */*\r\nContent-Type: text/html; charset=ISO-8859-4\r\nContent-Length: 16\r\n\r\n{\"json_key\": 10}";

        let request = parse_http(sample).unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.resource, "/somepath");
        assert_eq!(
            request.header(Header::CONTENT_TYPE),
            Some("text/html; charset=ISO-8859-4")
        );
        assert_eq!(request.body, br#"{"json_key": 10}"#);
    }

    #[test]
    fn success_without_body() {
        let sample = b"GET /somepath HTTP/1.1\r\nHost: ifconfig.me\r\nUser-Agent: curl/8.5.0\r\nAccept: */*\r\n\r\n";

        let request = parse_http(sample).unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.resource, "/somepath");
        assert_eq!(request.headers.get("Host"), Some(&"ifconfig.me"));
        assert_eq!(request.header(Header::USER_AGENT), Some("curl/8.5.0"));
        assert!(request.body.is_empty());
    }

    #[test]
    fn success_without_headers() {
        let request = parse_http(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.resource, "/");
        assert!(request.headers.is_empty());
        assert!(request.body.is_empty());
    }

    #[test]
    fn success_content_length_cuts_body() {
        let request =
            parse_http(b"POST /files/a HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello trailing").unwrap();
        assert_eq!(request.body, b"hello");
    }

    #[test]
    fn success_body_without_content_length_takes_the_rest() {
        let request = parse_http(b"POST /files/a HTTP/1.1\r\nHost: x\r\n\r\nall of it").unwrap();
        assert_eq!(request.body, b"all of it");
    }

    #[test]
    fn success_binary_body() {
        let mut sample = b"POST /files/bin HTTP/1.1\r\nContent-Length: 4\r\n\r\n".to_vec();
        sample.extend_from_slice(&[0x00, 0xff, 0x0d, 0x0a]);

        let request = parse_http(&sample).unwrap();
        assert_eq!(request.body, &[0x00u8, 0xff, 0x0d, 0x0a]);
    }

    #[test]
    fn success_header_values_trimmed_and_last_wins() {
        let request = parse_http(
            b"GET / HTTP/1.1\r\nX-Thing:   first  \r\nX-Thing: second\r\nTime: 12:30:00\r\n\r\n",
        )
        .unwrap();
        assert_eq!(request.headers.get("X-Thing"), Some(&"second"));
        assert_eq!(request.headers.get("Time"), Some(&"12:30:00"));
    }

    #[test]
    fn success_header_names_are_case_sensitive() {
        let request = parse_http(b"GET / HTTP/1.1\r\nuser-agent: lower\r\n\r\n").unwrap();
        assert_eq!(request.header(Header::USER_AGENT), None);
        assert_eq!(request.headers.get("user-agent"), Some(&"lower"));
    }

    #[test]
    fn success_non_utf8_header_line_is_skipped() {
        let request =
            parse_http(b"GET / HTTP/1.1\r\nUser-Agent: caf\xe9\r\nHost: x\r\n\r\n").unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.resource, "/");
        assert_eq!(request.header(Header::USER_AGENT), None);
        assert_eq!(request.headers.get("Host"), Some(&"x"));
    }

    #[test]
    fn fail_non_utf8_request_line() {
        assert_eq!(
            parse_http(b"GET /caf\xe9 HTTP/1.1\r\n\r\n").unwrap_err(),
            ParseError::NonUtf8RequestLine
        );
    }

    #[test]
    fn fail_malformed_request_line() {
        assert_eq!(
            parse_http(b"GET\r\nHost: x\r\n\r\n").unwrap_err(),
            ParseError::MalformedRequestLine
        );
    }

    #[test]
    fn fail_unknown_method() {
        assert_eq!(
            parse_http(b"BREW /pot HTTP/1.1\r\n\r\n").unwrap_err(),
            ParseError::UnknownMethod("BREW".into())
        );
    }

    #[test]
    fn fail_missing_separator_is_incomplete() {
        let err = parse_http(b"GET / HTTP/1.1\r\nHost: x\r\n").unwrap_err();
        assert_eq!(err, ParseError::MissingSeparator);
        assert!(err.is_incomplete());
    }

    #[test]
    fn fail_header_without_colon() {
        assert_eq!(
            parse_http(b"GET / HTTP/1.1\r\nnonsense\r\n\r\n").unwrap_err(),
            ParseError::MalformedHeader("nonsense".into())
        );
    }

    #[test]
    fn fail_non_numeric_content_length() {
        let err = parse_http(b"POST / HTTP/1.1\r\nContent-Length: ten\r\n\r\n").unwrap_err();
        assert_eq!(err, ParseError::InvalidContentLength("ten".into()));
        assert!(!err.is_incomplete());

        let err = parse_http(b"POST / HTTP/1.1\r\nContent-Length: -1\r\n\r\n").unwrap_err();
        assert_eq!(err, ParseError::InvalidContentLength("-1".into()));

        let err = parse_http(b"POST / HTTP/1.1\r\nContent-Length: +5\r\n\r\nhello").unwrap_err();
        assert_eq!(err, ParseError::InvalidContentLength("+5".into()));

        let err = parse_http(b"POST / HTTP/1.1\r\nContent-Length:\r\n\r\n").unwrap_err();
        assert_eq!(err, ParseError::InvalidContentLength("".into()));
    }

    #[test]
    fn fail_declared_length_exceeds_available() {
        let err = parse_http(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nshort").unwrap_err();
        assert_eq!(
            err,
            ParseError::IncompleteBody {
                declared: 10,
                available: 5
            }
        );
        assert!(err.is_incomplete());
    }
}
