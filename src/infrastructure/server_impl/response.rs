use crate::domain::encoding::ContentEncoding;
use crate::infrastructure::server_impl::server::Header;
use bytes::{BufMut, Bytes, BytesMut};
use compact_str::CompactString;
use derive_more::Deref;
use fnv::FnvHashMap;
use std::io;
use strum::{EnumMessage, EnumString, IntoStaticStr};

pub const TEXT_PLAIN: &str = "text/plain";
pub const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, IntoStaticStr, EnumString, EnumMessage)]
pub enum StatusCode {
    #[strum(serialize = "200", message = "OK")]
    Ok,
    #[strum(serialize = "201", message = "Created")]
    Created,
    #[strum(serialize = "400", message = "Bad Request")]
    BadRequest,
    #[strum(serialize = "404", message = "Not Found")]
    NotFound,
    #[strum(serialize = "405", message = "Method Not Allowed")]
    MethodNotAllowed,
    #[strum(serialize = "413", message = "Payload Too Large")]
    PayloadTooLarge,
    #[strum(serialize = "500", message = "Internal Server Error")]
    InternalServerError,
}

impl StatusCode {
    pub fn code(self) -> &'static str {
        self.into()
    }

    pub fn reason(self) -> &'static str {
        self.get_message().unwrap_or_default()
    }
}

#[derive(Debug)]
pub struct Response {
    pub headers: FnvHashMap<Header, CompactString>,
    pub status_code: StatusCode,
    pub body: Bytes,
}

impl Response {
    /// A response with no headers and an empty body.
    pub fn from_status_code(value: StatusCode) -> Self {
        Self {
            headers: Default::default(),
            status_code: value,
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, header: Header, value: impl Into<CompactString>) -> Self {
        self.headers.insert(header, value.into());
        self
    }

    /// Attaches `body` along with its `Content-Type` and `Content-Length`.
    pub fn with_payload(self, content_type: &'static str, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        let mut response = self
            .with_header(Header::CONTENT_TYPE, content_type)
            .with_header(Header::CONTENT_LENGTH, compact_str::format_compact!("{}", body.len()));
        response.body = body;
        response
    }

    /// Renders the status line, every header and the body as-is.
    pub fn into_http(self) -> Bytes {
        let head_len = 32 + self
            .headers
            .iter()
            .map(|(name, value)| name.as_str().len() + value.len() + 4)
            .sum::<usize>();
        let mut buf = BytesMut::with_capacity(head_len + self.body.len());

        buf.put_slice(b"HTTP/1.1 ");
        buf.put_slice(self.status_code.code().as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(self.status_code.reason().as_bytes());
        buf.put_slice(b"\r\n");

        for (name, value) in &self.headers {
            buf.put_slice(name.as_str().as_bytes());
            buf.put_slice(b": ");
            buf.put_slice(value.as_bytes());
            buf.put_slice(b"\r\n");
        }

        buf.put_slice(b"\r\n");
        buf.put_slice(&self.body);
        buf.freeze()
    }
}

/// A `200 OK` carrying a `text/plain` payload.
#[derive(Debug, Deref)]
pub struct TextResponse(pub Response);

impl TextResponse {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self(Response::from_status_code(StatusCode::Ok).with_payload(TEXT_PLAIN, body))
    }

    /// Encodes `body` first; `Content-Length` is the length of the encoded bytes.
    pub fn encoded(body: &[u8], encoding: ContentEncoding) -> io::Result<Self> {
        let encoded = encoding.encode(body)?;
        let response = Self::new(encoded).0;

        Ok(Self(match encoding {
            ContentEncoding::Identity => response,
            ContentEncoding::Gzip => response.with_header(Header::CONTENT_ENCODING, "gzip"),
        }))
    }
}
