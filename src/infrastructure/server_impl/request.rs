use crate::infrastructure::server_impl::server::{Header, Method};
use fnv::FnvHashMap;

/// A parsed request, borrowing everything from the buffer it was read into.
#[derive(Debug)]
pub struct Request<'a> {
    pub method: Method,
    pub resource: &'a str,
    /// Names are kept as received and matched exactly; a repeated name keeps its last value.
    pub headers: FnvHashMap<&'a str, &'a str>,
    pub body: &'a [u8],
}

impl<'a> Request<'a> {
    pub fn header(&self, name: Header) -> Option<&'a str> {
        self.headers.get(name.as_str()).copied()
    }
}
