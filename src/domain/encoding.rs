//! Content encodings a response body can be sent with.

use std::io::{self, Read, Write};

use bytes::Bytes;
use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};

/// Value of the gzip header OS field for Unix.
const GZIP_OS_UNIX: u8 = 3;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContentEncoding {
    Identity,
    Gzip,
}

impl ContentEncoding {
    /// Picks the encoding from an `Accept-Encoding` value. Only the `gzip` token is honored,
    /// quality values are not interpreted.
    pub fn from_accept_encoding(value: Option<&str>) -> Self {
        let accepts_gzip = value
            .into_iter()
            .flat_map(|v| v.split(','))
            .any(|token| token.trim() == "gzip");

        if accepts_gzip {
            Self::Gzip
        } else {
            Self::Identity
        }
    }

    pub fn encode(self, body: &[u8]) -> io::Result<Bytes> {
        match self {
            Self::Identity => Ok(Bytes::copy_from_slice(body)),
            Self::Gzip => compress(body),
        }
    }
}

/// Compresses `data` into a gzip container with the default level.
///
/// The header carries a zero mtime and the Unix OS byte, so output is deterministic for a given
/// input.
pub fn compress(data: &[u8]) -> io::Result<Bytes> {
    let mut encoder = GzBuilder::new()
        .operating_system(GZIP_OS_UNIX)
        .write(Vec::with_capacity(data.len() + 20), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?.into())
}

pub fn decompress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoded = Vec::new();
    GzDecoder::new(data).read_to_end(&mut decoded)?;
    Ok(decoded)
}
