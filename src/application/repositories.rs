use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;

/// Read and create files under one base directory.
#[derive(Clone, Debug)]
pub struct FileRepository {
    base: Arc<Path>,
}

impl FileRepository {
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().into(),
        }
    }

    /// Joins `name` onto the base directory. Names that are empty or that would leave the
    /// directory (`..`, absolute paths) resolve to nothing.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let stays_inside = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

        if name.is_empty() || !stays_inside {
            return None;
        }
        Some(self.base.join(relative))
    }

    pub async fn read(&self, name: &str) -> io::Result<Bytes> {
        let path = self.resolve(name).ok_or_else(|| outside_base(name))?;
        tokio::fs::read(path).await.map(Bytes::from)
    }

    /// Creates the file, or truncates an existing one, and writes `contents`.
    pub async fn write(&self, name: &str, contents: &[u8]) -> io::Result<()> {
        let path = self.resolve(name).ok_or_else(|| outside_base(name))?;
        tokio::fs::write(path, contents).await
    }
}

fn outside_base(name: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("`{name}` does not name a file inside the served directory"),
    )
}
