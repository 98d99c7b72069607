use std::{
    future::Future,
    io,
    path::PathBuf,
};

use tracing::trace;

/// Where the ledger's JSON lives.
pub trait Backend {
    /// `Ok(None)` means nothing has been written yet.
    fn read(&self) -> impl Future<Output = io::Result<Option<String>>> + Send;

    /// Replaces the stored ledger. Readers never see a partial write.
    fn write(&self, contents: String) -> impl Future<Output = io::Result<()>> + Send;
}

#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(ToOwned::to_owned)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Backend for JsonFile {
    async fn read(&self) -> io::Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn write(&self, contents: String) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, contents).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        trace!(path = ?self.path, "ledger written");

        Ok(())
    }
}

/// Keeps the ledger in memory only.
#[derive(Debug, Default)]
pub struct Memory {
    contents: std::sync::Mutex<Option<String>>,
}

impl Memory {
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: std::sync::Mutex::new(Some(contents.into())),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Backend for Memory {
    async fn read(&self) -> io::Result<Option<String>> {
        Ok(self.contents())
    }

    async fn write(&self, contents: String) -> io::Result<()> {
        *self
            .contents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(contents);
        Ok(())
    }
}
