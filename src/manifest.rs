//! The plain-text index written next to a playlist's downloads.

use crate::error::Result;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

pub const MANIFEST_FILE: &str = "playlist.txt";

/// Append-only list of `<url> - <title>` lines, one per attempted item.
///
/// Every line is flushed as soon as it is written, so the file reflects the
/// attempted items even if the run dies half way.
#[derive(Debug)]
pub struct PlaylistManifest {
    path: PathBuf,
    file: File,
    lines: usize,
}

impl PlaylistManifest {
    /// Creates (or truncates) `playlist.txt` inside `directory`.
    pub async fn create(directory: &Path) -> Result<Self> {
        let path = directory.join(MANIFEST_FILE);
        let file = File::create(&path).await?;
        Ok(Self {
            path,
            file,
            lines: 0,
        })
    }

    pub async fn append(&mut self, url: &str, title: &str) -> Result<()> {
        let line = format!("{} - {}\n", url, title);
        self.file.write_all(line.as_bytes()).await?;
        self.file.flush().await?;
        self.lines += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }

    /// Syncs the file to disk and closes it.
    pub async fn close(self) -> Result<PathBuf> {
        self.file.sync_all().await?;
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn lines_are_written_in_order() {
        let dir = TempDir::new().unwrap();
        let mut manifest = PlaylistManifest::create(dir.path()).await.unwrap();
        manifest.append("https://x/1", "One").await.unwrap();
        manifest.append("https://x/2", "Two: the sequel").await.unwrap();
        assert_eq!(manifest.len(), 2);

        // Readable before close.
        let early = std::fs::read_to_string(manifest.path()).unwrap();
        assert_eq!(early.lines().count(), 2);

        let path = manifest.close().await.unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content, "https://x/1 - One\nhttps://x/2 - Two: the sequel\n");
    }
}
