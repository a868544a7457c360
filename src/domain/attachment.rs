use crate::error::Result;
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// An uploaded file staged in an anonymous temporary file.
///
/// The backing file has no directory entry; the operating system reclaims it
/// as soon as this value is dropped, on every exit path of the request.
#[derive(Debug)]
pub struct AttachmentRef {
    /// Form field the file was submitted under.
    pub field: String,
    /// Original filename as given by the client.
    pub filename: String,
    pub size: u64,
    file: File,
}

impl AttachmentRef {
    /// Creates an empty staged file to be filled with [`AttachmentRef::append`].
    pub async fn create(field: impl Into<String>, filename: impl Into<String>) -> Result<Self> {
        let file = tokio::task::spawn_blocking(tempfile::tempfile)
            .await
            .map_err(std::io::Error::other)??;
        Ok(Self {
            field: field.into(),
            filename: filename.into(),
            size: 0,
            file: File::from_std(file),
        })
    }

    /// Stages `content` in one go.
    pub async fn stage(
        field: impl Into<String>,
        filename: impl Into<String>,
        content: &[u8],
    ) -> Result<Self> {
        let mut attachment = Self::create(field, filename).await?;
        attachment.append(content).await?;
        Ok(attachment)
    }

    pub async fn append(&mut self, chunk: &[u8]) -> Result<()> {
        self.file.write_all(chunk).await?;
        self.size += chunk.len() as u64;
        Ok(())
    }

    /// Reads the whole staged content back.
    pub async fn read_all(&mut self) -> Result<Vec<u8>> {
        self.file.flush().await?;
        self.file.seek(SeekFrom::Start(0)).await?;
        let mut content = Vec::with_capacity(self.size as usize);
        self.file.read_to_end(&mut content).await?;
        Ok(content)
    }
}
