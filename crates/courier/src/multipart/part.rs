use std::fmt;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncRead, AsyncWrite};

use super::writer::FormWriter;
use crate::effects::BoxReader;
use crate::error::{Error, Result};

/// One named contribution to a multipart body.
pub enum Part {
    /// In-memory text field.
    Field { name: String, value: String },

    /// File read from disk at assembly time. The filename sent is the last
    /// component of `path`.
    File { name: String, path: PathBuf },

    /// Caller-supplied stream. The reader is consumed, then dropped, when
    /// this part is rendered.
    Stream {
        name:     String,
        filename: String,
        reader:   BoxReader,
    },
}

impl Part {
    pub fn field(name: impl Into<String>, value: impl Into<String>) -> Self {
        Part::Field {
            name:  name.into(),
            value: value.into(),
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Part::File {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn stream<R>(name: impl Into<String>, filename: impl Into<String>, reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Part::Stream {
            name:     name.into(),
            filename: filename.into(),
            reader:   Box::pin(reader),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Part::Field { name, .. } | Part::File { name, .. } | Part::Stream { name, .. } => name,
        }
    }

    pub(crate) async fn render<W>(self, form: &mut FormWriter<'_, W>) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        match self {
            Part::Field { name, value } => form.write_field(&name, &value).await?,
            Part::File { name, path } => {
                let mut file = tokio::fs::File::open(&path)
                    .await
                    .map_err(|source| Error::OpenPart {
                        path: path.clone(),
                        source,
                    })?;
                form.write_file(&name, &base_name(&path), &mut file).await?;
            }
            Part::Stream {
                name,
                filename,
                mut reader,
            } => {
                form.write_file(&name, &filename, &mut reader).await?;
            }
        }
        Ok(())
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl fmt::Debug for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Part::Field { name, value } => f
                .debug_struct("Part::Field")
                .field("name", name)
                .field("value", value)
                .finish(),
            Part::File { name, path } => f
                .debug_struct("Part::File")
                .field("name", name)
                .field("path", path)
                .finish(),
            Part::Stream { name, filename, .. } => f
                .debug_struct("Part::Stream")
                .field("name", name)
                .field("filename", filename)
                .finish_non_exhaustive(),
        }
    }
}
