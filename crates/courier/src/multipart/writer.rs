//! `multipart/form-data` framing over any async writer.

use std::fmt::Write as _;
use std::io;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use super::part::Part;
use crate::core::escape_quotes;
use crate::error::Result;

const FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// Writes parts one after another, then the closing delimiter.
pub(crate) struct FormWriter<'a, W> {
    out:      &'a mut W,
    boundary: &'a str,
    started:  bool,
}

impl<'a, W> FormWriter<'a, W>
where
    W: AsyncWrite + Unpin,
{
    pub(crate) fn new(out: &'a mut W, boundary: &'a str) -> Self {
        Self {
            out,
            boundary,
            started: false,
        }
    }

    pub(crate) async fn write_field(&mut self, name: &str, value: &str) -> io::Result<()> {
        self.open_part(name, None).await?;
        self.out.write_all(value.as_bytes()).await
    }

    pub(crate) async fn write_file<R>(
        &mut self,
        name: &str,
        filename: &str,
        content: &mut R,
    ) -> io::Result<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        self.open_part(name, Some(filename)).await?;
        tokio::io::copy(content, &mut *self.out).await
    }

    /// Write the closing delimiter and flush.
    pub(crate) async fn finish(self) -> io::Result<()> {
        let tail = format!("\r\n--{}--\r\n", self.boundary);
        self.out.write_all(tail.as_bytes()).await?;
        self.out.flush().await
    }

    async fn open_part(&mut self, name: &str, filename: Option<&str>) -> io::Result<()> {
        let mut head = String::with_capacity(128);
        if self.started {
            head.push_str("\r\n");
        }
        self.started = true;

        let _ = write!(
            head,
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"",
            self.boundary,
            escape_quotes(name)
        );
        if let Some(filename) = filename {
            let _ = write!(head, "; filename=\"{}\"", escape_quotes(filename));
        }
        head.push_str("\r\n");
        if filename.is_some() {
            let _ = write!(head, "Content-Type: {FILE_CONTENT_TYPE}\r\n");
        }
        head.push_str("\r\n");

        self.out.write_all(head.as_bytes()).await
    }
}

/// Render `parts` in order, followed by the terminator.
///
/// The terminator is only written once every part rendered successfully.
pub(crate) async fn write_form<W>(out: &mut W, boundary: &str, parts: Vec<Part>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut form = FormWriter::new(out, boundary);
    for part in parts {
        part.render(&mut form).await?;
    }
    form.finish().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(parts: Vec<Part>) -> String {
        let mut out = Vec::new();
        write_form(&mut out, "testbound", parts).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn single_field() {
        let body = render(vec![Part::field("foo", "bar")]).await;
        assert_eq!(
            body,
            "--testbound\r\nContent-Disposition: form-data; name=\"foo\"\r\n\r\nbar\r\n--testbound--\r\n"
        );
    }

    #[tokio::test]
    async fn parts_are_separated_by_delimiters() {
        let body = render(vec![
            Part::field("a", "1"),
            Part::stream("b", "b.txt", &b"two"[..]),
        ])
        .await;
        assert_eq!(
            body,
            [
                "--testbound",
                "Content-Disposition: form-data; name=\"a\"",
                "",
                "1",
                "--testbound",
                "Content-Disposition: form-data; name=\"b\"; filename=\"b.txt\"",
                "Content-Type: application/octet-stream",
                "",
                "two",
                "--testbound--",
                "",
            ]
            .join("\r\n")
        );
    }

    #[tokio::test]
    async fn no_parts_still_terminates() {
        assert_eq!(render(Vec::new()).await, "\r\n--testbound--\r\n");
    }

    #[tokio::test]
    async fn quotes_in_names_are_escaped() {
        let body = render(vec![Part::field("say \"hi\"", "x")]).await;
        assert!(body.contains("name=\"say \\\"hi\\\"\""));
    }
}
