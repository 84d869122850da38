//! `multipart/form-data` body writer.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::error::{self, Errors};
use crate::options::Multipart;

/// Streams form parts into `W`, separated by a random boundary.
///
/// Each part is `--boundary`, its headers, a blank line and the value; the
/// body ends with `--boundary--`.
#[derive(Debug)]
pub struct MultipartWriter<W: Write> {
    writer: W,
    boundary: String,
    parts: usize,
}

impl<W: Write> MultipartWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_boundary(writer, gen_boundary())
    }

    pub fn with_boundary(writer: W, boundary: impl Into<String>) -> Self {
        Self {
            writer,
            boundary: boundary.into(),
            parts: 0,
        }
    }

    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Value for the `Content-Type` header of the finished body.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    fn write_part(&mut self, headers: &[u8], value: &[u8]) -> io::Result<()> {
        if self.parts > 0 {
            self.writer.write_all(b"\r\n")?;
        }
        write!(self.writer, "--{}\r\n", self.boundary)?;
        self.writer.write_all(headers)?;
        self.writer.write_all(b"\r\n\r\n")?;
        self.writer.write_all(value)?;
        self.parts += 1;
        Ok(())
    }

    /// Writes a plain text field.
    ///
    /// # Errors
    ///
    /// Propagates write failures of the underlying writer.
    pub fn write_field(&mut self, name: &str, value: &str) -> io::Result<()> {
        let headers = part_headers(name, None, None);
        self.write_part(&headers, value.as_bytes())
    }

    /// Writes a file part as `application/octet-stream`.
    ///
    /// # Errors
    ///
    /// Propagates write failures of the underlying writer.
    pub fn write_file(
        &mut self,
        field: &str,
        filename: &str,
        contents: &[u8],
    ) -> io::Result<()> {
        let headers = part_headers(field, Some(filename), Some(OCTET_STREAM));
        self.write_part(&headers, contents)
    }

    /// Writes the closing boundary and hands back the writer.
    ///
    /// # Errors
    ///
    /// Propagates write or flush failures of the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.parts > 0 {
            self.writer.write_all(b"\r\n")?;
        }
        write!(self.writer, "--{}--\r\n", self.boundary)?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

const OCTET_STREAM: &str = "application/octet-stream";

/// Four random 64-bit words in hex, joined by dashes.
fn gen_boundary() -> String {
    let a = fastrand::u64(..);
    let b = fastrand::u64(..);
    let c = fastrand::u64(..);
    let d = fastrand::u64(..);

    format!("{a:016x}-{b:016x}-{c:016x}-{d:016x}")
}

/// The `Content-Disposition` line and, for files, the `Content-Type` line.
fn part_headers(name: &str, file_name: Option<&str>, mime: Option<&str>) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"Content-Disposition: form-data; name=\"");
    buf.extend_from_slice(escape(name).as_bytes());
    buf.extend_from_slice(b"\"");

    if let Some(file_name) = file_name {
        buf.extend_from_slice(b"; filename=\"");
        buf.extend_from_slice(escape(file_name).as_bytes());
        buf.extend_from_slice(b"\"");
    }

    if let Some(mime) = mime {
        buf.extend_from_slice(b"\r\nContent-Type: ");
        buf.extend_from_slice(mime.as_bytes());
    }
    buf
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\r', "\\\r")
        .replace('\n', "\\\n")
}

/// An assembled multipart body and its content type.
#[derive(Debug)]
pub struct MultipartBody {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Builds the body for the `multipart` option.
///
/// A file that cannot be opened or read is recorded and skipped; the
/// remaining files and fields are still written. The returned body is `None`
/// only when the writer itself fails.
pub fn encode_multipart(multipart: &Multipart, errors: &mut Errors) -> Option<MultipartBody> {
    let mut writer = MultipartWriter::new(Vec::new());

    for (field, path) in &multipart.files {
        let Some(contents) = read_file(path, errors) else {
            continue;
        };
        if let Err(e) = writer.write_file(field, &file_name(path), &contents) {
            errors.push(error::multipart_close(e));
            return None;
        }
    }

    for (name, value) in &multipart.form_params {
        if let Err(e) = writer.write_field(name, value) {
            errors.push(error::multipart_close(e));
            return None;
        }
    }

    let content_type = writer.content_type();
    match writer.finish() {
        Ok(bytes) => Some(MultipartBody {
            bytes,
            content_type,
        }),
        Err(e) => {
            errors.push(error::multipart_close(e));
            None
        }
    }
}

fn read_file(path: &Path, errors: &mut Errors) -> Option<Vec<u8>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            errors.push(error::file_open(path, e));
            return None;
        }
    };
    let mut contents = Vec::new();
    match file.read_to_end(&mut contents) {
        Ok(_) => Some(contents),
        Err(e) => {
            errors.push(error::file_read(path, e));
            None
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
