//! Bytecode image serialization using `MessagePack`.
//!
//! An image is a compiled [`Code`] buffer plus a format version. Images are
//! position dependent: jump targets and closure bodies are absolute offsets,
//! so an image always runs from offset 0 in an empty session.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use bytelisp_foundation::{Error, ErrorKind, Result};
use bytelisp_language::Code;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current image format version.
pub const IMAGE_VERSION: u32 = 1;

/// Failures specific to bytecode images.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The image could not be encoded.
    #[error("failed to encode image: {0}")]
    Encode(String),

    /// The bytes are not a valid image.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// The image was written by an incompatible version.
    #[error("unsupported image version {found} (expected {expected})")]
    Version {
        /// Version found in the image.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },

    /// Reading or writing the image file failed.
    #[error("{action} '{path}': {message}")]
    Io {
        /// What was being attempted.
        action: &'static str,
        /// File involved.
        path: String,
        /// Underlying error.
        message: String,
    },
}

impl From<ImageError> for Error {
    fn from(e: ImageError) -> Self {
        match e {
            ImageError::Io { .. } => Error::new(ErrorKind::Io(e.to_string())),
            _ => Error::new(ErrorKind::Serialization(e.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Image {
    version: u32,
    code: Code,
}

#[derive(Serialize)]
struct ImageRef<'a> {
    version: u32,
    code: &'a Code,
}

/// Serializes compiled code to bytes using `MessagePack` format.
///
/// Uses named serialization to preserve struct field names.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_bytes(code: &Code) -> Result<Vec<u8>> {
    let image = ImageRef {
        version: IMAGE_VERSION,
        code,
    };
    rmp_serde::to_vec_named(&image).map_err(|e| ImageError::Encode(e.to_string()).into())
}

/// Deserializes compiled code from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not an image or the version differs.
pub fn from_bytes(bytes: &[u8]) -> Result<Code> {
    let image: Image =
        rmp_serde::from_slice(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;
    if image.version != IMAGE_VERSION {
        return Err(ImageError::Version {
            found: image.version,
            expected: IMAGE_VERSION,
        }
        .into());
    }
    Ok(image.code)
}

/// Saves compiled code to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does.
///
/// # Errors
///
/// Returns an error if the file cannot be written or serialization fails.
pub fn save_to_file<P: AsRef<Path>>(code: &Code, path: P) -> Result<()> {
    let path = path.as_ref();
    let io_error = |action, e: std::io::Error| ImageError::Io {
        action,
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let bytes = to_bytes(code)?;
    let file = File::create(path).map_err(|e| io_error("failed to create file", e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&bytes)
        .map_err(|e| io_error("failed to write to file", e))?;
    writer
        .flush()
        .map_err(|e| io_error("failed to flush file", e))?;
    Ok(())
}

/// Loads compiled code from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid image.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Code> {
    let path = path.as_ref();
    let io_error = |action, e: std::io::Error| ImageError::Io {
        action,
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let file = File::open(path).map_err(|e| io_error("failed to open file", e))?;
    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| io_error("failed to read file", e))?;
    from_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytelisp_language::compile;

    fn fib_code() -> Code {
        compile("(def fib (fn (n) (if (< n 2) n (+ (fib (- n 1)) (fib (- n 2)))))) (fib 10)")
            .unwrap()
    }

    #[test]
    fn bytes_preserve_code() {
        let code = fib_code();
        let bytes = to_bytes(&code).unwrap();
        assert_eq!(from_bytes(&bytes).unwrap(), code);
    }

    #[test]
    fn garbage_is_a_serialization_error() {
        let err = from_bytes(&[0xc1, 0x00]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Serialization(_)));
    }

    #[test]
    fn version_is_checked() {
        let image = Image {
            version: IMAGE_VERSION + 1,
            code: Code::new(),
        };
        let bytes = rmp_serde::to_vec_named(&image).unwrap();
        let err = from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("unsupported image version 2"));
    }

    #[test]
    fn file_round_trip() {
        let path = std::env::temp_dir().join(format!("bytelisp-image-{}.blc", std::process::id()));
        let code = fib_code();
        save_to_file(&code, &path).unwrap();
        let loaded = load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, code);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_from_file("/nonexistent/bytelisp/image.blc").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Io(_)));
        assert!(err.to_string().contains("failed to open file"));
    }
}
