//! Binary primitives shared by the table writer and reader.
//!
//! Two serializers cover the whole file format: `u64` (8 bytes, little-endian)
//! and `bstr` (u64 length prefix, then the raw bytes). Any sequence written
//! with the encoders decodes with the decoders in the same order; the only
//! failure mode is short I/O, surfaced as the underlying `io::Error`.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Result as IoResult, Seek, SeekFrom, Write};

/// Size of the footer in bytes: a single u64 index start offset.
pub const FOOTER_BYTES: u64 = 8;

/// Writes an unsigned 64-bit integer as exactly 8 little-endian bytes.
pub fn write_u64<W: Write>(w: &mut W, value: u64) -> IoResult<()> {
    w.write_u64::<LittleEndian>(value)
}

/// Reads an unsigned 64-bit integer written with [`write_u64`].
pub fn read_u64<R: Read>(r: &mut R) -> IoResult<u64> {
    r.read_u64::<LittleEndian>()
}

/// Writes a byte string as its u64 length followed by the bytes themselves.
pub fn write_bstr<W: Write>(w: &mut W, bytes: &[u8]) -> IoResult<()> {
    write_u64(w, bytes.len() as u64)?;
    w.write_all(bytes)
}

/// Reads a byte string written with [`write_bstr`].
///
/// The buffer grows as bytes arrive rather than being pre-sized from the
/// length prefix, so a corrupt prefix cannot demand an absurd allocation; a
/// prefix that overruns the file yields `UnexpectedEof`.
pub fn read_bstr<R: Read>(r: &mut R) -> IoResult<Vec<u8>> {
    let len = read_u64(r)?;
    let mut buf = Vec::new();
    r.take(len).read_to_end(&mut buf)?;
    if buf.len() as u64 != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "byte string length prefix overruns the file",
        ));
    }
    Ok(buf)
}

/// Writes the table footer: the byte offset where the index begins.
pub fn write_footer<W: Write>(w: &mut W, index_start: u64) -> IoResult<()> {
    write_u64(w, index_start)
}

/// Reads the footer from the last 8 bytes of `r`.
///
/// Returns `(index_start, file_len)`; the cursor ends at EOF. Callers are
/// responsible for validating `index_start` against `file_len`.
pub fn read_footer<R: Read + Seek>(r: &mut R) -> IoResult<(u64, u64)> {
    let file_len = r.seek(SeekFrom::End(0))?;
    if file_len < FOOTER_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "file too small to contain a footer",
        ));
    }
    r.seek(SeekFrom::Start(file_len - FOOTER_BYTES))?;
    let index_start = read_u64(r)?;
    Ok((index_start, file_len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn u64_round_trip() {
        let mut buf = Vec::new();
        write_u64(&mut buf, 0).unwrap();
        write_u64(&mut buf, 42).unwrap();
        write_u64(&mut buf, u64::MAX).unwrap();

        let mut r = Cursor::new(buf);
        assert_eq!(read_u64(&mut r).unwrap(), 0);
        assert_eq!(read_u64(&mut r).unwrap(), 42);
        assert_eq!(read_u64(&mut r).unwrap(), u64::MAX);
    }

    #[test]
    fn u64_is_little_endian() {
        let mut buf = Vec::new();
        write_u64(&mut buf, 1).unwrap();
        assert_eq!(buf, vec![1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn bstr_round_trip() {
        let mut buf = Vec::new();
        write_bstr(&mut buf, b"hello").unwrap();
        write_bstr(&mut buf, b"").unwrap();
        write_bstr(&mut buf, &[0x00, 0xFF]).unwrap();

        let mut r = Cursor::new(buf);
        assert_eq!(read_bstr(&mut r).unwrap(), b"hello");
        assert_eq!(read_bstr(&mut r).unwrap(), b"");
        assert_eq!(read_bstr(&mut r).unwrap(), vec![0x00, 0xFF]);
    }

    #[test]
    fn mixed_sequence_round_trip() {
        let mut buf = Vec::new();
        write_u64(&mut buf, 2).unwrap();
        write_bstr(&mut buf, b"key").unwrap();
        write_u64(&mut buf, 99).unwrap();

        let mut r = Cursor::new(buf);
        assert_eq!(read_u64(&mut r).unwrap(), 2);
        assert_eq!(read_bstr(&mut r).unwrap(), b"key");
        assert_eq!(read_u64(&mut r).unwrap(), 99);
    }

    #[test]
    fn truncated_bstr_is_an_error() {
        let mut buf = Vec::new();
        write_bstr(&mut buf, b"full payload").unwrap();
        buf.truncate(buf.len() - 3);

        let mut r = Cursor::new(buf);
        let err = read_bstr(&mut r).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn oversized_length_prefix_is_an_error() {
        let mut buf = Vec::new();
        write_u64(&mut buf, u64::MAX).unwrap();
        buf.extend_from_slice(b"short");

        let mut r = Cursor::new(buf);
        assert!(read_bstr(&mut r).is_err());
    }

    #[test]
    fn footer_round_trip() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"some data region");
        write_footer(&mut buf, 16).unwrap();

        let mut r = Cursor::new(buf);
        let (index_start, file_len) = read_footer(&mut r).unwrap();
        assert_eq!(index_start, 16);
        assert_eq!(file_len, 24);
    }

    #[test]
    fn footer_on_too_small_file_is_an_error() {
        let mut r = Cursor::new(vec![0u8; 5]);
        assert!(read_footer(&mut r).is_err());
    }
}
