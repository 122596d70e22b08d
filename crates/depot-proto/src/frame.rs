//! Framed body transfer
//!
//! Every body on the wire is length-prefixed: the exact byte count is
//! announced on the control line before the body, and the receiver consumes
//! exactly that many bytes and no more. This holds whether the source is a
//! local file, a relayed socket, or a freshly built archive.

use crate::{ProtoError, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const COPY_BUF: usize = 64 * 1024;

/// Copies exactly `len` bytes from `reader` to `writer` and flushes.
///
/// A source that ends before `len` bytes is a transfer failure
/// ([`ProtoError::StreamTruncated`]), never a silent end-of-file.
pub async fn copy_exact<R, W>(reader: &mut R, writer: &mut W, len: u64) -> Result<()>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let cap = COPY_BUF.min(len.max(1) as usize);
    let mut buf = vec![0u8; cap];
    let mut left = len;
    while left > 0 {
        let want = buf.len().min(left as usize);
        let n = reader.read(&mut buf[..want]).await?;
        if n == 0 {
            return Err(ProtoError::StreamTruncated { expected: len, got: len - left });
        }
        writer.write_all(&buf[..n]).await?;
        left -= n as u64;
    }
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn copies_exactly_the_declared_length() {
        let data = vec![7u8; 200_000];
        let mut reader: &[u8] = &data;
        let mut out = Vec::new();
        copy_exact(&mut reader, &mut out, 200_000).await.unwrap();
        assert_eq!(out, data);
    }

    #[tokio::test]
    async fn stops_at_the_declared_length() {
        let mut reader: &[u8] = b"hello world";
        let mut out = Vec::new();
        copy_exact(&mut reader, &mut out, 5).await.unwrap();
        assert_eq!(out, b"hello");
        assert_eq!(reader, b" world");
    }

    #[tokio::test]
    async fn short_source_is_truncation_not_eof() {
        let mut reader: &[u8] = b"abc";
        let mut out = Vec::new();
        match copy_exact(&mut reader, &mut out, 10).await {
            Err(ProtoError::StreamTruncated { expected: 10, got: 3 }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn zero_length_body_moves_nothing() {
        let mut reader: &[u8] = b"untouched";
        let mut out = Vec::new();
        copy_exact(&mut reader, &mut out, 0).await.unwrap();
        assert!(out.is_empty());
        assert_eq!(reader, b"untouched");
    }
}
