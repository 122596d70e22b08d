//! Client for the backend store protocol
//!
//! One connection per exchange: the gateway opens a fresh connection for
//! every operation it forwards, mirroring how the service isolates each
//! request.

use crate::{Result, StoreError};
use depot_proto::line::{ok_payload, read_line, write_line};
use depot_proto::{copy_exact, ProtoError, StoreCommand};
use tokio::io::{AsyncRead, AsyncWrite, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// Client for one backend store service
#[derive(Debug, Clone)]
pub struct StoreClient {
    addr: String,
}

#[derive(Debug)]
struct Wire {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl StoreClient {
    /// Create a client for the store at `addr` (`host:port`)
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// The store's address
    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn connect(&self) -> Result<Wire> {
        let socket = TcpStream::connect(&self.addr).await.map_err(|source| {
            StoreError::Unreachable { addr: self.addr.clone(), source }
        })?;
        let (read_half, write_half) = socket.into_split();
        Ok(Wire {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }

    /// Streams exactly `size` bytes from `body` into the store as
    /// `dest/name`, waiting for the store's acknowledgment.
    pub async fn store<R>(&self, dest: &str, name: &str, size: u64, body: &mut R) -> Result<()>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut wire = self.connect().await?;
        let cmd = StoreCommand::Store {
            dest: dest.to_string(),
            name: name.to_string(),
            size,
        };
        write_line(&mut wire.writer, &cmd.to_string()).await?;
        copy_exact(body, &mut wire.writer, size).await?;
        let reply = read_line(&mut wire.reader).await?;
        ok_payload(&reply)?;
        Ok(())
    }

    /// Requests `dest/name`, returning the declared size and the body
    /// stream for the caller to relay.
    pub async fn fetch(&self, dest: &str, name: &str) -> Result<FetchStream> {
        let cmd = StoreCommand::Fetch { dest: dest.to_string(), name: name.to_string() };
        self.sized_request(&cmd.to_string()).await
    }

    /// Deletes `dest/name` from the store.
    pub async fn delete(&self, dest: &str, name: &str) -> Result<()> {
        let mut wire = self.connect().await?;
        let cmd = StoreCommand::Delete { dest: dest.to_string(), name: name.to_string() };
        write_line(&mut wire.writer, &cmd.to_string()).await?;
        let reply = read_line(&mut wire.reader).await?;
        ok_payload(&reply)?;
        Ok(())
    }

    /// Lists this store's filenames under `dest`, as sorted by the store.
    pub async fn list(&self, dest: &str) -> Result<Vec<String>> {
        let mut wire = self.connect().await?;
        let cmd = StoreCommand::List { dest: dest.to_string() };
        write_line(&mut wire.writer, &cmd.to_string()).await?;
        let reply = read_line(&mut wire.reader).await?;
        let count = parse_size(ok_payload(&reply)?, &reply)?;

        let mut names = Vec::with_capacity(count.min(4096) as usize);
        for _ in 0..count {
            let line = read_line(&mut wire.reader).await?;
            match line.strip_prefix("NAME ") {
                Some(name) => names.push(name.to_string()),
                None => return Err(ProtoError::UnexpectedReply(line).into()),
            }
        }
        Ok(names)
    }

    /// Requests the store's full archive for `ext`, returning the declared
    /// size and the archive stream.
    pub async fn tar_all(&self, ext: &str) -> Result<FetchStream> {
        let cmd = StoreCommand::TarAll { ext: ext.to_string() };
        self.sized_request(&cmd.to_string()).await
    }

    async fn sized_request(&self, command: &str) -> Result<FetchStream> {
        let mut wire = self.connect().await?;
        write_line(&mut wire.writer, command).await?;
        let reply = read_line(&mut wire.reader).await?;
        let size = parse_size(ok_payload(&reply)?, &reply)?;
        Ok(FetchStream { size, wire })
    }
}

/// A declared-length body stream arriving from a store
#[derive(Debug)]
pub struct FetchStream {
    size: u64,
    wire: Wire,
}

impl FetchStream {
    /// The size announced by the store.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Relays the body into `writer`: exactly [`size`](Self::size) bytes, a
    /// shorter stream is a transfer failure.
    pub async fn relay<W>(mut self, writer: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        copy_exact(&mut self.wire.reader, writer, self.size).await?;
        Ok(())
    }
}

fn parse_size(payload: &str, reply: &str) -> Result<u64> {
    payload
        .split_whitespace()
        .next()
        .and_then(|f| f.parse::<u64>().ok())
        .ok_or_else(|| ProtoError::UnexpectedReply(reply.to_string()).into())
}
