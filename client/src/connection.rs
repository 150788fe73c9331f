use anyhow::{Context, Result};
use futures_util::lock::Mutex;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf};
use tokio::net::TcpStream;

use catchline_protocol::OutboundEnvelope;

use crate::error::SessionError;

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Open the TCP stream to the engine
pub async fn open(address: &str) -> Result<TcpStream> {
    let stream = TcpStream::connect(address)
        .await
        .with_context(|| format!("Failed to connect to {}", address))?;
    stream
        .set_nodelay(true)
        .with_context(|| "Failed to configure socket")?;
    tracing::info!(address, "connected to battle engine");
    Ok(stream)
}

/// Write half of the transport
///
/// Every write takes the lock for the whole line, so commands from concurrent
/// callers never interleave on the wire.
pub(crate) struct Connection {
    writer: Mutex<BoxedWriter>,
}

impl Connection {
    /// Split a stream; the read half goes to the read loop
    pub(crate) fn split<S>(stream: S) -> (Self, ReadHalf<S>)
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        let connection = Self {
            writer: Mutex::new(Box::new(writer)),
        };
        (connection, reader)
    }

    /// Write one envelope line.
    ///
    /// `before_write` runs once the line is serialized and the writer is held, so
    /// whatever it records is ordered exactly like the wire and ahead of any reply.
    pub(crate) async fn send(
        &self,
        envelope: &OutboundEnvelope,
        before_write: impl FnOnce(),
    ) -> Result<(), SessionError> {
        let line = envelope.to_line()?;
        let mut writer = self.writer.lock().await;
        before_write();
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }

    pub(crate) async fn shutdown(&self) -> std::io::Result<()> {
        self.writer.lock().await.shutdown().await
    }
}
