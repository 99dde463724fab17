//! Single-flight request channel to the compiler REPL
//!
//! The REPL has no request ids, so a response can only be attributed to a
//! request if nothing else is in flight. Every exchange holds the stream
//! lock from write to read.
//!
//! Response policy: any bytes before the timeout are a response, and a
//! timeout is also accepted, since many forms produce no output at all.
//! Only a socket error or end-of-stream counts as failure. Callers that
//! need certainty must verify out of band.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, trace};

use super::protocol::{encode_request, RESPONSE_BUFFER_SIZE};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Response(String),
    /// Nothing arrived in time; treated as success.
    TimedOut,
}

impl SendOutcome {
    pub fn response(&self) -> Option<&str> {
        match self {
            SendOutcome::Response(text) => Some(text),
            SendOutcome::TimedOut => None,
        }
    }
}

pub struct ReplTransport<S = TcpStream> {
    stream: Mutex<S>,
    response_timeout: Duration,
}

impl<S> ReplTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, response_timeout: Duration) -> Self {
        Self {
            stream: Mutex::new(stream),
            response_timeout,
        }
    }

    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    /// Read whatever the peer sent unprompted (the greeting).
    ///
    /// Unlike a request, a silent peer here is an error.
    pub async fn read_unprompted(&self, wait: Duration) -> Result<String> {
        let mut stream = self.stream.lock().await;
        match read_response(&mut *stream, wait).await? {
            SendOutcome::Response(text) => Ok(text),
            SendOutcome::TimedOut => Err(Error::TransportTimeout(wait)),
        }
    }

    /// Send a form and wait up to the default timeout for its response.
    pub async fn send(&self, form: &str) -> Result<SendOutcome> {
        self.send_with_timeout(form, self.response_timeout).await
    }

    pub async fn send_with_timeout(&self, form: &str, wait: Duration) -> Result<SendOutcome> {
        let message = encode_request(form)?;

        let mut stream = self.stream.lock().await;
        stream.write_all(&message).await?;
        stream.flush().await?;
        trace!(form, "sent form");

        let outcome = read_response(&mut *stream, wait).await?;
        if outcome == SendOutcome::TimedOut {
            debug!(form, ?wait, "no response from REPL; assuming success");
        }
        Ok(outcome)
    }

    /// Send a form without waiting for a response.
    pub async fn send_only(&self, form: &str) -> Result<()> {
        let message = encode_request(form)?;

        let mut stream = self.stream.lock().await;
        stream.write_all(&message).await?;
        stream.flush().await?;
        trace!(form, "sent form (no response expected)");
        Ok(())
    }

    pub async fn shutdown(&self) -> Result<()> {
        let mut stream = self.stream.lock().await;
        stream.shutdown().await?;
        Ok(())
    }
}

async fn read_response<S>(stream: &mut S, wait: Duration) -> Result<SendOutcome>
where
    S: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; RESPONSE_BUFFER_SIZE];

    match timeout(wait, stream.read(&mut buffer)).await {
        Err(_) => Ok(SendOutcome::TimedOut),
        Ok(Ok(0)) => Err(Error::EmptyResponse),
        Ok(Ok(n)) => Ok(SendOutcome::Response(
            String::from_utf8_lossy(&buffer[..n]).into_owned(),
        )),
        Ok(Err(e)) => Err(Error::Io(e)),
    }
}
