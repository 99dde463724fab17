//! In-process stand-in for the OpenGOAL compiler REPL.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use super::protocol::{RequestHeader, HEADER_LEN};

pub const GREETING: &str = "Connected to OpenGOAL v0.2.14 nREPL!\n";

/// Recorded, then the peer closes the connection without answering.
pub const HANGUP_FORM: &str = "(:exit)";

/// Read one framed request; `None` once the client hangs up.
pub async fn read_form<S: AsyncRead + Unpin>(stream: &mut S) -> Option<String> {
    let mut header = [0u8; HEADER_LEN];
    stream.read_exact(&mut header).await.ok()?;
    let header = RequestHeader::decode(&header)?;

    let mut payload = vec![0u8; header.length as usize];
    stream.read_exact(&mut payload).await.ok()?;
    Some(String::from_utf8_lossy(&payload).into_owned())
}

/// `(+ a b)` and `(* a b)` evaluate; anything else answers `ok`.
fn evaluate(form: &str) -> String {
    let inner = form.trim_start_matches('(').trim_end_matches(')');
    let parts: Vec<&str> = inner.split_whitespace().collect();

    if let [op, a, b] = parts.as_slice() {
        if let (Ok(a), Ok(b)) = (a.parse::<i64>(), b.parse::<i64>()) {
            match *op {
                "+" => return format!("{}\n", a + b),
                "*" => return format!("{}\n", a * b),
                _ => {}
            }
        }
    }
    "ok\n".to_string()
}

#[derive(Clone, Default)]
pub struct FakeRepl {
    forms: Arc<Mutex<Vec<String>>>,
}

impl FakeRepl {
    /// Serve one stream, answering every form.
    pub fn spawn<S>(stream: S, greeting: Option<&str>) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let repl = Self::default();
        repl.serve(stream, greeting.map(str::to_string), true);
        repl
    }

    /// Serve one stream, recording forms but never answering.
    pub fn spawn_silent<S>(stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let repl = Self::default();
        repl.serve(stream, None, false);
        repl
    }

    /// Accept loopback TCP connections, greeting each with `greeting`.
    pub async fn listen(greeting: &str) -> (Self, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let repl = Self::default();

        let server = repl.clone();
        let greeting = greeting.to_string();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                server.serve(stream, Some(greeting.clone()), true);
            }
        });

        (repl, port)
    }

    fn serve<S>(&self, mut stream: S, greeting: Option<String>, respond: bool)
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let forms = Arc::clone(&self.forms);
        tokio::spawn(async move {
            if let Some(greeting) = greeting {
                if stream.write_all(greeting.as_bytes()).await.is_err() {
                    return;
                }
            }

            while let Some(form) = read_form(&mut stream).await {
                let hang_up = form == HANGUP_FORM;
                let reply = evaluate(&form);
                forms.lock().await.push(form);
                if hang_up {
                    return;
                }
                if respond && stream.write_all(reply.as_bytes()).await.is_err() {
                    return;
                }
            }
        });
    }

    pub async fn forms(&self) -> Vec<String> {
        self.forms.lock().await.clone()
    }

    /// Forms that delivered items, in arrival order.
    pub async fn delivered_symbols(&self) -> Vec<String> {
        self.forms()
            .await
            .iter()
            .filter_map(|f| f.strip_prefix("(ap-item-received! '"))
            .map(|s| s.trim_end_matches(')').to_string())
            .collect()
    }
}
