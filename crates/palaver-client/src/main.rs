//! Interactive console client for the Palaver chat server.
//!
//! Duplexes two line streams: keyboard input is forwarded verbatim to the
//! socket, and every line from the server is printed with a `Server: `
//! prefix. The literal input `/quit` is sent and then the process exits.

use std::io::Write;

use anyhow::Context;
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LinesCodec};

use palaver_proto::constants::{DEFAULT_MAX_LINE_LEN, DEFAULT_SERVER_ADDR};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let addr = std::env::var("PALAVER_SERVER_ADDR")
        .unwrap_or_else(|_| DEFAULT_SERVER_ADDR.to_string());

    print!("Enter your nickname: ");
    std::io::stdout().flush()?;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let nickname = stdin
        .next_line()
        .await?
        .context("stdin closed before a nickname was entered")?
        .trim()
        .to_string();

    let stream = TcpStream::connect(&addr)
        .await
        .with_context(|| format!("Error connecting to server at {addr}"))?;
    let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(DEFAULT_MAX_LINE_LEN));

    // Identify ourselves before entering the duplex loop.
    framed.send(format!("/nickname {nickname}")).await?;

    loop {
        tokio::select! {
            input = stdin.next_line() => {
                let Some(input) = input? else {
                    // Keyboard input closed; nothing more to send.
                    break;
                };

                if input.trim() == "/quit" {
                    println!("Disconnecting from server...");
                    framed.send("/quit".to_string()).await?;
                    break;
                }

                framed.send(input).await?;
            }

            message = framed.next() => {
                match message {
                    Some(Ok(line)) => println!("Server: {line}"),
                    Some(Err(_)) | None => {
                        println!("Disconnected from the server.");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}
