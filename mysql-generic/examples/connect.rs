//! Opens a connection through the selected Ethernet backend and reads the
//! server greeting.
//!
//! Run with: `cargo run --example connect -- 127.0.0.1 3306`
//!
//! Pick a backend with `--features ethernet3` (or any other backend
//! feature). Set `RUST_LOG=debug` to see the transport logs.

use mysql_generic::prelude::*;
use mysql_generic::transport::selected;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "127.0.0.1".to_string());
    let port: u16 = args.next().as_deref().unwrap_or("3306").parse()?;

    for line in selected::selection_report() {
        println!("[Transport] {}", line);
    }

    let mut client = new_client();
    let connected = client.connect(&host, port).await?;
    println!("[Client] Connected to {}", connected);

    // A MySQL server speaks first: 3-byte length, 1-byte sequence, payload.
    let mut header = [0u8; 4];
    let mut got = 0;
    while got < header.len() {
        let n = client.read(&mut header[got..]).await?;
        if n == 0 {
            println!("[Client] Server closed the connection");
            return Ok(());
        }
        got += n;
    }

    let length = u32::from_le_bytes([header[0], header[1], header[2], 0]) as usize;
    let mut payload = vec![0u8; length];
    let mut got = 0;
    while got < length {
        let n = client.read(&mut payload[got..]).await?;
        if n == 0 {
            break;
        }
        got += n;
    }

    // Protocol version byte, then a NUL-terminated server version string.
    if let Some((&protocol, rest)) = payload[..got].split_first() {
        let version = rest.split(|b| *b == 0).next().unwrap_or_default();
        println!(
            "[Client] Greeting: protocol {} server {}",
            protocol,
            String::from_utf8_lossy(version)
        );
    }

    client.close().await;
    println!("Client stopped");
    Ok(())
}
