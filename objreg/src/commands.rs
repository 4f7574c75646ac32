//! Interactive command dispatcher.
//!
//! Single-key commands on stdin, each mapping 1:1 to a facade call.
//! Runs concurrently with the liveness monitor; the two share the
//! registry client (sticky indices) and the session (alive flag).

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use objreg_client::{RegistryClient, Session};

const HELP: &str = "\
commands:
  l           lookup own address
  g <name>    lookup another object
  d           deregister (suspends heartbeats)
  r           re-register
  a           list all registered objects
  s           replica status
  h           this help
  x           exit";

/// Run the command loop until exit or EOF.
pub async fn run(client: Arc<RegistryClient>, session: Arc<Session>) -> Result<()> {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            // EOF behaves like exit.
            break;
        };
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or("");

        match command {
            "" => {}
            "l" => lookup(&client, session.name()).await,
            "g" => match parts.next() {
                Some(name) => lookup(&client, name).await,
                None => println!("usage: g <name>"),
            },
            "d" => match client.deregister(session.name()).await {
                Ok(()) => {
                    session.mark_deregistered();
                    println!("deregistered; heartbeats suspended");
                }
                Err(e) => println!("deregister failed: {e}"),
            },
            "r" => match client.register(session.identity()).await {
                Ok(endpoint) => {
                    session.mark_registered(&endpoint);
                    println!("registered via {endpoint}");
                }
                Err(e) => println!("register failed: {e}"),
            },
            "a" => match client.list().await {
                Ok(objects) if objects.is_empty() => println!("no objects registered"),
                Ok(objects) => {
                    for o in objects {
                        println!(
                            "{} -> {} ({} {}, {})",
                            o.object_name, o.object_address, o.language, o.version, o.region
                        );
                    }
                }
                Err(e) => println!("list failed: {e}"),
            },
            "s" => status(&client, &session).await,
            "h" | "?" => println!("{HELP}"),
            "x" | "q" | "exit" => break,
            other => println!("unknown command '{other}' (h for help)"),
        }
    }

    Ok(())
}

async fn lookup(client: &RegistryClient, name: &str) {
    match client.lookup(name).await {
        Ok(Some(address)) => println!("{name} -> {address}"),
        Ok(None) => println!("{name}: not found"),
        Err(e) => println!("lookup failed: {e}"),
    }
}

async fn status(client: &RegistryClient, session: &Session) {
    let (business, ping) = client.sticky_endpoints();
    println!(
        "session: {} ({})",
        session.name(),
        if session.is_alive() {
            "alive"
        } else {
            "suspended"
        }
    );
    if let Some(bound) = session.bound_endpoint() {
        println!("last accepted by: {bound}");
    }
    println!("sticky business endpoint: {business}");
    println!("sticky ping endpoint: {ping}");

    for (address, result) in client.uptimes().await {
        match result {
            Ok(info) => println!("{address}: node {} up {}s", info.node_id, info.uptime_sec),
            Err(e) => println!("{address}: unreachable ({e})"),
        }
    }
}
