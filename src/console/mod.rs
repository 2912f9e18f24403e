//! Interactive Console
//!
//! Line-oriented operator console on stdin. Each command maps to one node
//! operation; errors are printed and the loop continues.

pub mod commands;

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::membership::node::Node;
use commands::{execute, parse, Reply};

/// Reads commands until `exit` or end of input.
pub async fn run(node: Arc<Node>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Type 'help' for commands.");

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("[ERROR] {}", e);
                continue;
            }
        };

        match execute(&node, command).await {
            Ok(Reply::Print(text)) => println!("{}", text),
            Ok(Reply::Exit) => {
                tracing::info!("Exiting...");
                break;
            }
            Err(e) => {
                tracing::warn!("Console command failed: {}", e);
                println!("[ERROR] {}", e);
            }
        }
    }

    Ok(())
}
