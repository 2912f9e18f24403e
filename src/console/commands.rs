use crate::error::DhtError;
use crate::membership::node::Node;

pub const HELP: &str = "\
Available commands:
  join <addr>         Join the DHT at <addr>
  leave               Leave the current DHT
  query <addr> <key>  Query the DHT at <addr> for the given <key>
  peers               Show this node's peer table
  state               Show this node's state
  keys                Show how many keys this node holds
  exit                Exit the CLI";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Join { addr: String },
    Leave,
    Query { addr: String, key: String },
    Peers,
    State,
    Keys,
    Exit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("unknown command: {0}")]
    Unknown(String),
}

/// What the console should do after a command ran.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Print(String),
    Exit,
}

/// Parses one console line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let mut parts = line.split_whitespace();
    let Some(name) = parts.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = parts.collect();

    let command = match name {
        "help" => Command::Help,
        "join" => match args.as_slice() {
            [addr, ..] => Command::Join {
                addr: addr.to_string(),
            },
            [] => return Err(CommandError::Usage("join <addr>")),
        },
        "leave" => Command::Leave,
        "query" => match args.as_slice() {
            [addr, key, ..] => Command::Query {
                addr: addr.to_string(),
                key: key.to_string(),
            },
            _ => return Err(CommandError::Usage("query <addr> <key>")),
        },
        "peers" => Command::Peers,
        "state" => Command::State,
        "keys" => Command::Keys,
        "exit" => Command::Exit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

pub async fn execute(node: &Node, command: Command) -> Result<Reply, DhtError> {
    match command {
        Command::Help => Ok(Reply::Print(HELP.to_string())),
        Command::Join { addr } => {
            let peers = node.join(&addr).await?;
            Ok(Reply::Print(format!("joined; {} peers", peers.len())))
        }
        Command::Leave => {
            node.leave().await?;
            Ok(Reply::Print("left".to_string()))
        }
        Command::Query { addr, key } => match node.query(&addr, &key).await? {
            Some(value) => Ok(Reply::Print(value)),
            None => Ok(Reply::Print(format!("{} not found", key))),
        },
        Command::Peers => {
            let lines: Vec<String> = node
                .peer_table()
                .await
                .peers()
                .into_iter()
                .map(|peer| format!("{}\t{}", peer.id, peer.addr))
                .collect();
            Ok(Reply::Print(lines.join("\n")))
        }
        Command::State => Ok(Reply::Print(node.state().await.to_string())),
        Command::Keys => Ok(Reply::Print(node.store().len().to_string())),
        Command::Exit => Ok(Reply::Exit),
    }
}
