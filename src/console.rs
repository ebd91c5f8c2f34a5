//! Line-oriented operator console. Each stdin line becomes one host event:
//!
//! ```text
//! connect <nick>          a client connects
//! service <nick>          a service pseudo-client is introduced
//! killed                  a client is killed before the hook runs
//! burst start|end         a netjoin burst begins or ends
//! <account> <service> <COMMAND> [args]
//! ```

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;

use crate::message::{HostEvent, Session, User};

pub fn parse_line(line: &str) -> Option<HostEvent> {
    let mut words = line.split_whitespace();
    let first = words.next()?;

    match first.to_lowercase().as_str() {
        "connect" => Some(HostEvent::UserAdd(Some(User::client(words.next()?)))),
        "service" => Some(HostEvent::UserAdd(Some(User::service(words.next()?)))),
        "killed" => Some(HostEvent::UserAdd(None)),
        "burst" => match words.next()?.to_lowercase().as_str() {
            "start" => Some(HostEvent::BurstStart),
            "end" => Some(HostEvent::BurstEnd),
            _ => None,
        },
        _ => {
            let service = words.next()?;
            let command = words.next()?;
            let args = words.collect::<Vec<_>>().join(" ");
            Some(HostEvent::Command {
                session: Session {
                    nick: first.to_string(),
                    account: Some(first.to_string()),
                },
                service: service.to_lowercase(),
                command: command.to_string(),
                args,
            })
        }
    }
}

/// Feed stdin lines into `tx` until EOF.
pub async fn run(tx: UnboundedSender<HostEvent>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse_line(trimmed) {
            Some(event) => {
                if tx.send(event).is_err() {
                    log::warn!("Services stopped, closing console");
                    break;
                }
            }
            None => log::warn!("Unrecognised console line: {}", trimmed),
        }
    }

    log::info!("Console input closed");
    Ok(())
}
