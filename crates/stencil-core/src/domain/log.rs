use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DomainError;

/// Command executed against every task of a builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    #[default]
    Create,
    Remove,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

impl FromStr for Command {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "remove" => Ok(Self::Remove),
            other => Err(DomainError::InvalidArgument {
                operation: "execute".into(),
                reason: format!("unknown command '{other}'"),
            }),
        }
    }
}

/// One recorded action: `{status, item}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub status: Command,
    pub item: PathBuf,
}

impl LogEntry {
    pub fn new(status: Command, item: impl Into<PathBuf>) -> Self {
        Self {
            status,
            item: item.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_entry_serializes_as_status_and_item() {
        let entry = LogEntry::new(Command::Remove, "classes/Foo.php");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "remove", "item": "classes/Foo.php"})
        );
    }

    #[test]
    fn command_round_trips_through_text() {
        for command in [Command::Create, Command::Remove] {
            assert_eq!(command.to_string().parse::<Command>().unwrap(), command);
        }
        assert!("delete".parse::<Command>().is_err());
    }
}
