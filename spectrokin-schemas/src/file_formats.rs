use crate::command::DeviceCommand;
use serde::Deserialize;

/// A YAML/JSON file holding one or more commands to encode.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CommandFile {
    Batch {
        schema_version: String,
        commands: Vec<DeviceCommand>,
    },
    Single(DeviceCommand),
}

impl CommandFile {
    pub fn into_commands(self) -> Vec<DeviceCommand> {
        match self {
            CommandFile::Batch { commands, .. } => commands,
            CommandFile::Single(command) => vec![command],
        }
    }
}
