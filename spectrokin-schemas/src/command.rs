use serde::{Deserialize, Serialize};

/// Commands understood by the electrochemical accessory.
///
/// Voltages are in volts, scan rates in V/s, durations and intervals in
/// seconds, frequency in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeviceCommand {
    Led {
        on: bool,
    },
    Handshake,
    Cv {
        start_voltage: f32,
        vertex1: f32,
        vertex2: f32,
        scan_rate: f32,
        cycles: u8,
    },
    Lsv {
        start_voltage: f32,
        end_voltage: f32,
        scan_rate: f32,
    },
    Swv {
        start_voltage: f32,
        end_voltage: f32,
        amplitude: f32,
        frequency: f32,
    },
    Amp {
        voltage: f32,
        duration: f32,
        interval: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Led,
    Handshake,
    Cv,
    Lsv,
    Swv,
    Amp,
}

impl DeviceCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            DeviceCommand::Led { .. } => CommandKind::Led,
            DeviceCommand::Handshake => CommandKind::Handshake,
            DeviceCommand::Cv { .. } => CommandKind::Cv,
            DeviceCommand::Lsv { .. } => CommandKind::Lsv,
            DeviceCommand::Swv { .. } => CommandKind::Swv,
            DeviceCommand::Amp { .. } => CommandKind::Amp,
        }
    }
}

/// A decoded telemetry reply: one data point streamed back during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub x: f32,
    pub y: f32,
}
