//! Binary command packets for the electrochemical accessory.
//!
//! Every packet is a fixed-length buffer framed by [`HEADER`] and [`FOOTER`].
//! Floating parameters are little-endian IEEE-754 singles at fixed offsets,
//! the cycle count is a single byte, and any bytes between the last parameter
//! and the footer are zero. The layouts are a compatibility contract with the
//! device firmware.
//!
//! Telemetry replies arrive as base64 text and carry two floats at offsets 4
//! and 8.

use crate::error::SpectroKinError;
use base64::prelude::*;
use byteorder::{ByteOrder, LittleEndian};
use log::debug;
use spectrokin_schemas::command::{CommandKind, DeviceCommand, Telemetry};
use std::collections::HashMap;

pub const HEADER: u8 = 0x6B;
pub const FOOTER: u8 = 0x8F;

pub const LED_COMMAND_ID: u8 = 0x0C;
pub const SCAN_COMMAND_ID: u8 = 0x01;

pub const LED_PACKET_LEN: usize = 5;
pub const HANDSHAKE_PACKET_LEN: usize = 4;
pub const CV_PACKET_LEN: usize = 31;
pub const LSV_PACKET_LEN: usize = 29;
pub const SWV_PACKET_LEN: usize = 29;
pub const AMP_PACKET_LEN: usize = 27;

/// The two fixed buffers of the handshake, sent in this order.
pub const HANDSHAKE_PACKETS: [[u8; HANDSHAKE_PACKET_LEN]; 2] =
    [[HEADER, 0x67, 0x01, FOOTER], [HEADER, 0x66, 0x01, FOOTER]];

/// Offset of the first parameter in scan packets.
const PAYLOAD_OFFSET: usize = 4;
const CV_CYCLES_OFFSET: usize = 20;

pub const TELEMETRY_X_OFFSET: usize = 4;
pub const TELEMETRY_Y_OFFSET: usize = 8;
pub const MIN_TELEMETRY_LEN: usize = 12;

/// How much of a telemetry frame is validated before it is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodeMode {
    /// Only the length is checked.
    #[default]
    Lenient,
    /// Header at offset 0 and footer as the last byte must also match.
    Strict,
}

/// Receiving end of encoded packets, normally the USB serial transport.
pub trait PacketSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SpectroKinError>;
}

impl PacketSink for Vec<Vec<u8>> {
    fn write(&mut self, bytes: &[u8]) -> Result<(), SpectroKinError> {
        self.push(bytes.to_vec());
        Ok(())
    }
}

pub fn create_led_command(on: bool) -> [u8; LED_PACKET_LEN] {
    [HEADER, LED_COMMAND_ID, u8::from(on), 0x00, FOOTER]
}

pub fn create_cv_command(
    start_voltage: f32,
    vertex1: f32,
    vertex2: f32,
    scan_rate: f32,
    cycles: u8,
) -> Vec<u8> {
    let mut buf = scan_packet(CV_PACKET_LEN);
    write_floats(&mut buf, &[start_voltage, vertex1, vertex2, scan_rate]);
    buf[CV_CYCLES_OFFSET] = cycles;
    buf
}

pub fn create_lsv_command(start_voltage: f32, end_voltage: f32, scan_rate: f32) -> Vec<u8> {
    let mut buf = scan_packet(LSV_PACKET_LEN);
    write_floats(&mut buf, &[start_voltage, end_voltage, scan_rate]);
    buf
}

pub fn create_swv_command(
    start_voltage: f32,
    end_voltage: f32,
    amplitude: f32,
    frequency: f32,
) -> Vec<u8> {
    let mut buf = scan_packet(SWV_PACKET_LEN);
    write_floats(&mut buf, &[start_voltage, end_voltage, amplitude, frequency]);
    buf
}

pub fn create_amp_command(voltage: f32, duration: f32, interval: f32) -> Vec<u8> {
    let mut buf = scan_packet(AMP_PACKET_LEN);
    write_floats(&mut buf, &[voltage, duration, interval]);
    buf
}

/// Encodes a command into the packet(s) that carry it. Only the handshake
/// produces more than one packet.
pub fn encode(command: &DeviceCommand) -> Vec<Vec<u8>> {
    match *command {
        DeviceCommand::Led { on } => vec![create_led_command(on).to_vec()],
        DeviceCommand::Handshake => HANDSHAKE_PACKETS.iter().map(|p| p.to_vec()).collect(),
        DeviceCommand::Cv {
            start_voltage,
            vertex1,
            vertex2,
            scan_rate,
            cycles,
        } => vec![create_cv_command(start_voltage, vertex1, vertex2, scan_rate, cycles)],
        DeviceCommand::Lsv {
            start_voltage,
            end_voltage,
            scan_rate,
        } => vec![create_lsv_command(start_voltage, end_voltage, scan_rate)],
        DeviceCommand::Swv {
            start_voltage,
            end_voltage,
            amplitude,
            frequency,
        } => vec![create_swv_command(start_voltage, end_voltage, amplitude, frequency)],
        DeviceCommand::Amp {
            voltage,
            duration,
            interval,
        } => vec![create_amp_command(voltage, duration, interval)],
    }
}

/// Encodes `command` and writes each packet to `sink` in order.
pub fn send_command<S: PacketSink>(sink: &mut S, command: &DeviceCommand) -> Result<(), SpectroKinError> {
    for packet in encode(command) {
        debug!("Sending {:?} packet: {}", command.kind(), to_hex(&packet));
        sink.write(&packet)?;
    }
    Ok(())
}

/// Builds a command from the name/value map produced by a parameter form.
///
/// Boolean and integer parameters are given as numbers: `on` is true when
/// non-zero, `cycles` must be a whole number in `0..=255`.
pub fn command_from_params(
    kind: CommandKind,
    params: &HashMap<String, f64>,
) -> Result<DeviceCommand, SpectroKinError> {
    let get = |name: &str| -> Result<f64, SpectroKinError> {
        params
            .get(name)
            .copied()
            .ok_or_else(|| SpectroKinError::MissingParameter(name.to_string(), format!("{:?}", kind)))
    };
    let get_f32 = |name: &str| get(name).map(|v| v as f32);

    let command = match kind {
        CommandKind::Led => DeviceCommand::Led { on: get("on")? != 0.0 },
        CommandKind::Handshake => DeviceCommand::Handshake,
        CommandKind::Cv => {
            let cycles = get("cycles")?;
            if cycles.fract() != 0.0 || !(0.0..=255.0).contains(&cycles) {
                return Err(SpectroKinError::InvalidParameter("cycles".to_string(), cycles));
            }
            DeviceCommand::Cv {
                start_voltage: get_f32("start_voltage")?,
                vertex1: get_f32("vertex1")?,
                vertex2: get_f32("vertex2")?,
                scan_rate: get_f32("scan_rate")?,
                cycles: cycles as u8,
            }
        }
        CommandKind::Lsv => DeviceCommand::Lsv {
            start_voltage: get_f32("start_voltage")?,
            end_voltage: get_f32("end_voltage")?,
            scan_rate: get_f32("scan_rate")?,
        },
        CommandKind::Swv => DeviceCommand::Swv {
            start_voltage: get_f32("start_voltage")?,
            end_voltage: get_f32("end_voltage")?,
            amplitude: get_f32("amplitude")?,
            frequency: get_f32("frequency")?,
        },
        CommandKind::Amp => DeviceCommand::Amp {
            voltage: get_f32("voltage")?,
            duration: get_f32("duration")?,
            interval: get_f32("interval")?,
        },
    };
    Ok(command)
}

/// Decodes a base64 telemetry payload.
pub fn decode_telemetry(payload: &str, mode: DecodeMode) -> Result<Telemetry, SpectroKinError> {
    let bytes = BASE64_STANDARD.decode(payload.trim())?;
    decode_telemetry_bytes(&bytes, mode)
}

pub fn decode_telemetry_bytes(bytes: &[u8], mode: DecodeMode) -> Result<Telemetry, SpectroKinError> {
    if bytes.len() < MIN_TELEMETRY_LEN {
        return Err(SpectroKinError::MalformedPacket(format!(
            "expected at least {} bytes, got {}",
            MIN_TELEMETRY_LEN,
            bytes.len()
        )));
    }
    if mode == DecodeMode::Strict {
        if bytes[0] != HEADER {
            return Err(SpectroKinError::MalformedPacket(format!(
                "bad header byte 0x{:02X}",
                bytes[0]
            )));
        }
        let last = bytes[bytes.len() - 1];
        if last != FOOTER {
            return Err(SpectroKinError::MalformedPacket(format!(
                "bad footer byte 0x{:02X}",
                last
            )));
        }
    }

    Ok(Telemetry {
        x: LittleEndian::read_f32(&bytes[TELEMETRY_X_OFFSET..TELEMETRY_X_OFFSET + 4]),
        y: LittleEndian::read_f32(&bytes[TELEMETRY_Y_OFFSET..TELEMETRY_Y_OFFSET + 4]),
    })
}

/// Space-separated upper-case hex, e.g. `6B 0C 01 00 8F`.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A zeroed scan packet with header, command id and footer in place.
fn scan_packet(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    buf[0] = HEADER;
    buf[1] = SCAN_COMMAND_ID;
    buf[len - 1] = FOOTER;
    buf
}

fn write_floats(buf: &mut [u8], values: &[f32]) {
    for (i, value) in values.iter().enumerate() {
        let offset = PAYLOAD_OFFSET + 4 * i;
        LittleEndian::write_f32(&mut buf[offset..offset + 4], *value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_led_command() {
        assert_eq!(create_led_command(true), [0x6B, 0x0C, 0x01, 0x00, 0x8F]);
        assert_eq!(create_led_command(false), [0x6B, 0x0C, 0x00, 0x00, 0x8F]);
    }

    #[test]
    fn test_handshake_packets() {
        let packets = encode(&DeviceCommand::Handshake);
        assert_eq!(packets, vec![vec![0x6B, 0x67, 0x01, 0x8F], vec![0x6B, 0x66, 0x01, 0x8F]]);
    }

    #[test]
    fn test_cv_layout() {
        let buf = create_cv_command(-0.5, 0.8, -0.2, 0.1, 3);

        assert_eq!(buf.len(), 31);
        assert_eq!(&buf[0..4], &[0x6B, 0x01, 0x00, 0x00]);
        assert_eq!(&buf[4..8], &(-0.5f32).to_le_bytes());
        assert_eq!(&buf[8..12], &0.8f32.to_le_bytes());
        assert_eq!(&buf[12..16], &(-0.2f32).to_le_bytes());
        assert_eq!(&buf[16..20], &0.1f32.to_le_bytes());
        assert_eq!(buf[20], 3);
        assert!(buf[21..30].iter().all(|&b| b == 0));
        assert_eq!(buf[30], 0x8F);
    }

    #[test]
    fn test_lsv_layout() {
        let buf = create_lsv_command(0.0, 1.0, 0.05);

        assert_eq!(buf.len(), 29);
        assert_eq!(&buf[0..4], &[0x6B, 0x01, 0x00, 0x00]);
        assert_eq!(&buf[8..12], &1.0f32.to_le_bytes());
        assert_eq!(&buf[12..16], &0.05f32.to_le_bytes());
        assert!(buf[16..28].iter().all(|&b| b == 0));
        assert_eq!(buf[28], 0x8F);
    }

    #[test]
    fn test_swv_layout() {
        let buf = create_swv_command(-0.4, 0.6, 0.025, 15.0);

        assert_eq!(buf.len(), 29);
        assert_eq!(&buf[12..16], &0.025f32.to_le_bytes());
        assert_eq!(&buf[16..20], &15.0f32.to_le_bytes());
        assert!(buf[20..28].iter().all(|&b| b == 0));
        assert_eq!(buf[28], 0x8F);
    }

    #[test]
    fn test_amp_layout() {
        let buf = create_amp_command(0.3, 60.0, 0.5);

        assert_eq!(buf.len(), 27);
        assert_eq!(&buf[4..8], &0.3f32.to_le_bytes());
        assert_eq!(&buf[8..12], &60.0f32.to_le_bytes());
        assert_eq!(&buf[12..16], &0.5f32.to_le_bytes());
        assert!(buf[16..26].iter().all(|&b| b == 0));
        assert_eq!(buf[26], 0x8F);
    }

    #[test]
    fn test_cv_packet_decodes_as_telemetry() {
        let buf = create_cv_command(-0.35, 0.75, 0.0, 0.1, 2);
        let payload = BASE64_STANDARD.encode(&buf);

        for mode in [DecodeMode::Lenient, DecodeMode::Strict] {
            let telemetry = decode_telemetry(&payload, mode).unwrap();
            assert!((telemetry.x - -0.35).abs() < 1e-6);
            assert!((telemetry.y - 0.75).abs() < 1e-6);
        }
    }

    #[test]
    fn test_short_payload_is_malformed() {
        let payload = BASE64_STANDARD.encode([0x6B, 0x01, 0x00, 0x00, 0x00]);
        assert!(matches!(
            decode_telemetry(&payload, DecodeMode::Lenient),
            Err(SpectroKinError::MalformedPacket(_))
        ));
    }

    #[test]
    fn test_strict_mode_checks_framing() {
        let mut buf = vec![0u8; 12];
        buf[11] = FOOTER;
        assert!(decode_telemetry_bytes(&buf, DecodeMode::Lenient).is_ok());
        assert!(matches!(
            decode_telemetry_bytes(&buf, DecodeMode::Strict),
            Err(SpectroKinError::MalformedPacket(_))
        ));

        buf[0] = HEADER;
        buf[11] = 0x00;
        assert!(matches!(
            decode_telemetry_bytes(&buf, DecodeMode::Strict),
            Err(SpectroKinError::MalformedPacket(_))
        ));
    }

    #[test]
    fn test_invalid_base64() {
        assert!(matches!(
            decode_telemetry("not base64!!", DecodeMode::Lenient),
            Err(SpectroKinError::Base64(_))
        ));
    }

    #[test]
    fn test_command_from_params() {
        let params: HashMap<String, f64> = [
            ("start_voltage", -0.5),
            ("vertex1", 0.8),
            ("vertex2", -0.2),
            ("scan_rate", 0.1),
            ("cycles", 3.0),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect();

        let command = command_from_params(CommandKind::Cv, &params).unwrap();
        assert_eq!(encode(&command), vec![create_cv_command(-0.5, 0.8, -0.2, 0.1, 3)]);

        let missing = command_from_params(CommandKind::Lsv, &params);
        assert!(matches!(missing, Err(SpectroKinError::MissingParameter(ref name, _)) if name == "end_voltage"));
    }

    #[test]
    fn test_command_from_params_rejects_bad_cycles() {
        let mut params: HashMap<String, f64> = ["start_voltage", "vertex1", "vertex2", "scan_rate"]
            .iter()
            .map(|k| (k.to_string(), 0.0))
            .collect();
        params.insert("cycles".to_string(), 2.5);
        assert!(matches!(
            command_from_params(CommandKind::Cv, &params),
            Err(SpectroKinError::InvalidParameter(_, _))
        ));

        params.insert("cycles".to_string(), 300.0);
        assert!(command_from_params(CommandKind::Cv, &params).is_err());
    }

    #[test]
    fn test_send_command_writes_in_order() {
        let mut sink: Vec<Vec<u8>> = Vec::new();
        send_command(&mut sink, &DeviceCommand::Handshake).unwrap();
        send_command(&mut sink, &DeviceCommand::Led { on: true }).unwrap();

        assert_eq!(sink.len(), 3);
        assert_eq!(sink[1], HANDSHAKE_PACKETS[1].to_vec());
        assert_eq!(to_hex(&sink[2]), "6B 0C 01 00 8F");
    }
}
