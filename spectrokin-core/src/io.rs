//! Reading and writing the toolkit's file formats.

use crate::{error::SpectroKinError, logger::AbsorbanceLogEntry};
use serde::Serialize;
use spectrokin_schemas::{
    command::DeviceCommand,
    file_formats::CommandFile,
    kinetics::SubstrateVelocityPoint,
    sample::{AbsorbanceSample, RawFrame},
};
use std::{fs, path::Path};

fn path_string(path: &Path) -> String {
    path.display().to_string()
}

/// Reads a frame CSV (`phase,time,sample_r,...,reference_b`).
pub fn read_frames<P: AsRef<Path>>(path: P) -> Result<Vec<RawFrame>, SpectroKinError> {
    read_csv(path.as_ref())
}

/// Reads a substrate/velocity CSV with `s` and `v0` columns.
pub fn read_points<P: AsRef<Path>>(path: P) -> Result<Vec<SubstrateVelocityPoint>, SpectroKinError> {
    read_csv(path.as_ref())
}

/// Reads back a log written by [`crate::logger::AbsorbanceLogger`].
pub fn read_absorbance_log<P: AsRef<Path>>(path: P) -> Result<Vec<AbsorbanceSample>, SpectroKinError> {
    let entries: Vec<AbsorbanceLogEntry> = read_csv(path.as_ref())?;
    Ok(entries.into_iter().map(AbsorbanceSample::from).collect())
}

/// Loads device commands from YAML (JSON is accepted as a YAML subset).
/// The file holds either a single command or a `commands:` list.
pub fn load_commands<P: AsRef<Path>>(path: P) -> Result<Vec<DeviceCommand>, SpectroKinError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| SpectroKinError::FileIO(path_string(path), e))?;
    let file: CommandFile = serde_yaml::from_str(&content)
        .map_err(|e| SpectroKinError::YamlParsing(path_string(path), e))?;
    Ok(file.into_commands())
}

pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), SpectroKinError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| SpectroKinError::FileIO(path_string(path), e))
}

pub fn write_points<P: AsRef<Path>>(path: P, points: &[SubstrateVelocityPoint]) -> Result<(), SpectroKinError> {
    let path = path.as_ref();
    let mut writer =
        csv::Writer::from_path(path).map_err(|e| SpectroKinError::CsvError(path_string(path), e))?;
    for point in points {
        writer
            .serialize(point)
            .map_err(|e| SpectroKinError::CsvError(path_string(path), e))?;
    }
    writer
        .flush()
        .map_err(|e| SpectroKinError::FileIO(path_string(path), e))
}

fn read_csv<T>(path: &Path) -> Result<Vec<T>, SpectroKinError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| SpectroKinError::CsvError(path_string(path), e))?;
    reader
        .deserialize()
        .map(|row| row.map_err(|e| SpectroKinError::CsvError(path_string(path), e)))
        .collect()
}
