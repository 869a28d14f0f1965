use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpectroKinError {
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Missing parameter '{0}' for {1} command")]
    MissingParameter(String, String),

    #[error("Invalid value {1} for parameter '{0}'")]
    InvalidParameter(String, f64),

    #[error("Blank reference has already been captured for this scan")]
    BlankAlreadyCaptured,

    #[error("Scan frame received before the blank reference was captured")]
    BlankNotCaptured,

    #[error("Scan session is already finished")]
    SessionFinished,

    #[error("Sample time {0} is not a finite number")]
    InvalidTime(f64),

    #[error("Sample time {time} does not follow the previous sample at {previous}")]
    NonMonotonicTime { previous: f64, time: f64 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to parse YAML from '{0}': {1}")]
    YamlParsing(String, #[source] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Failed to process CSV file '{0}': {1}")]
    CsvError(String, #[source] csv::Error),
}
