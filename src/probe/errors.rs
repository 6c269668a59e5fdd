use std::io::ErrorKind;

/// Why a probe could not produce a value. Every variant is absorbed by the
/// poller; the distinction only matters for the log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// The interface, command or service does not exist.
    #[error("unavailable: {0}")]
    Unavailable(String),
    /// The probe answered with something we could not parse.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// Connection, timeout or exit-code failure; the next tick may succeed.
    #[error("transient failure: {0}")]
    Transient(String),
}

impl ProbeError {
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::Unavailable(_) => "unavailable",
            ProbeError::Malformed(_) => "malformed",
            ProbeError::Transient(_) => "transient",
        }
    }
}

/// Map an I/O failure onto the probe taxonomy, keeping `context` in the message.
pub fn classify_io_error(context: &str, err: &std::io::Error) -> ProbeError {
    let message = format!("{context}: {err}");
    match err.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied => ProbeError::Unavailable(message),
        ErrorKind::InvalidData | ErrorKind::UnexpectedEof => ProbeError::Malformed(message),
        _ => match err.raw_os_error() {
            // 19 = ENODEV, 6 = ENXIO
            Some(19) | Some(6) => ProbeError::Unavailable(message),
            _ => ProbeError::Transient(message),
        },
    }
}
