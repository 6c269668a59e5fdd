use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use super::errors::classify_io_error;
use super::{BatteryProbe, ProbeError};

pub const DEFAULT_BATTERY_ADDR: &str = "127.0.0.1:8423";
const QUERY: &[u8] = b"get battery\n";
const MAX_RESPONSE_BYTES: u64 = 256;

/// Asks the local power-management daemon for the charge over TCP.
pub struct BatterySocket {
    addr: SocketAddr,
    timeout: Duration,
}

impl BatterySocket {
    pub fn new(addr: SocketAddr, timeout: Duration) -> Self {
        Self { addr, timeout }
    }
}

impl BatteryProbe for BatterySocket {
    fn battery_percent(&mut self) -> Result<i64, ProbeError> {
        let context = format!("battery service {}", self.addr);
        let mut stream = TcpStream::connect_timeout(&self.addr, self.timeout)
            .map_err(|e| classify_io_error(&context, &e))?;
        stream
            .set_read_timeout(Some(self.timeout))
            .and_then(|_| stream.set_write_timeout(Some(self.timeout)))
            .map_err(|e| classify_io_error(&context, &e))?;
        stream
            .write_all(QUERY)
            .map_err(|e| classify_io_error(&context, &e))?;

        let mut line = String::new();
        BufReader::new(stream.take(MAX_RESPONSE_BYTES))
            .read_line(&mut line)
            .map_err(|e| classify_io_error(&context, &e))?;
        if !line.ends_with('\n') && line.len() as u64 >= MAX_RESPONSE_BYTES {
            return Err(ProbeError::Malformed(format!(
                "{context} sent no newline within {MAX_RESPONSE_BYTES} bytes"
            )));
        }
        parse_battery_response(&line)
    }
}

/// Parse `"<label>: <number>"`, truncating any fractional part.
pub fn parse_battery_response(raw: &str) -> Result<i64, ProbeError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ProbeError::Malformed("empty battery response".into()));
    }
    let value = raw
        .split(':')
        .nth(1)
        .map(str::trim)
        .ok_or_else(|| ProbeError::Malformed(format!("no ':' in battery response '{raw}'")))?;
    let number: f64 = value
        .parse()
        .map_err(|_| ProbeError::Malformed(format!("battery value '{value}' is not a number")))?;
    if !number.is_finite() {
        return Err(ProbeError::Malformed(format!("battery value '{value}' is not finite")));
    }
    Ok(number.trunc() as i64)
}
