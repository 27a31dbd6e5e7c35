//! Line protocol spoken by the interpolator test firmware
//!
//! Commands and responses are single `\n`-terminated ASCII lines at 115200
//! baud. Every response begins with a keyword; `syntax <message>` is the
//! firmware's rejection of a malformed command. Integer tokens are accepted
//! in decimal, `0x`, `0b`, and `0o` notation.

use interp_emu::InvalidIndexError;
use std::fs::{File, OpenOptions};
use std::io;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error(transparent)]
    Index(#[from] InvalidIndexError),
    #[error("device reports unknown generation '{0}'")]
    InvalidGeneration(String),
    #[error("device rejected command: {0}")]
    Syntax(String),
    #[error("malformed device response: {0}")]
    Shape(String),
    #[error("serial I/O failed: {0}")]
    Transport(#[from] io::Error),
}

/// Byte transport carrying one line per command and one line per response.
pub trait Transport {
    /// Send a single command line; the line terminator is appended here.
    fn send_line(&mut self, line: &str) -> io::Result<()>;

    /// Block until the next response line arrives and return it without its
    /// line terminator.
    fn recv_line(&mut self) -> io::Result<String>;
}

/// Transport over a USB CDC serial character device.
///
/// The port is used with the kernel's default line discipline; CDC ACM
/// devices ignore the configured line speed, so no termios setup is needed.
pub struct SerialPort {
    reader: BufReader<File>,
    writer: File,
}

impl SerialPort {
    /// Open the character device read/write.
    ///
    /// # Errors
    ///
    /// Propagates the underlying open/clone failure.
    pub fn open(path: &Path) -> io::Result<Self> {
        let writer = OpenOptions::new().read(true).write(true).open(path)?;
        let reader = BufReader::new(writer.try_clone()?);

        Ok(Self { reader, writer })
    }
}

impl Transport for SerialPort {
    fn send_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }

    fn recv_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        self.reader.read_line(&mut line)?;

        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }

        Ok(line)
    }
}

/// Parse an integer token in any of the firmware's accepted notations.
#[must_use]
pub fn parse_int(token: &str) -> Option<u32> {
    let (digits, radix) = if let Some(hex) = token.strip_prefix("0x") {
        (hex, 16)
    } else if let Some(bin) = token.strip_prefix("0b") {
        (bin, 2)
    } else if let Some(oct) = token.strip_prefix("0o") {
        (oct, 8)
    } else {
        (token, 10)
    };

    u32::from_str_radix(digits, radix).ok()
}

/// Exchange one command for one response and split off the response keyword.
/// A `syntax` response is surfaced as an error here so callers only ever see
/// well-formed replies.
pub(crate) fn transact<T: Transport>(port: &mut T, cmd: &str) -> Result<(String, String), HwError> {
    log::debug!("<< {cmd}");
    port.send_line(cmd)?;

    let line = port.recv_line()?;
    log::debug!(">> {line}");

    let (keyword, rest) = match line.split_once(' ') {
        Some((keyword, rest)) => (keyword.to_owned(), rest.to_owned()),
        None => (line, String::new()),
    };

    if keyword == "syntax" {
        return Err(HwError::Syntax(rest));
    }

    Ok((keyword, rest))
}

pub(crate) fn expect_ok(keyword: &str, rest: &str) -> Result<(), HwError> {
    if keyword == "ok" && rest.is_empty() {
        Ok(())
    } else {
        Err(HwError::Shape(format!("expected 'ok', got '{keyword} {rest}'")))
    }
}

pub(crate) fn expect_data(keyword: &str, rest: &str, expected: usize) -> Result<Vec<u32>, HwError> {
    if keyword != "data" {
        return Err(HwError::Shape(format!("expected 'data', got '{keyword} {rest}'")));
    }

    let tokens: Vec<_> = rest.split_whitespace().collect();
    if tokens.len() != expected {
        return Err(HwError::Shape(format!("expected {expected} value(s), got '{rest}'")));
    }

    tokens
        .into_iter()
        .map(|token| {
            parse_int(token)
                .ok_or_else(|| HwError::Shape(format!("expected integer, got '{token}'")))
        })
        .collect()
}
