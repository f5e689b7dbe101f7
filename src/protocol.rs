//! Line-oriented command protocol.
//!
//! Commands arrive as short ASCII lines terminated by `\r`: a single command
//! letter followed by a decimal value or a flag character. The dispatcher
//! scans the receive ring for a complete line, consumes it exactly once
//! (also on parse failure, so a bad line is never reprocessed), mutates the
//! parameter table, and answers with exactly one response line.

use heapless::Vec;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::params::ParameterStore;
use crate::transport::SerialTransport;
use crate::{Channel, ParamStorage, SerialPort};

/// End-of-command byte.
const TERMINATOR: u8 = b'\r';

/// Longest accepted command line, terminator included.
///
/// The grammar caps lines at five bytes (letter, three digits, `\r`); the
/// extra headroom is free.
pub const LINE_MAX: usize = 8;

const RESPONSE_RED_CHANGED: &str = "red changed\r\n";
const RESPONSE_GREEN_CHANGED: &str = "green changed\r\n";
const RESPONSE_BLUE_CHANGED: &str = "blue changed\r\n";
const RESPONSE_POWER_ENABLED: &str = "power enabled\r\n";
const RESPONSE_POWER_DISABLED: &str = "power disabled\r\n";
const RESPONSE_AUTO_ON_ENABLED: &str = "auto-on enabled\r\n";
const RESPONSE_AUTO_ON_DISABLED: &str = "auto-on disabled\r\n";
const RESPONSE_STORED: &str = "stored\r\n";
const RESPONSE_LOADED: &str = "loaded\r\n";
const RESPONSE_UNKNOWN: &str = "Unknown command!\r\n";

const USAGE_RED: &str = "usage: r<0-255>\r\n";
const USAGE_GREEN: &str = "usage: g<0-255>\r\n";
const USAGE_BLUE: &str = "usage: b<0-255>\r\n";
const USAGE_POWER: &str = "usage: p<0|1>\r\n";
const USAGE_AUTO_ON: &str = "usage: a<0|1>\r\n";
const USAGE_STORE: &str = "usage: sy\r\n";
const USAGE_LOAD: &str = "usage: ly\r\n";

/// A successfully parsed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Set one channel's duty value.
    SetDuty(Channel, u8),
    /// Set the global output enable.
    SetPower(bool),
    /// Set the auto-on flag.
    SetAutoOn(bool),
    /// Persist the parameter table.
    Store,
    /// Reload the parameter table from persistent memory.
    Load,
}

/// Why a line was rejected. The line is consumed either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// The leading letter names no command.
    Unknown,
    /// Known command letter, malformed argument; carries the letter.
    Usage(u8),
}

/// Result of scanning the receive ring for one line.
enum LineScan {
    /// No terminator yet; partial input stays in the ring.
    Pending,
    /// A full line was copied into the scratch buffer and consumed.
    Complete,
    /// A terminated line exceeded the scratch capacity; consumed unseen.
    Overlong,
}

/// Command parser and dispatcher over a serial transport.
///
/// Single consumer: exactly one instance polls a given transport's receive
/// ring from the main loop.
#[derive(Debug, Default)]
pub struct CommandProtocol {
    line: Vec<u8, LINE_MAX>,
}

impl CommandProtocol {
    /// Create a new dispatcher.
    pub const fn new() -> Self {
        Self { line: Vec::new() }
    }

    /// Dispatch at most one complete command line from the receive ring.
    ///
    /// Returns `None` while no terminator is in sight (partial lines persist
    /// across polls), otherwise the dispatch outcome. Whatever the outcome,
    /// the line's bytes are consumed exactly once and exactly one response
    /// line is enqueued for transmission.
    pub fn poll<const RX: usize, const TX: usize, P, S>(
        &mut self,
        transport: &SerialTransport<RX, TX>,
        port: &mut P,
        params: &ParameterStore,
        storage: &mut S,
    ) -> Option<Result<Command, CommandError>>
    where
        P: SerialPort,
        S: ParamStorage,
    {
        let line = &mut self.line;
        let scan = transport.with_rx(|rx| {
            let stored = rx.len();
            let mut terminator = None;
            for offset in 0..stored {
                if rx.peek_at(offset) == TERMINATOR {
                    terminator = Some(offset);
                    break;
                }
            }
            let Some(offset) = terminator else {
                return LineScan::Pending;
            };

            let length = offset + 1;
            line.clear();
            if line.resize(length, 0).is_err() {
                // Cannot happen with the grammar's line lengths; consume the
                // oversized line anyway so it is never rescanned.
                rx.pop_many(length);
                return LineScan::Overlong;
            }
            rx.copy_out(line);
            rx.pop_many(length);
            LineScan::Complete
        });

        let outcome = match scan {
            LineScan::Pending => return None,
            LineScan::Overlong => Err(CommandError::Unknown),
            LineScan::Complete => parse_line(&self.line),
        };

        if let Ok(command) = outcome {
            apply(command, params, storage);
        }

        #[cfg(feature = "esp32-log")]
        println!("dispatch: {:?}", outcome);

        transport.send_str(response_for(&outcome), port);
        Some(outcome)
    }
}

/// Parse one full line (terminator included) into a command.
fn parse_line(line: &[u8]) -> Result<Command, CommandError> {
    let letter = line[0];
    let arg: &[u8] = if line.len() >= 2 {
        &line[1..line.len() - 1]
    } else {
        &[]
    };

    match letter {
        b'r' => parse_duty(arg)
            .map(|value| Command::SetDuty(Channel::Red, value))
            .ok_or(CommandError::Usage(letter)),
        b'g' => parse_duty(arg)
            .map(|value| Command::SetDuty(Channel::Green, value))
            .ok_or(CommandError::Usage(letter)),
        b'b' => parse_duty(arg)
            .map(|value| Command::SetDuty(Channel::Blue, value))
            .ok_or(CommandError::Usage(letter)),
        b'p' => parse_flag(arg)
            .map(Command::SetPower)
            .ok_or(CommandError::Usage(letter)),
        b'a' => parse_flag(arg)
            .map(Command::SetAutoOn)
            .ok_or(CommandError::Usage(letter)),
        b's' => {
            if arg == b"y" {
                Ok(Command::Store)
            } else {
                Err(CommandError::Usage(letter))
            }
        }
        b'l' => {
            if arg == b"y" {
                Ok(Command::Load)
            } else {
                Err(CommandError::Usage(letter))
            }
        }
        _ => Err(CommandError::Unknown),
    }
}

/// Parse an unsigned decimal duty value.
///
/// One to three digits; values above 255 are rejected even though the
/// accumulator would hold them.
fn parse_duty(digits: &[u8]) -> Option<u8> {
    if digits.is_empty() || digits.len() > 3 {
        return None;
    }
    let mut value: u16 = 0;
    for &digit in digits {
        if !digit.is_ascii_digit() {
            return None;
        }
        value = value * 10 + u16::from(digit - b'0');
    }
    u8::try_from(value).ok()
}

/// Parse a single `0`/`1` flag argument (fixed-pattern commands only).
fn parse_flag(arg: &[u8]) -> Option<bool> {
    match arg {
        [b'0'] => Some(false),
        [b'1'] => Some(true),
        _ => None,
    }
}

fn apply<S: ParamStorage>(command: Command, params: &ParameterStore, storage: &mut S) {
    match command {
        Command::SetDuty(channel, value) => params.set_duty(channel, value),
        Command::SetPower(on) => params.set_power(on),
        Command::SetAutoOn(on) => params.set_auto_on(on),
        Command::Store => params.store(storage),
        Command::Load => params.load(storage),
    }
}

fn response_for(outcome: &Result<Command, CommandError>) -> &'static str {
    match outcome {
        Ok(Command::SetDuty(Channel::Red, _)) => RESPONSE_RED_CHANGED,
        Ok(Command::SetDuty(Channel::Green, _)) => RESPONSE_GREEN_CHANGED,
        Ok(Command::SetDuty(Channel::Blue, _)) => RESPONSE_BLUE_CHANGED,
        Ok(Command::SetPower(true)) => RESPONSE_POWER_ENABLED,
        Ok(Command::SetPower(false)) => RESPONSE_POWER_DISABLED,
        Ok(Command::SetAutoOn(true)) => RESPONSE_AUTO_ON_ENABLED,
        Ok(Command::SetAutoOn(false)) => RESPONSE_AUTO_ON_DISABLED,
        Ok(Command::Store) => RESPONSE_STORED,
        Ok(Command::Load) => RESPONSE_LOADED,
        Err(CommandError::Usage(letter)) => usage_for(*letter),
        Err(CommandError::Unknown) => RESPONSE_UNKNOWN,
    }
}

fn usage_for(letter: u8) -> &'static str {
    match letter {
        b'r' => USAGE_RED,
        b'g' => USAGE_GREEN,
        b'b' => USAGE_BLUE,
        b'p' => USAGE_POWER,
        b'a' => USAGE_AUTO_ON,
        b's' => USAGE_STORE,
        b'l' => USAGE_LOAD,
        _ => RESPONSE_UNKNOWN,
    }
}
