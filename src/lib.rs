#![no_std]

pub mod params;
pub mod protocol;
pub mod pwm;
pub mod ring_buffer;
pub mod transport;

pub use params::{PARAM_MAGIC, Param, ParameterStore};
pub use protocol::{Command, CommandError, CommandProtocol, LINE_MAX};
pub use pwm::PwmGenerator;
pub use ring_buffer::RingBuffer;
pub use transport::{SerialTransport, TransportConfig, TxStrategy};

pub use embassy_time::{Duration, Instant};

/// RGB triple, also used as the per-channel duty snapshot.
pub type Rgb = smart_leds::RGB8;

/// One of the three strip color channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// All channels, in parameter-address order.
    pub const ALL: [Self; 3] = [Self::Red, Self::Green, Self::Blue];
}

/// Abstract byte-oriented transmit peripheral
///
/// Implement this trait to support different serial hardware.
/// The transport is generic over this trait.
pub trait SerialPort {
    /// Start transmission of a single byte.
    ///
    /// For interrupt-driven transmit, completion is reported back through
    /// [`SerialTransport::on_byte_sent`]; for polled transmit the byte must
    /// be on the wire (or latched by the peripheral) when this returns.
    fn write_byte(&mut self, byte: u8);
}

/// Abstract per-channel digital output lines
///
/// Implement this trait to drive the strip's three channel pins.
pub trait ChannelOutputs {
    /// Drive one channel's output line high (`true`) or low (`false`).
    fn set(&mut self, channel: Channel, on: bool);
}

/// Abstract byte-addressable persistent parameter memory
///
/// Implement this trait over EEPROM-class storage. Writes are narrow-bus and
/// serialized: `write_byte` must not return until the cell is committed, so
/// back-to-back calls never overlap in-flight write cycles.
pub trait ParamStorage {
    /// Read one byte from `addr`.
    fn read_byte(&mut self, addr: u8) -> u8;

    /// Write one byte to `addr`, waiting for the write cycle to complete.
    fn write_byte(&mut self, addr: u8, value: u8);
}
