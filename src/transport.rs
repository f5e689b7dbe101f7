//! Interrupt-safe serial byte transport.
//!
//! Glues a receive ring and a transmit ring to the byte-oriented serial
//! peripheral. Built on `critical-section` so one instance can sit in a
//! `static` and be shared between interrupt handlers and the main loop:
//! every operation masks interrupts for its duration, which is what makes
//! the lock-free [`RingBuffer`] underneath safe to use from both contexts.
//!
//! Transmit draining comes in two flavors, selected by [`TransportConfig`]:
//! interrupt-driven (the transmit-complete interrupt feeds the next byte)
//! or poll-driven (the main loop drains one byte per coarse clock tick).

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_time::{Duration, Instant};

use crate::SerialPort;
use crate::ring_buffer::RingBuffer;

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// How the transmit ring is drained to the peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStrategy {
    /// The transmit-complete interrupt pulls the next byte; enqueuing while
    /// the line is idle starts transmission immediately.
    Interrupt,
    /// The main loop pops and sends one byte per rate-limited
    /// [`poll_transmit`](SerialTransport::poll_transmit) call.
    Polled,
}

/// Configuration for the serial transport.
#[derive(Debug, Clone, Copy)]
pub struct TransportConfig {
    /// Echo every received byte back to the sender, inserting an extra
    /// `\n` immediately before an echoed `\r`.
    pub echo: bool,
    /// Transmit draining strategy.
    pub tx: TxStrategy,
    /// Minimum spacing between polled transmit steps.
    pub poll_interval: Duration,
}

impl TransportConfig {
    /// Default configuration: no echo, poll-driven transmit, 1 ms pacing.
    pub const fn new() -> Self {
        Self {
            echo: false,
            tx: TxStrategy::Polled,
            poll_interval: Duration::from_millis(1),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new()
    }
}

struct TransportState<const RX: usize, const TX: usize> {
    rx: RingBuffer<RX>,
    tx: RingBuffer<TX>,
    /// A byte is in flight on the wire (interrupt strategy only). The byte
    /// stays at the transmit ring's head until completion is reported.
    sending: bool,
    next_poll: Instant,
}

/// Serial transport over one RX and one TX ring.
///
/// `RX` and `TX` size the two rings independently; each should cover the
/// worst-case backlog of its direction (receive bursts between polls,
/// response lines awaiting drain).
pub struct SerialTransport<const RX: usize, const TX: usize> {
    state: Mutex<RefCell<TransportState<RX, TX>>>,
    config: TransportConfig,
}

impl<const RX: usize, const TX: usize> SerialTransport<RX, TX> {
    /// Create a new transport with empty rings.
    pub const fn new(config: TransportConfig) -> Self {
        Self {
            state: Mutex::new(RefCell::new(TransportState {
                rx: RingBuffer::new(),
                tx: RingBuffer::new(),
                sending: false,
                next_poll: Instant::from_millis(0),
            })),
            config,
        }
    }

    /// Feed one byte received from the peripheral.
    ///
    /// Invoked from the receive interrupt. The byte goes into the RX ring
    /// (drop-on-full applies); with echo enabled it is also pushed into the
    /// TX ring, with an extra `\n` ahead of an echoed `\r`.
    pub fn on_byte_received<P: SerialPort>(&self, byte: u8, port: &mut P) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow(cs).borrow_mut();
            state.rx.put(byte);
            if self.config.echo {
                if byte == CR {
                    state.tx.put(LF);
                }
                state.tx.put(byte);
            }
            if self.config.tx == TxStrategy::Interrupt {
                Self::kick(&mut state, port);
            }
        });
    }

    /// Report completion of the byte handed to the peripheral last.
    ///
    /// Invoked from the transmit-complete interrupt under
    /// [`TxStrategy::Interrupt`]. Consumes the sent byte and hands over the
    /// next one, or marks the line idle when the ring has drained.
    pub fn on_byte_sent<P: SerialPort>(&self, port: &mut P) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow(cs).borrow_mut();
            let _ = state.tx.pop();
            if state.tx.is_empty() {
                state.sending = false;
            } else {
                let next = state.tx.peek();
                port.write_byte(next);
                state.sending = true;
            }
        });
    }

    /// Enqueue bytes for transmission.
    ///
    /// Under [`TxStrategy::Interrupt`] an idle line starts transmitting
    /// immediately; under [`TxStrategy::Polled`] the bytes wait for
    /// [`poll_transmit`](Self::poll_transmit).
    pub fn send<P: SerialPort>(&self, bytes: &[u8], port: &mut P) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow(cs).borrow_mut();
            state.tx.put_many(bytes);
            if self.config.tx == TxStrategy::Interrupt {
                Self::kick(&mut state, port);
            }
        });
    }

    /// Enqueue a string for transmission.
    pub fn send_str<P: SerialPort>(&self, s: &str, port: &mut P) {
        self.send(s.as_bytes(), port);
    }

    /// Drain one byte to the peripheral, rate-limited by the configured
    /// poll interval.
    ///
    /// The main loop calls this every iteration under [`TxStrategy::Polled`];
    /// calls inside the pacing window are no-ops.
    pub fn poll_transmit<P: SerialPort>(&self, now: Instant, port: &mut P) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow(cs).borrow_mut();
            if now < state.next_poll {
                return;
            }
            state.next_poll = now + self.config.poll_interval;
            if let Some(byte) = state.tx.pop() {
                port.write_byte(byte);
            }
        });
    }

    /// Run `f` over the RX ring inside a critical section.
    ///
    /// This is the consumer-side access point: multi-step reads (scan for a
    /// terminator, copy a line out, consume it) stay atomic with respect to
    /// the receive interrupt.
    pub fn with_rx<R>(&self, f: impl FnOnce(&mut RingBuffer<RX>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.state.borrow(cs).borrow_mut().rx))
    }

    /// Number of bytes waiting in the RX ring.
    pub fn rx_len(&self) -> usize {
        critical_section::with(|cs| self.state.borrow(cs).borrow().rx.len())
    }

    /// Number of bytes waiting in the TX ring.
    pub fn tx_len(&self) -> usize {
        critical_section::with(|cs| self.state.borrow(cs).borrow().tx.len())
    }

    /// Whether a byte is currently in flight (interrupt strategy).
    pub fn is_sending(&self) -> bool {
        critical_section::with(|cs| self.state.borrow(cs).borrow().sending)
    }

    /// Start transmission of the head byte if the line is idle.
    fn kick<P: SerialPort>(state: &mut TransportState<RX, TX>, port: &mut P) {
        if !state.sending && !state.tx.is_empty() {
            let head = state.tx.peek();
            port.write_byte(head);
            state.sending = true;
        }
    }
}
