//! Duty-cycle PWM generation.

use crate::params::ParameterStore;
use crate::{Channel, ChannelOutputs, Rgb};

/// Software PWM generator clocked by a periodic timer interrupt.
///
/// A free-running 8-bit cycle counter advances once per tick, so one PWM
/// period spans 256 ticks and the base frequency is the tick rate divided
/// by 256. Each channel is on from the start of a period until the counter
/// reaches its duty value: duty 0 keeps a channel off for the whole period,
/// duty 255 keeps it on for 255 of 256 ticks.
#[derive(Debug, Default)]
pub struct PwmGenerator {
    cycle: u8,
}

impl PwmGenerator {
    /// Create a generator at the start of a period.
    pub const fn new() -> Self {
        Self { cycle: 0 }
    }

    /// Current position within the PWM period.
    pub const fn cycle(&self) -> u8 {
        self.cycle
    }

    /// Advance one tick. Call exactly once per periodic timer interrupt.
    ///
    /// On wraparound (start of a new period) every channel with a non-zero
    /// duty is switched on, provided the power flag is set; with power clear
    /// nothing is switched on for the whole period. On every other tick each
    /// channel whose duty the counter has reached is switched off; repeating
    /// the "off" edge is idempotent and safe.
    pub fn on_tick<O: ChannelOutputs>(&mut self, params: &ParameterStore, outputs: &mut O) {
        self.cycle = self.cycle.wrapping_add(1);
        let duties = params.duties();

        if self.cycle == 0 {
            if params.power() {
                for channel in Channel::ALL {
                    if duty_of(duties, channel) != 0 {
                        outputs.set(channel, true);
                    }
                }
            }
            return;
        }

        for channel in Channel::ALL {
            if self.cycle >= duty_of(duties, channel) {
                outputs.set(channel, false);
            }
        }
    }
}

const fn duty_of(duties: Rgb, channel: Channel) -> u8 {
    match channel {
        Channel::Red => duties.r,
        Channel::Green => duties.g,
        Channel::Blue => duties.b,
    }
}
