//! Parameter table and persistence.
//!
//! Six named 8-bit parameters shared between the command dispatcher (writer)
//! and the PWM tick interrupt (reader). The table lives behind a
//! `critical-section` mutex; single-value reads and writes are short critical
//! sections, and the persistent load/store loops hold one critical section
//! for their whole duration so the PWM interrupt never observes a
//! half-updated table.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::{Channel, ParamStorage, Rgb};

/// Sentinel value marking a persisted table as valid.
pub const PARAM_MAGIC: u8 = 0x5A;

/// Named parameter slots. The discriminant doubles as the persistent
/// storage address; address 0 is reserved for the validity sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Param {
    /// Validity sentinel, [`PARAM_MAGIC`] after a successful store.
    Valid = 0,
    /// Red PWM compare threshold.
    RedDuty = 1,
    /// Green PWM compare threshold.
    GreenDuty = 2,
    /// Blue PWM compare threshold.
    BlueDuty = 3,
    /// Global output enable, 0/1.
    Power = 4,
    /// Raise the power flag automatically at boot, 0/1.
    AutoOn = 5,
}

impl Param {
    /// Number of parameter slots.
    pub const COUNT: usize = 6;

    /// All parameters, in storage-address order (sentinel first).
    pub const ALL: [Self; Self::COUNT] = [
        Self::Valid,
        Self::RedDuty,
        Self::GreenDuty,
        Self::BlueDuty,
        Self::Power,
        Self::AutoOn,
    ];

    /// Persistent storage address of this parameter.
    pub const fn addr(self) -> u8 {
        self as u8
    }

    const fn index(self) -> usize {
        self as usize
    }

    /// Duty parameter backing the given channel.
    pub const fn for_channel(channel: Channel) -> Self {
        match channel {
            Channel::Red => Self::RedDuty,
            Channel::Green => Self::GreenDuty,
            Channel::Blue => Self::BlueDuty,
        }
    }
}

/// In-memory parameter table with load/store against persistent memory.
///
/// All accessors take `&self`; the table can sit in a `static` and be read
/// from the PWM tick interrupt while the main loop mutates it.
pub struct ParameterStore {
    table: Mutex<RefCell<[u8; Param::COUNT]>>,
}

impl ParameterStore {
    /// Create a zeroed table (all duties 0, power and auto-on off).
    pub const fn new() -> Self {
        Self {
            table: Mutex::new(RefCell::new([0; Param::COUNT])),
        }
    }

    /// Read one parameter.
    pub fn get(&self, param: Param) -> u8 {
        critical_section::with(|cs| self.table.borrow(cs).borrow()[param.index()])
    }

    /// Write one parameter.
    pub fn set(&self, param: Param, value: u8) {
        critical_section::with(|cs| {
            self.table.borrow(cs).borrow_mut()[param.index()] = value;
        });
    }

    /// Read one channel's duty value.
    pub fn duty(&self, channel: Channel) -> u8 {
        self.get(Param::for_channel(channel))
    }

    /// Write one channel's duty value.
    pub fn set_duty(&self, channel: Channel, value: u8) {
        self.set(Param::for_channel(channel), value);
    }

    /// Snapshot all three duty values in a single critical section.
    pub fn duties(&self) -> Rgb {
        critical_section::with(|cs| {
            let table = self.table.borrow(cs).borrow();
            Rgb::new(
                table[Param::RedDuty.index()],
                table[Param::GreenDuty.index()],
                table[Param::BlueDuty.index()],
            )
        })
    }

    /// Whether the global output enable is set.
    pub fn power(&self) -> bool {
        self.get(Param::Power) != 0
    }

    /// Set the global output enable.
    pub fn set_power(&self, on: bool) {
        self.set(Param::Power, u8::from(on));
    }

    /// Whether power is raised automatically at boot.
    pub fn auto_on(&self) -> bool {
        self.get(Param::AutoOn) != 0
    }

    /// Set the auto-on flag.
    pub fn set_auto_on(&self, on: bool) {
        self.set(Param::AutoOn, u8::from(on));
    }

    /// Reload the table from persistent memory.
    ///
    /// Every address is read exactly once, in order. If the sentinel read
    /// first does not match [`PARAM_MAGIC`], the persisted bytes are not
    /// trusted and every slot in this pass is forced to zero instead. Runs
    /// in one critical section.
    pub fn load<S: ParamStorage>(&self, storage: &mut S) {
        critical_section::with(|cs| {
            let mut table = self.table.borrow(cs).borrow_mut();
            let mut valid = false;
            for param in Param::ALL {
                let byte = storage.read_byte(param.addr());
                if param == Param::Valid {
                    valid = byte == PARAM_MAGIC;
                }
                table[param.index()] = if valid { byte } else { 0 };
            }
        });
    }

    /// Persist the table.
    ///
    /// Stamps [`PARAM_MAGIC`] into the sentinel slot, then writes every slot
    /// to its address, one byte at a time ([`ParamStorage::write_byte`]
    /// serializes the write cycles). Runs in one critical section.
    pub fn store<S: ParamStorage>(&self, storage: &mut S) {
        critical_section::with(|cs| {
            let mut table = self.table.borrow(cs).borrow_mut();
            table[Param::Valid.index()] = PARAM_MAGIC;
            for param in Param::ALL {
                storage.write_byte(param.addr(), table[param.index()]);
            }
        });
    }

    /// Restore settings at power-up: load the persisted table, then raise
    /// the power flag if auto-on is set.
    pub fn boot<S: ParamStorage>(&self, storage: &mut S) {
        self.load(storage);
        if self.auto_on() {
            self.set_power(true);
        }
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}
