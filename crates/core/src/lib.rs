//! # avr-eeprom
//!
//! Typed access to the byte-addressable EEPROM of an AVR microcontroller
//! (ATmega32u4, ATmega328P and relatives), exposed through proxy values that
//! look like memory cells but perform a hardware read or write on every call.
//!
//! ## Architecture
//!
//! - [`Device`] — The hardware boundary: `read_byte`, `write_byte`, `is_ready`, `capacity`
//! - [`Eeprom`] — Facade over a device: byte/bit access, iteration, `get`/`put`
//! - [`StoragePtr`] — Movable cursor over addresses, dereferences to a [`CellRef`]
//! - [`CellRef`] — Lazy reference to one cell; `update` skips unchanged writes
//! - [`BitView`] — One bit of a cell, written by read-modify-write
//! - [`MemDevice`] — RAM-backed simulation with access counters and write latency
//! - [`image`] — Compressed EEPROM image files for keeping save data between runs
//!
//! Control flows `Eeprom` → `StoragePtr` → `CellRef` → `BitView`; every access
//! ends in [`Device::read_byte`] or [`Device::write_byte`].
//!
//! ## Write endurance
//!
//! EEPROM cells survive a limited number of erase/write cycles (100 000 on
//! the ATmega parts). [`CellRef::write`] and the compound operators always
//! write. [`CellRef::update`], [`Eeprom::update`] and [`Eeprom::put`] read
//! first and write only bytes that change.
//!
//! ## Concurrency
//!
//! Everything is single-threaded and blocking. Read-modify-write sequences
//! (`update`, compound assignment, bit writes) are not atomic: an interrupt
//! handler touching the same byte in between can lose an update. Nothing here
//! waits for [`Eeprom::ready`]; poll it before writing on hardware with a
//! write latency.

pub mod bit;
pub mod cell;
pub mod device;
pub mod eeprom;
pub mod image;
pub mod memory;
pub mod ptr;

pub use bit::BitView;
pub use cell::CellRef;
pub use device::Device;
pub use eeprom::Eeprom;
pub use image::{EepromImage, ImageError};
pub use memory::MemDevice;
pub use ptr::{Iter, StoragePtr};

use serde::{Deserialize, Serialize};

/// EEPROM size: 1 KB (ATmega32u4)
pub const EEPROM_SIZE: usize = 1024;
/// Value of an erased cell
pub const ERASED: u8 = 0xFF;

/// Target CPU type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuType {
    /// ATmega32u4 (Arduboy, Leonardo)
    Atmega32u4,
    /// ATmega328P (Gamebuino Classic, Arduino Uno)
    Atmega328p,
    /// ATmega168 (older Arduino boards)
    Atmega168,
    /// ATmega2560 (Arduino Mega)
    Atmega2560,
}

impl CpuType {
    /// EEPROM capacity in bytes (`E2END + 1`).
    pub fn eeprom_size(self) -> usize {
        match self {
            CpuType::Atmega32u4 | CpuType::Atmega328p => EEPROM_SIZE,
            CpuType::Atmega168 => 512,
            CpuType::Atmega2560 => 4 * 1024,
        }
    }
}
