//! RAM-backed EEPROM simulation.
//!
//! [`MemDevice`] mimics an on-chip EEPROM closely enough to run code written
//! against [`Device`] on a host:
//!
//! | Behaviour           | Simulation                                  |
//! |---------------------|---------------------------------------------|
//! | Erased state        | every cell reads `0xFF`                     |
//! | Write cycle         | optional busy period counted in ticks       |
//! | Out-of-range read   | `0xFF`                                      |
//! | Out-of-range write  | dropped                                     |
//!
//! Every physical read and write is counted, which is what the tests use to
//! observe the write-minimising paths (`update`, `put`).

use std::cell::Cell;

use crate::device::Device;
use crate::{CpuType, ERASED};

/// In-memory EEPROM with access counters and an optional write latency.
pub struct MemDevice {
    cells: Vec<Cell<u8>>,
    reads: Cell<u64>,
    writes: Cell<u64>,
    /// Writes issued while a previous write cycle was still in flight
    busy_writes: Cell<u64>,
    /// Ticks a write keeps the device busy (0 = instantaneous)
    write_latency: u32,
    /// Ticks left on the current write cycle
    busy: Cell<u32>,
    dirty: Cell<bool>,
}

impl MemDevice {
    /// Blank (all `0xFF`) device of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        MemDevice {
            cells: (0..capacity).map(|_| Cell::new(ERASED)).collect(),
            reads: Cell::new(0),
            writes: Cell::new(0),
            busy_writes: Cell::new(0),
            write_latency: 0,
            busy: Cell::new(0),
            dirty: Cell::new(false),
        }
    }

    /// Blank device sized for the given part.
    pub fn for_cpu(cpu: CpuType) -> Self {
        Self::new(cpu.eeprom_size())
    }

    /// Device pre-loaded with `data`; capacity is `data.len()`.
    pub fn from_bytes(data: &[u8]) -> Self {
        let dev = Self::new(data.len());
        for (cell, &b) in dev.cells.iter().zip(data) {
            cell.set(b);
        }
        dev
    }

    /// Make every write keep the device busy for `ticks` calls to [`advance`](Self::advance).
    pub fn with_write_latency(mut self, ticks: u32) -> Self {
        self.write_latency = ticks;
        self
    }

    /// Let `ticks` units of time pass, completing any write in flight.
    pub fn advance(&self, ticks: u32) {
        self.busy.set(self.busy.get().saturating_sub(ticks));
    }

    /// Number of physical reads since creation or the last [`reset_counters`](Self::reset_counters).
    pub fn reads(&self) -> u64 {
        self.reads.get()
    }

    /// Number of physical writes since creation or the last [`reset_counters`](Self::reset_counters).
    pub fn writes(&self) -> u64 {
        self.writes.get()
    }

    /// Writes that arrived while the device reported not ready.
    pub fn busy_writes(&self) -> u64 {
        self.busy_writes.get()
    }

    pub fn reset_counters(&self) {
        self.reads.set(0);
        self.writes.set(0);
        self.busy_writes.set(0);
    }

    /// True if any cell was written since the last [`clear_dirty`](Self::clear_dirty).
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn clear_dirty(&self) {
        self.dirty.set(false);
    }

    /// Copy of the backing store. Does not count as reads.
    pub fn contents(&self) -> Vec<u8> {
        self.cells.iter().map(Cell::get).collect()
    }
}

impl Device for MemDevice {
    #[inline(always)]
    fn read_byte(&self, address: usize) -> u8 {
        self.reads.set(self.reads.get() + 1);
        self.cells.get(address).map(Cell::get).unwrap_or(ERASED)
    }

    fn write_byte(&self, address: usize, value: u8) {
        if self.busy.get() > 0 {
            self.busy_writes.set(self.busy_writes.get() + 1);
            log::warn!("eeprom write at {:#06x} while busy ({} ticks left)", address, self.busy.get());
        }
        self.writes.set(self.writes.get() + 1);
        if let Some(cell) = self.cells.get(address) {
            cell.set(value);
            self.dirty.set(true);
        }
        self.busy.set(self.write_latency);
    }

    #[inline(always)]
    fn is_ready(&self) -> bool {
        self.busy.get() == 0
    }

    #[inline(always)]
    fn capacity(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_device() {
        let dev = MemDevice::new(16);
        assert_eq!(dev.capacity(), 16);
        assert!(dev.contents().iter().all(|&b| b == 0xFF));
        assert!(!dev.is_dirty());
    }

    #[test]
    fn test_counters_and_dirty() {
        let dev = MemDevice::new(8);
        dev.write_byte(3, 0x12);
        assert_eq!(dev.read_byte(3), 0x12);
        assert_eq!(dev.writes(), 1);
        assert_eq!(dev.reads(), 1);
        assert!(dev.is_dirty());
        dev.clear_dirty();
        dev.reset_counters();
        assert!(!dev.is_dirty());
        assert_eq!(dev.writes(), 0);
    }

    #[test]
    fn test_out_of_range() {
        let dev = MemDevice::from_bytes(&[1, 2, 3]);
        assert_eq!(dev.read_byte(3), 0xFF);
        dev.write_byte(100, 0);
        assert_eq!(dev.contents(), vec![1, 2, 3]);
        assert!(!dev.is_dirty());
        // The request still reached the device
        assert_eq!(dev.writes(), 1);
    }

    #[test]
    fn test_write_latency() {
        let dev = MemDevice::new(4).with_write_latency(3);
        assert!(dev.is_ready());
        dev.write_byte(0, 1);
        assert!(!dev.is_ready());
        dev.advance(2);
        assert!(!dev.is_ready());
        dev.write_byte(1, 2);
        assert_eq!(dev.busy_writes(), 1);
        dev.advance(5);
        assert!(dev.is_ready());
        assert_eq!(dev.contents(), vec![1, 2, 0xFF, 0xFF]);
    }

    #[test]
    fn test_for_cpu() {
        assert_eq!(MemDevice::for_cpu(CpuType::Atmega168).capacity(), 512);
        assert_eq!(MemDevice::for_cpu(CpuType::Atmega2560).capacity(), 4096);
    }

    #[test]
    fn test_borrowed_device() {
        let dev = MemDevice::new(2);
        let r = &dev;
        r.write_byte(1, 9);
        assert_eq!(Device::read_byte(&r, 1), 9);
        assert_eq!(Device::capacity(&r), 2);
    }
}
