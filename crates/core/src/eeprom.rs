//! Whole-device facade.
//!
//! [`Eeprom`] wraps a [`Device`] and hands out [`CellRef`], [`BitView`] and
//! [`StoragePtr`] values on demand. It holds no state of its own besides the
//! device, so it is cheap to pass by reference to whatever needs storage.
//!
//! ## Block transfer
//!
//! [`Eeprom::get`] and [`Eeprom::put`] copy a value's raw bytes to and from
//! consecutive cells, lowest address first, in the value's in-memory layout.
//! There is no endian normalisation: an image written on one target reads back
//! correctly only on a target with the same layout. `put` goes through
//! [`CellRef::update`], so bytes that already match are not rewritten.

use bytemuck::{Pod, Zeroable};

use crate::bit::BitView;
use crate::cell::CellRef;
use crate::device::Device;
use crate::ptr::{Iter, StoragePtr};

/// Typed access to an entire EEPROM.
pub struct Eeprom<D: Device> {
    device: D,
}

impl<D: Device> Eeprom<D> {
    pub fn new(device: D) -> Self {
        log::debug!("eeprom attached: {} bytes", device.capacity());
        Eeprom { device }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn into_inner(self) -> D {
        self.device
    }

    // --- Cell access ---

    /// Proxy for the cell at `address`.
    #[inline(always)]
    pub fn cell(&self, address: usize) -> CellRef<'_, D> {
        CellRef::new(&self.device, address)
    }

    /// Pointer at `address`.
    #[inline(always)]
    pub fn ptr(&self, address: usize) -> StoragePtr<'_, D> {
        StoragePtr::new(&self.device, address)
    }

    pub fn read(&self, address: usize) -> u8 {
        self.cell(address).read()
    }

    pub fn write(&self, address: usize, value: u8) {
        self.cell(address).write(value);
    }

    /// Write only if the stored byte differs.
    pub fn update(&self, address: usize, value: u8) {
        self.cell(address).update(value);
    }

    pub fn read_bit(&self, address: usize, bidx: u32) -> BitView<'_, D> {
        self.cell(address).bit(bidx)
    }

    pub fn write_bit(&self, address: usize, bidx: u32, value: bool) {
        self.cell(address).bit(bidx).write(value);
    }

    // --- Range and state ---

    pub fn begin(&self) -> StoragePtr<'_, D> {
        self.ptr(0)
    }

    /// One past the last cell. Not dereferenceable.
    pub fn end(&self) -> StoragePtr<'_, D> {
        self.ptr(self.len())
    }

    pub fn iter(&self) -> Iter<'_, D> {
        Iter::new(self.begin(), self.end())
    }

    /// Capacity in bytes.
    pub fn len(&self) -> usize {
        self.device.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the device can accept a write. Not checked by any write path.
    pub fn ready(&self) -> bool {
        self.device.is_ready()
    }

    // --- Block transfer ---

    /// Fill `out` with `size_of::<T>()` bytes read from `address` upward.
    pub fn get<'t, T: Pod>(&self, address: usize, out: &'t mut T) -> &'t T {
        let mut ptr = self.ptr(address);
        for byte in bytemuck::bytes_of_mut(out) {
            *byte = ptr.cell().read();
            ptr.inc();
        }
        out
    }

    /// Store the bytes of `value` from `address` upward, skipping bytes that
    /// are already equal.
    pub fn put<'t, T: Pod>(&self, address: usize, value: &'t T) -> &'t T {
        let mut ptr = self.ptr(address);
        for &byte in bytemuck::bytes_of(value) {
            ptr.cell().update(byte);
            ptr.inc();
        }
        value
    }

    /// Read a `T` stored at `address`.
    pub fn read_value<T: Pod>(&self, address: usize) -> T {
        let mut value: T = Zeroable::zeroed();
        self.get(address, &mut value);
        value
    }

    // --- Whole-device helpers ---

    /// Every cell, in address order.
    pub fn snapshot(&self) -> Vec<u8> {
        self.iter().map(|c| c.read()).collect()
    }

    /// Conditionally rewrite the start of the device with `data`.
    ///
    /// Bytes beyond the capacity are ignored. Returns the number of cells
    /// whose content changed.
    pub fn restore(&self, data: &[u8]) -> usize {
        let mut changed = 0;
        for (cell, &b) in self.iter().zip(data) {
            if cell.read() != b {
                cell.write(b);
                changed += 1;
            }
        }
        if data.len() > self.len() {
            log::debug!("restore: {} trailing bytes ignored", data.len() - self.len());
        }
        changed
    }

    /// Conditionally set every cell to `value`. Returns the number changed.
    pub fn fill(&self, value: u8) -> usize {
        let mut changed = 0;
        for cell in self {
            if cell.read() != value {
                cell.write(value);
                changed += 1;
            }
        }
        changed
    }
}

impl<'a, D: Device> IntoIterator for &'a Eeprom<D> {
    type Item = CellRef<'a, D>;
    type IntoIter = Iter<'a, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
