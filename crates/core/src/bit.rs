//! Single-bit view of an EEPROM cell.
//!
//! Writing a bit is a full read-modify-write of the owning byte through the
//! cell's `|=` / `&=`, never a conditional update. Views over different bits
//! of the same cell share that byte, and the sequence is not atomic against
//! an interrupt handler touching the same cell.

use std::fmt;

use crate::cell::CellRef;
use crate::device::Device;

/// Handle to one bit of a [`CellRef`].
pub struct BitView<'a, D: Device + ?Sized> {
    cell: CellRef<'a, D>,
    mask: u8,
}

#[inline(always)]
fn mask_for(bidx: u32) -> u8 {
    1u8.wrapping_shl(bidx)
}

impl<'a, D: Device + ?Sized> BitView<'a, D> {
    /// View bit `bidx` (taken modulo 8) of `cell`.
    pub fn new(cell: CellRef<'a, D>, bidx: u32) -> Self {
        BitView { cell, mask: mask_for(bidx) }
    }

    pub fn cell(&self) -> CellRef<'a, D> {
        self.cell
    }

    /// Single-bit selector within the byte.
    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// Index of the selected bit, 0..=7.
    pub fn index(&self) -> u32 {
        self.mask.trailing_zeros()
    }

    /// Move the view to bit `bidx` of the same cell.
    pub fn set_index(&mut self, bidx: u32) -> &mut Self {
        self.mask = mask_for(bidx);
        self
    }

    pub fn read(&self) -> bool {
        self.cell.read() & self.mask != 0
    }

    pub fn write(&mut self, value: bool) -> &mut Self {
        if value {
            self.cell |= self.mask;
        } else {
            self.cell &= !self.mask;
        }
        self
    }

    /// Copy the state of `other`'s bit into this one.
    pub fn assign_from<E: Device + ?Sized>(&mut self, other: &BitView<'_, E>) -> &mut Self {
        self.write(other.read())
    }

    pub fn set(&mut self) -> &mut Self {
        self.write(true)
    }

    pub fn clear(&mut self) -> &mut Self {
        self.write(false)
    }
}

impl<D: Device + ?Sized> Clone for BitView<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: Device + ?Sized> Copy for BitView<'_, D> {}

impl<D: Device + ?Sized> fmt::Debug for BitView<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitView")
            .field("address", &self.cell.address())
            .field("mask", &format_args!("{:#010b}", self.mask))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemDevice;

    #[test]
    fn test_write_each_bit_preserves_others() {
        let dev = MemDevice::new(2);
        for start in [0x00u8, 0xFF, 0xA5, 0x3C] {
            for i in 0..8 {
                for b in [false, true] {
                    let cell = CellRef::new(&dev, 1);
                    cell.write(start);
                    let mut bit = cell.bit(i);
                    bit.write(b);
                    assert_eq!(bit.read(), b);
                    let m = 1u8 << i;
                    assert_eq!(cell.read() & !m, start & !m, "bit {} start {:#04x}", i, start);
                }
            }
        }
    }

    #[test]
    fn test_bit_write_is_read_modify_write() {
        let dev = MemDevice::new(1);
        let mut bit = CellRef::new(&dev, 0).bit(0);
        // Bit 0 of an erased cell is already set; the byte is rewritten anyway.
        bit.set();
        assert_eq!(dev.reads(), 1);
        assert_eq!(dev.writes(), 1);
    }

    #[test]
    fn test_set_clear_and_index() {
        let dev = MemDevice::from_bytes(&[0x00]);
        let mut bit = CellRef::new(&dev, 0).bit(1);
        assert_eq!(bit.mask(), 0x02);
        bit.set();
        bit.set_index(7).set();
        assert_eq!(bit.index(), 7);
        assert_eq!(dev.contents(), vec![0x82]);
        bit.clear();
        assert_eq!(dev.contents(), vec![0x02]);
    }

    #[test]
    fn test_index_wraps() {
        let dev = MemDevice::new(1);
        let bit = CellRef::new(&dev, 0).bit(9);
        assert_eq!(bit.mask(), 0x02);
        assert_eq!(bit.mask().count_ones(), 1);
    }

    #[test]
    fn test_assign_from() {
        let dev = MemDevice::from_bytes(&[0b0001_0000, 0x00]);
        let src = CellRef::new(&dev, 0).bit(4);
        let mut dst = CellRef::new(&dev, 1).bit(6);
        dst.assign_from(&src);
        assert_eq!(dev.contents(), vec![0b0001_0000, 0b0100_0000]);
        let off = CellRef::new(&dev, 0).bit(0);
        dst.assign_from(&off);
        assert_eq!(dev.contents()[1], 0);
    }

    #[test]
    fn test_views_share_byte() {
        let dev = MemDevice::from_bytes(&[0x00]);
        let cell = CellRef::new(&dev, 0);
        let mut a = cell.bit(0);
        let b = cell.bit(0);
        a.set();
        assert!(b.read());
    }
}
