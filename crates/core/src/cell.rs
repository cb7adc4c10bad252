//! Lazy reference to a single EEPROM cell.
//!
//! A [`CellRef`] is a coordinate, not a container: it holds an address and a
//! borrow of the device, and every method goes straight to the hardware.
//! Nothing is cached, so two reads may observe different values if something
//! else wrote in between.
//!
//! Compound assignment operators perform an unconditional read-modify-write.
//! Only [`CellRef::update`] skips the write when the value is unchanged.
//!
//! ```text
//! let mut c = eeprom.cell(10);
//! c += 1;            // read, write
//! c.update(0x2A);    // read, write only if different
//! let old = c.post_inc();
//! ```

use std::fmt;
use std::ops::{
    AddAssign, BitAndAssign, BitOrAssign, BitXorAssign, DivAssign, MulAssign, RemAssign,
    ShlAssign, ShrAssign, SubAssign,
};

use crate::bit::BitView;
use crate::device::Device;
use crate::ptr::StoragePtr;

/// Handle to one byte of storage.
pub struct CellRef<'a, D: Device + ?Sized> {
    device: &'a D,
    address: usize,
}

impl<'a, D: Device + ?Sized> CellRef<'a, D> {
    pub fn new(device: &'a D, address: usize) -> Self {
        CellRef { device, address }
    }

    #[inline(always)]
    pub fn address(&self) -> usize {
        self.address
    }

    #[inline(always)]
    pub fn device(&self) -> &'a D {
        self.device
    }

    /// Current byte, read from the device.
    #[inline(always)]
    pub fn read(&self) -> u8 {
        self.device.read_byte(self.address)
    }

    /// Write `value`, always issuing a hardware write cycle.
    pub fn write(&self, value: u8) -> &Self {
        log::trace!("eeprom[{:#06x}] <- {:#04x}", self.address, value);
        self.device.write_byte(self.address, value);
        self
    }

    /// Write `value` only if the cell does not already hold it.
    pub fn update(&self, value: u8) -> &Self {
        if self.read() != value {
            self.write(value);
        } else {
            log::trace!("eeprom[{:#06x}] unchanged ({:#04x})", self.address, value);
        }
        self
    }

    /// Copy the byte held by `other` into this cell. The address of `self`
    /// is not changed.
    pub fn assign_from<E: Device + ?Sized>(&self, other: &CellRef<'_, E>) -> &Self {
        self.write(other.read())
    }

    /// Read-modify-write with an arbitrary function. The write is unconditional.
    pub fn modify(&self, f: impl FnOnce(u8) -> u8) -> &Self {
        self.write(f(self.read()))
    }

    /// Prefix increment: `+= 1`.
    pub fn inc(&mut self) -> &mut Self {
        *self += 1;
        self
    }

    /// Prefix decrement: `-= 1`.
    pub fn dec(&mut self) -> &mut Self {
        *self -= 1;
        self
    }

    /// Postfix increment: returns the value before incrementing.
    pub fn post_inc(&mut self) -> u8 {
        let ret = self.read();
        self.inc();
        ret
    }

    /// Postfix decrement: returns the value before decrementing.
    pub fn post_dec(&mut self) -> u8 {
        let ret = self.read();
        self.dec();
        ret
    }

    /// View of bit `bidx` of this cell. `bidx` is taken modulo 8.
    pub fn bit(&self, bidx: u32) -> BitView<'a, D> {
        BitView::new(*self, bidx)
    }

    /// Pointer at this cell's address.
    pub fn ptr(&self) -> StoragePtr<'a, D> {
        StoragePtr::new(self.device, self.address)
    }
}

impl<D: Device + ?Sized> Clone for CellRef<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: Device + ?Sized> Copy for CellRef<'_, D> {}

impl<D: Device + ?Sized> fmt::Debug for CellRef<'_, D> {
    // No read here: formatting must not touch the hardware.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CellRef").field("address", &self.address).finish()
    }
}

/// Byte arithmetic as it behaves after integer promotion and truncation.
fn shl(value: u8, rhs: u8) -> u8 {
    if rhs >= 8 { 0 } else { value << rhs }
}

fn shr(value: u8, rhs: u8) -> u8 {
    if rhs >= 8 { 0 } else { value >> rhs }
}

macro_rules! compound_assign {
    ($($trait:ident $method:ident => $op:expr;)*) => {
        $(
            impl<D: Device + ?Sized> $trait<u8> for CellRef<'_, D> {
                #[inline]
                fn $method(&mut self, rhs: u8) {
                    let op: fn(u8, u8) -> u8 = $op;
                    self.write(op(self.read(), rhs));
                }
            }
        )*
    };
}

compound_assign! {
    AddAssign add_assign => u8::wrapping_add;
    SubAssign sub_assign => u8::wrapping_sub;
    MulAssign mul_assign => u8::wrapping_mul;
    DivAssign div_assign => |a, b| a / b;
    RemAssign rem_assign => |a, b| a % b;
    BitXorAssign bitxor_assign => |a, b| a ^ b;
    BitAndAssign bitand_assign => |a, b| a & b;
    BitOrAssign bitor_assign => |a, b| a | b;
    ShlAssign shl_assign => shl;
    ShrAssign shr_assign => shr;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemDevice;

    #[test]
    fn test_write_read_all_values() {
        let dev = MemDevice::new(4);
        let c = CellRef::new(&dev, 2);
        for v in 0..=255u8 {
            c.write(v);
            assert_eq!(c.read(), v);
        }
        assert_eq!(dev.writes(), 256);
    }

    #[test]
    fn test_write_is_unconditional() {
        let dev = MemDevice::new(4);
        let c = CellRef::new(&dev, 0);
        c.write(7);
        c.write(7);
        assert_eq!(dev.writes(), 2);
    }

    #[test]
    fn test_update_skips_identical() {
        let dev = MemDevice::new(4);
        let c = CellRef::new(&dev, 1);
        c.update(0xFF);
        assert_eq!(dev.writes(), 0);
        assert_eq!(dev.reads(), 1);
        c.update(0x10);
        assert_eq!(dev.writes(), 1);
        assert_eq!(c.read(), 0x10);
        c.update(0x10);
        assert_eq!(dev.writes(), 1);
    }

    #[test]
    fn test_compound_ops() {
        let dev = MemDevice::new(1);
        let mut c = CellRef::new(&dev, 0);
        c.write(200);
        c += 100;
        assert_eq!(c.read(), 44);
        c -= 50;
        assert_eq!(c.read(), 250);
        c *= 2;
        assert_eq!(c.read(), 244);
        c /= 4;
        assert_eq!(c.read(), 61);
        c %= 7;
        assert_eq!(c.read(), 5);
        c ^= 0xFF;
        assert_eq!(c.read(), 0xFA);
        c &= 0x0F;
        assert_eq!(c.read(), 0x0A);
        c |= 0x30;
        assert_eq!(c.read(), 0x3A);
        c <<= 2;
        assert_eq!(c.read(), 0xE8);
        c >>= 3;
        assert_eq!(c.read(), 0x1D);
        c <<= 8;
        assert_eq!(c.read(), 0);
    }

    #[test]
    fn test_compound_ops_always_write() {
        let dev = MemDevice::new(1);
        let mut c = CellRef::new(&dev, 0);
        c |= 0xFF;
        c += 0;
        assert_eq!(dev.writes(), 2);
    }

    #[test]
    #[should_panic]
    fn test_div_by_zero_panics() {
        let dev = MemDevice::new(1);
        let mut c = CellRef::new(&dev, 0);
        c /= 0;
    }

    #[test]
    fn test_increment_decrement() {
        let dev = MemDevice::new(1);
        let mut c = CellRef::new(&dev, 0);
        c.write(5);
        assert_eq!(c.post_inc(), 5);
        assert_eq!(c.read(), 6);
        assert_eq!(c.post_dec(), 6);
        assert_eq!(c.read(), 5);
        assert_eq!(c.inc().inc().read(), 7);
        assert_eq!(c.dec().read(), 6);
        c.write(0);
        c.dec();
        assert_eq!(c.read(), 0xFF);
    }

    #[test]
    fn test_assign_from_copies_value() {
        let dev = MemDevice::new(4);
        let src = CellRef::new(&dev, 0);
        let dst = CellRef::new(&dev, 3);
        src.write(0x42);
        dst.assign_from(&src);
        assert_eq!(dst.address(), 3);
        assert_eq!(dst.read(), 0x42);
        src.write(0x00);
        assert_eq!(dst.read(), 0x42);
    }

    #[test]
    fn test_across_devices() {
        let a = MemDevice::from_bytes(&[0x5A]);
        let b = MemDevice::new(1);
        CellRef::new(&b, 0).assign_from(&CellRef::new(&a, 0));
        assert_eq!(b.contents(), vec![0x5A]);
    }

    #[test]
    fn test_modify() {
        let dev = MemDevice::from_bytes(&[0x0F]);
        CellRef::new(&dev, 0).modify(|v| v.rotate_left(4));
        assert_eq!(dev.contents(), vec![0xF0]);
    }

    #[test]
    fn test_ptr_and_bit() {
        let dev = MemDevice::new(16);
        let c = CellRef::new(&dev, 9);
        assert_eq!(c.ptr().address(), 9);
        c.write(0b0000_0100);
        assert!(c.bit(2).read());
        assert!(!c.bit(3).read());
    }

    #[test]
    fn test_debug_does_not_read() {
        let dev = MemDevice::new(1);
        let c = CellRef::new(&dev, 0);
        assert_eq!(format!("{:?}", c), "CellRef { address: 0 }");
        assert_eq!(dev.reads(), 0);
    }
}
