//! Hardware boundary.
//!
//! A [`Device`] supplies the four primitives every proxy in this crate is built
//! on. On a real part these map to the EECR/EEDR/EEARL/EEARH register dance;
//! on a host they are usually backed by [`MemDevice`](crate::MemDevice).
//!
//! All methods take `&self`: hardware registers are interior-mutable, and the
//! proxies hold shared borrows so that several of them can coexist.

/// Byte-level access to a non-volatile storage region.
pub trait Device {
    /// Read the byte at `address`. Out-of-range addresses are device-defined.
    fn read_byte(&self, address: usize) -> u8;

    /// Issue a write of `value` at `address`. No acknowledgement.
    fn write_byte(&self, address: usize, value: u8);

    /// True when the device will accept a new write without blocking.
    fn is_ready(&self) -> bool;

    /// Total capacity in bytes (`E2END + 1`).
    fn capacity(&self) -> usize;
}

impl<D: Device + ?Sized> Device for &D {
    #[inline(always)]
    fn read_byte(&self, address: usize) -> u8 {
        (**self).read_byte(address)
    }

    #[inline(always)]
    fn write_byte(&self, address: usize, value: u8) {
        (**self).write_byte(address, value)
    }

    #[inline(always)]
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    #[inline(always)]
    fn capacity(&self) -> usize {
        (**self).capacity()
    }
}
