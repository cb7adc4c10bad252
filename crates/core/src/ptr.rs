//! Movable cursor over EEPROM addresses.
//!
//! [`StoragePtr`] behaves like a bidirectional pointer: it can be moved with
//! `+=`/`-=` or the increment helpers, indexed with [`StoragePtr::at`], and
//! dereferenced into a fresh [`CellRef`]. Arithmetic wraps and is never range
//! checked; only dereferencing touches the device.
//!
//! [`Iter`] walks a half-open `[begin, end)` range using `!=` as the stop
//! condition, the same contract a hand-written loop over two pointers has.

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::cell::CellRef;
use crate::device::Device;

/// Repositionable handle to a storage address.
pub struct StoragePtr<'a, D: Device + ?Sized> {
    device: &'a D,
    address: usize,
}

impl<'a, D: Device + ?Sized> StoragePtr<'a, D> {
    pub fn new(device: &'a D, address: usize) -> Self {
        StoragePtr { device, address }
    }

    #[inline(always)]
    pub fn address(&self) -> usize {
        self.address
    }

    /// Reposition to an absolute address.
    pub fn set_address(&mut self, address: usize) -> &mut Self {
        self.address = address;
        self
    }

    /// Cell at the current address.
    #[inline(always)]
    pub fn cell(&self) -> CellRef<'a, D> {
        CellRef::new(self.device, self.address)
    }

    /// Cell at `address + idx`; the pointer does not move.
    #[inline(always)]
    pub fn at(&self, idx: usize) -> CellRef<'a, D> {
        CellRef::new(self.device, self.address.wrapping_add(idx))
    }

    /// Prefix increment.
    pub fn inc(&mut self) -> &mut Self {
        *self += 1;
        self
    }

    /// Prefix decrement.
    pub fn dec(&mut self) -> &mut Self {
        *self -= 1;
        self
    }

    /// Postfix increment: returns the pointer as it was before moving.
    pub fn post_inc(&mut self) -> Self {
        let ret = *self;
        self.inc();
        ret
    }

    /// Postfix decrement: returns the pointer as it was before moving.
    pub fn post_dec(&mut self) -> Self {
        let ret = *self;
        self.dec();
        ret
    }
}

impl<D: Device + ?Sized> Clone for StoragePtr<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: Device + ?Sized> Copy for StoragePtr<'_, D> {}

impl<D: Device + ?Sized> fmt::Debug for StoragePtr<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoragePtr({:#06x})", self.address)
    }
}

impl<D: Device + ?Sized> PartialEq for StoragePtr<'_, D> {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl<D: Device + ?Sized> Eq for StoragePtr<'_, D> {}

impl<D: Device + ?Sized> PartialOrd for StoragePtr<'_, D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<D: Device + ?Sized> Ord for StoragePtr<'_, D> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.address.cmp(&other.address)
    }
}

impl<D: Device + ?Sized> AddAssign<usize> for StoragePtr<'_, D> {
    fn add_assign(&mut self, delta: usize) {
        self.address = self.address.wrapping_add(delta);
    }
}

impl<D: Device + ?Sized> SubAssign<usize> for StoragePtr<'_, D> {
    fn sub_assign(&mut self, delta: usize) {
        self.address = self.address.wrapping_sub(delta);
    }
}

impl<D: Device + ?Sized> Add<usize> for StoragePtr<'_, D> {
    type Output = Self;

    fn add(mut self, delta: usize) -> Self {
        self += delta;
        self
    }
}

impl<D: Device + ?Sized> Sub<usize> for StoragePtr<'_, D> {
    type Output = Self;

    fn sub(mut self, delta: usize) -> Self {
        self -= delta;
        self
    }
}

impl<'a, D: Device + ?Sized> From<StoragePtr<'a, D>> for CellRef<'a, D> {
    fn from(ptr: StoragePtr<'a, D>) -> Self {
        ptr.cell()
    }
}

// ─── Range iteration ────────────────────────────────────────────────────────

/// Iterator over the cells in `[front, back)`.
pub struct Iter<'a, D: Device + ?Sized> {
    front: StoragePtr<'a, D>,
    back: StoragePtr<'a, D>,
}

impl<'a, D: Device + ?Sized> Iter<'a, D> {
    /// Iterate from `begin` up to, not including, `end`.
    ///
    /// `end` must be reachable from `begin` by incrementing.
    pub fn new(begin: StoragePtr<'a, D>, end: StoragePtr<'a, D>) -> Self {
        Iter { front: begin, back: end }
    }
}

impl<'a, D: Device + ?Sized> Iterator for Iter<'a, D> {
    type Item = CellRef<'a, D>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front != self.back {
            Some(self.front.post_inc().cell())
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back.address().wrapping_sub(self.front.address());
        (n, Some(n))
    }
}

impl<D: Device + ?Sized> DoubleEndedIterator for Iter<'_, D> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front != self.back {
            Some(self.back.dec().cell())
        } else {
            None
        }
    }
}

impl<D: Device + ?Sized> ExactSizeIterator for Iter<'_, D> {}

impl<D: Device + ?Sized> FusedIterator for Iter<'_, D> {}
