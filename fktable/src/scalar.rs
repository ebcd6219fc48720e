//! Numeric types FK tables can be stored in, and the aligned buffers used to convolve them.

use super::error::{Error, Result};
use std::alloc::{self, Layout};
use std::fmt::{Debug, LowerExp};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::str::FromStr;
use std::{mem, slice};

/// Alignment in bytes of the buffers returned by [`AlignedBuffer::new`].
pub const BUFFER_ALIGNMENT: usize = 16;

/// Floating-point type that the values of an FK table are stored in.
pub trait Scalar:
    Copy + Debug + Default + FromStr + LowerExp + PartialEq + PartialOrd + Send + Sync + 'static
{
    /// The number of elements the length of a datapoint row must be a multiple of, so that
    /// [`Scalar::dot`] can process rows in whole steps.
    const ALIGNMENT: usize;

    /// Converts `value` to `Self`, rounding if necessary.
    fn from_f64(value: f64) -> Self;

    /// Converts `self` into an `f64`.
    fn to_f64(self) -> f64;

    /// Returns the dot product of `lhs` and `rhs`. Both slices must have the same length, which
    /// must be a multiple of [`Scalar::ALIGNMENT`].
    fn dot(lhs: &[Self], rhs: &[Self]) -> Self;
}

/// Returns [`Scalar::ALIGNMENT`] of `T`.
#[must_use]
pub const fn alignment_factor<T: Scalar>() -> usize {
    T::ALIGNMENT
}

impl Scalar for f32 {
    const ALIGNMENT: usize = 4;

    fn from_f64(value: f64) -> Self {
        value as Self
    }

    fn to_f64(self) -> f64 {
        self.into()
    }

    fn dot(lhs: &[Self], rhs: &[Self]) -> Self {
        debug_assert_eq!(lhs.len(), rhs.len());
        debug_assert_eq!(lhs.len() % Self::ALIGNMENT, 0);

        // four independent lanes that the compiler maps onto a single SIMD register
        let mut acc = [0.0; 4];

        for (a, b) in lhs.chunks_exact(4).zip(rhs.chunks_exact(4)) {
            for ((acc, a), b) in acc.iter_mut().zip(a).zip(b) {
                *acc += a * b;
            }
        }

        (acc[0] + acc[2]) + (acc[1] + acc[3])
    }
}

impl Scalar for f64 {
    const ALIGNMENT: usize = 1;

    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn dot(lhs: &[Self], rhs: &[Self]) -> Self {
        debug_assert_eq!(lhs.len(), rhs.len());

        lhs.iter().zip(rhs).map(|(a, b)| a * b).sum()
    }
}

/// Returns the number of padding elements that must be appended to `len` elements to make the
/// result a multiple of the alignment of `T`.
#[must_use]
pub const fn padding<T: Scalar>(len: usize) -> usize {
    let remainder = len % T::ALIGNMENT;

    if remainder == 0 {
        0
    } else {
        T::ALIGNMENT - remainder
    }
}

/// Heap buffer of zero-initialized `T`s whose first element is aligned to [`BUFFER_ALIGNMENT`]
/// bytes. The buffer dereferences to a slice.
pub struct AlignedBuffer<T: Scalar> {
    ptr: NonNull<T>,
    len: usize,
}

impl<T: Scalar> AlignedBuffer<T> {
    fn layout(len: usize) -> Option<Layout> {
        let size = mem::size_of::<T>().checked_mul(len)?;
        Layout::from_size_align(size, BUFFER_ALIGNMENT.max(mem::align_of::<T>())).ok()
    }

    /// Allocates a buffer of `len` elements, all set to `T::default()`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Range`] if the allocation fails.
    pub fn new(len: usize) -> Result<Self> {
        let layout = Self::layout(len).ok_or_else(|| {
            Error::Range(format!("aligned buffer of {len} elements exceeds the address space"))
        })?;

        if layout.size() == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                len,
            });
        }

        // SAFETY: `layout` has a non-zero size
        let raw = unsafe { alloc::alloc(layout) }.cast::<T>();
        let ptr = NonNull::new(raw)
            .ok_or_else(|| Error::Range(format!("aligned allocation of {len} elements failed")))?;

        for index in 0..len {
            // SAFETY: `index` is within the allocation, which is properly aligned for `T`
            unsafe { ptr.as_ptr().add(index).write(T::default()) };
        }

        Ok(Self { ptr, len })
    }
}

impl<T: Scalar> Deref for AlignedBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        // SAFETY: `ptr` points to `len` initialized elements, or is dangling with a zero-sized
        // layout
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Scalar> DerefMut for AlignedBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: see `deref`; `&mut self` guarantees exclusive access
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Scalar> Drop for AlignedBuffer<T> {
    fn drop(&mut self) {
        if let Some(layout) = Self::layout(self.len).filter(|layout| layout.size() != 0) {
            // SAFETY: the buffer was allocated in `new` with the same layout
            unsafe { alloc::dealloc(self.ptr.as_ptr().cast(), layout) };
        }
    }
}

// SAFETY: the buffer exclusively owns its elements, which are `Send` and `Sync`
unsafe impl<T: Scalar> Send for AlignedBuffer<T> {}
// SAFETY: see above
unsafe impl<T: Scalar> Sync for AlignedBuffer<T> {}
