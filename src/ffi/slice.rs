/*
 * Copyright (C) 2026 The libbottom developers
 *
 * This file is part of libbottom.
 *
 * libbottom is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published
 * by the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * libbottom is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with libbottom. If not, see <https://www.gnu.org/licenses/>.
 */

use super::VERSION;
use crate::error::MESSAGES;

use std::{iter, ptr};

/// A length-tagged byte buffer, as passed across the C interface.
///
/// Depending on which function returned it, a slice is one of:
///
/// * **library-owned**: returned by `bottom_encode_alloc` and
///   `bottom_decode_alloc`; must be passed to `bottom_free_slice` exactly
///   once;
/// * **caller-owned**: returned by the `_buf` functions; points into the
///   caller's buffer and must not be freed by the library;
/// * **static**: returned by `bottom_get_version` and
///   `bottom_get_error_string`; lives forever and must not be freed.
///
/// A failed call returns a slice with null `data` and zero `size`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BottomSlice {
    pub data: *mut u8,
    pub size: usize,
}

impl BottomSlice {
    /// The null slice failed calls return.
    pub const fn empty() -> Self {
        Self {
            data: ptr::null_mut(),
            size: 0,
        }
    }

    pub fn is_null(&self) -> bool {
        self.data.is_null()
    }

    /// Views the bytes the slice points at.
    ///
    /// # Safety
    ///
    /// Unless `data` is null, it must point at `size` initialized bytes that
    /// stay valid and unmodified for `'a`.
    pub unsafe fn as_bytes<'a>(&self) -> &'a [u8] {
        if self.data.is_null() {
            &[]
        } else {
            // SAFETY: Guaranteed by the caller.
            unsafe { std::slice::from_raw_parts(self.data, self.size) }
        }
    }

    pub(crate) fn from_static(bytes: &'static [u8]) -> Self {
        Self {
            data: bytes.as_ptr() as *mut u8,
            size: bytes.len(),
        }
    }

    /// Hands `bytes` over to the caller. Empty output becomes the null slice,
    /// so a library-owned slice is never non-null with zero size.
    pub(crate) fn owned(bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            return Self::empty();
        }
        let boxed = bytes.into_boxed_slice();
        let size = boxed.len();
        let data = Box::into_raw(boxed) as *mut u8;
        ledger::insert(data, size);
        Self {
            data,
            size,
        }
    }

    /// Whether `data` points into the version string or one of the error
    /// messages.
    fn is_static(&self) -> bool {
        let data = self.data as usize;
        iter::once(VERSION).chain(MESSAGES).any(|s| {
            let start = s.as_ptr() as usize;
            (start..start + s.len()).contains(&data)
        })
    }

    /// Frees a slice created by [`Self::owned`].
    ///
    /// Null and static slices are ignored. Debug builds also refuse any
    /// pointer that isn't a live library allocation of exactly `size` bytes.
    ///
    /// # Safety
    ///
    /// The slice must have been returned by [`Self::owned`] and not released
    /// before, or be null or static.
    pub(crate) unsafe fn release(self) {
        if self.data.is_null() || self.size == 0 {
            return;
        }
        if self.is_static() {
            tracing::warn!(
                size = self.size,
                "ignoring free of a static slice"
            );
            return;
        }
        if !ledger::remove(self.data, self.size) {
            tracing::error!(
                data = ?self.data,
                size = self.size,
                "refusing to free a slice the library does not own"
            );
            return;
        }
        let raw = ptr::slice_from_raw_parts_mut(self.data, self.size);
        // SAFETY: Per this function's contract, `raw` came from
        // `Box::into_raw` in `Self::owned` and hasn't been freed since.
        drop(unsafe { Box::from_raw(raw) });
    }
}

/// Live library allocations, tracked in debug builds so misuse of
/// `bottom_free_slice` is caught instead of corrupting the heap.
#[cfg(debug_assertions)]
mod ledger {
    use std::collections::BTreeMap;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    static LIVE: Mutex<BTreeMap<usize, usize>> = Mutex::new(BTreeMap::new());

    fn live() -> MutexGuard<'static, BTreeMap<usize, usize>> {
        LIVE.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(data: *mut u8, size: usize) {
        live().insert(data as usize, size);
    }

    pub fn remove(data: *mut u8, size: usize) -> bool {
        let mut live = live();
        if live.get(&(data as usize)) != Some(&size) {
            return false;
        }
        live.remove(&(data as usize));
        true
    }
}

#[cfg(not(debug_assertions))]
mod ledger {
    pub fn insert(_data: *mut u8, _size: usize) {}

    pub fn remove(_data: *mut u8, _size: usize) -> bool {
        true
    }
}
