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

//! The C interface declared in `include/bottom.h`.
//!
//! Every call except [`bottom_get_error`] records its outcome in a
//! last-error register: a failing encode or decode stores its
//! [`ErrorCode`], and any successful call resets it to
//! [`ErrorCode::NoError`]. Reading the register with [`bottom_get_error`]
//! doesn't change it. The register is thread-local, so each thread sees only
//! the outcome of its own calls.

mod slice;
mod state;

pub use slice::BottomSlice;

use crate::buffer;
use crate::error::{message_for, Error, ErrorCode};

use std::sync::Once;

/// Identifies this build; returned by [`bottom_get_version`]. A `static`, so
/// the returned slice always points at the same bytes.
pub static VERSION: &str = concat!("bottom ", env!("CARGO_PKG_VERSION"));

/// Same as [`crate::MAX_EXPANSION_PER_BYTE`], under its C name.
pub const BOTTOM_MAX_EXPANSION_SIZE_PER_BYTE: usize =
    crate::MAX_EXPANSION_PER_BYTE;

#[derive(Debug, thiserror::Error)]
enum CallError {
    #[error("null pointer passed with length {0}")]
    NullPointer(usize),
    #[error(transparent)]
    Codec(#[from] Error),
}

impl CallError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::NullPointer(_) => ErrorCode::InvalidInput,
            Self::Codec(e) => e.code(),
        }
    }
}

type CallResult<T> = Result<T, CallError>;

/// # Safety
///
/// Unless `data` is null, it must be valid for reads of `size` bytes for
/// `'a`.
unsafe fn input<'a>(data: *const u8, size: usize) -> CallResult<&'a [u8]> {
    match (data.is_null(), size) {
        (true, 0) => Ok(&[]),
        (true, n) => Err(CallError::NullPointer(n)),
        // SAFETY: Guaranteed by the caller.
        (false, n) => Ok(unsafe { std::slice::from_raw_parts(data, n) }),
    }
}

/// # Safety
///
/// Unless `buf` is null, it must be valid for writes of `size` bytes for
/// `'a` and not overlap any other live reference.
unsafe fn output<'a>(buf: *mut u8, size: usize) -> CallResult<&'a mut [u8]> {
    match (buf.is_null(), size) {
        (true, 0) => Ok(Default::default()),
        (true, n) => Err(CallError::NullPointer(n)),
        // SAFETY: Guaranteed by the caller.
        (false, n) => Ok(unsafe { std::slice::from_raw_parts_mut(buf, n) }),
    }
}

/// Runs one encode or decode call and records its outcome.
fn record<F>(op: &'static str, call: F) -> BottomSlice
where
    F: FnOnce() -> CallResult<BottomSlice>,
{
    match call() {
        Ok(slice) => {
            tracing::trace!(op, size = slice.size, "bottom call succeeded");
            state::set_last_error(ErrorCode::NoError);
            slice
        }
        Err(e) => {
            let code = e.code();
            tracing::debug!(
                op,
                code = u8::from(code),
                error = %e,
                "bottom call failed"
            );
            state::set_last_error(code);
            BottomSlice::empty()
        }
    }
}

#[cfg(windows)]
fn use_utf8_console() {
    const CP_UTF8: u32 = 65001;

    #[link(name = "kernel32")]
    extern "system" {
        fn SetConsoleOutputCP(code_page_id: u32) -> i32;
    }

    // SAFETY: Takes a plain integer and touches no memory we own.
    if unsafe { SetConsoleOutputCP(CP_UTF8) } == 0 {
        tracing::warn!("could not switch the console output to UTF-8");
    }
}

#[cfg(not(windows))]
fn use_utf8_console() {}

/// Prepares the host process for printing Bottom text. On Windows this
/// switches the console output code page to UTF-8; elsewhere it does
/// nothing.
///
/// Calling it more than once has no further effect, and encoding and
/// decoding work without it.
#[no_mangle]
pub extern "C" fn bottom_init_lib() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        use_utf8_console();
        tracing::debug!(version = VERSION, "bottom initialized");
    });
    state::set_last_error(ErrorCode::NoError);
}

/// Encodes `size` bytes at `data` into a new library-owned slice.
///
/// Empty input gives the null slice with [`ErrorCode::NoError`]. If the
/// output can't be allocated, the null slice is returned and the error is
/// [`ErrorCode::AllocationFailure`].
///
/// # Safety
///
/// Unless `data` is null, it must be valid for reads of `size` bytes. The
/// returned slice, if not null, must be freed with [`bottom_free_slice`].
#[no_mangle]
pub unsafe extern "C" fn bottom_encode_alloc(
    data: *const u8,
    size: usize,
) -> BottomSlice {
    record("encode_alloc", || {
        // SAFETY: Guaranteed by the caller.
        let input = unsafe { input(data, size) }?;
        Ok(BottomSlice::owned(buffer::encode_alloc(input)?))
    })
}

/// Encodes `size` bytes at `data` into the `buf_size`-byte buffer at `buf`.
///
/// Returns a slice pointing at `buf` with the encoded length. If the
/// encoding doesn't fit, nothing is written, the null slice is returned and
/// the error is [`ErrorCode::BufferTooSmall`]. A buffer of
/// `size * BOTTOM_MAX_EXPANSION_SIZE_PER_BYTE` bytes always fits.
///
/// # Safety
///
/// Unless null, `data` must be valid for reads of `size` bytes and `buf`
/// for writes of `buf_size` bytes, and the two regions must not overlap.
/// The returned slice belongs to the caller and must not be passed to
/// [`bottom_free_slice`].
#[no_mangle]
pub unsafe extern "C" fn bottom_encode_buf(
    data: *const u8,
    size: usize,
    buf: *mut u8,
    buf_size: usize,
) -> BottomSlice {
    record("encode_buf", || {
        // SAFETY: Guaranteed by the caller.
        let (input, out) =
            unsafe { (input(data, size)?, output(buf, buf_size)?) };
        let written = buffer::encode_into(input, out).map_err(Error::from)?;
        Ok(BottomSlice {
            data: buf,
            size: written.len(),
        })
    })
}

/// Decodes `size` bytes at `data` into a new library-owned slice.
///
/// Input that isn't valid Bottom data gives the null slice and
/// [`ErrorCode::InvalidInput`]. Empty input gives the null slice with
/// [`ErrorCode::NoError`].
///
/// # Safety
///
/// Same as [`bottom_encode_alloc`].
#[no_mangle]
pub unsafe extern "C" fn bottom_decode_alloc(
    data: *const u8,
    size: usize,
) -> BottomSlice {
    record("decode_alloc", || {
        // SAFETY: Guaranteed by the caller.
        let input = unsafe { input(data, size) }?;
        Ok(BottomSlice::owned(buffer::decode_alloc(input)?))
    })
}

/// Decodes `size` bytes at `data` into the `buf_size`-byte buffer at `buf`.
///
/// Invalid input is reported as [`ErrorCode::InvalidInput`] even when the
/// buffer is also too small; valid input that doesn't fit is reported as
/// [`ErrorCode::BufferTooSmall`] without writing to `buf`. Either way the
/// null slice is returned. After invalid input, the contents of `buf` are
/// unspecified.
///
/// # Safety
///
/// Same as [`bottom_encode_buf`].
#[no_mangle]
pub unsafe extern "C" fn bottom_decode_buf(
    data: *const u8,
    size: usize,
    buf: *mut u8,
    buf_size: usize,
) -> BottomSlice {
    record("decode_buf", || {
        // SAFETY: Guaranteed by the caller.
        let (input, out) =
            unsafe { (input(data, size)?, output(buf, buf_size)?) };
        let written = buffer::decode_into(input, out)?;
        Ok(BottomSlice {
            data: buf,
            size: written.len(),
        })
    })
}

/// Returns the code recorded by this thread's most recent call, or
/// [`ErrorCode::NoError`] if it succeeded or none was made. Reading the code
/// doesn't reset it.
#[no_mangle]
pub extern "C" fn bottom_get_error() -> u8 {
    state::last_error().into()
}

/// Returns a static message describing `error`. Unknown codes get a generic
/// message; the result is never empty and must not be freed.
///
/// This call succeeds, so it resets the error register.
#[no_mangle]
pub extern "C" fn bottom_get_error_string(error: u8) -> BottomSlice {
    state::set_last_error(ErrorCode::NoError);
    BottomSlice::from_static(message_for(error).as_bytes())
}

/// Returns the static [`VERSION`] string. It must not be freed.
#[no_mangle]
pub extern "C" fn bottom_get_version() -> BottomSlice {
    state::set_last_error(ErrorCode::NoError);
    BottomSlice::from_static(VERSION.as_bytes())
}

/// Frees a slice returned by [`bottom_encode_alloc`] or
/// [`bottom_decode_alloc`].
///
/// Null slices and the static slices from [`bottom_get_version`] and
/// [`bottom_get_error_string`] are ignored. Debug builds additionally
/// detect and ignore slices the library doesn't own, including ones already
/// freed.
///
/// # Safety
///
/// `slice` must be a library-owned slice that hasn't been freed yet, a null
/// slice or a static slice. Anything else is undefined behavior in release
/// builds.
#[no_mangle]
pub unsafe extern "C" fn bottom_free_slice(slice: BottomSlice) {
    // SAFETY: Guaranteed by the caller.
    unsafe { slice.release() };
    state::set_last_error(ErrorCode::NoError);
}
