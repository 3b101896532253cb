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

//! Error types shared by the whole-buffer operations and the C interface.

use super::buffer::BufferTooSmall;
use super::decode::{DecodeBytesError, DecodeError};

#[cfg(feature = "alloc")]
type AllocSource = alloc::collections::TryReserveError;
#[cfg(not(feature = "alloc"))]
type AllocSource = core::convert::Infallible;

/// Message for codes [`ErrorCode::from_u8`] doesn't recognize.
pub const UNKNOWN_ERROR_MESSAGE: &str = "unknown error";

/// Every message, indexed by code, with the fallback last. A `static`, so
/// each message handed out has one fixed address.
pub(crate) static MESSAGES: [&str; 5] = [
    "no error",
    "invalid input: not valid bottom data",
    "output buffer too small",
    "memory allocation failed",
    UNKNOWN_ERROR_MESSAGE,
];

/// Numeric error kinds reported across the C interface.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    #[default]
    NoError = 0,
    InvalidInput = 1,
    BufferTooSmall = 2,
    AllocationFailure = 3,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 4] = [
        ErrorCode::NoError,
        ErrorCode::InvalidInput,
        ErrorCode::BufferTooSmall,
        ErrorCode::AllocationFailure,
    ];

    pub const fn from_u8(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::NoError,
            1 => Self::InvalidInput,
            2 => Self::BufferTooSmall,
            3 => Self::AllocationFailure,
            _ => return None,
        })
    }

    pub fn message(self) -> &'static str {
        MESSAGES[self as usize]
    }
}

impl From<ErrorCode> for u8 {
    fn from(code: ErrorCode) -> u8 {
        code as u8
    }
}

/// Returns the message for a raw code, falling back to
/// [`UNKNOWN_ERROR_MESSAGE`]. Never empty.
pub fn message_for(code: u8) -> &'static str {
    match ErrorCode::from_u8(code) {
        Some(code) => code.message(),
        None => MESSAGES[MESSAGES.len() - 1],
    }
}

/// Any failure of the whole-buffer operations in [`crate::buffer`].
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input was not valid Bottom data.
    #[error("invalid input: {0}")]
    Decode(#[from] DecodeBytesError),
    /// The caller's buffer cannot hold the output.
    #[error(transparent)]
    BufferTooSmall(#[from] BufferTooSmall),
    /// The output buffer could not be allocated.
    #[error("could not allocate {len} bytes")]
    Alloc {
        len: usize,
        #[source]
        source: AllocSource,
    },
}

impl Error {
    /// The C-level code this error is reported as.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Decode(_) => ErrorCode::InvalidInput,
            Self::BufferTooSmall(_) => ErrorCode::BufferTooSmall,
            Self::Alloc { .. } => ErrorCode::AllocationFailure,
        }
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e.into())
    }
}
