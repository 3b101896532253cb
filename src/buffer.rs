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

//! Whole-buffer encoding and decoding.
//!
//! Each direction comes in two shapes. The `*_into` functions write into a
//! buffer the caller owns and return a view of the bytes written; they check
//! the exact output length first and write nothing if it doesn't fit. The
//! `*_alloc` functions reserve exactly the output length and return an owned
//! [`Vec`]. Both shapes run the same transform and produce identical bytes.
//!
//! Valid Bottom data decodes to one byte per separator, so the decoders size
//! their output by counting separators and then decode in a single pass.

use super::decode::{decode_bytes, DecodeBytesResult};
use super::encode::encode_to_bytes;
use super::error::Error;
use super::glyph::encoded_group_len;
use super::MAX_EXPANSION_PER_BYTE;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// The caller-supplied buffer was smaller than the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("output needs {required} bytes but the buffer holds {capacity}")]
pub struct BufferTooSmall {
    pub required: usize,
    pub capacity: usize,
}

/// Exact length of the encoding of `input`.
pub fn encoded_len(input: &[u8]) -> usize {
    input.iter().copied().map(encoded_group_len).sum()
}

/// Upper bound on the encoded length of any `len`-byte input, or `None` if
/// it overflows `usize`.
pub fn max_encoded_len(len: usize) -> Option<usize> {
    len.checked_mul(MAX_EXPANSION_PER_BYTE)
}

/// Exact length `input` decodes to. Fails if `input` isn't valid Bottom data.
pub fn decoded_len(input: &[u8]) -> DecodeBytesResult<usize> {
    decode_bytes(input.iter().copied()).try_fold(0, |n, b| b.map(|_| n + 1))
}

// 👉👈
const SEPARATOR_UTF8: &[u8] = "\u{1f449}\u{1f448}".as_bytes();

/// Decoded length of `input` if it is valid. Invalid input may decode to
/// fewer bytes, never more.
fn separator_count(input: &[u8]) -> usize {
    let len = SEPARATOR_UTF8.len();
    input.windows(len).filter(|w| *w == SEPARATOR_UTF8).count()
}

fn fill<I>(out: &mut [u8], bytes: I) -> &[u8]
where
    I: Iterator<Item = u8>,
{
    let len = out.iter_mut().zip(bytes).map(|(slot, b)| *slot = b).count();
    &out[..len]
}

/// Encodes `input` into `out` and returns the written prefix of `out`.
///
/// If the encoding is longer than `out`, nothing is written.
pub fn encode_into<'a>(
    input: &[u8],
    out: &'a mut [u8],
) -> Result<&'a [u8], BufferTooSmall> {
    let required = encoded_len(input);
    if required > out.len() {
        return Err(BufferTooSmall {
            required,
            capacity: out.len(),
        });
    }
    Ok(fill(out, encode_to_bytes(input.iter().copied())))
}

/// Decodes `input` into `out` and returns the written prefix of `out`.
///
/// Invalid data is reported as [`Error::Decode`] whatever the buffer size.
/// If the output doesn't fit, nothing is written; if `input` is invalid, a
/// prefix of `out` may have been overwritten.
pub fn decode_into<'a>(
    input: &[u8],
    out: &'a mut [u8],
) -> Result<&'a [u8], Error> {
    let required = separator_count(input);
    let capacity = out.len();
    if required > capacity {
        decoded_len(input)?;
        return Err(BufferTooSmall {
            required,
            capacity,
        }
        .into());
    }
    let mut len = 0;
    for byte in decode_bytes(input.iter().copied()) {
        let byte = byte?;
        let slot = out.get_mut(len).ok_or(BufferTooSmall {
            required,
            capacity,
        })?;
        *slot = byte;
        len += 1;
    }
    Ok(&out[..len])
}

#[cfg(feature = "alloc")]
fn reserve_exact(len: usize) -> Result<Vec<u8>, Error> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(len).map_err(|source| Error::Alloc {
        len,
        source,
    })?;
    Ok(vec)
}

/// Encodes `input` into a newly allocated buffer of exactly the encoded
/// length.
///
/// The only possible error is [`Error::Alloc`].
#[cfg(feature = "alloc")]
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "alloc")))]
pub fn encode_alloc(input: &[u8]) -> Result<Vec<u8>, Error> {
    let mut vec = reserve_exact(encoded_len(input))?;
    vec.extend(encode_to_bytes(input.iter().copied()));
    Ok(vec)
}

/// Decodes `input` into a newly allocated buffer of exactly the decoded
/// length.
#[cfg(feature = "alloc")]
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "alloc")))]
pub fn decode_alloc(input: &[u8]) -> Result<Vec<u8>, Error> {
    let mut vec = reserve_exact(separator_count(input))?;
    for byte in decode_bytes(input.iter().copied()) {
        vec.push(byte?);
    }
    Ok(vec)
}
