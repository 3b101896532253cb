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

//! Encodes arbitrary bytes as Bottom and decodes them back.
//!
//! Every input byte becomes one *group*: the byte's value written greedily
//! as a sum of 🫂 (200), 💖 (50), ✨ (10), 🥺 (5) and `,` (1), or ❤️ for
//! zero, followed by the 👉👈 separator. Decoding accepts only groups in that
//! canonical form, so the encoding is injective.
//!
//! The [`encode`] and [`decode`] modules expose lazy iterator adapters,
//! [`buffer`] runs whole-buffer transforms into caller-supplied or freshly
//! allocated memory, and [`ffi`] exports the C interface declared in
//! `include/bottom.h`.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(feature = "doc_cfg", feature(doc_cfg))]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod buffer;
pub mod decode;
pub mod encode;
pub mod error;
#[cfg(feature = "ffi")]
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "ffi")))]
pub mod ffi;
mod glyph;
mod iter;

#[cfg(feature = "alloc")]
extern crate alloc;

/// Worst-case number of encoded bytes per input byte.
///
/// A buffer of `n * MAX_EXPANSION_PER_BYTE` bytes always fits the encoding
/// of `n` bytes. Byte 199 (`💖💖💖✨✨✨✨🥺,,,,👉👈`) reaches the bound.
pub const MAX_EXPANSION_PER_BYTE: usize = 40;

const SEPARATOR: [char; 2] = ['\u{1f449}', '\u{1f448}'];
const LEGACY_SEPARATOR: char = '\u{200b}';

// ❤️ is a heart followed by an emoji variation selector.
const ZERO: [char; 2] = ['\u{2764}', '\u{fe0f}'];

// 💖💖💖✨✨✨✨🥺,,,, plus the separator.
const MAX_CHARS_PER_GROUP: usize = 12 + SEPARATOR.len();

pub use buffer::{decode_into, decoded_len, encode_into, encoded_len};
#[cfg(feature = "alloc")]
pub use buffer::{decode_alloc, encode_alloc};

pub use decode::decode_bytes;
pub use decode::decode_chars;
pub use decode::decode_str;

pub use encode::encode_to_bytes;
pub use encode::encode_to_chars;
#[cfg(feature = "alloc")]
pub use encode::encode_to_string;

pub use error::{Error, ErrorCode};
