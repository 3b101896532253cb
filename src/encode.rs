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

//! Functions and types for encoding data as Bottom.

use super::glyph::Glyph;
use super::iter::{Flatten, HasSource, Source};
use super::{MAX_CHARS_PER_GROUP, MAX_EXPANSION_PER_BYTE, SEPARATOR, ZERO};

use core::array;
use core::iter::{Fuse, FusedIterator, Take};

#[cfg(feature = "alloc")]
use alloc::{string::String, vec::Vec};

// Fewest chars a group can have: one glyph plus the separator.
const MIN_CHARS_PER_GROUP: usize = 1 + SEPARATOR.len();

// Fewest UTF-8 bytes a group can have: `,` plus the separator.
const MIN_BYTES_PER_GROUP: usize = 9;

struct BytesToUnflatChars<I>(I);

impl<I> BytesToUnflatChars<I> {
    pub fn new(iter: I) -> Self {
        Self(iter)
    }
}

impl<I: HasSource> HasSource for BytesToUnflatChars<I> {
    type Source = I::Source;

    fn source(&self) -> &Self::Source {
        self.0.source()
    }
}

type BytesToUnflatCharsItem =
    Take<array::IntoIter<char, MAX_CHARS_PER_GROUP>>;

impl<I> Iterator for BytesToUnflatChars<I>
where
    I: Iterator<Item = u8>,
{
    type Item = BytesToUnflatCharsItem;

    fn next(&mut self) -> Option<Self::Item> {
        let byte = self.0.next()?;
        let mut chars = ['\0'; MAX_CHARS_PER_GROUP];
        let mut len = 0;
        if byte == 0 {
            chars[..ZERO.len()].copy_from_slice(&ZERO);
            len = ZERO.len();
        } else {
            let mut rest = byte;
            for glyph in Glyph::DESCENDING {
                while rest >= glyph.value() {
                    rest -= glyph.value();
                    chars[len] = glyph.as_char();
                    len += 1;
                }
            }
        }
        chars[len..len + SEPARATOR.len()].copy_from_slice(&SEPARATOR);
        len += SEPARATOR.len();
        Some(IntoIterator::into_iter(chars).take(len))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<I: FusedIterator<Item = u8>> FusedIterator for BytesToUnflatChars<I> {}

/// Iterator returned by [`encode_to_chars`].
pub struct CharEncoder<I>(
    Flatten<BytesToUnflatChars<Source<Fuse<I>>>, BytesToUnflatCharsItem>,
);

impl<I: Iterator> CharEncoder<I> {
    pub(crate) fn new(iter: I) -> Self {
        Self(Flatten::new(BytesToUnflatChars::new(Source(iter.fuse()))))
    }
}

impl<I> HasSource for CharEncoder<I> {
    type Source = Fuse<I>;

    fn source(&self) -> &Self::Source {
        self.0.source()
    }
}

impl<I> Iterator for CharEncoder<I>
where
    I: Iterator<Item = u8>,
{
    type Item = char;

    fn next(&mut self) -> Option<char> {
        self.0.next()
    }

    fn fold<B, F>(self, init: B, f: F) -> B
    where
        F: FnMut(B, Self::Item) -> B,
    {
        self.0.fold(init, f)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.source().size_hint();
        let pending = self.0.pending();
        (
            lower
                .saturating_mul(MIN_CHARS_PER_GROUP)
                .saturating_add(pending),
            upper
                .and_then(|n| n.checked_mul(MAX_CHARS_PER_GROUP))
                .and_then(|n| n.checked_add(pending)),
        )
    }
}

impl<I: Iterator<Item = u8>> FusedIterator for CharEncoder<I> {}

struct CharsToUnflatUtf8<I>(I);

impl<I> CharsToUnflatUtf8<I> {
    pub fn new(iter: I) -> Self {
        Self(iter)
    }
}

impl<I: HasSource> HasSource for CharsToUnflatUtf8<I> {
    type Source = I::Source;

    fn source(&self) -> &Self::Source {
        self.0.source()
    }
}

type CharsToUnflatUtf8Item = Take<array::IntoIter<u8, 4>>;

impl<I> Iterator for CharsToUnflatUtf8<I>
where
    I: Iterator<Item = char>,
{
    type Item = CharsToUnflatUtf8Item;

    fn next(&mut self) -> Option<Self::Item> {
        let mut bytes = [0; 4];
        let len = self.0.next()?.encode_utf8(&mut bytes).len();
        Some(IntoIterator::into_iter(bytes).take(len))
    }
}

impl<I: FusedIterator<Item = char>> FusedIterator for CharsToUnflatUtf8<I> {}

/// Iterator returned by [`encode_to_bytes`].
pub struct Utf8Encoder<I>(
    Flatten<CharsToUnflatUtf8<CharEncoder<I>>, CharsToUnflatUtf8Item>,
);

impl<I: Iterator> Utf8Encoder<I> {
    pub(crate) fn new(iter: I) -> Self {
        Self(Flatten::new(CharsToUnflatUtf8::new(CharEncoder::new(iter))))
    }
}

impl<I> Iterator for Utf8Encoder<I>
where
    I: Iterator<Item = u8>,
{
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        self.0.next()
    }

    fn fold<B, F>(self, init: B, f: F) -> B
    where
        F: FnMut(B, Self::Item) -> B,
    {
        self.0.fold(init, f)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.0.source().size_hint();
        // A partially emitted group can have at most one group's worth of
        // bytes left, on top of whatever the remaining input produces.
        (
            lower.saturating_mul(MIN_BYTES_PER_GROUP),
            upper
                .and_then(|n| n.checked_add(1))
                .and_then(|n| n.checked_mul(MAX_EXPANSION_PER_BYTE)),
        )
    }
}

impl<I: Iterator<Item = u8>> FusedIterator for Utf8Encoder<I> {}

/// Encodes bytes as a sequence of Bottom [`char`]s.
pub fn encode_to_chars<I>(bytes: I) -> CharEncoder<I::IntoIter>
where
    I: IntoIterator<Item = u8>,
{
    CharEncoder::new(bytes.into_iter())
}

/// Encodes bytes as UTF-8 Bottom data.
pub fn encode_to_bytes<I>(bytes: I) -> Utf8Encoder<I::IntoIter>
where
    I: IntoIterator<Item = u8>,
{
    Utf8Encoder::new(bytes.into_iter())
}

/// Encodes bytes as a Bottom [`String`].
#[cfg(feature = "alloc")]
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "alloc")))]
pub fn encode_to_string<I>(bytes: I) -> String
where
    I: IntoIterator<Item = u8>,
{
    encode_to_chars(bytes).collect()
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn encodes_known_vectors() {
        assert_eq!(
            encode_to_string(*b"Test"),
            "💖✨✨✨,,,,👉👈💖💖,👉👈💖💖✨🥺👉👈💖💖✨🥺,👉👈",
        );
        assert_eq!(encode_to_string([0]), "❤\u{fe0f}👉👈");
        assert_eq!(encode_to_string([255]), "🫂💖🥺👉👈");
        assert_eq!(encode_to_string([0_u8; 0]), "");
    }

    #[test]
    fn bytes_match_chars() {
        let input: Vec<u8> = (0..=255).collect();
        let bytes: Vec<u8> = encode_to_bytes(input.iter().copied()).collect();
        assert_eq!(bytes, encode_to_string(input).into_bytes());
    }

    #[test]
    fn size_hint_brackets_output() {
        for input in [vec![], vec![0], vec![1, 199, 255], vec![199; 17]] {
            let mut encoder = encode_to_bytes(input.iter().copied());
            let mut remaining = encode_to_bytes(input.iter().copied()).count();
            loop {
                let (lower, upper) = encoder.size_hint();
                assert!(lower <= remaining);
                assert!(upper.map_or(true, |n| n >= remaining));
                if encoder.next().is_none() {
                    break;
                }
                remaining -= 1;
            }
        }
    }
}
