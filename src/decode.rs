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

//! Functions and types for decoding Bottom data.

use super::glyph::Glyph;
use super::iter::{ErrStash, HasSource, Source};
use super::{LEGACY_SEPARATOR, SEPARATOR, ZERO};

use core::fmt::{self, Debug, Display, Formatter};
use core::iter::FusedIterator;
use core::str::Chars;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// An error encountered while decoding a [`str`] or sequence of [`char`]s.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Encountered a character outside the Bottom alphabet.
    #[error("bad character: {0:?}")]
    BadChar(char),
    /// A group's glyphs were not the canonical encoding of a byte.
    #[error("group is not a canonical byte encoding")]
    NonCanonical,
    /// A separator appeared with no glyphs before it.
    #[error("empty group")]
    EmptyGroup,
    /// The input ended partway through a group or separator.
    #[error("input ended in the middle of a group")]
    Truncated,
}

use DecodeError as Error;

/// Alias of <code>[Result]\<T, [DecodeError]></code>.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Error information for [`DecodeBytesError::InvalidUtf8`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct InvalidUtf8 {
    bytes: [u8; 4],
    len: u8,
}

impl InvalidUtf8 {
    /// The bytes that were invalid UTF-8.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }
}

impl Debug for InvalidUtf8 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InvalidUtf8").field(&self.bytes()).finish()
    }
}

impl Display for InvalidUtf8 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "invalid UTF-8: {:?}", self.bytes())
    }
}

impl core::error::Error for InvalidUtf8 {}

/// An error encountered while decoding a sequence of bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeBytesError {
    /// The provided bytes were not valid UTF-8.
    #[error(transparent)]
    InvalidUtf8(InvalidUtf8),
    /// A different decoding error occurred.
    #[error(transparent)]
    DecodeError(#[from] DecodeError),
}

/// Alias of <code>[Result]\<T, [DecodeBytesError]></code>.
pub type DecodeBytesResult<T> = Result<T, DecodeBytesError>;

/// Accumulates the glyphs of one group and checks that they appear in the
/// order and multiplicity the encoder would have produced.
#[derive(Default)]
struct Group {
    sum: u16,
    last: Option<Glyph>,
    run: u8,
    zero: bool,
}

impl Group {
    fn is_empty(&self) -> bool {
        !self.zero && self.last.is_none()
    }

    fn push(&mut self, glyph: Glyph) -> DecodeResult<()> {
        if self.zero {
            return Err(Error::NonCanonical);
        }
        self.run = match self.last {
            Some(last) if glyph > last => return Err(Error::NonCanonical),
            Some(last) if glyph == last => self.run + 1,
            _ => 1,
        };
        self.sum += u16::from(glyph.value());
        if self.run > glyph.max_run() || self.sum > u16::from(u8::MAX) {
            return Err(Error::NonCanonical);
        }
        self.last = Some(glyph);
        Ok(())
    }

    fn push_zero(&mut self) -> DecodeResult<()> {
        if !self.is_empty() {
            return Err(Error::NonCanonical);
        }
        self.zero = true;
        Ok(())
    }

    fn finish(self) -> DecodeResult<u8> {
        if self.is_empty() {
            return Err(Error::EmptyGroup);
        }
        // `push` rejects any sum above `u8::MAX`.
        Ok(self.sum as u8)
    }
}

struct CharsToBytes<I> {
    iter: I,
    config: DecodeConfig,
    done: bool,
}

impl<I> CharsToBytes<I> {
    pub fn new(iter: I, config: DecodeConfig) -> Self {
        Self {
            iter,
            config,
            done: false,
        }
    }
}

impl<I> CharsToBytes<I>
where
    I: Iterator<Item = char>,
{
    fn next_char(&mut self) -> Option<char> {
        let c = self.iter.next();
        self.done |= c.is_none();
        c
    }

    /// Expects `second` to follow `first`, which has just been read.
    fn expect_pair(&mut self, first: char, second: char) -> DecodeResult<()> {
        match self.next_char() {
            Some(c) if c == second => Ok(()),
            Some(_) => Err(Error::BadChar(first)),
            None => Err(Error::Truncated),
        }
    }

    fn read_group(&mut self) -> DecodeResult<Option<u8>> {
        let mut group = Group::default();
        loop {
            let c = match self.next_char() {
                Some(c) => c,
                None if group.is_empty() => return Ok(None),
                None if self.config.relaxed => return group.finish().map(Some),
                None => return Err(Error::Truncated),
            };
            match c {
                c if c == SEPARATOR[0] => {
                    self.expect_pair(c, SEPARATOR[1])?;
                    return group.finish().map(Some);
                }
                LEGACY_SEPARATOR if self.config.legacy_separator => {
                    return group.finish().map(Some);
                }
                c if c == ZERO[0] => {
                    self.expect_pair(c, ZERO[1])?;
                    group.push_zero()?;
                }
                c => {
                    let glyph = Glyph::from_char(c).ok_or(Error::BadChar(c))?;
                    group.push(glyph)?;
                }
            }
        }
    }
}

impl<I: HasSource> HasSource for CharsToBytes<I> {
    type Source = I::Source;

    fn source(&self) -> &Self::Source {
        self.iter.source()
    }
}

impl<I> Iterator for CharsToBytes<I>
where
    I: Iterator<Item = char>,
{
    type Item = DecodeResult<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.read_group();
        if result.is_err() {
            self.done = true;
        }
        result.transpose()
    }
}

impl<I: Iterator<Item = char>> FusedIterator for CharsToBytes<I> {}

/// Iterator returned by [`decode_chars`].
pub struct CharDecoder<I>(CharsToBytes<Source<I>>);

impl<I> CharDecoder<I> {
    pub(crate) fn new(iter: I, config: DecodeConfig) -> Self {
        Self(CharsToBytes::new(Source(iter), config))
    }
}

impl<I> HasSource for CharDecoder<I> {
    type Source = I;

    fn source(&self) -> &I {
        self.0.source()
    }
}

impl<I> Iterator for CharDecoder<I>
where
    I: Iterator<Item = char>,
{
    type Item = DecodeResult<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // With the legacy separator a group can be as short as two chars,
        // and a relaxed final group as short as one.
        let (_, upper) = self.source().size_hint();
        (0, upper.map(|n| n / 2 + 1))
    }
}

// `CharsToBytes` tracks its own end, so `CharDecoder` is fused even if `I`
// isn't.
impl<I: Iterator<Item = char>> FusedIterator for CharDecoder<I> {}

struct Utf8ToChars<I>(I);

impl<I> Utf8ToChars<I> {
    pub fn new(iter: I) -> Self {
        Self(iter)
    }
}

impl<I: HasSource> HasSource for Utf8ToChars<I> {
    type Source = I::Source;

    fn source(&self) -> &Self::Source {
        self.0.source()
    }
}

impl<I> Iterator for Utf8ToChars<I>
where
    I: Iterator<Item = u8>,
{
    type Item = Result<char, InvalidUtf8>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut bytes = [self.0.next()?, 0, 0, 0];
        let mut len = 1;
        loop {
            match core::str::from_utf8(&bytes[..len]) {
                Ok(s) => {
                    if let Some(c) = s.chars().next() {
                        return Some(Ok(c));
                    }
                }
                Err(e) if e.error_len().is_none() && len < bytes.len() => {
                    if let Some(b) = self.0.next() {
                        bytes[len] = b;
                        len += 1;
                        continue;
                    }
                }
                Err(_) => {}
            }
            return Some(Err(InvalidUtf8 {
                bytes,
                len: len as u8,
            }));
        }
    }
}

/// Iterator returned by [`decode_bytes`].
pub struct BytesDecoder<I>(
    CharDecoder<ErrStash<Utf8ToChars<Source<I>>, InvalidUtf8>>,
);

impl<I> BytesDecoder<I> {
    pub(crate) fn new(iter: I, config: DecodeConfig) -> Self {
        Self(CharDecoder::new(
            ErrStash::new(Utf8ToChars::new(Source(iter))),
            config,
        ))
    }
}

impl<I> Iterator for BytesDecoder<I>
where
    I: Iterator<Item = u8>,
{
    type Item = DecodeBytesResult<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.0.next();
        // Bad UTF-8 ends the char stream early, which the char decoder
        // reports as a clean end or a truncated group. Either way the UTF-8
        // error is the one worth surfacing.
        if let Some(e) = self.0.source().take_err() {
            return Some(Err(DecodeBytesError::InvalidUtf8(e)));
        }
        Some(item?.map_err(DecodeBytesError::DecodeError))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // Shortest group: `,` and the 3-byte legacy separator.
        let (_, upper) = self.0.source().source().size_hint();
        (0, upper.map(|n| n / 4 + 1))
    }
}

impl<I: Iterator<Item = u8>> FusedIterator for BytesDecoder<I> {}

/// Iterator returned by [`decode_str`].
pub struct StrDecoder<'a>(CharDecoder<Chars<'a>>);

impl<'a> StrDecoder<'a> {
    pub(crate) fn new(s: &'a str, config: DecodeConfig) -> Self {
        Self(CharDecoder::new(s.chars(), config))
    }
}

impl Iterator for StrDecoder<'_> {
    type Item = DecodeResult<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.source().as_str().len();
        (0, Some(len / 4 + 1))
    }
}

impl FusedIterator for StrDecoder<'_> {}

/// Decodes a sequence of Bottom chars.
pub fn decode_chars<I>(chars: I) -> CharDecoder<I::IntoIter>
where
    I: IntoIterator<Item = char>,
{
    decode_chars_with(chars, DecodeConfig::new())
}

/// Decodes UTF-8 Bottom data.
pub fn decode_bytes<I>(bytes: I) -> BytesDecoder<I::IntoIter>
where
    I: IntoIterator<Item = u8>,
{
    decode_bytes_with(bytes, DecodeConfig::new())
}

/// Decodes a Bottom `str`.
pub fn decode_str(s: &str) -> StrDecoder<'_> {
    decode_str_with(s, DecodeConfig::new())
}

/// Used by the `decode_*_with` functions to configure the decoding process.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeConfig {
    /// If true, the final group may omit its separator. [default: false]
    pub relaxed: bool,
    /// Whether to also accept U+200B (zero-width space) as a separator, as
    /// written by the first revision of Bottom. [default: false]
    pub legacy_separator: bool,
}

impl DecodeConfig {
    /// Returns the default configuration, which accepts exactly what the
    /// encoder produces.
    pub const fn new() -> Self {
        Self {
            relaxed: false,
            legacy_separator: false,
        }
    }
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Decodes a sequence of Bottom chars with the given config.
///
/// This function is like [`decode_chars`], but takes a configuration object.
pub fn decode_chars_with<I>(
    chars: I,
    config: DecodeConfig,
) -> CharDecoder<I::IntoIter>
where
    I: IntoIterator<Item = char>,
{
    CharDecoder::new(chars.into_iter(), config)
}

/// Decodes UTF-8 Bottom data with the given config.
///
/// This function is like [`decode_bytes`], but takes a configuration object.
pub fn decode_bytes_with<I>(
    bytes: I,
    config: DecodeConfig,
) -> BytesDecoder<I::IntoIter>
where
    I: IntoIterator<Item = u8>,
{
    BytesDecoder::new(bytes.into_iter(), config)
}

/// Decodes a Bottom `str` with the given config.
///
/// This function is like [`decode_str`], but takes a configuration object.
pub fn decode_str_with(s: &str, config: DecodeConfig) -> StrDecoder<'_> {
    StrDecoder::new(s, config)
}

/// Takes a decoder and stores the contents in a [`Vec`].
///
/// This is equivalent to calling [`decoder.collect()`](Iterator::collect).
#[cfg(feature = "alloc")]
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "alloc")))]
pub fn decode_to_vec<D, E>(decoder: D) -> Result<Vec<u8>, E>
where
    D: Iterator<Item = Result<u8, E>>,
{
    decoder.collect()
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use super::*;
    use crate::encode::encode_to_string;
    use alloc::vec;

    fn decode(s: &str) -> DecodeResult<Vec<u8>> {
        decode_to_vec(decode_str(s))
    }

    #[test]
    fn decodes_known_vectors() {
        assert_eq!(
            decode("💖✨✨,,👉👈💖💖,👉👈💖💖🥺,,,👉👈💖💖🥺,,,👉👈💖💖✨,👉👈"),
            Ok(b"Hello".to_vec()),
        );
        assert_eq!(decode("❤\u{fe0f}👉👈"), Ok(vec![0]));
        assert_eq!(decode("🫂💖🥺👉👈"), Ok(vec![255]));
        assert_eq!(decode(""), Ok(vec![]));
    }

    #[test]
    fn every_byte_round_trips() {
        for byte in 0..=255_u8 {
            assert_eq!(decode(&encode_to_string([byte])), Ok(vec![byte]));
        }
    }

    #[test]
    fn rejects_foreign_chars() {
        assert_eq!(decode("Hello, world!"), Err(Error::BadChar('H')));
        assert_eq!(decode("💖\u{7}👉👈"), Err(Error::BadChar('\u{7}')));
    }

    #[test]
    fn rejects_non_canonical_groups() {
        // 5 as five commas instead of 🥺.
        assert_eq!(decode(",,,,,👉👈"), Err(Error::NonCanonical));
        // Ascending order.
        assert_eq!(decode("✨💖👉👈"), Err(Error::NonCanonical));
        // 🫂🫂 would be 400.
        assert_eq!(decode("🫂🫂👉👈"), Err(Error::NonCanonical));
        // 🫂💖💖 is 300.
        assert_eq!(decode("🫂💖💖👉👈"), Err(Error::NonCanonical));
        assert_eq!(decode("❤\u{fe0f},👉👈"), Err(Error::NonCanonical));
        assert_eq!(decode(",❤\u{fe0f}👉👈"), Err(Error::NonCanonical));
    }

    #[test]
    fn rejects_bad_framing() {
        assert_eq!(decode("👉👈"), Err(Error::EmptyGroup));
        assert_eq!(decode("💖👉👈👉👈"), Err(Error::EmptyGroup));
        assert_eq!(decode("💖"), Err(Error::Truncated));
        assert_eq!(decode("💖👉"), Err(Error::Truncated));
        assert_eq!(decode("💖👉💖"), Err(Error::BadChar('\u{1f449}')));
        assert_eq!(decode("❤"), Err(Error::Truncated));
        assert_eq!(decode("❤👉👈"), Err(Error::BadChar('\u{2764}')));
    }

    #[test]
    fn relaxed_accepts_missing_final_separator() {
        let config = DecodeConfig {
            relaxed: true,
            ..DecodeConfig::new()
        };
        let decoded = decode_to_vec(decode_str_with("💖👉👈💖,", config));
        assert_eq!(decoded, Ok(vec![50, 51]));
        let decoded = decode_to_vec(decode_str_with("💖👉", config));
        assert_eq!(decoded, Err(Error::Truncated));
    }

    #[test]
    fn legacy_separator_is_opt_in() {
        let input = "💖\u{200b}💖,\u{200b}";
        assert_eq!(decode(input), Err(Error::BadChar('\u{200b}')));
        let config = DecodeConfig {
            legacy_separator: true,
            ..DecodeConfig::new()
        };
        let decoded = decode_to_vec(decode_str_with(input, config));
        assert_eq!(decoded, Ok(vec![50, 51]));
    }

    #[test]
    fn bytes_decoder_reports_invalid_utf8() {
        let mut input = "💖👉👈".as_bytes().to_vec();
        input.extend_from_slice(&[0xf0, 0x9f, 0xff]);
        let decoded: DecodeBytesResult<Vec<u8>> =
            decode_to_vec(decode_bytes(input.iter().copied()));
        match decoded {
            Err(DecodeBytesError::InvalidUtf8(e)) => {
                assert_eq!(e.bytes(), [0xf0, 0x9f, 0xff]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn bytes_decoder_stops_after_error() {
        let mut decoder = decode_bytes(*b"\xff,,");
        assert!(matches!(
            decoder.next(),
            Some(Err(DecodeBytesError::InvalidUtf8(_))),
        ));
        assert_eq!(decoder.next(), None);
    }
}
