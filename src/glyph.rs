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

use super::{SEPARATOR, ZERO};

/// A valued symbol of the Bottom alphabet.
///
/// Variants are declared in ascending order of value, so the derived `Ord`
/// compares glyphs by the amount they contribute to a group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Glyph {
    Comma,
    Pleading,
    Sparkles,
    Heart,
    Hug,
}

impl Glyph {
    /// Every glyph, largest value first; the order the encoder emits them in.
    pub const DESCENDING: [Glyph; 5] = [
        Glyph::Hug,
        Glyph::Heart,
        Glyph::Sparkles,
        Glyph::Pleading,
        Glyph::Comma,
    ];

    pub const fn value(self) -> u8 {
        match self {
            Self::Hug => 200,
            Self::Heart => 50,
            Self::Sparkles => 10,
            Self::Pleading => 5,
            Self::Comma => 1,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            Self::Hug => '\u{1fac2}',
            Self::Heart => '\u{1f496}',
            Self::Sparkles => '\u{2728}',
            Self::Pleading => '\u{1f97a}',
            Self::Comma => ',',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        Self::DESCENDING.iter().copied().find(|g| g.as_char() == c)
    }

    /// The longest run of this glyph a canonical group can contain.
    ///
    /// The greedy decomposition leaves less than the next larger value once a
    /// glyph has been emitted, which bounds how often each smaller glyph can
    /// repeat (and a byte never reaches 400, so 🫂 appears at most once).
    pub const fn max_run(self) -> u8 {
        match self {
            Self::Hug => 1,
            Self::Heart => 3,
            Self::Sparkles => 4,
            Self::Pleading => 1,
            Self::Comma => 4,
        }
    }
}

const fn chars_utf8_len(chars: &[char]) -> usize {
    let mut len = 0;
    let mut i = 0;
    while i < chars.len() {
        len += chars[i].len_utf8();
        i += 1;
    }
    len
}

const fn group_utf8_len(byte: u8) -> usize {
    let separator = chars_utf8_len(&SEPARATOR);
    if byte == 0 {
        return chars_utf8_len(&ZERO) + separator;
    }
    let mut rest = byte;
    let mut len = separator;
    let mut i = 0;
    while i < Glyph::DESCENDING.len() {
        let glyph = Glyph::DESCENDING[i];
        while rest >= glyph.value() {
            rest -= glyph.value();
            len += glyph.as_char().len_utf8();
        }
        i += 1;
    }
    len
}

const GROUP_UTF8_LEN: [u8; 256] = {
    let mut table = [0; 256];
    let mut i = 0;
    while i < table.len() {
        table[i] = group_utf8_len(i as u8) as u8;
        i += 1;
    }
    table
};

/// Number of UTF-8 bytes `byte` encodes to, separator included.
pub fn encoded_group_len(byte: u8) -> usize {
    usize::from(GROUP_UTF8_LEN[usize::from(byte)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_EXPANSION_PER_BYTE;

    #[test]
    fn glyph_values_round_trip_through_chars() {
        for glyph in Glyph::DESCENDING {
            assert_eq!(Glyph::from_char(glyph.as_char()), Some(glyph));
        }
        assert_eq!(Glyph::from_char('a'), None);
        assert_eq!(Glyph::from_char('\u{2764}'), None);
    }

    #[test]
    fn descending_order_matches_ord() {
        let mut sorted = Glyph::DESCENDING;
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(sorted, Glyph::DESCENDING);
    }

    #[test]
    fn group_lengths() {
        assert_eq!(encoded_group_len(0), 14);
        assert_eq!(encoded_group_len(1), 9);
        assert_eq!(encoded_group_len(255), 20);
        assert_eq!(encoded_group_len(199), MAX_EXPANSION_PER_BYTE);
        let worst = (0..=255).map(encoded_group_len).max();
        assert_eq!(worst, Some(MAX_EXPANSION_PER_BYTE));
    }
}
