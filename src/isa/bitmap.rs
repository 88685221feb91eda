// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Fixed-width ISA extension bitmap indexed by canonical extension bit.
// Author: Lukas Bower

//! ISA extension bitmap.

use core::fmt;

use serde::Serialize;

/// Number of extension bits tracked.
pub const ISA_EXT_MAX: usize = 64;

/// First bit available to multi-letter extensions; bits below are `a..=z`.
pub const ISA_EXT_BASE: usize = 26;

const WORD_BITS: usize = u64::BITS as usize;
const WORDS: usize = ISA_EXT_MAX.div_ceil(WORD_BITS);

/// Bit index of a single-letter extension.
#[must_use]
pub fn letter_bit(letter: u8) -> Option<usize> {
    letter
        .is_ascii_lowercase()
        .then(|| usize::from(letter - b'a'))
}

/// Set of extension bits below [`ISA_EXT_MAX`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct IsaBitmap {
    words: [u64; WORDS],
}

impl IsaBitmap {
    /// Empty bitmap.
    #[must_use]
    pub const fn new() -> Self {
        Self { words: [0; WORDS] }
    }

    /// Set `bit`. Returns `false` and leaves the map unchanged when out of range.
    pub fn set(&mut self, bit: usize) -> bool {
        if bit >= ISA_EXT_MAX {
            return false;
        }
        self.words[bit / WORD_BITS] |= 1 << (bit % WORD_BITS);
        true
    }

    /// Whether `bit` is set; `false` for out-of-range bits.
    #[must_use]
    pub fn test(&self, bit: usize) -> bool {
        bit < ISA_EXT_MAX && self.words[bit / WORD_BITS] & (1 << (bit % WORD_BITS)) != 0
    }

    /// Keep only the bits also present in `other`.
    pub fn and_assign(&mut self, other: &IsaBitmap) {
        for (word, theirs) in self.words.iter_mut().zip(other.words.iter()) {
            *word &= theirs;
        }
    }

    /// Whether no bit is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// First bitmap word, holding the single-letter extensions.
    #[must_use]
    pub fn base_word(&self) -> u64 {
        self.words[0]
    }

    /// Letters of the single-letter extensions present, in alphabetical order.
    #[must_use]
    pub fn base_letters(&self) -> heapless::String<26> {
        letters_of(self.base_word())
    }

    /// Iterate over set bit indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..ISA_EXT_MAX).filter(move |&bit| self.test(bit))
    }
}

/// Render bits 0..26 of `word` as lowercase letters.
pub(crate) fn letters_of(word: u64) -> heapless::String<26> {
    let mut out = heapless::String::new();
    for (i, letter) in (b'a'..=b'z').enumerate() {
        if word & (1 << i) != 0 {
            let _ = out.push(char::from(letter));
        }
    }
    out
}

impl fmt::Debug for IsaBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_test_respect_bounds() {
        let mut map = IsaBitmap::new();
        assert!(map.set(0));
        assert!(map.set(ISA_EXT_MAX - 1));
        assert!(!map.set(ISA_EXT_MAX));
        assert!(map.test(0));
        assert!(map.test(ISA_EXT_MAX - 1));
        assert!(!map.test(ISA_EXT_MAX));
        assert!(!map.test(usize::MAX));
    }

    #[test]
    fn and_assign_intersects() {
        let mut a = IsaBitmap::new();
        let mut b = IsaBitmap::new();
        for bit in [0, 2, 8, 12, 27] {
            a.set(bit);
        }
        for bit in [0, 3, 8, 27] {
            b.set(bit);
        }
        a.and_assign(&b);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![0, 8, 27]);
    }

    #[test]
    fn base_letters_lists_single_letter_bits() {
        let mut map = IsaBitmap::new();
        for letter in *b"imafdc" {
            map.set(letter_bit(letter).expect("lowercase"));
        }
        map.set(ISA_EXT_BASE + 1);
        assert_eq!(map.base_letters().as_str(), "acdfim");
        assert_eq!(letter_bit(b'Z'), None);
    }
}
