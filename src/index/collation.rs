//! Custom word collation.
//!
//! The binary format's forward and reverse word indexes depend on an exact,
//! locale-independent sort order, so words are compared through fixed
//! per-character rank tables instead of native string comparison. Only the
//! characters that can appear in an indexed word carry a rank: letters,
//! apostrophe, and hyphen. Everything else ranks zero and sorts first, but
//! the word scanner rejects such characters before they reach a table.

use std::cmp::Ordering;

/// Rank table for one case mode, indexed by ASCII code.
#[derive(Debug, Clone, Copy)]
pub struct Collation {
    ranks: [u8; 128],
}

const fn case_sensitive_ranks() -> [u8; 128] {
    let mut ranks = [0u8; 128];
    let mut rank = 0u8;
    let mut k = 0;
    // Interleave so 'A' < 'a' < 'B' < 'b' < ...
    while k < 26 {
        rank += 1;
        ranks[(b'A' + k) as usize] = rank;
        rank += 1;
        ranks[(b'a' + k) as usize] = rank;
        k += 1;
    }
    rank += 1;
    ranks[b'\'' as usize] = rank;
    rank += 1;
    ranks[b'-' as usize] = rank;
    ranks
}

const fn case_insensitive_ranks() -> [u8; 128] {
    let mut ranks = [0u8; 128];
    let mut rank = 0u8;
    let mut k = 0;
    while k < 26 {
        rank += 1;
        ranks[(b'A' + k) as usize] = rank;
        ranks[(b'a' + k) as usize] = rank;
        k += 1;
    }
    rank += 1;
    ranks[b'\'' as usize] = rank;
    rank += 1;
    ranks[b'-' as usize] = rank;
    ranks
}

pub const CASE_SENSITIVE: Collation = Collation {
    ranks: case_sensitive_ranks(),
};

pub const CASE_INSENSITIVE: Collation = Collation {
    ranks: case_insensitive_ranks(),
};

impl Collation {
    fn rank(&self, byte: u8) -> u8 {
        if byte < 128 {
            self.ranks[byte as usize]
        } else {
            0
        }
    }

    /// Compare two words front to back.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let mut xs = a.bytes();
        let mut ys = b.bytes();
        loop {
            match (xs.next(), ys.next()) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(x), Some(y)) => match self.rank(x).cmp(&self.rank(y)) {
                    Ordering::Equal => {}
                    ord => return ord,
                },
            }
        }
    }

    /// Compare two words character by character from the last character
    /// back to the first. Used for the suffix-lookup ordering.
    pub fn compare_reversed(&self, a: &str, b: &str) -> Ordering {
        let mut xs = a.bytes().rev();
        let mut ys = b.bytes().rev();
        loop {
            match (xs.next(), ys.next()) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(x), Some(y)) => match self.rank(x).cmp(&self.rank(y)) {
                    Ordering::Equal => {}
                    ord => return ord,
                },
            }
        }
    }
}
