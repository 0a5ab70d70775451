//! Generated display names for detached objects.
//!
//! Detached objects created without a name get `"<prefix> <suffix>"` where
//! the suffix is four random characters, e.g. `"Lightbulb 7QX2"`.

use std::ops::BitOr;

use rand::Rng;

/// Character classes a random suffix may draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charset {
    upper: bool,
    lower: bool,
    digits: bool,
}

impl Charset {
    pub const UPPER: Self = Self {
        upper: true,
        lower: false,
        digits: false,
    };
    pub const LOWER: Self = Self {
        upper: false,
        lower: true,
        digits: false,
    };
    pub const DIGITS: Self = Self {
        upper: false,
        lower: false,
        digits: true,
    };

    fn alphabet(self) -> Vec<u8> {
        let mut alphabet = Vec::new();
        if self.upper {
            alphabet.extend(b'A'..=b'Z');
        }
        if self.lower {
            alphabet.extend(b'a'..=b'z');
        }
        if self.digits {
            alphabet.extend(b'0'..=b'9');
        }
        alphabet
    }
}

impl BitOr for Charset {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            upper: self.upper || rhs.upper,
            lower: self.lower || rhs.lower,
            digits: self.digits || rhs.digits,
        }
    }
}

/// Random string of `len` characters drawn from `charset`.
///
/// An empty charset yields an empty string.
#[must_use]
pub fn random_string(charset: Charset, len: usize) -> String {
    let alphabet = charset.alphabet();
    if alphabet.is_empty() {
        return String::new();
    }
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(alphabet[rng.gen_range(0..alphabet.len())]))
        .collect()
}

/// `"<prefix> XXXX"` with an upper-case/digit suffix.
#[must_use]
pub fn generated_name(prefix: &str) -> String {
    format!(
        "{prefix} {}",
        random_string(Charset::UPPER | Charset::DIGITS, 4)
    )
}
