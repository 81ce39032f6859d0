use super::secure_random;
use crate::error::CryptoError;
use zeroize::Zeroizing;

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const NUMBERS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

pub const DEFAULT_LENGTH: usize = 16;

/// Character classes to draw generated passwords from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordOptions {
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub symbols: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            uppercase: true,
            lowercase: true,
            numbers: true,
            symbols: true,
        }
    }
}

impl PasswordOptions {
    fn alphabet(&self) -> Vec<u8> {
        [
            (self.uppercase, UPPERCASE),
            (self.lowercase, LOWERCASE),
            (self.numbers, NUMBERS),
            (self.symbols, SYMBOLS),
        ]
        .into_iter()
        .filter(|(on, _)| *on)
        .flat_map(|(_, chars)| chars.bytes())
        .collect()
    }
}

/// Generate a random password of `length` characters.
///
/// Each character is drawn uniformly from the selected classes. Random bytes
/// at or above the largest multiple of the alphabet size are discarded so
/// no character is favoured.
pub fn generate_password(
    length: usize,
    options: &PasswordOptions,
) -> Result<Zeroizing<String>, CryptoError> {
    let alphabet = options.alphabet();
    if alphabet.is_empty() {
        return Err(CryptoError::EmptyAlphabet);
    }

    // alphabet is at most 88 chars, so the zone is never empty
    let zone = 256 - (256 % alphabet.len());
    let mut password = Zeroizing::new(String::with_capacity(length));
    let mut pool = Zeroizing::new([0u8; 64]);

    while password.len() < length {
        secure_random(&mut pool[..])?;
        for &byte in pool.iter() {
            if password.len() == length {
                break;
            }
            if (byte as usize) < zone {
                password.push(alphabet[byte as usize % alphabet.len()] as char);
            }
        }
    }

    Ok(password)
}
