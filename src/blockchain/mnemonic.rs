// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! 25-word secret phrases.
//!
//! The 32-byte ed25519 seed is split into 11-bit groups (little-endian bit
//! order), each naming a word of the English BIP-39 list. A 25th word carries
//! the first 11 bits of the seed's SHA-512/256 digest as a checksum.

use bip39::Language;
use sha2::{Digest, Sha512_256};
use zeroize::{Zeroize, Zeroizing};

/// Number of words in a phrase, checksum included.
pub const MNEMONIC_WORDS: usize = 25;

/// Length of the seed encoded by a phrase.
pub const SEED_LEN: usize = 32;

const KEY_WORDS: usize = MNEMONIC_WORDS - 1;
const ELEVEN_BITS: u32 = 0x7ff;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MnemonicError {
    #[error("Expected {MNEMONIC_WORDS} words, got {0}")]
    WrongWordCount(usize),

    #[error("Word {0} is not in the word list")]
    UnknownWord(usize),

    #[error("Phrase does not encode a {SEED_LEN}-byte key")]
    InvalidKeyEncoding,

    #[error("Checksum word does not match")]
    ChecksumMismatch,
}

/// Encode a 32-byte seed as a 25-word phrase.
pub fn seed_to_mnemonic(seed: &[u8; SEED_LEN]) -> String {
    let words = Language::English.word_list();

    let mut indices = to_eleven_bit(seed);
    indices.push(checksum_index(seed));

    let phrase = indices
        .iter()
        .map(|&i| words[i as usize])
        .collect::<Vec<_>>()
        .join(" ");
    indices.zeroize();
    phrase
}

/// Decode a 25-word phrase back to its 32-byte seed.
pub fn mnemonic_to_seed(phrase: &str) -> Result<Zeroizing<[u8; SEED_LEN]>, MnemonicError> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.len() != MNEMONIC_WORDS {
        return Err(MnemonicError::WrongWordCount(words.len()));
    }

    let mut indices = Zeroizing::new(Vec::with_capacity(MNEMONIC_WORDS));
    for (position, word) in words.iter().enumerate() {
        let index = Language::English
            .find_word(&word.to_lowercase())
            .ok_or(MnemonicError::UnknownWord(position + 1))?;
        indices.push(index);
    }

    let bytes = Zeroizing::new(from_eleven_bit(&indices[..KEY_WORDS]));
    if bytes.len() != SEED_LEN + 1 || bytes[SEED_LEN] != 0 {
        return Err(MnemonicError::InvalidKeyEncoding);
    }

    let mut seed = Zeroizing::new([0u8; SEED_LEN]);
    seed.copy_from_slice(&bytes[..SEED_LEN]);

    if checksum_index(&seed[..]) != indices[KEY_WORDS] {
        return Err(MnemonicError::ChecksumMismatch);
    }

    Ok(seed)
}

fn checksum_index(seed: &[u8]) -> u16 {
    let digest = Sha512_256::digest(seed);
    to_eleven_bit(&digest[..2])[0]
}

fn to_eleven_bit(bytes: &[u8]) -> Vec<u16> {
    let mut out = Vec::with_capacity(bytes.len() * 8 / 11 + 1);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for &byte in bytes {
        buffer |= u32::from(byte) << bits;
        bits += 8;
        if bits >= 11 {
            out.push((buffer & ELEVEN_BITS) as u16);
            buffer >>= 11;
            bits -= 11;
        }
    }
    if bits != 0 {
        out.push((buffer & ELEVEN_BITS) as u16);
    }

    out
}

fn from_eleven_bit(indices: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(indices.len() * 11 / 8 + 1);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for &index in indices {
        buffer |= u32::from(index) << bits;
        bits += 11;
        while bits >= 8 {
            out.push((buffer & 0xff) as u8);
            buffer >>= 8;
            bits -= 8;
        }
    }
    if bits != 0 {
        out.push((buffer & 0xff) as u8);
    }

    out
}
