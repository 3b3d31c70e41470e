// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Algorand account addresses.
//!
//! An address is the 32-byte ed25519 public key followed by a 4-byte checksum
//! (the tail of its SHA-512/256 digest), rendered as unpadded RFC 4648 base32.

use std::{fmt, str::FromStr};

use data_encoding::BASE32_NOPAD;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha512_256};

/// Length of the public key part of an address.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Length of the checksum appended to the public key.
const CHECKSUM_LEN: usize = 4;

/// Length of the base32 text form.
pub const ADDRESS_STR_LEN: usize = 58;

/// Domain separator for application account derivation.
const APP_ID_PREFIX: &[u8] = b"appID";

/// Errors from parsing an address string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Address must be {ADDRESS_STR_LEN} characters, got {0}")]
    InvalidLength(usize),

    #[error("Address is not valid base32")]
    InvalidEncoding,

    #[error("Address checksum mismatch")]
    ChecksumMismatch,
}

/// A ledger account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; PUBLIC_KEY_LEN]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; PUBLIC_KEY_LEN]);

    pub fn from_public_key(public_key: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self(public_key)
    }

    /// Address of the escrow account controlled by an application.
    pub fn for_application(app_id: u64) -> Self {
        let mut hasher = Sha512_256::new();
        hasher.update(APP_ID_PREFIX);
        hasher.update(app_id.to_be_bytes());
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }

    fn checksum(&self) -> [u8; CHECKSUM_LEN] {
        let digest = Sha512_256::digest(self.0);
        let mut checksum = [0u8; CHECKSUM_LEN];
        checksum.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
        checksum
    }

    /// Encode to the 58-character base32 form.
    pub fn encode(&self) -> String {
        let mut raw = [0u8; PUBLIC_KEY_LEN + CHECKSUM_LEN];
        raw[..PUBLIC_KEY_LEN].copy_from_slice(&self.0);
        raw[PUBLIC_KEY_LEN..].copy_from_slice(&self.checksum());
        BASE32_NOPAD.encode(&raw)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != ADDRESS_STR_LEN {
            return Err(AddressError::InvalidLength(s.len()));
        }

        let raw = BASE32_NOPAD
            .decode(s.as_bytes())
            .map_err(|_| AddressError::InvalidEncoding)?;
        if raw.len() != PUBLIC_KEY_LEN + CHECKSUM_LEN {
            return Err(AddressError::InvalidEncoding);
        }

        let mut public_key = [0u8; PUBLIC_KEY_LEN];
        public_key.copy_from_slice(&raw[..PUBLIC_KEY_LEN]);
        let address = Address(public_key);

        if address.checksum()[..] != raw[PUBLIC_KEY_LEN..] {
            return Err(AddressError::ChecksumMismatch);
        }

        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.encode())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_ADDRESS: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ";

    #[test]
    fn zero_address_encoding() {
        assert_eq!(Address::ZERO.encode(), ZERO_ADDRESS);
        assert_eq!(ZERO_ADDRESS.parse::<Address>().unwrap(), Address::ZERO);
    }

    #[test]
    fn parse_rejects_bad_checksum() {
        let mut tampered = ZERO_ADDRESS.to_string();
        tampered.replace_range(0..1, "B");
        assert_eq!(
            tampered.parse::<Address>(),
            Err(AddressError::ChecksumMismatch)
        );
    }

    #[test]
    fn parse_rejects_wrong_length_and_alphabet() {
        assert_eq!(
            "ABC".parse::<Address>(),
            Err(AddressError::InvalidLength(3))
        );

        let lowercase = ZERO_ADDRESS.to_lowercase();
        assert_eq!(
            lowercase.parse::<Address>(),
            Err(AddressError::InvalidEncoding)
        );
    }

    #[test]
    fn application_address_is_stable_and_distinct() {
        let a = Address::for_application(1001);
        let b = Address::for_application(1002);
        assert_eq!(a, Address::for_application(1001));
        assert_ne!(a, b);
        assert_eq!(a.encode().parse::<Address>().unwrap(), a);
    }

    #[test]
    fn encoded_address_has_fixed_length() {
        let address = Address::from_public_key([7u8; PUBLIC_KEY_LEN]);
        assert_eq!(address.encode().len(), ADDRESS_STR_LEN);
    }

    #[test]
    fn serde_uses_text_form() {
        let json = serde_json::to_string(&Address::ZERO).unwrap();
        assert_eq!(json, format!("\"{ZERO_ADDRESS}\""));
        assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), Address::ZERO);
        assert!(serde_json::from_str::<Address>("\"nope\"").is_err());
    }
}
