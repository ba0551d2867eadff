// Copyright (c) 2022-2023 The MobileCoin Foundation

//! BIP32 derivation path encoding
//!

use core::{fmt::Display, str::FromStr};

use byteorder::{BigEndian, ByteOrder};
use encdec::{DecodeOwned, Encode};
use heapless::Vec;

use crate::ApduError;

/// Maximum number of derivation levels in a path
pub const MAX_BIP32_PATH: usize = 10;

/// Hardened derivation flag
pub const HARDENED: u32 = 1 << 31;

/// Hathor SLIP-0044 coin type
pub const HTR_COIN_TYPE: u32 = 280;

/// BIP32 derivation path, up to [MAX_BIP32_PATH] levels
///
/// ## Encoding
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   PATH_LEN    |                                               |
/// +-+-+-+-+-+-+-+-+                                               +
/// /             PATH_LEN x u32 (big-endian) INDEX...              /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bip32Path(Vec<u32, MAX_BIP32_PATH>);

impl Bip32Path {
    /// Create a path from a slice of indices
    pub fn new(path: &[u32]) -> Result<Self, ApduError> {
        Vec::from_slice(path)
            .map(Self)
            .map_err(|_| ApduError::InvalidLength)
    }

    /// Default account path `m/44'/280'/0'/0/0`
    pub fn default_account() -> Self {
        let mut p = Vec::new();
        for i in [44 | HARDENED, HTR_COIN_TYPE | HARDENED, HARDENED, 0, 0] {
            // Five levels always fit the path capacity
            let _ = p.push(i);
        }
        Self(p)
    }

    /// Derivation path indices
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Number of derivation levels
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the path is empty (master key)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u32]> for Bip32Path {
    fn as_ref(&self) -> &[u32] {
        &self.0
    }
}

impl Encode for Bip32Path {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(1 + self.0.len() * 4)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let n = self.encode_len()?;
        if buff.len() < n {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = self.0.len() as u8;
        for (i, v) in self.0.iter().enumerate() {
            BigEndian::write_u32(&mut buff[1 + i * 4..], *v);
        }

        Ok(n)
    }
}

impl DecodeOwned for Bip32Path {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        if buff.is_empty() {
            return Err(ApduError::InvalidLength);
        }

        let len = buff[0] as usize;
        if len > MAX_BIP32_PATH || buff.len() < 1 + len * 4 {
            return Err(ApduError::InvalidLength);
        }

        let mut p = Vec::new();
        for i in 0..len {
            // Capacity checked above
            let _ = p.push(BigEndian::read_u32(&buff[1 + i * 4..]));
        }

        Ok((Self(p), 1 + len * 4))
    }
}

/// Display paths in `m/44'/280'/0'/0/0` form
impl Display for Bip32Path {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "m")?;
        for i in self.0.iter() {
            match i & HARDENED {
                0 => write!(f, "/{i}")?,
                _ => write!(f, "/{}'", i & !HARDENED)?,
            }
        }
        Ok(())
    }
}

impl FromStr for Bip32Path {
    type Err = ApduError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        if parts.next() != Some("m") {
            return Err(ApduError::InvalidEncoding);
        }

        let mut p = Vec::new();
        for part in parts {
            let (v, hardened) = match part.strip_suffix('\'') {
                Some(v) => (v, true),
                None => (part, false),
            };

            let v = u32::from_str(v).map_err(|_| ApduError::InvalidEncoding)?;
            if v & HARDENED != 0 {
                return Err(ApduError::InvalidEncoding);
            }

            let v = if hardened { v | HARDENED } else { v };
            p.push(v).map_err(|_| ApduError::InvalidLength)?;
        }

        Ok(Self(p))
    }
}
