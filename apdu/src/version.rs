// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Application version APDUs

use encdec::{DecodeOwned, Encode};

use super::{ApduError, ApduStatic, Instruction, HTR_APDU_CLA};

/// Application name prefix in [VersionResp]
pub const APP_NAME: &[u8; 3] = b"HTR";

/// Fetch application version APDU
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct VersionReq;

impl ApduStatic for VersionReq {
    const CLA: u8 = HTR_APDU_CLA;
    const INS: u8 = Instruction::GetVersion as u8;
}

impl Encode for VersionReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(0)
    }

    fn encode(&self, _buff: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(0)
    }
}

/// Application version response APDU
///
/// ## Encoding
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      'H'      |      'T'      |      'R'      |     MAJOR     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     MINOR     |     PATCH     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct VersionResp {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl VersionResp {
    pub fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Encode for VersionResp {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(APP_NAME.len() + 3)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        buff[..3].copy_from_slice(APP_NAME);
        buff[3] = self.major;
        buff[4] = self.minor;
        buff[5] = self.patch;

        Ok(6)
    }
}

impl DecodeOwned for VersionResp {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        if buff.len() < 6 {
            return Err(ApduError::InvalidLength);
        }

        if &buff[..3] != APP_NAME {
            return Err(ApduError::InvalidEncoding);
        }

        Ok((Self::new(buff[3], buff[4], buff[5]), 6))
    }
}
