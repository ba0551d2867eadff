// Copyright (c) 2022-2023 The MobileCoin Foundation

/// Encoding helper for fixed-length byte arrays (uids, tags, digests)
pub(crate) mod arr {
    use encdec::Error;

    pub fn enc<const N: usize>(d: &[u8; N], buff: &mut [u8]) -> Result<usize, Error> {
        if buff.len() < d.len() {
            return Err(Error::Length);
        }

        buff[..d.len()].copy_from_slice(&d[..]);

        Ok(d.len())
    }

    pub fn enc_len<const N: usize>(d: &[u8; N]) -> Result<usize, Error> {
        Ok(d.len())
    }

    pub fn dec<const N: usize>(buff: &[u8]) -> Result<([u8; N], usize), Error> {
        if buff.len() < N {
            return Err(Error::Length);
        }

        let mut d = [0u8; N];
        d.copy_from_slice(&buff[..N]);

        Ok((d, N))
    }
}

/// Length-prefixed (`u8`) byte string helpers
pub(crate) mod short_bytes {
    use crate::ApduError;

    /// Write a `u8` length prefix followed by the provided bytes
    pub fn enc(d: &[u8], buff: &mut [u8]) -> Result<usize, ApduError> {
        if d.len() > u8::MAX as usize || buff.len() < d.len() + 1 {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = d.len() as u8;
        buff[1..][..d.len()].copy_from_slice(d);

        Ok(d.len() + 1)
    }

    /// Read a `u8` length prefixed byte string, rejecting lengths over `max`
    pub fn dec(buff: &[u8], max: usize) -> Result<(&[u8], usize), ApduError> {
        if buff.is_empty() {
            return Err(ApduError::InvalidLength);
        }

        let n = buff[0] as usize;
        if n > max || buff.len() < n + 1 {
            return Err(ApduError::InvalidLength);
        }

        Ok((&buff[1..][..n], n + 1))
    }
}
