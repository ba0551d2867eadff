// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Rendering helpers for values, addresses and labels shown to the operator

use core::str::from_utf8;

use emstr::{helpers::Hex, EncodeStr};
use sha2::{Digest, Sha256};

use ledger_htr_apdu::tx::PUBKEY_HASH_LEN;

mod cursor;
pub use cursor::{Cursor, Exhausted};

/// Native token symbol
pub const HTR_SYMBOL: &str = "HTR";

/// Decimal places for token values
const DECIMAL_PLACES: u32 = 2;

/// Encoded address length (version, pubkey hash, checksum)
pub const ADDRESS_LEN: usize = 1 + PUBKEY_HASH_LEN + 4;

/// Maximum base58 encoded address length
pub const B58_ADDRESS_LEN: usize = 35;

/// Build a raw address from a network version byte and pubkey hash
pub fn address_from_pubkey_hash(
    version: u8,
    pubkey_hash: &[u8; PUBKEY_HASH_LEN],
) -> [u8; ADDRESS_LEN] {
    let mut a = [0u8; ADDRESS_LEN];
    a[0] = version;
    a[1..][..PUBKEY_HASH_LEN].copy_from_slice(pubkey_hash);

    // Checksum is the first 4 bytes of a double SHA256 over version and hash
    let h = Sha256::digest(Sha256::digest(&a[..1 + PUBKEY_HASH_LEN]));
    a[1 + PUBKEY_HASH_LEN..].copy_from_slice(&h[..4]);

    a
}

/// Format an address as base58
pub fn fmt_address<'a>(
    version: u8,
    pubkey_hash: &[u8; PUBKEY_HASH_LEN],
    buff: &'a mut [u8],
) -> &'a str {
    let a = address_from_pubkey_hash(version, pubkey_hash);

    let n = match bs58::encode(&a[..]).into(&mut buff[..]) {
        Ok(v) => v,
        Err(_) => return "ENCODE_ERR",
    };

    match from_utf8(&buff[..n]) {
        Ok(v) => v,
        Err(_) => "INVALID_UTF8",
    }
}

/// Format a token value as `SYMBOL 1,234.56`
pub fn fmt_token_val<'a>(symbol: &str, value: u64, buff: &'a mut [u8]) -> &'a str {
    let scalar = 10u64.pow(DECIMAL_PLACES);
    let (int, frac) = (value / scalar, value % scalar);

    // Write symbol
    let mut n = match emstr::write!(&mut buff[..], symbol, ' ') {
        Ok(v) => v,
        Err(_) => return "ENCODE_ERR",
    };

    // Collect integer digits, least significant first
    let mut digits = [0u8; 20];
    let mut num_digits = 0;
    let mut v = int;
    loop {
        digits[num_digits] = b'0' + (v % 10) as u8;
        num_digits += 1;
        v /= 10;
        if v == 0 {
            break;
        }
    }

    // Write integer part with thousands separators
    let sep = (num_digits - 1) / 3;
    if buff.len() < n + num_digits + sep + 1 + DECIMAL_PLACES as usize {
        return "ENCODE_ERR";
    }
    for i in (0..num_digits).rev() {
        buff[n] = digits[i];
        n += 1;
        if i != 0 && i % 3 == 0 {
            buff[n] = b',';
            n += 1;
        }
    }

    // Write zero padded decimal part
    buff[n] = b'.';
    n += 1;
    let mut div = scalar / 10;
    while div > 0 {
        buff[n] = b'0' + ((frac / div) % 10) as u8;
        n += 1;
        div /= 10;
    }

    match from_utf8(&buff[..n]) {
        Ok(v) => v,
        Err(_) => "INVALID_UTF8",
    }
}

/// Format a `n/total` output label
pub fn fmt_output_label(index: u8, total: u8, buff: &mut [u8]) -> &str {
    let n = match emstr::write!(&mut buff[..], index as usize, '/', total as usize) {
        Ok(v) => v,
        Err(_) => return "ENCODE_ERR",
    };

    match from_utf8(&buff[..n]) {
        Ok(v) => v,
        Err(_) => "INVALID_UTF8",
    }
}

/// Format bytes as hex
pub fn fmt_hex<'a>(d: &[u8], buff: &'a mut [u8]) -> &'a str {
    let n = match emstr::write!(&mut buff[..], Hex(d)) {
        Ok(v) => v,
        Err(_) => return "ENCODE_ERR",
    };

    match from_utf8(&buff[..n]) {
        Ok(v) => v,
        Err(_) => "INVALID_UTF8",
    }
}
