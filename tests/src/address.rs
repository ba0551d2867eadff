// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Address confirmation and extended public key tests

use encdec::{Decode, Encode};
use log::debug;

use ledger_htr_apdu::{
    address::{AddressReq, XpubReq, XpubResp},
    bip32::Bip32Path,
    prelude::StatusWord,
    Instruction,
};

use crate::{apdu_err, Device, Error, Response};

/// Request address confirmation, approving the displayed address.
///
/// Returns the displayed address on success.
pub fn get_address<D: Device>(mut d: D, path: &Bip32Path) -> anyhow::Result<String> {
    let mut buff = [0u8; 64];
    let n = AddressReq { path: path.clone() }
        .encode(&mut buff)
        .map_err(apdu_err)?;

    // Issue request, the address is displayed for confirmation
    let r = d.exchange(Instruction::GetAddress as u8, 0, 0, &buff[..n])?;
    assert_eq!(r, Response::Pending, "expected address prompt");

    let screen = d.screen().ok_or(Error::NotPending)?;
    debug!("address screen: {:?}", screen);

    let address = screen
        .last()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("empty address screen"))?;

    // Confirm, no response payload is expected
    let r = d.decide(true)?.data()?;
    assert!(r.is_empty(), "unexpected address response {:02x?}", r);

    Ok(address)
}

/// Request address confirmation then reject it
pub fn reject_address<D: Device>(mut d: D, path: &Bip32Path) -> anyhow::Result<()> {
    let mut buff = [0u8; 64];
    let n = AddressReq { path: path.clone() }
        .encode(&mut buff)
        .map_err(apdu_err)?;

    let r = d.exchange(Instruction::GetAddress as u8, 0, 0, &buff[..n])?;
    assert_eq!(r, Response::Pending, "expected address prompt");

    let e = d.decide(false).expect_err("rejection should fail");
    assert_eq!(e.status(), Some(StatusWord::Deny));

    Ok(())
}

/// Request and approve export of an extended public key
pub fn get_xpub<D: Device>(mut d: D, path: &Bip32Path) -> anyhow::Result<XpubResp> {
    let mut buff = [0u8; 64];
    let n = XpubReq { path: path.clone() }
        .encode(&mut buff)
        .map_err(apdu_err)?;

    let r = d.exchange(Instruction::GetXpub as u8, 0, 0, &buff[..n])?;
    assert_eq!(r, Response::Pending, "expected xpub prompt");

    let r = d.decide(true)?.data()?;
    let (xpub, _) = XpubResp::decode(&r).map_err(apdu_err)?;

    debug!("xpub: {:02x?}", xpub);

    Ok(xpub)
}
