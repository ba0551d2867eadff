// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Host-side transaction and token builders

use encdec::Encode;
use rand::{random, Rng};
use sha2::{Digest, Sha256};

use ledger_htr_apdu::{
    bip32::{Bip32Path, HARDENED, HTR_COIN_TYPE},
    token::{SignedTokenData, TokenData, TokenSig, TokenUid},
    tx::{ChangeInfo, SignTxStage, CHANGE_INFO_VERSION, P2PKH_PREFIX, P2PKH_SUFFIX},
};

/// Maximum APDU payload
pub const MAX_APDU_LEN: usize = 255;

/// Transaction input
#[derive(Clone, PartialEq, Debug)]
pub struct TxInput {
    pub tx_id: [u8; 32],
    pub index: u8,
}

impl TxInput {
    pub fn serialize(&self, buff: &mut Vec<u8>) {
        buff.extend_from_slice(&self.tx_id);
        buff.push(self.index);
        buff.extend_from_slice(&[0x00, 0x00]);
    }
}

/// Transaction output paying to a P2PKH script
#[derive(Clone, PartialEq, Debug)]
pub struct TxOutput {
    pub value: u64,
    pub pubkey_hash: [u8; 20],
    pub token_data: u8,
}

impl TxOutput {
    pub fn new(value: u64, pubkey_hash: [u8; 20], token_data: u8) -> Self {
        Self {
            value,
            pubkey_hash,
            token_data,
        }
    }

    /// Build the P2PKH output script
    pub fn script(&self) -> Vec<u8> {
        let mut s = P2PKH_PREFIX.to_vec();
        s.extend_from_slice(&self.pubkey_hash);
        s.extend_from_slice(&P2PKH_SUFFIX);
        s
    }

    /// Values with bit 31 set are encoded as a negated 8-byte integer
    pub fn serialize(&self, buff: &mut Vec<u8>) {
        match self.value & 0xffff_ffff_8000_0000 {
            0 => buff.extend_from_slice(&(self.value as u32).to_be_bytes()),
            _ => buff.extend_from_slice(&(-(self.value as i64)).to_be_bytes()),
        }

        let script = self.script();
        buff.push(self.token_data);
        buff.extend_from_slice(&(script.len() as u16).to_be_bytes());
        buff.extend_from_slice(&script);
    }
}

/// Transaction to be signed
#[derive(Clone, PartialEq, Debug)]
pub struct Transaction {
    pub version: u16,
    pub tokens: Vec<TokenUid>,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
}

impl Transaction {
    /// Serialise the signed portion of the transaction
    pub fn serialize(&self) -> Vec<u8> {
        let mut buff = Vec::new();

        buff.extend_from_slice(&self.version.to_be_bytes());
        buff.push(self.tokens.len() as u8);
        buff.push(self.inputs.len() as u8);
        buff.push(self.outputs.len() as u8);

        for t in &self.tokens {
            buff.extend_from_slice(t);
        }
        for i in &self.inputs {
            i.serialize(&mut buff);
        }
        for o in &self.outputs {
            o.serialize(&mut buff);
        }

        buff
    }

    /// Expected signature hash
    pub fn sighash(&self) -> [u8; 32] {
        let mut h = [0u8; 32];
        h.copy_from_slice(&Sha256::digest(self.serialize()));
        h
    }

    /// Build the full signing stream, change preamble followed by the transaction
    pub fn stream(&self, change: &[ChangeInfo]) -> Vec<u8> {
        let mut buff = change_preamble(change);
        buff.extend_from_slice(&self.serialize());
        buff
    }
}

/// Encode the change preamble
pub fn change_preamble(change: &[ChangeInfo]) -> Vec<u8> {
    let mut buff = vec![CHANGE_INFO_VERSION, change.len() as u8];

    for c in change {
        let mut b = [0u8; 64];
        let n = c.encode(&mut b).expect("change info encoding failed");
        buff.extend_from_slice(&b[..n]);
    }

    buff
}

/// Split a signing stream into `(stage, chunk, data)` requests,
/// the final chunk is sent with [SignTxStage::Sign]
pub fn tx_chunks(stream: &[u8], chunk_len: usize) -> Vec<(SignTxStage, u8, Vec<u8>)> {
    let chunks: Vec<_> = stream.chunks(chunk_len).collect();
    let last = chunks.len() - 1;

    chunks
        .iter()
        .enumerate()
        .map(|(i, c)| match i == last {
            true => (SignTxStage::Sign, 0, c.to_vec()),
            false => (SignTxStage::Data, i as u8, c.to_vec()),
        })
        .collect()
}

/// Encode a token record
pub fn encode_token(token: &TokenData) -> Vec<u8> {
    let mut b = [0u8; 128];
    let n = token.encode(&mut b).expect("token encoding failed");
    b[..n].to_vec()
}

/// Encode a signed token record
pub fn encode_signed_token(token: &TokenData, signature: &TokenSig) -> Vec<u8> {
    let s = SignedTokenData {
        token: token.clone(),
        signature: *signature,
    };

    let mut b = [0u8; 160];
    let n = s.encode(&mut b).expect("signed token encoding failed");
    b[..n].to_vec()
}

/// Generate a random printable token
pub fn fake_token() -> TokenData {
    let mut rng = rand::thread_rng();

    let symbol: Vec<u8> = (0..rng.gen_range(1..=5))
        .map(|_| rng.gen_range(b'A'..=b'Z'))
        .collect();
    let name: Vec<u8> = (0..rng.gen_range(1..=30))
        .map(|_| rng.gen_range(b' '..=b'~'))
        .collect();

    TokenData::new(1, random(), &symbol, &name).expect("invalid token")
}

/// Generate a random account path `m/44'/280'/0'/0/n`
pub fn fake_path() -> Bip32Path {
    Bip32Path::new(&[
        44 | HARDENED,
        HTR_COIN_TYPE | HARDENED,
        HARDENED,
        0,
        random::<u16>() as u32,
    ])
    .expect("invalid path")
}

/// Generate a random transaction input
pub fn fake_input() -> TxInput {
    TxInput {
        tx_id: random(),
        index: random(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn output_value_encoding() {
        let mut b = vec![];
        TxOutput::new(0x7fff_ffff, [0u8; 20], 0).serialize(&mut b);
        assert_eq!(&b[..4], &[0x7f, 0xff, 0xff, 0xff]);
        assert_eq!(b.len(), 4 + 1 + 2 + 25);

        let mut b = vec![];
        TxOutput::new(0x8000_0000, [0u8; 20], 0).serialize(&mut b);
        assert_eq!(&b[..8], &(-0x8000_0000i64).to_be_bytes());
        assert_eq!(b.len(), 8 + 1 + 2 + 25);
    }

    #[test]
    fn chunking() {
        let s = vec![0xaa; 600];
        let c = tx_chunks(&s, MAX_APDU_LEN);

        assert_eq!(c.len(), 3);
        assert_eq!(c[0].0, SignTxStage::Data);
        assert_eq!(c[1].1, 1);
        assert_eq!(c[2].0, SignTxStage::Sign);
        assert_eq!(c[2].2.len(), 600 - 2 * MAX_APDU_LEN);
    }
}
