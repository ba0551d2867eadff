// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction signing tests and vectors

use lazy_static::lazy_static;
use log::{debug, info};

use ledger_htr_apdu::{
    bip32::{Bip32Path, HARDENED, HTR_COIN_TYPE},
    token::{TokenData, TokenSig},
    tx::{ChangeInfo, SignTxStage, PUBKEY_HASH_LEN, TOKEN_AUTHORITY_MASK},
    Instruction,
};

use crate::{
    builder::{fake_input, tx_chunks, Transaction, TxOutput},
    token::{declare_tokens, sign_token},
    Device, Error, Response,
};

/// Output destination for a test vector
#[derive(Clone, PartialEq, Debug)]
pub enum Dest {
    /// Pay to an external pubkey hash
    External([u8; PUBKEY_HASH_LEN]),
    /// Pay back to the device at `m/44'/280'/0'/0/index`
    Change(u32),
}

/// Output for a test vector
#[derive(Clone, PartialEq, Debug)]
pub struct VectorOutput {
    pub value: u64,
    pub token_data: u8,
    pub dest: Dest,
}

/// Transaction test vector
#[derive(Clone, PartialEq, Debug)]
pub struct Vector {
    pub name: &'static str,
    pub tokens: Vec<TokenData>,
    pub inputs: usize,
    pub outputs: Vec<VectorOutput>,
    /// Expected `(label, amount)` for each displayed output
    pub expected: Vec<(&'static str, &'static str)>,
}

/// Derivation path for change key `index`
pub fn change_path(index: u32) -> Bip32Path {
    Bip32Path::new(&[44 | HARDENED, HTR_COIN_TYPE | HARDENED, HARDENED, 0, index])
        .expect("invalid change path")
}

impl Vector {
    /// Build the transaction and change information,
    /// using `pkh` to derive the pubkey hash for change outputs
    pub fn build(
        &self,
        pkh: impl Fn(&Bip32Path) -> [u8; PUBKEY_HASH_LEN],
    ) -> (Transaction, Vec<ChangeInfo>) {
        let mut change = vec![];
        let mut outputs = vec![];

        for (i, o) in self.outputs.iter().enumerate() {
            let pubkey_hash = match &o.dest {
                Dest::External(h) => *h,
                Dest::Change(n) => {
                    let path = change_path(*n);
                    let h = pkh(&path);
                    change.push(ChangeInfo {
                        index: i as u8,
                        path,
                    });
                    h
                }
            };

            outputs.push(TxOutput::new(o.value, pubkey_hash, o.token_data));
        }

        let tx = Transaction {
            version: 0x0001,
            tokens: self.tokens.iter().map(|t| t.uid).collect(),
            inputs: (0..self.inputs).map(|_| fake_input()).collect(),
            outputs,
        };

        (tx, change)
    }
}

fn token(uid: u8, symbol: &[u8], name: &[u8]) -> TokenData {
    TokenData::new(1, [uid; 32], symbol, name).expect("invalid token")
}

lazy_static! {
    pub static ref TRANSACTIONS: Vec<Vector> = vec![
        Vector {
            name: "htr single output",
            tokens: vec![],
            inputs: 1,
            outputs: vec![VectorOutput {
                value: 123_456,
                token_data: 0,
                dest: Dest::External([0xa1; 20]),
            }],
            expected: vec![("1/1", "HTR 1,234.56")],
        },
        Vector {
            name: "htr with change",
            tokens: vec![],
            inputs: 2,
            outputs: vec![
                VectorOutput {
                    value: 150,
                    token_data: 0,
                    dest: Dest::Change(3),
                },
                VectorOutput {
                    value: 1_000,
                    token_data: 0,
                    dest: Dest::External([0xb2; 20]),
                },
                VectorOutput {
                    value: 20,
                    token_data: 0,
                    dest: Dest::External([0xb3; 20]),
                },
            ],
            expected: vec![("1/2", "HTR 10.00"), ("2/2", "HTR 0.20")],
        },
        Vector {
            name: "custom tokens",
            tokens: vec![
                token(0x11, b"TST", b"Test Token"),
                token(0x22, b"ABCDE", b"Alphabet"),
            ],
            inputs: 3,
            outputs: vec![
                VectorOutput {
                    value: 0x8000_0000,
                    token_data: 0,
                    dest: Dest::External([0xc1; 20]),
                },
                VectorOutput {
                    value: 250,
                    token_data: 1,
                    dest: Dest::External([0xc2; 20]),
                },
                VectorOutput {
                    value: 5,
                    token_data: 2,
                    dest: Dest::Change(0),
                },
                VectorOutput {
                    value: 1,
                    token_data: 2,
                    dest: Dest::External([0xc3; 20]),
                },
            ],
            expected: vec![
                ("1/3", "HTR 21,474,836.48"),
                ("2/3", "TST 2.50"),
                ("3/3", "ABCDE 0.01"),
            ],
        },
        Vector {
            name: "authority output",
            tokens: vec![token(0x33, b"AUTH", b"Authority Token")],
            inputs: 1,
            outputs: vec![
                VectorOutput {
                    value: 0x01,
                    token_data: TOKEN_AUTHORITY_MASK | 1,
                    dest: Dest::External([0xd1; 20]),
                },
                VectorOutput {
                    value: 400,
                    token_data: 1,
                    dest: Dest::External([0xd2; 20]),
                },
            ],
            expected: vec![("1/2", "authority"), ("2/2", "AUTH 4.00")],
        },
    ];
}

/// Result of a signed transaction flow
#[derive(Clone, PartialEq, Debug)]
pub struct Signed {
    /// Screens displayed for each output, in order
    pub screens: Vec<Vec<String>>,
    /// Transaction signature
    pub signature: Vec<u8>,
}

/// Handle prompts until more data is required or the transaction is approved,
/// approving every output and the final confirmation
fn approve_prompts<D: Device>(
    d: &mut D,
    mut r: Response,
    screens: &mut Vec<Vec<String>>,
) -> Result<bool, Error> {
    while r == Response::Pending {
        let screen = d.screen().ok_or(Error::NotPending)?;
        debug!("screen: {:?}", screen);

        // Output prompts carry label, address and amount, the final confirmation does not
        let confirm = screen.len() != 3;
        if !confirm {
            screens.push(screen);
        }

        r = d.decide(true)?;

        if confirm {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Stream a transaction to the device, approving each output, and fetch the signature
pub fn sign_tx<D: Device>(
    mut d: D,
    tx: &Transaction,
    change: &[ChangeInfo],
    chunk_len: usize,
) -> Result<Signed, Error> {
    let stream = tx.stream(change);
    let chunks = tx_chunks(&stream, chunk_len);

    info!(
        "signing transaction: {} bytes in {} chunks",
        stream.len(),
        chunks.len()
    );

    let mut screens = vec![];
    let mut approved = false;

    for (stage, chunk, data) in &chunks {
        let r = d.exchange(Instruction::SignTx as u8, *stage as u8, *chunk, data)?;
        approved = approve_prompts(&mut d, r, &mut screens)?;
    }

    assert!(approved, "transaction not approved after final chunk");

    let signature = d
        .exchange(Instruction::SignTx as u8, SignTxStage::Done as u8, 0, &[])?
        .data()?;

    Ok(Signed {
        screens,
        signature,
    })
}

/// Sign and declare vector tokens, then sign the vector transaction,
/// checking displayed labels and amounts.
///
/// Returns the signed transaction and the signature response.
pub fn test<D: Device>(
    mut d: D,
    v: &Vector,
    pkh: impl Fn(&Bip32Path) -> [u8; PUBKEY_HASH_LEN],
    chunk_len: usize,
) -> anyhow::Result<(Transaction, Signed)> {
    info!("transaction vector: {}", v.name);

    let mut signed_tokens: Vec<(TokenData, TokenSig)> = vec![];
    for t in &v.tokens {
        let sig = sign_token(&mut d, t)?;
        signed_tokens.push((t.clone(), sig));
    }

    if !signed_tokens.is_empty() {
        declare_tokens(&mut d, &signed_tokens)?;
    }

    let (tx, change) = v.build(pkh);
    let signed = sign_tx(&mut d, &tx, &change, chunk_len)?;

    let shown: Vec<_> = signed
        .screens
        .iter()
        .map(|s| (s[0].as_str(), s[2].as_str()))
        .collect();
    assert_eq!(&shown, &v.expected, "displayed outputs mismatch for {}", v.name);

    Ok((tx, signed))
}
