#![allow(unused)]

use log::{debug, trace};
use sha2::{Digest, Sha256};

use ledger_htr_core::{
    apdu::{
        address::{XpubResp, PUBLIC_KEY_LEN},
        bip32::Bip32Path,
        prelude::StatusWord,
        tx::PUBKEY_HASH_LEN,
    },
    engine::{Driver, Engine, Error, Event, Output, Prompt, Secret, Signature, State, Storage},
    helpers::fmt_address,
};
use ledger_htr_tests::{Device, Response};

/// Engine wrapper implementing [Device] for shared test flows
pub struct TestEngine {
    pub engine: Engine<TestDriver, MemStorage>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self {
            engine: Engine::new(TestDriver, MemStorage::default()),
        }
    }

    pub fn state(&self) -> State {
        self.engine.state()
    }
}

fn map_err(e: Error) -> ledger_htr_tests::Error {
    ledger_htr_tests::Error::from_status(e.status().into())
}

fn map_output(r: Output) -> Result<Response, ledger_htr_tests::Error> {
    if r.is_pending() {
        return Ok(Response::Pending);
    }

    let mut buff = [0u8; 256];
    let n = r
        .encode(&mut buff)
        .map_err(|_| ledger_htr_tests::Error::Status(StatusWord::WrongResponseLength))?;

    debug!("resp: {:02x?}", &buff[..n]);

    Ok(Response::Data(buff[..n].to_vec()))
}

impl Device for TestEngine {
    fn exchange(
        &mut self,
        ins: u8,
        p1: u8,
        p2: u8,
        data: &[u8],
    ) -> Result<Response, ledger_htr_tests::Error> {
        trace!("cmd: {ins:02x} {p1:02x} {p2:02x} {:02x?}", data);

        // Decode APDU to event
        let evt = Event::parse(ins, p1, p2, data).map_err(map_err)?;

        // Handle event and encode response
        let r = self.engine.update(&evt).map_err(map_err)?;
        map_output(r)
    }

    fn screen(&self) -> Option<Vec<String>> {
        let p = self.engine.prompt()?;

        let s = match p {
            Prompt::Address { address, .. } => vec!["Address".to_string(), address.to_string()],
            Prompt::Xpub { path } => vec!["Export xpub".to_string(), path.to_string()],
            Prompt::TokenData { symbol, name, uid } => {
                vec![symbol.to_string(), name.to_string(), uid.to_string()]
            }
            Prompt::ResetTokenSignatures => vec!["Reset token signatures".to_string()],
            Prompt::TxOutput {
                label,
                address,
                amount,
            } => vec![label.to_string(), address.to_string(), amount.to_string()],
            Prompt::TxConfirm => vec!["Sign transaction".to_string()],
        };

        Some(s)
    }

    fn decide(&mut self, approve: bool) -> Result<Response, ledger_htr_tests::Error> {
        debug!("decide: {approve}");

        let r = self.engine.decide(approve).map_err(map_err)?;
        map_output(r)
    }
}

fn path_hash(tag: &[u8], path: &[u32]) -> [u8; 32] {
    let mut h = Sha256::new();
    h.update(tag);
    for p in path {
        h.update(p.to_be_bytes());
    }

    let mut b = [0u8; 32];
    b.copy_from_slice(&h.finalize());
    b
}

/// Deterministic driver implementation for test use
pub struct TestDriver;

impl TestDriver {
    /// Pubkey hash for a derivation path
    pub fn pkh(path: &Bip32Path) -> [u8; PUBKEY_HASH_LEN] {
        let mut b = [0u8; PUBKEY_HASH_LEN];
        b.copy_from_slice(&path_hash(b"pkh", path.as_slice())[..PUBKEY_HASH_LEN]);
        b
    }

    /// Signature over a digest for a derivation path
    pub fn signature(path: &Bip32Path, digest: &[u8; 32]) -> Vec<u8> {
        let mut h = Sha256::new();
        h.update(path_hash(b"key", path.as_slice()));
        h.update(digest);
        h.finalize().to_vec()
    }

    /// Mainnet address for a derivation path
    pub fn address(path: &Bip32Path) -> String {
        let mut buff = [0u8; 64];
        fmt_address(0x28, &Self::pkh(path), &mut buff).to_string()
    }
}

impl Driver for TestDriver {
    fn pubkey_hash(&self, path: &[u32]) -> Result<[u8; PUBKEY_HASH_LEN], Error> {
        let p = Bip32Path::new(path).map_err(|_| Error::DeriveFailed)?;
        Ok(Self::pkh(&p))
    }

    fn xpub(&self, path: &[u32]) -> Result<XpubResp, Error> {
        let k = path_hash(b"key", path);
        let c = path_hash(b"chain", path);

        let mut public_key = [0u8; PUBLIC_KEY_LEN];
        public_key[0] = 0x04;
        public_key[1..33].copy_from_slice(&k);
        public_key[33..].copy_from_slice(&Sha256::digest(k));

        let mut fingerprint = [0u8; 4];
        fingerprint.copy_from_slice(&c[..4]);

        Ok(XpubResp {
            public_key,
            chain_code: c,
            fingerprint,
        })
    }

    fn sign(&self, path: &[u32], digest: &[u8; 32]) -> Result<Signature, Error> {
        let p = Bip32Path::new(path).map_err(|_| Error::SignFailed)?;
        Signature::from_slice(&Self::signature(&p, digest)).map_err(|_| Error::SignFailed)
    }
}

/// In-memory secret storage
#[derive(Default)]
pub struct MemStorage {
    pub secret: Option<[u8; 32]>,
}

impl Storage for MemStorage {
    fn load(&self) -> Result<Option<Secret>, Error> {
        Ok(self.secret.map(Secret::from_bytes))
    }

    fn store(&mut self, secret: &Secret) -> Result<(), Error> {
        self.secret = Some(*secret.as_bytes());
        Ok(())
    }
}

pub fn init_log() {
    let _ = simplelog::SimpleLogger::init(log::LevelFilter::Debug, Default::default());
}
