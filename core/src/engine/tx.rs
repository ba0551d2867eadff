// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction session, buffers streamed transaction chunks, decodes
//! records as they become available and walks the operator through each
//! non-change output before the transaction may be signed.

use encdec::Decode;
use heapless::Vec;
use sha2::{Digest, Sha256};
use static_assertions::const_assert;
use strum::{Display, EnumIter, EnumString, EnumVariantNames};
use zeroize::Zeroize;

use ledger_htr_apdu::{
    bip32::MAX_BIP32_PATH,
    token::TokenUid,
    tx::{ChangeInfo, SignTxStage, CHANGE_INFO_VERSION, TOKEN_INDEX_MASK},
};

use super::{
    token::{TokenRegistry, TX_MAX_TOKENS},
    txout::{DecodeError, TxOutput},
    Driver, Error,
};
use crate::helpers::{Cursor, Exhausted, HTR_SYMBOL};

/// Working buffer size for received transaction bytes
pub const MAX_BUFFER_LEN: usize = 300;

/// Maximum number of decoded outputs held for confirmation
pub const MAX_OUTPUTS: usize = 10;

/// Maximum number of change outputs, one per token plus the native token
pub const MAX_CHANGE_OUTPUTS: usize = 1 + TX_MAX_TOKENS;

/// Maximum chunk payload
pub const MAX_CHUNK_LEN: usize = 255;

/// Largest single record in the stream (a change entry with a full path)
const MAX_RECORD_LEN: usize = 2 + 4 * MAX_BIP32_PATH;

// A full chunk must always fit alongside a partial record
const_assert!(MAX_BUFFER_LEN >= MAX_CHUNK_LEN + MAX_RECORD_LEN - 1);

// Token indices must fit the token data mask
const_assert!(TX_MAX_TOKENS < TOKEN_INDEX_MASK as usize);

/// SHA-256 block length
const SHA256_BLOCK_LEN: usize = 64;

/// Transaction session state
#[derive(Copy, Clone, PartialEq, Debug, Default, EnumString, Display, EnumVariantNames, EnumIter)]
pub enum TxState {
    #[default]
    None,
    /// Receiving transaction chunks
    ReceivingData,
    /// All outputs confirmed, awaiting final approval
    Parsed,
    /// Approved for signing
    Approved,
}

/// Position of the decoder in the transaction stream
#[derive(Copy, Clone, PartialEq, Debug)]
enum Section {
    Preamble,
    Change(u8),
    Header,
    Tokens(u8),
    Inputs(u8),
    Outputs,
    Complete,
}

/// Result of walking buffered outputs
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Walk {
    /// Output requires operator confirmation
    Confirm(TxOutput),
    /// Window exhausted, more transaction data required
    NeedData,
    /// Every output confirmed, signature hash available
    Parsed,
}

/// Reasons for the decoder to stop
enum Halt {
    Blocked,
    Fail(Error),
}

impl From<Exhausted> for Halt {
    fn from(_: Exhausted) -> Self {
        Halt::Blocked
    }
}

impl From<Error> for Halt {
    fn from(e: Error) -> Self {
        Halt::Fail(e)
    }
}

/// Transaction token table entry
#[derive(Copy, Clone, PartialEq, Debug)]
struct TokenSlot {
    uid: TokenUid,
    /// Registry index at decode time, `None` if undeclared
    index: Option<u8>,
}

/// Streaming transaction session
pub struct TxSession {
    state: TxState,
    section: Section,
    last_chunk: bool,
    next_chunk: u8,

    buffer: [u8; MAX_BUFFER_LEN],
    buffer_len: usize,

    hasher: Sha256,
    sighash: [u8; 32],

    change: Vec<ChangeInfo, MAX_CHANGE_OUTPUTS>,
    /// Transaction token table
    tokens: Vec<TokenSlot, TX_MAX_TOKENS>,
    inputs_len: u8,
    outputs_len: u8,

    decoded_outputs: u8,
    confirmed_outputs: u8,
    display_index: u8,
    window: Vec<TxOutput, MAX_OUTPUTS>,
}

impl Default for TxSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TxSession {
    /// Create an idle session
    pub fn new() -> Self {
        Self {
            state: TxState::None,
            section: Section::Preamble,
            last_chunk: false,
            next_chunk: 0,
            buffer: [0u8; MAX_BUFFER_LEN],
            buffer_len: 0,
            hasher: Sha256::new(),
            sighash: [0u8; 32],
            change: Vec::new(),
            tokens: Vec::new(),
            inputs_len: 0,
            outputs_len: 0,
            decoded_outputs: 0,
            confirmed_outputs: 0,
            display_index: 0,
            window: Vec::new(),
        }
    }

    /// Create a session ready to receive the first chunk
    pub fn start() -> Self {
        let mut s = Self::new();
        s.state = TxState::ReceivingData;
        s
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    /// Number of outputs in the transaction, zero until the header is decoded
    pub fn outputs_len(&self) -> u8 {
        self.outputs_len
    }

    /// Number of outputs walked through so far
    pub fn confirmed_outputs(&self) -> u8 {
        self.confirmed_outputs
    }

    /// Change outputs declared in the preamble
    pub fn change(&self) -> &[ChangeInfo] {
        &self.change
    }

    /// Signature hash, available once every output has been confirmed
    pub fn sighash(&self) -> Option<[u8; 32]> {
        match self.state {
            TxState::Parsed | TxState::Approved => Some(self.sighash),
            _ => None,
        }
    }

    /// Accept a transaction chunk.
    ///
    /// [SignTxStage::Data] chunks must arrive in sequence, once a
    /// [SignTxStage::Sign] chunk has been received no further data chunks
    /// are accepted.
    pub fn receive(&mut self, stage: SignTxStage, chunk: u8, data: &[u8]) -> Result<(), Error> {
        match (self.state, stage) {
            (TxState::ReceivingData, SignTxStage::Data) if !self.last_chunk => {
                if chunk != self.next_chunk {
                    #[cfg(feature = "log")]
                    log::warn!("unexpected chunk {} (expected {})", chunk, self.next_chunk);

                    return Err(Error::BadState);
                }
                self.next_chunk = self.next_chunk.wrapping_add(1);
            }
            (TxState::ReceivingData, SignTxStage::Sign) => self.last_chunk = true,
            _ => return Err(Error::BadState),
        }

        self.append(data)
    }

    /// Append bytes to the working buffer
    fn append(&mut self, data: &[u8]) -> Result<(), Error> {
        if self.buffer_len + data.len() > MAX_BUFFER_LEN {
            #[cfg(feature = "log")]
            log::warn!(
                "buffer overflow ({} + {} bytes)",
                self.buffer_len,
                data.len()
            );

            return Err(Error::InvalidLength);
        }

        self.buffer[self.buffer_len..][..data.len()].copy_from_slice(data);
        self.buffer_len += data.len();

        Ok(())
    }

    /// Decode as many records as possible from the working buffer,
    /// returning the number of outputs added to the window.
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn process<D: Driver>(&mut self, registry: &TokenRegistry, drv: &D) -> Result<u8, Error> {
        let start = self.decoded_outputs;
        let mut offset = 0;

        let r = loop {
            match self.step(offset, registry, drv) {
                Ok(n) => offset += n,
                Err(Halt::Blocked) => break Ok(()),
                Err(Halt::Fail(e)) => break Err(e),
            }
        };

        // Drop consumed bytes, zeroing the vacated tail
        let len = self.buffer_len;
        self.buffer.copy_within(offset..len, 0);
        self.buffer[len - offset..len].zeroize();
        self.buffer_len -= offset;

        r.map(|_| self.decoded_outputs - start)
    }

    /// Decode a single record at `offset`, returning the number of bytes consumed
    fn step<D: Driver>(
        &mut self,
        offset: usize,
        registry: &TokenRegistry,
        drv: &D,
    ) -> Result<usize, Halt> {
        let buff = &self.buffer[offset..self.buffer_len];
        let mut c = Cursor::new(buff);

        // Only the transaction itself is signed
        let hashed = matches!(
            self.section,
            Section::Header | Section::Tokens(_) | Section::Inputs(_) | Section::Outputs
        );

        match self.section {
            Section::Preamble => {
                let version = c.read_u8()?;
                let change_len = c.read_u8()?;

                if version != CHANGE_INFO_VERSION {
                    #[cfg(feature = "log")]
                    log::warn!("unsupported change info version: {}", version);

                    return Err(Error::InvalidData.into());
                }
                if change_len as usize > MAX_CHANGE_OUTPUTS {
                    return Err(Error::InvalidData.into());
                }

                self.section = Section::Change(change_len);
            }
            Section::Change(0) => self.section = Section::Header,
            Section::Change(n) => {
                let _index = c.read_u8()?;
                let path_len = c.read_u8()? as usize;
                if path_len > MAX_BIP32_PATH {
                    return Err(Error::InvalidData.into());
                }
                c.read_bytes(path_len * 4)?;

                let (info, _) =
                    ChangeInfo::decode(&buff[..c.offset()]).map_err(|_| Error::InvalidData)?;

                if self.change.iter().any(|i| i.index == info.index) {
                    #[cfg(feature = "log")]
                    log::warn!("duplicate change output: {}", info.index);

                    return Err(Error::InvalidData.into());
                }
                self.change.push(info).map_err(|_| Error::InvalidData)?;

                self.section = Section::Change(n - 1);
            }
            Section::Header => {
                let _version = c.read_u16()?;
                let num_tokens = c.read_u8()?;
                let num_inputs = c.read_u8()?;
                let num_outputs = c.read_u8()?;

                if num_tokens as usize > TX_MAX_TOKENS {
                    return Err(Error::InvalidData.into());
                }
                if self.change.iter().any(|i| i.index >= num_outputs) {
                    #[cfg(feature = "log")]
                    log::warn!("change output index exceeds {} outputs", num_outputs);

                    return Err(Error::InvalidData.into());
                }

                #[cfg(feature = "log")]
                log::debug!(
                    "tx: {} tokens, {} inputs, {} outputs",
                    num_tokens,
                    num_inputs,
                    num_outputs
                );

                self.inputs_len = num_inputs;
                self.outputs_len = num_outputs;
                self.section = Section::Tokens(num_tokens);
            }
            Section::Tokens(0) => self.section = Section::Inputs(self.inputs_len),
            Section::Tokens(n) => {
                let uid: TokenUid = c.read_array()?;

                // Undeclared tokens are only fatal once an output references them
                let slot = TokenSlot {
                    uid,
                    index: registry.find(&uid).map(|i| i as u8),
                };
                self.tokens.push(slot).map_err(|_| Error::InvalidData)?;

                self.section = Section::Tokens(n - 1);
            }
            Section::Inputs(0) => self.section = Section::Outputs,
            Section::Inputs(n) => {
                let _tx_id = c.read_bytes(32)?;
                let _index = c.read_u8()?;
                let data_len = c.read_u16()?;

                if data_len != 0 {
                    return Err(Error::InvalidData.into());
                }

                self.section = Section::Inputs(n - 1);
            }
            Section::Outputs => {
                if self.decoded_outputs == self.outputs_len {
                    self.section = Section::Complete;
                    return Ok(0);
                }
                if self.window.is_full() {
                    return Err(Halt::Blocked);
                }

                let out = match TxOutput::decode(&mut c, self.decoded_outputs) {
                    Ok(v) => v,
                    Err(DecodeError::Truncated) => return Err(Halt::Blocked),
                    Err(_e) => {
                        #[cfg(feature = "log")]
                        log::warn!("invalid output {}: {:?}", self.decoded_outputs, _e);

                        return Err(Error::InvalidData.into());
                    }
                };

                if out.token.index() as usize > self.tokens.len() {
                    #[cfg(feature = "log")]
                    log::warn!("output {} token index out of range", out.index);

                    return Err(Error::UnknownToken.into());
                }

                if let Some(info) = self.change.iter().find(|i| i.index == out.index) {
                    if drv.pubkey_hash(info.path.as_slice())? != out.pubkey_hash {
                        #[cfg(feature = "log")]
                        log::warn!("change output {} key mismatch", out.index);

                        return Err(Error::InvalidChange.into());
                    }
                }

                self.window.push(out).map_err(|_| Error::InvalidData)?;
                self.decoded_outputs += 1;
            }
            Section::Complete => {
                if c.remaining() > 0 {
                    #[cfg(feature = "log")]
                    log::warn!("{} trailing bytes", c.remaining());

                    return Err(Error::InvalidData.into());
                }
                return Err(Halt::Blocked);
            }
        }

        let n = c.offset();
        if hashed {
            self.hasher.update(&buff[..n]);
        }

        Ok(n)
    }

    /// Walk buffered outputs, skipping change outputs, until one requires
    /// confirmation, the window is exhausted or every output is confirmed.
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn walk<D: Driver>(&mut self, registry: &TokenRegistry, drv: &D) -> Result<Walk, Error> {
        if self.state != TxState::ReceivingData {
            return Err(Error::BadState);
        }
        if !matches!(self.section, Section::Outputs | Section::Complete) {
            return Ok(Walk::NeedData);
        }

        let change = self.sorted_change();

        loop {
            if self.confirmed_outputs == self.outputs_len {
                let h = self.hasher.finalize_reset();
                self.sighash.copy_from_slice(&h);
                self.state = TxState::Parsed;

                return Ok(Walk::Parsed);
            }

            // Refill from bytes already buffered before asking for more
            if self.display_index as usize == self.window.len() {
                clear_outputs(&mut self.window);
                self.display_index = 0;

                if self.process(registry, drv)? == 0 {
                    return Ok(Walk::NeedData);
                }
                continue;
            }

            if change.binary_search(&self.confirmed_outputs).is_ok() {
                self.display_index += 1;
                self.confirmed_outputs += 1;
                continue;
            }

            return Ok(Walk::Confirm(self.window[self.display_index as usize]));
        }
    }

    /// Mark the current output as confirmed
    pub fn approve_output(&mut self) -> Result<(), Error> {
        if self.state != TxState::ReceivingData || self.display_index as usize >= self.window.len()
        {
            return Err(Error::BadState);
        }

        self.display_index += 1;
        self.confirmed_outputs += 1;

        Ok(())
    }

    /// Approve the parsed transaction for signing
    pub fn approve(&mut self) -> Result<(), Error> {
        match self.state {
            TxState::Parsed => {
                self.state = TxState::Approved;
                Ok(())
            }
            _ => Err(Error::BadState),
        }
    }

    /// Output label as `(position, total)`, both excluding change outputs
    pub fn output_label(&self, out: &TxOutput) -> (u8, u8) {
        let before = self.change.iter().filter(|c| c.index < out.index).count() as u8;
        let total = self.outputs_len - self.change.len() as u8;

        (out.index + 1 - before, total)
    }

    /// Resolve the display symbol for an output token,
    /// the registry entry must still hold the transaction token
    pub fn output_symbol<'r>(
        &self,
        out: &TxOutput,
        registry: &'r TokenRegistry,
    ) -> Result<&'r str, Error> {
        let index = match out.token.index() {
            0 => return Ok(HTR_SYMBOL),
            n => n as usize - 1,
        };

        let slot = self.tokens.get(index);
        let entry = slot
            .and_then(|s| s.index)
            .and_then(|r| registry.get(r as usize))
            .filter(|e| slot.map(|s| s.uid) == Some(e.uid));

        match entry {
            Some(e) => Ok(e.symbol.as_str()),
            None => {
                #[cfg(feature = "log")]
                log::warn!("output {} token {} not declared", out.index, index);

                Err(Error::UnknownToken)
            }
        }
    }

    /// Change output indices in ascending order
    fn sorted_change(&self) -> Vec<u8, MAX_CHANGE_OUTPUTS> {
        let mut v: Vec<u8, MAX_CHANGE_OUTPUTS> = self.change.iter().map(|c| c.index).collect();

        // Selection sort, at most MAX_CHANGE_OUTPUTS entries
        for i in 0..v.len() {
            let mut min = i;
            for j in i + 1..v.len() {
                if v[j] < v[min] {
                    min = j;
                }
            }
            v.swap(i, min);
        }

        v
    }

    /// Zero buffered transaction data and reset the session
    pub fn wipe(&mut self) {
        self.zeroize_data();
        *self = Self::new();
    }

    fn zeroize_data(&mut self) {
        self.buffer.zeroize();
        self.sighash.zeroize();
        clear_hasher(&mut self.hasher);
        clear_outputs(&mut self.window);
        self.tokens.iter_mut().for_each(|t| {
            t.uid.zeroize();
            t.index = None;
        });
        self.tokens.clear();
    }
}

impl Drop for TxSession {
    fn drop(&mut self) {
        self.zeroize_data();
    }
}

/// Zero and remove decoded outputs, vacated slots are left zeroed
fn clear_outputs(window: &mut Vec<TxOutput, MAX_OUTPUTS>) {
    window.iter_mut().for_each(|o| o.zeroize());
    window.clear();
}

/// Overwrite any partial block held by the hasher then reset it
fn clear_hasher(hasher: &mut Sha256) {
    // Single byte updates write every position of the block buffer once
    for _ in 0..SHA256_BLOCK_LEN {
        hasher.update([0u8]);
    }
    Digest::reset(hasher);
}
