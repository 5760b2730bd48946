pub mod disasm;
pub mod multi_sig;
pub mod opcodes;
pub mod push_data;
pub mod script_builder;
pub mod script_class;
pub mod standard;
pub mod tokenizer;
pub mod viewer;

use crate::opcodes::codes;
use crate::script_class::{is_push_only, is_script_hash};
use log::trace;

pub use dcr_txscript_errors::{ErrorKind, TxScriptError};
pub use disasm::disasm_string;
pub use push_data::remove_opcode_by_data;
pub use tokenizer::{ParsedOpcode, ScriptTokenizer};

pub mod prelude {
    pub use super::standard::*;
}

/// The only script version understood by this crate.
pub const DEFAULT_SCRIPT_VERSION: u16 = 0;
pub const MAX_SCRIPT_SIZE: usize = 16384;
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 2048;
pub const MAX_OPS_PER_SCRIPT: usize = 255;
pub const MAX_PUB_KEYS_PER_MULTISIG: usize = 20;
pub const MAX_DATA_CARRIER_SIZE: usize = 256;

/// The opcodes of a script decoded up to the first failure, along with that
/// failure if any.
///
/// Most consensus callers work on whatever was decoded before the failure, so
/// both halves are kept side by side rather than collapsed into a `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScript<'a> {
    opcodes: Vec<ParsedOpcode<'a>>,
    error: Option<TxScriptError>,
}

impl<'a> ParsedScript<'a> {
    pub fn opcodes(&self) -> &[ParsedOpcode<'a>] {
        &self.opcodes
    }

    pub fn error(&self) -> Option<&TxScriptError> {
        self.error.as_ref()
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Drops the partial sequence when decoding failed.
    pub fn into_result(self) -> Result<Vec<ParsedOpcode<'a>>, TxScriptError> {
        match self.error {
            None => Ok(self.opcodes),
            Some(err) => Err(err),
        }
    }

    pub fn into_parts(self) -> (Vec<ParsedOpcode<'a>>, Option<TxScriptError>) {
        (self.opcodes, self.error)
    }
}

/// Decodes a version 0 script up to its end or its first malformed opcode.
pub fn parse_script(script: &[u8]) -> ParsedScript<'_> {
    let mut tokenizer = ScriptTokenizer::new(DEFAULT_SCRIPT_VERSION, script);
    let opcodes = tokenizer.by_ref().map_while(Result::ok).collect();
    ParsedScript { opcodes, error: tokenizer.err().cloned() }
}

/// Re-encodes parsed opcodes into script bytes.
pub fn unparse_script(opcodes: &[ParsedOpcode<'_>]) -> Result<Vec<u8>, TxScriptError> {
    let mut script = Vec::with_capacity(opcodes.iter().map(|op| 1 + op.data().len()).sum());
    for opcode in opcodes {
        script.extend(opcode.to_bytes()?);
    }
    Ok(script)
}

/// Returns an error if the script of the given version does not decode in full.
pub fn check_script_parses(version: u16, script: &[u8]) -> Result<(), TxScriptError> {
    let mut tokenizer = ScriptTokenizer::new(version, script);
    tokenizer.by_ref().for_each(drop);
    match tokenizer.err() {
        Some(err) => Err(err.clone()),
        None => Ok(()),
    }
}

/// Returns whether the script is in the standard pay-to-script-hash format.
pub fn is_pay_to_script_hash(script: &[u8]) -> bool {
    parse_script(script).into_result().is_ok_and(|opcodes| is_script_hash(&opcodes))
}

/// Returns whether the script only pushes data. Scripts that fail to decode
/// are not push only.
pub fn is_push_only_script(script: &[u8]) -> bool {
    parse_script(script).into_result().is_ok_and(|opcodes| is_push_only(&opcodes))
}

/// Returns whether an output is unspendable, or guaranteed to fail at execution.
///
/// Outputs without value are always unspendable. This allows outputs to be
/// pruned instantly when entering the UTXO set.
pub fn is_unspendable(amount: i64, script: &[u8]) -> bool {
    if amount == 0 {
        return true;
    }
    ScriptTokenizer::new(DEFAULT_SCRIPT_VERSION, script)
        .enumerate()
        .any(|(index, op)| op.map_or(true, |op| index == 0 && op.value() == codes::OpReturn))
}

/// Counts the signature operations of an already decoded sequence.
///
/// Multisig checks count as [`MAX_PUB_KEYS_PER_MULTISIG`] unless `precise` is
/// set and the preceding opcode is one of Op1 through Op16, in which case the
/// small integer is used.
pub fn get_sig_op_count_by_opcodes(opcodes: &[ParsedOpcode<'_>], precise: bool) -> u64 {
    let mut num_sigs: u64 = 0;
    for (i, op) in opcodes.iter().enumerate() {
        match op.value() {
            codes::OpCheckSig | codes::OpCheckSigVerify | codes::OpCheckSigAlt | codes::OpCheckSigAltVerify => num_sigs += 1,
            codes::OpCheckMultiSig | codes::OpCheckMultiSigVerify => {
                let declared_keys = match i.checked_sub(1).map(|prev| opcodes[prev].value()) {
                    Some(prev @ codes::OpTrue..=codes::Op16) if precise => prev as u64 - (codes::OpTrue as u64 - 1),
                    _ => MAX_PUB_KEYS_PER_MULTISIG as u64,
                };
                num_sigs += declared_keys;
            }
            _ => {} // If the opcode is not a sigop, no need to increase the count
        }
    }
    num_sigs
}

/// Counts the signature operations of a script, assuming the worst case for
/// multisig checks. Only the opcodes preceding a decoding failure are counted.
pub fn get_sig_op_count(script: &[u8]) -> u64 {
    get_sig_op_count_by_opcodes(parse_script(script).opcodes(), false)
}

/// Counts the signature operations precisely, looking into the redeem script
/// when the output is pay-to-script-hash and `bip16` is active.
///
/// The public key script and the redeem script are counted up to their first
/// decoding failure, while a signature script which does not decode in full
/// counts as zero.
pub fn get_precise_sig_op_count(signature_script: &[u8], script_public_key: &[u8], bip16: bool) -> u64 {
    let pk_script = parse_script(script_public_key);
    if !bip16 || !is_script_hash(pk_script.opcodes()) {
        return get_sig_op_count_by_opcodes(pk_script.opcodes(), true);
    }

    let signature_script_ops = match parse_script(signature_script).into_result() {
        Ok(opcodes) => opcodes,
        Err(err) => {
            trace!("p2sh signature script does not parse, counting no sigops: {}", err);
            return 0;
        }
    };
    if !is_push_only(&signature_script_ops) {
        trace!("p2sh signature script is not push only, counting no sigops");
        return 0;
    }
    let Some(last) = signature_script_ops.last() else {
        return 0;
    };

    let redeem_script = last.data();
    if redeem_script.is_empty() {
        return 0;
    }
    trace!("counting sigops of a {} byte redeem script", redeem_script.len());
    get_sig_op_count_by_opcodes(parse_script(redeem_script).opcodes(), true)
}
