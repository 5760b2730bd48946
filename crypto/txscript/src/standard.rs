use crate::{
    opcodes::{
        codes::{OpCheckSig, OpData20, OpDup, OpEqual, OpEqualVerify, OpFalse, OpHash160},
        is_stake_opcode,
    },
    parse_script,
    script_builder::{ScriptBuilder, ScriptBuilderResult},
};
use dcr_txscript_errors::TxScriptError;
use std::iter::once;

mod multisig;
pub mod p2sh_stake_guard;

pub use multisig::{multisig_redeem_script, Error as MultisigCreateError};

/// Creates a new script to pay a transaction output to a 20-byte pubkey hash.
pub fn pay_to_pub_key_hash_script(pub_key_hash: &[u8; 20]) -> Vec<u8> {
    [OpDup, OpHash160, OpData20].into_iter().chain(pub_key_hash.iter().copied()).chain([OpEqualVerify, OpCheckSig]).collect()
}

/// Creates a new script to pay a transaction output to a 20-byte script hash.
pub fn pay_to_script_hash_script(script_hash: &[u8; 20]) -> Vec<u8> {
    [OpHash160, OpData20].into_iter().chain(script_hash.iter().copied()).chain(once(OpEqual)).collect()
}

/// Prefixes a pay to pubkey hash or pay to script hash script with one of the
/// stake tagging opcodes. Returns `None` if `tag` is not a stake opcode.
pub fn stake_tagged_script(tag: u8, script: &[u8]) -> Option<Vec<u8>> {
    is_stake_opcode(tag).then(|| once(tag).chain(script.iter().copied()).collect())
}

/// Generates a signature script that fits a pay-to-script-hash script
pub fn pay_to_script_hash_signature_script(redeem_script: &[u8], signature: &[u8]) -> ScriptBuilderResult<Vec<u8>> {
    let redeem_script_as_data = ScriptBuilder::new().add_data(redeem_script)?.drain();
    Ok(signature.iter().copied().chain(redeem_script_as_data).collect())
}

/// Returns the payload of every data push in the script. OpFalse contributes
/// an empty item while the other small integers are skipped.
pub fn pushed_data(script: &[u8]) -> Result<Vec<Vec<u8>>, TxScriptError> {
    let opcodes = parse_script(script).into_result()?;
    Ok(opcodes
        .iter()
        .filter(|op| op.opcode().has_data() || op.value() == OpFalse)
        .map(|op| op.data().to_vec())
        .collect())
}

/// Returns whether the script contains any stake tagging opcode.
pub fn contains_stake_opcodes(script: &[u8]) -> Result<bool, TxScriptError> {
    let opcodes = parse_script(script).into_result()?;
    Ok(opcodes.iter().any(|op| op.opcode().is_stake_opcode()))
}
