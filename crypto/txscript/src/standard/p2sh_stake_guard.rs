//! Legacy check rejecting stake opcodes inside pay-to-script-hash redeem
//! scripts.
//!
//! Kept only so that historical blocks validate the same way. It is scheduled
//! for removal and must not be extended.

use super::{contains_stake_opcodes, pushed_data};
use crate::script_class::{get_stake_out_subclass, ScriptClass};
use dcr_txscript_errors::TxScriptError;
use log::debug;

/// Fails when the output spent is pay-to-script-hash (directly or as the
/// subclass of a stake output) and the redeem script revealed by the
/// signature script contains stake opcodes.
///
/// The redeem script is the last item pushed by the signature script. A
/// signature script without pushed data is rejected as not push only.
pub fn has_p2sh_script_sig_stake_opcodes(version: u16, signature_script: &[u8], script_public_key: &[u8]) -> Result<(), TxScriptError> {
    let class = match get_stake_out_subclass(script_public_key) {
        Some(subclass) => subclass,
        None => ScriptClass::from_script(version, script_public_key),
    };
    if class != ScriptClass::ScriptHash {
        return Ok(());
    }

    let pushed = pushed_data(signature_script)?;
    let Some(redeem_script) = pushed.last() else {
        debug!("rejecting p2sh signature script without pushed data");
        return Err(TxScriptError::NotPushOnly("script has no pushed data".to_string()));
    };

    if contains_stake_opcodes(redeem_script)? {
        debug!("rejecting p2sh redeem script carrying stake opcodes");
        return Err(TxScriptError::P2SHStakeOpCodes("stake opcodes were found in a p2sh script".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcodes::codes::*;
    use crate::standard::{pay_to_pub_key_hash_script, pay_to_script_hash_script, pay_to_script_hash_signature_script};
    use dcr_txscript_errors::ErrorKind;
    use std::iter::once;

    #[test]
    fn test_has_p2sh_script_sig_stake_opcodes() {
        struct Test {
            name: &'static str,
            signature_script: Vec<u8>,
            script_public_key: Vec<u8>,
            expected: Option<ErrorKind>,
        }

        let p2sh = pay_to_script_hash_script(&[3; 20]);
        let staked_p2sh: Vec<u8> = once(OpSSGen).chain(p2sh.iter().copied()).collect();
        let clean_sig = pay_to_script_hash_signature_script(&[OpTrue], &[]).unwrap();
        let tagged_sig = pay_to_script_hash_signature_script(&[OpSStx, OpTrue], &[OpFalse]).unwrap();

        let tests = vec![
            Test { name: "clean redeem script", signature_script: clean_sig.clone(), script_public_key: p2sh.clone(), expected: None },
            Test {
                name: "stake opcode in redeem script",
                signature_script: tagged_sig.clone(),
                script_public_key: p2sh.clone(),
                expected: Some(ErrorKind::P2SHStakeOpCodes),
            },
            Test {
                name: "stake opcode in redeem script of stake p2sh",
                signature_script: tagged_sig.clone(),
                script_public_key: staked_p2sh.clone(),
                expected: Some(ErrorKind::P2SHStakeOpCodes),
            },
            Test {
                name: "clean redeem script of stake p2sh",
                signature_script: clean_sig.clone(),
                script_public_key: staked_p2sh,
                expected: None,
            },
            Test {
                name: "not p2sh",
                signature_script: tagged_sig,
                script_public_key: pay_to_pub_key_hash_script(&[4; 20]),
                expected: None,
            },
            Test {
                name: "no pushed data",
                signature_script: vec![Op1, Op2],
                script_public_key: p2sh.clone(),
                expected: Some(ErrorKind::NotPushOnly),
            },
            Test { name: "empty signature script", signature_script: vec![], script_public_key: p2sh.clone(), expected: Some(ErrorKind::NotPushOnly) },
            Test {
                name: "malformed signature script",
                signature_script: vec![OpData4, 0x01],
                script_public_key: p2sh.clone(),
                expected: Some(ErrorKind::MalformedPush),
            },
            Test {
                name: "malformed redeem script",
                signature_script: vec![OpData2, OpSStx, OpPushData1],
                script_public_key: p2sh.clone(),
                expected: Some(ErrorKind::MalformedPush),
            },
            Test {
                name: "only the last push is inspected",
                signature_script: vec![OpData1, OpSStx, OpData1, OpTrue],
                script_public_key: p2sh,
                expected: None,
            },
        ];

        for test in tests {
            let result = has_p2sh_script_sig_stake_opcodes(0, &test.signature_script, &test.script_public_key);
            assert_eq!(result.err().map(|err| err.kind()), test.expected, "failed for '{}'", test.name);
        }
    }
}
