use crate::tokenizer::ParsedOpcode;

#[derive(Debug, PartialEq, Eq)]
pub struct MultiSigScriptParameters<'a> {
    pub required_signatures_count: u8,
    pub signers_count: u8,
    pub signers_pubkey: Vec<&'a [u8]>,
}

/// Extract parameters of the standard multisig check ending at `checkmultisig_index`:
///   OP_m <pubkey1> ... <pubkeyn> OP_n OP_CHECKMULTISIG
///
/// Returns `None` if the opcodes preceding the check do not follow that form.
pub fn get_multisig_params<'a>(opcodes: &[ParsedOpcode<'a>], checkmultisig_index: usize) -> Option<MultiSigScriptParameters<'a>> {
    let op_n = opcodes.get(checkmultisig_index.checked_sub(1)?)?;
    let n = op_n.as_small_int().filter(|n| *n >= 1)?;

    let pubkeys_end = checkmultisig_index - 1;
    let pubkeys_start = pubkeys_end.checked_sub(n as usize)?;
    let pubkeys_ops = opcodes.get(pubkeys_start..pubkeys_end)?;

    let mut pubkeys = Vec::with_capacity(n as usize);
    for op in pubkeys_ops {
        if !op.opcode().has_data() || !matches!(op.data().len(), 33 | 65) {
            return None;
        }
        pubkeys.push(op.data());
    }

    let op_m = opcodes.get(pubkeys_start.checked_sub(1)?)?;
    let m = op_m.as_small_int()?;
    if m > n {
        return None;
    }

    Some(MultiSigScriptParameters { required_signatures_count: m, signers_count: n, signers_pubkey: pubkeys })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcodes::codes::*;
    use crate::parse_script;
    use crate::standard::multisig_redeem_script;

    #[test]
    fn test_get_multisig_params() {
        struct Test {
            name: &'static str,
            script: Vec<u8>,
            expected: Option<(u8, u8)>,
        }

        let key1 = [vec![0x02], vec![1; 32]].concat();
        let key2 = [vec![0x03], vec![2; 32]].concat();

        let tests = vec![
            Test { name: "1 of 2", script: multisig_redeem_script(&[&key1, &key2], 1).unwrap(), expected: Some((1, 2)) },
            Test { name: "2 of 2", script: multisig_redeem_script(&[&key1, &key2], 2).unwrap(), expected: Some((2, 2)) },
            Test { name: "check alone", script: vec![OpCheckMultiSig], expected: None },
            Test { name: "n is zero", script: vec![OpFalse, OpFalse, OpCheckMultiSig], expected: None },
            Test { name: "missing m", script: [vec![OpData33], key1.clone(), vec![Op1, OpCheckMultiSig]].concat(), expected: None },
            Test {
                name: "m above n",
                script: [vec![Op2, OpData33], key1.clone(), vec![Op1, OpCheckMultiSig]].concat(),
                expected: None,
            },
            Test {
                name: "key of wrong size",
                script: vec![Op1, OpData2, 0x02, 0x01, Op1, OpCheckMultiSig],
                expected: None,
            },
        ];

        for test in tests {
            let opcodes = parse_script(&test.script).into_result().unwrap();
            let params = get_multisig_params(&opcodes, opcodes.len() - 1);
            assert_eq!(
                params.as_ref().map(|p| (p.required_signatures_count, p.signers_count)),
                test.expected,
                "failed for '{}'",
                test.name
            );
            if let Some(params) = params {
                assert_eq!(params.signers_pubkey.len(), params.signers_count as usize, "failed for '{}'", test.name);
            }
        }
    }
}
