use crate::{multi_sig::get_multisig_params, opcodes::codes, opcodes::OpcodeLength, parse_script, TxScriptError};
use std::fmt::{Display, Formatter};

/// Multi-line listing of a script, one opcode per line, indented along
/// conditional branches.
pub struct ScriptViewer<'a> {
    script: &'a [u8],
}

impl<'a> ScriptViewer<'a> {
    pub fn new(script: &'a [u8]) -> Self {
        Self { script }
    }

    pub fn render(&self) -> Result<String, TxScriptError> {
        let opcodes = parse_script(self.script).into_result()?;
        let mut s = String::new();
        let mut indent_level: usize = 0;

        for (i, opcode) in opcodes.iter().enumerate() {
            let value = opcode.value();

            if value == codes::OpEndIf || value == codes::OpElse {
                indent_level = indent_level.saturating_sub(1);
            }

            s.push_str(&"  ".repeat(indent_level));
            s.push_str(opcode.name());

            match opcode.opcode().length() {
                OpcodeLength::Fixed(_) => s.push_str(&format!(" {}", hex::encode(opcode.data()))),
                OpcodeLength::Prefixed(_) => s.push_str(&format!(" {} {}", opcode.data().len(), hex::encode(opcode.data()))),
                OpcodeLength::Single => {
                    if value == codes::OpCheckMultiSig || value == codes::OpCheckMultiSigVerify {
                        if let Some(params) = get_multisig_params(&opcodes, i) {
                            s.push_str(&format!(" // {} of {}", params.required_signatures_count, params.signers_count));
                        }
                    }
                }
            }

            if opcode.opcode().has_data() {
                if let Some(sub_disassembly) = nested_script(opcode.data()) {
                    s.push_str("\n    -- Begin Redeem Script --\n");
                    s.push_str(sub_disassembly.trim_end());
                    s.push_str("\n    -- End Redeem Script --");
                }
            }

            s.push('\n');

            if value == codes::OpIf || value == codes::OpNotIf || value == codes::OpElse {
                indent_level += 1;
            }
        }
        Ok(s)
    }
}

/// Renders pushed data as a script when it decodes in full and ends with a
/// non-push opcode, as redeem scripts do. Keys and hashes rarely qualify.
fn nested_script(data: &[u8]) -> Option<String> {
    let opcodes = parse_script(data).into_result().ok()?;
    if opcodes.last()?.is_push_opcode() {
        return None;
    }
    ScriptViewer::new(data).render().ok()
}

impl Display for ScriptViewer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self.render() {
            Ok(s) => f.write_str(&s),
            Err(e) => write!(f, "Error disassembling script: {}", e),
        }
    }
}
