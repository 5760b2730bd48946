use crate::opcodes::OpcodeLength;
use crate::tokenizer::{ParsedOpcode, ScriptTokenizer};
use crate::DEFAULT_SCRIPT_VERSION;
use dcr_txscript_errors::TxScriptError;

/// Marker appended to a disassembly that stopped at a malformed opcode.
pub const DISASM_ERROR_MARKER: &str = "[error]";

/// Formats a script as a single line of space separated opcodes.
///
/// Opcodes standing for small values are replaced by the value itself and
/// data pushes are replaced by their hex encoded payload. When the script
/// fails to decode, everything decoded so far is kept and followed by
/// [`DISASM_ERROR_MARKER`], and the decoding error is returned alongside.
pub fn disasm_string(script: &[u8]) -> (String, Option<TxScriptError>) {
    let mut disbuf = String::with_capacity(script.len() * 2);
    let mut tokenizer = ScriptTokenizer::new(DEFAULT_SCRIPT_VERSION, script);

    for (i, opcode) in tokenizer.by_ref().map_while(Result::ok).enumerate() {
        if i > 0 {
            disbuf.push(' ');
        }
        write_compact(&mut disbuf, &opcode);
    }

    let err = tokenizer.err().cloned();
    if err.is_some() {
        if tokenizer.byte_index() != 0 {
            disbuf.push(' ');
        }
        disbuf.push_str(DISASM_ERROR_MARKER);
    }
    (disbuf, err)
}

fn write_compact(buf: &mut String, opcode: &ParsedOpcode<'_>) {
    match opcode.opcode().length() {
        OpcodeLength::Single => buf.push_str(opcode.opcode().compact_name()),
        OpcodeLength::Fixed(_) | OpcodeLength::Prefixed(_) => buf.push_str(&hex::encode(opcode.data())),
    }
}
