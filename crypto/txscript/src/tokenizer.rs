use crate::opcodes::{as_small_int, codes, is_small_int, Opcode, OpcodeLength};
use crate::DEFAULT_SCRIPT_VERSION;
use dcr_txscript_errors::TxScriptError;
use log::trace;
use std::fmt::{Debug, Display, Formatter};

/// A decoded opcode along with the data it pushes, if any.
///
/// The data is a view into the script the opcode was decoded from, so the
/// script must outlive every parsed opcode derived from it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ParsedOpcode<'a> {
    opcode: &'static Opcode,
    data: &'a [u8],
}

impl<'a> ParsedOpcode<'a> {
    pub fn new(opcode: &'static Opcode, data: &'a [u8]) -> Self {
        Self { opcode, data }
    }

    pub fn opcode(&self) -> &'static Opcode {
        self.opcode
    }

    #[inline]
    pub fn value(&self) -> u8 {
        self.opcode.value()
    }

    pub fn name(&self) -> &'static str {
        self.opcode.name()
    }

    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn is_push_opcode(&self) -> bool {
        self.opcode.is_push_opcode()
    }

    pub fn is_small_int(&self) -> bool {
        is_small_int(self.value())
    }

    pub fn as_small_int(&self) -> Option<u8> {
        as_small_int(self.value())
    }

    /// Returns whether the opcode is not a push at all, or is a push using the
    /// smallest encoding available for its data.
    pub fn is_canonical_push(&self) -> bool {
        let opcode = self.value();
        let data_len = self.data.len();
        if opcode > codes::Op16 {
            return true;
        }

        if opcode < codes::OpPushData1 && opcode > codes::OpFalse && data_len == 1 && self.data[0] <= 16 {
            return false;
        }
        if opcode == codes::OpPushData1 && data_len < codes::OpPushData1 as usize {
            return false;
        }
        if opcode == codes::OpPushData2 && data_len <= u8::MAX as usize {
            return false;
        }
        if opcode == codes::OpPushData4 && data_len <= u16::MAX as usize {
            return false;
        }
        true
    }

    /// Re-encodes the opcode and its data into script bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TxScriptError> {
        let inconsistent = |expected: usize| {
            TxScriptError::Internal(format!(
                "parsed opcode {} has data length {} when {} was expected",
                self.name(),
                self.data.len(),
                expected
            ))
        };

        let mut bytes = Vec::with_capacity(1 + self.encoded_prefix_len() + self.data.len());
        bytes.push(self.value());
        match self.opcode.length() {
            OpcodeLength::Single => {
                if !self.data.is_empty() {
                    return Err(inconsistent(0));
                }
                return Ok(bytes);
            }
            OpcodeLength::Fixed(len) => {
                if self.data.len() != len {
                    return Err(inconsistent(len));
                }
            }
            OpcodeLength::Prefixed(width) => {
                if self.data.len() as u64 > width.max_len() {
                    return Err(inconsistent(width.max_len() as usize));
                }
                width.write_le(self.data.len(), &mut bytes);
            }
        }
        bytes.extend_from_slice(self.data);
        Ok(bytes)
    }

    fn encoded_prefix_len(&self) -> usize {
        match self.opcode.length() {
            OpcodeLength::Prefixed(width) => width.size(),
            _ => 0,
        }
    }
}

impl Debug for ParsedOpcode<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}{{ data:{:02x?} }}", self.opcode, self.data)
    }
}

/// Full disassembly of a single opcode: its name, the data length for
/// OpPushData# and the data itself.
impl Display for ParsedOpcode<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())?;
        match self.opcode.length() {
            OpcodeLength::Single => return Ok(()),
            OpcodeLength::Fixed(_) => {}
            OpcodeLength::Prefixed(width) => match width.size() {
                1 => write!(f, " 0x{:02x}", self.data.len())?,
                2 => write!(f, " 0x{:04x}", self.data.len())?,
                _ => write!(f, " 0x{:08x}", self.data.len())?,
            },
        }
        write!(f, " 0x{}", hex::encode(self.data))
    }
}

/// Decodes the opcodes of a script one at a time.
///
/// Decoding stops at the first malformed push. The error is yielded once by
/// the iterator and stays available from [`ScriptTokenizer::err`]; no opcode is
/// produced after it.
pub struct ScriptTokenizer<'a> {
    script: &'a [u8],
    offset: usize,
    op_count: usize,
    err: Option<TxScriptError>,
    err_yielded: bool,
}

impl<'a> ScriptTokenizer<'a> {
    /// Creates a tokenizer for a script of the given version. Only version 0
    /// is supported; any other version latches an error before the first opcode.
    pub fn new(version: u16, script: &'a [u8]) -> Self {
        let err = (version != DEFAULT_SCRIPT_VERSION).then_some(TxScriptError::UnsupportedScriptVersion(version));
        Self { script, offset: 0, op_count: 0, err, err_yielded: false }
    }

    pub fn script(&self) -> &'a [u8] {
        self.script
    }

    /// Offset of the next byte to decode. After a failure this is the offset
    /// of the opcode that could not be decoded.
    pub fn byte_index(&self) -> usize {
        self.offset
    }

    /// Position of the last successfully decoded opcode.
    pub fn opcode_position(&self) -> Option<usize> {
        self.op_count.checked_sub(1)
    }

    pub fn err(&self) -> Option<&TxScriptError> {
        self.err.as_ref()
    }

    /// Whether the tokenizer reached the end of the script or failed.
    pub fn is_done(&self) -> bool {
        self.err.is_some() || self.offset >= self.script.len()
    }

    fn decode_next(&self) -> Result<(ParsedOpcode<'a>, usize), TxScriptError> {
        let offset = self.offset;
        let remaining = &self.script[offset..];
        let opcode = Opcode::from_byte(remaining[0]);

        match opcode.length() {
            OpcodeLength::Single => Ok((ParsedOpcode::new(opcode, &[]), offset + 1)),

            OpcodeLength::Fixed(data_len) => {
                let required = data_len + 1;
                if remaining.len() < required {
                    return Err(TxScriptError::MalformedPush { opcode: opcode.name(), offset, required, remaining: remaining.len() });
                }
                Ok((ParsedOpcode::new(opcode, &remaining[1..required]), offset + required))
            }

            OpcodeLength::Prefixed(width) => {
                let after_opcode = &remaining[1..];
                let prefix_len = width.size();
                if after_opcode.len() < prefix_len {
                    return Err(TxScriptError::MalformedPush {
                        opcode: opcode.name(),
                        offset,
                        required: prefix_len,
                        remaining: after_opcode.len(),
                    });
                }

                let declared = width.read_le(&after_opcode[..prefix_len]);
                let body = &after_opcode[prefix_len..];
                if declared > body.len() as u64 {
                    return Err(TxScriptError::MalformedPushSize { opcode: opcode.name(), offset, declared, remaining: body.len() });
                }

                let data_len = declared as usize;
                Ok((ParsedOpcode::new(opcode, &body[..data_len]), offset + 1 + prefix_len + data_len))
            }
        }
    }
}

impl<'a> Iterator for ScriptTokenizer<'a> {
    type Item = Result<ParsedOpcode<'a>, TxScriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = &self.err {
            if self.err_yielded {
                return None;
            }
            self.err_yielded = true;
            return Some(Err(err.clone()));
        }
        if self.offset >= self.script.len() {
            return None;
        }

        match self.decode_next() {
            Ok((opcode, next_offset)) => {
                self.offset = next_offset;
                self.op_count += 1;
                Some(Ok(opcode))
            }
            Err(err) => {
                trace!("script decoding stopped at offset {}: {}", self.offset, err);
                self.err = Some(err.clone());
                self.err_yielded = true;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for ScriptTokenizer<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcodes::codes::*;
    use std::iter::{once, repeat};

    fn decode_all(script: &[u8]) -> (Vec<ParsedOpcode<'_>>, Option<TxScriptError>) {
        let mut tokenizer = ScriptTokenizer::new(0, script);
        let opcodes = tokenizer.by_ref().map_while(Result::ok).collect();
        (opcodes, tokenizer.err().cloned())
    }

    #[test]
    fn test_tokenizer() {
        struct Test {
            name: &'static str,
            script: Vec<u8>,
            expected_values: Vec<u8>,
            expected_data: Vec<Vec<u8>>,
            expected_err: Option<TxScriptError>,
            expected_index: usize,
        }

        let tests = vec![
            Test {
                name: "empty script",
                script: vec![],
                expected_values: vec![],
                expected_data: vec![],
                expected_err: None,
                expected_index: 0,
            },
            Test {
                name: "single byte opcodes",
                script: vec![OpFalse, Op1Negate, Op16, OpDup, OpCheckSig],
                expected_values: vec![OpFalse, Op1Negate, Op16, OpDup, OpCheckSig],
                expected_data: vec![vec![]; 5],
                expected_err: None,
                expected_index: 5,
            },
            Test {
                name: "fixed push",
                script: vec![OpData2, 0xaa, 0xbb, OpEqual],
                expected_values: vec![OpData2, OpEqual],
                expected_data: vec![vec![0xaa, 0xbb], vec![]],
                expected_err: None,
                expected_index: 4,
            },
            Test {
                name: "prefixed pushes",
                script: vec![OpPushData1, 0x01, 0xcc, OpPushData2, 0x02, 0x00, 0x01, 0x02, OpPushData4, 0x00, 0x00, 0x00, 0x00],
                expected_values: vec![OpPushData1, OpPushData2, OpPushData4],
                expected_data: vec![vec![0xcc], vec![0x01, 0x02], vec![]],
                expected_err: None,
                expected_index: 13,
            },
            Test {
                name: "truncated fixed push",
                script: vec![OpData5, 0x01, 0x02],
                expected_values: vec![],
                expected_data: vec![],
                expected_err: Some(TxScriptError::MalformedPush { opcode: "OP_DATA_5", offset: 0, required: 6, remaining: 3 }),
                expected_index: 0,
            },
            Test {
                name: "truncated fixed push after valid opcodes",
                script: vec![OpTrue, OpDup, OpData3, 0x01],
                expected_values: vec![OpTrue, OpDup],
                expected_data: vec![vec![], vec![]],
                expected_err: Some(TxScriptError::MalformedPush { opcode: "OP_DATA_3", offset: 2, required: 4, remaining: 2 }),
                expected_index: 2,
            },
            Test {
                name: "missing length prefix",
                script: vec![OpPushData2, 0x01],
                expected_values: vec![],
                expected_data: vec![],
                expected_err: Some(TxScriptError::MalformedPush { opcode: "OP_PUSHDATA2", offset: 0, required: 2, remaining: 1 }),
                expected_index: 0,
            },
            Test {
                name: "prefixed length exceeds script",
                script: vec![OpPushData1, 0x05, 0x01, 0x02],
                expected_values: vec![],
                expected_data: vec![],
                expected_err: Some(TxScriptError::MalformedPushSize {
                    opcode: "OP_PUSHDATA1",
                    offset: 0,
                    declared: 5,
                    remaining: 2,
                }),
                expected_index: 0,
            },
            Test {
                name: "prefixed length with high bit set",
                script: vec![OpNop, OpPushData4, 0xff, 0xff, 0xff, 0xff, 0x00],
                expected_values: vec![OpNop],
                expected_data: vec![vec![]],
                expected_err: Some(TxScriptError::MalformedPushSize {
                    opcode: "OP_PUSHDATA4",
                    offset: 1,
                    declared: u32::MAX as u64,
                    remaining: 1,
                }),
                expected_index: 1,
            },
        ];

        for test in tests {
            let mut tokenizer = ScriptTokenizer::new(0, &test.script);
            let mut values = vec![];
            let mut data = vec![];
            for opcode in tokenizer.by_ref().map_while(Result::ok) {
                values.push(opcode.value());
                data.push(opcode.data().to_vec());
            }
            assert_eq!(values, test.expected_values, "failed for '{}'", test.name);
            assert_eq!(data, test.expected_data, "failed for '{}'", test.name);
            assert_eq!(tokenizer.err(), test.expected_err.as_ref(), "failed for '{}'", test.name);
            assert_eq!(tokenizer.byte_index(), test.expected_index, "failed for '{}'", test.name);
            assert!(tokenizer.is_done(), "failed for '{}'", test.name);
        }
    }

    #[test]
    fn test_error_is_latched() {
        let script = [OpTrue, OpData2, 0x01];
        let mut tokenizer = ScriptTokenizer::new(0, &script);
        assert!(matches!(tokenizer.next(), Some(Ok(_))));
        assert_eq!(tokenizer.opcode_position(), Some(0));
        assert!(matches!(tokenizer.next(), Some(Err(TxScriptError::MalformedPush { offset: 1, .. }))));
        assert!(tokenizer.next().is_none());
        assert!(tokenizer.next().is_none());
        assert!(tokenizer.err().is_some());
        assert_eq!(tokenizer.opcode_position(), Some(0));
    }

    #[test]
    fn test_unsupported_version() {
        let script = [OpTrue];
        let mut tokenizer = ScriptTokenizer::new(1, &script);
        assert!(tokenizer.is_done());
        assert_eq!(tokenizer.next(), Some(Err(TxScriptError::UnsupportedScriptVersion(1))));
        assert_eq!(tokenizer.next(), None);
        assert_eq!(tokenizer.byte_index(), 0);
        assert_eq!(tokenizer.opcode_position(), None);
    }

    #[test]
    fn test_data_borrows_script() {
        let script: Vec<u8> = once(OpData20).chain(repeat(0x42).take(20)).collect();
        let (opcodes, err) = decode_all(&script);
        assert!(err.is_none());
        assert_eq!(opcodes.len(), 1);
        assert_eq!(opcodes[0].data().as_ptr(), script[1..].as_ptr());
    }

    #[test]
    fn test_canonical_push() {
        struct Test {
            name: &'static str,
            script: Vec<u8>,
            expected: bool,
        }

        let tests = vec![
            Test { name: "non push", script: vec![OpCheckSig], expected: true },
            Test { name: "OP_0", script: vec![OpFalse], expected: true },
            Test { name: "OP_16", script: vec![Op16], expected: true },
            Test { name: "OP_RESERVED", script: vec![OpReserved], expected: true },
            Test { name: "OP_DATA_1 small int", script: vec![OpData1, 0x10], expected: false },
            Test { name: "OP_DATA_1 zero", script: vec![OpData1, 0x00], expected: false },
            Test { name: "OP_DATA_1 above 16", script: vec![OpData1, 0x11], expected: true },
            Test { name: "OP_DATA_1 negative one", script: vec![OpData1, 0x81], expected: true },
            Test { name: "OP_DATA_2", script: vec![OpData2, 0x01, 0x02], expected: true },
            Test {
                name: "OP_PUSHDATA1 with 75 bytes",
                script: [OpPushData1, 75].into_iter().chain(repeat(0x01).take(75)).collect(),
                expected: false,
            },
            Test {
                name: "OP_PUSHDATA1 with 76 bytes",
                script: [OpPushData1, 76].into_iter().chain(repeat(0x01).take(76)).collect(),
                expected: true,
            },
            Test {
                name: "OP_PUSHDATA2 with 255 bytes",
                script: [OpPushData2, 0xff, 0x00].into_iter().chain(repeat(0x01).take(255)).collect(),
                expected: false,
            },
            Test {
                name: "OP_PUSHDATA2 with 256 bytes",
                script: [OpPushData2, 0x00, 0x01].into_iter().chain(repeat(0x01).take(256)).collect(),
                expected: true,
            },
            Test {
                name: "OP_PUSHDATA4 with 65535 bytes",
                script: [OpPushData4, 0xff, 0xff, 0x00, 0x00].into_iter().chain(repeat(0x01).take(65535)).collect(),
                expected: false,
            },
            Test {
                name: "OP_PUSHDATA4 with 65536 bytes",
                script: [OpPushData4, 0x00, 0x00, 0x01, 0x00].into_iter().chain(repeat(0x01).take(65536)).collect(),
                expected: true,
            },
        ];

        for test in tests {
            let (opcodes, err) = decode_all(&test.script);
            assert!(err.is_none(), "failed for '{}'", test.name);
            assert_eq!(opcodes[0].is_canonical_push(), test.expected, "failed for '{}'", test.name);
        }
    }

    #[test]
    fn test_to_bytes() {
        let script = [OpPushData2, 0x02, 0x00, 0xaa, 0xbb, OpData1, 0x20, OpCheckSig];
        let (opcodes, _) = decode_all(&script);
        let bytes: Vec<u8> = opcodes.iter().flat_map(|op| op.to_bytes().expect("decoded opcodes are consistent")).collect();
        assert_eq!(bytes, script.to_vec());

        let data = [0x01, 0x02];
        let bad_fixed = ParsedOpcode::new(Opcode::from_byte(OpData3), &data);
        assert!(matches!(bad_fixed.to_bytes(), Err(TxScriptError::Internal(_))));
        let bad_single = ParsedOpcode::new(Opcode::from_byte(OpDup), &data);
        assert!(matches!(bad_single.to_bytes(), Err(TxScriptError::Internal(_))));
        let big = vec![0u8; 256];
        let bad_prefixed = ParsedOpcode::new(Opcode::from_byte(OpPushData1), &big);
        assert!(matches!(bad_prefixed.to_bytes(), Err(TxScriptError::Internal(_))));
    }

    #[test]
    fn test_full_display() {
        struct Test {
            name: &'static str,
            script: Vec<u8>,
            expected: &'static str,
        }

        let tests = vec![
            Test { name: "no data", script: vec![OpDup], expected: "OP_DUP" },
            Test { name: "small int", script: vec![Op3], expected: "OP_3" },
            Test { name: "fixed push", script: vec![OpData2, 0xde, 0xad], expected: "OP_DATA_2 0xdead" },
            Test { name: "pushdata1", script: vec![OpPushData1, 0x01, 0x7f], expected: "OP_PUSHDATA1 0x01 0x7f" },
            Test { name: "pushdata2", script: vec![OpPushData2, 0x01, 0x00, 0x7f], expected: "OP_PUSHDATA2 0x0001 0x7f" },
            Test {
                name: "pushdata4",
                script: vec![OpPushData4, 0x01, 0x00, 0x00, 0x00, 0x7f],
                expected: "OP_PUSHDATA4 0x00000001 0x7f",
            },
        ];

        for test in tests {
            let (opcodes, _) = decode_all(&test.script);
            assert_eq!(opcodes[0].to_string(), test.expected, "failed for '{}'", test.name);
        }
    }
}
