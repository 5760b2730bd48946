use crate::{
    opcodes::{codes::*, PrefixWidth, OP_1_NEGATE_VAL, OP_DATA_MAX_VAL, OP_DATA_MIN_VAL, OP_SMALL_INT_MAX_VAL},
    MAX_SCRIPT_ELEMENT_SIZE, MAX_SCRIPT_SIZE,
};
use thiserror::Error;

/// Initial capacity of the script being built. Enough for the common
/// standard scripts without growing.
const DEFAULT_SCRIPT_ALLOC: usize = 512;

#[derive(Error, PartialEq, Eq, Debug, Clone, Copy)]
pub enum ScriptBuilderError {
    #[error("adding opcode {0} would exceed the maximum allowed script length of {MAX_SCRIPT_SIZE}")]
    OpCodeRejected(u8),

    #[error("adding {0} opcodes would exceed the maximum allowed script length of {MAX_SCRIPT_SIZE}")]
    OpCodesRejected(usize),

    #[error("adding {0} bytes of data would exceed the maximum allowed script length of {MAX_SCRIPT_SIZE}")]
    DataRejected(usize),

    #[error("adding a data element of {0} bytes exceeds the maximum allowed script element size of {MAX_SCRIPT_ELEMENT_SIZE}")]
    ElementExceedsMaxSize(usize),

    #[error("adding integer {0} would exceed the maximum allowed script length of {MAX_SCRIPT_SIZE}")]
    IntegerRejected(i64),
}
pub type ScriptBuilderResult<T> = std::result::Result<T, ScriptBuilderError>;

/// Builds scripts out of opcodes, integers and data, always choosing the
/// canonical push for the data given. Pushes that could never execute
/// because they exceed [`MAX_SCRIPT_ELEMENT_SIZE`] or would grow the script
/// past [`MAX_SCRIPT_SIZE`] are rejected and leave the script untouched.
///
/// For example, a 2-of-3 multisig redeem script:
///
/// ```
/// use dcr_txscript::opcodes::codes::*;
/// use dcr_txscript::script_builder::{ScriptBuilderResult, ScriptBuilder};
/// fn build_multisig_script(pub_key1: &[u8], pub_key2: &[u8], pub_key3: &[u8]) -> ScriptBuilderResult<Vec<u8>> {
///     Ok(ScriptBuilder::new()
///         .add_op(Op2)?
///         .add_data(pub_key1)?.add_data(pub_key2)?.add_data(pub_key3)?
///         .add_op(Op3)?
///         .add_op(OpCheckMultiSig)?
///         .drain())
/// }
/// ```
pub struct ScriptBuilder {
    script: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self { script: Vec::with_capacity(DEFAULT_SCRIPT_ALLOC) }
    }

    pub fn script(&self) -> &[u8] {
        &self.script
    }

    /// Takes the script out, leaving the builder empty.
    pub fn drain(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.script)
    }

    pub fn add_op(&mut self, opcode: u8) -> ScriptBuilderResult<&mut Self> {
        if self.script.len() >= MAX_SCRIPT_SIZE {
            return Err(ScriptBuilderError::OpCodeRejected(opcode));
        }

        self.script.push(opcode);
        Ok(self)
    }

    pub fn add_ops(&mut self, opcodes: &[u8]) -> ScriptBuilderResult<&mut Self> {
        if self.script.len() + opcodes.len() > MAX_SCRIPT_SIZE {
            return Err(ScriptBuilderError::OpCodesRejected(opcodes.len()));
        }

        self.script.extend_from_slice(opcodes);
        Ok(self)
    }

    /// Returns the number of bytes the canonical encoding of the data will take.
    pub fn canonical_data_size(data: &[u8]) -> usize {
        if Self::small_value_opcode(data).is_some() {
            return 1;
        }
        let prefix = match Self::push_prefix(data.len()) {
            None => 0,
            Some(width) => width.size(),
        };
        1 + prefix + data.len()
    }

    /// The single opcode standing for `data` when it is empty, a number from
    /// 1 to 16, or -1.
    fn small_value_opcode(data: &[u8]) -> Option<u8> {
        match data {
            [] | [0] => Some(Op0),
            [n] if *n <= OP_SMALL_INT_MAX_VAL => Some((Op1 - 1) + n),
            [OP_1_NEGATE_VAL] => Some(Op1Negate),
            _ => None,
        }
    }

    /// The smallest length prefix able to encode `data_len`, or `None` when an
    /// OpData# opcode suffices.
    fn push_prefix(data_len: usize) -> Option<PrefixWidth> {
        if data_len <= OP_DATA_MAX_VAL as usize {
            None
        } else if data_len <= u8::MAX as usize {
            Some(PrefixWidth::U8)
        } else if data_len <= u16::MAX as usize {
            Some(PrefixWidth::U16)
        } else {
            Some(PrefixWidth::U32)
        }
    }

    /// Pushes `data` with its canonical opcode. No data limits are enforced.
    fn add_raw_data(&mut self, data: &[u8]) -> &mut Self {
        if let Some(opcode) = Self::small_value_opcode(data) {
            self.script.push(opcode);
            return self;
        }

        match Self::push_prefix(data.len()) {
            None => self.script.push((OP_DATA_MIN_VAL - 1) + data.len() as u8),
            Some(width) => {
                self.script.push(match width {
                    PrefixWidth::U8 => OpPushData1,
                    PrefixWidth::U16 => OpPushData2,
                    PrefixWidth::U32 => OpPushData4,
                });
                width.write_le(data.len(), &mut self.script);
            }
        }
        self.script.extend_from_slice(data);
        self
    }

    /// Pushes data without the size checks of [`ScriptBuilder::add_data`], for
    /// tests that need scripts the engine would refuse.
    #[cfg(test)]
    pub fn add_data_unchecked(&mut self, data: &[u8]) -> &mut Self {
        self.add_raw_data(data)
    }

    /// Pushes the passed data using the smallest push able to carry it.
    ///
    /// Empty data pushes OP_0. Data larger than [`MAX_SCRIPT_ELEMENT_SIZE`],
    /// or whose push would grow the script beyond [`MAX_SCRIPT_SIZE`], is
    /// rejected and the script is left unmodified.
    pub fn add_data(&mut self, data: &[u8]) -> ScriptBuilderResult<&mut Self> {
        let data_size = Self::canonical_data_size(data);
        if self.script.len() + data_size > MAX_SCRIPT_SIZE {
            return Err(ScriptBuilderError::DataRejected(data_size));
        }

        let data_len = data.len();
        if data_len > MAX_SCRIPT_ELEMENT_SIZE {
            return Err(ScriptBuilderError::ElementExceedsMaxSize(data_len));
        }

        Ok(self.add_raw_data(data))
    }

    /// Pushes an integer, as a small integer opcode when possible and as a
    /// script number otherwise.
    pub fn add_i64(&mut self, val: i64) -> ScriptBuilderResult<&mut Self> {
        if self.script.len() + 1 > MAX_SCRIPT_SIZE {
            return Err(ScriptBuilderError::IntegerRejected(val));
        }

        if val == 0 {
            self.script.push(Op0);
            return Ok(self);
        }
        if val == -1 || (1..=16).contains(&val) {
            self.script.push(((Op1 as i64 - 1) + val) as u8);
            return Ok(self);
        }

        self.add_data(&serialize_script_num(val))
    }
}

/// Encodes an integer as a script number: little endian magnitude with the
/// sign carried by the most significant bit of the last byte.
fn serialize_script_num(val: i64) -> Vec<u8> {
    if val == 0 {
        return vec![];
    }

    let negative = val < 0;
    let mut magnitude = val.unsigned_abs();
    let mut bytes = Vec::with_capacity(9);
    while magnitude > 0 {
        bytes.push((magnitude & 0xff) as u8);
        magnitude >>= 8;
    }

    // An extra byte holds the sign when the top bit is already in use.
    let last = bytes.len() - 1;
    if bytes[last] & 0x80 != 0 {
        bytes.push(if negative { 0x80 } else { 0 });
    } else if negative {
        bytes[last] |= 0x80;
    }
    bytes
}

impl Default for ScriptBuilder {
    fn default() -> Self {
        Self::new()
    }
}
