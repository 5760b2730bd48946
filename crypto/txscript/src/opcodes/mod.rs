#[macro_use]
mod macros;

use std::fmt::{Debug, Formatter};

/// First value in the range formed by the "small integer" Op# opcodes
pub const OP_SMALL_INT_MIN_VAL: u8 = 1;
/// Last value in the range formed by the "small integer" Op# opcodes
pub const OP_SMALL_INT_MAX_VAL: u8 = 16;
/// First value in the range formed by OpData# opcodes (where opcode == value)
pub const OP_DATA_MIN_VAL: u8 = self::codes::OpData1;
/// Last value in the range formed by OpData# opcodes (where opcode == value)
pub const OP_DATA_MAX_VAL: u8 = self::codes::OpData75;
/// Minus 1 value
pub const OP_1_NEGATE_VAL: u8 = 0x81;

/// Width of the little-endian length prefix carried by the OpPushData# opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixWidth {
    U8,
    U16,
    U32,
}

impl PrefixWidth {
    /// Number of bytes occupied by the prefix.
    pub const fn size(&self) -> usize {
        match self {
            PrefixWidth::U8 => 1,
            PrefixWidth::U16 => 2,
            PrefixWidth::U32 => 4,
        }
    }

    /// Largest data length the prefix can express.
    pub const fn max_len(&self) -> u64 {
        match self {
            PrefixWidth::U8 => u8::MAX as u64,
            PrefixWidth::U16 => u16::MAX as u64,
            PrefixWidth::U32 => u32::MAX as u64,
        }
    }

    /// Reads the prefix from `bytes`, which must hold exactly `size()` bytes.
    pub(crate) fn read_le(&self, bytes: &[u8]) -> u64 {
        bytes.iter().rev().fold(0u64, |acc, b| (acc << 8) | *b as u64)
    }

    pub(crate) fn write_le(&self, len: usize, out: &mut Vec<u8>) {
        out.extend_from_slice(&(len as u64).to_le_bytes()[..self.size()]);
    }
}

/// How an opcode consumes the bytes following it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodeLength {
    /// The opcode byte alone. Small integers carry their value in the opcode itself.
    Single,
    /// A push of exactly this many data bytes after the opcode byte.
    Fixed(usize),
    /// A push whose data length is read from a little-endian prefix.
    Prefixed(PrefixWidth),
}

pub struct Opcode {
    value: u8,
    name: &'static str,
    length: OpcodeLength,
}

impl Opcode {
    #[inline]
    pub fn from_byte(value: u8) -> &'static Opcode {
        &OPCODES[value as usize]
    }

    #[inline]
    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn length(&self) -> OpcodeLength {
        self.length
    }

    /// Whether the opcode carries data bytes after it (OpData# and OpPushData#).
    pub fn has_data(&self) -> bool {
        self.length != OpcodeLength::Single
    }

    /// All opcodes up to Op16 are treated as data pushes. This includes
    /// OpReserved, which fails on execution anyway.
    #[inline]
    pub fn is_push_opcode(&self) -> bool {
        self.value <= codes::Op16
    }

    pub fn is_stake_opcode(&self) -> bool {
        is_stake_opcode(self.value)
    }

    /// Name used by the compact disassembly, where opcodes representing
    /// small values are replaced by the value itself.
    pub fn compact_name(&self) -> &'static str {
        const SMALL_INTS: [&str; 16] = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16"];
        match self.value {
            codes::OpFalse => "0",
            codes::Op1Negate => "-1",
            v @ codes::OpTrue..=codes::Op16 => SMALL_INTS[(v - codes::OpTrue) as usize],
            _ => self.name,
        }
    }
}

impl Debug for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}<{:#04x}>", self.name, self.value)
    }
}

impl PartialEq for Opcode {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Opcode {}

/// Returns whether the opcode is a small integer: Op0, or Op1 through Op16.
#[inline]
pub fn is_small_int(op: u8) -> bool {
    op == codes::OpFalse || (codes::OpTrue..=codes::Op16).contains(&op)
}

/// Converts a small integer opcode to the value it represents.
pub fn as_small_int(op: u8) -> Option<u8> {
    match op {
        codes::OpFalse => Some(0),
        codes::OpTrue..=codes::Op16 => Some(op - (codes::OpTrue - 1)),
        _ => None,
    }
}

/// Returns whether the opcode is one of the stake tagging opcodes.
#[inline]
pub fn is_stake_opcode(op: u8) -> bool {
    (codes::OpSStx..=codes::OpSStxChange).contains(&op)
}

/*
The table below lists every opcode with its unique value, its length
specification and its display name:

```
opcode OpCodeName<value, length> "NAME"
// or, with an alias
opcode |OpCodeAlias| OpCodeName<value, length> "NAME"
```

The length is `1` for opcodes without data, the total encoded size (opcode
byte included) for fixed pushes, or an unsigned integer type naming the
width of the length prefix for OpPushData#.

Implementation details in `opcodes/macros.rs`.
*/
opcode_list! {

    // Data push opcodes.
    opcode |Op0| OpFalse<0x00, 1> "OP_0"
    opcode OpData1<0x01, 2> "OP_DATA_1"
    opcode OpData2<0x02, 3> "OP_DATA_2"
    opcode OpData3<0x03, 4> "OP_DATA_3"
    opcode OpData4<0x04, 5> "OP_DATA_4"
    opcode OpData5<0x05, 6> "OP_DATA_5"
    opcode OpData6<0x06, 7> "OP_DATA_6"
    opcode OpData7<0x07, 8> "OP_DATA_7"
    opcode OpData8<0x08, 9> "OP_DATA_8"
    opcode OpData9<0x09, 10> "OP_DATA_9"
    opcode OpData10<0x0a, 11> "OP_DATA_10"
    opcode OpData11<0x0b, 12> "OP_DATA_11"
    opcode OpData12<0x0c, 13> "OP_DATA_12"
    opcode OpData13<0x0d, 14> "OP_DATA_13"
    opcode OpData14<0x0e, 15> "OP_DATA_14"
    opcode OpData15<0x0f, 16> "OP_DATA_15"
    opcode OpData16<0x10, 17> "OP_DATA_16"
    opcode OpData17<0x11, 18> "OP_DATA_17"
    opcode OpData18<0x12, 19> "OP_DATA_18"
    opcode OpData19<0x13, 20> "OP_DATA_19"
    opcode OpData20<0x14, 21> "OP_DATA_20"
    opcode OpData21<0x15, 22> "OP_DATA_21"
    opcode OpData22<0x16, 23> "OP_DATA_22"
    opcode OpData23<0x17, 24> "OP_DATA_23"
    opcode OpData24<0x18, 25> "OP_DATA_24"
    opcode OpData25<0x19, 26> "OP_DATA_25"
    opcode OpData26<0x1a, 27> "OP_DATA_26"
    opcode OpData27<0x1b, 28> "OP_DATA_27"
    opcode OpData28<0x1c, 29> "OP_DATA_28"
    opcode OpData29<0x1d, 30> "OP_DATA_29"
    opcode OpData30<0x1e, 31> "OP_DATA_30"
    opcode OpData31<0x1f, 32> "OP_DATA_31"
    opcode OpData32<0x20, 33> "OP_DATA_32"
    opcode OpData33<0x21, 34> "OP_DATA_33"
    opcode OpData34<0x22, 35> "OP_DATA_34"
    opcode OpData35<0x23, 36> "OP_DATA_35"
    opcode OpData36<0x24, 37> "OP_DATA_36"
    opcode OpData37<0x25, 38> "OP_DATA_37"
    opcode OpData38<0x26, 39> "OP_DATA_38"
    opcode OpData39<0x27, 40> "OP_DATA_39"
    opcode OpData40<0x28, 41> "OP_DATA_40"
    opcode OpData41<0x29, 42> "OP_DATA_41"
    opcode OpData42<0x2a, 43> "OP_DATA_42"
    opcode OpData43<0x2b, 44> "OP_DATA_43"
    opcode OpData44<0x2c, 45> "OP_DATA_44"
    opcode OpData45<0x2d, 46> "OP_DATA_45"
    opcode OpData46<0x2e, 47> "OP_DATA_46"
    opcode OpData47<0x2f, 48> "OP_DATA_47"
    opcode OpData48<0x30, 49> "OP_DATA_48"
    opcode OpData49<0x31, 50> "OP_DATA_49"
    opcode OpData50<0x32, 51> "OP_DATA_50"
    opcode OpData51<0x33, 52> "OP_DATA_51"
    opcode OpData52<0x34, 53> "OP_DATA_52"
    opcode OpData53<0x35, 54> "OP_DATA_53"
    opcode OpData54<0x36, 55> "OP_DATA_54"
    opcode OpData55<0x37, 56> "OP_DATA_55"
    opcode OpData56<0x38, 57> "OP_DATA_56"
    opcode OpData57<0x39, 58> "OP_DATA_57"
    opcode OpData58<0x3a, 59> "OP_DATA_58"
    opcode OpData59<0x3b, 60> "OP_DATA_59"
    opcode OpData60<0x3c, 61> "OP_DATA_60"
    opcode OpData61<0x3d, 62> "OP_DATA_61"
    opcode OpData62<0x3e, 63> "OP_DATA_62"
    opcode OpData63<0x3f, 64> "OP_DATA_63"
    opcode OpData64<0x40, 65> "OP_DATA_64"
    opcode OpData65<0x41, 66> "OP_DATA_65"
    opcode OpData66<0x42, 67> "OP_DATA_66"
    opcode OpData67<0x43, 68> "OP_DATA_67"
    opcode OpData68<0x44, 69> "OP_DATA_68"
    opcode OpData69<0x45, 70> "OP_DATA_69"
    opcode OpData70<0x46, 71> "OP_DATA_70"
    opcode OpData71<0x47, 72> "OP_DATA_71"
    opcode OpData72<0x48, 73> "OP_DATA_72"
    opcode OpData73<0x49, 74> "OP_DATA_73"
    opcode OpData74<0x4a, 75> "OP_DATA_74"
    opcode OpData75<0x4b, 76> "OP_DATA_75"
    opcode OpPushData1<0x4c, u8> "OP_PUSHDATA1"
    opcode OpPushData2<0x4d, u16> "OP_PUSHDATA2"
    opcode OpPushData4<0x4e, u32> "OP_PUSHDATA4"
    opcode Op1Negate<0x4f, 1> "OP_1NEGATE"
    opcode OpReserved<0x50, 1> "OP_RESERVED"
    opcode |Op1| OpTrue<0x51, 1> "OP_1"
    opcode Op2<0x52, 1> "OP_2"
    opcode Op3<0x53, 1> "OP_3"
    opcode Op4<0x54, 1> "OP_4"
    opcode Op5<0x55, 1> "OP_5"
    opcode Op6<0x56, 1> "OP_6"
    opcode Op7<0x57, 1> "OP_7"
    opcode Op8<0x58, 1> "OP_8"
    opcode Op9<0x59, 1> "OP_9"
    opcode Op10<0x5a, 1> "OP_10"
    opcode Op11<0x5b, 1> "OP_11"
    opcode Op12<0x5c, 1> "OP_12"
    opcode Op13<0x5d, 1> "OP_13"
    opcode Op14<0x5e, 1> "OP_14"
    opcode Op15<0x5f, 1> "OP_15"
    opcode Op16<0x60, 1> "OP_16"

    // Control opcodes.
    opcode OpNop<0x61, 1> "OP_NOP"
    opcode OpVer<0x62, 1> "OP_VER"
    opcode OpIf<0x63, 1> "OP_IF"
    opcode OpNotIf<0x64, 1> "OP_NOTIF"
    opcode OpVerIf<0x65, 1> "OP_VERIF"
    opcode OpVerNotIf<0x66, 1> "OP_VERNOTIF"
    opcode OpElse<0x67, 1> "OP_ELSE"
    opcode OpEndIf<0x68, 1> "OP_ENDIF"
    opcode OpVerify<0x69, 1> "OP_VERIFY"
    opcode OpReturn<0x6a, 1> "OP_RETURN"

    // Stack opcodes.
    opcode OpToAltStack<0x6b, 1> "OP_TOALTSTACK"
    opcode OpFromAltStack<0x6c, 1> "OP_FROMALTSTACK"
    opcode Op2Drop<0x6d, 1> "OP_2DROP"
    opcode Op2Dup<0x6e, 1> "OP_2DUP"
    opcode Op3Dup<0x6f, 1> "OP_3DUP"
    opcode Op2Over<0x70, 1> "OP_2OVER"
    opcode Op2Rot<0x71, 1> "OP_2ROT"
    opcode Op2Swap<0x72, 1> "OP_2SWAP"
    opcode OpIfDup<0x73, 1> "OP_IFDUP"
    opcode OpDepth<0x74, 1> "OP_DEPTH"
    opcode OpDrop<0x75, 1> "OP_DROP"
    opcode OpDup<0x76, 1> "OP_DUP"
    opcode OpNip<0x77, 1> "OP_NIP"
    opcode OpOver<0x78, 1> "OP_OVER"
    opcode OpPick<0x79, 1> "OP_PICK"
    opcode OpRoll<0x7a, 1> "OP_ROLL"
    opcode OpRot<0x7b, 1> "OP_ROT"
    opcode OpSwap<0x7c, 1> "OP_SWAP"
    opcode OpTuck<0x7d, 1> "OP_TUCK"

    // Splice opcodes.
    opcode OpCat<0x7e, 1> "OP_CAT"
    opcode OpSubStr<0x7f, 1> "OP_SUBSTR"
    opcode OpLeft<0x80, 1> "OP_LEFT"
    opcode OpRight<0x81, 1> "OP_RIGHT"
    opcode OpSize<0x82, 1> "OP_SIZE"

    // Bitwise logic opcodes.
    opcode OpInvert<0x83, 1> "OP_INVERT"
    opcode OpAnd<0x84, 1> "OP_AND"
    opcode OpOr<0x85, 1> "OP_OR"
    opcode OpXor<0x86, 1> "OP_XOR"
    opcode OpEqual<0x87, 1> "OP_EQUAL"
    opcode OpEqualVerify<0x88, 1> "OP_EQUALVERIFY"
    opcode OpRotr<0x89, 1> "OP_ROTR"
    opcode OpRotl<0x8a, 1> "OP_ROTL"

    // Numeric related opcodes.
    opcode Op1Add<0x8b, 1> "OP_1ADD"
    opcode Op1Sub<0x8c, 1> "OP_1SUB"
    opcode Op2Mul<0x8d, 1> "OP_2MUL"
    opcode Op2Div<0x8e, 1> "OP_2DIV"
    opcode OpNegate<0x8f, 1> "OP_NEGATE"
    opcode OpAbs<0x90, 1> "OP_ABS"
    opcode OpNot<0x91, 1> "OP_NOT"
    opcode Op0NotEqual<0x92, 1> "OP_0NOTEQUAL"
    opcode OpAdd<0x93, 1> "OP_ADD"
    opcode OpSub<0x94, 1> "OP_SUB"
    opcode OpMul<0x95, 1> "OP_MUL"
    opcode OpDiv<0x96, 1> "OP_DIV"
    opcode OpMod<0x97, 1> "OP_MOD"
    opcode OpLShift<0x98, 1> "OP_LSHIFT"
    opcode OpRShift<0x99, 1> "OP_RSHIFT"
    opcode OpBoolAnd<0x9a, 1> "OP_BOOLAND"
    opcode OpBoolOr<0x9b, 1> "OP_BOOLOR"
    opcode OpNumEqual<0x9c, 1> "OP_NUMEQUAL"
    opcode OpNumEqualVerify<0x9d, 1> "OP_NUMEQUALVERIFY"
    opcode OpNumNotEqual<0x9e, 1> "OP_NUMNOTEQUAL"
    opcode OpLessThan<0x9f, 1> "OP_LESSTHAN"
    opcode OpGreaterThan<0xa0, 1> "OP_GREATERTHAN"
    opcode OpLessThanOrEqual<0xa1, 1> "OP_LESSTHANOREQUAL"
    opcode OpGreaterThanOrEqual<0xa2, 1> "OP_GREATERTHANOREQUAL"
    opcode OpMin<0xa3, 1> "OP_MIN"
    opcode OpMax<0xa4, 1> "OP_MAX"
    opcode OpWithin<0xa5, 1> "OP_WITHIN"

    // Crypto opcodes.
    opcode OpRipemd160<0xa6, 1> "OP_RIPEMD160"
    opcode OpSha1<0xa7, 1> "OP_SHA1"
    opcode OpBlake256<0xa8, 1> "OP_BLAKE256"
    opcode OpHash160<0xa9, 1> "OP_HASH160"
    opcode OpHash256<0xaa, 1> "OP_HASH256"
    opcode OpCodeSeparator<0xab, 1> "OP_CODESEPARATOR"
    opcode OpCheckSig<0xac, 1> "OP_CHECKSIG"
    opcode OpCheckSigVerify<0xad, 1> "OP_CHECKSIGVERIFY"
    opcode OpCheckMultiSig<0xae, 1> "OP_CHECKMULTISIG"
    opcode OpCheckMultiSigVerify<0xaf, 1> "OP_CHECKMULTISIGVERIFY"

    // Reserved no-ops and lock time opcodes.
    opcode OpNop1<0xb0, 1> "OP_NOP1"
    opcode |OpNop2| OpCheckLockTimeVerify<0xb1, 1> "OP_CHECKLOCKTIMEVERIFY"
    opcode |OpNop3| OpCheckSequenceVerify<0xb2, 1> "OP_CHECKSEQUENCEVERIFY"
    opcode OpNop4<0xb3, 1> "OP_NOP4"
    opcode OpNop5<0xb4, 1> "OP_NOP5"
    opcode OpNop6<0xb5, 1> "OP_NOP6"
    opcode OpNop7<0xb6, 1> "OP_NOP7"
    opcode OpNop8<0xb7, 1> "OP_NOP8"
    opcode OpNop9<0xb8, 1> "OP_NOP9"
    opcode OpNop10<0xb9, 1> "OP_NOP10"

    // Stake tagging opcodes.
    opcode OpSStx<0xba, 1> "OP_SSTX"
    opcode OpSSGen<0xbb, 1> "OP_SSGEN"
    opcode OpSSRtx<0xbc, 1> "OP_SSRTX"
    opcode OpSStxChange<0xbd, 1> "OP_SSTXCHANGE"

    // Alternative signature suite and treasury opcodes.
    opcode OpCheckSigAlt<0xbe, 1> "OP_CHECKSIGALT"
    opcode OpCheckSigAltVerify<0xbf, 1> "OP_CHECKSIGALTVERIFY"
    opcode OpSha256<0xc0, 1> "OP_SHA256"
    opcode OpTAdd<0xc1, 1> "OP_TADD"
    opcode OpTSpend<0xc2, 1> "OP_TSPEND"
    opcode OpTGen<0xc3, 1> "OP_TGEN"

    // Undefined opcodes.
    opcode OpUnknown196<0xc4, 1> "OP_UNKNOWN196"
    opcode OpUnknown197<0xc5, 1> "OP_UNKNOWN197"
    opcode OpUnknown198<0xc6, 1> "OP_UNKNOWN198"
    opcode OpUnknown199<0xc7, 1> "OP_UNKNOWN199"
    opcode OpUnknown200<0xc8, 1> "OP_UNKNOWN200"
    opcode OpUnknown201<0xc9, 1> "OP_UNKNOWN201"
    opcode OpUnknown202<0xca, 1> "OP_UNKNOWN202"
    opcode OpUnknown203<0xcb, 1> "OP_UNKNOWN203"
    opcode OpUnknown204<0xcc, 1> "OP_UNKNOWN204"
    opcode OpUnknown205<0xcd, 1> "OP_UNKNOWN205"
    opcode OpUnknown206<0xce, 1> "OP_UNKNOWN206"
    opcode OpUnknown207<0xcf, 1> "OP_UNKNOWN207"
    opcode OpUnknown208<0xd0, 1> "OP_UNKNOWN208"
    opcode OpUnknown209<0xd1, 1> "OP_UNKNOWN209"
    opcode OpUnknown210<0xd2, 1> "OP_UNKNOWN210"
    opcode OpUnknown211<0xd3, 1> "OP_UNKNOWN211"
    opcode OpUnknown212<0xd4, 1> "OP_UNKNOWN212"
    opcode OpUnknown213<0xd5, 1> "OP_UNKNOWN213"
    opcode OpUnknown214<0xd6, 1> "OP_UNKNOWN214"
    opcode OpUnknown215<0xd7, 1> "OP_UNKNOWN215"
    opcode OpUnknown216<0xd8, 1> "OP_UNKNOWN216"
    opcode OpUnknown217<0xd9, 1> "OP_UNKNOWN217"
    opcode OpUnknown218<0xda, 1> "OP_UNKNOWN218"
    opcode OpUnknown219<0xdb, 1> "OP_UNKNOWN219"
    opcode OpUnknown220<0xdc, 1> "OP_UNKNOWN220"
    opcode OpUnknown221<0xdd, 1> "OP_UNKNOWN221"
    opcode OpUnknown222<0xde, 1> "OP_UNKNOWN222"
    opcode OpUnknown223<0xdf, 1> "OP_UNKNOWN223"
    opcode OpUnknown224<0xe0, 1> "OP_UNKNOWN224"
    opcode OpUnknown225<0xe1, 1> "OP_UNKNOWN225"
    opcode OpUnknown226<0xe2, 1> "OP_UNKNOWN226"
    opcode OpUnknown227<0xe3, 1> "OP_UNKNOWN227"
    opcode OpUnknown228<0xe4, 1> "OP_UNKNOWN228"
    opcode OpUnknown229<0xe5, 1> "OP_UNKNOWN229"
    opcode OpUnknown230<0xe6, 1> "OP_UNKNOWN230"
    opcode OpUnknown231<0xe7, 1> "OP_UNKNOWN231"
    opcode OpUnknown232<0xe8, 1> "OP_UNKNOWN232"
    opcode OpUnknown233<0xe9, 1> "OP_UNKNOWN233"
    opcode OpUnknown234<0xea, 1> "OP_UNKNOWN234"
    opcode OpUnknown235<0xeb, 1> "OP_UNKNOWN235"
    opcode OpUnknown236<0xec, 1> "OP_UNKNOWN236"
    opcode OpUnknown237<0xed, 1> "OP_UNKNOWN237"
    opcode OpUnknown238<0xee, 1> "OP_UNKNOWN238"
    opcode OpUnknown239<0xef, 1> "OP_UNKNOWN239"
    opcode OpUnknown240<0xf0, 1> "OP_UNKNOWN240"
    opcode OpUnknown241<0xf1, 1> "OP_UNKNOWN241"
    opcode OpUnknown242<0xf2, 1> "OP_UNKNOWN242"
    opcode OpUnknown243<0xf3, 1> "OP_UNKNOWN243"
    opcode OpUnknown244<0xf4, 1> "OP_UNKNOWN244"
    opcode OpUnknown245<0xf5, 1> "OP_UNKNOWN245"
    opcode OpUnknown246<0xf6, 1> "OP_UNKNOWN246"
    opcode OpUnknown247<0xf7, 1> "OP_UNKNOWN247"
    opcode OpUnknown248<0xf8, 1> "OP_UNKNOWN248"
    opcode OpInvalid249<0xf9, 1> "OP_INVALID249"

    // Template matching markers, never valid in a script.
    opcode OpSmallInteger<0xfa, 1> "OP_SMALLINTEGER"
    opcode OpPubKeys<0xfb, 1> "OP_PUBKEYS"
    opcode OpUnknown252<0xfc, 1> "OP_UNKNOWN252"
    opcode OpPubKeyHash<0xfd, 1> "OP_PUBKEYHASH"
    opcode OpPubKey<0xfe, 1> "OP_PUBKEY"
    opcode OpInvalidOpCode<0xff, 1> "OP_INVALIDOPCODE"
}
