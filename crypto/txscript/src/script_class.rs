use crate::opcodes::{codes, is_small_int, is_stake_opcode};
use crate::tokenizer::ParsedOpcode;
use crate::{parse_script, DEFAULT_SCRIPT_VERSION, MAX_DATA_CARRIER_SIZE};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};
use thiserror::Error;

#[derive(Error, PartialEq, Eq, Debug, Clone)]
#[error("invalid script class {0}")]
pub struct InvalidScriptClass(String);

/// Standard classes of script payment known by the network.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum ScriptClass {
    /// None of the recognized forms
    NonStandard = 0,
    /// Pay to pubkey
    PubKey,
    /// Pay to pubkey of an alternative signature suite
    PubKeyAlt,
    /// Pay to pubkey hash
    PubKeyHash,
    /// Pay to pubkey hash of an alternative signature suite
    PubKeyHashAlt,
    /// Pay to script hash
    ScriptHash,
    /// Bare multi signature
    MultiSig,
    /// Provably unspendable data carrier
    NullData,
    /// Ticket purchase
    StakeSubmission,
    /// Vote
    StakeGen,
    /// Ticket revocation
    StakeRevocation,
    /// Change of a ticket purchase
    StakeSubChange,
}

const NON_STANDARD: &str = "nonstandard";
const PUB_KEY: &str = "pubkey";
const PUB_KEY_ALT: &str = "pubkeyalt";
const PUB_KEY_HASH: &str = "pubkeyhash";
const PUB_KEY_HASH_ALT: &str = "pubkeyhashalt";
const SCRIPT_HASH: &str = "scripthash";
const MULTI_SIG: &str = "multisig";
const NULL_DATA: &str = "nulldata";
const STAKE_SUBMISSION: &str = "stakesubmission";
const STAKE_GEN: &str = "stakegen";
const STAKE_REVOCATION: &str = "stakerevoke";
const STAKE_SUB_CHANGE: &str = "sstxchange";

impl ScriptClass {
    /// Classifies a script. Scripts of unsupported versions and scripts that
    /// fail to decode are non standard.
    pub fn from_script(version: u16, script: &[u8]) -> Self {
        if version != DEFAULT_SCRIPT_VERSION {
            return ScriptClass::NonStandard;
        }
        match parse_script(script).into_result() {
            Ok(opcodes) => Self::from_opcodes(&opcodes),
            Err(_) => ScriptClass::NonStandard,
        }
    }

    pub fn from_opcodes(opcodes: &[ParsedOpcode<'_>]) -> Self {
        if is_pub_key(opcodes) {
            ScriptClass::PubKey
        } else if is_pub_key_alt(opcodes) {
            ScriptClass::PubKeyAlt
        } else if is_pub_key_hash(opcodes) {
            ScriptClass::PubKeyHash
        } else if is_pub_key_hash_alt(opcodes) {
            ScriptClass::PubKeyHashAlt
        } else if is_script_hash(opcodes) {
            ScriptClass::ScriptHash
        } else if is_multi_sig(opcodes) {
            ScriptClass::MultiSig
        } else if is_null_data(opcodes) {
            ScriptClass::NullData
        } else if is_stake_tagged(opcodes, codes::OpSStx) {
            ScriptClass::StakeSubmission
        } else if is_stake_tagged(opcodes, codes::OpSSGen) {
            ScriptClass::StakeGen
        } else if is_stake_tagged(opcodes, codes::OpSSRtx) {
            ScriptClass::StakeRevocation
        } else if is_stake_tagged(opcodes, codes::OpSStxChange) {
            ScriptClass::StakeSubChange
        } else {
            ScriptClass::NonStandard
        }
    }

    pub fn is_stake(&self) -> bool {
        matches!(
            self,
            ScriptClass::StakeSubmission | ScriptClass::StakeGen | ScriptClass::StakeRevocation | ScriptClass::StakeSubChange
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptClass::NonStandard => NON_STANDARD,
            ScriptClass::PubKey => PUB_KEY,
            ScriptClass::PubKeyAlt => PUB_KEY_ALT,
            ScriptClass::PubKeyHash => PUB_KEY_HASH,
            ScriptClass::PubKeyHashAlt => PUB_KEY_HASH_ALT,
            ScriptClass::ScriptHash => SCRIPT_HASH,
            ScriptClass::MultiSig => MULTI_SIG,
            ScriptClass::NullData => NULL_DATA,
            ScriptClass::StakeSubmission => STAKE_SUBMISSION,
            ScriptClass::StakeGen => STAKE_GEN,
            ScriptClass::StakeRevocation => STAKE_REVOCATION,
            ScriptClass::StakeSubChange => STAKE_SUB_CHANGE,
        }
    }
}

impl Display for ScriptClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptClass {
    type Err = InvalidScriptClass;

    fn from_str(script_class: &str) -> Result<Self, Self::Err> {
        match script_class {
            NON_STANDARD => Ok(ScriptClass::NonStandard),
            PUB_KEY => Ok(ScriptClass::PubKey),
            PUB_KEY_ALT => Ok(ScriptClass::PubKeyAlt),
            PUB_KEY_HASH => Ok(ScriptClass::PubKeyHash),
            PUB_KEY_HASH_ALT => Ok(ScriptClass::PubKeyHashAlt),
            SCRIPT_HASH => Ok(ScriptClass::ScriptHash),
            MULTI_SIG => Ok(ScriptClass::MultiSig),
            NULL_DATA => Ok(ScriptClass::NullData),
            STAKE_SUBMISSION => Ok(ScriptClass::StakeSubmission),
            STAKE_GEN => Ok(ScriptClass::StakeGen),
            STAKE_REVOCATION => Ok(ScriptClass::StakeRevocation),
            STAKE_SUB_CHANGE => Ok(ScriptClass::StakeSubChange),

            _ => Err(InvalidScriptClass(script_class.to_string())),
        }
    }
}

impl TryFrom<&str> for ScriptClass {
    type Error = InvalidScriptClass;

    fn try_from(script_class: &str) -> Result<Self, Self::Error> {
        script_class.parse()
    }
}

/// Returns whether every opcode only pushes data. OpReserved is included
/// even though it always fails on execution.
pub fn is_push_only(opcodes: &[ParsedOpcode<'_>]) -> bool {
    opcodes.iter().all(|op| op.is_push_opcode())
}

/// OP_HASH160 <20 byte hash> OP_EQUAL
pub fn is_script_hash(opcodes: &[ParsedOpcode<'_>]) -> bool {
    matches!(opcodes, [hash, push, equal]
        if hash.value() == codes::OpHash160 && push.value() == codes::OpData20 && equal.value() == codes::OpEqual)
}

/// <stake tag> OP_HASH160 <20 byte hash> OP_EQUAL
pub fn is_stake_script_hash(opcodes: &[ParsedOpcode<'_>]) -> bool {
    matches!(opcodes, [tag, rest @ ..] if is_stake_opcode(tag.value()) && is_script_hash(rest))
}

pub fn is_any_kind_of_script_hash(opcodes: &[ParsedOpcode<'_>]) -> bool {
    is_script_hash(opcodes) || is_stake_script_hash(opcodes)
}

fn is_pub_key(opcodes: &[ParsedOpcode<'_>]) -> bool {
    matches!(opcodes, [key, check] if matches!(key.data().len(), 33 | 65) && check.value() == codes::OpCheckSig)
}

/// <key> <signature suite> OP_CHECKSIGALT
fn is_pub_key_alt(opcodes: &[ParsedOpcode<'_>]) -> bool {
    matches!(opcodes, [key, suite, check]
        if key.opcode().has_data()
            && !key.data().is_empty()
            && key.data().len() < 512
            && is_signature_suite(suite)
            && check.value() == codes::OpCheckSigAlt)
}

/// OP_DUP OP_HASH160 <20 byte hash> OP_EQUALVERIFY OP_CHECKSIG
fn is_pub_key_hash(opcodes: &[ParsedOpcode<'_>]) -> bool {
    matches!(opcodes, [dup, hash, push, equal, check]
        if is_pub_key_hash_prefix(dup, hash, push, equal) && check.value() == codes::OpCheckSig)
}

/// OP_DUP OP_HASH160 <20 byte hash> OP_EQUALVERIFY <signature suite> OP_CHECKSIGALT
fn is_pub_key_hash_alt(opcodes: &[ParsedOpcode<'_>]) -> bool {
    matches!(opcodes, [dup, hash, push, equal, suite, check]
        if is_pub_key_hash_prefix(dup, hash, push, equal) && is_signature_suite(suite) && check.value() == codes::OpCheckSigAlt)
}

fn is_pub_key_hash_prefix(dup: &ParsedOpcode<'_>, hash: &ParsedOpcode<'_>, push: &ParsedOpcode<'_>, equal: &ParsedOpcode<'_>) -> bool {
    dup.value() == codes::OpDup
        && hash.value() == codes::OpHash160
        && push.value() == codes::OpData20
        && equal.value() == codes::OpEqualVerify
}

// Alternative signature suites are identified by a small integer from 1 to 16.
fn is_signature_suite(suite: &ParsedOpcode<'_>) -> bool {
    (codes::OpTrue..=codes::Op16).contains(&suite.value())
}

/// OP_m <pubkey 1> ... <pubkey n> OP_n OP_CHECKMULTISIG, with n matching the
/// number of keys.
fn is_multi_sig(opcodes: &[ParsedOpcode<'_>]) -> bool {
    let [op_m, keys @ .., op_n, check] = opcodes else {
        return false;
    };
    if keys.is_empty() || !op_m.is_small_int() || check.value() != codes::OpCheckMultiSig {
        return false;
    }
    let Some(n) = op_n.as_small_int() else {
        return false;
    };
    n as usize == keys.len() && keys.iter().all(|key| matches!(key.data().len(), 33 | 65))
}

/// OP_RETURN, optionally followed by a single push of at most
/// [`MAX_DATA_CARRIER_SIZE`] bytes.
fn is_null_data(opcodes: &[ParsedOpcode<'_>]) -> bool {
    match opcodes {
        [ret] => ret.value() == codes::OpReturn,
        [ret, push] => {
            ret.value() == codes::OpReturn
                && (is_small_int(push.value()) || push.value() <= codes::OpPushData4)
                && push.data().len() <= MAX_DATA_CARRIER_SIZE
        }
        _ => false,
    }
}

/// The stake tag followed by either a pay to pubkey hash or a pay to script
/// hash script.
fn is_stake_tagged(opcodes: &[ParsedOpcode<'_>], tag: u8) -> bool {
    matches!(opcodes, [first, rest @ ..] if first.value() == tag && (is_pub_key_hash(rest) || is_script_hash(rest)))
}

/// Returns whether the script is one of the stake output forms.
pub fn is_stake_output(script: &[u8]) -> bool {
    ScriptClass::from_script(DEFAULT_SCRIPT_VERSION, script).is_stake()
}

/// Returns the class of the script tagged by a stake output, or `None` when
/// the script is not a stake output.
pub fn get_stake_out_subclass(script: &[u8]) -> Option<ScriptClass> {
    let opcodes = parse_script(script).into_result().ok()?;
    if !ScriptClass::from_opcodes(&opcodes).is_stake() {
        return None;
    }
    let untagged: Vec<_> = opcodes.into_iter().filter(|op| !is_stake_opcode(op.value())).collect();
    Some(ScriptClass::from_opcodes(&untagged))
}
