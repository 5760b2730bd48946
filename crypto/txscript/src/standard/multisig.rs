use crate::opcodes::codes::OpCheckMultiSig;
use crate::script_builder::{ScriptBuilder, ScriptBuilderError};
use crate::MAX_PUB_KEYS_PER_MULTISIG;
use thiserror::Error;

#[derive(Error, PartialEq, Eq, Debug, Clone)]
pub enum Error {
    // ErrTooManyRequiredSigs is returned when the specified number of
    // required signatures is larger than the number of provided public keys.
    #[error("too many required signatures")]
    ErrTooManyRequiredSigs,
    #[error("at least one signature must be required")]
    NoRequiredSigs,
    #[error(transparent)]
    ScriptBuilderError(#[from] ScriptBuilderError),
    #[error("public key of {0} bytes is neither compressed nor uncompressed")]
    InvalidPubKeyLength(usize),
    #[error("provided public keys should not be empty")]
    EmptyKeys,
    #[error("{0} public keys exceed the maximum of {MAX_PUB_KEYS_PER_MULTISIG}")]
    TooManyKeys(usize),
}

/// Generates a bare multi-signature redeem script requiring `required` out of
/// the serialized secp256k1 public keys given, in the order given.
///
/// # Errors
///
/// This function will return an error if:
/// * There are no public keys provided, or more than [`MAX_PUB_KEYS_PER_MULTISIG`].
/// * The number of provided keys is less than `required`, or `required` is zero.
/// * A key is neither 33 nor 65 bytes long.
pub fn multisig_redeem_script(pub_keys: &[&[u8]], required: usize) -> Result<Vec<u8>, Error> {
    if pub_keys.is_empty() {
        return Err(Error::EmptyKeys);
    }
    if pub_keys.len() > MAX_PUB_KEYS_PER_MULTISIG {
        return Err(Error::TooManyKeys(pub_keys.len()));
    }
    if required == 0 {
        return Err(Error::NoRequiredSigs);
    }
    if pub_keys.len() < required {
        return Err(Error::ErrTooManyRequiredSigs);
    }

    let mut builder = ScriptBuilder::new();
    builder.add_i64(required as i64)?;
    for pub_key in pub_keys {
        if !matches!(pub_key.len(), 33 | 65) {
            return Err(Error::InvalidPubKeyLength(pub_key.len()));
        }
        builder.add_data(pub_key)?;
    }
    builder.add_i64(pub_keys.len() as i64)?;
    builder.add_op(OpCheckMultiSig)?;

    Ok(builder.drain())
}
