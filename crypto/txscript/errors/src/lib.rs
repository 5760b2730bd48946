use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Error, PartialEq, Eq, Debug, Clone)]
pub enum TxScriptError {
    #[error("opcode {opcode} at offset {offset} requires {required} bytes, but script only has {remaining} remaining")]
    MalformedPush { opcode: &'static str, offset: usize, required: usize, remaining: usize },

    #[error("opcode {opcode} at offset {offset} pushes {declared} bytes, but script only has {remaining} remaining")]
    MalformedPushSize { opcode: &'static str, offset: usize, declared: u64, remaining: usize },

    #[error("{0}")]
    NotPushOnly(String),

    #[error("{0}")]
    P2SHStakeOpCodes(String),

    #[error("script version {0} is not supported")]
    UnsupportedScriptVersion(u16),

    #[error("internal consistency error - {0}")]
    Internal(String),
}

/// The kind of a [`TxScriptError`], without the details carried by the variant.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum ErrorKind {
    MalformedPush,
    NotPushOnly,
    P2SHStakeOpCodes,
    UnsupportedScriptVersion,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MalformedPush => "ErrMalformedPush",
            ErrorKind::NotPushOnly => "ErrNotPushOnly",
            ErrorKind::P2SHStakeOpCodes => "ErrP2SHStakeOpCodes",
            ErrorKind::UnsupportedScriptVersion => "ErrUnsupportedScriptVersion",
            ErrorKind::Internal => "ErrInternal",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TxScriptError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TxScriptError::MalformedPush { .. } | TxScriptError::MalformedPushSize { .. } => ErrorKind::MalformedPush,
            TxScriptError::NotPushOnly(_) => ErrorKind::NotPushOnly,
            TxScriptError::P2SHStakeOpCodes(_) => ErrorKind::P2SHStakeOpCodes,
            TxScriptError::UnsupportedScriptVersion(_) => ErrorKind::UnsupportedScriptVersion,
            TxScriptError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Byte offset of the opcode that failed to decode, for parse failures.
    pub fn offset(&self) -> Option<usize> {
        match self {
            TxScriptError::MalformedPush { offset, .. } | TxScriptError::MalformedPushSize { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_and_offset() {
        struct Test {
            name: &'static str,
            err: TxScriptError,
            kind: ErrorKind,
            offset: Option<usize>,
            message: &'static str,
        }

        let tests = vec![
            Test {
                name: "truncated fixed push",
                err: TxScriptError::MalformedPush { opcode: "OP_DATA_3", offset: 4, required: 4, remaining: 3 },
                kind: ErrorKind::MalformedPush,
                offset: Some(4),
                message: "opcode OP_DATA_3 at offset 4 requires 4 bytes, but script only has 3 remaining",
            },
            Test {
                name: "oversized prefixed push",
                err: TxScriptError::MalformedPushSize { opcode: "OP_PUSHDATA1", offset: 0, declared: 200, remaining: 1 },
                kind: ErrorKind::MalformedPush,
                offset: Some(0),
                message: "opcode OP_PUSHDATA1 at offset 0 pushes 200 bytes, but script only has 1 remaining",
            },
            Test {
                name: "not push only",
                err: TxScriptError::NotPushOnly("script has no pushed data".to_string()),
                kind: ErrorKind::NotPushOnly,
                offset: None,
                message: "script has no pushed data",
            },
            Test {
                name: "unsupported version",
                err: TxScriptError::UnsupportedScriptVersion(1),
                kind: ErrorKind::UnsupportedScriptVersion,
                offset: None,
                message: "script version 1 is not supported",
            },
        ];

        for test in tests {
            assert_eq!(test.err.kind(), test.kind, "failed for '{}'", test.name);
            assert_eq!(test.err.offset(), test.offset, "failed for '{}'", test.name);
            assert_eq!(test.err.to_string(), test.message, "failed for '{}'", test.name);
        }
    }

    #[test]
    fn test_error_kind_names() {
        assert_eq!(ErrorKind::P2SHStakeOpCodes.to_string(), "ErrP2SHStakeOpCodes");
        assert_eq!(TxScriptError::Internal("x".into()).kind().as_str(), "ErrInternal");
    }
}
