//! Bytecode fingerprinting.
//!
//! A fingerprint is the keccak256 of the raw runtime bytecode, the same value
//! the EVM account model stores as `codeHash`. Empty code gets the `NoCode`
//! sentinel instead of `keccak256("")` so that "nothing deployed" reads
//! differently from a hash in reports.

use serde::{Serialize, Serializer};
use tiny_keccak::{Hasher, Keccak};

use crate::error::FetchError;

/// Canonical fingerprint of the code at one sampled height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeFingerprint {
    /// keccak256 of non-empty bytecode.
    Hash([u8; 32]),
    /// The account had no code (EOA, not yet deployed, or self-destructed).
    NoCode,
    /// The lookup failed; the code at this height is not known.
    Unknown,
}

impl CodeFingerprint {
    /// Map a fetch outcome onto a fingerprint.
    ///
    /// `NotFound` is an empty account, every other error is `Unknown`.
    pub fn from_fetch(outcome: &Result<Vec<u8>, FetchError>) -> Self {
        match outcome {
            Ok(code) => fingerprint(Some(code.as_slice())),
            Err(FetchError::NotFound) => Self::NoCode,
            Err(_) => Self::Unknown,
        }
    }

    /// Returns `true` unless this is `Unknown`.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for CodeFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hash(h) => write!(f, "0x{}", hex::encode(h)),
            Self::NoCode => write!(f, "no code"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl Serialize for CodeFingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// keccak256 (the pre-standard Keccak used by Ethereum, not SHA3-256).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut k = Keccak::v256();
    k.update(data);
    let mut out = [0u8; 32];
    k.finalize(&mut out);
    out
}

/// Fingerprint raw bytecode. Absent or empty code yields `NoCode`.
pub fn fingerprint(bytecode: Option<&[u8]>) -> CodeFingerprint {
    match bytecode {
        Some(code) if !code.is_empty() => CodeFingerprint::Hash(keccak256(code)),
        _ => CodeFingerprint::NoCode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_not_sha3() {
        // SHA3-256("abc") starts with 3a985da7...
        assert_eq!(
            hex::encode(keccak256(b"abc")),
            "4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45"
        );
    }

    #[test]
    fn empty_code_is_no_code() {
        assert_eq!(fingerprint(None), CodeFingerprint::NoCode);
        assert_eq!(fingerprint(Some(&[][..])), CodeFingerprint::NoCode);
        assert_eq!(fingerprint(None), fingerprint(Some(&[][..])));
    }

    #[test]
    fn identical_bytes_identical_fingerprint() {
        let a = fingerprint(Some(&[0x60, 0x80, 0x60, 0x40][..]));
        let b = fingerprint(Some(&[0x60, 0x80, 0x60, 0x40][..]));
        let c = fingerprint(Some(&[0x60, 0x80, 0x60, 0x41][..]));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, CodeFingerprint::NoCode);
    }

    #[test]
    fn from_fetch_mapping() {
        assert_eq!(
            CodeFingerprint::from_fetch(&Ok(vec![])),
            CodeFingerprint::NoCode
        );
        assert_eq!(
            CodeFingerprint::from_fetch(&Err(FetchError::NotFound)),
            CodeFingerprint::NoCode
        );
        assert_eq!(
            CodeFingerprint::from_fetch(&Err(FetchError::NoHistory("pruned".into()))),
            CodeFingerprint::Unknown
        );
        assert_eq!(
            CodeFingerprint::from_fetch(&Ok(vec![0xfe])),
            CodeFingerprint::Hash(keccak256(&[0xfe]))
        );
    }

    #[test]
    fn display_and_serialize() {
        let h = CodeFingerprint::Hash([0xab; 32]);
        assert_eq!(h.to_string(), format!("0x{}", "ab".repeat(32)));
        assert_eq!(
            serde_json::to_string(&CodeFingerprint::NoCode).unwrap(),
            "\"no code\""
        );
        assert_eq!(
            serde_json::to_string(&CodeFingerprint::Unknown).unwrap(),
            "\"unknown\""
        );
    }
}
