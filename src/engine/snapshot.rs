//! Snapshot codec
//!
//! Wire format: `[4 bytes fingerprint][state_size bytes opaque state]`.
//! The total length is fixed per (algorithm, digest length, module build).

use crate::error::{EngineError, Result};
use crate::module::{Fingerprint, FINGERPRINT_LEN};

/// Encode a snapshot from a build fingerprint and a raw state region
pub fn encode(fingerprint: Fingerprint, state: &[u8]) -> Vec<u8> {
    let mut snapshot = Vec::with_capacity(FINGERPRINT_LEN + state.len());
    snapshot.extend_from_slice(fingerprint.as_bytes());
    snapshot.extend_from_slice(state);
    snapshot
}

/// Validate a snapshot and return its state payload
///
/// Length is checked before the fingerprint; neither check touches
/// module memory.
pub fn decode(snapshot: &[u8], fingerprint: Fingerprint, state_size: usize) -> Result<&[u8]> {
    let expected = FINGERPRINT_LEN + state_size;
    if snapshot.len() != expected {
        return Err(EngineError::SnapshotLengthMismatch {
            expected,
            actual: snapshot.len(),
        });
    }

    let (prefix, state) = snapshot.split_at(FINGERPRINT_LEN);
    if prefix != fingerprint.as_bytes() {
        return Err(EngineError::SnapshotIncompatibleBuild {
            expected: fingerprint.to_hex(),
            found: hex::encode(prefix),
        });
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp() -> Fingerprint {
        Fingerprint::from_bytes([1, 2, 3, 4])
    }

    #[test]
    fn test_encode_layout() {
        let snapshot = encode(fp(), &[9, 9, 9]);
        assert_eq!(snapshot, vec![1, 2, 3, 4, 9, 9, 9]);
        assert_eq!(decode(&snapshot, fp(), 3).unwrap(), &[9, 9, 9]);
    }

    #[test]
    fn test_length_checked_first() {
        // Wrong length and wrong fingerprint: length wins
        let err = decode(&[0, 0, 0, 0, 9], fp(), 3).unwrap_err();
        assert!(matches!(
            err,
            EngineError::SnapshotLengthMismatch { expected: 7, actual: 5 }
        ));
    }

    #[test]
    fn test_fingerprint_mismatch() {
        let err = decode(&[4, 3, 2, 1, 9, 9, 9], fp(), 3).unwrap_err();
        match err {
            EngineError::SnapshotIncompatibleBuild { expected, found } => {
                assert_eq!(expected, "01020304");
                assert_eq!(found, "04030201");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(decode(&[], fp(), 0).is_err());
        assert!(decode(&[1, 2, 3, 4], fp(), 0).unwrap().is_empty());
    }
}
