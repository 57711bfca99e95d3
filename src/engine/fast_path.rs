//! Fast-path eligibility for single-shot `calculate`
//!
//! The fast path writes the whole input into the arena once and issues a
//! single combined module call. It is only sound when the input fits one
//! arena write and nothing else the module reads at init time lives in
//! the arena.

use serde::{Deserialize, Serialize};

/// Combined key/output parameter above which a keyed module has key
/// material staged in the arena
pub const KEYED_BLOCK_THRESHOLD: u32 = 512;

/// Per-family predicate over `(input length, init parameter)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FastPathPolicy {
    /// Eligible when the input fits one arena write
    #[default]
    ShortInput,
    /// Always eligible (single-shot derivation functions)
    Always,
    /// Eligible for short input unless the init parameter says a key is staged
    KeyedBlock,
    /// Eligible for short input only when the init parameter is zero
    UnkeyedOnly,
    /// Never eligible: seed material is staged in the arena every call
    Never,
}

impl FastPathPolicy {
    /// Decide whether `calculate` may take the single native call
    pub fn allows(&self, input_len: usize, init_param: u32, arena_capacity: usize) -> bool {
        let short = input_len < arena_capacity;
        match self {
            Self::ShortInput => short,
            Self::Always => true,
            Self::KeyedBlock => init_param <= KEYED_BLOCK_THRESHOLD && short,
            Self::UnkeyedOnly => init_param == 0 && short,
            Self::Never => false,
        }
    }
}
