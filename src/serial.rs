//! Binary persistence of branch chains.
//!
//! A chain is stored as a 24-byte fixed header followed by a bincode-encoded
//! payload. The payload lists one record per branch in evaluation order:
//! the condition and its execution target. Each record's successor is its
//! else-branch, so the nesting is restored without recursion.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"CBEV"
//! 4       4     Payload length in bytes (u32, little-endian)
//! 8       16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 24..    var   Bincode-encoded payload
//! ```
//!
//! The format carries no version; blobs are only meant to be read back by
//! the build that wrote them.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::partition::PartitionId;
pub use crate::types::MAX_CHAIN_DEPTH;
use crate::types::{Condition, ConditionalBranchEvaluator, SinkId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAGIC: &[u8; 4] = b"CBEV";
const HEADER_SIZE: usize = 24;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when persisting a branch chain.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("branch chain has {branches} branches, limit is {limit}")]
    ChainTooDeep { branches: usize, limit: usize },

    #[error("failed to encode branch chain: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("I/O error during serialization: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when loading a persisted branch chain.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not a branch chain blob: invalid magic bytes")]
    BadMagic,

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("I/O error during deserialization: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Serialized form
// ---------------------------------------------------------------------------

/// The chain in evaluation order; branch `i + 1` is the else-branch of
/// branch `i`. `C` is `&Condition` when encoding and the owned condition
/// when decoding.
#[derive(Debug, Serialize, Deserialize)]
struct SerializedChain<C> {
    branches: Vec<SerializedBranch<C>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedBranch<C> {
    condition: C,
    execution: SerializedExecution,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct SerializedExecution {
    partition: u32,
    sink: u32,
    breaking: bool,
}

// ---------------------------------------------------------------------------
// Evaluator <-> serialized form
// ---------------------------------------------------------------------------

fn to_serialized<C>(head: &ConditionalBranchEvaluator<C>) -> SerializedChain<&C> {
    let branches = head
        .branches()
        .map(|branch| {
            let execution = branch.execution();
            SerializedBranch {
                condition: branch.condition(),
                execution: SerializedExecution {
                    partition: execution.partition().as_u32(),
                    sink: execution.sink().as_u32(),
                    breaking: execution.is_breaking(),
                },
            }
        })
        .collect();
    SerializedChain { branches }
}

fn from_serialized<C: Condition>(
    ser: SerializedChain<C>,
) -> Result<ConditionalBranchEvaluator<C>, DeserializeError> {
    validate(&ser)?;

    ser.branches
        .into_iter()
        .rev()
        .fold(None, |tail, branch| {
            Some(ConditionalBranchEvaluator::new(
                branch.condition,
                PartitionId::new(branch.execution.partition),
                SinkId::new(branch.execution.sink),
                branch.execution.breaking,
                tail,
            ))
        })
        .ok_or_else(|| DeserializeError::Validation("empty branch chain".to_owned()))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate<C: Condition>(ser: &SerializedChain<C>) -> Result<(), DeserializeError> {
    if ser.branches.len() > MAX_CHAIN_DEPTH {
        return Err(DeserializeError::Validation(format!(
            "branch chain has {} branches, limit is {MAX_CHAIN_DEPTH}",
            ser.branches.len()
        )));
    }

    for (position, branch) in ser.branches.iter().enumerate() {
        let condition = &branch.condition;
        if condition.required_types().iter().any(|t| t.trim().is_empty()) {
            return Err(DeserializeError::Validation(format!(
                "branch {position} (`{condition}`) declares a blank binding type"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Header I/O
// ---------------------------------------------------------------------------

fn write_header(buf: &mut Vec<u8>, payload: &[u8]) {
    let hash = blake3::hash(payload);
    buf.extend_from_slice(MAGIC);
    #[allow(clippy::cast_possible_truncation)] // payload will never exceed 4 GiB
    let payload_len = payload.len() as u32;
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&hash.as_bytes()[..16]);
}

#[allow(clippy::cast_possible_truncation)] // HEADER_SIZE is 24, always fits in u32
fn read_header(bytes: &[u8]) -> Result<(u32, [u8; 16]), DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::LengthMismatch {
            expected: HEADER_SIZE as u32,
            actual: bytes.len(),
        });
    }
    if &bytes[0..4] != MAGIC {
        return Err(DeserializeError::BadMagic);
    }
    let payload_len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    let mut hash = [0u8; 16];
    hash.copy_from_slice(&bytes[8..HEADER_SIZE]);
    Ok((payload_len, hash))
}

// ---------------------------------------------------------------------------
// Public encode/decode
// ---------------------------------------------------------------------------

pub(crate) fn encode<C: Serialize>(
    head: &ConditionalBranchEvaluator<C>,
) -> Result<Vec<u8>, SerializeError> {
    let serialized = to_serialized(head);
    if serialized.branches.len() > MAX_CHAIN_DEPTH {
        return Err(SerializeError::ChainTooDeep {
            branches: serialized.branches.len(),
            limit: MAX_CHAIN_DEPTH,
        });
    }
    let payload = bincode::serde::encode_to_vec(&serialized, bincode::config::standard())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    write_header(&mut buf, &payload);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

pub(crate) fn decode<C>(bytes: &[u8]) -> Result<ConditionalBranchEvaluator<C>, DeserializeError>
where
    C: Condition + DeserializeOwned,
{
    let (payload_len, stored_hash) = read_header(bytes)?;

    let payload = &bytes[HEADER_SIZE..];
    if payload.len() != payload_len as usize {
        return Err(DeserializeError::LengthMismatch {
            expected: payload_len,
            actual: payload.len(),
        });
    }

    if blake3::hash(payload).as_bytes()[..16] != stored_hash {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let (serialized, _): (SerializedChain<C>, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;
    from_serialized(serialized)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
