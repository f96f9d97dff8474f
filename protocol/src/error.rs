//! Crate-level error type.

use thiserror::Error;

use crate::crypto::keys::KeyError;
use crate::transaction::codec::CodecError;
use crate::transaction::signing::SigningError;
use crate::transaction::validation::ValidationError;
use crate::transport::TransportError;

/// Any failure along the transaction lifecycle.
///
/// Each stage has its own error enum; this wraps them for callers that run
/// several stages in one go.
#[derive(Debug, Error)]
pub enum TxError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("signing failed: {0}")]
    Signing(#[from] SigningError),

    #[error("key error: {0}")]
    Key(#[from] KeyError),

    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),
}
