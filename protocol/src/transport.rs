//! # Node Transport
//!
//! The protocol crate does not speak HTTP. It defines what it needs from a
//! Thor node as the [`NodeTransport`] trait and leaves the wire to the
//! caller (the `vetx` binary ships a REST implementation).
//!
//! [`send_transaction`] strings the whole lifecycle together: fetch the best
//! block, build a draft anchored to it, validate, sign, encode and submit.
//! Transport errors are returned as-is; nothing here retries.

use alloy_primitives::{Bytes, B256};
use async_trait::async_trait;
use thiserror::Error;

use crate::error::TxError;
use crate::transaction::builder::TransactionIntent;
use crate::transaction::signed::final_encode;
use crate::transaction::signing::SigningProvider;
use crate::transaction::types::BlockRef;
use crate::transaction::validation::Validator;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("node rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid node response: {0}")]
    InvalidResponse(String),
}

// ---------------------------------------------------------------------------
// NodeTransport
// ---------------------------------------------------------------------------

/// The node operations the transaction workflow depends on.
#[async_trait]
pub trait NodeTransport: Send + Sync {
    /// Id of the current best block.
    async fn best_block_id(&self) -> Result<B256, TransportError>;

    /// Id of the genesis block. Its last byte is the chain tag.
    async fn genesis_block_id(&self) -> Result<B256, TransportError>;

    /// Submits raw signed bytes and returns the transaction id the node
    /// reports.
    async fn submit(&self, raw: &Bytes) -> Result<B256, TransportError>;
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// Builds, signs and submits a single-signer transaction.
///
/// `draft` receives the block reference derived from the node's best block
/// and returns the caller's intent. Anything it sets in `block_ref` is
/// overwritten.
///
/// # Errors
///
/// The first failing stage, wrapped in [`TxError`].
pub async fn send_transaction<T, F>(
    transport: &T,
    validator: &Validator,
    draft: F,
    signer: &dyn SigningProvider,
) -> Result<B256, TxError>
where
    T: NodeTransport + ?Sized,
    F: FnOnce(BlockRef) -> TransactionIntent,
{
    let best = transport.best_block_id().await?;
    let block_ref = BlockRef::from_block_id(&best);

    let mut intent = draft(block_ref);
    intent.block_ref = block_ref;

    let signed = validator.validate(&intent)?.hashed().sign(signer)?;
    let local_id = signed.id()?;
    let raw = final_encode(&signed);

    let id = transport.submit(&raw).await?;
    if id != local_id {
        tracing::warn!(node_id = %id, local_id = %local_id, "node reported a different transaction id");
    }

    tracing::info!(
        tx_id = %id,
        chain_tag = signed.intent().chain_tag(),
        clauses = signed.intent().clauses().len(),
        gas = signed.intent().gas(),
        "transaction submitted"
    );
    Ok(id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
