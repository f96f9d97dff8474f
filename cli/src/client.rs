//! # Thor REST Client
//!
//! [`NodeTransport`] over the Thor node's HTTP API:
//!
//! | Call                  | Request                           |
//! |-----------------------|-----------------------------------|
//! | `best_block_id`       | `GET  {node}/blocks/best`         |
//! | `genesis_block_id`    | `GET  {node}/blocks/0`            |
//! | `submit`              | `POST {node}/transactions`        |
//!
//! Every request carries the configured timeout. Nothing is retried.

use alloy_primitives::{Bytes, B256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use vetx_protocol::transport::{NodeTransport, TransportError};

/// The fields of a block summary we use.
#[derive(Debug, Deserialize)]
struct BlockSummary {
    id: B256,
    number: u64,
}

#[derive(Debug, Serialize)]
struct RawTxRequest {
    raw: String,
}

#[derive(Debug, Deserialize)]
struct TxIdResponse {
    id: B256,
}

pub struct ThorClient {
    http: reqwest::Client,
    base_url: String,
}

impl ThorClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(network_error)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn block(&self, revision: &str) -> Result<BlockSummary, TransportError> {
        let url = self.endpoint(&format!("blocks/{}", revision));
        let res = self.http.get(&url).send().await.map_err(network_error)?;
        // Thor answers `null` for blocks it doesn't know.
        let block: Option<BlockSummary> = read_json(res).await?;
        let block = block.ok_or_else(|| {
            TransportError::InvalidResponse(format!("block {} not found", revision))
        })?;
        tracing::debug!(revision, number = block.number, id = %block.id, "block fetched");
        Ok(block)
    }
}

#[async_trait]
impl NodeTransport for ThorClient {
    async fn best_block_id(&self) -> Result<B256, TransportError> {
        Ok(self.block("best").await?.id)
    }

    async fn genesis_block_id(&self) -> Result<B256, TransportError> {
        Ok(self.block("0").await?.id)
    }

    async fn submit(&self, raw: &Bytes) -> Result<B256, TransportError> {
        let body = RawTxRequest {
            raw: format!("0x{}", hex::encode(raw)),
        };
        let res = self
            .http
            .post(self.endpoint("transactions"))
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;
        let TxIdResponse { id } = read_json(res).await?;
        Ok(id)
    }
}

/// Maps non-2xx responses to [`TransportError::Rejected`] with the node's
/// body text, and parses the rest as JSON.
async fn read_json<T: serde::de::DeserializeOwned>(
    res: reqwest::Response,
) -> Result<T, TransportError> {
    let status = res.status();
    if !status.is_success() {
        return Err(rejection(status.as_u16(), res.text().await));
    }
    res.json::<T>()
        .await
        .map_err(|e| TransportError::InvalidResponse(e.to_string()))
}

/// Builds the error for a non-2xx answer. A body that cannot be read is
/// reported as such rather than as an empty reason.
fn rejection<E: std::fmt::Display>(status: u16, body: Result<String, E>) -> TransportError {
    let body = match body {
        Ok(text) => text.trim().to_string(),
        Err(e) => format!("<unreadable body: {}>", e),
    };
    TransportError::Rejected { status, body }
}

fn network_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Network(format!("request timed out: {}", err))
    } else {
        TransportError::Network(err.to_string())
    }
}
