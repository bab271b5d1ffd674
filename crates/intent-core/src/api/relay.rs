//! JSON-RPC relay client for the ledger's account service.

use crate::config::Config;
use crate::settlement::{AuthorizationResponse, LedgerAuthorization};
use crate::{Error, Result};
use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

sol! {
    function isAuthorized(address account, bytes message, bytes signatureBlob)
        external
        returns (int64 responseCode, bool authorized);
}

/// Relay client that evaluates `isAuthorized` with `eth_call`.
pub struct RelayClient {
    rpc_url: String,
    account_service: Address,
    http_client: reqwest::Client,
}

impl RelayClient {
    pub fn new(rpc_url: impl Into<String>, account_service: Address) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            account_service,
            http_client: reqwest::Client::new(),
        }
    }

    /// Build a client for the configured network, with the relay timeout
    /// applied to every request.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.relay.timeout())
            .build()?;

        Ok(Self {
            rpc_url: config.get_rpc_url(),
            account_service: config.account_service_address()?,
            http_client,
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    pub fn account_service(&self) -> Address {
        self.account_service
    }

    async fn eth_call(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        let params = serde_json::json!([
            {
                "to": self.account_service,
                "data": Bytes::from(data),
            },
            "latest"
        ]);

        let response: JsonRpcResponse<Bytes> = self.rpc_call("eth_call", params).await?;

        if let Some(error) = response.error {
            return Err(Error::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        response.result.map(|bytes| bytes.to_vec()).ok_or_else(|| Error::Api {
            message: "No result in response".to_string(),
            status: None,
        })
    }

    async fn rpc_call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<JsonRpcResponse<T>> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Api {
                message: format!("RPC request failed: {}", response.status()),
                status: Some(response.status().as_u16()),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl LedgerAuthorization for RelayClient {
    async fn is_authorized(
        &self,
        account: Address,
        message: &[u8],
        signature_blob: &[u8],
    ) -> Result<AuthorizationResponse> {
        let data = encode_is_authorized(account, message, signature_blob);
        debug!(%account, calldata_len = data.len(), "Calling account service");

        let output = self.eth_call(data).await?;
        decode_is_authorized(&output)
    }
}

/// Calldata for `isAuthorized(account, message, signatureBlob)`.
pub fn encode_is_authorized(account: Address, message: &[u8], signature_blob: &[u8]) -> Vec<u8> {
    isAuthorizedCall {
        account,
        message: Bytes::copy_from_slice(message),
        signatureBlob: Bytes::copy_from_slice(signature_blob),
    }
    .abi_encode()
}

pub fn decode_is_authorized(output: &[u8]) -> Result<AuthorizationResponse> {
    let decoded = isAuthorizedCall::abi_decode_returns(output).map_err(|e| Error::Api {
        message: format!("Failed to decode isAuthorized result: {}", e),
        status: None,
    })?;

    Ok(AuthorizationResponse {
        response_code: decoded.responseCode,
        authorized: decoded.authorized,
    })
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'a str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}
