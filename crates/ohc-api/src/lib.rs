//! ohc-api
//!
//! Blocking transport for the OnlineHashCrack v2 API.
//!
//! Every call is a single `POST` of a JSON body to one endpoint. There are no
//! retries here: a rate-limit reply is returned like any other reply, and a
//! request that produces no reply is a [`TransportError`]. Interpreting the
//! reply is the caller's job.
//!
//! The API key is passed in by the caller; it is never logged.

use std::time::Duration;

use anyhow::{Context, Result};
use ohc_execution::{
    RemoteService, ServiceReply, SubmitBatch, TransportError, WritePermit, AGREE_TERMS,
    DEFAULT_ALGO_MODE, DEFAULT_LIST_TIMEOUT, DEFAULT_SUBMIT_TIMEOUT,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

pub use ohc_execution::DEFAULT_BASE_URL;

/// Non-JSON reply bodies are kept up to this many characters.
const MAX_TEXT_CHARS: usize = 4000;

const ACTION_LIST_TASKS: &str = "list_tasks";
const ACTION_UPLOAD: &str = "upload";

#[derive(Debug, Clone)]
pub struct OhcClientOptions {
    pub base_url: String,
    pub algo_mode: u64,
    pub list_timeout: Duration,
    pub submit_timeout: Duration,
}

impl Default for OhcClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            algo_mode: DEFAULT_ALGO_MODE,
            list_timeout: DEFAULT_LIST_TIMEOUT,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
        }
    }
}

#[derive(Serialize)]
struct ListTasksPayload<'a> {
    api_key: &'a str,
    agree_terms: &'a str,
    action: &'a str,
}

#[derive(Serialize)]
struct UploadPayload<'a> {
    api_key: &'a str,
    agree_terms: &'a str,
    algo_mode: u64,
    hashes: Vec<&'a str>,
}

#[derive(Clone)]
pub struct OhcClient {
    api_key: String,
    opts: OhcClientOptions,
    http: reqwest::blocking::Client,
}

impl std::fmt::Debug for OhcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OhcClient")
            .field("api_key", &"<REDACTED>")
            .field("opts", &self.opts)
            .finish()
    }
}

impl OhcClient {
    pub fn new(api_key: String, opts: OhcClientOptions) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            api_key,
            opts,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.opts.base_url
    }

    fn post<P: Serialize>(
        &self,
        action: &'static str,
        payload: &P,
        timeout: Duration,
    ) -> Result<ServiceReply, TransportError> {
        let resp = self
            .http
            .post(self.opts.base_url.as_str())
            .timeout(timeout)
            .json(payload)
            .send()
            .map_err(|e| TransportError::new(action, e.to_string()))?;

        let http_status = resp.status().as_u16();
        let text = resp
            .text()
            .map_err(|e| TransportError::new(action, format!("reading body: {e}")))?;
        debug!(action, http_status, bytes = text.len(), "reply received");

        Ok(ServiceReply::new(http_status, reply_body(&text)))
    }
}

/// JSON objects pass through; anything else becomes
/// `{"success": false, "text": <truncated body>}`.
fn reply_body(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(v @ Value::Object(_)) => v,
        _ => json!({
            "success": false,
            "text": text.chars().take(MAX_TEXT_CHARS).collect::<String>(),
        }),
    }
}

impl RemoteService for OhcClient {
    fn list_tasks(&self) -> Result<ServiceReply, TransportError> {
        let payload = ListTasksPayload {
            api_key: &self.api_key,
            agree_terms: AGREE_TERMS,
            action: ACTION_LIST_TASKS,
        };
        self.post(ACTION_LIST_TASKS, &payload, self.opts.list_timeout)
    }

    fn upload_hashes(
        &self,
        batch: SubmitBatch,
        _permit: WritePermit,
    ) -> Result<ServiceReply, TransportError> {
        let payload = UploadPayload {
            api_key: &self.api_key,
            agree_terms: batch.agree_terms(),
            algo_mode: self.opts.algo_mode,
            hashes: batch.hashes(),
        };
        self.post(ACTION_UPLOAD, &payload, self.opts.submit_timeout)
    }
}
