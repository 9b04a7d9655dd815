//! RPC-style facade: typed JSON envelopes for the pipeline operations.
//!
//! External callers speak a JSON-RPC 2.0-shaped protocol; this module owns
//! the envelope types and the dispatch, nothing else. Transport (HTTP,
//! stdio, a message queue) is the embedder's business.
//!
//! Methods:
//! - `process`: run the whole input directory, or one named file with
//!   optional watermark/caption overrides
//! - `post`: publish the next unposted candidate, or one named file
//!   (`upload` is accepted as an alias)
//! - `status`: pending/posted snapshot of the publish queue

use crate::caption::CaptionSource;
use crate::config::PipelineConfig;
use crate::ledger::PostLedger;
use crate::pipeline::{self, ItemOutcome, ProcessOverrides};
use crate::publish::{self, PublishOutcome, UploadClient};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const JSONRPC_VERSION: &str = "2.0";

/// `method` does not exist.
pub const ERR_METHOD_NOT_FOUND: i64 = -32601;
/// `params` did not deserialize for the method.
pub const ERR_INVALID_PARAMS: i64 = -32602;
/// The operation itself failed (ledger, filesystem).
pub const ERR_INTERNAL: i64 = -32603;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    #[serde(default = "jsonrpc_version")]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<String>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

fn jsonrpc_version() -> String {
    JSONRPC_VERSION.to_string()
}

impl RpcResponse {
    pub fn success(id: Option<String>, result: Value) -> Self {
        Self {
            jsonrpc: jsonrpc_version(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<String>, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: jsonrpc_version(),
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Params for `process`. Without `filename` the whole input directory runs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessParams {
    pub filename: Option<String>,
    pub custom_caption: Option<String>,
    pub watermark_text: Option<String>,
    pub watermark_opacity: Option<u8>,
}

/// Params for `post`. Without `filename` the selector picks the candidate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PostParams {
    pub filename: Option<String>,
    pub custom_caption: Option<String>,
}

/// Dispatcher over the injected collaborators.
///
/// Owns nothing long-lived: config and collaborators are borrowed per
/// facade instance, mirroring the session-injection rule everywhere else.
pub struct Facade<'a> {
    config: &'a PipelineConfig,
    captioner: &'a dyn CaptionSource,
    uploader: &'a mut dyn UploadClient,
}

impl<'a> Facade<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        captioner: &'a dyn CaptionSource,
        uploader: &'a mut dyn UploadClient,
    ) -> Self {
        Self {
            config,
            captioner,
            uploader,
        }
    }

    pub fn handle(&mut self, request: &RpcRequest) -> RpcResponse {
        let id = request.id.clone();
        match request.method.as_str() {
            "process" => self.handle_process(id, request.params.clone()),
            "post" | "upload" => self.handle_post(id, request.params.clone()),
            "status" => self.handle_status(id),
            other => RpcResponse::failure(
                id,
                ERR_METHOD_NOT_FOUND,
                format!("unknown method: {other}"),
            ),
        }
    }

    fn handle_process(&mut self, id: Option<String>, params: Option<Value>) -> RpcResponse {
        let params: ProcessParams = match parse_params(params) {
            Ok(p) => p,
            Err(e) => return RpcResponse::failure(id, ERR_INVALID_PARAMS, e),
        };
        let overrides = ProcessOverrides {
            watermark_text: params.watermark_text,
            watermark_opacity: params.watermark_opacity,
            custom_caption: params.custom_caption,
        };

        let result = match &params.filename {
            Some(filename) => {
                pipeline::process_file(self.config, self.captioner, filename, &overrides)
                    .map(|outcome| json!({ "items": [item_value(&outcome)] }))
            }
            None => pipeline::process_batch(self.config, self.captioner).map(|report| {
                json!({
                    "processed": report.processed(),
                    "failed": report.failed(),
                    "skipped": report.skipped(),
                    "items": report.items.iter().map(item_value).collect::<Vec<_>>(),
                })
            }),
        };
        match result {
            Ok(value) => RpcResponse::success(id, value),
            Err(e) => RpcResponse::failure(id, ERR_INTERNAL, e.to_string()),
        }
    }

    fn handle_post(&mut self, id: Option<String>, params: Option<Value>) -> RpcResponse {
        let params: PostParams = match parse_params(params) {
            Ok(p) => p,
            Err(e) => return RpcResponse::failure(id, ERR_INVALID_PARAMS, e),
        };
        let ledger = PostLedger::new(&self.config.ledger_file);
        let hashtags = &self.config.publish.hashtags;

        let outcome = match &params.filename {
            Some(filename) => publish::publish_file(
                self.uploader,
                &self.config.output_dir.join(filename),
                params.custom_caption.as_deref(),
                &ledger,
                hashtags,
            ),
            None => publish::publish_next(
                self.uploader,
                &self.config.output_dir,
                &ledger,
                hashtags,
            ),
        };
        match outcome {
            Ok(outcome) => RpcResponse::success(id, outcome_value(&outcome)),
            Err(e) => RpcResponse::failure(id, ERR_INTERNAL, e.to_string()),
        }
    }

    fn handle_status(&mut self, id: Option<String>) -> RpcResponse {
        let ledger = PostLedger::new(&self.config.ledger_file);
        match publish::queue_status(&self.config.output_dir, &ledger) {
            Ok(status) => match serde_json::to_value(&status) {
                Ok(value) => RpcResponse::success(id, value),
                Err(e) => RpcResponse::failure(id, ERR_INTERNAL, e.to_string()),
            },
            Err(e) => RpcResponse::failure(id, ERR_INTERNAL, e.to_string()),
        }
    }
}

fn parse_params<T: Default + for<'de> Deserialize<'de>>(
    params: Option<Value>,
) -> Result<T, String> {
    match params {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value).map_err(|e| e.to_string()),
    }
}

fn item_value(outcome: &ItemOutcome) -> Value {
    match outcome {
        ItemOutcome::Processed { input, output } => json!({
            "input": input.display().to_string(),
            "status": "processed",
            "output": output.display().to_string(),
        }),
        ItemOutcome::Skipped { input, reason } => json!({
            "input": input.display().to_string(),
            "status": "skipped",
            "reason": reason,
        }),
        ItemOutcome::Failed { input, reason } => json!({
            "input": input.display().to_string(),
            "status": "failed",
            "reason": reason,
        }),
    }
}

fn outcome_value(outcome: &PublishOutcome) -> Value {
    match outcome {
        PublishOutcome::Posted { path, post_id } => json!({
            "status": "posted",
            "path": path.display().to_string(),
            "post_id": post_id.0,
        }),
        PublishOutcome::UploadFailed { path, reason } => json!({
            "status": "upload_failed",
            "path": path.display().to_string(),
            "reason": reason,
        }),
        PublishOutcome::NothingToPost => json!({ "status": "nothing_to_post" }),
    }
}
