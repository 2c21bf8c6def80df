//! Bounded tool-calling loop.
//!
//! The loop:
//! 1. Sends the conversation and tool specs to the model
//! 2. Executes any tool calls the model requests
//! 3. Feeds the results back as tool messages
//! 4. Repeats until the model answers in text or the iteration limit is hit

use crate::backend::{LlmBackend, LlmMessage, LlmRequest, TokenUsage, ToolCall, ToolSpec};
use crate::error::{LlmError, ToolError};
use async_trait::async_trait;
use rootcause::Report;
use tracing::{debug, warn};

/// A set of tools the model may call.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Returns the tools offered to the model.
    fn specs(&self) -> Vec<ToolSpec>;

    /// Executes one call and returns the text handed back to the model.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool is unknown or its input is unusable.
    async fn execute(&self, call: &ToolCall) -> Result<String, Report<ToolError>>;
}

/// The outcome of a completed loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolLoopOutcome {
    /// The model's final text answer.
    pub content: String,
    /// Number of model round-trips made.
    pub iterations: u32,
    /// Every tool call executed, in order.
    pub tool_calls: Vec<ToolCall>,
    /// Token usage summed over all round-trips.
    pub usage: TokenUsage,
}

/// Runs a request against a backend, servicing tool calls along the way.
pub struct ToolLoop<'a> {
    backend: &'a dyn LlmBackend,
    tools: &'a dyn ToolExecutor,
    max_iterations: u32,
}

impl<'a> ToolLoop<'a> {
    /// Creates a loop allowing five model round-trips.
    #[must_use]
    pub fn new(backend: &'a dyn LlmBackend, tools: &'a dyn ToolExecutor) -> Self {
        Self {
            backend,
            tools,
            max_iterations: 5,
        }
    }

    /// Sets the maximum number of model round-trips.
    #[must_use]
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Runs the loop to completion.
    ///
    /// Tool failures are reported back to the model as text rather than
    /// aborting the loop.
    ///
    /// # Errors
    ///
    /// Returns an error if a backend call fails or the model is still asking
    /// for tools after the last allowed iteration.
    pub async fn run(&self, request: LlmRequest) -> Result<ToolLoopOutcome, Report<LlmError>> {
        let mut request = request.with_tools(self.tools.specs());
        let mut executed = Vec::new();
        let mut usage = TokenUsage::default();

        for iteration in 1..=self.max_iterations {
            let response = self.backend.generate(&request).await?;
            usage.input_tokens += response.usage.input_tokens;
            usage.output_tokens += response.usage.output_tokens;

            if !response.has_tool_calls() {
                return Ok(ToolLoopOutcome {
                    content: response.content,
                    iterations: iteration,
                    tool_calls: executed,
                    usage,
                });
            }

            let content = Some(response.content).filter(|c| !c.is_empty());
            request
                .messages
                .push(LlmMessage::assistant_tool_calls(content, response.tool_calls.clone()));

            for call in response.tool_calls {
                let output = match self.tools.execute(&call).await {
                    Ok(output) => output,
                    Err(report) => {
                        warn!(tool = %call.name, error = %report, "tool call failed");
                        format!("Error: {report}")
                    }
                };
                debug!(tool = %call.name, iteration, "tool call completed");
                request
                    .messages
                    .push(LlmMessage::tool_result(call.id.clone(), output));
                executed.push(call);
            }
        }

        Err(LlmError::IterationLimit {
            max: self.max_iterations,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{LlmResponse, MessageRole};
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays canned responses and records every request.
    struct ScriptedBackend {
        responses: Mutex<Vec<LlmResponse>>,
        requests: Mutex<Vec<LlmRequest>>,
    }

    impl ScriptedBackend {
        fn new(mut responses: Vec<LlmResponse>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmBackend for ScriptedBackend {
        async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, Report<LlmError>> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| LlmError::RequestFailed {
                    reason: "script exhausted".to_string(),
                }.into())
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    struct EchoTool;

    #[async_trait]
    impl ToolExecutor for EchoTool {
        fn specs(&self) -> Vec<ToolSpec> {
            vec![ToolSpec::new("echo", "echoes its input")]
        }

        async fn execute(&self, call: &ToolCall) -> Result<String, Report<ToolError>> {
            match call.name.as_str() {
                "echo" => Ok(call.arguments["text"].as_str().unwrap_or_default().to_string()),
                other => Err(ToolError::NotFound {
                    name: other.to_string(),
                }
                .into()),
            }
        }
    }

    fn tool_response(calls: Vec<ToolCall>) -> LlmResponse {
        LlmResponse {
            tool_calls: calls,
            ..LlmResponse::default()
        }
    }

    #[tokio::test]
    async fn returns_text_without_tool_calls() {
        let backend = ScriptedBackend::new(vec![LlmResponse::text("done")]);
        let outcome = ToolLoop::new(&backend, &EchoTool)
            .run(LlmRequest::new(vec![LlmMessage::user("hi")]))
            .await
            .expect("loop succeeds");

        assert_eq!(outcome.content, "done");
        assert_eq!(outcome.iterations, 1);
        assert!(outcome.tool_calls.is_empty());

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests[0].tools[0].name, "echo");
    }

    #[tokio::test]
    async fn feeds_tool_results_back() {
        let backend = ScriptedBackend::new(vec![
            tool_response(vec![ToolCall::new("c1", "echo", json!({"text": "pong"}))]),
            LlmResponse::text("the tool said pong"),
        ]);
        let outcome = ToolLoop::new(&backend, &EchoTool)
            .run(LlmRequest::new(vec![LlmMessage::user("ping")]))
            .await
            .expect("loop succeeds");

        assert_eq!(outcome.content, "the tool said pong");
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.tool_calls.len(), 1);

        let requests = backend.requests.lock().unwrap();
        let second = &requests[1].messages;
        assert_eq!(second[1].role, MessageRole::Assistant);
        assert_eq!(second[1].tool_calls[0].id, "c1");
        assert_eq!(second[2].role, MessageRole::Tool);
        assert_eq!(second[2].tool_call_id.as_deref(), Some("c1"));
        assert_eq!(second[2].content.as_deref(), Some("pong"));
    }

    #[tokio::test]
    async fn tool_errors_are_reported_to_the_model() {
        let backend = ScriptedBackend::new(vec![
            tool_response(vec![ToolCall::new("c1", "missing", json!({}))]),
            LlmResponse::text("sorry"),
        ]);
        ToolLoop::new(&backend, &EchoTool)
            .run(LlmRequest::new(vec![LlmMessage::user("x")]))
            .await
            .expect("loop succeeds");

        let requests = backend.requests.lock().unwrap();
        let result = requests[1].messages[2].content.as_deref().unwrap_or_default();
        assert!(result.starts_with("Error:"));
        assert!(result.contains("tool not found: missing"));
    }

    #[tokio::test]
    async fn stops_at_iteration_limit() {
        let call = ToolCall::new("c", "echo", json!({"text": "again"}));
        let backend = ScriptedBackend::new(vec![
            tool_response(vec![call.clone()]),
            tool_response(vec![call.clone()]),
            tool_response(vec![call]),
        ]);
        let err = ToolLoop::new(&backend, &EchoTool)
            .with_max_iterations(2)
            .run(LlmRequest::new(vec![LlmMessage::user("loop")]))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("after 2 iterations"));
        assert_eq!(backend.requests.lock().unwrap().len(), 2);
    }
}
