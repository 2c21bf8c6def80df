//! The tool-calling calculator agent.

use crate::dialogue::FALLBACK_REPLY;
use crate::host::{FluxAgent, InvokeParams};
use async_trait::async_trait;
use flux_agent_ai::{
    LlmBackend, LlmMessage, LlmRequest, ToolCall, ToolError, ToolExecutor, ToolLoop, ToolSpec,
    prompt,
};
use flux_agent_core::InvocationId;
use rootcause::Report;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const TOOL_NAME: &str = "calculator";

/// Calculator agent settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Model round-trips allowed per message.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

fn default_max_iterations() -> u32 {
    5
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

/// An arithmetic operation the calculator tool supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `a + b`
    Add,
    /// `a - b`
    Subtract,
    /// `a * b`
    Multiply,
    /// `a / b`
    Divide,
}

impl Operation {
    fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "add" => Some(Self::Add),
            "subtract" => Some(Self::Subtract),
            "multiply" => Some(Self::Multiply),
            "divide" => Some(Self::Divide),
            _ => None,
        }
    }

    const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }
}

/// Evaluates one operation and renders it as `a op b = result`.
#[must_use]
pub fn calculate(a: f64, b: f64, operation: Operation) -> String {
    let result = match operation {
        Operation::Add => a + b,
        Operation::Subtract => a - b,
        Operation::Multiply => a * b,
        Operation::Divide if b == 0.0 => return "Error: Cannot divide by zero".to_string(),
        Operation::Divide => a / b,
    };
    format!("{a} {} {b} = {result}", operation.symbol())
}

fn number_arg(call: &ToolCall, key: &str) -> Result<f64, Report<ToolError>> {
    let value = &call.arguments[key];
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| {
            ToolError::InvalidInput {
                name: call.name.clone(),
                reason: format!("'{key}' must be a number"),
            }
            .into()
        })
}

/// The `calculator` tool.
#[derive(Debug, Default)]
pub struct CalculatorTool;

#[async_trait]
impl ToolExecutor for CalculatorTool {
    fn specs(&self) -> Vec<ToolSpec> {
        vec![
            ToolSpec::new(TOOL_NAME, "Performs basic arithmetic on two numbers").with_parameters(
                json!({
                    "type": "object",
                    "properties": {
                        "a": {"type": "number", "description": "First operand"},
                        "b": {"type": "number", "description": "Second operand"},
                        "operation": {
                            "type": "string",
                            "enum": ["add", "subtract", "multiply", "divide"]
                        }
                    },
                    "required": ["a", "b", "operation"]
                }),
            ),
        ]
    }

    async fn execute(&self, call: &ToolCall) -> Result<String, Report<ToolError>> {
        if call.name != TOOL_NAME {
            return Err(ToolError::NotFound {
                name: call.name.clone(),
            }
            .into());
        }
        let a = number_arg(call, "a")?;
        let b = number_arg(call, "b")?;
        let output = match call.arguments["operation"].as_str().and_then(Operation::parse) {
            Some(operation) => calculate(a, b, operation),
            None => "Unknown operation".to_string(),
        };
        debug!(%output, "calculator evaluated");
        Ok(output)
    }
}

/// Answers arithmetic questions through the calculator tool. Keeps no
/// history and sends no tapbacks.
pub struct CalculatorAgent {
    backend: Arc<dyn LlmBackend>,
    tool: CalculatorTool,
    max_iterations: u32,
}

impl CalculatorAgent {
    /// Creates the agent.
    #[must_use]
    pub fn new(backend: Arc<dyn LlmBackend>, config: &CalculatorConfig) -> Self {
        Self {
            backend,
            tool: CalculatorTool,
            max_iterations: config.max_iterations,
        }
    }
}

#[async_trait]
impl FluxAgent for CalculatorAgent {
    fn name(&self) -> &'static str {
        "calculator"
    }

    #[instrument(
        skip(self, params),
        fields(invocation = %InvocationId::new(), user = %params.user_phone_number)
    )]
    async fn invoke(&self, params: InvokeParams) -> String {
        let request = LlmRequest::new(vec![
            LlmMessage::system(prompt::calculator_system_prompt()),
            LlmMessage::user(params.message),
        ]);

        let outcome = ToolLoop::new(self.backend.as_ref(), &self.tool)
            .with_max_iterations(self.max_iterations)
            .run(request)
            .await;

        match outcome {
            Ok(outcome) if !outcome.content.trim().is_empty() => {
                debug!(
                    iterations = outcome.iterations,
                    tool_calls = outcome.tool_calls.len(),
                    "calculation finished"
                );
                outcome.content
            }
            Ok(_) => {
                warn!("model returned an empty answer");
                FALLBACK_REPLY.to_string()
            }
            Err(report) => {
                warn!(error = %report, "calculation failed");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}
