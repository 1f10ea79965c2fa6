use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Common types and helpers shared by the hook binaries

/// Line-based hygiene checks and manifest inspection
pub mod analysis;

/// Hook configuration loaded from the agentkit YAML file
pub mod config;

/// Registry clients for dependency version lookups
pub mod providers;

/// Session-scoped state between hook invocations
pub mod cache;

/// Shell command policies for PreToolUse
pub mod policy;

/// Rendering of report blocks
pub mod messages;

/// dprint formatting of edited files
pub mod formatting;

/// End-to-end handling of one hook event
pub mod hooks;

// Re-export commonly used types for convenience
pub use analysis::{scan_text, HygieneReport, ScanOptions, Violation, ViolationKind};
pub use cache::SessionCache;
pub use config::{load_config, Config, Thresholds};
pub use policy::{CommandPolicy, Denial, PolicySet};

/// Env var holding the log filter directives
pub const LOG_ENV: &str = "HYGIENE_LOG";

/// Env var selecting the log line format; `json` emits one JSON object per event
pub const LOG_FORMAT_ENV: &str = "HYGIENE_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Hook input data structure as sent by the editor
#[derive(Debug, Deserialize)]
pub struct HookInput {
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub transcript_path: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub hook_event_name: Option<String>,
}

impl HookInput {
    pub fn string_input(&self, key: &str) -> Option<&str> {
        self.tool_input.get(key).and_then(|v| v.as_str())
    }

    pub fn file_path(&self) -> Option<&str> {
        self.string_input("file_path").filter(|p| !p.is_empty())
    }

    pub fn command(&self) -> Option<&str> {
        self.string_input("command")
    }
}

/// PreToolUse hook output
#[derive(Debug, Serialize)]
pub struct PreToolUseOutput {
    #[serde(rename = "hookSpecificOutput")]
    pub hook_specific_output: PreToolUseHookOutput,
}

#[derive(Debug, Serialize)]
pub struct PreToolUseHookOutput {
    #[serde(rename = "hookEventName")]
    pub hook_event_name: String,
    #[serde(rename = "permissionDecision")]
    pub permission_decision: String,
    #[serde(rename = "permissionDecisionReason", skip_serializing_if = "Option::is_none")]
    pub permission_decision_reason: Option<String>,
}

impl PreToolUseOutput {
    pub fn allow() -> Self {
        Self::decision("allow", None)
    }

    pub fn deny(reason: String) -> Self {
        Self::decision("deny", Some(reason))
    }

    fn decision(decision: &str, reason: Option<String>) -> Self {
        Self {
            hook_specific_output: PreToolUseHookOutput {
                hook_event_name: "PreToolUse".to_string(),
                permission_decision: decision.to_string(),
                permission_decision_reason: reason,
            },
        }
    }
}

/// PostToolUse hook output
#[derive(Debug, Serialize)]
pub struct PostToolUseOutput {
    #[serde(rename = "hookSpecificOutput")]
    pub hook_specific_output: PostToolUseHookOutput,
}

#[derive(Debug, Serialize)]
pub struct PostToolUseHookOutput {
    #[serde(rename = "hookEventName")]
    pub hook_event_name: String,
    #[serde(rename = "additionalContext")]
    pub additional_context: String,
}

impl PostToolUseOutput {
    pub fn with_context(additional_context: String) -> Self {
        Self {
            hook_specific_output: PostToolUseHookOutput {
                hook_event_name: "PostToolUse".to_string(),
                additional_context,
            },
        }
    }
}

/// Install the stderr log subscriber; stdout is reserved for the hook protocol.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let format = LogFormat::from_env_value(std::env::var(LOG_FORMAT_ENV).ok().as_deref());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    // A second install (e.g. from tests) is ignored.
    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
}
