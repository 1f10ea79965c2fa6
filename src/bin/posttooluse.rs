use anyhow::{Context, Result};
use std::io::{self, Read};

use hygiene_hooks::formatting::DprintFormatter;
use hygiene_hooks::hooks::{format_edited_file, is_file_edit_tool, resolve_path, review_edited_file};
use hygiene_hooks::providers::HttpRegistryClient;
use hygiene_hooks::*;

fn print_output(additional_context: String) -> Result<()> {
    let output = PostToolUseOutput::with_context(additional_context);
    println!("{}", serde_json::to_string(&output).context("Failed to serialize output")?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    // Read hook input from stdin
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).context("Failed to read stdin")?;

    let hook_input: HookInput = match serde_json::from_str(&buffer) {
        Ok(input) => input,
        Err(e) => {
            // Never block the editor on a malformed payload
            tracing::warn!(error = %e, "unparsable hook input");
            return print_output(String::new());
        }
    };

    // Only Write, Edit and MultiEdit leave a changed file behind
    if !is_file_edit_tool(&hook_input.tool_name) {
        return print_output(String::new());
    }
    let Some(file_path) = hook_input.file_path() else {
        tracing::debug!("edit tool call without file_path");
        return print_output(String::new());
    };

    let config = load_config();
    let resolved = resolve_path(file_path, hook_input.cwd.as_deref());
    let mut cache = SessionCache::for_session(hook_input.session_id.as_deref());

    // Format first so the review sees the file as it will be committed
    let formatter = if config.format_enabled {
        DprintFormatter::discover()
    } else {
        None
    };
    format_edited_file(file_path, &resolved, hook_input.cwd.as_deref(), &config, formatter.as_ref()).await;

    let registry = match HttpRegistryClient::from_env() {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::warn!(error = %e, "registry client unavailable");
            None
        }
    };

    let context = review_edited_file(file_path, &resolved, &config, registry.as_ref(), &mut cache).await;
    print_output(context)
}
