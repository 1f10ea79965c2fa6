use anyhow::{Context, Result};
use std::io::{self, Read};
use std::path::Path;

use hygiene_hooks::policy::{current_branch, GitPolicy};
use hygiene_hooks::*;

fn print_output(output: PreToolUseOutput) -> Result<()> {
    println!("{}", serde_json::to_string(&output).context("Failed to serialize output")?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    // Read input from stdin
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).context("Failed to read stdin")?;

    let hook_input: HookInput = match serde_json::from_str(&buffer) {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!(error = %e, "unparsable hook input");
            return print_output(PreToolUseOutput::allow());
        }
    };

    if !hook_input.tool_name.eq_ignore_ascii_case("bash") {
        return print_output(PreToolUseOutput::allow());
    }
    let Some(command) = hook_input.command().filter(|c| !c.trim().is_empty()) else {
        return print_output(PreToolUseOutput::allow());
    };

    let config = load_config();

    // Only spawn git when a branch-dependent rule could fire
    let branch = if GitPolicy::needs_branch(command) {
        let cwd = hook_input.cwd.as_deref().unwrap_or(".");
        current_branch(Path::new(cwd)).await
    } else {
        None
    };

    let policies = PolicySet::from_config(&config, branch);
    match policies.evaluate(command) {
        Some(denial) => {
            tracing::info!(policy = denial.policy, "blocking command");
            print_output(PreToolUseOutput::deny(denial.reason))
        }
        None => print_output(PreToolUseOutput::allow()),
    }
}
