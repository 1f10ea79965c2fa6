use once_cell::sync::Lazy;
use regex::Regex;

use super::{CommandPolicy, Denial};

struct BlockedCommand {
    pattern: Result<Regex, regex::Error>,
    tool: &'static str,
    replacement: &'static str,
}

fn blocked(pattern: &str, tool: &'static str, replacement: &'static str) -> BlockedCommand {
    BlockedCommand {
        pattern: Regex::new(pattern),
        tool,
        replacement,
    }
}

// Checked in order; the first hit names the tool in the message.
static BLOCKED_COMMANDS: Lazy<Vec<BlockedCommand>> = Lazy::new(|| {
    vec![
        blocked(r"(?i)\bnpm\s+install\b", "npm install", "bun install"),
        blocked(r"(?i)\bnpm\s+i\b", "npm i", "bun install"),
        blocked(r"(?i)\bnpm\s+ci\b", "npm ci", "bun install --frozen-lockfile"),
        blocked(r"(?i)\bnpm\s+run\b", "npm run", "bun run"),
        blocked(r"(?i)\bnpm\s+test\b", "npm test", "bun test"),
        blocked(r"(?i)\bnpm\s+init\b", "npm init", "bun init"),
        blocked(r"(?i)\bnpm\s+publish\b", "npm publish", "bun publish"),
        blocked(r"(?i)\bnpm\s+exec\b", "npm exec", "bunx"),
        blocked(r"(?i)\bnpm\s+create\b", "npm create", "bun create"),
        blocked(r"(?i)\bnpx\s+", "npx", "bunx"),
        blocked(r"(?i)\byarn\s+", "yarn", "bun"),
        blocked(r"(?im)\byarn$", "yarn", "bun install"),
        blocked(r"(?i)\bpnpm\s+", "pnpm", "bun"),
        blocked(r"(?im)\bpnpm$", "pnpm", "bun install"),
    ]
});

/// Steers npm, npx, yarn and pnpm invocations to bun.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageManagerPolicy;

impl CommandPolicy for PackageManagerPolicy {
    fn name(&self) -> &'static str {
        "packages"
    }

    fn evaluate(&self, command: &str) -> Option<Denial> {
        let hit = BLOCKED_COMMANDS.iter().find(|b| {
            b.pattern
                .as_ref()
                .map(|re| re.is_match(command))
                .unwrap_or(false)
        })?;

        self.deny(format!(
            "BLOCKED: '{}' is not allowed. Use bun instead.\n\
             \n\
             Replace with: {}\n\
             \n\
             Quick reference:\n  \
             npm install / yarn / pnpm install  →  bun install\n  \
             npm install <pkg>                  →  bun add <pkg>\n  \
             npm run <script>                   →  bun run <script>\n  \
             npx <cmd>                          →  bunx <cmd>\n  \
             npm test                           →  bun test\n\
             \n\
             Override: set pkg-police.enabled: false in agentkit config,\n\
             or user explicitly requests a different package manager.",
            hit.tool, hit.replacement
        ))
    }
}
