use std::path::Path;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;

use super::{is_match, CommandPolicy, Denial, BRANCH_LOOKUP_TIMEOUT_SECS};

pub const PROTECTED_BRANCHES: [&str; 2] = ["main", "master"];

static NO_VERIFY_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"(?i)\bgit\b.*--no-verify\b"));
static FORCE_PUSH_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"(?i)\bgit\b.*\bpush\b.*(-f|--force|--force-with-lease)\b"));
static PUSH_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"(?i)\bgit\b.*\bpush\b"));
static PUSH_PROTECTED_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"(?i)\bpush\b.*\b(main|master)\b"));
static CHECKOUT_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"(?i)\bgit\b.*\b(checkout|switch)\b"));
static CHECKOUT_PROTECTED_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"(?i)\b(checkout|switch)\b\s+(main|master)\b"));
static NEW_BRANCH_FLAG_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"(?:^|\s)-b\b"));
static COMMIT_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"(?i)\bgit\b.*\bcommit\b"));
static ATTRIBUTION_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"(?i)co-authored-by"));

/// Guards protected branches and commit hygiene.
///
/// `current_branch` is resolved by the caller; `None` (unknown) never denies.
#[derive(Debug, Clone, Default)]
pub struct GitPolicy {
    current_branch: Option<String>,
}

impl GitPolicy {
    pub fn new(current_branch: Option<String>) -> Self {
        Self { current_branch }
    }

    /// Whether evaluating `command` depends on the current branch at all.
    pub fn needs_branch(command: &str) -> bool {
        is_match(&PUSH_RE, command) || is_match(&COMMIT_RE, command)
    }

    fn protected_branch(&self) -> Option<&str> {
        self.current_branch
            .as_deref()
            .filter(|b| PROTECTED_BRANCHES.contains(b))
    }

    fn is_checkout_protected(command: &str) -> bool {
        is_match(&CHECKOUT_RE, command)
            && !is_match(&NEW_BRANCH_FLAG_RE, command)
            && is_match(&CHECKOUT_PROTECTED_RE, command)
    }
}

impl CommandPolicy for GitPolicy {
    fn name(&self) -> &'static str {
        "git"
    }

    fn evaluate(&self, command: &str) -> Option<Denial> {
        if is_match(&NO_VERIFY_RE, command) {
            return self.deny(
                "BLOCKED: --no-verify is forbidden.\n\
                 Skipping pre-commit hooks bypasses quality gates (linting, tests, formatting).\n\
                 Fix the issue that's causing the hook to fail instead."
                    .to_string(),
            );
        }

        if is_match(&FORCE_PUSH_RE, command) {
            return self.deny(
                "BLOCKED: Force push is forbidden.\n\
                 Force pushing rewrites history and can destroy work.\n\
                 If you truly need this, ask the user for explicit approval first."
                    .to_string(),
            );
        }

        let is_push = is_match(&PUSH_RE, command);
        if is_push && is_match(&PUSH_PROTECTED_RE, command) {
            return self.deny(format!(
                "BLOCKED: Pushing directly to a protected branch ({}) is forbidden.\n\
                 Create a feature branch and raise a PR instead.",
                PROTECTED_BRANCHES.join("/")
            ));
        }

        if is_push {
            if let Some(branch) = self.protected_branch() {
                return self.deny(format!(
                    "BLOCKED: You are on '{branch}'. Pushing from a protected branch is forbidden.\n\
                     Create a feature branch first:\n  \
                     git checkout -b feat/your-feature-name\n\
                     Then push from there and raise a PR."
                ));
            }
        }

        if Self::is_checkout_protected(command) {
            return None;
        }

        if is_match(&COMMIT_RE, command) {
            if let Some(branch) = self.protected_branch() {
                return self.deny(format!(
                    "BLOCKED: Committing directly to '{branch}' is forbidden.\n\
                     You are on the {branch} branch. Create a feature branch first:\n  \
                     git checkout -b feat/your-feature-name\n\
                     Then commit your changes there and raise a PR."
                ));
            }
            if is_match(&ATTRIBUTION_RE, command) {
                return self.deny(
                    "BLOCKED: AI attribution trailers (Co-authored-by) are forbidden in commit messages.\n\
                     Do not add Co-authored-by, Signed-off-by, or other AI agent attribution lines.\n\
                     The commit author is whoever owns the git config. Remove the trailer and retry."
                        .to_string(),
                );
            }
        }

        None
    }
}

/// `git branch --show-current` in `cwd`; any failure or timeout yields `None`.
pub async fn current_branch(cwd: &Path) -> Option<String> {
    let mut cmd = Command::new("git");
    cmd.args(["branch", "--show-current"])
        .current_dir(cwd)
        .kill_on_drop(true);

    let limit = Duration::from_secs(BRANCH_LOOKUP_TIMEOUT_SECS);
    let output = match tokio::time::timeout(limit, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "git not runnable");
            return None;
        }
        Err(_) => {
            tracing::warn!("git branch lookup timed out");
            return None;
        }
    };
    if !output.status.success() {
        return None;
    }
    let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!branch.is_empty()).then_some(branch)
}
