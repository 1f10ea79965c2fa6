//! Shell command policies evaluated before a `Bash` tool call runs.
//!
//! Each policy either has no objection or returns a [`Denial`] whose reason
//! starts with `BLOCKED:`. Policies are consulted in order and the first
//! denial wins.

pub mod git;
pub mod kubectl;
pub mod packages;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::config::Config;

pub use git::{current_branch, GitPolicy, PROTECTED_BRANCHES};
pub use kubectl::KubectlPolicy;
pub use packages::PackageManagerPolicy;

pub const BRANCH_LOOKUP_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denial {
    pub policy: &'static str,
    pub reason: String,
}

pub trait CommandPolicy {
    fn name(&self) -> &'static str;

    /// `None` means no objection.
    fn evaluate(&self, command: &str) -> Option<Denial>;

    fn deny(&self, reason: String) -> Option<Denial> {
        Some(Denial {
            policy: self.name(),
            reason,
        })
    }
}

/// True when the lazily compiled pattern matches; an invalid pattern never matches.
pub(crate) fn is_match(re: &Lazy<Result<Regex, regex::Error>>, text: &str) -> bool {
    re.as_ref().map(|re| re.is_match(text)).unwrap_or(false)
}

/// Ordered collection of the enabled policies
pub struct PolicySet {
    policies: Vec<Box<dyn CommandPolicy + Send + Sync>>,
}

impl PolicySet {
    pub fn new(policies: Vec<Box<dyn CommandPolicy + Send + Sync>>) -> Self {
        Self { policies }
    }

    /// Git, then kubectl, then package managers (when enabled).
    pub fn from_config(config: &Config, current_branch: Option<String>) -> Self {
        let mut policies: Vec<Box<dyn CommandPolicy + Send + Sync>> = vec![
            Box::new(GitPolicy::new(current_branch)),
            Box::new(KubectlPolicy),
        ];
        if config.package_policy_enabled {
            policies.push(Box::new(PackageManagerPolicy));
        }
        Self { policies }
    }

    pub fn evaluate(&self, command: &str) -> Option<Denial> {
        if command.trim().is_empty() {
            return None;
        }
        let denial = self.policies.iter().find_map(|p| p.evaluate(command));
        if let Some(d) = &denial {
            tracing::debug!(policy = d.policy, "command denied");
        }
        denial
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
