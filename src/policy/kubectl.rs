use once_cell::sync::Lazy;
use regex::Regex;

use super::{is_match, CommandPolicy, Denial};

/// Kargo custom resources that must only be created through Kargo itself
pub const KARGO_CRDS: [&str; 8] = [
    "promotion",
    "promotions",
    "stage",
    "stages",
    "freight",
    "freights",
    "warehouse",
    "warehouses",
];

static KUBECTL_MUTATE_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"(?i)\bkubectl\b.*\b(create|apply)\b"));
static KARGO_CRD_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\b({})\b", KARGO_CRDS.join("|"))));

/// Blocks `kubectl create|apply` of Kargo resources.
#[derive(Debug, Clone, Copy, Default)]
pub struct KubectlPolicy;

impl KubectlPolicy {
    fn crd_in(command: &str) -> Option<String> {
        let re = KARGO_CRD_RE.as_ref().ok()?;
        re.captures(command)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_lowercase())
    }
}

impl CommandPolicy for KubectlPolicy {
    fn name(&self) -> &'static str {
        "kubectl"
    }

    fn evaluate(&self, command: &str) -> Option<Denial> {
        if !is_match(&KUBECTL_MUTATE_RE, command) {
            return None;
        }
        let crd = Self::crd_in(command)?;
        self.deny(format!(
            "BLOCKED: Creating/applying Kargo {crd} via kubectl is forbidden.\n\
             kubectl-created Kargo resources poison the stage state machine:\n  \
             - Promotions: custom names break lexicographic sorting, currentPromotion not set\n  \
             - Stages: orphaned state that ArgoCD can't reconcile\n\
             \n\
             Use instead:\n  \
             - Kargo UI or auto-promotion for promotions\n  \
             - GitOps (git push) for stage/warehouse/freight changes\n  \
             - kubectl DELETE (not create) to recover from corrupted state"
        ))
    }
}
