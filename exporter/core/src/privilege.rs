//! Abstract privilege levels.
//!
//! Nothing here knows what a privilege level permits. Manifests assign names to workloads and
//! operators map those names onto concrete policies at deploy time. The only property interpreted
//! here is whether a level allows privilege escalation, so that a level can be widened for roles
//! that need it.

use crate::auth::Authorization;
use role_exporter_k8s_api::PodSecurityPolicySpec;
use serde::{Deserialize, Serialize};

pub const NON_PRIVILEGED: &str = "nonprivileged";
pub const PRIVILEGED: &str = "privileged";

/// A named privilege level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PrivilegePolicy {
    spec: PodSecurityPolicySpec,
}

/// The names of the privilege policies that are always known.
pub fn builtin_names() -> [&'static str; 2] {
    [NON_PRIVILEGED, PRIVILEGED]
}

/// The policy applied to workloads that do not name one.
pub fn default_policy_name() -> &'static str {
    NON_PRIVILEGED
}

/// Checks whether `name` is a policy declared by `manifest` or a built-in policy.
pub fn known_policy(manifest: Option<&Authorization>, name: &str) -> bool {
    if let Some(manifest) = manifest {
        if manifest.privilege_policies.contains_key(name) {
            return true;
        }
    }
    builtin_names().contains(&name)
}

/// Looks up a policy by name.
///
/// Declared policies take precedence over built-ins of the same name.
pub fn resolve(manifest: &Authorization, name: &str) -> Option<PrivilegePolicy> {
    if let Some(policy) = manifest.privilege_policy(name) {
        return Some(policy.clone());
    }
    match name {
        NON_PRIVILEGED => Some(PrivilegePolicy::default()),
        PRIVILEGED => Some(PrivilegePolicy::privileged()),
        _ => None,
    }
}

// === impl PrivilegePolicy ===

impl PrivilegePolicy {
    pub fn new(spec: PodSecurityPolicySpec) -> Self {
        Self { spec }
    }

    /// The built-in `privileged` level.
    pub fn privileged() -> Self {
        Self::new(PodSecurityPolicySpec {
            allow_privilege_escalation: Some(true),
            privileged: Some(true),
            ..Default::default()
        })
    }

    pub fn spec(&self) -> &PodSecurityPolicySpec {
        &self.spec
    }

    /// Unset is treated as disallowed.
    pub fn privilege_escalation_allowed(&self) -> bool {
        self.spec.allow_privilege_escalation == Some(true)
    }

    /// Returns a copy of this policy that allows privilege escalation.
    #[must_use]
    pub fn clone_as_privileged(&self) -> Self {
        let mut policy = self.clone();
        if !policy.privilege_escalation_allowed() {
            policy.spec.allow_privilege_escalation = Some(true);
        }
        policy
    }
}

impl From<PodSecurityPolicySpec> for PrivilegePolicy {
    fn from(spec: PodSecurityPolicySpec) -> Self {
        Self::new(spec)
    }
}
