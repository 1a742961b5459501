use crate::privilege::{self, PrivilegePolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level role manifest configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Configuration {
    #[serde(default, rename = "auth")]
    pub authorization: Authorization,
}

/// The authorization section of a role manifest.
///
/// All names referenced by accounts are expected to exist in the corresponding maps. Manifests
/// are validated before they get here.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Authorization {
    #[serde(default)]
    pub roles: BTreeMap<String, AuthRole>,

    #[serde(default)]
    pub cluster_roles: BTreeMap<String, AuthRole>,

    #[serde(default, rename = "pod-security-policies")]
    pub privilege_policies: BTreeMap<String, PrivilegePolicy>,

    #[serde(default)]
    pub accounts: BTreeMap<String, AuthAccount>,
}

/// A single RBAC permission grant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRule {
    #[serde(default)]
    pub api_groups: Vec<String>,

    #[serde(default)]
    pub resources: Vec<String>,

    #[serde(default)]
    pub resource_names: Vec<String>,

    #[serde(default)]
    pub verbs: Vec<String>,
}

/// An ordered list of rules, granted to accounts as a unit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct AuthRole(Vec<AuthRule>);

/// A service account bound to roles and cluster roles.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuthAccount {
    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(default)]
    pub cluster_roles: Vec<String>,

    /// The privilege policies attached to this account through its roles. Computed by
    /// [`Authorization::resolve_account_policies`]; never read from a manifest.
    #[serde(skip)]
    pub privilege_policies: BTreeMap<String, PrivilegePolicy>,
}

// === impl AuthRule ===

impl AuthRule {
    pub const PRIVILEGE_POLICY_API_GROUP: &'static str = "extensions";
    pub const PRIVILEGE_POLICY_RESOURCE: &'static str = "podsecuritypolicies";
    pub const PRIVILEGE_POLICY_VERB: &'static str = "use";

    /// Returns a rule granting use of the named privilege policies.
    pub fn use_privilege_policies<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            api_groups: vec![Self::PRIVILEGE_POLICY_API_GROUP.to_string()],
            resources: vec![Self::PRIVILEGE_POLICY_RESOURCE.to_string()],
            resource_names: names.into_iter().map(Into::into).collect(),
            verbs: vec![Self::PRIVILEGE_POLICY_VERB.to_string()],
        }
    }

    /// Checks whether the rule grants `use` of pod security policies.
    pub fn is_privilege_policy_rule(&self) -> bool {
        contains(&self.api_groups, Self::PRIVILEGE_POLICY_API_GROUP)
            && contains(&self.verbs, Self::PRIVILEGE_POLICY_VERB)
            && contains(&self.resources, Self::PRIVILEGE_POLICY_RESOURCE)
    }
}

fn contains(values: &[String], value: &str) -> bool {
    values.iter().any(|v| v == value)
}

// === impl AuthRole ===

impl AuthRole {
    pub fn rules(&self) -> &[AuthRule] {
        &self.0
    }

    /// Names the privilege policies this role grants use of.
    pub fn privilege_policy_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0
            .iter()
            .filter(|rule| rule.is_privilege_policy_rule())
            .flat_map(|rule| rule.resource_names.iter().map(String::as_str))
    }
}

impl From<Vec<AuthRule>> for AuthRole {
    fn from(rules: Vec<AuthRule>) -> Self {
        Self(rules)
    }
}

impl std::iter::FromIterator<AuthRule> for AuthRole {
    fn from_iter<T: IntoIterator<Item = AuthRule>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

// === impl Authorization ===

impl Authorization {
    pub fn role(&self, name: &str) -> Option<&AuthRole> {
        self.roles.get(name)
    }

    pub fn cluster_role(&self, name: &str) -> Option<&AuthRole> {
        self.cluster_roles.get(name)
    }

    pub fn privilege_policy(&self, name: &str) -> Option<&PrivilegePolicy> {
        self.privilege_policies.get(name)
    }

    pub fn account(&self, name: &str) -> Option<&AuthAccount> {
        self.accounts.get(name)
    }

    /// Checks whether `name` is a declared or built-in privilege policy.
    pub fn knows_privilege_policy(&self, name: &str) -> bool {
        privilege::known_policy(Some(self), name)
    }

    /// Computes the privilege policies an account may use through its roles and cluster roles.
    ///
    /// Role names and policy names that cannot be resolved are skipped.
    pub fn account_policies(&self, account: &str) -> BTreeMap<String, PrivilegePolicy> {
        let Some(account) = self.account(account) else {
            return BTreeMap::new();
        };

        let roles = account.roles.iter().filter_map(|name| self.role(name));
        let cluster_roles = account
            .cluster_roles
            .iter()
            .filter_map(|name| self.cluster_role(name));

        roles
            .chain(cluster_roles)
            .flat_map(AuthRole::privilege_policy_names)
            .filter_map(|name| Some((name.to_string(), privilege::resolve(self, name)?)))
            .collect()
    }

    /// Populates each account's computed privilege-policy mapping.
    pub fn resolve_account_policies(&mut self) {
        let resolved = self
            .accounts
            .keys()
            .map(|name| (name.clone(), self.account_policies(name)))
            .collect::<Vec<_>>();
        for (name, policies) in resolved {
            if let Some(account) = self.accounts.get_mut(&name) {
                account.privilege_policies = policies;
            }
        }
    }
}
