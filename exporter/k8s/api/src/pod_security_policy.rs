//! A serde model of the `policy/v1beta1` `PodSecurityPolicySpec`.
//!
//! The resource has been removed from the Kubernetes API (and from `k8s-openapi`), but role
//! manifests still describe privilege levels in its terms. Operators map these onto whatever
//! admission mechanism their clusters run.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSecurityPolicySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_privilege_escalation: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_allow_privilege_escalation: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileged: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_capabilities: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_add_capabilities: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_drop_capabilities: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_ipc: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_network: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_pid: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_ports: Option<Vec<HostPortRange>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_root_filesystem: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs_group: Option<RuleStrategy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_user: Option<RuleStrategy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplemental_groups: Option<RuleStrategy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "seLinux")]
    pub se_linux: Option<SeLinuxStrategy>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct HostPortRange {
    pub min: i32,
    pub max: i32,
}

/// Constrains a user or group ID to a set of ranges.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleStrategy {
    pub rule: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranges: Option<Vec<IdRange>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct IdRange {
    pub min: i64,
    pub max: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeLinuxStrategy {
    pub rule: String,
}
