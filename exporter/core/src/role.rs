use role_exporter_k8s_api::Affinity;
use serde::{Deserialize, Serialize};

/// A named workload definition.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Role {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub run: Run,
}

/// Describes how a role's pods run.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Run {
    #[serde(default)]
    pub scaling: Scaling,

    /// An orchestrator-native affinity rule, passed through opaquely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<Affinity>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exposed_ports: Vec<ExposedPort>,

    /// Names the authorization account the role's pods run as.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,

    /// Names the privilege level requested by the role. Defaults to `nonprivileged`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privilege_policy: Option<String>,

    /// Indicates that the role's containers require privilege escalation regardless of the
    /// policy they are bound to.
    #[serde(default)]
    pub privileged: bool,
}

/// Scaling bounds.
///
/// `min <= desired` is expected and `max` is a hard ceiling. These are not validated here.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Scaling {
    pub min: u32,
    pub max: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExposedPort {
    pub name: String,

    #[serde(default = "ExposedPort::default_protocol")]
    pub protocol: String,

    /// The port the container listens on.
    pub internal: u16,

    /// The port the service exposes. Defaults to the internal port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<u16>,
}

// === impl Role ===

impl Role {
    /// Returns the role's name in a form usable as a template variable.
    pub fn var_name(&self) -> String {
        self.name.replace('-', "_")
    }

    /// A human-readable description, used to comment the role's controller.
    pub fn long_description(&self) -> String {
        let description = self.description.trim();
        if description.is_empty() {
            return format!("The {} role", self.name);
        }
        description.to_string()
    }
}

// === impl Scaling ===

impl Default for Scaling {
    fn default() -> Self {
        Self {
            min: 1,
            max: 1,
            desired: None,
        }
    }
}

// === impl ExposedPort ===

impl ExposedPort {
    fn default_protocol() -> String {
        "TCP".to_string()
    }

    pub fn external(&self) -> u16 {
        self.external.unwrap_or(self.internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_role() {
        let role: Role = serde_yaml::from_str(
            r#"
name: api-server
description: Serves the API
run:
  scaling:
    min: 2
    max: 5
  exposed-ports:
  - name: http
    internal: 8080
    external: 80
  service-account: api
"#,
        )
        .unwrap();

        assert_eq!(role.var_name(), "api_server");
        assert_eq!(role.long_description(), "Serves the API");
        assert_eq!(
            role.run.scaling,
            Scaling {
                min: 2,
                max: 5,
                desired: None
            }
        );
        assert_eq!(role.run.exposed_ports[0].protocol, "TCP");
        assert_eq!(role.run.exposed_ports[0].external(), 80);
        assert_eq!(role.run.service_account.as_deref(), Some("api"));
        assert!(role.run.affinity.is_none());
        assert!(!role.run.privileged);
    }

    #[test]
    fn defaults() {
        let role: Role = serde_yaml::from_str("name: worker").unwrap();
        assert_eq!(role.run.scaling, Scaling::default());
        assert_eq!(role.long_description(), "The worker role");
        assert!(role.run.exposed_ports.is_empty());
    }
}
