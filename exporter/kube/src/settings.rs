use role_exporter_core::Role;
use serde::{Deserialize, Serialize};

/// Controls how roles are exported.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExportSettings {
    /// Emits templated documents rather than static ones.
    pub create_helm_chart: bool,

    pub registry: String,
    pub organization: String,
    pub tag: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            create_helm_chart: false,
            registry: "docker.io".to_string(),
            organization: "library".to_string(),
            tag: "latest".to_string(),
        }
    }
}

impl ExportSettings {
    /// The image a role's containers run.
    pub fn image(&self, role: &Role) -> String {
        format!(
            "{}/{}/{}:{}",
            self.registry, self.organization, role.name, self.tag
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_use_defaults() {
        let settings: ExportSettings =
            serde_yaml::from_str("create-helm-chart: true\ntag: v1.2.3\n").unwrap();
        assert!(settings.create_helm_chart);
        assert_eq!(settings.registry, "docker.io");

        let role = Role {
            name: "api".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.image(&role), "docker.io/library/api:v1.2.3");
    }
}
