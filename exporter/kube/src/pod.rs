use crate::{meta, settings::ExportSettings};
use anyhow::{bail, Result};
use role_exporter_core::{privilege, Authorization, PrivilegePolicy, Role};
use role_exporter_doc::{Mapping, Node};

/// Builds the pod template of a role's controller.
pub trait PodTemplateBuilder {
    /// Returns a mapping with `metadata` and `spec` entries.
    fn pod_template(&self, role: &Role, settings: &ExportSettings) -> Result<Mapping>;
}

impl<F> PodTemplateBuilder for F
where
    F: Fn(&Role, &ExportSettings) -> Result<Mapping>,
{
    fn pod_template(&self, role: &Role, settings: &ExportSettings) -> Result<Mapping> {
        (self)(role, settings)
    }
}

/// Builds a single-container pod template. The container's security context is derived from
/// the privilege policy the role requests.
#[derive(Clone, Debug, Default)]
pub struct DefaultPodTemplate {
    authorization: Authorization,
}

// === impl DefaultPodTemplate ===

impl DefaultPodTemplate {
    pub fn new(authorization: Authorization) -> Self {
        Self { authorization }
    }

    /// Resolves the privilege policy a role's containers run under.
    pub fn privilege_policy(&self, role: &Role) -> Result<PrivilegePolicy> {
        let name = role
            .run
            .privilege_policy
            .as_deref()
            .unwrap_or(privilege::default_policy_name());
        let Some(policy) = privilege::resolve(&self.authorization, name) else {
            bail!(
                "role {} requests unknown privilege policy {:?}",
                role.name,
                name
            );
        };

        if role.run.privileged {
            return Ok(policy.clone_as_privileged());
        }
        Ok(policy)
    }
}

impl PodTemplateBuilder for DefaultPodTemplate {
    fn pod_template(&self, role: &Role, settings: &ExportSettings) -> Result<Mapping> {
        let policy = self.privilege_policy(role)?;
        let mut security_context = Mapping::new();
        security_context.add(
            "allowPrivilegeEscalation",
            policy.privilege_escalation_allowed(),
        );
        if policy.spec().privileged == Some(true) {
            security_context.add("privileged", true);
        }

        let mut container = Mapping::new();
        container
            .add("image", settings.image(role))
            .add("name", role.name.as_str())
            .add("securityContext", security_context);
        if !role.run.exposed_ports.is_empty() {
            let ports = role
                .run
                .exposed_ports
                .iter()
                .map(|port| {
                    let mut p = Mapping::new();
                    p.add("containerPort", port.internal)
                        .add("name", port.name.as_str())
                        .add("protocol", port.protocol.as_str());
                    Node::from(p)
                })
                .collect::<Vec<_>>();
            container.add("ports", ports);
        }
        container.sort();

        let mut spec = Mapping::new();
        spec.add("containers", vec![Node::from(container)]);
        if let Some(account) = role.run.service_account.as_deref() {
            spec.add("serviceAccountName", account);
        }

        let mut metadata = Mapping::new();
        metadata
            .add("labels", meta::role_labels(&role.name))
            .add("name", role.name.as_str());

        let mut template = Mapping::new();
        template.add("metadata", metadata).add("spec", spec.sorted());
        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use role_exporter_core::{privilege::PRIVILEGED, ExposedPort, Run};
    use role_exporter_k8s_api::PodSecurityPolicySpec;

    fn role(run: Run) -> Role {
        Role {
            name: "api".to_string(),
            run,
            ..Default::default()
        }
    }

    fn escalation(template: &Mapping) -> Option<&Node> {
        let containers = template.get_path(&["spec", "containers"])?.as_sequence()?;
        containers[0]
            .as_mapping()?
            .get_path(&["securityContext", "allowPrivilegeEscalation"])
    }

    #[test]
    fn builds_template() {
        let template = DefaultPodTemplate::default()
            .pod_template(
                &role(Run {
                    exposed_ports: vec![ExposedPort {
                        name: "http".to_string(),
                        protocol: "TCP".to_string(),
                        internal: 8080,
                        external: None,
                    }],
                    service_account: Some("api-account".to_string()),
                    ..Default::default()
                }),
                &ExportSettings::default(),
            )
            .unwrap();

        assert_eq!(
            serde_json::to_value(&template).unwrap(),
            serde_json::json!({
                "metadata": {
                    "labels": { "app.kubernetes.io/component": "api" },
                    "name": "api",
                },
                "spec": {
                    "containers": [{
                        "image": "docker.io/library/api:latest",
                        "name": "api",
                        "ports": [{ "containerPort": 8080, "name": "http", "protocol": "TCP" }],
                        "securityContext": { "allowPrivilegeEscalation": false },
                    }],
                    "serviceAccountName": "api-account",
                },
            })
        );
    }

    #[test]
    fn privilege_policies() {
        let pods = DefaultPodTemplate::new(Authorization {
            privilege_policies: btreemap! {
                "escalating".to_string() => PrivilegePolicy::new(PodSecurityPolicySpec {
                    allow_privilege_escalation: Some(true),
                    ..Default::default()
                }),
            },
            ..Default::default()
        });
        let settings = ExportSettings::default();

        for (policy, privileged, expected, msg) in [
            (None, false, false, "default policy"),
            (None, true, true, "privileged role widens the default policy"),
            (Some(PRIVILEGED), false, true, "built-in privileged policy"),
            (Some("escalating"), false, true, "declared policy"),
        ] {
            let role = role(Run {
                privilege_policy: policy.map(str::to_string),
                privileged,
                ..Default::default()
            });
            let template = pods.pod_template(&role, &settings).unwrap();
            assert_eq!(escalation(&template), Some(&Node::from(expected)), "{}", msg);
        }
    }

    #[test]
    fn unset_policy_resolves_to_default() {
        let pods = DefaultPodTemplate::default();
        let role = role(Run::default());
        assert_eq!(
            pods.privilege_policy(&role).unwrap(),
            privilege::resolve(&Authorization::default(), privilege::default_policy_name())
                .unwrap()
        );
    }

    #[test]
    fn unknown_privilege_policy() {
        let role = role(Run {
            privilege_policy: Some("root".to_string()),
            ..Default::default()
        });
        let error = DefaultPodTemplate::default()
            .pod_template(&role, &ExportSettings::default())
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            r#"role api requests unknown privilege policy "root""#
        );
    }
}
