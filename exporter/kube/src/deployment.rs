use crate::{
    meta,
    pod::{DefaultPodTemplate, PodTemplateBuilder},
    replicas,
    service::{ClusterIpServices, ServiceBuilder},
    settings::ExportSettings,
    Error,
};
use role_exporter_core::{Authorization, Role};
use role_exporter_doc::{Mapping, Node};
use role_exporter_k8s_api::{type_meta, Deployment};
use tracing::{debug, debug_span};

/// Assembles a role's controller and the services exposing it.
///
/// Assembly has no side effects; each call builds fresh documents, so roles may be assembled
/// concurrently.
#[derive(Clone, Debug, Default)]
pub struct Assembler<P = DefaultPodTemplate, S = ClusterIpServices> {
    pods: P,
    services: S,
}

// === impl Assembler ===

impl Assembler {
    /// An assembler using the default pod template, which resolves privilege policies against
    /// `authorization`, and cluster-IP services.
    pub fn with_authorization(authorization: Authorization) -> Self {
        Self::new(
            DefaultPodTemplate::new(authorization),
            ClusterIpServices::default(),
        )
    }
}

impl<P, S> Assembler<P, S>
where
    P: PodTemplateBuilder,
    S: ServiceBuilder,
{
    pub fn new(pods: P, services: S) -> Self {
        Self { pods, services }
    }

    /// Returns the role's `Deployment` and its service list, if any.
    ///
    /// Both documents are returned with their keys sorted.
    pub fn deployment(
        &self,
        role: &Role,
        settings: &ExportSettings,
    ) -> Result<(Node, Option<Node>), Error> {
        let _span = debug_span!("deployment", role = %role.name).entered();

        let pod_template = self
            .pods
            .pod_template(role, settings)
            .map_err(Error::PodTemplate)?;
        let mut service = self
            .services
            .cluster_ip_services(role, false, settings)
            .map_err(Error::Service)?;

        let mut spec = Mapping::new();
        spec.add("selector", meta::new_selector(&role.name));
        spec.add("template", pod_template);

        let (api_version, kind) = type_meta::<Deployment>();
        let mut deployment = meta::new_kube_config(
            api_version,
            kind,
            &role.name,
            &role.name,
            Some(role.long_description()),
        );
        let visibility = replicas::replica_check(role, &mut deployment, &mut spec, settings)?;
        deployment.add("spec", spec.sorted());

        let mut deployment = Node::from(deployment.sorted());
        if let Some(condition) = visibility {
            debug!(%condition, "guarding deployment and services");
            if let Some(service) = service.as_mut() {
                service.guard(condition.clone());
            }
            deployment.guard(condition);
        }

        Ok((deployment, service))
    }
}
