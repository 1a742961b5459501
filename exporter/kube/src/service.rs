use crate::{meta, settings::ExportSettings};
use anyhow::{bail, ensure, Result};
use role_exporter_core::{ExposedPort, Role};
use role_exporter_doc::{Mapping, Node};
use role_exporter_k8s_api::{type_meta, Service};
use std::collections::BTreeSet;

/// Builds the services exposing a role's pods.
pub trait ServiceBuilder {
    /// Returns `None` when the role exposes no ports.
    ///
    /// When `clustering` is set, a headless service is included so that pods may address each
    /// other directly.
    fn cluster_ip_services(
        &self,
        role: &Role,
        clustering: bool,
        settings: &ExportSettings,
    ) -> Result<Option<Node>>;
}

impl<F> ServiceBuilder for F
where
    F: Fn(&Role, bool, &ExportSettings) -> Result<Option<Node>>,
{
    fn cluster_ip_services(
        &self,
        role: &Role,
        clustering: bool,
        settings: &ExportSettings,
    ) -> Result<Option<Node>> {
        (self)(role, clustering, settings)
    }
}

/// Builds a `List` of cluster-IP services covering all of a role's exposed ports.
#[derive(Copy, Clone, Debug, Default)]
pub struct ClusterIpServices(());

impl ServiceBuilder for ClusterIpServices {
    fn cluster_ip_services(
        &self,
        role: &Role,
        clustering: bool,
        _: &ExportSettings,
    ) -> Result<Option<Node>> {
        if role.run.exposed_ports.is_empty() {
            return Ok(None);
        }

        let mut names = BTreeSet::new();
        let mut ports = Vec::with_capacity(role.run.exposed_ports.len());
        for port in &role.run.exposed_ports {
            validate_port_name(&port.name)?;
            if !names.insert(port.name.as_str()) {
                bail!("role {} exposes port {} more than once", role.name, port.name);
            }
            ports.push(service_port(port));
        }

        let mut items = Vec::with_capacity(2);
        if clustering {
            let name = format!("{}-set", role.name);
            items.push(service(role, &name, ports.clone(), true));
        }
        items.push(service(role, &role.name, ports, false));

        let mut list = Mapping::new();
        list.add("apiVersion", "v1")
            .add("items", items)
            .add("kind", "List");
        Ok(Some(list.into()))
    }
}

fn service(role: &Role, name: &str, ports: Vec<Node>, headless: bool) -> Node {
    let mut spec = Mapping::new();
    if headless {
        spec.add("clusterIP", "None");
    }
    spec.add("ports", ports)
        .add("selector", meta::role_labels(&role.name));

    let (api_version, kind) = type_meta::<Service>();
    let mut svc = meta::new_kube_config(api_version, kind, name, &role.name, None);
    svc.add("spec", spec);
    svc.sorted().into()
}

fn service_port(port: &ExposedPort) -> Node {
    let mut p = Mapping::new();
    p.add("name", port.name.as_str())
        .add("port", port.external())
        .add("protocol", port.protocol.as_str())
        .add("targetPort", port.internal);
    p.into()
}

/// Port names must be IANA service names, since services refer to them.
fn validate_port_name(name: &str) -> Result<()> {
    ensure!(
        !name.is_empty() && name.len() <= 15,
        "port name {:?} must be between 1 and 15 characters",
        name
    );
    ensure!(
        name.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
        "port name {:?} may only contain lowercase letters, digits and '-'",
        name
    );
    ensure!(
        name.chars().any(|c| c.is_ascii_lowercase()),
        "port name {:?} must contain a letter",
        name
    );
    ensure!(
        !name.starts_with('-') && !name.ends_with('-') && !name.contains("--"),
        "port name {:?} may not begin or end with '-' or contain '--'",
        name
    );
    Ok(())
}
