//! Exports the roles of a role manifest as Kubernetes documents.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod args;

pub use self::args::Args;
use anyhow::{bail, Context, Result};
use role_exporter_core::{Configuration, PrivilegePolicy, Role, UsageCounts};
use role_exporter_doc::{Mapping, Node};
use role_exporter_kube::{Assembler, ExportSettings};
use serde::Deserialize;
use std::{io::Write, path::Path};
use tracing::{debug, info, warn};

/// A set of roles and the configuration they share.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RoleManifest {
    #[serde(default)]
    pub roles: Vec<Role>,

    #[serde(default)]
    pub configuration: Configuration,
}

/// The documents exported for a single role.
#[derive(Clone, Debug, PartialEq)]
pub struct Exported {
    pub role: String,
    pub deployment: Node,
    pub service: Option<Node>,
}

// === impl RoleManifest ===

impl RoleManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Parses a manifest and computes the privilege policies of its accounts.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut manifest: Self = serde_yaml::from_str(contents)?;
        manifest
            .configuration
            .authorization
            .resolve_account_policies();
        Ok(manifest)
    }
}

/// How often the roles of a manifest reference each account and authorization role.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Usage {
    pub accounts: UsageCounts,
    pub roles: UsageCounts,
    pub cluster_roles: UsageCounts,
}

/// Counts the accounts used by the manifest's roles and the authorization roles those accounts
/// are bound to. Fails on a role that names an unknown account.
pub fn usage(manifest: &RoleManifest) -> Result<Usage> {
    let auth = &manifest.configuration.authorization;
    let mut usage = Usage::default();
    for role in &manifest.roles {
        let Some(name) = role.run.service_account.as_deref() else {
            continue;
        };
        let Some(account) = auth.account(name) else {
            bail!("role {} uses unknown account {}", role.name, name);
        };
        usage.accounts.record(name);
        for auth_role in &account.roles {
            usage.roles.record(auth_role.as_str());
        }
        for cluster_role in &account.cluster_roles {
            usage.cluster_roles.record(cluster_role.as_str());
        }

        if role.run.privileged
            && !account
                .privilege_policies
                .values()
                .any(PrivilegePolicy::privilege_escalation_allowed)
        {
            warn!(
                role = %role.name,
                account = %name,
                "privileged role's account grants no policy allowing privilege escalation"
            );
        }
    }
    Ok(usage)
}

/// Assembles every role of the manifest. Fails on the first role that cannot be exported.
pub fn export(manifest: &RoleManifest, settings: &ExportSettings) -> Result<Vec<Exported>> {
    let usage = usage(manifest)?;
    let assembler = Assembler::with_authorization(manifest.configuration.authorization.clone());

    let mut exported = Vec::with_capacity(manifest.roles.len());
    for role in &manifest.roles {
        let (deployment, service) = assembler
            .deployment(role, settings)
            .with_context(|| format!("failed to export role {}", role.name))?;
        info!(role = %role.name, services = service.is_some(), "exported");
        exported.push(Exported {
            role: role.name.clone(),
            deployment,
            service,
        });
    }

    for (account, roles) in usage.accounts.iter() {
        debug!(%account, roles, "account usage");
    }
    for (role, accounts) in usage.roles.iter() {
        debug!(%role, accounts, "role usage");
    }
    for (cluster_role, accounts) in usage.cluster_roles.iter() {
        debug!(%cluster_role, accounts, "cluster role usage");
    }

    Ok(exported)
}

/// Writes documents as a YAML stream. Mapping comments are written as YAML comments.
pub fn write_documents<W: Write>(exported: &[Exported], mut out: W) -> Result<()> {
    let docs = exported
        .iter()
        .flat_map(|e| std::iter::once(&e.deployment).chain(e.service.as_ref()));
    for doc in docs {
        writeln!(out, "---")?;
        if let Some(comment) = doc.as_mapping().and_then(Mapping::comment) {
            for line in comment.lines() {
                writeln!(out, "# {}", line)?;
            }
        }
        out.write_all(serde_yaml::to_string(doc)?.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests;
