use super::*;
use role_exporter_doc::{Condition, ValuePath};

const MANIFEST: &str = r#"
roles:
- name: api
  description: |-
    Serves the public API.
    Scales with traffic.
  run:
    scaling:
      min: 2
      max: 5
    exposed-ports:
    - name: http
      internal: 8080
      external: 80
    service-account: default
- name: worker
  run:
    scaling:
      min: 0
      max: 3
    service-account: default
    privileged: true
configuration:
  auth:
    roles:
      psp-restricted:
      - apiGroups: [extensions]
        resources: [podsecuritypolicies]
        resourceNames: [restricted]
        verbs: [use]
    cluster-roles:
      view:
      - apiGroups: [""]
        resources: [pods]
        verbs: [get, list]
    pod-security-policies:
      restricted:
        allowPrivilegeEscalation: false
    accounts:
      default:
        roles: [psp-restricted]
        cluster-roles: [view]
      idle:
        roles: [psp-restricted]
"#;

fn helm() -> ExportSettings {
    ExportSettings {
        create_helm_chart: true,
        ..Default::default()
    }
}

#[test]
fn parses_and_resolves_accounts() {
    let manifest = RoleManifest::parse(MANIFEST).unwrap();
    assert_eq!(manifest.roles.len(), 2);

    let account = manifest
        .configuration
        .authorization
        .account("default")
        .unwrap();
    assert_eq!(
        account.privilege_policies.keys().collect::<Vec<_>>(),
        vec!["restricted"]
    );
}

#[test]
fn exports_every_role() {
    let manifest = RoleManifest::parse(MANIFEST).unwrap();
    let exported = export(&manifest, &helm()).unwrap();

    assert_eq!(
        exported.iter().map(|e| e.role.as_str()).collect::<Vec<_>>(),
        vec!["api", "worker"]
    );
    assert!(exported[0].service.is_some());
    assert!(exported[1].service.is_none());
    assert_eq!(
        exported[1].deployment.condition(),
        Some(&Condition::gt(ValuePath::from("sizing.worker.count"), 0i64))
    );
}

#[test]
fn counts_account_and_role_usage() {
    let manifest = RoleManifest::parse(MANIFEST).unwrap();
    let usage = usage(&manifest).unwrap();

    assert_eq!(usage.accounts.iter().collect::<Vec<_>>(), vec![("default", 2)]);
    assert_eq!(usage.roles.get("psp-restricted"), 2);
    assert_eq!(usage.cluster_roles.get("view"), 2);
    assert_eq!(usage.accounts.get("idle"), 0);
}

#[test]
fn unknown_accounts_are_rejected() {
    let mut manifest = RoleManifest::parse(MANIFEST).unwrap();
    manifest.roles[0].run.service_account = Some("nobody".to_string());
    let error = export(&manifest, &helm()).unwrap_err();
    assert_eq!(error.to_string(), "role api uses unknown account nobody");
}

#[test]
fn failed_roles_are_named() {
    let mut manifest = RoleManifest::parse(MANIFEST).unwrap();
    manifest.roles[1].run.privilege_policy = Some("root".to_string());
    let error = export(&manifest, &helm()).unwrap_err();
    assert_eq!(error.to_string(), "failed to export role worker");
}

#[test]
fn writes_yaml_stream() {
    let manifest = RoleManifest::parse(MANIFEST).unwrap();
    let exported = export(&manifest, &ExportSettings::default()).unwrap();

    let mut out = Vec::new();
    write_documents(&exported, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();

    assert_eq!(out.matches("---\n").count(), 3, "{}", out);
    assert!(
        out.starts_with("---\n# Serves the public API.\n# Scales with traffic.\napiVersion: apps/v1\n"),
        "{}",
        out
    );
    assert!(out.contains("kind: Deployment\n"), "{}", out);
    assert!(out.contains("kind: List\n"), "{}", out);
    assert!(out.contains("# The worker role\n"), "{}", out);
}
