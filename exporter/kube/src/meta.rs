use role_exporter_doc::Mapping;
use role_exporter_k8s_api::ROLE_LABEL;

/// Creates the skeleton of a top-level resource document.
pub(crate) fn new_kube_config(
    api_version: &str,
    kind: &str,
    name: &str,
    role: &str,
    comment: Option<String>,
) -> Mapping {
    let mut metadata = Mapping::new();
    metadata.add("labels", role_labels(role)).add("name", name);

    let mut config = match comment {
        Some(comment) => Mapping::with_comment(comment),
        None => Mapping::new(),
    };
    config
        .add("apiVersion", api_version)
        .add("kind", kind)
        .add("metadata", metadata);
    config
}

pub(crate) fn role_labels(role: &str) -> Mapping {
    let mut labels = Mapping::new();
    labels.add(ROLE_LABEL, role);
    labels
}

/// Selects the pods of a role.
pub(crate) fn new_selector(role: &str) -> Mapping {
    let mut selector = Mapping::new();
    selector.add("matchLabels", role_labels(role));
    selector
}
