/// Errors that abort the assembly of a role's documents.
///
/// No documents are returned for a role that fails. Failures are deterministic functions of the
/// input and are not retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    PodTemplate(anyhow::Error),

    #[error(transparent)]
    Service(anyhow::Error),

    #[error("failed to encode affinity of role {role}")]
    Affinity {
        role: String,
        #[source]
        source: serde_json::Error,
    },
}
