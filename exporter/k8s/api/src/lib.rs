#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod pod_security_policy;

pub use self::pod_security_policy::PodSecurityPolicySpec;
pub use k8s_openapi::{
    api::{
        self,
        apps::v1::Deployment,
        core::v1::{Affinity, Service},
    },
    Resource,
};

/// The label identifying the pods that belong to a role. Controllers select over it and services
/// route to it.
pub const ROLE_LABEL: &str = "app.kubernetes.io/component";

/// Returns the `apiVersion` and `kind` of a resource type.
pub fn type_meta<T: Resource>() -> (&'static str, &'static str) {
    (T::API_VERSION, T::KIND)
}
