//! Assembles Kubernetes manifests for roles.
//!
//! Each role becomes a `Deployment` and, when the role exposes ports, a list of `Service`s. The
//! same documents serve two rendering modes:
//!
//! - Static: concrete values only, ready to apply.
//! - Templated (`ExportSettings::create_helm_chart`): the replica count refers to a sizing
//!   value supplied at render time, and parts of the documents are guarded by conditions over
//!   that value and the target orchestrator's version. Guards that must abort rendering are
//!   emitted as `fail` directives rather than reported here.
//!
//! ```text
//! [ Role ] -> [ pod template ] -+-> [ Deployment spec ] -> [ replica policy ] -> [ Deployment ]
//!          -> [ services ] ------------------------------------------------------> [ List ]
//! ```

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod compat;
mod deployment;
mod error;
mod meta;
pub mod pod;
mod replicas;
pub mod service;
mod settings;

pub use self::{
    deployment::Assembler,
    error::Error,
    pod::{DefaultPodTemplate, PodTemplateBuilder},
    replicas::sizing_count,
    service::{ClusterIpServices, ServiceBuilder},
    settings::ExportSettings,
};
