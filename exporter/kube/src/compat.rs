//! Orchestrator version compatibility.
//!
//! Some features are expressed differently depending on the version of the cluster a document is
//! rendered for. Each feature has a table of rules; each rule pairs a render-time version
//! condition with the form the feature takes under it. Conditions within a table are mutually
//! exclusive and together cover every version from 1.0 on, so exactly one form is emitted.

use role_exporter_doc::{Condition, Operand};

/// The annotation through which clusters older than 1.6 read affinity.
pub const SCHEDULER_AFFINITY_ANNOTATION: &str = "scheduler.alpha.kubernetes.io/affinity";

/// How a pod's affinity is declared.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AffinityStrategy {
    /// The `affinity` field of the pod spec (1.6 and later).
    PodSpecField,

    /// A JSON-encoded annotation on the pod template (1.5 and earlier).
    SchedulerAnnotation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompatRule<S> {
    pub condition: Condition,
    pub strategy: S,
}

/// The form affinity takes in static documents, which are rendered without knowledge of the
/// target version.
pub const STATIC_AFFINITY: AffinityStrategy = AffinityStrategy::SchedulerAnnotation;

pub fn affinity_rules() -> Vec<CompatRule<AffinityStrategy>> {
    vec![
        CompatRule {
            condition: Condition::gt(Operand::KubeMajor, 1i64)
                .or(Condition::gt(Operand::KubeMinor, 5i64)),
            strategy: AffinityStrategy::PodSpecField,
        },
        CompatRule {
            condition: Condition::eq(Operand::KubeMajor, 1i64)
                .and(Condition::le(Operand::KubeMinor, 5i64)),
            strategy: AffinityStrategy::SchedulerAnnotation,
        },
    ]
}
