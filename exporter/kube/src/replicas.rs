use crate::{
    compat::{self, AffinityStrategy, SCHEDULER_AFFINITY_ANNOTATION},
    settings::ExportSettings,
    Error,
};
use role_exporter_core::Role;
use role_exporter_doc::{Condition, Mapping, Node, Scalar, ValuePath};
use role_exporter_k8s_api::Affinity;
use tracing::debug;

/// The render-time value holding the number of instances of a role.
pub fn sizing_count(role: &Role) -> ValuePath {
    ValuePath::new(["sizing".to_string(), role.var_name(), "count".to_string()])
}

/// Sets the replica count of a controller and enforces the role's scaling bounds.
///
/// `spec` is the controller's spec, holding the pod template. Bounds violations are not errors
/// here: templated documents carry `fail` directives that abort rendering when the supplied
/// count is out of range.
///
/// Returns the condition under which the controller and its service exist at all, if they may
/// be hidden.
pub(crate) fn replica_check(
    role: &Role,
    controller: &mut Mapping,
    spec: &mut Mapping,
    settings: &ExportSettings,
) -> Result<Option<Condition>, Error> {
    if let Some(affinity) = role.run.affinity.as_ref() {
        set_affinity(role, affinity, spec, settings)?;
    }

    let scaling = role.run.scaling;
    if !settings.create_helm_chart {
        spec.add("replicas", scaling.min);
        return Ok(None);
    }

    let count = sizing_count(role);
    let name = role.var_name();
    spec.add("replicas", Scalar::Ref(count.clone()));

    let mut visibility = None;
    if scaling.min == 0 {
        debug!(%count, "role may scale to zero");
        visibility = Some(Condition::gt(count.clone(), 0i64));
    } else {
        controller.add_guarded(
            "_minReplicas",
            Scalar::Fail(format!(
                "{} must have at least {} instances",
                name, scaling.min
            )),
            Condition::lt(count.clone(), scaling.min),
        );
    }

    // Min and max are not checked against each other. A role with min > max fails for
    // every count.
    controller.add_guarded(
        "_maxReplicas",
        Scalar::Fail(format!(
            "{} cannot have more than {} instances",
            name, scaling.max
        )),
        Condition::gt(count, scaling.max),
    );

    Ok(visibility)
}

fn set_affinity(
    role: &Role,
    affinity: &Affinity,
    spec: &mut Mapping,
    settings: &ExportSettings,
) -> Result<(), Error> {
    let encoding_failed = |source| Error::Affinity {
        role: role.name.clone(),
        source,
    };

    let rules: Vec<(AffinityStrategy, Option<Condition>)> = if settings.create_helm_chart {
        compat::affinity_rules()
            .into_iter()
            .map(|rule| (rule.strategy, Some(rule.condition)))
            .collect()
    } else {
        vec![(compat::STATIC_AFFINITY, None)]
    };

    for (strategy, condition) in rules {
        debug!(?strategy, guarded = condition.is_some(), "setting affinity");
        let template = spec.mapping_entry("template");
        match strategy {
            AffinityStrategy::PodSpecField => {
                let value = Node::from_serializable(affinity).map_err(encoding_failed)?;
                let pod_spec = template.mapping_entry("spec");
                pod_spec.add("affinity", guard(value, condition));
                pod_spec.sort();
            }

            AffinityStrategy::SchedulerAnnotation => {
                let json = serde_json::to_string(affinity).map_err(encoding_failed)?;
                let meta = template.mapping_entry("metadata");
                if !meta.contains_key("annotations") {
                    meta.add("annotations", Mapping::new());
                    meta.sort();
                }
                meta.mapping_entry("annotations")
                    .add(SCHEDULER_AFFINITY_ANNOTATION, guard(json.into(), condition));
            }
        }
    }

    Ok(())
}

fn guard(node: Node, condition: Option<Condition>) -> Node {
    match condition {
        Some(condition) => node.guarded(condition),
        None => node,
    }
}

#[cfg(test)]
mod tests;
