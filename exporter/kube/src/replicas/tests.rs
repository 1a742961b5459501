use super::*;
use role_exporter_core::{Run, Scaling};
use role_exporter_doc::RenderContext;
use role_exporter_k8s_api::api::core::v1::{
    NodeAffinity, NodeSelector, NodeSelectorRequirement, NodeSelectorTerm,
};

fn role(name: &str, min: u32, max: u32) -> Role {
    Role {
        name: name.to_string(),
        run: Run {
            scaling: Scaling {
                min,
                max,
                desired: None,
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

fn affinity() -> Affinity {
    Affinity {
        node_affinity: Some(NodeAffinity {
            required_during_scheduling_ignored_during_execution: Some(NodeSelector {
                node_selector_terms: vec![NodeSelectorTerm {
                    match_expressions: Some(vec![NodeSelectorRequirement {
                        key: "disktype".to_string(),
                        operator: "In".to_string(),
                        values: Some(vec!["ssd".to_string()]),
                    }]),
                    ..Default::default()
                }],
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn pod_spec() -> Mapping {
    let mut template = Mapping::new();
    template.add("metadata", Mapping::new());
    template.add("spec", Mapping::new());
    let mut spec = Mapping::new();
    spec.add("template", template);
    spec
}

fn helm() -> ExportSettings {
    ExportSettings {
        create_helm_chart: true,
        ..Default::default()
    }
}

#[test]
fn static_replicas_are_literal() {
    let mut controller = Mapping::new();
    let mut spec = pod_spec();
    let visibility =
        replica_check(&role("api", 2, 5), &mut controller, &mut spec, &Default::default())
            .unwrap();

    assert_eq!(visibility, None);
    assert_eq!(spec.get("replicas"), Some(&Node::from(2u32)));
    assert!(controller.is_empty(), "static documents carry no guards");
}

#[test]
fn templated_bounds() {
    let mut controller = Mapping::new();
    let mut spec = pod_spec();
    let visibility = replica_check(&role("api", 2, 5), &mut controller, &mut spec, &helm()).unwrap();

    assert_eq!(visibility, None);
    let count = ValuePath::from("sizing.api.count");
    assert_eq!(spec.get("replicas"), Some(&Node::from(Scalar::Ref(count.clone()))));
    assert_eq!(
        controller.get("_minReplicas"),
        Some(
            &Node::from(Scalar::Fail("api must have at least 2 instances".to_string()))
                .guarded(Condition::lt(count.clone(), 2i64))
        )
    );
    assert_eq!(
        controller.get("_maxReplicas"),
        Some(
            &Node::from(Scalar::Fail("api cannot have more than 5 instances".to_string()))
                .guarded(Condition::gt(count, 5i64))
        )
    );
}

#[test]
fn zero_minimum_hides_instead_of_failing() {
    let mut controller = Mapping::new();
    let mut spec = pod_spec();
    let visibility =
        replica_check(&role("worker", 0, 3), &mut controller, &mut spec, &helm()).unwrap();

    let count = ValuePath::from("sizing.worker.count");
    assert_eq!(visibility, Some(Condition::gt(count, 0i64)));
    assert!(!controller.contains_key("_minReplicas"));
    assert!(controller.contains_key("_maxReplicas"));
}

#[test]
fn var_names_are_used_in_values_and_messages() {
    let mut controller = Mapping::new();
    let mut spec = pod_spec();
    replica_check(&role("api-server", 1, 1), &mut controller, &mut spec, &helm()).unwrap();

    assert_eq!(
        spec.get("replicas"),
        Some(&Node::from(Scalar::Ref(ValuePath::from("sizing.api_server.count"))))
    );
    assert_eq!(
        controller.get("_maxReplicas").and_then(Node::as_scalar),
        Some(&Scalar::Fail("api_server cannot have more than 1 instances".to_string()))
    );
}

/// Which failure guards fire for a given count.
fn failures(controller: &Mapping, count: i64) -> Vec<&str> {
    let ctx = RenderContext::new(1, 30).with_value("sizing.api.count", count);
    controller
        .iter()
        .filter(|(_, node)| {
            node.condition()
                .map(|c| c.evaluate(&ctx).unwrap())
                .unwrap_or(false)
        })
        .map(|(key, _)| key)
        .collect()
}

#[test]
fn failure_guards_fire_outside_bounds() {
    let mut controller = Mapping::new();
    replica_check(&role("api", 2, 5), &mut controller, &mut pod_spec(), &helm()).unwrap();

    for (count, expected) in [
        (0, vec!["_minReplicas"]),
        (1, vec!["_minReplicas"]),
        (2, vec![]),
        (5, vec![]),
        (6, vec!["_maxReplicas"]),
    ] {
        assert_eq!(failures(&controller, count), expected, "count={}", count);
    }
}

#[test]
fn fixed_size_roles_only_accept_their_size() {
    let mut controller = Mapping::new();
    replica_check(&role("api", 3, 3), &mut controller, &mut pod_spec(), &helm()).unwrap();

    assert_eq!(failures(&controller, 2), vec!["_minReplicas"]);
    assert!(failures(&controller, 3).is_empty());
    assert_eq!(failures(&controller, 4), vec!["_maxReplicas"]);
}

#[test]
fn inverted_bounds_always_fail() {
    let mut controller = Mapping::new();
    replica_check(&role("api", 5, 2), &mut controller, &mut pod_spec(), &helm()).unwrap();

    for count in 0..10 {
        assert!(!failures(&controller, count).is_empty(), "count={}", count);
    }
    assert_eq!(failures(&controller, 3), vec!["_minReplicas", "_maxReplicas"]);
}

#[test]
fn templated_affinity_has_one_form_per_version() {
    let mut role = role("api", 1, 1);
    role.run.affinity = Some(affinity());
    let mut spec = pod_spec();
    replica_check(&role, &mut Mapping::new(), &mut spec, &helm()).unwrap();

    let field = spec.get_path(&["template", "spec", "affinity"]).unwrap();
    let annotation = spec
        .get_path(&["template", "metadata", "annotations", SCHEDULER_AFFINITY_ANNOTATION])
        .unwrap();

    assert_eq!(
        field.unguarded(),
        &Node::from_serializable(&affinity()).unwrap()
    );
    assert_eq!(
        annotation.as_scalar(),
        Some(&Scalar::Str(serde_json::to_string(&affinity()).unwrap()))
    );

    for major in 1..=2 {
        for minor in 0..=30 {
            let ctx = RenderContext::new(major, minor);
            let field = field.condition().unwrap().evaluate(&ctx).unwrap();
            let annotation = annotation.condition().unwrap().evaluate(&ctx).unwrap();
            assert!(field != annotation, "{}.{}", major, minor);
            assert_eq!(field, major > 1 || minor > 5, "{}.{}", major, minor);
        }
    }
}

#[test]
fn static_affinity_is_an_annotation() {
    let mut role = role("api", 1, 1);
    role.run.affinity = Some(affinity());
    let mut spec = pod_spec();
    replica_check(&role, &mut Mapping::new(), &mut spec, &Default::default()).unwrap();

    assert!(spec.get_path(&["template", "spec", "affinity"]).is_none());
    let annotation = spec
        .get_path(&["template", "metadata", "annotations", SCHEDULER_AFFINITY_ANNOTATION])
        .unwrap();
    assert!(annotation.condition().is_none());
    let decoded: Affinity = match annotation.as_scalar() {
        Some(Scalar::Str(json)) => serde_json::from_str(json).unwrap(),
        other => panic!("unexpected annotation {:?}", other),
    };
    assert_eq!(decoded, affinity());
}

#[test]
fn existing_annotations_are_kept() {
    let mut role = role("api", 1, 1);
    role.run.affinity = Some(affinity());
    let mut spec = pod_spec();
    spec.get_mapping_mut(&["template", "metadata"])
        .unwrap()
        .mapping_entry("annotations")
        .add("example.com/owner", "team");
    replica_check(&role, &mut Mapping::new(), &mut spec, &helm()).unwrap();

    let annotations = spec
        .get_path(&["template", "metadata", "annotations"])
        .and_then(Node::as_mapping)
        .unwrap();
    assert_eq!(
        annotations.keys().collect::<Vec<_>>(),
        vec!["example.com/owner", SCHEDULER_AFFINITY_ANNOTATION]
    );
}
