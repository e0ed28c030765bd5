//! End-to-end behaviour of the rollout policy on Deployments.

use frontdoor_rollout::{
    compute_rollout_policy, select_policy, ApplyOutcome, Budget, ClusterSnapshot,
    DefaultReplicaPolicy, EndpointPublishingStrategyType, PlacementPreference, StrategyDirective,
    TopologyDefaultReplicas, TopologyMode,
};
use frontdoor_testing::{
    any_cluster, any_strategy_type, customized_deployment, ha_cluster, multi_replica_snapshot,
    replica_count, selector, service_backed_strategy_type, single_replica_snapshot,
    unrecognized_strategy_type, workload,
};
use frontdoor_labels::LabelKeys;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use proptest::prelude::*;
use rstest::rstest;

fn percent(s: &str) -> Option<IntOrString> {
    Some(IntOrString::String(s.to_string()))
}

/// Default policy that a test can tell apart from any explicit count.
fn sentinel_defaults(_: &ClusterSnapshot) -> i32 {
    -1
}

#[rstest]
#[case::private(EndpointPublishingStrategyType::Private)]
#[case::load_balancer(EndpointPublishingStrategyType::LoadBalancerService)]
#[case::node_port(EndpointPublishingStrategyType::NodePortService)]
fn service_backed_three_replicas(#[case] strategy: EndpointPublishingStrategyType) {
    let spec = workload(strategy).with_replicas(3);
    let policy = compute_rollout_policy(&spec, &ha_cluster(), &TopologyDefaultReplicas);

    let mut deployment = Deployment::default();
    let pending = policy
        .apply(&mut deployment, &LabelKeys::default())
        .into_pending()
        .expect("service-backed policy needs a generation hash");
    pending.bind(&mut deployment, &selector("7f9c6d"));

    let spec = deployment.spec.unwrap();
    assert_eq!(spec.replicas, Some(3));

    let rolling = spec.strategy.unwrap().rolling_update.unwrap();
    assert_eq!(rolling.max_unavailable, percent("50%"));
    assert_eq!(rolling.max_surge, percent("25%"));

    let affinity = spec.template.spec.unwrap().affinity.unwrap();
    let preferred = affinity
        .pod_affinity
        .unwrap()
        .preferred_during_scheduling_ignored_during_execution
        .unwrap();
    assert_eq!(preferred.len(), 1);
    assert_eq!(preferred[0].weight, 100);
    assert_eq!(preferred[0].pod_affinity_term.topology_key, "kubernetes.io/hostname");
    let preferred_hash = &preferred[0]
        .pod_affinity_term
        .label_selector
        .as_ref()
        .and_then(|s| s.match_expressions.as_ref())
        .unwrap()[1];
    assert_eq!(preferred_hash.operator, "NotIn");
    assert_eq!(preferred_hash.values, Some(vec!["7f9c6d".to_string()]));

    let required = affinity
        .pod_anti_affinity
        .unwrap()
        .required_during_scheduling_ignored_during_execution
        .unwrap();
    assert_eq!(required.len(), 1);
    assert_eq!(required[0].topology_key, "kubernetes.io/hostname");
    let required_hash = &required[0]
        .label_selector
        .as_ref()
        .and_then(|s| s.match_expressions.as_ref())
        .unwrap()[1];
    assert_eq!(required_hash.operator, "In");
    assert_eq!(required_hash.values, Some(vec!["7f9c6d".to_string()]));
}

#[rstest]
#[case(1, "50%")]
#[case(2, "50%")]
#[case(3, "50%")]
#[case(4, "25%")]
#[case(5, "25%")]
#[case(100, "25%")]
fn unavailable_threshold_is_inclusive_at_four(#[case] replicas: i32, #[case] expected: &str) {
    let spec = workload(EndpointPublishingStrategyType::LoadBalancerService).with_replicas(replicas);
    let policy = compute_rollout_policy(&spec, &ha_cluster(), &TopologyDefaultReplicas);

    let mut deployment = Deployment::default();
    policy.apply_bound(&mut deployment, &selector("abc"));

    let rolling = deployment.spec.unwrap().strategy.unwrap().rolling_update.unwrap();
    assert_eq!(rolling.max_unavailable, percent(expected));
    assert_eq!(rolling.max_surge, percent("25%"));
}

#[rstest]
#[case::workers(PlacementPreference::Workers)]
#[case::control_plane(PlacementPreference::ControlPlane)]
fn host_network_never_surges(#[case] placement: PlacementPreference) {
    let cluster = ClusterSnapshot::new(
        placement,
        TopologyMode::HighlyAvailable,
        TopologyMode::HighlyAvailable,
    );
    let policy = compute_rollout_policy(
        &workload(EndpointPublishingStrategyType::HostNetwork),
        &cluster,
        &TopologyDefaultReplicas,
    );

    let mut deployment = Deployment::default();
    let outcome = policy.apply(&mut deployment, &LabelKeys::default());

    assert_eq!(outcome, ApplyOutcome::Complete);
    let spec = deployment.spec.unwrap();
    let rolling = spec.strategy.unwrap().rolling_update.unwrap();
    assert_eq!(rolling.max_unavailable, percent("25%"));
    assert_eq!(rolling.max_surge, Some(IntOrString::Int(0)));
    assert!(spec.template.spec.and_then(|s| s.affinity).is_none());
}

#[test]
fn unrecognized_strategy_leaves_caller_fields_untouched() {
    let before = customized_deployment();
    let mut deployment = before.clone();

    let spec = workload(EndpointPublishingStrategyType::from("Gateway")).with_replicas(4);
    let outcome = compute_rollout_policy(&spec, &ha_cluster(), &TopologyDefaultReplicas)
        .apply(&mut deployment, &LabelKeys::default());

    assert!(!outcome.needs_generation_hash());
    let after = deployment.spec.unwrap();
    let before = before.spec.unwrap();
    assert_eq!(after.replicas, Some(4));
    assert_eq!(after.strategy, before.strategy);
    assert_eq!(after.template, before.template);
}

#[test]
fn single_replica_resets_customized_deployment() {
    let mut deployment = customized_deployment();
    let cluster = ClusterSnapshot::new(
        PlacementPreference::ControlPlane,
        TopologyMode::SingleReplica,
        TopologyMode::HighlyAvailable,
    );

    let outcome = compute_rollout_policy(
        &workload(EndpointPublishingStrategyType::NodePortService),
        &cluster,
        &TopologyDefaultReplicas,
    )
    .apply(&mut deployment, &LabelKeys::default());

    assert_eq!(outcome, ApplyOutcome::Complete);
    let spec = deployment.spec.unwrap();
    assert_eq!(spec.replicas, Some(1));
    assert!(spec.strategy.is_none());
    assert!(spec.template.spec.and_then(|s| s.affinity).is_none());
}

#[rstest]
#[case::private(EndpointPublishingStrategyType::Private)]
#[case::load_balancer(EndpointPublishingStrategyType::LoadBalancerService)]
#[case::node_port(EndpointPublishingStrategyType::NodePortService)]
fn reapply_after_bind_matches_fresh_apply(#[case] strategy: EndpointPublishingStrategyType) {
    let spec = workload(strategy).with_replicas(3);
    let policy = compute_rollout_policy(&spec, &ha_cluster(), &TopologyDefaultReplicas);
    let keys = LabelKeys::default();

    let mut live = Deployment::default();
    policy.apply_bound(&mut live, &selector("oldgen"));
    let mut fresh = Deployment::default();

    let _ = policy.apply(&mut live, &keys);
    let _ = policy.apply(&mut fresh, &keys);

    assert_eq!(live, fresh);
    assert!(live.spec.unwrap().template.metadata.is_none());
}

#[test]
fn host_network_after_bind_drops_generation_labels() {
    let mut live = Deployment::default();
    select_policy(&EndpointPublishingStrategyType::LoadBalancerService, 3, false)
        .apply_bound(&mut live, &selector("oldgen"));

    let host_network = compute_rollout_policy(
        &workload(EndpointPublishingStrategyType::HostNetwork).with_replicas(3),
        &ha_cluster(),
        &TopologyDefaultReplicas,
    );
    let outcome = host_network.apply(&mut live, &LabelKeys::default());
    let mut fresh = Deployment::default();
    let _ = host_network.apply(&mut fresh, &LabelKeys::default());

    assert_eq!(outcome, ApplyOutcome::Complete);
    assert_eq!(live, fresh);
    let template = live.spec.unwrap().template;
    assert!(template.metadata.is_none());
    assert!(template.spec.and_then(|s| s.affinity).is_none());
}

#[test]
fn default_policy_consulted_only_without_explicit_count() {
    let defaults = |cluster: &ClusterSnapshot| TopologyDefaultReplicas.default_replicas(cluster) * 3;
    let spec = workload(EndpointPublishingStrategyType::Private);

    let policy = compute_rollout_policy(&spec, &ha_cluster(), &defaults);
    assert_eq!(policy.replicas(), 6);
    assert_eq!(
        policy.strategy().rolling().unwrap().max_unavailable,
        Budget::Percent(25)
    );
}

proptest! {
    #[test]
    fn single_replica_always_platform_default(
        strategy in any_strategy_type(),
        cluster in single_replica_snapshot(),
        replicas in proptest::option::of(replica_count()),
    ) {
        let mut spec = workload(strategy);
        spec.replicas = replicas;

        let policy = compute_rollout_policy(&spec, &cluster, &TopologyDefaultReplicas);

        prop_assert_eq!(policy.strategy(), &StrategyDirective::PlatformDefault);
        prop_assert!(policy.affinity().is_none());
    }

    #[test]
    fn host_network_on_multi_replica(
        cluster in multi_replica_snapshot(),
        replicas in replica_count(),
    ) {
        let spec = workload(EndpointPublishingStrategyType::HostNetwork).with_replicas(replicas);
        let policy = compute_rollout_policy(&spec, &cluster, &TopologyDefaultReplicas);

        let params = policy.strategy().rolling().copied();
        prop_assert_eq!(params.map(|p| p.max_surge), Some(Budget::Absolute(0)));
        prop_assert_eq!(params.map(|p| p.max_unavailable), Some(Budget::Percent(25)));
        prop_assert!(!policy.configures_affinity());
    }

    #[test]
    fn affinity_iff_surge(
        strategy in any_strategy_type(),
        cluster in any_cluster(),
        replicas in replica_count(),
    ) {
        let spec = workload(strategy).with_replicas(replicas);
        let policy = compute_rollout_policy(&spec, &cluster, &TopologyDefaultReplicas);

        let surges = policy.strategy().rolling().is_some_and(|p| p.allows_surge());
        prop_assert_eq!(policy.configures_affinity(), surges);
    }

    #[test]
    fn service_backed_rollouts_can_progress(
        strategy in service_backed_strategy_type(),
        replicas in 2..=256i32,
    ) {
        let policy = select_policy(&strategy, replicas, false);
        let resolved = policy.strategy().rolling().unwrap().resolve(replicas);

        prop_assert!(resolved.max_unavailable >= 1);
        prop_assert!(resolved.max_surge >= 1);
    }

    #[test]
    fn explicit_replicas_always_win(
        strategy in any_strategy_type(),
        cluster in any_cluster(),
        replicas in replica_count(),
    ) {
        let spec = workload(strategy).with_replicas(replicas);
        let policy = compute_rollout_policy(&spec, &cluster, &sentinel_defaults);

        prop_assert_eq!(policy.replicas(), replicas);

        let mut deployment = Deployment::default();
        if let Some(pending) = policy.apply(&mut deployment, &LabelKeys::default()).into_pending() {
            pending.bind(&mut deployment, &selector("h1"));
        }
        prop_assert_eq!(deployment.spec.and_then(|s| s.replicas), Some(replicas));
    }

    #[test]
    fn identical_inputs_give_identical_output(
        strategy in any_strategy_type(),
        cluster in any_cluster(),
        replicas in proptest::option::of(replica_count()),
    ) {
        let mut spec = workload(strategy);
        spec.replicas = replicas;

        let first = compute_rollout_policy(&spec, &cluster, &TopologyDefaultReplicas);
        let second = compute_rollout_policy(&spec, &cluster, &TopologyDefaultReplicas);
        prop_assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );

        let mut a = customized_deployment();
        let mut b = customized_deployment();
        first.apply_bound(&mut a, &selector("gen1"));
        second.apply_bound(&mut b, &selector("gen1"));
        prop_assert_eq!(serde_json::to_vec(&a).unwrap(), serde_json::to_vec(&b).unwrap());
    }

    #[test]
    fn reapply_ignores_previous_generation(
        strategy in any_strategy_type(),
        cluster in multi_replica_snapshot(),
        replicas in replica_count(),
        previous in "[a-z0-9]{1,10}",
    ) {
        let spec = workload(strategy).with_replicas(replicas);
        let policy = compute_rollout_policy(&spec, &cluster, &TopologyDefaultReplicas);
        let keys = LabelKeys::default();

        let mut live = Deployment::default();
        policy.apply_bound(&mut live, &selector(&previous));
        let mut fresh = Deployment::default();
        let _ = policy.apply(&mut live, &keys);
        let _ = policy.apply(&mut fresh, &keys);

        prop_assert_eq!(live, fresh);
    }

    #[test]
    fn unrecognized_strategy_preserves_caller_fields(
        strategy in unrecognized_strategy_type(),
        cluster in multi_replica_snapshot(),
    ) {
        let before = customized_deployment();
        let mut deployment = before.clone();

        let outcome = compute_rollout_policy(&workload(strategy), &cluster, &TopologyDefaultReplicas)
            .apply(&mut deployment, &LabelKeys::default());

        prop_assert!(!outcome.needs_generation_hash());
        let after = deployment.spec.unwrap();
        let before = before.spec.unwrap();
        prop_assert_eq!(after.strategy, before.strategy);
        prop_assert_eq!(after.template, before.template);
    }
}
