//! Shared fixtures for frontdoor tests.
//!
//! Builders for the inputs the rollout policy consumes, plus proptest
//! strategies that cover the full input domain including values the policy
//! does not recognize.

use frontdoor_labels::{GenerationHash, LabelKeys, WorkloadName};
use frontdoor_rollout::{
    ClusterSnapshot, EndpointPublishingStrategyType, GenerationSelector, PlacementPreference,
    TopologyMode, WorkloadSpec,
};
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec, DeploymentStrategy};
use k8s_openapi::api::core::v1::{
    Affinity, PodAffinityTerm, PodAntiAffinity, PodSpec, PodTemplateSpec,
};
use proptest::prelude::*;

/// Name used by every fixture workload.
pub const WORKLOAD_NAME: &str = "default";

/// A workload named [`WORKLOAD_NAME`] with no explicit replica count.
pub fn workload(strategy: EndpointPublishingStrategyType) -> WorkloadSpec {
    WorkloadSpec::new(workload_name(), strategy)
}

pub fn workload_name() -> WorkloadName {
    WorkloadName::parse(WORKLOAD_NAME).expect("fixture workload name is valid")
}

/// Workers placement on a fully highly-available cluster.
pub fn ha_cluster() -> ClusterSnapshot {
    cluster(
        PlacementPreference::Workers,
        TopologyMode::HighlyAvailable,
        TopologyMode::HighlyAvailable,
    )
}

/// Workers placement on a single-node cluster.
pub fn single_replica_cluster() -> ClusterSnapshot {
    cluster(
        PlacementPreference::Workers,
        TopologyMode::SingleReplica,
        TopologyMode::SingleReplica,
    )
}

pub fn cluster(
    placement: PlacementPreference,
    control_plane: TopologyMode,
    infrastructure: TopologyMode,
) -> ClusterSnapshot {
    ClusterSnapshot::new(placement, control_plane, infrastructure)
}

/// Selector for [`WORKLOAD_NAME`] at generation `hash` with default keys.
pub fn selector(hash: &str) -> GenerationSelector {
    GenerationSelector::new(
        LabelKeys::default(),
        workload_name(),
        GenerationHash::parse(hash).expect("fixture hash is valid"),
    )
}

/// A Deployment whose strategy and affinity were set by someone else:
/// `Recreate` with a required anti-affinity term on zone.
pub fn customized_deployment() -> Deployment {
    Deployment {
        spec: Some(DeploymentSpec {
            replicas: Some(9),
            strategy: Some(DeploymentStrategy {
                type_: Some("Recreate".to_string()),
                rolling_update: None,
            }),
            template: PodTemplateSpec {
                metadata: None,
                spec: Some(PodSpec {
                    affinity: Some(Affinity {
                        pod_anti_affinity: Some(PodAntiAffinity {
                            required_during_scheduling_ignored_during_execution: Some(vec![
                                PodAffinityTerm {
                                    topology_key: "topology.kubernetes.io/zone".to_string(),
                                    ..Default::default()
                                },
                            ]),
                            preferred_during_scheduling_ignored_during_execution: None,
                        }),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

// =============================================================================
// Proptest strategies
// =============================================================================

/// The three service-backed strategy types.
pub fn service_backed_strategy_type() -> impl Strategy<Value = EndpointPublishingStrategyType> {
    prop_oneof![
        Just(EndpointPublishingStrategyType::Private),
        Just(EndpointPublishingStrategyType::LoadBalancerService),
        Just(EndpointPublishingStrategyType::NodePortService),
    ]
}

/// Strategy type names the policy has not been taught.
pub fn unrecognized_strategy_type() -> impl Strategy<Value = EndpointPublishingStrategyType> {
    "[A-Z][a-zA-Z]{0,20}"
        .prop_filter("must not be a known strategy type", |s| {
            !matches!(
                s.as_str(),
                "HostNetwork" | "Private" | "LoadBalancerService" | "NodePortService"
            )
        })
        .prop_map(EndpointPublishingStrategyType::Unrecognized)
}

/// Any strategy type, known or not.
pub fn any_strategy_type() -> impl Strategy<Value = EndpointPublishingStrategyType> {
    prop_oneof![
        Just(EndpointPublishingStrategyType::HostNetwork),
        service_backed_strategy_type(),
        unrecognized_strategy_type(),
    ]
}

/// Any topology mode, including ones the policy does not know.
pub fn any_topology_mode() -> impl Strategy<Value = TopologyMode> {
    prop_oneof![
        Just(TopologyMode::HighlyAvailable),
        Just(TopologyMode::SingleReplica),
        Just(TopologyMode::External),
        "[A-Z][a-zA-Z]{0,12}".prop_map(TopologyMode::from),
    ]
}

pub fn any_placement() -> impl Strategy<Value = PlacementPreference> {
    prop_oneof![
        Just(PlacementPreference::Workers),
        Just(PlacementPreference::ControlPlane),
    ]
}

/// Any cluster snapshot.
pub fn any_cluster() -> impl Strategy<Value = ClusterSnapshot> {
    (any_placement(), any_topology_mode(), any_topology_mode())
        .prop_map(|(placement, cp, infra)| cluster(placement, cp, infra))
}

/// Snapshots whose effective topology is single-replica.
pub fn single_replica_snapshot() -> impl Strategy<Value = ClusterSnapshot> {
    (any_placement(), any_topology_mode()).prop_map(|(placement, other)| match placement {
        PlacementPreference::Workers => cluster(placement, other, TopologyMode::SingleReplica),
        PlacementPreference::ControlPlane => cluster(placement, TopologyMode::SingleReplica, other),
    })
}

/// Snapshots whose effective topology is not single-replica.
pub fn multi_replica_snapshot() -> impl Strategy<Value = ClusterSnapshot> {
    any_cluster().prop_filter("effective topology must not be single-replica", |c| {
        !c.is_single_replica()
    })
}

/// Replica counts a user might set explicitly.
pub fn replica_count() -> impl Strategy<Value = i32> {
    0..=64i32
}
