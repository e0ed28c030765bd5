//! Rollout policy for replicated front-end workloads.
//!
//! Given a front-end workload's endpoint-publishing strategy and a snapshot
//! of the cluster topology, this library decides:
//!
//! - **Replicas**: the explicit count, or a topology-derived default.
//! - **Update strategy**: how many replicas may be unavailable or surged
//!   during a rolling update.
//! - **Affinity**: generation-aware pod affinity that keeps every node with
//!   local endpoints serving throughout a rollout.
//!
//! # Invariants
//!
//! - Computation is pure and total; unknown enum values take a default path
//! - Identical inputs produce identical policies
//! - Affinity is present iff the update strategy surges
//! - Affinity terms cannot be rendered without a generation hash

mod affinity;
mod apply;
mod policy;
mod replicas;
mod strategy;
mod topology;
mod workload;

use tracing::instrument;

pub use affinity::{
    AffinityTemplate, GenerationSelector, HOSTNAME_TOPOLOGY_KEY, PREFERRED_AFFINITY_WEIGHT,
};
pub use apply::{ApplyOutcome, PendingAffinity};
pub use policy::{select_policy, RolloutPolicy};
pub use replicas::{resolve_replicas, DefaultReplicaPolicy, TopologyDefaultReplicas};
pub use strategy::{
    Budget, ResolvedBudget, RollingUpdateParams, StrategyDirective, ROLLING_UPDATE_STRATEGY_TYPE,
    UNAVAILABLE_THRESHOLD_REPLICAS,
};
pub use topology::{is_single_replica, ClusterSnapshot, PlacementPreference, TopologyMode};
pub use workload::{EndpointPublishingStrategyType, WorkloadSpec};

/// Computes the rollout policy for `workload` on `cluster`.
///
/// Replicas are resolved first, then the policy is selected; a
/// single-replica topology short-circuits to the platform default.
#[instrument(
    level = "debug",
    skip_all,
    fields(workload = %workload.name, strategy = %workload.endpoint_publishing_strategy)
)]
pub fn compute_rollout_policy<D>(
    workload: &WorkloadSpec,
    cluster: &ClusterSnapshot,
    defaults: &D,
) -> RolloutPolicy
where
    D: DefaultReplicaPolicy + ?Sized,
{
    let replicas = resolve_replicas(workload.replicas, cluster, defaults);
    let single_replica = cluster.is_single_replica();

    select_policy(&workload.endpoint_publishing_strategy, replicas, single_replica)
}
