//! Rollout policy selection.

use serde::Serialize;
use tracing::debug;

use crate::affinity::AffinityTemplate;
use crate::strategy::{RollingUpdateParams, StrategyDirective};
use crate::workload::EndpointPublishingStrategyType;

/// Replica count, update strategy and affinity for one workload.
///
/// An affinity template is present exactly when the directive is a rolling
/// update with surge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RolloutPolicy {
    replicas: i32,
    strategy: StrategyDirective,
    affinity: Option<AffinityTemplate>,
}

impl RolloutPolicy {
    fn without_affinity(replicas: i32, strategy: StrategyDirective) -> Self {
        Self {
            replicas,
            strategy,
            affinity: None,
        }
    }

    /// Returns the resolved replica count.
    pub fn replicas(&self) -> i32 {
        self.replicas
    }

    /// Returns the update strategy directive.
    pub fn strategy(&self) -> &StrategyDirective {
        &self.strategy
    }

    /// Returns the affinity template, if the strategy surges.
    pub fn affinity(&self) -> Option<&AffinityTemplate> {
        self.affinity.as_ref()
    }

    /// Returns true if the caller must supply a generation hash.
    pub fn configures_affinity(&self) -> bool {
        self.affinity.is_some()
    }
}

/// Selects the rollout policy for a workload.
///
/// Single-replica targets always get the platform default. Otherwise:
///
/// | strategy type                                       | unavailable           | surge     | affinity |
/// |-----------------------------------------------------|-----------------------|-----------|----------|
/// | `HostNetwork`                                       | 25%                   | 0         | none     |
/// | `Private`, `LoadBalancerService`, `NodePortService` | 50% below 4, else 25% | 25%       | template |
/// | anything else                                       | unchanged             | unchanged | none     |
///
/// Host-network pods need no anti-affinity: the scheduler already refuses to
/// place two pods binding the same host port on one node. Surge is zero for
/// them because their replica count usually matches the node pool, leaving
/// nowhere to schedule extra pods.
pub fn select_policy(
    strategy_type: &EndpointPublishingStrategyType,
    desired_replicas: i32,
    single_replica: bool,
) -> RolloutPolicy {
    if single_replica {
        debug!(
            replicas = desired_replicas,
            "Single-replica topology, using platform default strategy"
        );
        return RolloutPolicy::without_affinity(desired_replicas, StrategyDirective::PlatformDefault);
    }

    let policy = match strategy_type {
        EndpointPublishingStrategyType::HostNetwork => RolloutPolicy::without_affinity(
            desired_replicas,
            StrategyDirective::Rolling(RollingUpdateParams::host_network()),
        ),
        EndpointPublishingStrategyType::Private
        | EndpointPublishingStrategyType::LoadBalancerService
        | EndpointPublishingStrategyType::NodePortService => RolloutPolicy {
            replicas: desired_replicas,
            strategy: StrategyDirective::Rolling(RollingUpdateParams::service_backed(
                desired_replicas,
            )),
            affinity: Some(AffinityTemplate::per_node()),
        },
        EndpointPublishingStrategyType::Unrecognized(other) => {
            debug!(
                strategy = %other,
                "Unrecognized endpoint publishing strategy, leaving update strategy unchanged"
            );
            RolloutPolicy::without_affinity(desired_replicas, StrategyDirective::Unchanged)
        }
    };

    debug!(
        strategy = %strategy_type,
        replicas = desired_replicas,
        affinity = policy.configures_affinity(),
        "Selected rollout policy"
    );

    policy
}
