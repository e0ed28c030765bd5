//! Replica count resolution.

use crate::topology::ClusterSnapshot;

/// Replica count used when the workload spec does not set one.
pub trait DefaultReplicaPolicy {
    /// Returns the default replica count for the given cluster.
    fn default_replicas(&self, cluster: &ClusterSnapshot) -> i32;
}

impl<F> DefaultReplicaPolicy for F
where
    F: Fn(&ClusterSnapshot) -> i32,
{
    fn default_replicas(&self, cluster: &ClusterSnapshot) -> i32 {
        self(cluster)
    }
}

/// One replica on single-replica topology, two otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologyDefaultReplicas;

impl DefaultReplicaPolicy for TopologyDefaultReplicas {
    fn default_replicas(&self, cluster: &ClusterSnapshot) -> i32 {
        if cluster.is_single_replica() {
            1
        } else {
            2
        }
    }
}

/// Returns `explicit` when set, otherwise the default for `cluster`.
///
/// Explicit counts are returned as given, even when they disagree with
/// the topology.
pub fn resolve_replicas<D>(explicit: Option<i32>, cluster: &ClusterSnapshot, defaults: &D) -> i32
where
    D: DefaultReplicaPolicy + ?Sized,
{
    match explicit {
        Some(replicas) => replicas,
        None => defaults.default_replicas(cluster),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{PlacementPreference, TopologyMode};

    fn single_replica_cluster() -> ClusterSnapshot {
        ClusterSnapshot::new(
            PlacementPreference::Workers,
            TopologyMode::SingleReplica,
            TopologyMode::SingleReplica,
        )
    }

    #[test]
    fn test_explicit_count_wins() {
        let cluster = single_replica_cluster();
        assert_eq!(resolve_replicas(Some(7), &cluster, &TopologyDefaultReplicas), 7);
        assert_eq!(resolve_replicas(Some(0), &cluster, &TopologyDefaultReplicas), 0);
    }

    #[test]
    fn test_defaults_follow_topology() {
        assert_eq!(
            resolve_replicas(None, &single_replica_cluster(), &TopologyDefaultReplicas),
            1
        );
        assert_eq!(
            resolve_replicas(None, &ClusterSnapshot::default(), &TopologyDefaultReplicas),
            2
        );
    }

    #[test]
    fn test_closure_policy_receives_snapshot() {
        let cluster = single_replica_cluster();
        let policy = |c: &ClusterSnapshot| if c.is_single_replica() { 11 } else { 22 };
        assert_eq!(resolve_replicas(None, &cluster, &policy), 11);
    }

    #[test]
    fn test_explicit_count_skips_default_policy() {
        let policy = |_: &ClusterSnapshot| -> i32 { panic!("default policy must not be consulted") };
        assert_eq!(resolve_replicas(Some(3), &ClusterSnapshot::default(), &policy), 3);
    }
}
