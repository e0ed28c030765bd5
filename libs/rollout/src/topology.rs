//! Cluster topology snapshot and single-replica classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Availability mode of one part of the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TopologyMode {
    /// Components run with redundancy across several nodes.
    #[default]
    HighlyAvailable,

    /// Components run with no redundancy.
    SingleReplica,

    /// Components are hosted outside the cluster.
    External,

    /// A mode this crate does not know about.
    Unrecognized(String),
}

impl TopologyMode {
    /// Returns the API string for this mode.
    pub fn as_str(&self) -> &str {
        match self {
            Self::HighlyAvailable => "HighlyAvailable",
            Self::SingleReplica => "SingleReplica",
            Self::External => "External",
            Self::Unrecognized(other) => other,
        }
    }
}

impl From<String> for TopologyMode {
    fn from(s: String) -> Self {
        match s.as_str() {
            "HighlyAvailable" => Self::HighlyAvailable,
            "SingleReplica" => Self::SingleReplica,
            "External" => Self::External,
            _ => Self::Unrecognized(s),
        }
    }
}

impl From<TopologyMode> for String {
    fn from(mode: TopologyMode) -> Self {
        match mode {
            TopologyMode::Unrecognized(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TopologyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which set of nodes front-end workloads are placed on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlacementPreference {
    /// Workloads land on worker (infrastructure) nodes.
    #[default]
    Workers,

    /// Workloads land on control-plane nodes.
    ControlPlane,
}

/// Observed cluster state the policy is computed against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterSnapshot {
    pub default_placement: PlacementPreference,
    pub control_plane_topology: TopologyMode,
    pub infrastructure_topology: TopologyMode,
}

impl ClusterSnapshot {
    /// Create a snapshot.
    pub fn new(
        default_placement: PlacementPreference,
        control_plane_topology: TopologyMode,
        infrastructure_topology: TopologyMode,
    ) -> Self {
        Self {
            default_placement,
            control_plane_topology,
            infrastructure_topology,
        }
    }

    /// The topology field that governs where the workload is placed.
    pub fn effective_topology(&self) -> &TopologyMode {
        match self.default_placement {
            PlacementPreference::ControlPlane => &self.control_plane_topology,
            PlacementPreference::Workers => &self.infrastructure_topology,
        }
    }

    /// Returns true if the workload's nodes run without redundancy.
    pub fn is_single_replica(&self) -> bool {
        is_single_replica(
            self.default_placement,
            &self.control_plane_topology,
            &self.infrastructure_topology,
        )
    }
}

/// Returns true if the topology selected by `placement` is single-replica.
///
/// Unrecognized modes count as highly available.
pub fn is_single_replica(
    placement: PlacementPreference,
    control_plane: &TopologyMode,
    infrastructure: &TopologyMode,
) -> bool {
    let topology = match placement {
        PlacementPreference::ControlPlane => control_plane,
        PlacementPreference::Workers => infrastructure,
    };

    *topology == TopologyMode::SingleReplica
}
