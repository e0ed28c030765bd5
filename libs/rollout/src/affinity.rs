//! Generation-aware pod affinity.
//!
//! New-generation pods prefer nodes that run pods of any *other* generation
//! of the same workload, and are required to avoid nodes that already run a
//! pod of their *own* generation. Combined with a surge-first rolling
//! update, every node that served the workload before the rollout keeps a
//! local replica during and after it.
//!
//! The generation hash is a property of the rollout history, not of the
//! policy, so the policy only emits an [`AffinityTemplate`]. The Kubernetes
//! [`Affinity`] can only be produced by binding a [`GenerationSelector`].

use frontdoor_labels::{GenerationHash, LabelKeys, WorkloadName};
use k8s_openapi::api::core::v1::{
    Affinity, PodAffinity, PodAffinityTerm, PodAntiAffinity, WeightedPodAffinityTerm,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, LabelSelectorRequirement};
use serde::Serialize;

/// Topology key that scopes the terms to a single node.
pub const HOSTNAME_TOPOLOGY_KEY: &str = "kubernetes.io/hostname";

/// Weight of the preferred co-location term.
pub const PREFERRED_AFFINITY_WEIGHT: i32 = 100;

const OPERATOR_IN: &str = "In";
const OPERATOR_NOT_IN: &str = "NotIn";

/// The identity the affinity terms select on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenerationSelector {
    keys: LabelKeys,
    workload: WorkloadName,
    hash: GenerationHash,
}

impl GenerationSelector {
    /// Create a selector for one generation of `workload`.
    pub fn new(keys: LabelKeys, workload: WorkloadName, hash: GenerationHash) -> Self {
        Self {
            keys,
            workload,
            hash,
        }
    }

    /// Returns the label keys the selector matches on.
    pub fn keys(&self) -> &LabelKeys {
        &self.keys
    }

    /// Returns the workload name matched by the deployment label.
    pub fn workload(&self) -> &WorkloadName {
        &self.workload
    }

    /// Returns the generation hash the terms are bound to.
    pub fn hash(&self) -> &GenerationHash {
        &self.hash
    }

    /// Label selector matching pods of this workload whose generation hash
    /// satisfies `hash_operator`.
    fn label_selector(&self, hash_operator: &str) -> LabelSelector {
        LabelSelector {
            match_expressions: Some(vec![
                LabelSelectorRequirement {
                    key: self.keys.deployment.to_string(),
                    operator: OPERATOR_IN.to_string(),
                    values: Some(vec![self.workload.to_string()]),
                },
                LabelSelectorRequirement {
                    key: self.keys.generation_hash.to_string(),
                    operator: hash_operator.to_string(),
                    values: Some(vec![self.hash.to_string()]),
                },
            ]),
            match_labels: None,
        }
    }
}

/// Shape of the generation-aware affinity, awaiting a [`GenerationSelector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffinityTemplate {
    preferred_weight: i32,
    topology_key: &'static str,
}

impl Default for AffinityTemplate {
    fn default() -> Self {
        Self::per_node()
    }
}

impl AffinityTemplate {
    /// Terms scoped to individual nodes.
    pub const fn per_node() -> Self {
        Self {
            preferred_weight: PREFERRED_AFFINITY_WEIGHT,
            topology_key: HOSTNAME_TOPOLOGY_KEY,
        }
    }

    /// Returns the weight of the preferred pod-affinity term.
    pub fn preferred_weight(&self) -> i32 {
        self.preferred_weight
    }

    /// Returns the topology key both terms are scoped to.
    pub fn topology_key(&self) -> &'static str {
        self.topology_key
    }

    /// Renders the affinity for one generation.
    ///
    /// The preferred pod-affinity term selects the workload's pods whose
    /// hash is `NotIn` the current one; the required anti-affinity term
    /// selects those whose hash is `In` it.
    pub fn bind(&self, selector: &GenerationSelector) -> Affinity {
        Affinity {
            node_affinity: None,
            pod_affinity: Some(PodAffinity {
                preferred_during_scheduling_ignored_during_execution: Some(vec![
                    WeightedPodAffinityTerm {
                        weight: self.preferred_weight,
                        pod_affinity_term: self.term(selector, OPERATOR_NOT_IN),
                    },
                ]),
                required_during_scheduling_ignored_during_execution: None,
            }),
            pod_anti_affinity: Some(PodAntiAffinity {
                preferred_during_scheduling_ignored_during_execution: None,
                required_during_scheduling_ignored_during_execution: Some(vec![
                    self.term(selector, OPERATOR_IN)
                ]),
            }),
        }
    }

    fn term(&self, selector: &GenerationSelector, hash_operator: &str) -> PodAffinityTerm {
        PodAffinityTerm {
            label_selector: Some(selector.label_selector(hash_operator)),
            topology_key: self.topology_key.to_string(),
            ..Default::default()
        }
    }
}
