//! Input documents and evaluation.

use anyhow::{bail, Context, Result};
use frontdoor_labels::{GenerationHash, LabelKeys};
use frontdoor_rollout::{
    compute_rollout_policy, ApplyOutcome, ClusterSnapshot, GenerationSelector, RolloutPolicy,
    TopologyDefaultReplicas, WorkloadSpec,
};
use k8s_openapi::api::apps::v1::Deployment;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A snapshot to evaluate, as read from YAML or JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDocument {
    pub workload: WorkloadSpec,

    #[serde(default)]
    pub cluster: ClusterSnapshot,

    /// Existing Deployment to apply the policy onto.
    #[serde(default)]
    pub deployment: Option<Deployment>,

    /// Hash of the current pod template generation.
    #[serde(default)]
    pub generation_hash: Option<GenerationHash>,
}

impl InputDocument {
    /// Parse a document. JSON is accepted as a subset of YAML.
    pub fn parse(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).context("invalid input document")
    }
}

/// The computed policy and the Deployment it produced.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub policy: RolloutPolicy,
    pub deployment: Deployment,
}

/// Computes and applies the policy described by `doc`.
///
/// `hash` takes precedence over the document's generation hash. Fails if
/// the policy needs a hash and none is available.
pub fn evaluate(
    doc: InputDocument,
    label_keys: &LabelKeys,
    hash: Option<GenerationHash>,
) -> Result<Evaluation> {
    let policy = compute_rollout_policy(&doc.workload, &doc.cluster, &TopologyDefaultReplicas);
    let mut deployment = doc.deployment.unwrap_or_default();

    match policy.apply(&mut deployment, label_keys) {
        ApplyOutcome::Complete => {
            debug!("Policy applied without affinity");
        }
        ApplyOutcome::AwaitingGenerationHash(pending) => {
            let Some(hash) = hash.or(doc.generation_hash) else {
                bail!(
                    "workload '{}' uses {} and needs a generation hash; pass --hash or set generationHash",
                    doc.workload.name,
                    doc.workload.endpoint_publishing_strategy
                );
            };
            let selector = GenerationSelector::new(label_keys.clone(), doc.workload.name.clone(), hash);
            pending.bind(&mut deployment, &selector);
        }
    }

    info!(
        workload = %doc.workload.name,
        replicas = policy.replicas(),
        affinity = policy.configures_affinity(),
        "Evaluated rollout policy"
    );

    Ok(Evaluation { policy, deployment })
}
