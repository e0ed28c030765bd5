//! Writing a rollout policy onto a Deployment.
//!
//! Applying is two-phase when the policy carries affinity: [`RolloutPolicy::apply`]
//! writes the replica count and update strategy and hands back a
//! [`PendingAffinity`]. The caller computes the generation hash of the
//! resulting pod template and binds it, which writes the affinity terms and
//! stamps the matching labels onto the template.
//!
//! Re-applying strips those labels again, so a template that is applied and
//! then hashed never carries the hash of an earlier generation.

use frontdoor_labels::LabelKeys;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::PodSpec;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tracing::debug;

use crate::affinity::{AffinityTemplate, GenerationSelector};
use crate::policy::RolloutPolicy;
use crate::strategy::StrategyDirective;

/// Result of applying a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a policy with affinity is incomplete until the generation hash is bound"]
pub enum ApplyOutcome {
    /// The Deployment is fully configured.
    Complete,

    /// Affinity must still be bound to the current generation hash.
    AwaitingGenerationHash(PendingAffinity),
}

impl ApplyOutcome {
    /// Returns true if the caller must bind a generation hash.
    pub fn needs_generation_hash(&self) -> bool {
        matches!(self, Self::AwaitingGenerationHash(_))
    }

    /// Returns the pending affinity, if any.
    pub fn into_pending(self) -> Option<PendingAffinity> {
        match self {
            Self::Complete => None,
            Self::AwaitingGenerationHash(pending) => Some(pending),
        }
    }
}

/// Affinity terms waiting for the current generation hash.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "call bind() with the generation hash to finish configuring affinity"]
pub struct PendingAffinity {
    template: AffinityTemplate,
}

impl PendingAffinity {
    /// Returns the affinity terms waiting to be bound.
    pub fn template(&self) -> &AffinityTemplate {
        &self.template
    }

    /// Writes the affinity for `selector` onto `deployment`.
    ///
    /// Also sets the workload and generation-hash labels on the pod
    /// template, so the anti-affinity term matches the pods it is attached
    /// to. Node affinity already present on the template is kept.
    pub fn bind(self, deployment: &mut Deployment, selector: &GenerationSelector) {
        let spec = deployment_spec(deployment);
        let bound = self.template.bind(selector);

        let labels = spec
            .template
            .metadata
            .get_or_insert_with(Default::default)
            .labels
            .get_or_insert_with(Default::default);
        labels.insert(
            selector.keys().deployment.to_string(),
            selector.workload().to_string(),
        );
        labels.insert(
            selector.keys().generation_hash.to_string(),
            selector.hash().to_string(),
        );

        let affinity = spec
            .template
            .spec
            .get_or_insert_with(Default::default)
            .affinity
            .get_or_insert_with(Default::default);
        affinity.pod_affinity = bound.pod_affinity;
        affinity.pod_anti_affinity = bound.pod_anti_affinity;

        debug!(
            workload = %selector.workload(),
            hash = %selector.hash(),
            "Bound generation affinity"
        );
    }
}

impl RolloutPolicy {
    /// Writes the policy onto `deployment`.
    ///
    /// The replica count is always written. `PlatformDefault` and `Rolling`
    /// replace the update strategy and drop any pod affinity a previous
    /// policy left behind, along with the template labels under `keys` that
    /// [`PendingAffinity::bind`] stamped. `Unchanged` leaves all of them as
    /// supplied.
    ///
    /// `keys` must be the keys later passed to `bind` in the selector.
    pub fn apply(&self, deployment: &mut Deployment, keys: &LabelKeys) -> ApplyOutcome {
        let spec = deployment_spec(deployment);
        spec.replicas = Some(self.replicas());

        match self.strategy() {
            StrategyDirective::PlatformDefault => {
                spec.strategy = None;
                clear_pod_affinity(spec);
                clear_generation_labels(spec, keys);
            }
            StrategyDirective::Rolling(params) => {
                spec.strategy = Some(params.to_deployment_strategy());
                clear_pod_affinity(spec);
                clear_generation_labels(spec, keys);
            }
            StrategyDirective::Unchanged => {}
        }

        match self.affinity() {
            Some(template) => ApplyOutcome::AwaitingGenerationHash(PendingAffinity {
                template: *template,
            }),
            None => ApplyOutcome::Complete,
        }
    }

    /// Applies the policy and binds `selector` in one step.
    ///
    /// Use when the generation hash does not depend on the applied policy.
    pub fn apply_bound(&self, deployment: &mut Deployment, selector: &GenerationSelector) {
        if let ApplyOutcome::AwaitingGenerationHash(pending) =
            self.apply(deployment, selector.keys())
        {
            pending.bind(deployment, selector);
        }
    }
}

fn deployment_spec(deployment: &mut Deployment) -> &mut DeploymentSpec {
    deployment.spec.get_or_insert_with(Default::default)
}

/// Removes pod affinity and anti-affinity, keeping node affinity.
///
/// A pod spec left empty collapses back to `None`.
fn clear_pod_affinity(spec: &mut DeploymentSpec) {
    let Some(pod_spec) = spec.template.spec.as_mut() else {
        return;
    };
    let Some(affinity) = pod_spec.affinity.as_mut() else {
        return;
    };

    affinity.pod_affinity = None;
    affinity.pod_anti_affinity = None;
    if affinity.node_affinity.is_none() {
        pod_spec.affinity = None;
    }
    if *pod_spec == PodSpec::default() {
        spec.template.spec = None;
    }
}

/// Removes the workload and generation-hash labels from the pod template.
///
/// Empty label maps and metadata collapse back to `None`.
fn clear_generation_labels(spec: &mut DeploymentSpec, keys: &LabelKeys) {
    let Some(metadata) = spec.template.metadata.as_mut() else {
        return;
    };
    if let Some(labels) = metadata.labels.as_mut() {
        labels.remove(keys.deployment.as_str());
        labels.remove(keys.generation_hash.as_str());
        if labels.is_empty() {
            metadata.labels = None;
        }
    }
    if *metadata == ObjectMeta::default() {
        spec.template.metadata = None;
    }
}
