//! Rolling-update parameters.
//!
//! The percentages chosen by the policy are tuned against the deployment
//! controller's fencepost rules: `maxUnavailable` is scaled and rounded
//! down, `maxSurge` is scaled and rounded up, and if both come out as zero
//! `maxUnavailable` is bumped to one. [`RollingUpdateParams::resolve`]
//! reproduces those rules. An orchestrator that rounds differently needs the
//! 50%/25% crossover at [`UNAVAILABLE_THRESHOLD_REPLICAS`] re-derived.

use k8s_openapi::api::apps::v1::{DeploymentStrategy, RollingUpdateDeployment};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::Serialize;

/// Deployment strategy type string for rolling updates.
pub const ROLLING_UPDATE_STRATEGY_TYPE: &str = "RollingUpdate";

/// Replica count at which `maxUnavailable` drops from 50% to 25%.
///
/// Below this, 25% of the replicas rounds down to zero unavailable pods.
pub const UNAVAILABLE_THRESHOLD_REPLICAS: i32 = 4;

/// A `maxUnavailable` / `maxSurge` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "IntOrString")]
pub enum Budget {
    /// A percentage of the desired replica count.
    Percent(u8),

    /// An absolute number of pods.
    Absolute(i32),
}

impl Budget {
    /// Scales the budget against `replicas`.
    ///
    /// Percentages round up when `round_up` is set and down otherwise.
    pub fn scaled(self, replicas: i32, round_up: bool) -> i32 {
        match self {
            Self::Absolute(value) => value,
            Self::Percent(percent) => {
                let product = i64::from(percent) * i64::from(replicas.max(0));
                let scaled = if round_up {
                    (product + 99) / 100
                } else {
                    product / 100
                };
                i32::try_from(scaled).unwrap_or(i32::MAX)
            }
        }
    }
}

impl From<Budget> for IntOrString {
    fn from(budget: Budget) -> Self {
        match budget {
            Budget::Percent(percent) => IntOrString::String(format!("{percent}%")),
            Budget::Absolute(value) => IntOrString::Int(value),
        }
    }
}

/// Unavailable and surge budget for a rolling update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingUpdateParams {
    pub max_unavailable: Budget,
    pub max_surge: Budget,
}

/// Pod counts a rolling update may deviate from the desired count by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedBudget {
    pub max_unavailable: i32,
    pub max_surge: i32,
}

impl ResolvedBudget {
    /// Returns true if the rollout can replace at least one pod per step.
    pub fn can_progress(&self) -> bool {
        self.max_unavailable > 0 || self.max_surge > 0
    }
}

impl RollingUpdateParams {
    /// Host-network replicas: tolerate unavailability, never surge.
    pub const fn host_network() -> Self {
        Self {
            max_unavailable: Budget::Percent(25),
            max_surge: Budget::Absolute(0),
        }
    }

    /// Service-backed replicas: surge first, with a higher unavailable
    /// floor below [`UNAVAILABLE_THRESHOLD_REPLICAS`].
    pub const fn service_backed(desired_replicas: i32) -> Self {
        let max_unavailable = if desired_replicas < UNAVAILABLE_THRESHOLD_REPLICAS {
            Budget::Percent(50)
        } else {
            Budget::Percent(25)
        };

        Self {
            max_unavailable,
            max_surge: Budget::Percent(25),
        }
    }

    /// Returns true if the update may create pods above the desired count.
    pub fn allows_surge(&self) -> bool {
        self.max_surge != Budget::Absolute(0) && self.max_surge != Budget::Percent(0)
    }

    /// Resolves the budget against `replicas` the way the deployment
    /// controller does.
    pub fn resolve(&self, replicas: i32) -> ResolvedBudget {
        let max_surge = self.max_surge.scaled(replicas, true);
        let mut max_unavailable = self.max_unavailable.scaled(replicas, false);

        if max_surge == 0 && max_unavailable == 0 {
            max_unavailable = 1;
        }

        ResolvedBudget {
            max_unavailable,
            max_surge,
        }
    }

    /// Builds the Deployment strategy record.
    pub fn to_deployment_strategy(&self) -> DeploymentStrategy {
        DeploymentStrategy {
            type_: Some(ROLLING_UPDATE_STRATEGY_TYPE.to_string()),
            rolling_update: Some(RollingUpdateDeployment {
                max_unavailable: Some(self.max_unavailable.into()),
                max_surge: Some(self.max_surge.into()),
            }),
        }
    }
}

/// What the policy does with the Deployment's update strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StrategyDirective {
    /// Clear any override and use the orchestrator's baseline.
    PlatformDefault,

    /// Write an explicit rolling update.
    Rolling(RollingUpdateParams),

    /// Leave whatever the caller supplied.
    Unchanged,
}

impl StrategyDirective {
    /// Returns the rolling parameters, if any.
    pub fn rolling(&self) -> Option<&RollingUpdateParams> {
        match self {
            Self::Rolling(params) => Some(params),
            _ => None,
        }
    }
}
