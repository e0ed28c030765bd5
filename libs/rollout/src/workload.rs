//! User-facing desired state of a front-end workload.

use std::fmt;

use frontdoor_labels::WorkloadName;
use serde::{Deserialize, Serialize};

/// How the workload's endpoints are exposed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EndpointPublishingStrategyType {
    /// Pods bind ports directly on the node's network namespace.
    HostNetwork,

    /// Pods are reachable only from inside the cluster.
    Private,

    /// Pods sit behind a cloud load balancer service.
    LoadBalancerService,

    /// Pods sit behind a node-port service.
    NodePortService,

    /// A strategy this crate has not been taught.
    Unrecognized(String),
}

impl EndpointPublishingStrategyType {
    /// Returns the API string for this strategy type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::HostNetwork => "HostNetwork",
            Self::Private => "Private",
            Self::LoadBalancerService => "LoadBalancerService",
            Self::NodePortService => "NodePortService",
            Self::Unrecognized(other) => other,
        }
    }
}

impl From<String> for EndpointPublishingStrategyType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "HostNetwork" => Self::HostNetwork,
            "Private" => Self::Private,
            "LoadBalancerService" => Self::LoadBalancerService,
            "NodePortService" => Self::NodePortService,
            _ => Self::Unrecognized(s),
        }
    }
}

impl From<&str> for EndpointPublishingStrategyType {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<EndpointPublishingStrategyType> for String {
    fn from(strategy: EndpointPublishingStrategyType) -> Self {
        match strategy {
            EndpointPublishingStrategyType::Unrecognized(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EndpointPublishingStrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Desired state of a front-end workload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadSpec {
    /// Name used in the deployment label selector.
    pub name: WorkloadName,

    /// Explicit replica count; `None` defers to the default policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    pub endpoint_publishing_strategy: EndpointPublishingStrategyType,
}

impl WorkloadSpec {
    /// Create a spec with no explicit replica count.
    pub fn new(
        name: WorkloadName,
        endpoint_publishing_strategy: EndpointPublishingStrategyType,
    ) -> Self {
        Self {
            name,
            replicas: None,
            endpoint_publishing_strategy,
        }
    }

    /// Set an explicit replica count.
    #[must_use]
    pub fn with_replicas(mut self, replicas: i32) -> Self {
        self.replicas = Some(replicas);
        self
    }
}
