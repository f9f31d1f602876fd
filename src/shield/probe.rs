//! Membership probe across watched groups
//!
//! For one user, every watched group is queried on its own task and the
//! results are collected into a slot per group. The call returns only once
//! every query has finished, so latency is bounded by the slowest group and
//! the result does not depend on completion order.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::core::{ShieldError, ShieldResult, UserId};
use crate::gateway::ChatGateway;

/// Queries watched groups for a user's membership
#[derive(Clone)]
pub struct MembershipProbe {
    gateway: Arc<dyn ChatGateway>,
    groups: Arc<Vec<String>>,
    timeout: Option<Duration>,
}

impl MembershipProbe {
    /// Create a probe over `groups` (handles, in declared order)
    pub fn new(gateway: Arc<dyn ChatGateway>, groups: Vec<String>) -> Self {
        Self {
            gateway,
            groups: Arc::new(groups),
            timeout: None,
        }
    }

    /// Give up on a single group query after `timeout`.
    ///
    /// A group that does not answer in time counts as no match.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Watched groups where `user_id` is a member, creator or administrator,
    /// in declared order.
    ///
    /// Query failures count as no match for that group only.
    pub async fn probe_matches(&self, user_id: UserId) -> Vec<String> {
        let mut tasks = JoinSet::new();
        for (index, group) in self.groups.iter().enumerate() {
            let gateway = Arc::clone(&self.gateway);
            let group = group.clone();
            let timeout = self.timeout;
            tasks.spawn(async move {
                let present = match query(&*gateway, &group, user_id, timeout).await {
                    Ok(present) => present,
                    Err(e) => {
                        tracing::debug!("[Probe] {} in {}: {}", user_id, group, e);
                        false
                    }
                };
                (index, present)
            });
        }

        let mut slots = vec![false; self.groups.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, present)) => slots[index] = present,
                Err(e) => tracing::warn!("[Probe] Query task failed: {}", e),
            }
        }

        self.groups
            .iter()
            .zip(slots)
            .filter_map(|(group, present)| present.then(|| group.clone()))
            .collect()
    }

    /// Comma-joined troll houses of `user_id`; empty when there are none
    pub async fn probe(&self, user_id: UserId) -> String {
        let houses = self.probe_matches(user_id).await;
        if !houses.is_empty() {
            tracing::info!("[Probe] {} is a member of {}", user_id, houses.join(","));
        }
        houses.join(",")
    }
}

async fn query(
    gateway: &dyn ChatGateway,
    group: &str,
    user_id: UserId,
    timeout: Option<Duration>,
) -> ShieldResult<bool> {
    let status = match timeout {
        Some(limit) => tokio::time::timeout(limit, gateway.fetch_membership_status(group, user_id))
            .await
            .map_err(|_| ShieldError::Timeout(group.to_string()))??,
        None => gateway.fetch_membership_status(group, user_id).await?,
    };
    Ok(status.is_present())
}
