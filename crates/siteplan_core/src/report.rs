use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::model::{ActionKind, OverlayNode, PlannedAction};
use crate::plan::action_clicks;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OverlaySummary {
    pub total_nodes: usize,
    pub by_status: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlanSummary {
    pub total_actions: usize,
    pub by_action: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
    /// Clicks carried by pages whose action is anything but KEEP.
    pub clicks_at_stake: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlanReport {
    pub fingerprint: String,
    pub summary: PlanSummary,
    pub actions: Vec<PlannedAction>,
}

pub fn summarize_overlay(nodes: &[OverlayNode]) -> OverlaySummary {
    let mut by_status = BTreeMap::new();
    for node in nodes {
        *by_status.entry(node.status.as_str().to_string()).or_insert(0) += 1;
    }
    OverlaySummary {
        total_nodes: nodes.len(),
        by_status,
    }
}

pub fn summarize_plan(actions: &[PlannedAction]) -> PlanSummary {
    let mut by_action = BTreeMap::new();
    let mut by_priority = BTreeMap::new();
    let mut clicks_at_stake = 0u64;
    for action in actions {
        *by_action.entry(action.action.as_str().to_string()).or_insert(0) += 1;
        *by_priority
            .entry(action.priority.as_str().to_string())
            .or_insert(0) += 1;
        if action.action != ActionKind::Keep {
            clicks_at_stake = clicks_at_stake.saturating_add(action_clicks(action));
        }
    }
    PlanSummary {
        total_actions: actions.len(),
        by_action,
        by_priority,
        clicks_at_stake,
    }
}

/// Short hex digest of the plan's JSON form. Identical inputs produce an
/// identical fingerprint.
pub fn plan_fingerprint(actions: &[PlannedAction]) -> Result<String> {
    let encoded = serde_json::to_vec(actions).context("failed to serialize plan")?;
    let digest = Sha256::digest(&encoded);
    let mut output = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        output.push_str(&format!("{byte:02x}"));
    }
    Ok(output)
}

pub fn build_plan_report(actions: Vec<PlannedAction>) -> Result<PlanReport> {
    Ok(PlanReport {
        fingerprint: plan_fingerprint(&actions)?,
        summary: summarize_plan(&actions),
        actions,
    })
}
