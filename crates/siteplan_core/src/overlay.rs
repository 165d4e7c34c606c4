use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::matcher::meets_threshold;
use crate::model::{
    InventoryPage, OverlayNode, OverlayNodeKind, OverlayPage, OverlayStatus, StrategyTopic,
};

pub const DEFAULT_ALIGNED_THRESHOLD: f64 = 60.0;

const ENTITY_WEIGHT: f64 = 0.4;
const CONTEXT_WEIGHT: f64 = 0.3;
const INTENT_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySettings {
    /// Minimum alignment score for a singly covered topic to count as aligned.
    pub aligned_threshold: f64,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            aligned_threshold: DEFAULT_ALIGNED_THRESHOLD,
        }
    }
}

pub fn compute_overlay(topics: &[StrategyTopic], inventory: &[InventoryPage]) -> Vec<OverlayNode> {
    compute_overlay_with(topics, inventory, &OverlaySettings::default())
}

/// One node per topic, in topic order, followed by one orphan node per
/// unmapped page, in inventory order.
pub fn compute_overlay_with(
    topics: &[StrategyTopic],
    inventory: &[InventoryPage],
    settings: &OverlaySettings,
) -> Vec<OverlayNode> {
    let mut by_topic: HashMap<&str, Vec<&InventoryPage>> = HashMap::new();
    let mut orphans = Vec::new();
    for page in inventory {
        match page.mapped_topic() {
            Some(topic_id) => by_topic.entry(topic_id).or_default().push(page),
            None => orphans.push(page),
        }
    }

    let known = topics
        .iter()
        .map(|topic| topic.id.as_str())
        .collect::<HashSet<_>>();
    for (topic_id, pages) in &by_topic {
        if !known.contains(topic_id) {
            debug!(
                topic = %topic_id,
                pages = pages.len(),
                "pages mapped to a topic missing from the map"
            );
        }
    }

    let mut nodes = Vec::with_capacity(topics.len() + orphans.len());
    for topic in topics {
        let pages = by_topic
            .get(topic.id.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();
        nodes.push(topic_node(topic, pages, settings));
    }
    nodes.extend(orphans.into_iter().map(orphan_node));
    nodes
}

fn topic_node(
    topic: &StrategyTopic,
    pages: &[&InventoryPage],
    settings: &OverlaySettings,
) -> OverlayNode {
    let matched_pages = pages
        .iter()
        .map(|page| overlay_page(page))
        .collect::<Vec<_>>();

    let (status, alignment_score) = match matched_pages.as_slice() {
        [] => (OverlayStatus::Gap, None),
        [single] => {
            let status = if meets_threshold(single.alignment_score, settings.aligned_threshold) {
                OverlayStatus::CoveredAligned
            } else {
                OverlayStatus::CoveredNeedsWork
            };
            (status, Some(single.alignment_score))
        }
        many => {
            let total = many.iter().map(|page| page.alignment_score).sum::<f64>();
            (
                OverlayStatus::Cannibalization,
                Some(total / many.len() as f64),
            )
        }
    };

    OverlayNode {
        id: topic.id.clone(),
        title: topic.title.clone(),
        kind: topic.topic_type.into(),
        status,
        color: status.color(),
        matched_pages,
        alignment_score,
    }
}

fn orphan_node(page: &InventoryPage) -> OverlayNode {
    OverlayNode {
        id: page.id.clone(),
        title: page.url.clone(),
        kind: OverlayNodeKind::Orphan,
        status: OverlayStatus::Orphan,
        color: OverlayStatus::Orphan.color(),
        matched_pages: vec![overlay_page(page)],
        alignment_score: None,
    }
}

fn overlay_page(page: &InventoryPage) -> OverlayPage {
    OverlayPage {
        page_id: page.id.clone(),
        url: page.url.clone(),
        alignment_score: page_alignment_score(page),
    }
}

/// Entity/context/intent alignment weighted 40/30/30 when all three are known,
/// the plain mean of whichever are known otherwise, and the audit score (or 0)
/// when none are.
pub fn page_alignment_score(page: &InventoryPage) -> f64 {
    match (
        page.entity_alignment,
        page.context_alignment,
        page.intent_alignment,
    ) {
        (Some(entity), Some(context), Some(intent)) => {
            entity * ENTITY_WEIGHT + context * CONTEXT_WEIGHT + intent * INTENT_WEIGHT
        }
        (None, None, None) => page.audit_score_or_zero(),
        (entity, context, intent) => {
            let present = [entity, context, intent]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>();
            present.iter().sum::<f64>() / present.len() as f64
        }
    }
}
