use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::model::{
    ActionKind, DataImpact, DataPoint, Effort, GapImportance, GapTopic, InventoryPage,
    MatchCategory, MatchOutcome, MatchResult, PlannedAction, Priority, StrategyTopic,
};

pub const DEFAULT_KEEP_MIN_SCORE: f64 = 70.0;
pub const DEFAULT_OPTIMIZE_MIN_SCORE: f64 = 40.0;
pub const DEFAULT_REDIRECT_MIN_CLICKS: u64 = 10;
pub const DEFAULT_PRUNE_MAX_SCORE: f64 = 30.0;

/// Label of the data point the final ordering reads click counts from.
pub const CLICKS_LABEL: &str = "Clicks";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanSettings {
    /// Matched pages scoring at least this are kept.
    pub keep_min_score: f64,
    /// Matched pages with traffic scoring at least this are optimized rather than rewritten.
    pub optimize_min_score: f64,
    /// Orphans with more clicks than this are redirected.
    pub redirect_min_clicks: u64,
    /// Low-traffic orphans scoring below this are pruned.
    pub prune_max_score: f64,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            keep_min_score: DEFAULT_KEEP_MIN_SCORE,
            optimize_min_score: DEFAULT_OPTIMIZE_MIN_SCORE,
            redirect_min_clicks: DEFAULT_REDIRECT_MIN_CLICKS,
            prune_max_score: DEFAULT_PRUNE_MAX_SCORE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlanInput<'a> {
    pub inventory: &'a [InventoryPage],
    pub topics: &'a [StrategyTopic],
    pub outcome: &'a MatchOutcome,
}

pub fn generate_plan(input: &PlanInput<'_>) -> Vec<PlannedAction> {
    generate_plan_with(input, &PlanSettings::default())
}

/// Turn a match outcome into remediation actions, most urgent first.
pub fn generate_plan_with(input: &PlanInput<'_>, settings: &PlanSettings) -> Vec<PlannedAction> {
    let pages = input
        .inventory
        .iter()
        .map(|page| (page.id.as_str(), page))
        .collect::<HashMap<_, _>>();
    let topics = input
        .topics
        .iter()
        .map(|topic| (topic.id.as_str(), topic))
        .collect::<HashMap<_, _>>();
    let topic_title = |topic_id: &str| -> String {
        topics
            .get(topic_id)
            .map(|topic| topic.title.clone())
            .unwrap_or_else(|| topic_id.to_string())
    };

    let mut actions = Vec::new();
    let mut resolved_topics = HashSet::new();
    for result in &input.outcome.matches {
        let Some(page) = pages.get(result.page_id.as_str()).copied() else {
            trace!(page = %result.page_id, "match result without inventory page");
            continue;
        };
        match result.category {
            MatchCategory::Matched => {
                let title = result
                    .topic_id
                    .as_deref()
                    .map(&topic_title)
                    .unwrap_or_default();
                actions.push(plan_matched(page, result, &title, settings));
            }
            MatchCategory::Cannibalization => {
                if let Some(topic_id) = result.topic_id.as_deref()
                    && resolved_topics.insert(topic_id)
                {
                    let title = topic_title(topic_id);
                    actions.extend(plan_merge_group(
                        topic_id,
                        &title,
                        &input.outcome.matches,
                        &pages,
                    ));
                }
            }
            MatchCategory::Orphan => actions.push(plan_orphan(page, result, settings)),
        }
    }
    actions.extend(input.outcome.gaps.iter().map(plan_gap));

    sort_actions(&mut actions);
    debug!(actions = actions.len(), "generated migration plan");
    actions
}

fn plan_matched(
    page: &InventoryPage,
    result: &MatchResult,
    topic_title: &str,
    settings: &PlanSettings,
) -> PlannedAction {
    let score = page.audit_score_or_zero();
    let clicks = page.clicks_or_zero();
    let confidence = percent(result.confidence);

    let (action, priority, effort, reasoning) = if score >= settings.keep_min_score {
        let reasoning = if clicks > 0 {
            format!(
                "Page matches \"{topic_title}\" ({confidence} confidence), scores {score:.0}/100 and earns {clicks} clicks. Keep it as is."
            )
        } else {
            format!(
                "Page matches \"{topic_title}\" ({confidence} confidence) and scores {score:.0}/100 but has no clicks yet. The content is sound; keep it and let it earn traffic."
            )
        };
        (ActionKind::Keep, Priority::Low, Effort::None, reasoning)
    } else if clicks > 0 && score >= settings.optimize_min_score {
        (
            ActionKind::Optimize,
            Priority::High,
            Effort::Medium,
            format!(
                "Page earns {clicks} clicks for \"{topic_title}\" but scores {score:.0}/100, below the {:.0} needed to keep it. Optimize the existing content to protect that traffic.",
                settings.keep_min_score
            ),
        )
    } else if clicks > 0 {
        (
            ActionKind::Rewrite,
            Priority::Critical,
            Effort::High,
            format!(
                "Page earns {clicks} clicks for \"{topic_title}\" but scores only {score:.0}/100. Rewrite it urgently before the traffic is lost."
            ),
        )
    } else {
        (
            ActionKind::Rewrite,
            Priority::Medium,
            Effort::High,
            format!(
                "Page matches \"{topic_title}\" but scores {score:.0}/100 and has 0 clicks. Rewrite it against the topic brief."
            ),
        )
    };

    PlannedAction {
        source_page_id: page.id.clone(),
        source_url: page.url.clone(),
        action,
        priority,
        effort,
        reasoning,
        data_points: vec![
            clicks_point(clicks),
            score_point(score, settings.keep_min_score),
            DataPoint::new("Match confidence", confidence, DataImpact::Neutral),
        ],
        topic_id: result.topic_id.clone(),
        merge_target_url: None,
        redirect_target_url: None,
    }
}

fn plan_merge_group(
    topic_id: &str,
    topic_title: &str,
    matches: &[MatchResult],
    pages: &HashMap<&str, &InventoryPage>,
) -> Vec<PlannedAction> {
    let mut group = matches
        .iter()
        .filter(|result| {
            result.category == MatchCategory::Cannibalization
                && result.topic_id.as_deref() == Some(topic_id)
        })
        .filter_map(|result| pages.get(result.page_id.as_str()).copied())
        .collect::<Vec<_>>();
    group.sort_by(|left, right| right.clicks_or_zero().cmp(&left.clicks_or_zero()));

    let Some(target) = group.first().copied() else {
        return Vec::new();
    };
    let competing = group.len();
    let target_clicks = target.clicks_or_zero();
    trace!(topic = %topic_id, target = %target.url, competing, "resolved merge group");

    group
        .into_iter()
        .map(|page| {
            let clicks = page.clicks_or_zero();
            let is_target = page.id == target.id;
            let reasoning = if is_target {
                format!(
                    "{competing} pages compete for \"{topic_title}\". This page has the most traffic ({clicks} clicks), so the other {} merge into it.",
                    competing - 1
                )
            } else {
                format!(
                    "{competing} pages compete for \"{topic_title}\". Merge this page ({clicks} clicks) into {} ({target_clicks} clicks) and 301-redirect it there.",
                    target.url
                )
            };
            let target_url = (!is_target).then(|| target.url.clone());
            PlannedAction {
                source_page_id: page.id.clone(),
                source_url: page.url.clone(),
                action: ActionKind::Merge,
                priority: Priority::High,
                effort: Effort::Medium,
                reasoning,
                data_points: vec![
                    clicks_point(clicks),
                    DataPoint::new(
                        "Competing pages",
                        competing.to_string(),
                        DataImpact::Negative,
                    ),
                    DataPoint::new(
                        "Role",
                        if is_target { "merge target" } else { "merged away" },
                        DataImpact::Neutral,
                    ),
                ],
                topic_id: Some(topic_id.to_string()),
                merge_target_url: target_url.clone(),
                redirect_target_url: target_url,
            }
        })
        .collect()
}

fn plan_orphan(
    page: &InventoryPage,
    result: &MatchResult,
    settings: &PlanSettings,
) -> PlannedAction {
    let score = page.audit_score_or_zero();
    let clicks = page.clicks_or_zero();
    let mut data_points = vec![
        clicks_point(clicks),
        score_point(score, settings.keep_min_score),
        DataPoint::new(
            "Closest topic match",
            percent(result.confidence),
            DataImpact::Negative,
        ),
    ];

    let canonical = page
        .declared_canonical()
        .filter(|canonical| *canonical != page.url.trim());
    let (action, priority, effort, reasoning) = if let Some(canonical) = canonical {
        data_points.push(DataPoint::new(
            "Declared canonical",
            canonical,
            DataImpact::Negative,
        ));
        (
            ActionKind::Canonicalize,
            Priority::High,
            Effort::Low,
            format!(
                "Search engines treat {canonical} as the canonical version of this page instead of {} ({clicks} clicks). Fix the canonical signal before anything else.",
                page.url
            ),
        )
    } else if clicks > settings.redirect_min_clicks {
        (
            ActionKind::Redirect301,
            Priority::High,
            Effort::Low,
            format!(
                "Page maps to no strategy topic (closest match {}) but still earns {clicks} clicks. 301-redirect it to the most relevant page to keep that traffic.",
                percent(result.confidence)
            ),
        )
    } else if score < settings.prune_max_score {
        (
            ActionKind::Prune410,
            Priority::Medium,
            Effort::Low,
            format!(
                "Page maps to no strategy topic, earns only {clicks} clicks and scores {score:.0}/100. Remove it with a 410."
            ),
        )
    } else {
        (
            ActionKind::Keep,
            Priority::Low,
            Effort::None,
            format!(
                "Page maps to no strategy topic but scores {score:.0}/100 with {clicks} clicks. Keep it for now and review how it links into the map."
            ),
        )
    };

    PlannedAction {
        source_page_id: page.id.clone(),
        source_url: page.url.clone(),
        action,
        priority,
        effort,
        reasoning,
        data_points,
        topic_id: None,
        merge_target_url: None,
        redirect_target_url: None,
    }
}

fn plan_gap(gap: &GapTopic) -> PlannedAction {
    let (priority, reasoning) = match gap.importance {
        GapImportance::Pillar => (
            Priority::Critical,
            format!(
                "No existing page covers the {} pillar topic \"{}\". Create it first; the supporting content depends on it.",
                gap.topic_type.as_str(),
                gap.title
            ),
        ),
        GapImportance::Supporting => (
            Priority::Medium,
            format!(
                "No existing page covers the {} topic \"{}\". Create new content for it.",
                gap.topic_type.as_str(),
                gap.title
            ),
        ),
    };

    PlannedAction {
        source_page_id: String::new(),
        source_url: String::new(),
        action: ActionKind::CreateNew,
        priority,
        effort: Effort::High,
        reasoning,
        data_points: vec![
            DataPoint::new("Topic", gap.title.clone(), DataImpact::Neutral),
            DataPoint::new("Importance", gap.importance.as_str(), DataImpact::Negative),
            DataPoint::new("Matched pages", "0", DataImpact::Negative),
        ],
        topic_id: Some(gap.topic_id.clone()),
        merge_target_url: None,
        redirect_target_url: None,
    }
}

/// Stable sort by priority tier, then by the action's own click count, highest first.
pub fn sort_actions(actions: &mut [PlannedAction]) {
    actions.sort_by(|left, right| {
        left.priority
            .cmp(&right.priority)
            .then_with(|| action_clicks(right).cmp(&action_clicks(left)))
    });
}

/// Click count recorded in the action's data points; 0 when absent.
pub fn action_clicks(action: &PlannedAction) -> u64 {
    action
        .data_points
        .iter()
        .find(|point| point.label == CLICKS_LABEL)
        .and_then(|point| point.value.parse().ok())
        .unwrap_or(0)
}

fn clicks_point(clicks: u64) -> DataPoint {
    let impact = if clicks > 0 {
        DataImpact::Positive
    } else {
        DataImpact::Neutral
    };
    DataPoint::new(CLICKS_LABEL, clicks.to_string(), impact)
}

fn score_point(score: f64, keep_min_score: f64) -> DataPoint {
    let impact = if score >= keep_min_score {
        DataImpact::Positive
    } else {
        DataImpact::Negative
    };
    DataPoint::new("Audit score", format!("{score:.0}/100"), impact)
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::match_pages;
    use crate::model::{MatchStats, TopicType};

    fn inventory_page(
        id: &str,
        url: &str,
        audit: Option<f64>,
        clicks: Option<u64>,
    ) -> InventoryPage {
        InventoryPage {
            id: id.to_string(),
            url: url.to_string(),
            audit_score: audit,
            clicks,
            ..InventoryPage::default()
        }
    }

    fn topic(id: &str, title: &str, topic_type: TopicType) -> StrategyTopic {
        StrategyTopic {
            id: id.to_string(),
            title: title.to_string(),
            slug: id.to_string(),
            topic_type,
            ..StrategyTopic::default()
        }
    }

    fn result(
        page: &InventoryPage,
        topic_id: Option<&str>,
        category: MatchCategory,
    ) -> MatchResult {
        MatchResult {
            page_id: page.id.clone(),
            page_url: page.url.clone(),
            topic_id: topic_id.map(ToString::to_string),
            confidence: if topic_id.is_some() { 0.8 } else { 0.1 },
            signals: Vec::new(),
            category,
            competing_urls: Vec::new(),
        }
    }

    fn outcome(matches: Vec<MatchResult>, gaps: Vec<GapTopic>) -> MatchOutcome {
        MatchOutcome {
            matches,
            gaps,
            stats: MatchStats::default(),
        }
    }

    fn plan_single_matched(audit: f64, clicks: u64) -> PlannedAction {
        let page = inventory_page("p1", "/page", Some(audit), Some(clicks));
        let topics = [topic("t1", "Topic", TopicType::Outer)];
        let outcome = outcome(
            vec![result(&page, Some("t1"), MatchCategory::Matched)],
            Vec::new(),
        );
        let inventory = [page];
        let mut plan = generate_plan(&PlanInput {
            inventory: &inventory,
            topics: &topics,
            outcome: &outcome,
        });
        assert_eq!(plan.len(), 1);
        plan.remove(0)
    }

    fn assert_tiers(action: &PlannedAction, kind: ActionKind, priority: Priority, effort: Effort) {
        assert_eq!(action.action, kind, "{}", action.reasoning);
        assert_eq!(action.priority, priority, "{}", action.reasoning);
        assert_eq!(action.effort, effort, "{}", action.reasoning);
    }

    #[test]
    fn matched_branch_table() {
        assert_tiers(
            &plan_single_matched(85.0, 120),
            ActionKind::Keep,
            Priority::Low,
            Effort::None,
        );
        assert_tiers(&plan_single_matched(70.0, 0), ActionKind::Keep, Priority::Low, Effort::None);
        assert_tiers(
            &plan_single_matched(69.0, 5),
            ActionKind::Optimize,
            Priority::High,
            Effort::Medium,
        );
        assert_tiers(
            &plan_single_matched(40.0, 1),
            ActionKind::Optimize,
            Priority::High,
            Effort::Medium,
        );
        assert_tiers(
            &plan_single_matched(39.0, 30),
            ActionKind::Rewrite,
            Priority::Critical,
            Effort::High,
        );
        assert_tiers(
            &plan_single_matched(55.0, 0),
            ActionKind::Rewrite,
            Priority::Medium,
            Effort::High,
        );
        assert_tiers(
            &plan_single_matched(10.0, 0),
            ActionKind::Rewrite,
            Priority::Medium,
            Effort::High,
        );
    }

    #[test]
    fn matched_reasoning_cites_numbers() {
        let action = plan_single_matched(52.0, 340);
        assert!(action.reasoning.contains("340 clicks"));
        assert!(action.reasoning.contains("52/100"));
        assert!(action.reasoning.contains("\"Topic\""));
        assert_eq!(action.topic_id.as_deref(), Some("t1"));
    }

    #[test]
    fn cannibalization_scenario_merges_into_top_traffic_page() {
        let pages = [
            InventoryPage {
                h1: Some("CMS Benefits".to_string()),
                ..inventory_page("p1", "/cms-benefits", Some(75.0), Some(100))
            },
            InventoryPage {
                h1: Some("CMS Benefits".to_string()),
                ..inventory_page("p2", "/cms-advantages", Some(65.0), Some(50))
            },
        ];
        let topics = [topic("cms-benefits", "CMS Benefits", TopicType::Outer)];
        let matched = match_pages(&pages, &topics, None);
        assert_eq!(matched.stats.cannibalization, 2);

        let plan = generate_plan(&PlanInput {
            inventory: &pages,
            topics: &topics,
            outcome: &matched,
        });
        assert_eq!(plan.len(), 2);
        assert!(plan.iter().all(|action| action.action == ActionKind::Merge));
        assert!(plan.iter().all(|action| action.priority == Priority::High));
        assert!(plan.iter().all(|action| action.effort == Effort::Medium));

        let target = plan
            .iter()
            .find(|action| action.source_url == "/cms-benefits")
            .expect("target");
        assert!(target.merge_target_url.is_none());
        assert!(target.redirect_target_url.is_none());

        let merged = plan
            .iter()
            .find(|action| action.source_url == "/cms-advantages")
            .expect("merged");
        assert_eq!(merged.merge_target_url.as_deref(), Some("/cms-benefits"));
        assert_eq!(merged.redirect_target_url.as_deref(), Some("/cms-benefits"));
        assert!(merged.reasoning.contains("2 pages compete"));
        assert!(merged.reasoning.contains("CMS Benefits"));
    }

    #[test]
    fn merge_group_is_emitted_once_even_when_listed_out_of_click_order() {
        let low = inventory_page("p1", "/low", Some(50.0), Some(5));
        let high = inventory_page("p2", "/high", Some(50.0), Some(500));
        let mid = inventory_page("p3", "/mid", Some(50.0), Some(50));
        let matches = vec![
            result(&low, Some("t1"), MatchCategory::Cannibalization),
            result(&high, Some("t1"), MatchCategory::Cannibalization),
            result(&mid, Some("t1"), MatchCategory::Cannibalization),
        ];
        let inventory = [low, high, mid];
        let topics = [topic("t1", "Shared", TopicType::Outer)];
        let outcome = outcome(matches, Vec::new());

        let plan = generate_plan(&PlanInput {
            inventory: &inventory,
            topics: &topics,
            outcome: &outcome,
        });
        let urls = plan
            .iter()
            .map(|action| action.source_url.as_str())
            .collect::<Vec<_>>();
        assert_eq!(urls, vec!["/high", "/mid", "/low"]);
        assert!(plan[0].merge_target_url.is_none());
        assert_eq!(plan[2].merge_target_url.as_deref(), Some("/high"));
    }

    fn plan_single_orphan(page: InventoryPage) -> PlannedAction {
        let outcome = outcome(vec![result(&page, None, MatchCategory::Orphan)], Vec::new());
        let inventory = [page];
        let mut plan = generate_plan(&PlanInput {
            inventory: &inventory,
            topics: &[],
            outcome: &outcome,
        });
        plan.remove(0)
    }

    #[test]
    fn orphan_with_differing_canonical_is_canonicalized_first() {
        let page = InventoryPage {
            canonical_url: Some("https://example.com/other".to_string()),
            ..inventory_page("p1", "https://example.com/page", Some(10.0), Some(500))
        };
        let action = plan_single_orphan(page);
        assert_tiers(&action, ActionKind::Canonicalize, Priority::High, Effort::Low);
        assert!(action.reasoning.contains("https://example.com/other"));
    }

    #[test]
    fn orphan_with_traffic_is_redirected() {
        let page = InventoryPage {
            canonical_url: Some("/old-promo".to_string()),
            ..inventory_page("p1", "/old-promo", Some(80.0), Some(50))
        };
        let action = plan_single_orphan(page);
        assert_tiers(&action, ActionKind::Redirect301, Priority::High, Effort::Low);
        assert!(action.reasoning.contains("50 clicks"));
    }

    #[test]
    fn canonical_matching_a_padded_url_is_not_a_conflict() {
        let page = InventoryPage {
            canonical_url: Some("/old-promo".to_string()),
            ..inventory_page("p1", " /old-promo ", Some(80.0), Some(50))
        };
        let action = plan_single_orphan(page);
        assert_eq!(action.action, ActionKind::Redirect301, "{}", action.reasoning);
    }

    #[test]
    fn redirect_reasoning_keeps_closest_miss_precision() {
        let page = inventory_page("p1", "/old-promo", Some(80.0), Some(50));
        let mut miss = result(&page, None, MatchCategory::Orphan);
        miss.confidence = 0.395;
        let inventory = [page];
        let outcome = outcome(vec![miss], Vec::new());
        let plan = generate_plan(&PlanInput {
            inventory: &inventory,
            topics: &[],
            outcome: &outcome,
        });
        assert_eq!(plan[0].action, ActionKind::Redirect301);
        assert!(plan[0].reasoning.contains("closest match 39.5%"), "{}", plan[0].reasoning);
    }

    #[test]
    fn orphan_click_boundary_is_exclusive() {
        let action = plan_single_orphan(inventory_page("p1", "/a", Some(20.0), Some(10)));
        assert_tiers(&action, ActionKind::Prune410, Priority::Medium, Effort::Low);
        let action = plan_single_orphan(inventory_page("p1", "/a", Some(20.0), Some(11)));
        assert_eq!(action.action, ActionKind::Redirect301);
    }

    #[test]
    fn weak_orphan_is_pruned_and_decent_orphan_kept() {
        let pruned = plan_single_orphan(inventory_page("p1", "/thin", None, None));
        assert_tiers(&pruned, ActionKind::Prune410, Priority::Medium, Effort::Low);
        assert!(pruned.reasoning.contains("0/100"));

        let kept = plan_single_orphan(inventory_page("p2", "/about", Some(30.0), Some(3)));
        assert_tiers(&kept, ActionKind::Keep, Priority::Low, Effort::None);
    }

    #[test]
    fn core_gap_becomes_critical_create_new() {
        let topics = [
            topic("t1", "Headless CMS", TopicType::Core),
            topic("t2", "CMS plugins", TopicType::Child),
        ];
        let matched = match_pages(&[], &topics, None);
        let plan = generate_plan(&PlanInput {
            inventory: &[],
            topics: &topics,
            outcome: &matched,
        });

        assert_eq!(plan.len(), 2);
        assert_tiers(&plan[0], ActionKind::CreateNew, Priority::Critical, Effort::High);
        assert_eq!(plan[0].topic_id.as_deref(), Some("t1"));
        assert!(plan[0].source_url.is_empty());
        assert!(plan[0].reasoning.contains("Headless CMS"));
        assert_tiers(&plan[1], ActionKind::CreateNew, Priority::Medium, Effort::High);
    }

    #[test]
    fn output_obeys_priority_then_clicks_order() {
        let inventory = [
            inventory_page("p1", "/keep", Some(90.0), Some(1000)),
            inventory_page("p2", "/opt-small", Some(50.0), Some(5)),
            inventory_page("p3", "/rewrite", Some(20.0), Some(70)),
            inventory_page("p4", "/opt-big", Some(50.0), Some(900)),
            inventory_page("p5", "/orphan", Some(50.0), Some(40)),
            inventory_page("p6", "/prune", Some(5.0), Some(0)),
        ];
        let topics = [
            topic("t1", "One", TopicType::Outer),
            topic("t2", "Two", TopicType::Outer),
            topic("t3", "Three", TopicType::Outer),
            topic("t4", "Four", TopicType::Outer),
            topic("t5", "Gap", TopicType::Core),
        ];
        let matches = vec![
            result(&inventory[0], Some("t1"), MatchCategory::Matched),
            result(&inventory[1], Some("t2"), MatchCategory::Matched),
            result(&inventory[2], Some("t3"), MatchCategory::Matched),
            result(&inventory[3], Some("t4"), MatchCategory::Matched),
            result(&inventory[4], None, MatchCategory::Orphan),
            result(&inventory[5], None, MatchCategory::Orphan),
        ];
        let gaps = vec![GapTopic {
            topic_id: "t5".to_string(),
            title: "Gap".to_string(),
            topic_type: TopicType::Core,
            importance: GapImportance::Pillar,
        }];
        let outcome = outcome(matches, gaps);

        let plan = generate_plan(&PlanInput {
            inventory: &inventory,
            topics: &topics,
            outcome: &outcome,
        });
        let order = plan
            .iter()
            .map(|action| (action.action, action.source_url.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![
                (ActionKind::Rewrite, "/rewrite"),
                (ActionKind::CreateNew, ""),
                (ActionKind::Optimize, "/opt-big"),
                (ActionKind::Redirect301, "/orphan"),
                (ActionKind::Optimize, "/opt-small"),
                (ActionKind::Prune410, "/prune"),
                (ActionKind::Keep, "/keep"),
            ]
        );
        for pair in plan.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.priority < b.priority
                    || (a.priority == b.priority && action_clicks(a) >= action_clicks(b))
            );
        }
    }

    #[test]
    fn action_clicks_reads_data_points() {
        let action = plan_single_matched(90.0, 42);
        assert_eq!(action_clicks(&action), 42);
        let gap = plan_gap(&GapTopic {
            topic_id: "t".to_string(),
            title: "T".to_string(),
            topic_type: TopicType::Outer,
            importance: GapImportance::Supporting,
        });
        assert_eq!(action_clicks(&gap), 0);
    }

    #[test]
    fn results_for_unknown_pages_are_skipped() {
        let ghost = inventory_page("ghost", "/ghost", None, None);
        let outcome = outcome(vec![result(&ghost, None, MatchCategory::Orphan)], Vec::new());
        let plan = generate_plan(&PlanInput {
            inventory: &[],
            topics: &[],
            outcome: &outcome,
        });
        assert!(plan.is_empty());
    }
}
