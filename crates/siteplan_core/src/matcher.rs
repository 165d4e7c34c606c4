use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::model::{
    ClusterRole, GapImportance, GapTopic, InventoryPage, MatchCategory, MatchOutcome,
    MatchResult, MatchSignal, MatchStats, SignalKind, StrategyTopic, TopicType,
};
use crate::text::{TokenSet, jaccard, overlap_ratio, tokenize, tokenize_all, url_slug_tokens};

pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.4;
pub const DEFAULT_CANNIBALIZATION_THRESHOLD: f64 = 0.3;
pub const DEFAULT_H1_WEIGHT: f64 = 0.30;
pub const DEFAULT_TITLE_WEIGHT: f64 = 0.25;
pub const DEFAULT_URL_WEIGHT: f64 = 0.20;
pub const DEFAULT_QUERY_WEIGHT: f64 = 0.25;
/// Slack for threshold comparisons on renormalized weighted means, which can
/// land one ulp under a boundary they reach exactly.
pub const SCORE_EPSILON: f64 = 1e-9;

/// Search-console style queries keyed by page URL.
pub type QueryLookup = HashMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchSettings {
    pub match_threshold: f64,
    pub cannibalization_threshold: f64,
    pub h1_weight: f64,
    pub title_weight: f64,
    pub url_weight: f64,
    pub query_weight: f64,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            cannibalization_threshold: DEFAULT_CANNIBALIZATION_THRESHOLD,
            h1_weight: DEFAULT_H1_WEIGHT,
            title_weight: DEFAULT_TITLE_WEIGHT,
            url_weight: DEFAULT_URL_WEIGHT,
            query_weight: DEFAULT_QUERY_WEIGHT,
        }
    }
}

impl MatchSettings {
    fn weight(&self, kind: SignalKind) -> f64 {
        match kind {
            SignalKind::H1 => self.h1_weight,
            SignalKind::Title => self.title_weight,
            SignalKind::UrlSlug => self.url_weight,
            SignalKind::Query => self.query_weight,
        }
    }

    pub fn category_for(&self, confidence: f64) -> MatchCategory {
        if meets_threshold(confidence, self.match_threshold) {
            MatchCategory::Matched
        } else {
            MatchCategory::Orphan
        }
    }
}

struct PreparedTopic<'a> {
    topic: &'a StrategyTopic,
    title_tokens: TokenSet,
    slug_tokens: TokenSet,
    keyword_tokens: TokenSet,
}

impl<'a> PreparedTopic<'a> {
    fn new(topic: &'a StrategyTopic) -> Self {
        let title_tokens = tokenize(&topic.title);
        let slug_tokens = tokenize(&topic.slug);
        let mut keyword_tokens = tokenize_all(
            topic
                .keywords
                .iter()
                .chain(topic.example_queries.iter())
                .chain(topic.canonical_query.iter())
                .map(String::as_str),
        );
        if keyword_tokens.is_empty() {
            keyword_tokens = title_tokens.clone();
        }
        Self {
            topic,
            title_tokens,
            slug_tokens,
            keyword_tokens,
        }
    }
}

/// Page-side token sets, computed once per page. `None` marks a signal whose
/// source data is missing.
struct PageEvidence {
    h1: Option<TokenSet>,
    title: Option<TokenSet>,
    slug: Option<TokenSet>,
    queries: Option<(usize, TokenSet)>,
}

impl PageEvidence {
    fn new(page: &InventoryPage, queries: Option<&QueryLookup>) -> Self {
        let slug = url_slug_tokens(&page.url);
        let queries = queries
            .and_then(|lookup| lookup.get(&page.url))
            .filter(|list| list.iter().any(|query| !query.trim().is_empty()))
            .map(|list| (list.len(), tokenize_all(list.iter().map(String::as_str))));
        Self {
            h1: present_text(page.h1.as_deref()).map(tokenize),
            title: present_text(page.title.as_deref()).map(tokenize),
            slug: if slug.is_empty() { None } else { Some(slug) },
            queries,
        }
    }
}

/// Match every page against every topic, flag topics with competing pages,
/// and list topics nothing covers.
pub fn match_pages(
    pages: &[InventoryPage],
    topics: &[StrategyTopic],
    queries: Option<&QueryLookup>,
) -> MatchOutcome {
    match_pages_with(pages, topics, queries, &MatchSettings::default())
}

pub fn match_pages_with(
    pages: &[InventoryPage],
    topics: &[StrategyTopic],
    queries: Option<&QueryLookup>,
    settings: &MatchSettings,
) -> MatchOutcome {
    let prepared = topics.iter().map(PreparedTopic::new).collect::<Vec<_>>();

    let mut matches = pages
        .iter()
        .map(|page| match_page(page, &prepared, queries, settings))
        .collect::<Vec<_>>();
    flag_cannibalization(&mut matches, settings.cannibalization_threshold);
    let gaps = detect_gaps(topics, &matches);

    let stats = MatchStats {
        total_pages: pages.len(),
        total_topics: topics.len(),
        matched: count_category(&matches, MatchCategory::Matched),
        orphans: count_category(&matches, MatchCategory::Orphan),
        cannibalization: count_category(&matches, MatchCategory::Cannibalization),
        gaps: gaps.len(),
    };
    debug!(
        pages = stats.total_pages,
        topics = stats.total_topics,
        matched = stats.matched,
        orphans = stats.orphans,
        cannibalization = stats.cannibalization,
        gaps = stats.gaps,
        "matched inventory against topical map"
    );

    MatchOutcome {
        matches,
        gaps,
        stats,
    }
}

fn match_page(
    page: &InventoryPage,
    topics: &[PreparedTopic<'_>],
    queries: Option<&QueryLookup>,
    settings: &MatchSettings,
) -> MatchResult {
    let evidence = PageEvidence::new(page, queries);

    let mut best_topic: Option<&StrategyTopic> = None;
    let mut best_confidence = 0.0;
    let mut best_signals = Vec::new();
    for (index, prepared) in topics.iter().enumerate() {
        let (confidence, signals) = score_topic(&evidence, prepared, settings);
        // Strict comparison: the earlier topic keeps ties.
        if confidence > best_confidence {
            best_topic = Some(prepared.topic);
            best_confidence = confidence;
            best_signals = signals;
        } else if index == 0 {
            // Zero everywhere: the first topic stands as the closest miss.
            best_signals = signals;
        }
    }

    let category = match best_topic {
        Some(_) => settings.category_for(best_confidence),
        None => MatchCategory::Orphan,
    };
    trace!(
        page = %page.url,
        topic = best_topic.map(|topic| topic.id.as_str()).unwrap_or("<none>"),
        confidence = best_confidence,
        category = category.as_str(),
        "page verdict"
    );

    MatchResult {
        page_id: page.id.clone(),
        page_url: page.url.clone(),
        topic_id: match category {
            MatchCategory::Orphan => None,
            _ => best_topic.map(|topic| topic.id.clone()),
        },
        confidence: best_confidence,
        signals: best_signals,
        category,
        competing_urls: Vec::new(),
    }
}

fn score_topic(
    evidence: &PageEvidence,
    topic: &PreparedTopic<'_>,
    settings: &MatchSettings,
) -> (f64, Vec<MatchSignal>) {
    let mut signals = Vec::with_capacity(4);

    if let Some(h1) = &evidence.h1 {
        let score = jaccard(h1, &topic.title_tokens);
        signals.push(signal(
            SignalKind::H1,
            score,
            settings,
            format!(
                "H1 shares {} with topic title \"{}\"",
                percent(score),
                topic.topic.title
            ),
        ));
    }

    if let Some(title) = &evidence.title {
        let score = jaccard(title, &topic.title_tokens);
        signals.push(signal(
            SignalKind::Title,
            score,
            settings,
            format!(
                "<title> shares {} with topic title \"{}\"",
                percent(score),
                topic.topic.title
            ),
        ));
    }

    if let Some(slug) = &evidence.slug {
        let slug_score = jaccard(slug, &topic.slug_tokens);
        let keyword_score = jaccard(slug, &topic.keyword_tokens);
        let (score, against) = if keyword_score > slug_score {
            (keyword_score, "topic keywords")
        } else {
            (slug_score, "topic slug")
        };
        signals.push(signal(
            SignalKind::UrlSlug,
            score,
            settings,
            format!("URL slug shares {} with {against}", percent(score)),
        ));
    }

    if let Some((query_count, query_tokens)) = &evidence.queries {
        let score = overlap_ratio(query_tokens, &topic.keyword_tokens);
        signals.push(signal(
            SignalKind::Query,
            score,
            settings,
            format!(
                "{query_count} search queries overlap topic keywords by {}",
                percent(score)
            ),
        ));
    }

    (weighted_confidence(&signals), signals)
}

fn signal(kind: SignalKind, score: f64, settings: &MatchSettings, detail: String) -> MatchSignal {
    MatchSignal {
        kind,
        score,
        weight: settings.weight(kind),
        detail,
    }
}

/// Weighted mean over the signals that are present; absent signals drop out of
/// both sums.
pub fn weighted_confidence(signals: &[MatchSignal]) -> f64 {
    let total_weight = signals.iter().map(|signal| signal.weight).sum::<f64>();
    if total_weight <= 0.0 {
        return 0.0;
    }
    let weighted = signals
        .iter()
        .map(|signal| signal.score * signal.weight)
        .sum::<f64>();
    weighted / total_weight
}

fn flag_cannibalization(matches: &mut [MatchResult], threshold: f64) {
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, result) in matches.iter().enumerate() {
        if result.category != MatchCategory::Matched {
            continue;
        }
        if let Some(topic_id) = &result.topic_id {
            groups.entry(topic_id.clone()).or_default().push(index);
        }
    }

    for (topic_id, indices) in groups {
        if indices.len() < 2 {
            continue;
        }
        let competing = indices
            .into_iter()
            .filter(|&index| meets_threshold(matches[index].confidence, threshold))
            .collect::<Vec<_>>();
        if competing.len() < 2 {
            continue;
        }
        debug!(topic = %topic_id, pages = competing.len(), "cannibalization detected");

        let urls = competing
            .iter()
            .map(|&index| matches[index].page_url.clone())
            .collect::<Vec<_>>();
        for (position, &index) in competing.iter().enumerate() {
            let result = &mut matches[index];
            result.category = MatchCategory::Cannibalization;
            result.competing_urls = urls
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != position)
                .map(|(_, url)| url.clone())
                .collect();
        }
    }
}

fn detect_gaps(topics: &[StrategyTopic], matches: &[MatchResult]) -> Vec<GapTopic> {
    let covered = matches
        .iter()
        .filter(|result| result.category != MatchCategory::Orphan)
        .filter_map(|result| result.topic_id.as_deref())
        .collect::<HashSet<_>>();

    topics
        .iter()
        .filter(|topic| !covered.contains(topic.id.as_str()))
        .map(|topic| GapTopic {
            topic_id: topic.id.clone(),
            title: topic.title.clone(),
            topic_type: topic.topic_type,
            importance: gap_importance(topic),
        })
        .collect()
}

pub fn gap_importance(topic: &StrategyTopic) -> GapImportance {
    if topic.cluster_role == Some(ClusterRole::Pillar) || topic.topic_type == TopicType::Core {
        GapImportance::Pillar
    } else {
        GapImportance::Supporting
    }
}

pub fn meets_threshold(score: f64, threshold: f64) -> bool {
    score + SCORE_EPSILON >= threshold
}

fn count_category(matches: &[MatchResult], category: MatchCategory) -> usize {
    matches
        .iter()
        .filter(|result| result.category == category)
        .count()
}

fn present_text(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

fn percent(score: f64) -> String {
    format!("{:.0}%", score * 100.0)
}
