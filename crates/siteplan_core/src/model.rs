use serde::{Deserialize, Serialize};

/// A crawled, already-audited URL on the existing site.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct InventoryPage {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub h1: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub central_entity: Option<String>,
    #[serde(default)]
    pub search_context: Option<String>,
    #[serde(default)]
    pub search_intent: Option<String>,
    /// Overall audit score, 0-100.
    #[serde(default)]
    pub audit_score: Option<f64>,
    #[serde(default)]
    pub entity_alignment: Option<f64>,
    #[serde(default)]
    pub context_alignment: Option<f64>,
    #[serde(default)]
    pub intent_alignment: Option<f64>,
    /// Cost-of-retrieval score, 0-100.
    #[serde(default)]
    pub cor_score: Option<f64>,
    /// Analytics counts; whole-number floats such as `12.0` are accepted.
    #[serde(default, deserialize_with = "deserialize_count")]
    pub clicks: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub impressions: Option<u64>,
    #[serde(default)]
    pub position: Option<f64>,
    #[serde(default)]
    pub mapped_topic_id: Option<String>,
    /// Canonical URL as declared by the search engine, which may differ from `url`.
    #[serde(default)]
    pub canonical_url: Option<String>,
}

impl InventoryPage {
    pub fn clicks_or_zero(&self) -> u64 {
        self.clicks.unwrap_or(0)
    }

    pub fn audit_score_or_zero(&self) -> f64 {
        self.audit_score.unwrap_or(0.0)
    }

    /// Mapped topic id, treating a blank id as unmapped.
    pub fn mapped_topic(&self) -> Option<&str> {
        non_blank(self.mapped_topic_id.as_deref())
    }

    pub fn declared_canonical(&self) -> Option<&str> {
        non_blank(self.canonical_url.as_deref())
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TopicType {
    Core,
    #[default]
    Outer,
    Child,
}

impl TopicType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Outer => "outer",
            Self::Child => "child",
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ClusterRole {
    Pillar,
    ClusterContent,
}

/// One node of the target topical map.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct StrategyTopic {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub topic_type: TopicType,
    #[serde(default)]
    pub parent_topic_id: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub example_queries: Vec<String>,
    #[serde(default)]
    pub canonical_query: Option<String>,
    #[serde(default)]
    pub cluster_role: Option<ClusterRole>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    H1,
    Title,
    UrlSlug,
    Query,
}

impl SignalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::H1 => "h1",
            Self::Title => "title",
            Self::UrlSlug => "url_slug",
            Self::Query => "query",
        }
    }
}

/// One weighted piece of evidence linking a page to a topic.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MatchSignal {
    pub kind: SignalKind,
    pub score: f64,
    pub weight: f64,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MatchCategory {
    Matched,
    Orphan,
    Cannibalization,
}

impl MatchCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Orphan => "orphan",
            Self::Cannibalization => "cannibalization",
        }
    }
}

/// Verdict for one inventory page. `topic_id` is `None` exactly when the
/// category is `Orphan`; an orphan still reports its closest-miss confidence.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MatchResult {
    pub page_id: String,
    pub page_url: String,
    pub topic_id: Option<String>,
    pub confidence: f64,
    pub signals: Vec<MatchSignal>,
    pub category: MatchCategory,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub competing_urls: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GapImportance {
    Pillar,
    Supporting,
}

impl GapImportance {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pillar => "pillar",
            Self::Supporting => "supporting",
        }
    }
}

/// A strategy topic no inventory page covers.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GapTopic {
    pub topic_id: String,
    pub title: String,
    pub topic_type: TopicType,
    pub importance: GapImportance,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct MatchStats {
    pub total_pages: usize,
    pub total_topics: usize,
    pub matched: usize,
    pub orphans: usize,
    pub cannibalization: usize,
    pub gaps: usize,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct MatchOutcome {
    pub matches: Vec<MatchResult>,
    pub gaps: Vec<GapTopic>,
    pub stats: MatchStats,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OverlayStatus {
    CoveredAligned,
    CoveredNeedsWork,
    Gap,
    Cannibalization,
    Orphan,
}

impl OverlayStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CoveredAligned => "covered_aligned",
            Self::CoveredNeedsWork => "covered_needs_work",
            Self::Gap => "gap",
            Self::Cannibalization => "cannibalization",
            Self::Orphan => "orphan",
        }
    }

    pub fn color(self) -> OverlayColor {
        match self {
            Self::CoveredAligned => OverlayColor::Green,
            Self::CoveredNeedsWork => OverlayColor::Yellow,
            Self::Gap => OverlayColor::Red,
            Self::Cannibalization => OverlayColor::Orange,
            Self::Orphan => OverlayColor::Gray,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OverlayColor {
    Green,
    Yellow,
    Red,
    Orange,
    Gray,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OverlayNodeKind {
    Core,
    Outer,
    Child,
    Orphan,
}

impl From<TopicType> for OverlayNodeKind {
    fn from(value: TopicType) -> Self {
        match value {
            TopicType::Core => Self::Core,
            TopicType::Outer => Self::Outer,
            TopicType::Child => Self::Child,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct OverlayPage {
    pub page_id: String,
    pub url: String,
    pub alignment_score: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct OverlayNode {
    pub id: String,
    pub title: String,
    pub kind: OverlayNodeKind,
    pub status: OverlayStatus,
    pub color: OverlayColor,
    pub matched_pages: Vec<OverlayPage>,
    pub alignment_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Keep,
    Optimize,
    Rewrite,
    Merge,
    #[serde(rename = "REDIRECT_301")]
    Redirect301,
    #[serde(rename = "PRUNE_410")]
    Prune410,
    Canonicalize,
    CreateNew,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keep => "KEEP",
            Self::Optimize => "OPTIMIZE",
            Self::Rewrite => "REWRITE",
            Self::Merge => "MERGE",
            Self::Redirect301 => "REDIRECT_301",
            Self::Prune410 => "PRUNE_410",
            Self::Canonicalize => "CANONICALIZE",
            Self::CreateNew => "CREATE_NEW",
        }
    }
}

/// Priority tiers order from most to least urgent.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    None,
    Low,
    Medium,
    High,
}

impl Effort {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DataImpact {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DataPoint {
    pub label: String,
    pub value: String,
    pub impact: DataImpact,
}

impl DataPoint {
    pub fn new(label: &str, value: impl Into<String>, impact: DataImpact) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
            impact,
        }
    }
}

/// One row of the remediation plan. `source_page_id` and `source_url` are
/// empty for `CREATE_NEW` actions.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PlannedAction {
    pub source_page_id: String,
    pub source_url: String,
    pub action: ActionKind,
    pub priority: Priority,
    pub effort: Effort,
    pub reasoning: String,
    pub data_points: Vec<DataPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_target_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_target_url: Option<String>,
}

fn deserialize_count<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de;
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(ref number) => {
            if let Some(count) = number.as_u64() {
                return Ok(Some(count));
            }
            match number.as_f64() {
                Some(float) if float.is_finite() && float >= 0.0 => Ok(Some(float.round() as u64)),
                _ => Err(de::Error::custom(format!(
                    "count must be a non-negative number, got {number}"
                ))),
            }
        }
        _ => Err(de::Error::custom("count must be a number")),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
