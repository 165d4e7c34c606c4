//! Matching and planning engine for site migrations: reconciles a crawled page
//! inventory against a topical map, classifies coverage, and plans remediation.
//!
//! [`matcher`], [`overlay`] and [`plan`] are pure functions over in-memory
//! records. [`config`] and [`inputs`] handle the file-backed edges.

pub mod config;
pub mod inputs;
pub mod matcher;
pub mod model;
pub mod overlay;
pub mod plan;
pub mod report;
pub mod text;

pub use matcher::{MatchSettings, QueryLookup, match_pages, match_pages_with};
pub use overlay::{OverlaySettings, compute_overlay, compute_overlay_with, page_alignment_score};
pub use plan::{PlanInput, PlanSettings, generate_plan, generate_plan_with};
