use std::collections::HashSet;

use url::Url;

pub type TokenSet = HashSet<String>;

const PAGE_EXTENSIONS: [&str; 6] = [".html", ".htm", ".php", ".aspx", ".asp", ".jsp"];

/// Lower-case `text`, drop everything that is not alphanumeric, and split on
/// whitespace and hyphens.
pub fn tokenize(text: &str) -> TokenSet {
    let mut cleaned = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            cleaned.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' {
            cleaned.push(' ');
        }
    }
    cleaned
        .split_whitespace()
        .map(ToString::to_string)
        .collect()
}

pub fn tokenize_all<'a>(texts: impl IntoIterator<Item = &'a str>) -> TokenSet {
    let mut tokens = TokenSet::new();
    for text in texts {
        tokens.extend(tokenize(text));
    }
    tokens
}

pub fn jaccard(left: &TokenSet, right: &TokenSet) -> f64 {
    let intersection = left.intersection(right).count();
    let union = left.len() + right.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// `|A ∩ B| / max(|A|, |B|)`.
pub fn overlap_ratio(left: &TokenSet, right: &TokenSet) -> f64 {
    let larger = left.len().max(right.len());
    if larger == 0 {
        return 0.0;
    }
    left.intersection(right).count() as f64 / larger as f64
}

/// Path component of `raw`. Relative or otherwise unparseable URLs go through
/// a manual strip of scheme, host, query and fragment instead of failing.
pub fn url_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(parsed) = Url::parse(trimmed)
        && !parsed.cannot_be_a_base()
    {
        return parsed.path().to_string();
    }

    let without_scheme = match trimmed.find("://") {
        Some(index) => &trimmed[index + 3..],
        None => trimmed,
    };
    let path = if trimmed.contains("://") {
        match without_scheme.find('/') {
            Some(index) => &without_scheme[index..],
            None => "",
        }
    } else {
        without_scheme
    };
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].to_string()
}

pub fn url_slug_tokens(raw: &str) -> TokenSet {
    let path = url_path(raw);
    let mut tokens = TokenSet::new();
    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        let segment = strip_page_extension(segment).replace(['_', '+', '.'], " ");
        tokens.extend(tokenize(&segment));
    }
    tokens
}

fn strip_page_extension(segment: &str) -> &str {
    let lowered = segment.to_ascii_lowercase();
    for extension in PAGE_EXTENSIONS {
        if lowered.ends_with(extension) {
            return &segment[..segment.len() - extension.len()];
        }
    }
    segment
}
