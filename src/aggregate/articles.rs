//! News post-processing: filter by source name, then sort.

use std::cmp::Reverse;

use crate::sources::Article;

/// Requested article ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// Newest first.
    Date,
    /// Source name, ascending.
    Source,
}

impl SortBy {
    /// Parse a query value. Matching is exact; anything else means
    /// "keep upstream order".
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "date" => Some(SortBy::Date),
            "source" => Some(SortBy::Source),
            _ => None,
        }
    }
}

/// Keep articles whose source name equals `filter_by` ignoring case, then sort.
///
/// Only an absent or empty filter keeps everything. Sorting is stable.
pub fn filter_and_sort(
    articles: Vec<Article>,
    filter_by: Option<&str>,
    sort_by: Option<SortBy>,
) -> Vec<Article> {
    let mut articles = match filter_by.filter(|term| !term.is_empty()) {
        Some(term) => {
            let term = term.to_lowercase();
            articles
                .into_iter()
                .filter(|article| article.source.name.to_lowercase() == term)
                .collect()
        }
        None => articles,
    };

    match sort_by {
        // Articles without a timestamp sort last.
        Some(SortBy::Date) => articles.sort_by_key(|article| Reverse(article.published_at)),
        Some(SortBy::Source) => articles.sort_by(|a, b| a.source.name.cmp(&b.source.name)),
        None => {}
    }

    articles
}
