use crate::feed::NewsItem;

/// Trim and lower-case raw search input.
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Keep the items whose title and description mention `query`.
///
/// `query` is expected to be normalized already. An empty query keeps every
/// item; order is always preserved.
pub fn filter_items<'a>(items: &'a [NewsItem], query: &str) -> Vec<&'a NewsItem> {
    if query.is_empty() {
        return items.iter().collect();
    }

    items.iter().filter(|item| matches(item, query)).collect()
}

fn matches(item: &NewsItem, query: &str) -> bool {
    let haystack = format!("{}{}", item.title, item.description()).to_lowercase();
    haystack.contains(query)
}
