/// City and optional country fragments of a free-text query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFragments {
    pub city: String,
    pub country: Option<String>,
}

/// Split a query on its first comma into city and country fragments.
///
/// Everything after the first comma belongs to the country, with further
/// commas rejoined as `", "`. Never fails; empty fragments match broadly.
pub fn parse_query(query: &str) -> QueryFragments {
    let trimmed = query.trim();
    let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();

    match parts.split_first() {
        Some((city, rest)) if !rest.is_empty() => QueryFragments {
            city: city.to_string(),
            country: Some(rest.join(", ").trim().to_string()),
        },
        _ => QueryFragments {
            city: trimmed.to_string(),
            country: None,
        },
    }
}
