//! Registry of supported cities and their upstream locators.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportedCity {
    pub canonical_name: &'static str,
    pub upstream_locator: &'static str,
}

const fn city(canonical_name: &'static str, upstream_locator: &'static str) -> SupportedCity {
    SupportedCity { canonical_name, upstream_locator }
}

static CITIES: &[SupportedCity] = &[
    city("New York", "New York,US"),
    city("London", "London,GB"),
    city("Tokyo", "Tokyo,JP"),
    city("Sydney", "Sydney,AU"),
    city("Paris", "Paris,FR"),
    city("Los Angeles", "Los Angeles,US"),
    city("Chicago", "Chicago,US"),
    city("Houston", "Houston,US"),
    city("Phoenix", "Phoenix,US"),
    city("San Francisco", "San Francisco,US"),
    city("Berlin", "Berlin,DE"),
    city("Mumbai", "Mumbai,IN"),
    city("Singapore", "Singapore,SG"),
    city("Toronto", "Toronto,CA"),
    city("Dubai", "Dubai,AE"),
];

pub fn all() -> &'static [SupportedCity] {
    CITIES
}

/// Canonical names in registry order.
pub fn names() -> Vec<&'static str> {
    CITIES.iter().map(|c| c.canonical_name).collect()
}

/// Title-case `raw` and look it up. Exact match only.
pub fn normalize(raw: &str) -> Option<&'static SupportedCity> {
    let wanted = title_case(raw);
    CITIES.iter().find(|c| c.canonical_name == wanted)
}

pub fn is_supported(canonical_name: &str) -> bool {
    CITIES.iter().any(|c| c.canonical_name == canonical_name)
}

pub fn locator_for(canonical_name: &str) -> Option<&'static str> {
    CITIES
        .iter()
        .find(|c| c.canonical_name == canonical_name)
        .map(|c| c.upstream_locator)
}

/// Uppercase the first letter of every run of letters and lowercase the rest.
/// Everything else, whitespace included, is kept as is.
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_word = false;
    for ch in raw.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}
