/// Row selection for kitten listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KittenFilter {
    #[default]
    All,
    /// Breed name must contain every term, ignoring case
    BreedContains(Vec<String>),
    /// Breed name must equal the value, ignoring case
    BreedNamed(String),
}

impl KittenFilter {
    /// Filter for a `?search=` parameter; blank input selects everything
    pub fn from_search(search: Option<&str>) -> Self {
        let terms = search.map(search_terms).unwrap_or_default();
        if terms.is_empty() {
            KittenFilter::All
        } else {
            KittenFilter::BreedContains(terms)
        }
    }

    /// In-process evaluation against a breed name
    pub fn matches_breed(&self, breed_name: &str) -> bool {
        match self {
            KittenFilter::All => true,
            KittenFilter::BreedContains(terms) => {
                let haystack = breed_name.to_lowercase();
                terms.iter().all(|t| haystack.contains(&t.to_lowercase()))
            }
            KittenFilter::BreedNamed(name) => breed_name.to_lowercase() == name.to_lowercase(),
        }
    }
}

/// Split search text into terms on whitespace and commas
pub fn search_terms(raw: &str) -> Vec<String> {
    raw.replace('\0', "")
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Escape LIKE metacharacters so a term matches literally
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
