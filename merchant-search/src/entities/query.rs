//! Facet extraction for free-text search queries.

/// Prefix that turns the first token of a query into a billing email filter.
pub const EMAIL_FACET_PREFIX: &str = "email:";

/// A query split into an optional structured filter and free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub email: Option<String>,
    pub text: String,
}

/// Split an order search query.
///
/// `email:<address> rest` yields the sanitized address as a filter and
/// `rest` as free text. When the address is empty or does not survive
/// sanitizing, no filter is set and the whole trimmed query is the free text.
pub fn parse_order_query(query: &str) -> ParsedQuery {
    let trimmed = query.trim();

    if let Some(after_prefix) = trimmed.strip_prefix(EMAIL_FACET_PREFIX) {
        let (candidate, rest) = match after_prefix.split_once(' ') {
            Some((candidate, rest)) => (candidate, rest),
            None => (after_prefix, ""),
        };

        if let Some(email) = sanitize_email(candidate.trim()) {
            return ParsedQuery {
                email: Some(email),
                text: rest.trim().to_string(),
            };
        }
    }

    ParsedQuery {
        email: None,
        text: trimmed.to_string(),
    }
}

const LOCAL_PART_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~.-";

/// Strip characters that cannot appear in an email address.
///
/// Returns `None` when what remains is not shaped like `local@domain.tld`.
pub fn sanitize_email(candidate: &str) -> Option<String> {
    if candidate.len() < 6 {
        return None;
    }

    let (local, domain) = candidate.split_once('@')?;

    let local: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || LOCAL_PART_SPECIALS.contains(*c))
        .collect();
    if local.is_empty() {
        return None;
    }

    let domain = domain.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if domain.contains("..") {
        return None;
    }

    let labels: Vec<String> = domain
        .split('.')
        .map(|label| {
            label
                .trim_matches(|c: char| c == '-' || c.is_whitespace())
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
                .collect::<String>()
        })
        .filter(|label| !label.is_empty())
        .collect();

    if labels.len() < 2 {
        return None;
    }

    Some(format!("{}@{}", local, labels.join(".")))
}
