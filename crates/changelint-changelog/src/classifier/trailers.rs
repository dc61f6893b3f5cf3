//! Git trailer parsing
//!
//! Reads `Key: value` lines from a commit body. Values may continue on
//! following lines indented by two spaces.

use std::sync::LazyLock;

use regex::Regex;

use super::Category;

/// `#123`, `GH-123`, `JIRA-123`, `CVE-2024-123`
static REFERENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(#\d+|[a-z]{2,4}-\d+|CVE-\d+-\d+)$").expect("Invalid regex")
});

static REFERENCE_SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*,\s*").expect("Invalid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrailerKey {
    Category,
    Notice,
    CoAuthor,
    Reference,
    /// Recognized only so it stays out of the description
    Excluded,
}

impl TrailerKey {
    fn parse(key: &str) -> Option<Self> {
        let is = |name: &str| key.eq_ignore_ascii_case(name);

        if is("Category") {
            Some(Self::Category)
        } else if is("Notice") {
            Some(Self::Notice)
        } else if is("Co-Authored-By") {
            Some(Self::CoAuthor)
        } else if ["Ref", "Refs", "Fixes", "Closes", "CVE-ID"].into_iter().any(is) {
            Some(Self::Reference)
        } else if ["Reviewed-By", "Signed-Off-By", "Acked-By"].into_iter().any(is) {
            Some(Self::Excluded)
        } else {
            None
        }
    }
}

/// Where a `Category` trailer puts a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    In(Category),
    /// `Category: none`
    Excluded,
}

impl Placement {
    fn parse(value: &str) -> Option<Self> {
        let placement = match value.to_ascii_lowercase().as_str() {
            "change" => Self::In(Category::Changed),
            "addition" => Self::In(Category::Added),
            "removal" => Self::In(Category::Removed),
            "fix" => Self::In(Category::Fixed),
            "uncategorized" => Self::In(Category::Uncategorized),
            "none" => Self::Excluded,
            _ => return None,
        };
        Some(placement)
    }
}

/// What the trailers of a commit body say
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Metadata {
    /// Body without trailer lines
    pub description: String,
    pub placement: Option<Placement>,
    pub notice: Option<String>,
    pub references: Vec<String>,
    /// Co-author names in order of appearance, without duplicates or bots
    pub co_authors: Vec<String>,
}

pub(crate) fn parse(body: &str) -> Metadata {
    let mut metadata = Metadata::default();
    let mut description = String::new();
    let mut lines = body.lines().peekable();

    while let Some(line) = lines.next() {
        let key = line
            .find(':')
            .filter(|pos| *pos > 0)
            .and_then(|pos| TrailerKey::parse(&line[..pos]).map(|key| (key, pos)));

        let Some((key, pos)) = key else {
            description.push_str(line);
            description.push('\n');
            continue;
        };

        let mut value = line[pos + 1..].trim().to_string();

        while let Some(next) = lines.next_if(|next| next.starts_with("  ")) {
            if !value.is_empty() {
                value.push(' ');
            }
            value.push_str(next.trim());
        }

        match key {
            TrailerKey::Category => {
                if let Some(placement) = Placement::parse(strip_period(&value)) {
                    metadata.placement = Some(placement);
                }
            }
            TrailerKey::Notice => {
                if !value.is_empty() {
                    metadata.notice = Some(value);
                }
            }
            TrailerKey::CoAuthor => {
                // "Name <email>", only the name is kept
                if let Some(sep) = value.find('<').filter(|sep| *sep > 0) {
                    let name = value[..sep].trim();

                    if !name.is_empty()
                        && !super::is_bot_name(name)
                        && !metadata.co_authors.iter().any(|n| n == name)
                    {
                        metadata.co_authors.push(name.to_string());
                    }
                }
            }
            TrailerKey::Reference => {
                metadata.references.extend(
                    REFERENCE_SEPARATOR_REGEX
                        .split(strip_period(&value))
                        .filter(|r| REFERENCE_REGEX.is_match(r))
                        .map(String::from),
                );
            }
            TrailerKey::Excluded => {}
        }
    }

    metadata.description = description.trim().to_string();
    metadata
}

fn strip_period(value: &str) -> &str {
    value.strip_suffix('.').unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailers_are_removed_from_description() {
        let metadata = parse(
            "Longer explanation.\n\nSecond paragraph.\n\nCategory: fix\nSigned-off-by: Dev <dev@example.com>",
        );

        assert_eq!(metadata.description, "Longer explanation.\n\nSecond paragraph.");
        assert_eq!(metadata.placement, Some(Placement::In(Category::Fixed)));
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let metadata = parse("category: Addition.\nrefs: #1");
        assert_eq!(metadata.placement, Some(Placement::In(Category::Added)));
        assert_eq!(metadata.references, vec!["#1"]);
    }

    #[test]
    fn test_unknown_category_is_ignored() {
        let metadata = parse("Category: refactor");
        assert_eq!(metadata.placement, None);

        let metadata = parse("Category: none");
        assert_eq!(metadata.placement, Some(Placement::Excluded));
    }

    #[test]
    fn test_multiline_notice() {
        let metadata = parse("Notice: Drops support\n  of Node 8.\nCategory: removal");
        assert_eq!(metadata.notice.as_deref(), Some("Drops support of Node 8."));
        assert_eq!(metadata.placement, Some(Placement::In(Category::Removed)));
    }

    #[test]
    fn test_references_are_filtered() {
        let metadata = parse("Fixes: #12, GH-3 , not a ref, CVE-2024-1234.\nCloses: https://example.com/1");
        assert_eq!(metadata.references, vec!["#12", "GH-3", "CVE-2024-1234"]);
    }

    #[test]
    fn test_co_authors() {
        let metadata = parse(
            "Co-Authored-By: Alice <alice@example.com>\n\
             Co-authored-by: dependabot[bot] <bot@example.com>\n\
             Co-authored-by: Alice <other@example.com>\n\
             Co-authored-by: <nobody@example.com>",
        );
        assert_eq!(metadata.co_authors, vec!["Alice"]);
    }

    #[test]
    fn test_colon_in_prose_is_kept() {
        let metadata = parse("Note: this is prose\nSee: elsewhere");
        assert_eq!(metadata.description, "Note: this is prose\nSee: elsewhere");
    }
}
