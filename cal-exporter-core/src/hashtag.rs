//! Hashtag expressions.
//!
//! Each `-s` argument is one group; commas inside it join tags with AND.
//! Separate `-s` arguments are combined with OR:
//!
//! ```text
//! -s "#a,#b" -s "#c"   =>   (#a AND #b) OR #c
//! ```
//!
//! Matching is a case-insensitive substring test against an event's title
//! and description.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::error::FilterSyntaxError;
use crate::event::Event;

static HASHTAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    // A literal pattern that is known to compile
    Regex::new(r"#\w+").unwrap_or_else(|e| panic!("invalid hashtag pattern: {e}"))
});

/// Disjunction of conjunctions of lowercase hashtags.
///
/// An expression with no groups matches every event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashtagExpression {
    groups: Vec<BTreeSet<String>>,
}

impl HashtagExpression {
    /// Compile raw `-s` arguments. Tokens are trimmed and lowercased; every
    /// token must be `#` followed by at least one character.
    pub fn compile<S: AsRef<str>>(inputs: &[S]) -> Result<Self, FilterSyntaxError> {
        let groups = inputs
            .iter()
            .map(|input| compile_group(input.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(HashtagExpression { groups })
    }

    /// True when no groups were given.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Evaluate against raw text.
    pub fn matches(&self, text: &str) -> bool {
        if self.groups.is_empty() {
            return true;
        }

        let haystack = text.to_lowercase();
        self.groups
            .iter()
            .any(|group| group.iter().all(|tag| haystack.contains(tag.as_str())))
    }

    /// Evaluate against an event's title and description.
    pub fn matches_event(&self, event: &Event) -> bool {
        self.matches(&event.search_text())
    }
}

fn compile_group(input: &str) -> Result<BTreeSet<String>, FilterSyntaxError> {
    input
        .split(',')
        .map(|raw| {
            let token = raw.trim();
            if token.is_empty() {
                return Err(FilterSyntaxError {
                    token: input.to_string(),
                    reason: "empty hashtag".to_string(),
                });
            }
            if !token.starts_with('#') {
                return Err(FilterSyntaxError {
                    token: token.to_string(),
                    reason: "hashtags must start with '#'".to_string(),
                });
            }
            if token.len() == 1 {
                return Err(FilterSyntaxError {
                    token: token.to_string(),
                    reason: "missing name after '#'".to_string(),
                });
            }
            Ok(token.to_lowercase())
        })
        .collect()
}

/// All `#word` occurrences in `text`, in order of appearance.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    HASHTAG_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
