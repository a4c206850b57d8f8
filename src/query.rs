//! Free-text query compilation.

use serde::Serialize;

use crate::normalize::{collapse, normalize, strip};

/// Keyword sets derived from one raw query.
///
/// `match_keywords` drive scoring and include the whitespace-collapsed and
/// paren-stripped variant of every word; `highlight_keywords` are the
/// normalized words alone, since the highlighter derives the reduced
/// forms itself per occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompiledQuery {
    match_keywords: Vec<String>,
    highlight_keywords: Vec<String>,
}

impl CompiledQuery {
    /// Compile a raw query.
    ///
    /// A blank query, or one whose every word normalizes to nothing,
    /// compiles to the empty query.
    ///
    /// # Examples
    ///
    /// ```
    /// use notelens::query::CompiledQuery;
    ///
    /// let query = CompiledQuery::compile("  가족 Trip ");
    /// assert_eq!(query.highlight_keywords(), ["가족", "trip"]);
    /// assert!(CompiledQuery::compile("   ").is_empty());
    /// ```
    pub fn compile(raw: &str) -> Self {
        let mut query = Self::default();

        for word in raw.split_whitespace() {
            let normalized = normalize(word).trim().to_string();
            if normalized.is_empty() {
                continue;
            }
            let collapsed = collapse(&normalized);
            let stripped = strip(&normalized);

            push_unique(&mut query.highlight_keywords, &normalized);
            push_unique(&mut query.match_keywords, &normalized);
            if !collapsed.is_empty() && collapsed != normalized {
                push_unique(&mut query.match_keywords, &collapsed);
            }
            if !stripped.is_empty()
                && stripped != normalized
                && stripped != collapsed
            {
                push_unique(&mut query.match_keywords, &stripped);
            }
        }

        query
    }

    /// Whether this query leaves the corpus unfiltered.
    pub fn is_empty(&self) -> bool {
        self.match_keywords.is_empty()
    }

    pub fn match_keywords(&self) -> &[String] {
        &self.match_keywords
    }

    pub fn highlight_keywords(&self) -> &[String] {
        &self.highlight_keywords
    }
}

fn push_unique(keywords: &mut Vec<String>, keyword: &str) {
    if !keywords.iter().any(|k| k == keyword) {
        keywords.push(keyword.to_string());
    }
}
