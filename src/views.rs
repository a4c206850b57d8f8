//! Precomputed comparison views of a single text field.

use crate::normalize::{collapse, normalize, strip};

/// The three normalized renderings of one text field that matching runs
/// against.
///
/// `collapsed` is `full` without whitespace and `stripped` is `collapsed`
/// without parentheses. All three derive from `full` and are fixed once
/// built; the owning record is immutable, so no invalidation exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSet {
    full: String,
    collapsed: String,
    stripped: String,
}

impl ViewSet {
    /// Build the views for a raw field value.
    ///
    /// # Examples
    ///
    /// ```
    /// use notelens::views::ViewSet;
    ///
    /// let views = ViewSet::new(" 가족(여행) 계획 ");
    /// assert_eq!(views.full(), "가족(여행) 계획");
    /// assert_eq!(views.collapsed(), "가족(여행)계획");
    /// assert_eq!(views.stripped(), "가족여행계획");
    /// ```
    pub fn new(raw: &str) -> Self {
        let full = normalize(raw).trim().to_string();
        let collapsed = collapse(&full);
        let stripped = strip(&collapsed);
        Self {
            full,
            collapsed,
            stripped,
        }
    }

    pub fn full(&self) -> &str {
        &self.full
    }

    pub fn collapsed(&self) -> &str {
        &self.collapsed
    }

    pub fn stripped(&self) -> &str {
        &self.stripped
    }

    /// All views in scoring order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [
            self.full.as_str(),
            self.collapsed.as_str(),
            self.stripped.as_str(),
        ]
        .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn views_of_plain_word_are_identical() {
        let views = ViewSet::new("Report");
        assert_eq!(views.full(), "report");
        assert_eq!(views.collapsed(), "report");
        assert_eq!(views.stripped(), "report");
    }

    #[test]
    fn views_trim_and_normalize() {
        let views = ViewSet::new("  ＮＡＳ  설정 (1).PDF ");
        assert_eq!(views.full(), "nas  설정 (1).pdf");
        assert_eq!(views.collapsed(), "nas설정(1).pdf");
        assert_eq!(views.stripped(), "nas설정1.pdf");
    }

    #[test]
    fn empty_field_has_empty_views() {
        let views = ViewSet::new("   ");
        assert!(views.iter().all(str::is_empty));
    }

    #[test]
    fn iter_yields_three_views_in_order() {
        let views = ViewSet::new("a (b)");
        let all: Vec<&str> = views.iter().collect();
        assert_eq!(all, vec!["a (b)", "a(b)", "ab"]);
    }
}
