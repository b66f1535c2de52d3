//! Fuzzy ranking of tracked paths for the jump-to-file prompt.

use nucleo_matcher::{
    pattern::{AtomKind, CaseMatching, Normalization, Pattern},
    Config, Matcher, Utf32Str,
};

use crate::core::RelPath;

/// Path matcher wrapping nucleo-matcher.
///
/// Reuses internal buffers across calls.
pub struct PathMatcher {
    matcher: Matcher,
    buf: Vec<char>,
}

impl Default for PathMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PathMatcher {
    /// Create a matcher tuned for file paths.
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(Config::DEFAULT.match_paths()),
            buf: Vec::with_capacity(256),
        }
    }

    /// Indices of the best `limit` candidates for `query`, best first.
    ///
    /// An empty query keeps the candidates in their original order.
    pub fn rank(&mut self, query: &str, candidates: &[RelPath], limit: usize) -> Vec<usize> {
        let query = query.trim();
        if query.is_empty() {
            return (0..candidates.len().min(limit)).collect();
        }

        let pat = Pattern::new(
            query,
            CaseMatching::Smart,
            Normalization::Smart,
            AtomKind::Fuzzy,
        );

        let mut results: Vec<(usize, u32)> = candidates
            .iter()
            .enumerate()
            .filter_map(|(idx, path)| {
                self.buf.clear();
                let haystack = Utf32Str::new(path.as_str(), &mut self.buf);
                pat.score(haystack, &mut self.matcher).map(|sc| (idx, sc))
            })
            .collect();

        // Score descending, shorter path first on ties
        results.sort_by(|a, b| {
            b.1.cmp(&a.1).then_with(|| {
                candidates[a.0]
                    .as_str()
                    .len()
                    .cmp(&candidates[b.0].as_str().len())
            })
        });
        results.truncate(limit);

        results.into_iter().map(|(i, _)| i).collect()
    }
}
