//! Search over the render list.
//!
//! Matches are always reported in render order, whatever the matcher kind, so
//! stepping through them walks down the tree.

use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::label::search_text;
use crate::node::NodeId;
use crate::store::Store;
use crate::view::RenderList;

/// How a search pattern is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Case-insensitive substring.
    #[default]
    Substring,
    /// Case-insensitive regular expression.
    Regex,
    /// Fuzzy subsequence match.
    Fuzzy,
}

enum Compiled {
    Substring(String),
    Regex(Regex),
    Fuzzy(Pattern),
}

impl std::fmt::Debug for Compiled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Substring(needle) => f.debug_tuple("Substring").field(needle).finish(),
            Self::Regex(regex) => f.debug_tuple("Regex").field(&regex.as_str()).finish(),
            Self::Fuzzy(_) => f.write_str("Fuzzy"),
        }
    }
}

impl Compiled {
    fn new(pattern: &str, mode: SearchMode) -> Result<Self, SearchError> {
        match mode {
            SearchMode::Substring => Ok(Self::Substring(pattern.to_lowercase())),
            SearchMode::Regex => RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map(Self::Regex)
                .map_err(|e| SearchError::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                }),
            SearchMode::Fuzzy => Ok(Self::Fuzzy(Pattern::new(
                pattern,
                CaseMatching::Ignore,
                Normalization::Smart,
                AtomKind::Fuzzy,
            ))),
        }
    }

    fn is_match(&self, text: &str, matcher: &mut Matcher, buf: &mut Vec<char>) -> bool {
        match self {
            Self::Substring(needle) => text.to_lowercase().contains(needle.as_str()),
            Self::Regex(regex) => regex.is_match(text),
            Self::Fuzzy(pattern) => {
                let haystack = Utf32Str::new(text, buf);
                pattern.score(haystack, matcher).is_some()
            }
        }
    }
}

/// Compiled pattern, ordered matches and a cursor into them.
#[derive(Debug, Default)]
pub struct SearchIndex {
    mode: SearchMode,
    match_keys: bool,
    query: String,
    compiled: Option<Compiled>,
    matches: Vec<NodeId>,
    cursor: Option<usize>,
}

impl SearchIndex {
    pub fn new(mode: SearchMode, match_keys: bool) -> Self {
        Self {
            mode,
            match_keys,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// The pattern as typed.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_active(&self) -> bool {
        self.compiled.is_some()
    }

    /// Matching ids in render order.
    pub fn matches(&self) -> &[NodeId] {
        &self.matches
    }

    /// Index of the current match.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// The current match.
    pub fn current(&self) -> Option<NodeId> {
        self.cursor.and_then(|i| self.matches.get(i).copied())
    }

    pub fn is_match(&self, id: NodeId) -> bool {
        self.matches.contains(&id)
    }

    /// Compile `pattern` and match it against `list`. An empty pattern clears
    /// the search.
    ///
    /// On an invalid pattern the search is left cleared.
    pub fn set_pattern(
        &mut self,
        pattern: &str,
        store: &Store,
        list: &RenderList,
    ) -> Result<(), SearchError> {
        self.clear();
        if pattern.is_empty() {
            return Ok(());
        }
        self.compiled = Some(Compiled::new(pattern, self.mode)?);
        self.query = pattern.to_string();
        self.refresh(store, list);
        Ok(())
    }

    /// Switch matcher kind, recompiling the current pattern.
    pub fn set_mode(
        &mut self,
        mode: SearchMode,
        store: &Store,
        list: &RenderList,
    ) -> Result<(), SearchError> {
        self.mode = mode;
        let query = std::mem::take(&mut self.query);
        self.set_pattern(&query, store, list)
    }

    /// Recompute matches after the render list changed.
    ///
    /// The cursor stays on the same id if it still matches, otherwise it goes
    /// back to the first match.
    pub fn refresh(&mut self, store: &Store, list: &RenderList) {
        let Some(compiled) = &self.compiled else {
            return;
        };
        let previous = self.current();

        let mut matcher = Matcher::new(Config::DEFAULT);
        let mut buf = Vec::new();
        self.matches = list
            .rows()
            .iter()
            .filter_map(|row| store.get(row.id))
            .filter(|node| {
                compiled.is_match(&search_text(node, self.match_keys), &mut matcher, &mut buf)
            })
            .map(|node| node.id)
            .collect();

        self.cursor = previous
            .and_then(|id| self.matches.iter().position(|&m| m == id))
            .or(if self.matches.is_empty() { None } else { Some(0) });
    }

    /// Advance to the next match, wrapping after the last.
    pub fn next(&mut self) -> Option<NodeId> {
        let len = self.matches.len();
        if len == 0 {
            return None;
        }
        self.cursor = Some(self.cursor.map_or(0, |c| (c + 1) % len));
        self.current()
    }

    /// Step back to the previous match, wrapping before the first.
    pub fn prev(&mut self) -> Option<NodeId> {
        let len = self.matches.len();
        if len == 0 {
            return None;
        }
        self.cursor = Some(self.cursor.map_or(len - 1, |c| (c + len - 1) % len));
        self.current()
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.compiled = None;
        self.matches.clear();
        self.cursor = None;
    }
}
