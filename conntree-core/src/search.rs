//! Node search over the bound model
//!
//! The searcher is rebuilt when a model is attached and reads node names from
//! that model on every search, so edits made after the attach are found. It
//! keeps a match cursor so the user can step through results.

use regex::RegexBuilder;
use thiserror::Error;

use crate::models::{NodeId, TreeNode};
use crate::tree::ModelHandle;

/// Error type for search operations
#[derive(Debug, Error)]
pub enum SearchError {
    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(String),
}

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Name search over a model with a match cursor
#[derive(Debug, Clone, Default)]
pub struct NodeSearcher {
    model: Option<ModelHandle>,
    matches: Vec<NodeId>,
    cursor: Option<usize>,
}

impl NodeSearcher {
    /// Searches the nodes of `model` in pre-order
    #[must_use]
    pub fn new(model: &ModelHandle) -> Self {
        Self {
            model: Some(model.clone()),
            matches: Vec::new(),
            cursor: None,
        }
    }

    /// Number of searchable nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.model.as_ref().map_or(0, |model| model.read().len())
    }

    /// Returns true if there is nothing to search
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finds nodes whose name contains `text`, ignoring case
    ///
    /// An empty query clears the matches. The cursor moves to the first match.
    pub fn search_by_name(&mut self, text: &str) -> &[NodeId] {
        let needle = text.trim().to_lowercase();
        let matches = if needle.is_empty() {
            Vec::new()
        } else {
            self.collect_matches(|node| node.name.to_lowercase().contains(&needle))
        };
        self.set_matches(matches)
    }

    /// Finds nodes whose name matches a case-insensitive regular expression
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidPattern` if the pattern does not compile.
    pub fn search_pattern(&mut self, pattern: &str) -> SearchResult<&[NodeId]> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| SearchError::InvalidPattern(e.to_string()))?;
        let matches = self.collect_matches(|node| regex.is_match(&node.name));
        Ok(self.set_matches(matches))
    }

    /// Matches of the last search
    #[must_use]
    pub fn matches(&self) -> &[NodeId] {
        &self.matches
    }

    /// Match under the cursor, if it is still in the model
    #[must_use]
    pub fn current_match(&self) -> Option<NodeId> {
        self.cursor
            .and_then(|i| self.matches.get(i).copied())
            .filter(|id| self.is_live(*id))
    }

    /// Advances the cursor, wrapping to the first match
    ///
    /// Matches deleted since the search are skipped.
    pub fn next_match(&mut self) -> Option<NodeId> {
        let len = self.matches.len();
        let start = self.cursor.map_or(0, |i| i + 1);
        self.step((0..len).map(|k| (start + k) % len))
    }

    /// Moves the cursor back, wrapping to the last match
    ///
    /// Matches deleted since the search are skipped.
    pub fn previous_match(&mut self) -> Option<NodeId> {
        let len = self.matches.len();
        let start = self.cursor.map_or(len, |i| i + len);
        self.step((1..=len).map(|k| (start - k) % len))
    }

    fn step(&mut self, order: impl Iterator<Item = usize>) -> Option<NodeId> {
        for i in order {
            if self.is_live(self.matches[i]) {
                self.cursor = Some(i);
                return Some(self.matches[i]);
            }
        }
        None
    }

    fn is_live(&self, id: NodeId) -> bool {
        self.model
            .as_ref()
            .is_some_and(|model| model.read().contains(id))
    }

    fn collect_matches(&self, mut accept: impl FnMut(&TreeNode) -> bool) -> Vec<NodeId> {
        let Some(model) = &self.model else {
            return Vec::new();
        };
        let model = model.read();
        model
            .depth_first()
            .into_iter()
            .filter_map(|id| model.node(id))
            .filter(|node| accept(node))
            .map(|node| node.id)
            .collect()
    }

    fn set_matches(&mut self, matches: Vec<NodeId>) -> &[NodeId] {
        self.cursor = if matches.is_empty() { None } else { Some(0) };
        self.matches = matches;
        &self.matches
    }
}
