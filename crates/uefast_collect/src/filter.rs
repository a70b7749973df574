//! Include/exclude filtering of asset ids.

use glob::Pattern;
use uefast_common::AssetId;

use crate::error::CollectError;

/// Compiled include and exclude glob patterns over asset ids.
///
/// An asset is collected when it matches at least one include pattern (or
/// there are none) and matches no exclude pattern.
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl AssetFilter {
    /// Compiles the given patterns.
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, CollectError> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Returns `true` if the asset passes the filter.
    pub fn matches(&self, id: &AssetId) -> bool {
        let id = id.as_str();
        let included = self.include.is_empty() || self.include.iter().any(|p| p.matches(id));
        included && !self.exclude.iter().any(|p| p.matches(id))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>, CollectError> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| CollectError::Filter {
                pattern: p.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}
