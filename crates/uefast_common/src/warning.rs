//! Warnings for problems that are recovered locally.
//!
//! A malformed asset, a dependency cycle, or a dangling reference never aborts
//! a run. Each stage returns the warnings it produced alongside its output so
//! the caller can log them and include them in reports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A structured warning code, displayed as `W` followed by three digits.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum WarningCode {
    /// An asset file could not be read; it is excluded from the run.
    UnreadableAsset,
    /// An asset's package summary is malformed; it is excluded from the graph.
    MalformedAsset,
    /// A directory below the content root could not be listed.
    UnreadableDirectory,
    /// Two files map to the same asset id; the later one is skipped.
    DuplicateAssetId,
    /// A symbolic link below the content root was not followed.
    SkippedSymlink,
    /// A hard-dependency cycle was broken by demoting one edge to soft.
    CycleDemoted,
    /// A dependency names an asset that is not part of the project.
    DanglingReference,
    /// A configured startup root does not exist in the project.
    UnknownStartupRoot,
}

impl WarningCode {
    /// Returns the numeric part of the code.
    pub fn number(self) -> u16 {
        match self {
            WarningCode::UnreadableAsset => 101,
            WarningCode::MalformedAsset => 102,
            WarningCode::UnreadableDirectory => 103,
            WarningCode::DuplicateAssetId => 104,
            WarningCode::SkippedSymlink => 105,
            WarningCode::CycleDemoted => 201,
            WarningCode::DanglingReference => 202,
            WarningCode::UnknownStartupRoot => 203,
        }
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{:03}", self.number())
    }
}

/// A recovered problem, attributed to the asset or path it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// What went wrong.
    pub code: WarningCode,
    /// The asset id or file path concerned.
    pub subject: String,
    /// Human-readable detail.
    pub message: String,
}

impl Warning {
    /// Creates a new warning.
    pub fn new(code: WarningCode, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.subject, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_display() {
        assert_eq!(WarningCode::UnreadableAsset.to_string(), "W101");
        assert_eq!(WarningCode::MalformedAsset.to_string(), "W102");
        assert_eq!(WarningCode::DuplicateAssetId.to_string(), "W104");
        assert_eq!(WarningCode::SkippedSymlink.to_string(), "W105");
        assert_eq!(WarningCode::CycleDemoted.to_string(), "W201");
        assert_eq!(WarningCode::UnknownStartupRoot.to_string(), "W203");
    }

    #[test]
    fn warning_display() {
        let w = Warning::new(
            WarningCode::MalformedAsset,
            "Content/Broken.uasset",
            "bad package magic",
        );
        assert_eq!(
            w.to_string(),
            "[W102] Content/Broken.uasset: bad package magic"
        );
    }

    #[test]
    fn serde_roundtrip() {
        let w = Warning::new(WarningCode::CycleDemoted, "/Game/C -> /Game/A", "demoted");
        let json = serde_json::to_string(&w).unwrap();
        let back: Warning = serde_json::from_str(&json).unwrap();
        assert_eq!(w, back);
    }
}
