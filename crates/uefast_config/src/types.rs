//! Configuration types deserialized from `uefast.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

/// The top-level project configuration parsed from `uefast.toml`.
///
/// Every section is optional; missing sections and fields take the defaults
/// documented on each type.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Where assets live and which files count as assets.
    #[serde(default)]
    pub scan: ScanConfig,
    /// Which assets are always loaded at startup.
    #[serde(default)]
    pub startup: StartupConfig,
    /// Per-asset load cost model.
    #[serde(default)]
    pub cost: CostConfig,
    /// Load plan settings.
    #[serde(default)]
    pub plan: PlanConfig,
}

/// Asset discovery settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScanConfig {
    /// Content directory relative to the project root.
    pub content_dir: String,
    /// Mount point that the content directory maps to in asset ids.
    pub mount_point: String,
    /// File extensions (without dot) that are treated as assets.
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub extensions: Vec<String>,
    /// Glob patterns over asset ids; when non-empty, only matching assets are collected.
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub include: Vec<String>,
    /// Glob patterns over asset ids; matching assets are never collected.
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub exclude: Vec<String>,
    /// Hashing worker count. `0` means one worker per available CPU.
    pub workers: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            content_dir: "Content".to_string(),
            mount_point: "/Game".to_string(),
            extensions: vec!["uasset".to_string(), "umap".to_string()],
            include: Vec::new(),
            exclude: Vec::new(),
            workers: 0,
        }
    }
}

/// Startup root settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StartupConfig {
    /// Asset ids that are always loaded (default maps, startup objects).
    #[serde(deserialize_with = "deserialize_string_or_vec")]
    pub roots: Vec<String>,
    /// Whether to also read default maps from `Config/DefaultEngine.ini`.
    pub engine_ini: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            engine_ini: true,
        }
    }
}

/// Cost model: a fixed overhead plus a size-proportional term.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CostConfig {
    /// Fixed cost per asset, in microseconds.
    pub overhead_us: u64,
    /// Assumed read throughput, in bytes per millisecond.
    pub bytes_per_ms: u64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            overhead_us: 500,
            bytes_per_ms: 100_000,
        }
    }
}

/// Load plan settings.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlanConfig {
    /// Number of parallel load workers the plan is packed for.
    pub parallelism: usize,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self { parallelism: 4 }
    }
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Allows `roots = "/Game/Maps/Entry"` as well as `roots = ["/Game/Maps/Entry"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}
