use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::GradleSpecifier;

/// How broken a patch is. Ordered so that `max` picks the worst.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProblemSeverity {
    #[default]
    None,
    Warning,
    Error,
}

/// A single diagnostic attached to a patch while loading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchProblem {
    pub severity: ProblemSeverity,
    pub description: String,
}

impl PatchProblem {
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            severity: ProblemSeverity::Error,
            description: description.into(),
        }
    }

    pub fn warning(description: impl Into<String>) -> Self {
        Self {
            severity: ProblemSeverity::Warning,
            description: description.into(),
        }
    }
}

/// One library (or jar mod, or main jar) referenced by a patch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Library {
    /// Gradle-style artifact coordinate.
    pub name: GradleSpecifier,
    /// Base URL of the repository the artifact resolves against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// `"local"` means the artifact is a file in a per-instance directory
    /// and is never fetched from a remote repository.
    #[serde(rename = "MMC-hint", skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(rename = "MMC-displayname", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "MMC-filename", skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl Library {
    pub fn new(name: GradleSpecifier) -> Self {
        Self {
            name,
            url: None,
            hint: None,
            display_name: None,
            filename: None,
        }
    }

    pub fn is_local(&self) -> bool {
        self.hint.as_deref() == Some("local")
    }

    /// The file name the artifact is stored under, preferring an explicit
    /// override over the one derived from the coordinate.
    pub fn file_name(&self) -> String {
        self.filename
            .clone()
            .unwrap_or_else(|| self.name.file_name())
    }
}

/// Declared dependency of a patch on another component. Informational only;
/// the engine orders and merges, it does not solve constraints.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equals: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggests: Option<String>,
}

impl Requirement {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            equals: None,
            suggests: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndex {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// The parsed contents of one patch: what a component contributes to the
/// launch profile.
///
/// This is both the schema of `patches/<uid>.json` inside an instance and of
/// the version files in the local metadata cache.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VersionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_version: Option<i32>,
    #[serde(default)]
    pub uid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub release_time: String,
    /// Present only in pre-component `version.json` files; consumed by the
    /// legacy migration and never written back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minecraft_version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<Requirement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<Library>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jar_mods: Vec<Library>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_jar: Option<Library>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minecraft_arguments: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jvm_args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_index: Option<AssetIndex>,
    /// Diagnostics attached while loading. Never persisted.
    #[serde(skip)]
    pub problems: Vec<PatchProblem>,
}

impl VersionPatch {
    pub fn order(&self) -> i32 {
        self.order.unwrap_or(0)
    }

    /// Worst severity across all attached problems.
    pub fn problem_severity(&self) -> ProblemSeverity {
        self.problems
            .iter()
            .map(|problem| problem.severity)
            .max()
            .unwrap_or(ProblemSeverity::None)
    }

    pub fn problems(&self) -> &[PatchProblem] {
        &self.problems
    }

    /// Parses the stored RFC 3339 release time, if there is one.
    pub fn release_date_time(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.release_time).ok()
    }
}
