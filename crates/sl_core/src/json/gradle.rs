use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("not a valid gradle specifier: {0}")]
pub struct GradleSpecifierError(pub String);

/// A fully parsed gradle/maven artifact coordinate.
///
/// Supported forms:
/// - `group:artifact:version`
/// - `group:artifact:version:classifier`
/// - `group:artifact:version[:classifier]@extension`
///
/// The extension defaults to `jar`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GradleSpecifier {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub classifier: Option<String>,
    pub extension: String,
}

impl GradleSpecifier {
    /// `true` when both specifiers name the same group:artifact, ignoring
    /// version and classifier. Used for deduplication when merging library
    /// lists.
    pub fn same_artifact(&self, other: &GradleSpecifier) -> bool {
        self.group == other.group && self.artifact == other.artifact
    }

    /// The group as a path fragment (`org.multimc` -> `org/multimc`).
    pub fn group_path(&self) -> String {
        self.group.replace('.', "/")
    }

    /// `artifact-version[-classifier].extension`
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.artifact, self.version, classifier, self.extension
            ),
            None => format!("{}-{}.{}", self.artifact, self.version, self.extension),
        }
    }

    /// Repository-relative path of the artifact file
    /// (`org/multimc/customjar/1/customjar-1.jar`).
    pub fn artifact_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group_path(),
            self.artifact,
            self.version,
            self.file_name()
        )
    }
}

impl FromStr for GradleSpecifier {
    type Err = GradleSpecifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (coordinate, extension) = match s.rsplit_once('@') {
            Some((coordinate, extension)) if !extension.is_empty() => (coordinate, extension),
            Some(_) => return Err(GradleSpecifierError(s.to_owned())),
            None => (s, "jar"),
        };

        let parts: Vec<&str> = coordinate.split(':').collect();
        if parts.iter().any(|part| part.is_empty()) {
            return Err(GradleSpecifierError(s.to_owned()));
        }
        match parts[..] {
            [group, artifact, version] => Ok(Self {
                group: group.to_owned(),
                artifact: artifact.to_owned(),
                version: version.to_owned(),
                classifier: None,
                extension: extension.to_owned(),
            }),
            [group, artifact, version, classifier] => Ok(Self {
                group: group.to_owned(),
                artifact: artifact.to_owned(),
                version: version.to_owned(),
                classifier: Some(classifier.to_owned()),
                extension: extension.to_owned(),
            }),
            _ => Err(GradleSpecifierError(s.to_owned())),
        }
    }
}

impl fmt::Display for GradleSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        if self.extension != "jar" {
            write!(f, "@{}", self.extension)?;
        }
        Ok(())
    }
}

impl Serialize for GradleSpecifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GradleSpecifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
