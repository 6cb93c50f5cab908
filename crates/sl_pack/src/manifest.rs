use serde::{Deserialize, Serialize};

use sl_core::{IntoJsonError, JsonError};

use crate::PackError;

pub const CURRENT_FORMAT_VERSION: i32 = 1;

/// The persistent component list: `mmc-pack.json` at the instance root.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PackManifest {
    pub format_version: i32,
    pub components: Vec<ManifestComponent>,
}

/// One manifest entry. Only identity and cached display data are persisted;
/// mutability flags are derived again on load.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestComponent {
    pub uid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub current_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cached_name: String,
}

impl PackManifest {
    pub fn new(components: Vec<ManifestComponent>) -> Self {
        Self {
            format_version: CURRENT_FORMAT_VERSION,
            components,
        }
    }

    /// Parses a manifest, rejecting unknown format versions.
    pub fn parse(text: &str) -> Result<Self, PackError> {
        let manifest: PackManifest = serde_json::from_str(text).json(text.to_owned())?;
        if manifest.format_version != CURRENT_FORMAT_VERSION {
            return Err(PackError::FormatVersion {
                expected: CURRENT_FORMAT_VERSION,
                found: manifest.format_version,
            });
        }
        Ok(manifest)
    }

    pub fn to_json(&self) -> Result<String, JsonError> {
        serde_json::to_string_pretty(self).json_to()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_components() {
        let manifest = PackManifest::new(vec![
            ManifestComponent {
                uid: "net.minecraft".to_owned(),
                current_version: "1.12.2".to_owned(),
                cached_name: "Minecraft".to_owned(),
            },
            ManifestComponent {
                uid: "customjar".to_owned(),
                current_version: String::new(),
                cached_name: String::new(),
            },
        ]);

        let text = manifest.to_json().unwrap();
        let back = PackManifest::parse(&text).unwrap();
        assert_eq!(back, manifest);
    }

    #[test]
    fn absent_fields_default_to_empty() {
        let back =
            PackManifest::parse(r#"{ "formatVersion": 1, "components": [{ "uid": "org.lwjgl" }] }"#)
                .unwrap();
        assert_eq!(back.components[0].uid, "org.lwjgl");
        assert_eq!(back.components[0].current_version, "");
        assert_eq!(back.components[0].cached_name, "");
    }

    #[test]
    fn wrong_format_version_is_fatal() {
        let err = PackManifest::parse(r#"{ "formatVersion": 2, "components": [] }"#).unwrap_err();
        assert!(matches!(
            err,
            PackError::FormatVersion {
                expected: 1,
                found: 2
            }
        ));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(PackManifest::parse("{ not json").is_err());
    }
}
