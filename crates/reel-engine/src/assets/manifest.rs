use std::collections::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use super::loader::AssetKind;

/// Maps logical asset names to the paths the host fetches.
/// Loaded from JSON; names absent from the map are used as paths verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Typeface JSON files, e.g. `"helvetiker_bold" -> "fonts/helvetiker_bold.typeface.json"`.
    #[serde(default)]
    pub fonts: HashMap<String, String>,
    #[serde(default)]
    pub textures: HashMap<String, String>,
}

impl AssetManifest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolve the fetch path for an asset.
    pub fn path<'a>(&'a self, kind: AssetKind, name: &'a str) -> &'a str {
        let table = match kind {
            AssetKind::Font => &self.fonts,
            AssetKind::Texture => &self.textures,
        };
        table.get(name).map(String::as_str).unwrap_or(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_manifest() {
        let json = r#"{
            "fonts": { "bold": "fonts/helvetiker_bold.typeface.json" },
            "textures": { "avatar": "img/avatar.png" }
        }"#;
        let m = AssetManifest::from_json(json).unwrap();
        assert_eq!(m.path(AssetKind::Font, "bold"), "fonts/helvetiker_bold.typeface.json");
        assert_eq!(m.path(AssetKind::Texture, "avatar"), "img/avatar.png");
    }

    #[test]
    fn unknown_names_pass_through() {
        let m = AssetManifest::from_json("{}").unwrap();
        assert_eq!(m.path(AssetKind::Texture, "img/x.png"), "img/x.png");
    }
}
