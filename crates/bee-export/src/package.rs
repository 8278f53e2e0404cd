// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Package definition as read from `package.json`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bee_precomp::ConditionDef;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ExportError;

/// A package: the styles and items available for export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Package id, used in logs and written to the vbsp options.
    pub id: String,
    /// Style exported when the caller does not pick one. Falls back to the
    /// first style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_style: Option<String>,
    /// Every style in the package.
    #[serde(default)]
    pub styles: Vec<StyleDef>,
    /// Every item in the package.
    #[serde(default)]
    pub items: Vec<ItemDef>,
    /// Files copied into `<out>/resources`, relative to the package directory.
    #[serde(default)]
    pub resources: Vec<PathBuf>,
}

/// A style: a set of items plus global conditions and options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleDef {
    /// Style id.
    pub id: String,
    /// Items exported with this style. Empty means every item.
    #[serde(default)]
    pub items: Vec<String>,
    /// Conditions that apply to every map using the style.
    #[serde(default)]
    pub conditions: Vec<ConditionDef>,
    /// Options copied into `vbsp_config.json`.
    #[serde(default)]
    pub options: BTreeMap<String, Value>,
}

/// An item as placed in the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    /// Item id. Also the name of its config directory.
    pub id: String,
    /// Editor definition, written to `editoritems.json`.
    #[serde(default)]
    pub editor: Value,
    /// Per-item config bundle. `null` means none is written.
    #[serde(default)]
    pub config: Value,
    /// Conditions the item contributes to `vbsp_config.json`.
    #[serde(default)]
    pub conditions: Vec<ConditionDef>,
}

impl Package {
    /// Reads a package file.
    pub async fn load(path: &Path) -> Result<Self, ExportError> {
        let data = tokio::fs::read(path).await.map_err(ExportError::io(path))?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Looks up a style, or the default one when `id` is `None`.
    pub fn style(&self, id: Option<&str>) -> Result<&StyleDef, ExportError> {
        match id.or(self.selected_style.as_deref()) {
            Some(id) => self
                .styles
                .iter()
                .find(|s| s.id.eq_ignore_ascii_case(id))
                .ok_or_else(|| ExportError::MissingStyle(id.to_owned())),
            None => self.styles.first().ok_or_else(|| ExportError::NoStyles(self.id.clone())),
        }
    }

    /// Items exported with `style`, in the style's order.
    pub fn items_for(&self, style: &StyleDef) -> Result<Vec<&ItemDef>, ExportError> {
        if style.items.is_empty() {
            return Ok(self.items.iter().collect());
        }
        style
            .items
            .iter()
            .map(|id| {
                self.items
                    .iter()
                    .find(|i| i.id.eq_ignore_ascii_case(id))
                    .ok_or_else(|| ExportError::UnknownItem {
                        style: style.id.clone(),
                        item: id.clone(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use serde_json::json;

    use super::*;

    fn package() -> Package {
        serde_json::from_value(json!({
            "id": "clean",
            "styles": [
                {"id": "BEE2_CLEAN", "items": ["ITEM_B"]},
                {"id": "BEE2_OVERGROWN"},
            ],
            "items": [{"id": "ITEM_A"}, {"id": "ITEM_B"}],
        }))
        .unwrap()
    }

    #[test]
    fn default_style_is_selected_or_first() {
        let mut pack = package();
        assert_eq!(pack.style(None).unwrap().id, "BEE2_CLEAN");
        pack.selected_style = Some("bee2_overgrown".into());
        assert_eq!(pack.style(None).unwrap().id, "BEE2_OVERGROWN");
        assert!(matches!(pack.style(Some("nope")), Err(ExportError::MissingStyle(_))));
    }

    #[test]
    fn empty_item_list_means_everything() {
        let pack = package();
        let ids = |style| {
            pack.items_for(pack.style(Some(style)).unwrap())
                .unwrap()
                .iter()
                .map(|i| i.id.as_str())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids("BEE2_CLEAN"), ["ITEM_B"]);
        assert_eq!(ids("BEE2_OVERGROWN"), ["ITEM_A", "ITEM_B"]);
    }

    #[test]
    fn unknown_items_are_reported() {
        let mut pack = package();
        pack.styles[0].items.push("ITEM_Z".into());
        let err = pack.items_for(&pack.styles[0]).unwrap_err();
        assert!(matches!(err, ExportError::UnknownItem { item, .. } if item == "ITEM_Z"));
    }
}
