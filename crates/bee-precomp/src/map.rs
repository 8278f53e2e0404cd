// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Serialisable map model: placed instances, item links and indicators.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::Path;

use bee_geom::{Angle, Vec3};
use serde::{Deserialize, Serialize};

/// Index of an instance within [`Map::instances`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstId(pub usize);

/// Instance fixup variables.
///
/// Names are case-insensitive and the leading `$` is optional, so
/// `$Start_Reversed` and `start_reversed` address the same variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>")]
pub struct Fixups(BTreeMap<String, String>);

fn fixup_key(name: &str) -> String {
    name.strip_prefix('$').unwrap_or(name).to_lowercase()
}

impl From<BTreeMap<String, String>> for Fixups {
    fn from(raw: BTreeMap<String, String>) -> Self {
        Self(raw.into_iter().map(|(k, v)| (fixup_key(&k), v)).collect())
    }
}

impl Fixups {
    /// Returns the value of `name`, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&fixup_key(name)).map(String::as_str)
    }

    /// Sets `name` to the display form of `value`.
    pub fn set(&mut self, name: &str, value: impl Display) {
        self.0.insert(fixup_key(name), value.to_string());
    }

    /// Reads `name` as a boolean; unset or unrecognised values are `false`.
    pub fn bool(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| {
            matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "y" | "t"
            )
        })
    }

    /// Iterates `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One placed template instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Entity name; items are looked up by it.
    #[serde(default)]
    pub targetname: String,
    /// Instance file path.
    pub file: String,
    /// Placement origin.
    pub origin: Vec3,
    /// Placement rotation.
    #[serde(default)]
    pub angles: Angle,
    /// Fixup variables passed into the instance.
    #[serde(default)]
    pub fixups: Fixups,
}

/// A logical connection from one item to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Targetname of the item sending the signal.
    pub from: String,
    /// Targetname of the item receiving it.
    pub to: String,
}

/// Kind of indicator attached to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    /// Antline overlay running from the item.
    Antline,
    /// Checkmark or timer panel.
    Panel,
}

/// An antline or indicator panel owned by an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    /// Targetname of the owning item.
    pub item: String,
    /// Antline or panel.
    pub kind: IndicatorKind,
    /// Entity name of the overlay.
    pub name: String,
}

/// A map as read from and written to disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Map {
    /// Every placed instance.
    #[serde(default)]
    pub instances: Vec<Instance>,
    /// Item-to-item connections.
    #[serde(default)]
    pub connections: Vec<Link>,
    /// Antlines and panels, by owner.
    #[serde(default)]
    pub indicators: Vec<Indicator>,
}

impl Map {
    /// Reads a JSON map from `path`.
    pub fn load(path: &Path) -> io::Result<Self> {
        let data = fs::read(path)?;
        serde_json::from_slice(&data).map_err(io::Error::from)
    }

    /// Writes the map as pretty JSON to `path`.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let data = serde_json::to_vec_pretty(self).map_err(io::Error::from)?;
        fs::write(path, data)
    }

    /// Borrows an instance.
    pub fn inst(&self, id: InstId) -> &Instance {
        &self.instances[id.0]
    }

    /// Mutably borrows an instance.
    pub fn inst_mut(&mut self, id: InstId) -> &mut Instance {
        &mut self.instances[id.0]
    }

    /// Appends an instance and returns its id.
    pub fn push(&mut self, inst: Instance) -> InstId {
        self.instances.push(inst);
        InstId(self.instances.len() - 1)
    }

    /// Ids of every instance currently in the map.
    pub fn ids(&self) -> impl Iterator<Item = InstId> {
        (0..self.instances.len()).map(InstId)
    }
}
