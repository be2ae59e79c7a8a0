//! Violation kinds and the counters accumulated per session.

use std::fmt;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ProctorError;

/// A countable category subject to threshold-based escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    NoFace,
    MultipleFaces,
    LookingAway,
    TabSwitches,
}

impl ViolationKind {
    /// All kinds, in reporting order.
    pub const ALL: [ViolationKind; 4] = [
        ViolationKind::NoFace,
        ViolationKind::MultipleFaces,
        ViolationKind::LookingAway,
        ViolationKind::TabSwitches,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::NoFace => "no_face",
            ViolationKind::MultipleFaces => "multiple_faces",
            ViolationKind::LookingAway => "looking_away",
            ViolationKind::TabSwitches => "tab_switches",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViolationKind {
    type Err = ProctorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViolationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ProctorError::InvalidViolationKind(s.to_string()))
    }
}

/// Cumulative count per violation kind.
///
/// Counters only ever grow; additions saturate instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViolationCounters {
    #[serde(default)]
    pub no_face: u64,
    #[serde(default)]
    pub multiple_faces: u64,
    #[serde(default)]
    pub looking_away: u64,
    #[serde(default)]
    pub tab_switches: u64,
}

impl ViolationCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: ViolationKind) -> u64 {
        match kind {
            ViolationKind::NoFace => self.no_face,
            ViolationKind::MultipleFaces => self.multiple_faces,
            ViolationKind::LookingAway => self.looking_away,
            ViolationKind::TabSwitches => self.tab_switches,
        }
    }

    fn slot(&mut self, kind: ViolationKind) -> &mut u64 {
        match kind {
            ViolationKind::NoFace => &mut self.no_face,
            ViolationKind::MultipleFaces => &mut self.multiple_faces,
            ViolationKind::LookingAway => &mut self.looking_away,
            ViolationKind::TabSwitches => &mut self.tab_switches,
        }
    }

    /// Add `delta` to a counter and return the new value.
    pub fn add(&mut self, kind: ViolationKind, delta: u64) -> u64 {
        let slot = self.slot(kind);
        *slot = slot.saturating_add(delta);
        *slot
    }

    /// Raise a counter to at least `value` and return the new value.
    pub fn raise_to(&mut self, kind: ViolationKind, value: u64) -> u64 {
        let slot = self.slot(kind);
        *slot = (*slot).max(value);
        *slot
    }

    /// `(kind, count)` pairs in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (ViolationKind, u64)> + '_ {
        ViolationKind::ALL.into_iter().map(|kind| (kind, self.get(kind)))
    }

    pub fn total(&self) -> u64 {
        self.iter().fold(0u64, |acc, (_, n)| acc.saturating_add(n))
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }
}

/// Counts reported by a client, keyed by name, in the order received.
///
/// Names are kept as strings: a client may report kinds the server does not
/// recognize, and what happens to them is a policy decision made at
/// evaluation time. A repeated name overwrites the earlier value in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawCounts {
    entries: Vec<(String, u64)>,
}

impl RawCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, count: u64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = count,
            None => self.entries.push((name, count)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, count: u64) -> Self {
        self.insert(name, count);
        self
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.entries.iter().map(|(n, count)| (n.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for RawCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, count) in &self.entries {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RawCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RawCountsVisitor;

        impl<'de> Visitor<'de> for RawCountsVisitor {
            type Value = RawCounts;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of violation names to non-negative counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut counts = RawCounts::new();
                while let Some((name, count)) = access.next_entry::<String, u64>()? {
                    counts.insert(name, count);
                }
                Ok(counts)
            }
        }

        deserializer.deserialize_map(RawCountsVisitor)
    }
}
