//! Block identifier ↔ name table.
//!
//! Names come from <http://www.minecraftwiki.net/wiki/Data_values>. The first
//! name of each entry is the canonical one; the rest are synonyms.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};

/// Block types graphed when none are requested.
pub const DEFAULT_BLOCK_TYPES: &[&str] = &[
    "clay",
    "coal ore",
    "diamond ore",
    "gold ore",
    "iron ore",
    "obsidian",
    "49",
];

const BUILTIN_TABLE: &str = include_str!("../data/blocks.json");

/// Immutable mapping from block identifier to its names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTable {
    entries: BTreeMap<u8, Vec<String>>,
}

impl BlockTable {
    pub fn new(entries: BTreeMap<u8, Vec<String>>) -> Self {
        Self { entries }
    }

    /// The classic (pre-Anvil) block table.
    pub fn builtin() -> Self {
        // The table is compiled in and covered by tests.
        Self::from_json(BUILTIN_TABLE).unwrap_or_else(|e| panic!("built-in block table: {e:#}"))
    }

    /// Parse a JSON object of two-digit hex keys to name lists,
    /// e.g. `{"0E": ["Gold ore"]}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<String>> =
            serde_json::from_str(json).context("block table is not a JSON object of name lists")?;

        let mut entries = BTreeMap::new();
        for (key, names) in raw {
            let id = parse_hex(&key).with_context(|| format!("invalid block id key {:?}", key))?;
            if names.is_empty() {
                bail!("block {:02X} has no names", id);
            }
            entries.insert(id, names);
        }
        Ok(Self { entries })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading block table {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("parsing block table {}", path.display()))
    }

    pub fn names(&self, id: u8) -> Option<&[String]> {
        self.entries.get(&id).map(Vec::as_slice)
    }

    /// Canonical name, or the hex form for unnamed identifiers.
    pub fn label(&self, id: u8) -> String {
        match self.names(id).and_then(|names| names.first()) {
            Some(name) => name.clone(),
            None => format!("{:02X}", id),
        }
    }

    /// Identifiers matching `query`.
    ///
    /// Exactly two hex digits select that identifier, even an unnamed one, so
    /// `be` means 0xBE rather than bedrock. Anything else is a
    /// case-insensitive substring search over all names.
    pub fn lookup(&self, query: &str) -> Vec<u8> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            log::warn!("Empty block type");
            return Vec::new();
        }

        if query.len() == 2 {
            if let Some(id) = parse_hex(&query) {
                return vec![id];
            }
        }

        let result: Vec<u8> = self
            .entries
            .iter()
            .filter(|(_, names)| names.iter().any(|name| name.to_lowercase().contains(&query)))
            .map(|(&id, _)| id)
            .collect();
        if result.is_empty() {
            log::warn!("Unknown block type {}", query);
        }
        result
    }

    /// Look up every query, keeping the first occurrence of each identifier.
    pub fn resolve<S: AsRef<str>>(&self, queries: &[S]) -> Vec<u8> {
        let mut ids = Vec::new();
        for query in queries {
            for id in self.lookup(query.as_ref()) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids
    }

    /// `"0E Gold ore"` lines for every named identifier, ascending.
    pub fn listing(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(id, names)| format!("{:02X} {}", id, names.join(", ")))
            .collect()
    }
}

impl Default for BlockTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn parse_hex(s: &str) -> Option<u8> {
    if s.len() == 2 && s.chars().all(|c| c.is_ascii_hexdigit()) {
        u8::from_str_radix(s, 16).ok()
    } else {
        None
    }
}
