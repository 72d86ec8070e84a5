//! Parsing of the free-text routing metadata embedded in script labels.
//!
//! A label carries at most one `{...}` block of comma-separated `key: value`
//! pairs, e.g. `"Sync tasks {tab: bom, mode: onEdit}"`. Button-mode labels
//! additionally carry bracketed options:
//! `"Create tasks {tab: bom, mode: button [color: #00FF80, name: Create Tasks]}"`.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use edittrigger_core_types::{ActionScript, TabToken};

/// Attribute bag parsed from one label. Keys and values are lowercased.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LabelMeta {
    entries: HashMap<String, String>,
}

impl LabelMeta {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn tab(&self) -> Option<&str> {
        self.get("tab")
    }

    pub fn mode(&self) -> Option<&str> {
        self.get("mode")
    }

    /// Candidate rule: parsed tab equals the dispatch tab (case-insensitive)
    /// and parsed mode is exactly `onedit`. A meta without a tab key matches
    /// no tab.
    pub fn is_on_edit_for(&self, tab: &TabToken) -> bool {
        match (self.tab(), self.mode()) {
            (Some(meta_tab), Some(mode)) => mode == "onedit" && tab.matches_meta(meta_tab),
            _ => false,
        }
    }
}

/// Extract the attribute bag from the first `{...}` span of a label.
///
/// Malformed segments (missing colon, empty key or value) are skipped, never
/// an error; duplicate keys keep the last occurrence. Returns `None` when the
/// label has no brace block at all. Pure and idempotent.
pub fn parse(label: &str) -> Option<LabelMeta> {
    let open = label.find('{')?;
    let rest = &label[open + 1..];
    let close = rest.find('}')?;
    let interior = &rest[..close];

    let mut entries = HashMap::new();
    for segment in interior.split(',') {
        let Some((key, value)) = segment.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        entries.insert(key.to_ascii_lowercase(), value.to_ascii_lowercase());
    }
    Some(LabelMeta { entries })
}

/// Convenience filter used by the dispatcher.
pub fn is_on_edit_candidate(script: &ActionScript, tab: &TabToken) -> bool {
    parse(&script.label)
        .map(|meta| meta.is_on_edit_for(tab))
        .unwrap_or(false)
}

/// Metadata for a button-mode label, consumed by the host's rendering layer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ButtonMeta {
    /// Tab token as written in the label (not lowercased).
    pub tab: String,
    /// Lowercased mode; `"button"` is required for rendering.
    pub mode: String,
    pub color: String,
    pub name: String,
    /// Text before the first `{`, shown on hover.
    pub tooltip: String,
}

static TAB_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)tab\s*:\s*([a-zA-Z]+)").unwrap());
static MODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)mode\s*:\s*([a-zA-Z]+)(?:\s*\[([^\]]*)\])?").unwrap());

const DEFAULT_BUTTON_COLOR: &str = "#FF8000";

/// Parse the richer button-mode syntax:
/// `"<tooltip> {tab: <token>, mode: button [color: #RRGGBB, name: <label>]}"`.
///
/// Bracketed options are simple comma-separated `key: value` pairs with
/// surrounding quotes stripped from values. Labels without a tab yield `None`.
pub fn parse_button(label: &str, fallback_name: Option<&str>) -> Option<ButtonMeta> {
    let open = label.find('{')?;
    let tooltip = label[..open].trim().to_string();
    let rest = &label[open + 1..];
    let close = rest.find('}')?;
    let interior = &rest[..close];

    let tab = TAB_RE
        .captures(interior)
        .map(|c| c[1].to_string())?;

    let mut mode = String::new();
    let mut bracket_raw = "";
    if let Some(captures) = MODE_RE.captures(interior) {
        mode = captures[1].to_ascii_lowercase();
        if let Some(options) = captures.get(2) {
            bracket_raw = options.as_str();
        }
    }

    let mut options = HashMap::new();
    for pair in bracket_raw.split(',') {
        let Some((key, value)) = pair.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim().trim_matches(|c| c == '\'' || c == '"');
        if key.is_empty() || value.is_empty() {
            continue;
        }
        options.insert(key, value.to_string());
    }

    Some(ButtonMeta {
        tab,
        mode,
        color: options
            .remove("color")
            .unwrap_or_else(|| DEFAULT_BUTTON_COLOR.to_string()),
        name: options
            .remove("name")
            .or_else(|| fallback_name.map(str::to_string))
            .unwrap_or_else(|| "Run".to_string()),
        tooltip,
    })
}
