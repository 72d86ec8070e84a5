//! Shared vocabulary for the edittrigger kernel crates.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Shared error type for the trigger kernel crates.
#[derive(Debug, Error, Clone)]
pub enum TriggerError {
    #[error("{message}")]
    Message { message: String },
}

impl TriggerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

/// Logical section of the host page an action script is routed to.
///
/// Four sections have fixed path segments; anything else arrives through the
/// `tab` query parameter and is carried verbatim.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TabToken {
    ItemDetails,
    Grid,
    Bom,
    WorkflowMap,
    Query(String),
}

impl TabToken {
    /// Canonical token as it appears in the host page's paths.
    pub fn as_str(&self) -> &str {
        match self {
            TabToken::ItemDetails => "itemDetails",
            TabToken::Grid => "grid",
            TabToken::Bom => "bom",
            TabToken::WorkflowMap => "workflowMap",
            TabToken::Query(value) => value.as_str(),
        }
    }

    /// Build a token from a raw `tab` query value. Empty values carry no tab.
    pub fn from_query(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed {
            t if t.eq_ignore_ascii_case("itemDetails") => TabToken::ItemDetails,
            t if t.eq_ignore_ascii_case("grid") => TabToken::Grid,
            t if t.eq_ignore_ascii_case("bom") => TabToken::Bom,
            t if t.eq_ignore_ascii_case("workflowMap") => TabToken::WorkflowMap,
            other => TabToken::Query(other.to_string()),
        })
    }

    /// Case-insensitive comparison against a metadata tab value.
    pub fn matches_meta(&self, meta_tab: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(meta_tab)
    }
}

impl fmt::Display for TabToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// View/edit mode sampled from the `mode` query parameter.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum RouteMode {
    Edit,
    View,
    Other(String),
    None,
}

impl RouteMode {
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            None => RouteMode::None,
            Some(raw) => {
                let lower = raw.trim().to_ascii_lowercase();
                match lower.as_str() {
                    "" => RouteMode::None,
                    "edit" => RouteMode::Edit,
                    "view" => RouteMode::View,
                    _ => RouteMode::Other(lower),
                }
            }
        }
    }
}

/// Transient snapshot of the address bar; held only as previous vs current.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouteState {
    pub tab: Option<TabToken>,
    pub mode: RouteMode,
}

/// HTTP method of an observed request.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Other,
}

impl HttpMethod {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "PATCH" => HttpMethod::Patch,
            "DELETE" => HttpMethod::Delete,
            _ => HttpMethod::Other,
        }
    }

    /// Mutating methods the trigger engine reacts to.
    pub fn is_write(self) -> bool {
        matches!(
            self,
            HttpMethod::Post | HttpMethod::Patch | HttpMethod::Delete
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Other => "OTHER",
        }
    }
}

/// One completed request as reported by the host's network tap wiring.
#[derive(Clone, Debug)]
pub struct WriteEvent {
    pub path: String,
    pub method: HttpMethod,
    pub ok: bool,
}

impl WriteEvent {
    pub fn new(path: impl Into<String>, method: HttpMethod, ok: bool) -> Self {
        Self {
            path: path.into(),
            method,
            ok,
        }
    }
}

/// Endpoint family a mutating request was classified into.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum WriteClass {
    Attachments,
    BomItems,
}

impl WriteClass {
    /// The tab whose scripts react to writes of this class. The attachments
    /// panel lives under the item-details section of the host UI.
    pub fn target_tab(self) -> TabToken {
        match self {
            WriteClass::Attachments => TabToken::ItemDetails,
            WriteClass::BomItems => TabToken::Bom,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WriteClass::Attachments => "attachments",
            WriteClass::BomItems => "bom",
        }
    }
}

/// Why a dispatch was triggered. Diagnostics only; never affects matching.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TriggerReason {
    UrlEditToView,
    NetworkWrite,
}

impl TriggerReason {
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerReason::UrlEditToView => "url-edit-to-view",
            TriggerReason::NetworkWrite => "network-write",
        }
    }
}

/// Context handed opaquely to each matched script's runner invocation.
/// Constructed fresh per dispatch and not retained afterwards.
#[derive(Clone, Debug)]
pub struct TriggerContext {
    pub reason: TriggerReason,
    pub tab: TabToken,
    pub url: Option<String>,
    pub write: Option<WriteClass>,
    pub method: Option<HttpMethod>,
}

impl TriggerContext {
    pub fn url_flip(tab: TabToken, url: impl Into<String>) -> Self {
        Self {
            reason: TriggerReason::UrlEditToView,
            tab,
            url: Some(url.into()),
            write: None,
            method: None,
        }
    }

    pub fn network_write(tab: TabToken, write: WriteClass, method: HttpMethod) -> Self {
        Self {
            reason: TriggerReason::NetworkWrite,
            tab,
            url: None,
            write: Some(write),
            method: Some(method),
        }
    }

    /// Opaque payload handed to the runner seam.
    pub fn payload(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert("when".into(), self.reason.as_str().into());
        map.insert("tab".into(), self.tab.as_str().into());
        if let Some(url) = &self.url {
            map.insert("url".into(), url.as_str().into());
        }
        if let Some(write) = self.write {
            map.insert("write".into(), write.as_str().into());
        }
        if let Some(method) = self.method {
            map.insert("method".into(), method.as_str().into());
        }
        serde_json::Value::Object(map)
    }
}

/// Opaque execution handle for an action script (its self link on the host).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ScriptId(pub String);

impl ScriptId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

/// Remote action script descriptor published by the loader. The label is the
/// sole carrier of routing metadata; nothing else is inspected.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionScript {
    pub id: ScriptId,
    pub label: String,
}

impl ActionScript {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: ScriptId::new(id),
            label: label.into(),
        }
    }
}

/// Identifier for one dispatch evaluation, for log correlation.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DispatchId(pub String);

impl DispatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for DispatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DispatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
