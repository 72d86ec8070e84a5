//! Address sampling: tab token and mode from the current href.

use url::Url;

use edittrigger_core_types::{RouteMode, RouteState, TabToken};

/// Sample `(tab, mode)` from a full href.
///
/// Tab precedence: fixed path segments first (`/itemDetails`, `/grid`,
/// `/bom/`, `/workflowMap`), then the `tab` query parameter. An address that
/// does not parse yields an empty state rather than an error.
pub fn route_state(href: &str) -> RouteState {
    let Ok(url) = Url::parse(href) else {
        return RouteState {
            tab: None,
            mode: RouteMode::None,
        };
    };
    RouteState {
        tab: tab_from_url(&url),
        mode: mode_from_url(&url),
    }
}

fn tab_from_url(url: &Url) -> Option<TabToken> {
    let path = url.path();
    if path.contains("/itemDetails") {
        Some(TabToken::ItemDetails)
    } else if path.contains("/grid") {
        Some(TabToken::Grid)
    } else if path.contains("/bom/") {
        Some(TabToken::Bom)
    } else if path.contains("/workflowMap") {
        Some(TabToken::WorkflowMap)
    } else {
        query_param(url, "tab").and_then(|value| TabToken::from_query(&value))
    }
}

fn mode_from_url(url: &Url) -> RouteMode {
    RouteMode::from_param(query_param(url, "mode").as_deref())
}

fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}
