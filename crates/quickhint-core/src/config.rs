//! Site configuration and resolution.
//!
//! Exactly one [`SiteConfig`] is effective per page load. Resolution
//! happens once, before the dispatcher is installed:
//!
//! 1. A persisted per-hostname override (from the external settings
//!    surface) wins outright — either a disabled marker or a full
//!    enabled override.
//! 2. Otherwise the first builtin entry whose pattern is contained in
//!    the hostname wins, in registration order.
//! 3. Otherwise the generic default configuration applies.
//!
//! The engine only ever reads configuration; persistence and the
//! settings UI are owned externally and reach us through
//! [`OverrideStore`].

use serde::{Deserialize, Serialize};

/// Effective configuration for the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Display name ("GitHub", "default", or the overriding hostname).
    pub name: String,
    /// Substring matched against the page hostname.
    pub match_pattern: String,
    /// High-value selectors used by the curated scope.
    pub curated_selectors: Vec<String>,
    /// Exhaustive selectors used by the all scope.
    pub all_selectors: Vec<String>,
    /// Selector for a transient context-menu/popup container. While a
    /// matching container is rendered, scanning is confined to it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popup_selector: Option<String>,
    /// Whether hinting is enabled on this site at all.
    pub enabled: bool,
}

impl SiteConfig {
    /// The selector list for a scope, joined into one selector-list
    /// string as the document surface expects.
    #[must_use]
    pub fn selector_list(&self, scope: Scope) -> String {
        let list = match scope {
            Scope::Curated => &self.curated_selectors,
            Scope::All => &self.all_selectors,
        };
        list.join(", ")
    }
}

/// Which selector list governs candidate discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Curated,
    All,
}

/// A persisted per-hostname override, already merged by the settings
/// surface that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SiteOverride {
    /// Hinting is switched off for this hostname.
    Disabled,
    /// Hinting is on, with optional selector replacements. Fields left
    /// `None` fall back to the generic defaults.
    Enabled {
        #[serde(skip_serializing_if = "Option::is_none")]
        curated_selectors: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        all_selectors: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        popup_selector: Option<String>,
    },
}

/// Read access to the externally persisted override store.
pub trait OverrideStore {
    /// The override recorded for `hostname`, if any.
    fn lookup(&self, hostname: &str) -> Option<SiteOverride>;
}

/// A store with no overrides. Useful as a default and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverrides;

impl OverrideStore for NoOverrides {
    fn lookup(&self, _hostname: &str) -> Option<SiteOverride> {
        None
    }
}

// ============================================================================
// Builtin site table (configuration data)
// ============================================================================

struct BuiltinSite {
    name: &'static str,
    pattern: &'static str,
    curated: &'static [&'static str],
    all: &'static [&'static str],
    popup: Option<&'static str>,
}

/// Generic curated selectors used when no site entry matches.
const DEFAULT_CURATED: &[&str] = &["a[href]", "button", "[role=\"button\"]"];

/// Generic exhaustive selectors used when no site entry matches.
const DEFAULT_ALL: &[&str] = &[
    "a[href]",
    "button",
    "[role=\"button\"]",
    "[role=\"link\"]",
    "[role=\"menuitem\"]",
    "[role=\"tab\"]",
    "input",
    "select",
    "textarea",
    "summary",
    "[onclick]",
    "[tabindex]",
];

/// Builtin per-site entries, checked in order. First pattern contained
/// in the hostname wins.
const BUILTIN_SITES: &[BuiltinSite] = &[
    BuiltinSite {
        name: "GitHub",
        pattern: "github.com",
        curated: &[
            "a[href]",
            "button",
            "summary",
            "[role=\"button\"]",
            "[role=\"menuitem\"]",
        ],
        all: DEFAULT_ALL,
        popup: Some("[role=\"menu\"]"),
    },
    BuiltinSite {
        name: "Gmail",
        pattern: "mail.google.com",
        curated: &[
            "[role=\"link\"]",
            "[role=\"button\"]",
            "[role=\"tab\"]",
            "tr[role=\"row\"]",
        ],
        all: DEFAULT_ALL,
        popup: Some("[role=\"menu\"]"),
    },
    BuiltinSite {
        name: "YouTube",
        pattern: "youtube.com",
        curated: &["a#thumbnail", "a[href]", "button", "ytd-button-renderer"],
        all: DEFAULT_ALL,
        popup: Some("ytd-menu-popup-renderer"),
    },
    BuiltinSite {
        name: "Reddit",
        pattern: "reddit.com",
        curated: &["a[href]", "button", "shreddit-post", "[role=\"button\"]"],
        all: DEFAULT_ALL,
        popup: None,
    },
];

fn to_string_vec(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

/// The generic configuration used when nothing more specific applies.
#[must_use]
pub fn default_config() -> SiteConfig {
    SiteConfig {
        name: "default".to_string(),
        match_pattern: String::new(),
        curated_selectors: to_string_vec(DEFAULT_CURATED),
        all_selectors: to_string_vec(DEFAULT_ALL),
        popup_selector: None,
        enabled: true,
    }
}

/// Extract the hostname from a URL or bare hostname string.
///
/// Accepts `scheme://host[:port]/path`, `host/path`, or a bare host.
/// Returns `None` for strings with no plausible hostname in them.
#[must_use]
pub fn hostname_of(location: &str) -> Option<String> {
    let rest = match location.find("://") {
        Some(idx) => &location[idx + 3..],
        None => location,
    };
    let host = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("")
        .split(':')
        .next()
        .unwrap_or("");
    let host = host.trim();
    if host.is_empty() {
        None
    } else {
        Some(host.to_ascii_lowercase())
    }
}

/// Resolve the effective configuration for a page location.
///
/// `location` is the page URL (or hostname) if known; a missing or
/// unparseable location falls back to [`default_config`] so the feature
/// still works with generic selectors.
pub fn resolve_config(location: Option<&str>, store: &dyn OverrideStore) -> SiteConfig {
    let Some(hostname) = location.and_then(hostname_of) else {
        tracing::debug!("no usable page location, using default configuration");
        return default_config();
    };

    if let Some(site_override) = store.lookup(&hostname) {
        tracing::debug!(%hostname, "applying persisted override");
        return apply_override(&hostname, site_override);
    }

    for site in BUILTIN_SITES {
        if hostname.contains(site.pattern) {
            return SiteConfig {
                name: site.name.to_string(),
                match_pattern: site.pattern.to_string(),
                curated_selectors: to_string_vec(site.curated),
                all_selectors: to_string_vec(site.all),
                popup_selector: site.popup.map(str::to_string),
                enabled: true,
            };
        }
    }

    default_config()
}

/// Turn a persisted override into a full configuration. Omitted selector
/// lists fall back to the generic defaults.
fn apply_override(hostname: &str, site_override: SiteOverride) -> SiteConfig {
    match site_override {
        SiteOverride::Disabled => SiteConfig {
            name: hostname.to_string(),
            match_pattern: hostname.to_string(),
            curated_selectors: Vec::new(),
            all_selectors: Vec::new(),
            popup_selector: None,
            enabled: false,
        },
        SiteOverride::Enabled {
            curated_selectors,
            all_selectors,
            popup_selector,
        } => SiteConfig {
            name: hostname.to_string(),
            match_pattern: hostname.to_string(),
            curated_selectors: curated_selectors.unwrap_or_else(|| to_string_vec(DEFAULT_CURATED)),
            all_selectors: all_selectors.unwrap_or_else(|| to_string_vec(DEFAULT_ALL)),
            popup_selector,
            enabled: true,
        },
    }
}
