//! # Site Plugins
//!
//! A plugin installed on a site. Plugins are matched by their display name,
//! the same natural key the REST API's plugin listing exposes.

use serde::{Deserialize, Serialize};

use crate::types::{ResourceKind, SiteId, SiteResource};

// =============================================================================
// Plugin Status
// =============================================================================

/// Activation state reported for a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum PluginStatus {
    #[serde(rename = "active")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "active"))]
    Active,

    #[default]
    #[serde(rename = "inactive")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "inactive"))]
    Inactive,

    /// Activated for every site of a multisite network.
    #[serde(rename = "network-active")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "network-active"))]
    NetworkActive,

    /// Any status this client does not know about.
    #[serde(other, rename = "unknown")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "unknown"))]
    Unknown,
}

impl PluginStatus {
    /// Returns true when the plugin is running on the site.
    pub fn is_active(&self) -> bool {
        matches!(self, PluginStatus::Active | PluginStatus::NetworkActive)
    }
}

// =============================================================================
// Site Plugin
// =============================================================================

/// One plugin descriptor as returned by the remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SitePlugin {
    /// Site the plugin is installed on.
    pub site_id: SiteId,

    /// Plugin file, e.g. `woocommerce/woocommerce.php`.
    pub plugin: String,

    pub status: PluginStatus,

    /// Display name; the natural key.
    pub name: String,

    pub plugin_uri: String,
    pub author: String,
    pub author_uri: String,
    pub description_raw: String,
    pub description_rendered: String,
    pub version: String,

    /// Whether the plugin can only be activated network-wide.
    pub network_only: bool,

    pub requires_wp_version: String,
    pub requires_php_version: String,
    pub text_domain: String,
}

impl SitePlugin {
    /// Creates a plugin with the identifying fields set and the rest empty.
    pub fn new(
        site_id: SiteId,
        plugin: impl Into<String>,
        name: impl Into<String>,
        status: PluginStatus,
    ) -> Self {
        SitePlugin {
            site_id,
            plugin: plugin.into(),
            status,
            name: name.into(),
            plugin_uri: String::new(),
            author: String::new(),
            author_uri: String::new(),
            description_raw: String::new(),
            description_rendered: String::new(),
            version: String::new(),
            network_only: false,
            requires_wp_version: String::new(),
            requires_php_version: String::new(),
            text_domain: String::new(),
        }
    }

    /// Sets the version (builder style).
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

impl SiteResource for SitePlugin {
    type Key = String;

    const KIND: ResourceKind = ResourceKind::SitePlugin;

    fn site_id(&self) -> SiteId {
        self.site_id
    }

    fn key(&self) -> String {
        self.name.clone()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_key_is_name() {
        let plugin = SitePlugin::new(SiteId::new(1), "jetpack/jetpack.php", "Jetpack", PluginStatus::Active);
        assert_eq!(plugin.key(), "Jetpack");
        assert_eq!(plugin.site_id(), SiteId::new(1));
    }

    #[test]
    fn test_unknown_status_deserializes() {
        let status: PluginStatus = serde_json::from_str("\"must-use\"").unwrap();
        assert_eq!(status, PluginStatus::Unknown);

        let status: PluginStatus = serde_json::from_str("\"network-active\"").unwrap();
        assert!(status.is_active());
    }
}
