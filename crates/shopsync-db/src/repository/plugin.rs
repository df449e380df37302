//! # Site Plugin Repository
//!
//! Cached plugin descriptors, keyed by `(site_id, name)`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use shopsync_core::{SiteId, SitePlugin};

use crate::error::DbResult;
use crate::table::{KeyValue, LocalTable, SqliteQuery};

const INSERT_SQL: &str = r#"
    INSERT INTO site_plugins (
        id, site_id, plugin, status, name,
        plugin_uri, author, author_uri,
        description_raw, description_rendered, version, network_only,
        requires_wp_version, requires_php_version, text_domain,
        created_at, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)
"#;

const UPDATE_SQL: &str = r#"
    UPDATE site_plugins SET
        plugin = ?2,
        status = ?3,
        plugin_uri = ?4,
        author = ?5,
        author_uri = ?6,
        description_raw = ?7,
        description_rendered = ?8,
        version = ?9,
        network_only = ?10,
        requires_wp_version = ?11,
        requires_php_version = ?12,
        text_domain = ?13,
        updated_at = ?14
    WHERE id = ?1
"#;

impl LocalTable for SitePlugin {
    const TABLE: &'static str = "site_plugins";
    const KEY_COLUMN: &'static str = "name";
    const ORDER_BY: &'static str = "name COLLATE NOCASE ASC";

    fn key_value(key: &Self::Key) -> KeyValue {
        KeyValue::Text(key.clone())
    }

    fn insert_query<'q>(&'q self, row_id: &'q str, now: DateTime<Utc>) -> SqliteQuery<'q> {
        sqlx::query(INSERT_SQL)
            .bind(row_id)
            .bind(self.site_id)
            .bind(self.plugin.as_str())
            .bind(self.status)
            .bind(self.name.as_str())
            .bind(self.plugin_uri.as_str())
            .bind(self.author.as_str())
            .bind(self.author_uri.as_str())
            .bind(self.description_raw.as_str())
            .bind(self.description_rendered.as_str())
            .bind(self.version.as_str())
            .bind(self.network_only)
            .bind(self.requires_wp_version.as_str())
            .bind(self.requires_php_version.as_str())
            .bind(self.text_domain.as_str())
            .bind(now)
    }

    fn update_query<'q>(&'q self, row_id: &'q str, now: DateTime<Utc>) -> SqliteQuery<'q> {
        sqlx::query(UPDATE_SQL)
            .bind(row_id)
            .bind(self.plugin.as_str())
            .bind(self.status)
            .bind(self.plugin_uri.as_str())
            .bind(self.author.as_str())
            .bind(self.author_uri.as_str())
            .bind(self.description_raw.as_str())
            .bind(self.description_rendered.as_str())
            .bind(self.version.as_str())
            .bind(self.network_only)
            .bind(self.requires_wp_version.as_str())
            .bind(self.requires_php_version.as_str())
            .bind(self.text_domain.as_str())
            .bind(now)
    }
}

/// Repository for cached site plugins.
#[derive(Debug, Clone)]
pub struct SitePluginRepository {
    pool: SqlitePool,
}

impl SitePluginRepository {
    /// Creates a new SitePluginRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SitePluginRepository { pool }
    }

    /// Lists the plugins of a site, ordered by name.
    pub async fn list(&self, site_id: SiteId) -> DbResult<Vec<SitePlugin>> {
        let plugins = super::list_for_site::<SitePlugin>(&self.pool, site_id).await?;
        debug!(site_id = %site_id, count = plugins.len(), "Listed site plugins");
        Ok(plugins)
    }

    /// Gets a plugin by display name.
    pub async fn get(&self, site_id: SiteId, name: &str) -> DbResult<Option<SitePlugin>> {
        super::get_by_key::<SitePlugin>(&self.pool, site_id, &name.to_string()).await
    }

    /// Counts the plugins of a site.
    pub async fn count(&self, site_id: SiteId) -> DbResult<i64> {
        super::count_for_site::<SitePlugin>(&self.pool, site_id).await
    }

    /// Local row ids of a site, ordered by name.
    pub async fn row_ids(&self, site_id: SiteId) -> DbResult<Vec<String>> {
        super::row_ids_for_site::<SitePlugin>(&self.pool, site_id).await
    }

    /// Returns true when the named plugin is cached as active on the site.
    pub async fn is_active(&self, site_id: SiteId, name: &str) -> DbResult<bool> {
        Ok(self
            .get(site_id, name)
            .await?
            .is_some_and(|plugin| plugin.status.is_active()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use shopsync_core::PluginStatus;

    #[tokio::test]
    async fn test_round_trip_through_row() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let site = SiteId::new(7);

        let mut plugin = SitePlugin::new(site, "woocommerce/woocommerce.php", "WooCommerce", PluginStatus::NetworkActive)
            .with_version("8.1.0");
        plugin.network_only = true;
        plugin.author = "Automattic".to_string();

        let mut session = db.begin_write().await.unwrap();
        session.insert(&plugin).await.unwrap();
        session.commit().await.unwrap();

        let stored = db.site_plugins().get(site, "WooCommerce").await.unwrap();
        assert_eq!(stored, Some(plugin));
        assert!(db.site_plugins().is_active(site, "WooCommerce").await.unwrap());
        assert!(!db.site_plugins().is_active(site, "Jetpack").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let site = SiteId::new(7);

        let mut session = db.begin_write().await.unwrap();
        for name in ["jetpack", "Akismet", "WooCommerce"] {
            session
                .insert(&SitePlugin::new(site, format!("{name}.php"), name, PluginStatus::Inactive))
                .await
                .unwrap();
        }
        session.commit().await.unwrap();

        let names: Vec<String> = db
            .site_plugins()
            .list(site)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Akismet", "jetpack", "WooCommerce"]);
    }
}
