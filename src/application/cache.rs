//! Read-through copy of the data the public storefront pages show on every
//! request. Kept fresh by [`RealTimeSync`](super::realtime::RealTimeSync).

use std::collections::BTreeMap;

use log::debug;
use tokio::sync::RwLock;

use super::catalog_service::{CatalogService, ShowroomView};
use crate::domain::catalog::SiteSetting;
use crate::domain::errors::DomainError;
use crate::domain::events::{EventAction, EventEntity, RealtimeEvent};

pub struct StorefrontCache {
    catalog: CatalogService,
    settings: RwLock<BTreeMap<String, SiteSetting>>,
    showrooms: RwLock<Vec<ShowroomView>>,
}

impl StorefrontCache {
    /// Creates an empty cache; call [`refresh_all`](Self::refresh_all)
    /// before serving from it.
    pub fn new(catalog: CatalogService) -> Self {
        Self {
            catalog,
            settings: RwLock::new(BTreeMap::new()),
            showrooms: RwLock::new(Vec::new()),
        }
    }

    pub async fn settings(&self) -> Vec<SiteSetting> {
        self.settings.read().await.values().cloned().collect()
    }

    pub async fn setting(&self, key: &str) -> Option<SiteSetting> {
        self.settings.read().await.get(key).cloned()
    }

    /// Active showrooms only.
    pub async fn showrooms(&self) -> Vec<ShowroomView> {
        self.showrooms.read().await.clone()
    }

    pub async fn refresh_all(&self) -> Result<(), DomainError> {
        self.refresh(EventEntity::SiteSettings).await?;
        self.refresh(EventEntity::Showrooms).await
    }

    /// Reload every cached row of `entity`.
    pub async fn refresh(&self, entity: EventEntity) -> Result<(), DomainError> {
        match entity {
            EventEntity::SiteSettings => {
                let fresh: BTreeMap<_, _> = self
                    .catalog
                    .list_settings()
                    .await?
                    .into_iter()
                    .map(|s| (s.key.clone(), s))
                    .collect();
                debug!("Cached {} site settings", fresh.len());
                *self.settings.write().await = fresh;
            }
            EventEntity::Showrooms => {
                let fresh = self.catalog.list_showrooms(true).await?;
                debug!("Cached {} active showrooms", fresh.len());
                *self.showrooms.write().await = fresh;
            }
            EventEntity::NewsletterSubscriptions => {}
        }
        Ok(())
    }

    /// Update the cache for a single change. A settings event names its key,
    /// so only that entry is re-fetched; anything else reloads the entity.
    pub async fn apply(&self, event: &RealtimeEvent) -> Result<(), DomainError> {
        let key = event.data.get("key").and_then(|k| k.as_str());
        match (event.entity, key) {
            (EventEntity::SiteSettings, Some(key)) => {
                if event.action == EventAction::Deleted {
                    self.settings.write().await.remove(key);
                    return Ok(());
                }
                match self.catalog.get_setting(key).await {
                    Ok(setting) => {
                        self.settings.write().await.insert(key.to_string(), setting);
                    }
                    Err(DomainError::NotFound) => {
                        self.settings.write().await.remove(key);
                    }
                    Err(e) => return Err(e),
                }
                Ok(())
            }
            (entity, _) => self.refresh(entity).await,
        }
    }
}
