use std::sync::Arc;

use crate::application::cache::StorefrontCache;
use crate::application::catalog_service::CatalogService;
use crate::application::checkout_service::CheckoutService;
use crate::application::newsletter_service::NewsletterService;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::domain::errors::GatewayError;
use crate::domain::ports::{OrderRepository, ProfileRepository};
use crate::infrastructure::cart_repo::DieselCartStore;
use crate::infrastructure::catalog_repo::{DieselSettingsRepository, DieselShowroomRepository};
use crate::infrastructure::gateway::{FunctionsClient, HttpStockReservations, NetopiaGateway};
use crate::infrastructure::newsletter_repo::DieselNewsletterRepository;
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::infrastructure::profile_repo::DieselProfileRepository;

/// Everything the HTTP handlers need, shared across workers.
#[derive(Clone)]
pub struct AppState {
    pub checkout: CheckoutService,
    pub orders: Arc<dyn OrderRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub newsletter: NewsletterService,
    pub catalog: CatalogService,
    pub cache: Arc<StorefrontCache>,
}

impl AppState {
    /// Wire the diesel repositories and remote function clients together.
    pub fn build(pool: &DbPool, config: &AppConfig) -> Result<Self, GatewayError> {
        let functions = FunctionsClient::new(
            &config.functions_url,
            config.functions_api_key.as_deref(),
            config.http_timeout,
        )?;

        let orders: Arc<dyn OrderRepository> = Arc::new(DieselOrderRepository::new(pool.clone()));
        let newsletter = NewsletterService::new(Arc::new(DieselNewsletterRepository::new(
            pool.clone(),
        )));
        let catalog = CatalogService::new(
            Arc::new(DieselSettingsRepository::new(pool.clone())),
            Arc::new(DieselShowroomRepository::new(pool.clone())),
        );
        let checkout = CheckoutService::new(
            orders.clone(),
            Arc::new(DieselCartStore::new(pool.clone())),
            Arc::new(HttpStockReservations::new(functions.clone())),
            Arc::new(NetopiaGateway::new(functions)),
            newsletter.clone(),
            config.pricing,
        );

        Ok(Self {
            checkout,
            orders,
            profiles: Arc::new(DieselProfileRepository::new(pool.clone())),
            newsletter,
            cache: Arc::new(StorefrontCache::new(catalog.clone())),
            catalog,
        })
    }
}
