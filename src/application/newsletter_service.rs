use std::sync::Arc;

use chrono::Utc;
use log::info;

use crate::domain::errors::DomainError;
use crate::domain::newsletter::{
    is_valid_email, normalize_email, Subscription, SubscriptionResult, SubscriptionStats,
    SubscriptionStatus,
};
use crate::domain::ports::NewsletterRepository;

pub const MSG_INVALID_EMAIL: &str = "Adresa de email nu este validă.";
pub const MSG_SUBSCRIBED: &str = "Te-ai abonat cu succes la newsletter!";
pub const MSG_ALREADY_SUBSCRIBED: &str = "Această adresă este deja abonată la newsletter.";
pub const MSG_REACTIVATED: &str = "Abonarea ta la newsletter a fost reactivată.";
pub const MSG_NOT_FOUND: &str = "Adresa de email nu a fost găsită în lista de abonați.";
pub const MSG_ALREADY_UNSUBSCRIBED: &str = "Această adresă este deja dezabonată.";
pub const MSG_UNSUBSCRIBED: &str = "Te-ai dezabonat cu succes de la newsletter.";

#[derive(Clone)]
pub struct NewsletterService {
    repo: Arc<dyn NewsletterRepository>,
}

impl NewsletterService {
    pub fn new(repo: Arc<dyn NewsletterRepository>) -> Self {
        Self { repo }
    }

    pub async fn subscribe(
        &self,
        email: &str,
        source: &str,
    ) -> Result<SubscriptionResult, DomainError> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Ok(SubscriptionResult::rejected(MSG_INVALID_EMAIL));
        }

        match self.repo.find_by_email(&email).await? {
            Some(existing) if existing.status == SubscriptionStatus::Active => {
                Ok(SubscriptionResult::rejected(MSG_ALREADY_SUBSCRIBED))
            }
            Some(_) => {
                self.repo
                    .set_status(&email, SubscriptionStatus::Active, Utc::now())
                    .await?;
                info!("Newsletter subscription reactivated for {}", email);
                Ok(SubscriptionResult::ok(MSG_REACTIVATED))
            }
            None => match self.repo.insert(&email, source).await {
                Ok(_) => {
                    info!("New newsletter subscription from {}", source);
                    Ok(SubscriptionResult::ok(MSG_SUBSCRIBED))
                }
                // Lost a race with a concurrent subscribe for the same address.
                Err(DomainError::Conflict(_)) => {
                    Ok(SubscriptionResult::rejected(MSG_ALREADY_SUBSCRIBED))
                }
                Err(e) => Err(e),
            },
        }
    }

    pub async fn unsubscribe(&self, email: &str) -> Result<SubscriptionResult, DomainError> {
        let email = normalize_email(email);
        match self.repo.find_by_email(&email).await? {
            None => Ok(SubscriptionResult::rejected(MSG_NOT_FOUND)),
            Some(existing) if existing.status == SubscriptionStatus::Unsubscribed => {
                Ok(SubscriptionResult::ok(MSG_ALREADY_UNSUBSCRIBED))
            }
            Some(_) => {
                self.repo
                    .set_status(&email, SubscriptionStatus::Unsubscribed, Utc::now())
                    .await?;
                info!("Newsletter subscription cancelled for {}", email);
                Ok(SubscriptionResult::ok(MSG_UNSUBSCRIBED))
            }
        }
    }

    /// Flag an address whose deliveries bounce so campaigns skip it.
    pub async fn mark_bounced(&self, email: &str) -> Result<Subscription, DomainError> {
        let email = normalize_email(email);
        if self.repo.find_by_email(&email).await?.is_none() {
            return Err(DomainError::NotFound);
        }
        self.repo
            .set_status(&email, SubscriptionStatus::Bounced, Utc::now())
            .await
    }

    pub async fn list(
        &self,
        status: Option<SubscriptionStatus>,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Subscription>, i64), DomainError> {
        self.repo.list(status, page.max(1), limit.clamp(1, 100)).await
    }

    pub async fn stats(&self) -> Result<SubscriptionStats, DomainError> {
        self.repo.stats().await
    }
}
