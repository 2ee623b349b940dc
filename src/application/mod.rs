pub mod cache;
pub mod catalog_service;
pub mod checkout_service;
pub mod newsletter_service;
pub mod realtime;

#[cfg(test)]
pub(crate) mod fakes;
