pub mod cart_repo;
pub mod catalog_repo;
pub mod event_log;
pub mod gateway;
pub mod models;
pub mod newsletter_repo;
pub mod order_repo;
pub mod profile_repo;

#[cfg(test)]
pub(crate) mod test_db;
