pub mod catalog;
pub mod checkout;
pub mod errors;
pub mod events;
pub mod newsletter;
pub mod order;
pub mod ports;
pub mod pricing;
pub mod working_hours;
