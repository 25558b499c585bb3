pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::StoreConfig;

pub use adapters::{JsonOrderRepository, LocalStorage};
pub use crate::core::{
    billing::{RecurrenceBillingEngine, WeeklyPolicy},
    cart::Cart,
    invoice::MonthlyInvoice,
    orders::OrderBook,
};
pub use utils::error::{Result, StoreError};
