// Adapters layer: concrete implementations of the domain ports.

pub mod json_repository;
pub mod storage;

pub use json_repository::JsonOrderRepository;
pub use storage::LocalStorage;
