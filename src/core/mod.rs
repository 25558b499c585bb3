pub mod billing;
pub mod cart;
pub mod invoice;
pub mod orders;

pub use crate::domain::model::{
    CartItem, DeliveryProjection, DeliverySlot, Frequency, LineItem, Order, OrderProduct,
    OrderStatus, PaymentChoice, PaymentStatus,
};
pub use crate::domain::ports::{ConfigProvider, OrderRepository, Storage};
pub use crate::utils::error::Result;
