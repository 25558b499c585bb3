use crate::core::{Order, OrderRepository, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;

pub const DEFAULT_ORDERS_KEY: &str = "orders.json";

/// 將完整訂單清單以 JSON 快照存放在 Storage 的單一 key 下
pub struct JsonOrderRepository<S: Storage> {
    storage: S,
    key: String,
}

impl<S: Storage> JsonOrderRepository<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn with_default_key(storage: S) -> Self {
        Self::new(storage, DEFAULT_ORDERS_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl<S: Storage> OrderRepository for JsonOrderRepository<S> {
    async fn load(&self) -> Result<Vec<Order>> {
        if !self.storage.exists(&self.key).await {
            tracing::debug!("No order snapshot at '{}', starting empty", self.key);
            return Ok(Vec::new());
        }

        let data = self.storage.read_file(&self.key).await?;
        let orders: Vec<Order> = serde_json::from_slice(&data)?;
        Ok(orders)
    }

    async fn save(&self, orders: &[Order]) -> Result<()> {
        let json = serde_json::to_vec_pretty(orders)?;
        tracing::debug!(
            "Writing {} orders ({} bytes) to '{}'",
            orders.len(),
            json.len(),
            self.key
        );
        self.storage.write_file(&self.key, &json).await
    }
}
