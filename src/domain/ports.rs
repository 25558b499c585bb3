use crate::domain::model::Order;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn data_dir(&self) -> &str;
    fn orders_key(&self) -> &str;
    fn vendor(&self) -> &str;
    fn location(&self) -> Option<&str>;
}

/// 訂單歷史的持久化介面：初始化時載入、每次異動後儲存
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn load(&self) -> Result<Vec<Order>>;
    async fn save(&self, orders: &[Order]) -> Result<()>;
}
