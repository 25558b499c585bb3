use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid argument '{field}' = '{value}': {reason}")]
    InvalidArgument {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Cannot {action} order {id} while it is {from}")]
    InvalidTransition {
        id: String,
        from: String,
        action: String,
    },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Payment error: {message}")]
    PaymentError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Order,
    Payment,
    Storage,
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// CLI 結束代碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl StoreError {
    pub fn invalid_argument(field: &str, value: impl ToString, reason: impl Into<String>) -> Self {
        StoreError::InvalidArgument {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.to_string(),
            id: id.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            StoreError::InvalidArgument { .. } | StoreError::EmptyCart => ErrorCategory::Input,
            StoreError::NotFound { .. } | StoreError::InvalidTransition { .. } => {
                ErrorCategory::Order
            }
            StoreError::PaymentError { .. } => ErrorCategory::Payment,
            StoreError::IoError(_)
            | StoreError::SerializationError(_)
            | StoreError::CsvError(_) => ErrorCategory::Storage,
            StoreError::ConfigValidationError { .. } => ErrorCategory::Config,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Payment => ErrorSeverity::Medium,
            ErrorCategory::Order | ErrorCategory::Config => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            StoreError::InvalidArgument { .. } => "檢查輸入的數量與價格 (quantity > 0, price >= 0)",
            StoreError::NotFound { .. } => "使用 `list` 指令確認訂單編號或商品序號",
            StoreError::InvalidTransition { .. } => "確認訂單目前的狀態是否允許此操作",
            StoreError::EmptyCart => "請先加入至少一項商品再下單",
            StoreError::PaymentError { .. } => "請輸入有效的 UPI ID，例如 name@bank",
            StoreError::IoError(_) => "確認資料目錄存在且具有寫入權限",
            StoreError::SerializationError(_) => "訂單檔案可能已損毀，請檢查 JSON 格式",
            StoreError::CsvError(_) => "確認輸出路徑可寫入",
            StoreError::ConfigValidationError { .. } => "檢查 TOML 設定檔的欄位與格式",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            StoreError::InvalidArgument { field, reason, .. } => {
                format!("Invalid value for {}: {}", field, reason)
            }
            StoreError::NotFound { entity, id } => format!("Could not find {} '{}'", entity, id),
            StoreError::InvalidTransition { id, from, action } => {
                format!("Order {} is {} and cannot {}", id, from, action)
            }
            StoreError::EmptyCart => "Your cart is empty".to_string(),
            StoreError::PaymentError { message } => format!("Payment failed: {}", message),
            StoreError::IoError(e) => format!("Could not access order data: {}", e),
            StoreError::SerializationError(_) => "Stored order data is unreadable".to_string(),
            StoreError::CsvError(_) => "Could not write the invoice".to_string(),
            StoreError::ConfigValidationError { field, message } => {
                format!("Configuration problem in {}: {}", field, message)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
