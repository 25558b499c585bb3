use crate::adapters::json_repository::DEFAULT_ORDERS_KEY;
use crate::core::billing::WeeklyPolicy;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, StoreError};
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub billing: BillingConfig,
    #[serde(default)]
    pub store: StoreInfoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_orders_key")]
    pub orders_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    #[serde(default)]
    pub weekly_policy: WeeklyPolicy,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreInfoConfig {
    #[serde(default = "default_vendor")]
    pub vendor: String,
    pub location: Option<String>,
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_orders_key() -> String {
    DEFAULT_ORDERS_KEY.to_string()
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_vendor() -> String {
    "Fresh Mart".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            orders_key: default_orders_key(),
        }
    }
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            weekly_policy: WeeklyPolicy::default(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl Default for StoreInfoConfig {
    fn default() -> Self {
        Self {
            vendor: default_vendor(),
            location: None,
        }
    }
}

impl StoreConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(StoreError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| StoreError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_PATTERN: OnceLock<Regex> = OnceLock::new();
        let re = ENV_PATTERN
            .get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env pattern is a valid regex"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("storage.data_dir", &self.storage.data_dir)?;
        validate_path("storage.orders_key", &self.storage.orders_key)?;

        if self.storage.orders_key.contains("..") {
            return Err(StoreError::ConfigValidationError {
                field: "storage.orders_key".to_string(),
                message: "Key must stay inside the data directory".to_string(),
            });
        }

        validate_non_empty_string("store.vendor", &self.store.vendor).map_err(|_| {
            StoreError::ConfigValidationError {
                field: "store.vendor".to_string(),
                message: "Vendor name cannot be empty".to_string(),
            }
        })?;

        Ok(())
    }

    pub fn weekly_policy(&self) -> WeeklyPolicy {
        self.billing.weekly_policy
    }

    pub fn currency_symbol(&self) -> &str {
        &self.billing.currency_symbol
    }
}

impl ConfigProvider for StoreConfig {
    fn data_dir(&self) -> &str {
        &self.storage.data_dir
    }

    fn orders_key(&self) -> &str {
        &self.storage.orders_key
    }

    fn vendor(&self) -> &str {
        &self.store.vendor
    }

    fn location(&self) -> Option<&str> {
        self.store.location.as_deref()
    }
}

impl Validate for StoreConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[storage]
data_dir = "./orders-data"
orders_key = "vendorOrders.json"

[billing]
weekly_policy = "per_delivery"
currency_symbol = "Rs"

[store]
vendor = "Green Basket"
location = "Indore"
"#;

        let config = StoreConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.data_dir(), "./orders-data");
        assert_eq!(config.orders_key(), "vendorOrders.json");
        assert_eq!(config.weekly_policy(), WeeklyPolicy::PerDelivery);
        assert_eq!(config.currency_symbol(), "Rs");
        assert_eq!(config.vendor(), "Green Basket");
        assert_eq!(config.location(), Some("Indore"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = StoreConfig::from_toml_str("").unwrap();
        assert_eq!(config.data_dir(), "./data");
        assert_eq!(config.orders_key(), "orders.json");
        assert_eq!(config.weekly_policy(), WeeklyPolicy::Flat);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("GROCERY_TEST_DATA_DIR", "/tmp/grocery-test");

        let toml_content = r#"
[storage]
data_dir = "${GROCERY_TEST_DATA_DIR}"
"#;

        let config = StoreConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.data_dir(), "/tmp/grocery-test");

        std::env::remove_var("GROCERY_TEST_DATA_DIR");
    }

    #[test]
    fn test_unknown_weekly_policy_fails_to_parse() {
        let toml_content = r#"
[billing]
weekly_policy = "sometimes"
"#;
        let err = StoreConfig::from_toml_str(toml_content).unwrap_err();
        assert!(matches!(err, StoreError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[storage]
orders_key = "../escape.json"
"#;
        let config = StoreConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[store]
vendor = "  "
"#;
        let config = StoreConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[store]\nvendor = \"File Vendor\"\n")
            .unwrap();

        let config = StoreConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.vendor(), "File Vendor");
    }
}
