use crate::utils::error::{Result, StoreError};
use regex::Regex;
use std::sync::OnceLock;

/// 購物車允許的最小數量 (公斤)
pub const MIN_QUANTITY: f64 = 0.1;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(StoreError::ConfigValidationError {
            field: field_name.to_string(),
            message: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(StoreError::ConfigValidationError {
            field: field_name.to_string(),
            message: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// 數量必須為有限且大於零
pub fn validate_positive_amount(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(StoreError::invalid_argument(
            field_name,
            value,
            "Value must be a finite number greater than zero",
        ));
    }
    Ok(())
}

/// 價格必須為有限且不為負
pub fn validate_non_negative_amount(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(StoreError::invalid_argument(
            field_name,
            value,
            "Value must be a finite number that is not negative",
        ));
    }
    Ok(())
}

pub fn validate_min_quantity(field_name: &str, value: f64) -> Result<()> {
    validate_positive_amount(field_name, value)?;
    // 容許 0.1 的浮點誤差
    if value + f64::EPSILON < MIN_QUANTITY {
        return Err(StoreError::invalid_argument(
            field_name,
            value,
            format!("Quantity must be at least {}", MIN_QUANTITY),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::invalid_argument(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_upi_id(upi_id: &str) -> Result<()> {
    static UPI_PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = UPI_PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._-]{2,256}@[A-Za-z][A-Za-z0-9]{1,63}$")
            .expect("UPI pattern is a valid regex")
    });

    let trimmed = upi_id.trim();
    if trimmed.is_empty() {
        return Err(StoreError::PaymentError {
            message: "Please enter a valid UPI ID".to_string(),
        });
    }
    if !re.is_match(trimmed) {
        return Err(StoreError::PaymentError {
            message: format!("'{}' is not a valid UPI ID", trimmed),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive_amount() {
        assert!(validate_positive_amount("quantity", 2.0).is_ok());
        assert!(validate_positive_amount("quantity", 0.0).is_err());
        assert!(validate_positive_amount("quantity", -1.5).is_err());
        assert!(validate_positive_amount("quantity", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_non_negative_amount() {
        assert!(validate_non_negative_amount("unit_price", 0.0).is_ok());
        assert!(validate_non_negative_amount("unit_price", 18.0).is_ok());
        assert!(validate_non_negative_amount("unit_price", -0.01).is_err());
        assert!(validate_non_negative_amount("unit_price", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_min_quantity() {
        assert!(validate_min_quantity("quantity", 0.1).is_ok());
        assert!(validate_min_quantity("quantity", 1.5).is_ok());
        assert!(validate_min_quantity("quantity", 0.05).is_err());
    }

    #[test]
    fn test_validate_upi_id() {
        assert!(validate_upi_id("ravi.kumar@okaxis").is_ok());
        assert!(validate_upi_id("9876543210@ybl").is_ok());
        assert!(validate_upi_id("   ").is_err());
        assert!(validate_upi_id("no-at-sign").is_err());
        assert!(validate_upi_id("name@").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("storage.data_dir", "./data").is_ok());
        assert!(validate_path("storage.data_dir", "").is_err());
    }
}
