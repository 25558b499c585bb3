use crate::core::billing::RecurrenceBillingEngine;
use crate::domain::model::{CartItem, Frequency, LineItem};
use crate::utils::error::{Result, StoreError};
use crate::utils::validation::{
    validate_min_quantity, validate_non_empty_string, validate_non_negative_amount,
};
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
    #[serde(default)]
    next_seq: u64,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 同一商品再次加入時只更新頻率與數量，保留原序號。
    /// 回傳該品項的序號。
    pub fn add_or_update(
        &mut self,
        product: &str,
        unit_price: f64,
        frequency: Frequency,
        quantity: f64,
        now: DateTime<Local>,
    ) -> Result<String> {
        validate_non_empty_string("product", product)?;
        validate_non_negative_amount("unit_price", unit_price)?;
        validate_min_quantity("quantity", quantity)?;

        if let Some(existing) = self.items.iter_mut().find(|i| i.product == product) {
            existing.frequency = frequency;
            existing.quantity = quantity;
            tracing::info!(
                product,
                %frequency,
                quantity,
                serial_no = %existing.serial_no,
                "Cart item updated"
            );
            return Ok(existing.serial_no.clone());
        }

        let serial_no = self.generate_serial_number(now);
        self.items.push(CartItem {
            product: product.to_string(),
            unit_price,
            quantity,
            frequency,
            serial_no: serial_no.clone(),
        });
        tracing::info!(product, %frequency, quantity, %serial_no, "Added to cart");
        Ok(serial_no)
    }

    pub fn remove(&mut self, index: usize) -> Result<CartItem> {
        if index >= self.items.len() {
            return Err(StoreError::not_found("cart item", index.to_string()));
        }
        let removed = self.items.remove(index);
        tracing::info!(product = %removed.product, "Removed from cart");
        Ok(removed)
    }

    /// 清空購物車並取出所有品項
    pub fn take_items(&mut self) -> Vec<CartItem> {
        std::mem::take(&mut self.items)
    }

    pub fn line_items(&self, reference_date: NaiveDate) -> Result<Vec<LineItem>> {
        self.items
            .iter()
            .map(|i| LineItem::new(i.unit_price, i.quantity, i.frequency, reference_date))
            .collect()
    }

    pub fn monthly_total(
        &self,
        engine: &RecurrenceBillingEngine,
        reference_date: NaiveDate,
    ) -> Result<f64> {
        engine.sum_monthly_total(&self.line_items(reference_date)?, reference_date)
    }

    // 6 位數序號：時間戳毫秒末段加上遞增序列，避免與車內既有序號重複
    fn generate_serial_number(&mut self, now: DateTime<Local>) -> String {
        let base = now.timestamp_millis().unsigned_abs();
        loop {
            self.next_seq += 1;
            let candidate = format!("{:06}", (base + self.next_seq) % 1_000_000);
            if !self.items.iter().any(|i| i.serial_no == candidate) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 28, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_add_new_products_get_distinct_serials() {
        let mut cart = Cart::new();
        let a = cart
            .add_or_update("tomatoes", 40.0, Frequency::Daily, 1.0, now())
            .unwrap();
        let b = cart
            .add_or_update("milk", 60.0, Frequency::Weekly, 2.0, now())
            .unwrap();

        assert_eq!(cart.len(), 2);
        assert_ne!(a, b);
        assert_eq!(a.len(), 6);
        assert!(a.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_adding_same_product_updates_in_place() {
        let mut cart = Cart::new();
        let serial = cart
            .add_or_update("rice", 120.0, Frequency::OneTime, 1.0, now())
            .unwrap();
        let again = cart
            .add_or_update("rice", 120.0, Frequency::Monthly, 2.5, now())
            .unwrap();

        assert_eq!(serial, again);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].frequency, Frequency::Monthly);
        assert_eq!(cart.items()[0].quantity, 2.5);
    }

    #[test]
    fn test_add_rejects_tiny_quantity_and_negative_price() {
        let mut cart = Cart::new();
        assert!(cart
            .add_or_update("bread", 30.0, Frequency::Daily, 0.05, now())
            .is_err());
        assert!(cart
            .add_or_update("bread", -30.0, Frequency::Daily, 1.0, now())
            .is_err());
        assert!(cart
            .add_or_update("  ", 30.0, Frequency::Daily, 1.0, now())
            .is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_by_index() {
        let mut cart = Cart::new();
        cart.add_or_update("apples", 85.0, Frequency::Weekly, 1.0, now())
            .unwrap();
        assert!(matches!(cart.remove(3), Err(StoreError::NotFound { .. })));
        let removed = cart.remove(0).unwrap();
        assert_eq!(removed.product, "apples");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_monthly_total_routes_through_engine() {
        let mut cart = Cart::new();
        cart.add_or_update("milk", 20.0, Frequency::Daily, 2.0, now())
            .unwrap();
        cart.add_or_update("paneer", 18.0, Frequency::Weekly, 1.0, now())
            .unwrap();

        let engine = RecurrenceBillingEngine::new();
        let today = NaiveDate::from_ymd_opt(2024, 1, 28).unwrap();
        assert_eq!(cart.monthly_total(&engine, today).unwrap(), 1240.0 + 72.0);
    }
}
