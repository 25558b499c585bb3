use crate::utils::error::{Result, StoreError};
use crate::utils::validation::{validate_non_negative_amount, validate_positive_amount};
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 訂閱配送頻率
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Frequency {
    OneTime,
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::OneTime,
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::OneTime => "One Time",
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Frequency {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "onetime" | "one-time" | "one_time" | "once" => Ok(Frequency::OneTime),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(StoreError::invalid_argument(
                "frequency",
                other,
                "Expected one of: oneTime, daily, weekly, monthly",
            )),
        }
    }
}

/// 單一訂閱品項，用來計算配送日期與月費
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub unit_price: f64,
    pub quantity: f64,
    pub frequency: Frequency,
    pub anchor_date: NaiveDate,
}

impl LineItem {
    pub fn new(
        unit_price: f64,
        quantity: f64,
        frequency: Frequency,
        anchor_date: NaiveDate,
    ) -> Result<Self> {
        let item = Self {
            unit_price,
            quantity,
            frequency,
            anchor_date,
        };
        item.check()?;
        Ok(item)
    }

    /// 欄位是公開的，計算前仍需再檢查一次
    pub fn check(&self) -> Result<()> {
        validate_positive_amount("quantity", self.quantity)?;
        validate_non_negative_amount("unit_price", self.unit_price)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryProjection {
    /// 當月配送日 (遞增、不重複)
    pub dates: Vec<u32>,
    pub monthly_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: String,
    pub unit_price: f64,
    pub quantity: f64,
    pub frequency: Frequency,
    pub serial_no: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Processing,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Processing)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentChoice {
    Now,
    Later,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliverySlot {
    Morning,
    Afternoon,
    Evening,
}

impl DeliverySlot {
    pub fn label(&self) -> &'static str {
        match self {
            DeliverySlot::Morning => "Morning: 9 AM – 12 PM",
            DeliverySlot::Afternoon => "Afternoon: 2 PM – 5 PM",
            DeliverySlot::Evening => "Evening: 4 PM – 7 PM",
        }
    }
}

impl fmt::Display for DeliverySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DeliverySlot {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(DeliverySlot::Morning),
            "afternoon" => Ok(DeliverySlot::Afternoon),
            "evening" => Ok(DeliverySlot::Evening),
            other => Err(StoreError::invalid_argument(
                "delivery_slot",
                other,
                "Expected one of: morning, afternoon, evening",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderProduct {
    pub serial_no: String,
    pub name: String,
    pub quantity: f64,
    pub frequency: Frequency,
    pub unit_price: f64,
    #[serde(default)]
    pub has_issue: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_reason: Option<String>,
}

impl From<CartItem> for OrderProduct {
    fn from(item: CartItem) -> Self {
        Self {
            serial_no: item.serial_no,
            name: item.product,
            quantity: item.quantity,
            frequency: item.frequency,
            unit_price: item.unit_price,
            has_issue: false,
            issue_reason: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub vendor: String,
    pub products: Vec<OrderProduct>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_choice: Option<PaymentChoice>,
    pub order_date: DateTime<Local>,
    pub delivery_slot: DeliverySlot,
    pub scheduled_delivery: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
}

impl Order {
    pub fn product(&self, serial_no: &str) -> Option<&OrderProduct> {
        self.products.iter().find(|p| p.serial_no == serial_no)
    }

    /// 以訂單品項轉換為計費用的 LineItem
    pub fn line_items(&self, reference_date: NaiveDate) -> Result<Vec<LineItem>> {
        self.products
            .iter()
            .map(|p| LineItem::new(p.unit_price, p.quantity, p.frequency, reference_date))
            .collect()
    }
}
