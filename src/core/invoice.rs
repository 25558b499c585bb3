use crate::core::billing::RecurrenceBillingEngine;
use crate::domain::model::{Frequency, LineItem, Order};
use crate::utils::error::{Result, StoreError};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceLine {
    pub serial_no: String,
    pub name: String,
    pub frequency: Frequency,
    pub quantity: f64,
    pub unit_price: f64,
    pub monthly_total: f64,
    /// 當月實際會配送的日期
    pub delivery_days: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyInvoice {
    pub order_id: String,
    /// `YYYY-MM`
    pub month: String,
    pub lines: Vec<InvoiceLine>,
    pub grand_total: f64,
}

impl MonthlyInvoice {
    pub fn build(
        engine: &RecurrenceBillingEngine,
        order: &Order,
        reference_date: NaiveDate,
    ) -> Result<Self> {
        let mut lines = Vec::with_capacity(order.products.len());
        for product in &order.products {
            let item = LineItem::new(
                product.unit_price,
                product.quantity,
                product.frequency,
                reference_date,
            )?;
            let projection = engine.project_deliveries(&item, reference_date)?;
            lines.push(InvoiceLine {
                serial_no: product.serial_no.clone(),
                name: product.name.clone(),
                frequency: product.frequency,
                quantity: product.quantity,
                unit_price: product.unit_price,
                monthly_total: projection.monthly_total,
                delivery_days: projection.dates,
            });
        }

        let grand_total = lines.iter().map(|l| l.monthly_total).sum();
        Ok(Self {
            order_id: order.id.clone(),
            month: reference_date.format("%Y-%m").to_string(),
            lines,
            grand_total,
        })
    }

    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            "serial_no",
            "name",
            "frequency",
            "quantity",
            "unit_price",
            "monthly_total",
            "delivery_days",
        ])?;

        for line in &self.lines {
            let days = line
                .delivery_days
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            writer.write_record([
                line.serial_no.clone(),
                line.name.clone(),
                line.frequency.label().to_string(),
                line.quantity.to_string(),
                format!("{:.2}", line.unit_price),
                format!("{:.2}", line.monthly_total),
                days,
            ])?;
        }
        let total = format!("{:.2}", self.grand_total);
        writer.write_record(["", "TOTAL", "", "", "", total.as_str(), ""])?;

        let bytes = writer.into_inner().map_err(|e| StoreError::IoError(e.into_error()))?;
        String::from_utf8(bytes)
            .map_err(|e| StoreError::IoError(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}
