use crate::domain::model::{DeliveryProjection, Frequency, LineItem};
use crate::utils::error::Result;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 每週配送固定以 4 次計費
pub const WEEKLY_BILLED_DELIVERIES: u32 = 4;

/// 每週方案的月費計算方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeeklyPolicy {
    /// 單價 × 數量 × 4，與當月實際落在月內的次數無關
    #[default]
    Flat,
    /// 依當月實際配送次數計費
    PerDelivery,
}

/// 當月天數 (含閏年)
pub fn days_in_month(date: NaiveDate) -> u32 {
    match date.month() {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if NaiveDate::from_ymd_opt(date.year(), 2, 29).is_some() {
                29
            } else {
                28
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecurrenceBillingEngine {
    weekly_policy: WeeklyPolicy,
}

impl RecurrenceBillingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weekly_policy(weekly_policy: WeeklyPolicy) -> Self {
        Self { weekly_policy }
    }

    pub fn weekly_policy(&self) -> WeeklyPolicy {
        self.weekly_policy
    }

    /// 計算品項在 `reference_date` 所在月份的配送日與月費。
    ///
    /// 最早配送日為隔天，所以月底下單的一次性/每月品項會得到空的日期清單，
    /// 但月費仍照價格計算。
    pub fn project_deliveries(
        &self,
        item: &LineItem,
        reference_date: NaiveDate,
    ) -> Result<DeliveryProjection> {
        item.check()?;

        let days = days_in_month(reference_date);
        let first = reference_date.day() + 1;
        let base = item.unit_price * item.quantity;

        let (dates, monthly_total) = match item.frequency {
            Frequency::OneTime | Frequency::Monthly => {
                let dates = if first <= days { vec![first] } else { Vec::new() };
                (dates, base)
            }
            Frequency::Daily => ((first..=days).collect(), base * days as f64),
            Frequency::Weekly => {
                let dates: Vec<u32> = (0..WEEKLY_BILLED_DELIVERIES)
                    .map(|k| first + 7 * k)
                    .filter(|day| *day <= days)
                    .collect();
                let billed = match self.weekly_policy {
                    WeeklyPolicy::Flat => WEEKLY_BILLED_DELIVERIES as f64,
                    WeeklyPolicy::PerDelivery => dates.len() as f64,
                };
                (dates, base * billed)
            }
        };

        tracing::debug!(
            frequency = %item.frequency,
            reference = %reference_date,
            deliveries = dates.len(),
            monthly_total,
            "Projected deliveries"
        );

        Ok(DeliveryProjection {
            dates,
            monthly_total,
        })
    }

    /// 以品項自身的 anchor_date 作為參考日
    pub fn project(&self, item: &LineItem) -> Result<DeliveryProjection> {
        self.project_deliveries(item, item.anchor_date)
    }

    pub fn sum_monthly_total(&self, items: &[LineItem], reference_date: NaiveDate) -> Result<f64> {
        items.iter().try_fold(0.0, |sum, item| {
            Ok(sum + self.project_deliveries(item, reference_date)?.monthly_total)
        })
    }

    /// 配送日 -> 當天要送的品項索引
    pub fn delivery_calendar(
        &self,
        items: &[LineItem],
        reference_date: NaiveDate,
    ) -> Result<BTreeMap<u32, Vec<usize>>> {
        let mut calendar: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (index, item) in items.iter().enumerate() {
            for day in self.project_deliveries(item, reference_date)?.dates {
                calendar.entry(day).or_default().push(index);
            }
        }
        Ok(calendar)
    }

    pub fn delivery_summary(&self, frequency: Frequency, reference_date: NaiveDate) -> String {
        match frequency {
            Frequency::OneTime => "Delivered once on your selected date".to_string(),
            Frequency::Daily => format!(
                "Delivered daily ({} times this month)",
                days_in_month(reference_date)
            ),
            Frequency::Weekly => format!(
                "Delivered weekly ({} times this month)",
                WEEKLY_BILLED_DELIVERIES
            ),
            Frequency::Monthly => "Delivered once per month".to_string(),
        }
    }
}
