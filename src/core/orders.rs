use crate::core::billing::{days_in_month, RecurrenceBillingEngine};
use crate::core::cart::Cart;
use crate::domain::model::{
    DeliverySlot, Order, OrderProduct, OrderStatus, PaymentChoice, PaymentStatus,
};
use crate::domain::ports::OrderRepository;
use crate::utils::error::{Result, StoreError};
use crate::utils::validation::{validate_non_empty_string, validate_upi_id};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};

/// 訂單簿：載入時從 repository 取得歷史訂單，每次異動後整份存回
pub struct OrderBook<R: OrderRepository> {
    repository: R,
    engine: RecurrenceBillingEngine,
    orders: Vec<Order>,
}

impl<R: OrderRepository> OrderBook<R> {
    pub async fn load(repository: R, engine: RecurrenceBillingEngine) -> Result<Self> {
        let orders = repository.load().await?;
        tracing::debug!("Loaded {} orders", orders.len());
        Ok(Self {
            repository,
            engine,
            orders,
        })
    }

    pub fn engine(&self) -> &RecurrenceBillingEngine {
        &self.engine
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn get(&self, id: &str) -> Result<&Order> {
        self.orders
            .iter()
            .find(|o| o.id == id)
            .ok_or_else(|| StoreError::not_found("order", id))
    }

    /// 將購物車轉為訂單，存檔成功後才清空購物車
    pub async fn place_order(
        &mut self,
        cart: &mut Cart,
        delivery_slot: DeliverySlot,
        vendor: &str,
        location: Option<&str>,
        now: DateTime<Local>,
    ) -> Result<Order> {
        if cart.is_empty() {
            tracing::warn!("Rejected order placement with an empty cart");
            return Err(StoreError::EmptyCart);
        }
        // 先確認所有品項都能計費
        cart.line_items(now.date_naive())?;

        let order = Order {
            id: self.next_order_id(now),
            vendor: vendor.to_string(),
            products: cart.items().iter().cloned().map(OrderProduct::from).collect(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_choice: None,
            order_date: now,
            delivery_slot,
            scheduled_delivery: now + Duration::days(1),
            location: location.map(str::to_string),
            upi_id: None,
        };

        self.orders.push(order.clone());
        if let Err(e) = self.persist().await {
            self.orders.pop();
            tracing::warn!(order_id = %order.id, "Order not saved, cart kept: {}", e);
            return Err(e);
        }
        cart.take_items();

        tracing::info!(
            order_id = %order.id,
            items = order.products.len(),
            slot = %order.delivery_slot,
            "Order placed"
        );
        Ok(order)
    }

    pub async fn cancel_order(&mut self, id: &str) -> Result<&Order> {
        let index = self.index_of(id)?;
        let mut order = self.orders[index].clone();
        ensure_open(&order, "cancel")?;
        order.status = OrderStatus::Cancelled;

        self.commit(index, order).await?;
        tracing::info!(order_id = id, "Order cancelled");
        Ok(&self.orders[index])
    }

    /// 部分取消：移除指定序號的品項，全部移除時整筆訂單變為已取消
    pub async fn cancel_items(&mut self, id: &str, serials: &[String]) -> Result<&Order> {
        if serials.is_empty() {
            return Err(StoreError::invalid_argument(
                "serials",
                "",
                "Select at least one product to cancel",
            ));
        }

        let index = self.index_of(id)?;
        let mut order = self.orders[index].clone();
        ensure_open(&order, "cancel items of")?;

        if let Some(missing) = serials.iter().find(|s| order.product(s).is_none()) {
            return Err(StoreError::not_found("order product", missing.clone()));
        }

        order.products.retain(|p| !serials.contains(&p.serial_no));
        if order.products.is_empty() {
            order.status = OrderStatus::Cancelled;
        }
        self.commit(index, order).await?;

        let order = &self.orders[index];
        tracing::info!(
            order_id = id,
            removed = serials.len(),
            remaining = order.products.len(),
            status = %order.status,
            "Products cancelled"
        );
        Ok(order)
    }

    /// 模擬 UPI 立即付款
    pub async fn pay_now(&mut self, id: &str, upi_id: &str) -> Result<&Order> {
        validate_upi_id(upi_id)?;

        let index = self.index_of(id)?;
        let mut order = self.orders[index].clone();
        ensure_payable(&order, "pay")?;
        order.payment_status = PaymentStatus::Paid;
        order.payment_choice = Some(PaymentChoice::Now);
        order.upi_id = Some(upi_id.trim().to_string());
        order.status = OrderStatus::Processing;

        self.commit(index, order).await?;
        tracing::info!(order_id = id, "Payment received");
        Ok(&self.orders[index])
    }

    /// 選擇月底前付款，付款狀態維持 Pending
    pub async fn pay_later(&mut self, id: &str) -> Result<&Order> {
        let index = self.index_of(id)?;
        let mut order = self.orders[index].clone();
        ensure_payable(&order, "defer payment for")?;
        order.payment_choice = Some(PaymentChoice::Later);
        order.status = OrderStatus::Processing;

        self.commit(index, order).await?;
        tracing::info!(order_id = id, "Payment deferred to month end");
        Ok(&self.orders[index])
    }

    /// 商家端推進狀態：Pending -> Processing -> Delivered
    pub async fn advance_status(&mut self, id: &str) -> Result<&Order> {
        let index = self.index_of(id)?;
        let mut order = self.orders[index].clone();
        order.status = match order.status {
            OrderStatus::Pending => OrderStatus::Processing,
            OrderStatus::Processing => OrderStatus::Delivered,
            other => return Err(transition_error(&order, other, "advance")),
        };

        self.commit(index, order).await?;
        let order = &self.orders[index];
        tracing::info!(order_id = id, status = %order.status, "Order status advanced");
        Ok(order)
    }

    /// 已送達訂單的單品退貨/問題回報，不影響訂單狀態
    pub async fn report_issue(&mut self, id: &str, serial_no: &str, reason: &str) -> Result<&Order> {
        validate_non_empty_string("reason", reason)?;

        let index = self.index_of(id)?;
        let mut order = self.orders[index].clone();
        if order.status != OrderStatus::Delivered {
            return Err(transition_error(&order, order.status, "report an issue on"));
        }
        let product = order
            .products
            .iter_mut()
            .find(|p| p.serial_no == serial_no)
            .ok_or_else(|| StoreError::not_found("order product", serial_no))?;
        if product.has_issue {
            return Err(StoreError::InvalidTransition {
                id: id.to_string(),
                from: format!("already reported for {}", serial_no),
                action: "report an issue on".to_string(),
            });
        }
        product.has_issue = true;
        product.issue_reason = Some(reason.trim().to_string());

        self.commit(index, order).await?;
        tracing::info!(order_id = id, serial_no, "Return initiated");
        Ok(&self.orders[index])
    }

    /// 訂單剩餘品項的月費；已取消的訂單為 0
    pub fn monthly_total(&self, id: &str, reference_date: NaiveDate) -> Result<f64> {
        let order = self.get(id)?;
        if order.status == OrderStatus::Cancelled {
            return Ok(0.0);
        }
        self.engine
            .sum_monthly_total(&order.line_items(reference_date)?, reference_date)
    }

    async fn persist(&self) -> Result<()> {
        self.repository.save(&self.orders).await
    }

    /// 換入更新後的訂單並存檔；存檔失敗時還原成原本的訂單
    async fn commit(&mut self, index: usize, updated: Order) -> Result<()> {
        let previous = std::mem::replace(&mut self.orders[index], updated);
        if let Err(e) = self.persist().await {
            tracing::warn!(order_id = %previous.id, "Order change not saved, rolled back: {}", e);
            self.orders[index] = previous;
            return Err(e);
        }
        Ok(())
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.orders
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| StoreError::not_found("order", id))
    }

    fn next_order_id(&self, now: DateTime<Local>) -> String {
        let base = format!("ORD{}", now.timestamp_millis());
        let mut candidate = base.clone();
        let mut n = 1;
        while self.orders.iter().any(|o| o.id == candidate) {
            candidate = format!("{}-{}", base, n);
            n += 1;
        }
        candidate
    }
}

/// 延後付款的期限為當月最後一天
pub fn payment_deadline(reference_date: NaiveDate) -> NaiveDate {
    reference_date
        .with_day(days_in_month(reference_date))
        .unwrap_or(reference_date)
}

pub fn days_until_deadline(reference_date: NaiveDate) -> i64 {
    (payment_deadline(reference_date) - reference_date)
        .num_days()
        .max(0)
}

fn ensure_open(order: &Order, action: &str) -> Result<()> {
    if order.status.is_open() {
        Ok(())
    } else {
        Err(transition_error(order, order.status, action))
    }
}

fn ensure_payable(order: &Order, action: &str) -> Result<()> {
    ensure_open(order, action)?;
    if order.payment_status == PaymentStatus::Paid {
        return Err(StoreError::InvalidTransition {
            id: order.id.clone(),
            from: "already paid".to_string(),
            action: action.to_string(),
        });
    }
    Ok(())
}

fn transition_error(order: &Order, from: OrderStatus, action: &str) -> StoreError {
    tracing::warn!(order_id = %order.id, status = %from, action, "Rejected order action");
    StoreError::InvalidTransition {
        id: order.id.clone(),
        from: from.to_string(),
        action: action.to_string(),
    }
}
