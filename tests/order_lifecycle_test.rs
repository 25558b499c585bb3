use anyhow::Result;
use chrono::{Local, NaiveDate, TimeZone};
use grocery_orders::core::{DeliverySlot, Frequency, OrderStatus, PaymentStatus};
use grocery_orders::{
    Cart, JsonOrderRepository, LocalStorage, MonthlyInvoice, OrderBook, RecurrenceBillingEngine,
};
use tempfile::TempDir;

async fn open(dir: &TempDir) -> Result<OrderBook<JsonOrderRepository<LocalStorage>>> {
    let storage = LocalStorage::new(dir.path());
    let repository = JsonOrderRepository::new(storage, "groceryOrders.json");
    Ok(OrderBook::load(repository, RecurrenceBillingEngine::new()).await?)
}

#[tokio::test]
async fn test_orders_survive_reload_from_disk() -> Result<()> {
    let dir = TempDir::new()?;
    let now = Local.with_ymd_and_hms(2024, 1, 28, 8, 15, 0).unwrap();
    let today = now.date_naive();

    let order_id = {
        let mut book = open(&dir).await?;
        let mut cart = Cart::new();
        cart.add_or_update("milk", 20.0, Frequency::Daily, 2.0, now)?;
        cart.add_or_update("paneer", 18.0, Frequency::Weekly, 1.0, now)?;
        cart.add_or_update("basmati rice", 120.0, Frequency::OneTime, 1.0, now)?;

        let order = book
            .place_order(&mut cart, DeliverySlot::Afternoon, "Fresh Mart", Some("Pune"), now)
            .await?;
        assert!(dir.path().join("groceryOrders.json").exists());
        order.id
    };

    let mut book = open(&dir).await?;
    let order = book.get(&order_id)?.clone();
    assert_eq!(order.products.len(), 3);
    assert_eq!(order.location.as_deref(), Some("Pune"));
    assert_eq!(book.monthly_total(&order_id, today)?, 1240.0 + 72.0 + 120.0);

    // 部分取消後重新載入，移除的品項不再計費
    let rice = order
        .products
        .iter()
        .find(|p| p.name == "basmati rice")
        .map(|p| p.serial_no.clone())
        .unwrap();
    book.cancel_items(&order_id, &[rice]).await?;

    let book = open(&dir).await?;
    assert_eq!(book.get(&order_id)?.products.len(), 2);
    assert_eq!(book.monthly_total(&order_id, today)?, 1240.0 + 72.0);
    Ok(())
}

#[tokio::test]
async fn test_full_lifecycle_pay_deliver_and_return() -> Result<()> {
    let dir = TempDir::new()?;
    let now = Local.with_ymd_and_hms(2024, 5, 2, 18, 0, 0).unwrap();
    let mut book = open(&dir).await?;

    let mut cart = Cart::new();
    let serial = cart.add_or_update("tomatoes", 40.0, Frequency::Weekly, 1.5, now)?;
    let order = book
        .place_order(&mut cart, DeliverySlot::Evening, "Fresh Mart", None, now)
        .await?;

    book.pay_now(&order.id, "priya@okhdfcbank").await?;
    book.advance_status(&order.id).await?;

    let reloaded = open(&dir).await?;
    let stored = reloaded.get(&order.id)?;
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
    assert_eq!(stored.status, OrderStatus::Delivered);

    let mut book = reloaded;
    book.report_issue(&order.id, &serial, "Some tomatoes were bruised")
        .await?;

    let book = open(&dir).await?;
    let product = book.get(&order.id)?.product(&serial).unwrap();
    assert!(product.has_issue);
    assert_eq!(product.issue_reason.as_deref(), Some("Some tomatoes were bruised"));
    assert_eq!(book.get(&order.id)?.status, OrderStatus::Delivered);
    Ok(())
}

#[tokio::test]
async fn test_invoice_of_stored_order_writes_csv() -> Result<()> {
    let dir = TempDir::new()?;
    let now = Local.with_ymd_and_hms(2024, 3, 28, 7, 0, 0).unwrap();
    let mut book = open(&dir).await?;

    let mut cart = Cart::new();
    cart.add_or_update("milk", 20.0, Frequency::Daily, 2.0, now)?;
    let order = book
        .place_order(&mut cart, DeliverySlot::Morning, "Fresh Mart", None, now)
        .await?;

    let reference = NaiveDate::from_ymd_opt(2024, 3, 28).unwrap();
    let invoice = MonthlyInvoice::build(book.engine(), book.get(&order.id)?, reference)?;
    assert_eq!(invoice.grand_total, 1240.0);

    let csv_path = dir.path().join("invoice.csv");
    std::fs::write(&csv_path, invoice.to_csv()?)?;
    let content = std::fs::read_to_string(&csv_path)?;
    assert!(content.contains("milk,Daily,2,20.00,1240.00,29 30 31"));
    Ok(())
}

#[tokio::test]
async fn test_corrupted_snapshot_is_reported() -> Result<()> {
    let dir = TempDir::new()?;
    std::fs::write(dir.path().join("groceryOrders.json"), "[{\"id\": 1}")?;

    let err = open(&dir).await.err().expect("load should fail");
    let store_err = err.downcast_ref::<grocery_orders::StoreError>().unwrap();
    assert!(matches!(store_err, grocery_orders::StoreError::SerializationError(_)));
    Ok(())
}
