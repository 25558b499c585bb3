use chrono::{DateTime, Local, NaiveDate};
use clap::Parser;
use grocery_orders::config::{Command, ItemSpec};
use grocery_orders::core::{ConfigProvider, LineItem, Order, OrderStatus};
use grocery_orders::core::orders::{days_until_deadline, payment_deadline};
use grocery_orders::utils::{logger, validation::Validate};
use grocery_orders::{
    Cart, CliConfig, JsonOrderRepository, LocalStorage, MonthlyInvoice, OrderBook,
    RecurrenceBillingEngine, Result, StoreConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        std::process::exit(e.severity().exit_code());
    }

    Ok(())
}

async fn run(cli: CliConfig) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            StoreConfig::from_file(path)?
        }
        None => StoreConfig::default(),
    };
    if let Some(data_dir) = &cli.data_dir {
        config.storage.data_dir = data_dir.clone();
    }
    config.validate()?;

    let now = reference_now(cli.date);
    let today = now.date_naive();
    let engine = RecurrenceBillingEngine::with_weekly_policy(config.weekly_policy());
    let currency = config.currency_symbol().to_string();

    match cli.command {
        Command::Project {
            price,
            quantity,
            frequency,
        } => {
            let item = LineItem::new(price, quantity, frequency, today)?;
            let projection = engine.project_deliveries(&item, today)?;
            println!("{}", engine.delivery_summary(frequency, today));
            println!("Delivery days: {}", format_days(&projection.dates));
            println!("Monthly total: {}{:.2}", currency, projection.monthly_total);
        }
        Command::CartTotal { items } => {
            let cart = build_cart(&items, now)?;
            let line_items = cart.line_items(today)?;
            for (cart_item, line) in cart.items().iter().zip(&line_items) {
                let projection = engine.project_deliveries(line, today)?;
                println!(
                    "{:<16} {:<9} {}{:.2}  days: {}",
                    cart_item.product,
                    cart_item.frequency.label(),
                    currency,
                    projection.monthly_total,
                    format_days(&projection.dates)
                );
            }
            for (day, indexes) in engine.delivery_calendar(&line_items, today)? {
                let names: Vec<&str> = indexes
                    .iter()
                    .map(|i| cart.items()[*i].product.as_str())
                    .collect();
                println!("  {} {}: {}", today.format("%b"), day, names.join(", "));
            }
            println!(
                "Total (Monthly): {}{:.2}",
                currency,
                cart.monthly_total(&engine, today)?
            );
        }
        Command::Place {
            items,
            slot,
            vendor,
            location,
        } => {
            let mut cart = build_cart(&items, now)?;
            let mut book = open_book(&config, engine).await?;
            let vendor = vendor.unwrap_or_else(|| config.vendor().to_string());
            let location = location.or_else(|| config.location().map(str::to_string));
            let order = book
                .place_order(&mut cart, slot, &vendor, location.as_deref(), now)
                .await?;
            println!("✅ Order {} placed ({})", order.id, order.delivery_slot);
            println!(
                "Monthly total: {}{:.2}",
                currency,
                book.monthly_total(&order.id, today)?
            );
        }
        Command::List => {
            let book = open_book(&config, engine).await?;
            if book.orders().is_empty() {
                println!("No orders yet");
            }
            for order in book.orders() {
                print_order(&book, order, today, &currency)?;
            }
        }
        Command::Cancel { order_id } => {
            let mut book = open_book(&config, engine).await?;
            let order = book.cancel_order(&order_id).await?;
            println!("Order {} is now {}", order.id, order.status);
        }
        Command::CancelItems { order_id, serials } => {
            let mut book = open_book(&config, engine).await?;
            let order = book.cancel_items(&order_id, &serials).await?;
            println!(
                "Order {} is {} with {} product(s) remaining",
                order.id,
                order.status,
                order.products.len()
            );
        }
        Command::Pay { order_id, upi } => {
            let mut book = open_book(&config, engine).await?;
            let order = book.pay_now(&order_id, &upi).await?;
            println!("🎉 Payment received for order {}", order.id);
        }
        Command::PayLater { order_id } => {
            let mut book = open_book(&config, engine).await?;
            let order = book.pay_later(&order_id).await?;
            println!(
                "Order {} will be paid by {} ({} days remaining)",
                order.id,
                payment_deadline(today),
                days_until_deadline(today)
            );
        }
        Command::Advance { order_id } => {
            let mut book = open_book(&config, engine).await?;
            let order = book.advance_status(&order_id).await?;
            println!("Order {} is now {}", order.id, order.status);
        }
        Command::ReportIssue {
            order_id,
            serial,
            reason,
        } => {
            let mut book = open_book(&config, engine).await?;
            book.report_issue(&order_id, &serial, &reason).await?;
            println!("Return initiated for serial #{} of order {}", serial, order_id);
        }
        Command::Invoice { order_id, csv } => {
            let book = open_book(&config, engine).await?;
            let invoice = MonthlyInvoice::build(book.engine(), book.get(&order_id)?, today)?;
            for line in &invoice.lines {
                println!(
                    "#{} {:<16} {:<9} {} x {}{:.2} = {}{:.2}  days: {}",
                    line.serial_no,
                    line.name,
                    line.frequency.label(),
                    line.quantity,
                    currency,
                    line.unit_price,
                    currency,
                    line.monthly_total,
                    format_days(&line.delivery_days)
                );
            }
            println!("Grand total ({}): {}{:.2}", invoice.month, currency, invoice.grand_total);

            if let Some(path) = csv {
                tokio::fs::write(&path, invoice.to_csv()?).await?;
                println!("📁 Invoice saved to: {}", path);
            }
        }
    }

    Ok(())
}

async fn open_book(
    config: &StoreConfig,
    engine: RecurrenceBillingEngine,
) -> Result<OrderBook<JsonOrderRepository<LocalStorage>>> {
    let storage = LocalStorage::new(config.data_dir());
    let repository = JsonOrderRepository::new(storage, config.orders_key());
    OrderBook::load(repository, engine).await
}

fn build_cart(items: &[ItemSpec], now: DateTime<Local>) -> Result<Cart> {
    let mut cart = Cart::new();
    for item in items {
        cart.add_or_update(&item.name, item.unit_price, item.frequency, item.quantity, now)?;
    }
    Ok(cart)
}

/// `--date` 覆蓋日期時保留目前的時間
fn reference_now(date: Option<NaiveDate>) -> DateTime<Local> {
    let now = Local::now();
    date.and_then(|d| d.and_time(now.time()).and_local_timezone(Local).earliest())
        .unwrap_or(now)
}

fn format_days(days: &[u32]) -> String {
    if days.is_empty() {
        return "none this month".to_string();
    }
    days.iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_order(
    book: &OrderBook<JsonOrderRepository<LocalStorage>>,
    order: &Order,
    today: NaiveDate,
    currency: &str,
) -> Result<()> {
    println!(
        "{}  {}  {}  payment: {:?}  slot: {}",
        order.id,
        order.order_date.format("%a, %d %b %Y"),
        order.status,
        order.payment_status,
        order.delivery_slot
    );
    for product in &order.products {
        let issue = if product.has_issue { "  [issue reported]" } else { "" };
        println!(
            "    #{} {} {} ({}){}",
            product.serial_no,
            product.name,
            product.quantity,
            product.frequency.label(),
            issue
        );
    }
    if order.status != OrderStatus::Cancelled {
        println!(
            "    Monthly total: {}{:.2}",
            currency,
            book.monthly_total(&order.id, today)?
        );
    }
    Ok(())
}
