use crate::core::{DeliverySlot, Frequency};
use crate::utils::error::StoreError;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::str::FromStr;

#[derive(Debug, Clone, Parser)]
#[command(name = "grocery-orders")]
#[command(about = "Subscription grocery cart, billing projections and order management")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override storage.data_dir from config
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Reference date (YYYY-MM-DD), defaults to today
    #[arg(long, global = true)]
    pub date: Option<NaiveDate>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Project delivery dates and monthly total for one line item
    Project {
        #[arg(long)]
        price: f64,
        #[arg(long, default_value = "1")]
        quantity: f64,
        #[arg(long, default_value = "oneTime")]
        frequency: Frequency,
    },
    /// Monthly total and delivery calendar for a set of items
    CartTotal {
        /// name:price:quantity:frequency, repeatable
        #[arg(long = "item", required = true)]
        items: Vec<ItemSpec>,
    },
    /// Place an order from the given items
    Place {
        /// name:price:quantity:frequency, repeatable
        #[arg(long = "item", required = true)]
        items: Vec<ItemSpec>,
        /// morning, afternoon or evening
        #[arg(long)]
        slot: DeliverySlot,
        #[arg(long)]
        vendor: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// List stored orders
    List,
    /// Cancel a whole order
    Cancel { order_id: String },
    /// Cancel selected products of an order by serial number
    CancelItems {
        order_id: String,
        #[arg(required = true)]
        serials: Vec<String>,
    },
    /// Pay an order now with a UPI id
    Pay {
        order_id: String,
        #[arg(long)]
        upi: String,
    },
    /// Defer payment until the end of the month
    PayLater { order_id: String },
    /// Vendor action: move the order to its next status
    Advance { order_id: String },
    /// Report an issue with a delivered product
    ReportIssue {
        order_id: String,
        serial: String,
        #[arg(long)]
        reason: String,
    },
    /// Print the monthly invoice of an order
    Invoice {
        order_id: String,
        /// Write the invoice as CSV to this path
        #[arg(long)]
        csv: Option<String>,
    },
}

/// 命令列品項格式 `name:price:quantity:frequency`
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSpec {
    pub name: String,
    pub unit_price: f64,
    pub quantity: f64,
    pub frequency: Frequency,
}

impl FromStr for ItemSpec {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        let [name, price, quantity, frequency] = parts.as_slice() else {
            return Err(StoreError::invalid_argument(
                "item",
                s,
                "Expected name:price:quantity:frequency",
            ));
        };

        let unit_price = price
            .parse::<f64>()
            .map_err(|e| StoreError::invalid_argument("unit_price", price, e.to_string()))?;
        let quantity = quantity
            .parse::<f64>()
            .map_err(|e| StoreError::invalid_argument("quantity", quantity, e.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            unit_price,
            quantity,
            frequency: frequency.parse()?,
        })
    }
}
