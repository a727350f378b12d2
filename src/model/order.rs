use crate::model::{Address, Line};
use chrono::{Local, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Client-generated order number. Not unique by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl OrderId {
    const RANDOM_RANGE: u64 = 100_000_000_000;

    /// A random number below one hundred billion plus the integer part of `total_price`.
    pub fn generate(total_price: f64) -> Self {
        let random = rand::thread_rng().gen_range(0..Self::RANDOM_RANGE);
        // `as` saturates: negative or NaN totals contribute 0
        Self(random.saturating_add(total_price as u64))
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Ordered,
    Confirmed,
    Shipped,
    Delivered,
    Canceled,
    Returned,
}

impl OrderStatus {
    /// The statuses shown as progress steps, in order.
    pub const PROGRESS: [OrderStatus; 4] = [
        OrderStatus::Ordered,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Ordered => "Ordered",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Canceled => "Canceled",
            OrderStatus::Returned => "Returned",
        }
    }

    /// Parses a label. Anything unrecognised reads as `Returned`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Ordered" => OrderStatus::Ordered,
            "Confirmed" => OrderStatus::Confirmed,
            "Shipped" => OrderStatus::Shipped,
            "Delivered" => OrderStatus::Delivered,
            "Canceled" => OrderStatus::Canceled,
            _ => OrderStatus::Returned,
        }
    }

    /// Index into [`OrderStatus::PROGRESS`]. Canceled and Returned display at step 0.
    pub fn progress_step(&self) -> usize {
        Self::PROGRESS
            .iter()
            .position(|status| status == self)
            .unwrap_or(0)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A placed order. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    order_id: OrderId,
    status: OrderStatus,
    total_price: f64,
    lines: Vec<Line>,
    address: Address,
    #[serde(rename = "createdDate", with = "created_date")]
    created: NaiveDate,
}

impl Order {
    /// Freezes `lines` into a new order with status `Ordered`, dated today.
    pub fn place(lines: Vec<Line>, address: Address, total_price: f64) -> Self {
        Self {
            order_id: OrderId::generate(total_price),
            status: OrderStatus::Ordered,
            total_price,
            lines,
            address,
            created: Local::now().date_naive(),
        }
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn total_price(&self) -> f64 {
        self.total_price
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn created(&self) -> NaiveDate {
        self.created
    }
}

mod created_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%d-%m-%Y";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Product;

    #[test]
    fn order_id_stays_below_bound_plus_total() {
        for _ in 0..100 {
            let id = OrderId::generate(250.75);
            assert!(id.0 < OrderId::RANDOM_RANGE + 250);
        }
        assert!(OrderId::generate(-5.0).0 < OrderId::RANDOM_RANGE);
    }

    #[test]
    fn status_labels_and_steps() {
        assert_eq!(OrderStatus::from_label("Shipped"), OrderStatus::Shipped);
        assert_eq!(OrderStatus::from_label("lost in transit"), OrderStatus::Returned);
        assert_eq!(OrderStatus::Delivered.progress_step(), 3);
        assert_eq!(OrderStatus::Canceled.progress_step(), 0);
        assert_eq!(OrderStatus::Confirmed.to_string(), "Confirmed");
    }

    #[test]
    fn created_date_uses_day_month_year() {
        let order = Order::place(
            vec![Line::new(Product::new("p1", "Chair", 10.0))],
            Address::default(),
            10.0,
        );
        let json = serde_json::to_value(&order).unwrap();
        let expected = order.created().format("%d-%m-%Y").to_string();
        assert_eq!(json["createdDate"], expected);
        assert_eq!(json["status"], "Ordered");

        let back: Order = serde_json::from_value(json).unwrap();
        assert_eq!(back, order);
    }
}
