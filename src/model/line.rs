use crate::framework::DocumentId;
use crate::model::Product;
use crate::session::OwnerId;
use serde::{Deserialize, Serialize};

/// One entry of a shopping cart: a product, how many of it, and the chosen options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub product: Product,
    pub quantity: u32,
    #[serde(default)]
    pub selected_color: Option<String>,
    #[serde(default)]
    pub selected_size: Option<String>,
}

impl Line {
    /// A single unit of `product` with no options chosen.
    pub fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
            selected_color: None,
            selected_size: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.selected_color = Some(color.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.selected_size = Some(size.into());
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// True when both lines denote the same product with the same options, whatever
    /// their quantities.
    pub fn same_options(&self, other: &Line) -> bool {
        self.product.id == other.product.id
            && self.selected_color == other.selected_color
            && self.selected_size == other.selected_size
    }

    /// `quantity * effective unit price`.
    pub fn subtotal(&self) -> f64 {
        f64::from(self.quantity) * self.product.effective_price()
    }
}

/// A line as stored in an owner's cart collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteLine {
    pub id: DocumentId,
    pub owner: OwnerId,
    pub line: Line,
}

/// Ordered view of a cart, as pushed by the live subscription.
pub type Snapshot = Vec<RemoteLine>;
