use serde::{Deserialize, Serialize};

/// A catalog entry.
///
/// `discount` is a fraction in `[0, 1]`; `None` means full price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub price: f64,
    #[serde(default, rename = "offerPercentage")]
    pub discount: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            price,
            discount: None,
            description: None,
            colors: Vec::new(),
            sizes: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = Some(discount);
        self
    }

    pub fn with_colors<S: Into<String>>(mut self, colors: impl IntoIterator<Item = S>) -> Self {
        self.colors = colors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sizes<S: Into<String>>(mut self, sizes: impl IntoIterator<Item = S>) -> Self {
        self.sizes = sizes.into_iter().map(Into::into).collect();
        self
    }

    /// Unit price after the discount, `price * (1 - discount)`.
    pub fn effective_price(&self) -> f64 {
        match self.discount {
            Some(discount) => self.price * (1.0 - discount),
            None => self.price,
        }
    }

    pub fn is_discounted(&self) -> bool {
        self.discount.is_some_and(|discount| discount > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_price_applies_discount() {
        let product = Product::new("p1", "Chair", 100.0).with_discount(0.1);
        assert_eq!(product.effective_price(), 90.0);
        assert_eq!(Product::new("p2", "Table", 40.0).effective_price(), 40.0);
    }

    #[test]
    fn deserializes_store_field_names() {
        let json = r#"{"id":"p1","name":"Chair","category":"Chair","price":10.0,"offerPercentage":0.5,"colors":["red"]}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.discount, Some(0.5));
        assert_eq!(product.colors, vec!["red".to_string()]);
        assert!(product.sizes.is_empty());
    }
}
