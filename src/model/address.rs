use serde::{Deserialize, Serialize};

/// Shipping address attached to an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub title: String,
    pub full_name: String,
    pub street: String,
    pub phone: String,
    pub city: String,
    pub state: String,
}

impl Address {
    /// Every field must contain something other than whitespace.
    pub fn is_complete(&self) -> bool {
        [
            &self.title,
            &self.full_name,
            &self.street,
            &self.phone,
            &self.city,
            &self.state,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_field_makes_address_incomplete() {
        let mut address = Address {
            title: "Home".into(),
            full_name: "Ada Lovelace".into(),
            street: "1 Analytical Way".into(),
            phone: "555-0100".into(),
            city: "London".into(),
            state: "LDN".into(),
        };
        assert!(address.is_complete());
        address.city = "   ".into();
        assert!(!address.is_complete());
    }
}
