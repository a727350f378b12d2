use crate::framework::Document;
use crate::model::Product;
use crate::product_actor::ProductError;

impl Document for Product {
    type Error = ProductError;

    fn validate(&self) -> Result<(), Self::Error> {
        if !(self.price >= 0.0) {
            return Err(ProductError::InvalidPrice(self.price));
        }
        match self.discount {
            Some(discount) if !(0.0..=1.0).contains(&discount) => {
                Err(ProductError::InvalidDiscount(discount))
            }
            _ => Ok(()),
        }
    }
}
