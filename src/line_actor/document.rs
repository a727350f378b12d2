use crate::framework::Document;
use crate::line_actor::LineError;
use crate::model::Line;

impl Document for Line {
    type Error = LineError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.quantity == 0 {
            return Err(LineError::InvalidQuantity(self.quantity));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Product;

    #[test]
    fn zero_quantity_is_rejected() {
        let line = Line::new(Product::new("p1", "Chair", 10.0)).with_quantity(0);
        assert_eq!(line.validate(), Err(LineError::InvalidQuantity(0)));
        assert!(line.with_quantity(1).validate().is_ok());
    }
}
