use crate::framework::Document;
use crate::model::Order;
use crate::order_actor::OrderError;

impl Document for Order {
    type Error = OrderError;

    fn validate(&self) -> Result<(), Self::Error> {
        if !self.total_price().is_finite() || self.total_price() < 0.0 {
            return Err(OrderError::ValidationError(format!(
                "total price {} is not a valid amount",
                self.total_price()
            )));
        }
        Ok(())
    }
}
