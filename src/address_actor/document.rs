use crate::address_actor::AddressError;
use crate::framework::Document;
use crate::model::Address;

impl Document for Address {
    type Error = AddressError;

    fn validate(&self) -> Result<(), Self::Error> {
        if !self.is_complete() {
            return Err(AddressError::Incomplete);
        }
        Ok(())
    }
}
