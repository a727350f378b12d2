//! Pure data structures shared by the stores, the cart and the checkout.

pub mod address;
pub mod line;
pub mod order;
pub mod product;
pub mod state;

pub use address::*;
pub use line::*;
pub use order::*;
pub use product::*;
pub use state::*;
