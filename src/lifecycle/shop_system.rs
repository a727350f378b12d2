use crate::cart::{CartError, CartManager};
use crate::catalog::ProductFeed;
use crate::checkout::{AddressBook, Checkout, CheckoutError, OrderHistory};
use crate::clients::{AddressClient, LineClient, OrderClient, ProductClient};
use crate::lifecycle::ShopConfig;
use crate::session::Session;
use tracing::{error, info};

/// Runtime orchestrator: owns the cart-line, order, product and address stores.
///
/// # Example
///
/// ```ignore
/// let system = ShopSystem::new();
/// let cart = system.cart(&Session::signed_in("alice"))?;
/// cart.add_or_increment(Line::new(product));
///
/// drop(cart);
/// system.shutdown().await?;
/// ```
pub struct ShopSystem {
    /// Client for the cart-line store
    pub line_client: LineClient,

    /// Client for the order store
    pub order_client: OrderClient,

    /// Client for the product store
    pub product_client: ProductClient,

    /// Client for the address store
    pub address_client: AddressClient,

    config: ShopConfig,

    /// Task handles for all running stores (used for graceful shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl Default for ShopSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl ShopSystem {
    /// Starts all stores with the default configuration. Must be called inside a Tokio
    /// runtime.
    pub fn new() -> Self {
        Self::with_config(ShopConfig::default())
    }

    pub fn with_config(config: ShopConfig) -> Self {
        let (line_actor, line_client) = crate::line_actor::new(config.channel_capacity);
        let (order_actor, order_client) = crate::order_actor::new(config.channel_capacity);
        let (product_actor, product_client) = crate::product_actor::new(config.channel_capacity);
        let (address_actor, address_client) = crate::address_actor::new(config.channel_capacity);

        let handles = vec![
            tokio::spawn(line_actor.run()),
            tokio::spawn(order_actor.run()),
            tokio::spawn(product_actor.run()),
            tokio::spawn(address_actor.run()),
        ];
        info!(?config, "Shop system started");

        Self {
            line_client,
            order_client,
            product_client,
            address_client,
            config,
            handles,
        }
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    /// The session owner's live cart.
    pub fn cart(&self, session: &Session) -> Result<CartManager, CartError> {
        CartManager::new(self.line_client.clone(), session, &self.config)
    }

    /// Checkout bound to `cart` and its owner.
    pub fn checkout(&self, cart: &CartManager) -> Checkout {
        Checkout::new(cart.clone(), self.order_client.clone(), self.line_client.clone())
    }

    /// The session owner's saved addresses.
    pub fn address_book(&self, session: &Session) -> Result<AddressBook, CheckoutError> {
        AddressBook::new(self.address_client.clone(), session)
    }

    pub fn order_history(&self, session: &Session) -> Result<OrderHistory, CheckoutError> {
        OrderHistory::new(self.order_client.clone(), session)
    }

    pub fn product_feed(&self) -> ProductFeed {
        ProductFeed::new(self.product_client.clone(), self.config.page_size)
    }

    /// Gracefully shuts down every store.
    ///
    /// Components built from this system hold clients of their own; drop them first or this
    /// waits until they are gone.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down shop system...");

        // Dropping the last senders makes each store's receiver return None
        drop(self.line_client);
        drop(self.order_client);
        drop(self.product_client);
        drop(self.address_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Store task failed: {:?}", e);
                return Err(format!("Store task failed: {:?}", e));
            }
        }

        info!("Shop system shutdown complete.");
        Ok(())
    }
}
