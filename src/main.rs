//! # Cart Sync demo
//!
//! Walks one shopper through the system:
//! 1.  Starting the [`ShopSystem`] (optionally from the TOML file named by `CART_SYNC_CONFIG`).
//! 2.  Seeding the catalog and paging through it.
//! 3.  Filling a cart from two "devices" at once.
//! 4.  Saving an address and checking the cart out to it.
//! 5.  Reading the order back from the history and the ledger.

use cart_sync::cart::QuantityChange;
use cart_sync::lifecycle::tracing::setup_tracing;
use cart_sync::lifecycle::{ShopConfig, ShopSystem};
use cart_sync::model::{Address, AsyncState, Line, Product};
use cart_sync::session::Session;
use tracing::{error, info, Instrument};

const CONFIG_ENV: &str = "CART_SYNC_CONFIG";

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => ShopConfig::load(&path).map_err(|e| e.to_string())?,
        Err(_) => ShopConfig::default(),
    };
    info!(?config, "Starting shop");
    let system = ShopSystem::with_config(config);

    // Seed the catalog
    let catalog = [
        Product::new("chair", "Wooden chair", 120.0)
            .with_category("Chair")
            .with_colors(["oak", "walnut"]),
        Product::new("lamp", "Desk lamp", 45.0)
            .with_category("Lighting")
            .with_discount(0.2),
        Product::new("shirt", "Linen shirt", 30.0)
            .with_category("Clothes")
            .with_sizes(["M", "L"]),
    ];
    for product in catalog.iter().cloned() {
        system
            .product_client
            .create_product(product)
            .await
            .map_err(|e| e.to_string())?;
    }

    let feed = system.product_feed();
    let page = feed.next_page().await.map_err(|e| e.to_string())?;
    info!(?page, "Best products");
    if let AsyncState::Success(lamps) = feed.discounted(None).await {
        info!(count = lamps.len(), "Discounted products");
    }

    let session = Session::signed_in("alice");
    let cart = system.cart(&session).map_err(|e| e.to_string())?;
    let phone = system.cart(&session).map_err(|e| e.to_string())?;

    let span = tracing::info_span!("filling_cart");
    async {
        let chair = system
            .product_client
            .get_product("chair")
            .await
            .map_err(|e| e.to_string())?
            .ok_or("chair missing from the catalog")?;
        let chair = Line::new(chair).with_color("oak");
        let shirt = Line::new(catalog[2].clone()).with_size("L");

        // Both devices add the same chair; the resolver merges them into one line
        let (first, second) = tokio::join!(cart.add(chair.clone()), phone.add(chair));
        first.map_err(|e| e.to_string())?;
        second.map_err(|e| e.to_string())?;
        cart.add(shirt).await.map_err(|e| e.to_string())?;

        let mut stream = cart.cart();
        while let Some(state) = stream.next().await {
            if matches!(&state, AsyncState::Success(lines) if lines.len() == 2) {
                break;
            }
        }
        if let Some(line) = cart.snapshot().and_then(|lines| lines.into_iter().next()) {
            phone
                .change_quantity(&line, QuantityChange::Increase)
                .await
                .map_err(|e| e.to_string())?;
        }
        Ok::<_, String>(())
    }
    .instrument(span)
    .await?;

    // The phone goes offline
    drop(phone);

    let mut price = cart.price_updates();
    let total = price
        .wait_for(|total| total.is_some())
        .await
        .map_err(|e| e.to_string())?
        .unwrap_or_default();
    info!(total, "Cart total");

    // Ship to the first saved address
    let address_book = system.address_book(&session).map_err(|e| e.to_string())?;
    address_book
        .add(Address {
            title: "Home".to_string(),
            full_name: "Alice Example".to_string(),
            street: "1 Main Street".to_string(),
            phone: "555-0100".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
        })
        .await
        .map_err(|e| e.to_string())?;
    let address = address_book
        .addresses()
        .wait_for(|state| state.success().is_some_and(|saved| !saved.is_empty()))
        .await
        .map_err(|e| e.to_string())?
        .success()
        .and_then(|saved| saved.first().cloned())
        .ok_or("no saved address")?;

    let checkout = system.checkout(&cart);
    let span = tracing::info_span!("checkout");
    match checkout.submit_cart(address).instrument(span).await {
        Ok(order) => info!(order_id = %order.order_id(), status = %order.status(), "Order placed"),
        Err(e) => error!(error = %e, "Checkout failed"),
    }

    let history = system.order_history(&session).map_err(|e| e.to_string())?;
    let orders = history.orders_of().await.map_err(|e| e.to_string())?;
    info!(orders = orders.len(), "Order history");
    let ledger = history
        .fetch_ledger()
        .wait_for(|state| !state.is_loading())
        .await
        .map_err(|e| e.to_string())?
        .clone();
    info!(ledger = ledger.success().map_or(0, Vec::len), "Order ledger");

    // Components hold store clients; release them before shutting the stores down
    drop(checkout);
    drop(address_book);
    drop(history);
    drop(feed);
    drop(cart);
    system.shutdown().await?;

    info!("Demo completed successfully");
    Ok(())
}
