use cart_sync::cart::{
    CartManager, MutationOutcome, QuantityChange, RemoteCollectionSync, UpsertOutcome,
};
use cart_sync::catalog::PageOutcome;
use cart_sync::framework::CollectionClient;
use cart_sync::lifecycle::ShopSystem;
use cart_sync::model::{Address, AsyncState, Line, Product, Snapshot};
use cart_sync::session::Session;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

/// Waits until the cart publishes a snapshot accepted by `done`.
async fn wait_for_snapshot(cart: &CartManager, done: impl Fn(&Snapshot) -> bool) -> Snapshot {
    let mut stream = cart.cart();
    tokio::time::timeout(WAIT, async {
        loop {
            match stream.next().await {
                Some(AsyncState::Success(snapshot)) if done(&snapshot) => return snapshot,
                Some(_) => continue,
                None => panic!("cart stream ended"),
            }
        }
    })
    .await
    .expect("cart never reached the expected snapshot")
}

fn chair() -> Product {
    Product::new("chair", "Wooden chair", 120.0).with_colors(["oak", "walnut"])
}

fn address() -> Address {
    Address {
        title: "Home".to_string(),
        full_name: "Alice Example".to_string(),
        street: "1 Main Street".to_string(),
        phone: "555-0100".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
    }
}

/// Two devices hammer the same line; every change lands.
#[tokio::test]
async fn test_concurrent_quantity_changes_from_two_devices() {
    let system = ShopSystem::new();
    let session = Session::signed_in("alice");
    let owner = session.owner().unwrap().clone();

    system
        .line_client
        .add(&owner, Line::new(chair()).with_quantity(10))
        .await
        .expect("Failed to seed line");

    let laptop = system.cart(&session).unwrap();
    let phone = system.cart(&session).unwrap();
    let line = wait_for_snapshot(&laptop, |s| s.len() == 1).await.remove(0);
    wait_for_snapshot(&phone, |s| s.len() == 1).await;

    let mut tasks = Vec::new();
    for _ in 0..5 {
        let (cart, line) = (laptop.clone(), line.clone());
        tasks.push(tokio::spawn(async move {
            cart.change_quantity(&line, QuantityChange::Increase).await
        }));
    }
    for _ in 0..3 {
        let (cart, line) = (phone.clone(), line.clone());
        tasks.push(tokio::spawn(async move {
            cart.change_quantity(&line, QuantityChange::Decrease).await
        }));
    }
    for task in tasks {
        let outcome = task.await.unwrap().expect("Quantity change failed");
        assert!(matches!(outcome, MutationOutcome::Updated { .. }), "{outcome:?}");
    }

    let stored = system.line_client.lines(&owner).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].line.quantity, 12);

    // Both devices converge on the final quantity
    wait_for_snapshot(&laptop, |s| s.first().map(|l| l.line.quantity) == Some(12)).await;
    wait_for_snapshot(&phone, |s| s.first().map(|l| l.line.quantity) == Some(12)).await;
}

#[tokio::test]
async fn test_adding_same_product_twice_increments() {
    let system = ShopSystem::new();
    let cart = system.cart(&Session::signed_in("bob")).unwrap();
    let oak = Line::new(chair()).with_color("oak");

    let first = cart.add(oak.clone()).await.unwrap();
    assert!(matches!(first, UpsertOutcome::Inserted(_)));
    let second = cart.add(oak.clone()).await.unwrap();
    assert!(matches!(second, UpsertOutcome::Incremented { quantity: 2, .. }));
    assert_eq!(*cart.add_to_cart_state().borrow(), AsyncState::Success(oak));

    let snapshot = wait_for_snapshot(&cart, |s| s.first().map(|l| l.line.quantity) == Some(2)).await;
    assert_eq!(snapshot.len(), 1);
}

#[tokio::test]
async fn test_different_options_get_separate_lines() {
    let system = ShopSystem::new();
    let cart = system.cart(&Session::signed_in("carol")).unwrap();

    cart.add(Line::new(chair()).with_color("oak")).await.unwrap();
    cart.add(Line::new(chair()).with_color("walnut")).await.unwrap();

    let snapshot = wait_for_snapshot(&cart, |s| s.len() == 2).await;
    assert!(snapshot.iter().all(|remote| remote.line.quantity == 1));
    assert_eq!(snapshot[0].line.selected_color.as_deref(), Some("oak"));
    assert_eq!(snapshot[1].line.selected_color.as_deref(), Some("walnut"));

    let mut price = cart.price_updates();
    let total = *price.wait_for(|total| *total == Some(240.0)).await.unwrap();
    assert_eq!(total, Some(240.0));
}

/// Checkout writes the order twice and empties the cart.
#[tokio::test]
async fn test_checkout_moves_cart_into_orders() {
    let system = ShopSystem::new();
    let session = Session::signed_in("dave");
    let cart = system.cart(&session).unwrap();

    cart.add(Line::new(chair()).with_color("oak")).await.unwrap();
    cart.add(Line::new(Product::new("lamp", "Desk lamp", 45.0))).await.unwrap();
    let before = wait_for_snapshot(&cart, |s| s.len() == 2).await;

    let checkout = system.checkout(&cart);
    let order = checkout
        .submit_cart(address())
        .await
        .expect("Checkout failed");
    assert_eq!(order.total_price(), 165.0);
    assert_eq!(*checkout.order_state().borrow(), AsyncState::Success(order.clone()));

    wait_for_snapshot(&cart, |s| s.is_empty()).await;

    let history = system.order_history(&session).unwrap();
    let orders = history.orders_of().await.unwrap();
    assert_eq!(orders, vec![order.clone()]);

    let ledger = history.ledger().await.unwrap();
    assert_eq!(ledger.len(), 1);
    let mut fetched = history.fetch_ledger();
    let published = tokio::time::timeout(WAIT, fetched.wait_for(|state| !state.is_loading()))
        .await
        .expect("ledger fetch never finished")
        .unwrap()
        .clone();
    assert_eq!(published, AsyncState::Success(ledger.clone()));
    let lines: Vec<Line> = before.into_iter().map(|remote| remote.line).collect();
    assert_eq!(ledger[0].lines(), lines.as_slice());
}

#[tokio::test]
async fn test_signed_out_session_gets_no_cart() {
    let system = ShopSystem::new();
    assert!(system.cart(&Session::signed_out()).is_err());
    assert!(system.order_history(&Session::signed_out()).is_err());
}

#[tokio::test]
async fn test_product_feed_pages_until_end_of_data() {
    let system = ShopSystem::new();
    for n in 0..25 {
        system
            .product_client
            .create_product(Product::new(format!("p{n:02}"), format!("Product {n}"), 10.0))
            .await
            .unwrap();
    }

    let p07 = system.product_client.get_product("p07").await.unwrap();
    assert_eq!(p07.map(|product| product.name), Some("Product 7".to_string()));
    assert_eq!(system.product_client.get_product("missing").await.unwrap(), None);

    let feed = system.product_feed();
    let mut sizes = Vec::new();
    loop {
        match feed.next_page().await.unwrap() {
            PageOutcome::Page(window) => sizes.push(window.len()),
            PageOutcome::EndOfData => break,
            PageOutcome::Exhausted => panic!("exhausted before end of data"),
        }
    }
    assert_eq!(sizes, vec![10, 20, 25]);
    assert_eq!(feed.next_page().await.unwrap(), PageOutcome::Exhausted);
    assert_eq!(
        feed.best_products().borrow().success().map(Vec::len),
        Some(25)
    );
}

#[tokio::test]
async fn test_dropping_cart_releases_listener() {
    let system = ShopSystem::new();
    let cart = system.cart(&Session::signed_in("erin")).unwrap();
    wait_for_snapshot(&cart, |_| true).await;
    assert_eq!(system.line_client.stats().await.unwrap().listeners, 1);

    drop(cart);
    let mut listeners = usize::MAX;
    for _ in 0..100 {
        listeners = system.line_client.stats().await.unwrap().listeners;
        if listeners == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(listeners, 0);
}

/// Decreasing a single unit asks for confirmation, then the confirmed removal deletes it.
#[tokio::test]
async fn test_decrease_on_last_unit_requests_removal() {
    let system = ShopSystem::new();
    let cart = system.cart(&Session::signed_in("frank")).unwrap();
    let mut removals = cart.removal_requests();

    cart.add(Line::new(chair())).await.unwrap();
    let line = wait_for_snapshot(&cart, |s| s.len() == 1).await.remove(0);

    let outcome = cart
        .change_quantity(&line, QuantityChange::Decrease)
        .await
        .unwrap();
    assert!(matches!(outcome, MutationOutcome::RemovalRequested(_)));
    let requested = removals.recv().await.unwrap();
    assert_eq!(requested.id, line.id);

    // Nothing was written
    assert_eq!(system.line_client.lines(cart.owner()).await.unwrap().len(), 1);

    let outcome = cart.delete(&requested).await.unwrap();
    assert_eq!(outcome, MutationOutcome::Removed(line.id.clone()));
    wait_for_snapshot(&cart, |s| s.is_empty()).await;
}

#[tokio::test]
async fn test_mutation_on_removed_line_is_stale() {
    let system = ShopSystem::new();
    let session = Session::signed_in("grace");
    let cart = system.cart(&session).unwrap();

    cart.add(Line::new(chair())).await.unwrap();
    let line = wait_for_snapshot(&cart, |s| s.len() == 1).await.remove(0);

    // Another device removes it
    assert!(system
        .line_client
        .remove(session.owner().unwrap(), &line.id)
        .await
        .unwrap());
    wait_for_snapshot(&cart, |s| s.is_empty()).await;

    let outcome = cart
        .change_quantity(&line, QuantityChange::Increase)
        .await
        .unwrap();
    assert_eq!(outcome, MutationOutcome::Stale(line.id.clone()));
    assert!(system.line_client.lines(cart.owner()).await.unwrap().is_empty());
    assert_eq!(cart.latest(), AsyncState::Success(Vec::new()));
}

/// A live subscription turns into an error once its store shuts down.
#[tokio::test]
async fn test_shutdown_closes_live_subscriptions() {
    let system = ShopSystem::new();
    let sync = RemoteCollectionSync::start(system.line_client.clone(), &Session::signed_in("heidi"))
        .unwrap();
    let mut stream = sync.subscribe();
    loop {
        match stream.next().await {
            Some(AsyncState::Success(_)) => break,
            Some(_) => continue,
            None => panic!("stream ended"),
        }
    }

    tokio::time::timeout(WAIT, system.shutdown())
        .await
        .expect("shutdown hung")
        .expect("shutdown failed");

    let state = tokio::time::timeout(WAIT, stream.next())
        .await
        .expect("no state after shutdown");
    assert_eq!(
        state,
        Some(AsyncState::Error("remote listener closed".to_string()))
    );
}

/// A line removed and added again by another device is a new document; the old reference
/// must not touch it.
#[tokio::test]
async fn test_removed_then_readded_line_is_not_touched_by_old_reference() {
    let system = ShopSystem::new();
    let session = Session::signed_in("ivan");
    let owner = session.owner().unwrap().clone();
    let cart = system.cart(&session).unwrap();

    cart.add(Line::new(chair()).with_color("oak")).await.unwrap();
    let old = wait_for_snapshot(&cart, |s| s.len() == 1).await.remove(0);

    // The other device removes the line and adds the same chair again
    assert!(system.line_client.remove(&owner, &old.id).await.unwrap());
    let readded = system
        .line_client
        .add(&owner, Line::new(chair()).with_color("oak").with_quantity(3))
        .await
        .unwrap();
    wait_for_snapshot(&cart, |s| s.len() == 1 && s[0].id == readded).await;

    assert_eq!(
        cart.delete(&old).await.unwrap(),
        MutationOutcome::Stale(old.id.clone())
    );
    assert_eq!(
        cart.change_quantity(&old, QuantityChange::Increase)
            .await
            .unwrap(),
        MutationOutcome::Stale(old.id.clone())
    );

    let stored = system.line_client.lines(&owner).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, readded);
    assert_eq!(stored[0].line.quantity, 3);
}

/// The fire-and-forget triggers finish their work before their handles resolve.
#[tokio::test]
async fn test_cart_triggers_complete_through_handles() {
    let system = ShopSystem::new();
    let cart = system.cart(&Session::signed_in("judy")).unwrap();
    let mut removals = cart.removal_requests();
    let oak = Line::new(chair()).with_color("oak");

    cart.add_or_increment(oak.clone()).await.unwrap();
    assert_eq!(*cart.add_to_cart_state().borrow(), AsyncState::Success(oak));
    let line = wait_for_snapshot(&cart, |s| s.len() == 1).await.remove(0);

    cart.increase(&line).await.unwrap();
    wait_for_snapshot(&cart, |s| s.first().map(|l| l.line.quantity) == Some(2)).await;

    cart.decrease(&line).await.unwrap();
    wait_for_snapshot(&cart, |s| s.first().map(|l| l.line.quantity) == Some(1)).await;

    cart.decrease(&line).await.unwrap();
    let requested = removals.recv().await.unwrap();
    assert_eq!(requested.id, line.id);

    cart.remove(&requested).await.unwrap();
    wait_for_snapshot(&cart, |s| s.is_empty()).await;
    assert!(system.line_client.lines(cart.owner()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_next_page_trigger_publishes_window() {
    let system = ShopSystem::new();
    for n in 0..12 {
        system
            .product_client
            .create_product(Product::new(format!("p{n:02}"), format!("Product {n}"), 10.0))
            .await
            .unwrap();
    }

    let feed = system.product_feed();
    assert_eq!(*feed.best_products().borrow(), AsyncState::Unspecified);
    feed.fetch_next_page().await.unwrap();
    assert_eq!(feed.best_products().borrow().success().map(Vec::len), Some(10));
    feed.fetch_next_page().await.unwrap();
    assert_eq!(feed.best_products().borrow().success().map(Vec::len), Some(12));
}

#[tokio::test]
async fn test_checkout_triggers_publish_order_state() {
    let system = ShopSystem::new();
    let session = Session::signed_in("kim");
    let cart = system.cart(&session).unwrap();
    let checkout = system.checkout(&cart);

    checkout
        .place_order(vec![Line::new(chair())], address(), 120.0)
        .await
        .unwrap();
    let placed = checkout.order_state().borrow().clone();
    assert_eq!(placed.success().map(|order| order.total_price()), Some(120.0));

    cart.add(Line::new(chair()).with_color("walnut")).await.unwrap();
    wait_for_snapshot(&cart, |s| s.len() == 1).await;
    checkout.checkout_cart(address()).await.unwrap();
    let state = checkout.order_state().borrow().clone();
    assert_eq!(state.success().map(|order| order.lines().len()), Some(1));
    wait_for_snapshot(&cart, |s| s.is_empty()).await;

    let history = system.order_history(&session).unwrap();
    assert_eq!(history.orders_of().await.unwrap().len(), 2);
}

/// Saved addresses are listed live and feed the checkout.
#[tokio::test]
async fn test_address_book_feeds_checkout() {
    let system = ShopSystem::new();
    let session = Session::signed_in("leo");
    let book = system.address_book(&session).unwrap();
    let mut addresses = book.addresses();

    book.add(address()).await.unwrap();
    let saved = tokio::time::timeout(
        WAIT,
        addresses.wait_for(|state| state.success().is_some_and(|saved| !saved.is_empty())),
    )
    .await
    .expect("address never listed")
    .unwrap()
    .clone();
    assert_eq!(saved, AsyncState::Success(vec![address()]));

    let cart = system.cart(&session).unwrap();
    cart.add(Line::new(chair())).await.unwrap();
    wait_for_snapshot(&cart, |s| s.len() == 1).await;
    let order = system
        .checkout(&cart)
        .submit_cart(address())
        .await
        .unwrap();
    assert_eq!(order.address(), &address());

    assert!(system.address_book(&Session::signed_out()).is_err());
}
