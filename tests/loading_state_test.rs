use cart_sync::cart::{CartManager, SnapshotStream};
use cart_sync::checkout::Checkout;
use cart_sync::clients::{LineClient, OrderClient};
use cart_sync::framework::mock::{create_mock_client, next_request, MockClient};
use cart_sync::framework::{
    BatchReceipt, CollectionSnapshot, DocumentId, Listing, StoreRequest, Stored, Write,
};
use cart_sync::lifecycle::ShopConfig;
use cart_sync::model::{Address, AsyncState, Line, Order, Product, Snapshot};
use cart_sync::session::Session;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

const WAIT: Duration = Duration::from_secs(5);

fn lamp(quantity: u32, version: u64) -> Stored<Line> {
    Stored {
        id: DocumentId::from("line-1"),
        version,
        data: Line::new(Product::new("lamp", "Desk lamp", 45.0)).with_quantity(quantity),
    }
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

async fn next_success(stream: &mut SnapshotStream) -> Snapshot {
    tokio::time::timeout(WAIT, async {
        loop {
            match stream.next().await {
                Some(AsyncState::Success(snapshot)) => return snapshot,
                Some(_) => continue,
                None => panic!("cart stream ended"),
            }
        }
    })
    .await
    .expect("no snapshot published")
}

/// Answers the cart's subscription with a channel the test drives by hand.
async fn answer_subscribe(
    requests: &mut mpsc::Receiver<StoreRequest<Line>>,
    initial: Vec<Stored<Line>>,
) -> watch::Sender<CollectionSnapshot<Line>> {
    match next_request(requests).await {
        Some(StoreRequest::Subscribe { respond_to, .. }) => {
            let (remote, receiver) = watch::channel(Arc::new(initial));
            respond_to.send(Ok(receiver)).unwrap();
            remote
        }
        other => panic!("expected subscribe, got {other:?}"),
    }
}

/// The cart shows Loading from the moment a quantity change starts until the store pushes
/// the committed snapshot.
#[tokio::test]
async fn test_quantity_change_shows_loading_until_snapshot_arrives() {
    let (store, mut requests) = create_mock_client::<Line>(8);
    let cart = CartManager::new(
        LineClient::new(store),
        &Session::signed_in("alice"),
        &ShopConfig::default(),
    )
    .unwrap();
    let mut stream = cart.cart();
    let remote = answer_subscribe(&mut requests, vec![lamp(1, 1)]).await;
    let line = next_success(&mut stream).await.remove(0);

    let handle = cart.increase(&line);

    match next_request(&mut requests).await {
        Some(StoreRequest::Get { id, respond_to, .. }) => {
            assert!(cart.latest().is_loading());
            assert_eq!(id, line.id);
            respond_to.send(Ok(Some(lamp(1, 1)))).unwrap();
        }
        other => panic!("expected get, got {other:?}"),
    }
    match next_request(&mut requests).await {
        Some(StoreRequest::CompareAndSet {
            expected,
            document,
            respond_to,
            ..
        }) => {
            assert_eq!(expected, 1);
            assert_eq!(document.map(|line| line.quantity), Some(2));
            respond_to.send(Ok(2)).unwrap();
        }
        other => panic!("expected compare-and-set, got {other:?}"),
    }
    handle.await.unwrap();

    // Committed, but the subscription has not caught up yet
    assert!(cart.latest().is_loading());

    remote.send_replace(Arc::new(vec![lamp(2, 2)]));
    let snapshot = next_success(&mut stream).await;
    assert_eq!(snapshot[0].line.quantity, 2);
    let mut price = cart.price_updates();
    tokio::time::timeout(WAIT, price.wait_for(|total| *total == Some(90.0)))
        .await
        .expect("total never caught up")
        .unwrap();
}

/// Checkout puts both the cart and the order channel into Loading, publishes the order
/// once the writes land, and the cart follows the cleared snapshot.
#[tokio::test]
async fn test_checkout_shows_loading_then_order_and_empty_cart() {
    let (store, mut requests) = create_mock_client::<Line>(8);
    let mut orders = MockClient::<Order>::new();
    orders.expect_insert().return_ok(DocumentId::from("order-1"));
    orders.expect_insert().return_ok(DocumentId::from("order-2"));

    let cart = CartManager::new(
        LineClient::new(store.clone()),
        &Session::signed_in("bob"),
        &ShopConfig::default(),
    )
    .unwrap();
    let mut stream = cart.cart();
    let remote = answer_subscribe(&mut requests, vec![lamp(2, 1)]).await;
    next_success(&mut stream).await;

    let checkout = Checkout::new(
        cart.clone(),
        OrderClient::new(orders.client()),
        LineClient::new(store),
    );
    let order_state = checkout.order_state();
    let handle = checkout.checkout_cart(address());

    match next_request(&mut requests).await {
        Some(StoreRequest::List { respond_to, .. }) => {
            assert!(cart.latest().is_loading());
            assert_eq!(*order_state.borrow(), AsyncState::Loading);
            respond_to
                .send(Ok(Listing {
                    documents: vec![lamp(2, 1)],
                    version: 1,
                }))
                .unwrap();
        }
        other => panic!("expected list, got {other:?}"),
    }
    match next_request(&mut requests).await {
        Some(StoreRequest::Batch {
            expected,
            writes,
            respond_to,
            ..
        }) => {
            assert_eq!(expected, Some(1));
            assert!(matches!(writes.as_slice(), [Write::Delete(id)] if id.as_str() == "line-1"));
            respond_to
                .send(Ok(BatchReceipt {
                    version: 2,
                    ids: Vec::new(),
                }))
                .unwrap();
        }
        other => panic!("expected batch, got {other:?}"),
    }
    handle.await.unwrap();

    let placed = order_state.borrow().clone();
    assert_eq!(placed.success().map(|order| order.total_price()), Some(90.0));
    assert!(cart.latest().is_loading());

    remote.send_replace(Arc::new(Vec::new()));
    assert!(next_success(&mut stream).await.is_empty());
    assert_eq!(cart.latest(), AsyncState::Success(Vec::new()));

    orders.verify();
}
