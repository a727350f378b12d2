//! # Address Book
//!
//! The owner's saved shipping addresses, the address source of a checkout. The list is a
//! live subscription: Loading until the store answers, then Success after every change.

use crate::address_actor::AddressError;
use crate::checkout::CheckoutError;
use crate::clients::AddressClient;
use crate::framework::DocumentId;
use crate::model::{Address, AsyncState};
use crate::session::{OwnerId, Session};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

struct BookInner {
    client: AddressClient,
    owner: OwnerId,
    addresses: watch::Sender<AsyncState<Vec<Address>>>,
    add_state: watch::Sender<AsyncState<Address>>,
    token: CancellationToken,
}

impl Drop for BookInner {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Live view of one owner's addresses plus the add-address action.
#[derive(Clone)]
pub struct AddressBook {
    inner: Arc<BookInner>,
}

impl AddressBook {
    /// Subscribes to the session owner's addresses. Must be called inside a Tokio runtime.
    pub fn new(client: AddressClient, session: &Session) -> Result<Self, CheckoutError> {
        let owner = session.owner()?.clone();
        let (addresses, _) = watch::channel(AsyncState::Loading);
        let (add_state, _) = watch::channel(AsyncState::Unspecified);
        let token = CancellationToken::new();

        let inner = Arc::new(BookInner {
            client: client.clone(),
            owner: owner.clone(),
            addresses,
            add_state,
            token: token.clone(),
        });
        tokio::spawn(forward(client, owner, Arc::downgrade(&inner), token));
        Ok(Self { inner })
    }

    pub fn addresses(&self) -> watch::Receiver<AsyncState<Vec<Address>>> {
        self.inner.addresses.subscribe()
    }

    pub fn add_state(&self) -> watch::Receiver<AsyncState<Address>> {
        self.inner.add_state.subscribe()
    }

    /// Fire-and-forget variant of [`AddressBook::add`].
    pub fn add_address(&self, address: Address) -> JoinHandle<()> {
        let book = self.clone();
        tokio::spawn(async move {
            let _ = book.add(address).await;
        })
    }

    /// Saves `address`, publishing Loading then Success/Error on the add state. An
    /// incomplete address is refused without the Loading step.
    pub async fn add(&self, address: Address) -> Result<DocumentId, AddressError> {
        if !address.is_complete() {
            self.inner
                .add_state
                .send_replace(AsyncState::Error(AddressError::Incomplete.to_string()));
            return Err(AddressError::Incomplete);
        }

        self.inner.add_state.send_replace(AsyncState::Loading);
        let result = self.inner.client.add(&self.inner.owner, address.clone()).await;
        let state = match &result {
            Ok(_) => AsyncState::Success(address),
            Err(e) => AsyncState::Error(e.to_string()),
        };
        self.inner.add_state.send_replace(state);
        result
    }
}

async fn forward(
    client: AddressClient,
    owner: OwnerId,
    book: std::sync::Weak<BookInner>,
    token: CancellationToken,
) {
    let subscribed = tokio::select! {
        _ = token.cancelled() => return,
        subscribed = client.subscribe(&owner) => subscribed,
    };
    drop(client);

    let publish = |state: AsyncState<Vec<Address>>| match book.upgrade() {
        Some(book) => {
            book.addresses.send_replace(state);
            true
        }
        None => false,
    };

    let mut remote = match subscribed {
        Ok(remote) => remote,
        Err(e) => {
            warn!(%owner, error = %e, "Address subscription failed");
            publish(AsyncState::Error(e.to_string()));
            return;
        }
    };
    info!(%owner, "Address subscription started");

    loop {
        let addresses: Vec<Address> = remote
            .borrow_and_update()
            .iter()
            .map(|stored| stored.data.clone())
            .collect();
        debug!(%owner, count = addresses.len(), "Address book snapshot");
        if !publish(AsyncState::Success(addresses)) {
            return;
        }

        let changed = tokio::select! {
            _ = token.cancelled() => return,
            changed = remote.changed() => changed,
        };
        if changed.is_err() {
            warn!(%owner, "Remote listener closed");
            publish(AsyncState::Error("remote listener closed".to_string()));
            return;
        }
    }
}
