//! # Line Mutation Transactor
//!
//! Quantity changes on a single cart line, committed with compare-and-set so concurrent
//! writers never lose an update.

use crate::cart::CartError;
use crate::clients::LineClient;
use crate::framework::{DocumentId, TxDecision};
use crate::model::{Line, RemoteLine};
use crate::session::{OwnerId, Session};
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    Increase,
    Decrease,
}

/// What a cart mutation ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The line now holds `quantity` units.
    Updated { id: DocumentId, quantity: u32 },
    /// A decrease hit a single-unit line. Nothing was written; the caller has to confirm
    /// the removal and call `remove`.
    RemovalRequested(RemoteLine),
    /// The line was deleted.
    Removed(DocumentId),
    /// The line no longer exists. Nothing was written.
    Stale(DocumentId),
}

/// Applies quantity changes and removals to one owner's cart lines.
#[derive(Clone)]
pub struct LineMutationTransactor {
    lines: LineClient,
    owner: OwnerId,
    max_attempts: u32,
}

impl LineMutationTransactor {
    pub fn new(lines: LineClient, session: &Session, max_attempts: u32) -> Result<Self, CartError> {
        Ok(Self {
            lines,
            owner: session.owner()?.clone(),
            max_attempts,
        })
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub async fn increase(&self, id: &DocumentId) -> Result<MutationOutcome, CartError> {
        self.change(id, QuantityChange::Increase).await
    }

    pub async fn decrease(&self, id: &DocumentId) -> Result<MutationOutcome, CartError> {
        self.change(id, QuantityChange::Decrease).await
    }

    /// Reads the line, applies `change` and writes it back if the line was not modified
    /// in between; otherwise re-reads and tries again.
    ///
    /// A decrease on a single-unit line aborts without writing and reports
    /// [`MutationOutcome::RemovalRequested`].
    #[instrument(skip(self), fields(owner = %self.owner))]
    pub async fn change(
        &self,
        id: &DocumentId,
        change: QuantityChange,
    ) -> Result<MutationOutcome, CartError> {
        let line_id = id.clone();
        let owner = self.owner.clone();
        let outcome = self
            .lines
            .transact(&self.owner, id, self.max_attempts, move |current: &Line| {
                match change {
                    QuantityChange::Decrease if current.quantity <= 1 => {
                        TxDecision::Abort(MutationOutcome::RemovalRequested(RemoteLine {
                            id: line_id.clone(),
                            owner: owner.clone(),
                            line: current.clone(),
                        }))
                    }
                    QuantityChange::Decrease => {
                        let quantity = current.quantity - 1;
                        TxDecision::Write(
                            current.clone().with_quantity(quantity),
                            MutationOutcome::Updated {
                                id: line_id.clone(),
                                quantity,
                            },
                        )
                    }
                    QuantityChange::Increase => {
                        let quantity = current.quantity.saturating_add(1);
                        TxDecision::Write(
                            current.clone().with_quantity(quantity),
                            MutationOutcome::Updated {
                                id: line_id.clone(),
                                quantity,
                            },
                        )
                    }
                }
            })
            .await?;

        match outcome {
            Some(outcome) => {
                info!(?outcome, "Quantity change settled");
                Ok(outcome)
            }
            None => {
                debug!("Line is gone, nothing to change");
                Ok(MutationOutcome::Stale(id.clone()))
            }
        }
    }

    /// Deletes the line. A line that is already gone yields [`MutationOutcome::Stale`].
    #[instrument(skip(self), fields(owner = %self.owner))]
    pub async fn remove(&self, id: &DocumentId) -> Result<MutationOutcome, CartError> {
        if self.lines.remove(&self.owner, id).await? {
            info!("Line removed");
            Ok(MutationOutcome::Removed(id.clone()))
        } else {
            debug!("Line already removed");
            Ok(MutationOutcome::Stale(id.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::CollectionClient;
    use crate::line_actor::LineError;
    use crate::model::Product;

    async fn cart_with_line(quantity: u32) -> (LineMutationTransactor, DocumentId) {
        let (actor, lines) = crate::line_actor::new(16);
        tokio::spawn(actor.run());
        let session = Session::signed_in("alice");
        let id = lines
            .add(
                session.owner().unwrap(),
                Line::new(Product::new("p1", "Chair", 10.0)).with_quantity(quantity),
            )
            .await
            .unwrap();
        let transactor = LineMutationTransactor::new(lines, &session, 32).unwrap();
        (transactor, id)
    }

    async fn quantity_of(transactor: &LineMutationTransactor, id: &DocumentId) -> Option<u32> {
        transactor
            .lines
            .get(crate::clients::paths::cart(transactor.owner()), id.clone())
            .await
            .unwrap()
            .map(|stored| stored.data.quantity)
    }

    #[tokio::test]
    async fn concurrent_changes_are_not_lost() {
        let (transactor, id) = cart_with_line(10).await;

        let mut tasks = Vec::new();
        for n in 0..20 {
            let transactor = transactor.clone();
            let id = id.clone();
            tasks.push(tokio::spawn(async move {
                if n % 4 == 0 {
                    transactor.decrease(&id).await
                } else {
                    transactor.increase(&id).await
                }
            }));
        }
        for task in tasks {
            assert!(matches!(
                task.await.unwrap(),
                Ok(MutationOutcome::Updated { .. })
            ));
        }

        // 15 increases, 5 decreases
        assert_eq!(quantity_of(&transactor, &id).await, Some(20));
    }

    #[tokio::test]
    async fn decrease_on_single_unit_requests_removal() {
        let (transactor, id) = cart_with_line(1).await;

        let outcome = transactor.decrease(&id).await.unwrap();
        match outcome {
            MutationOutcome::RemovalRequested(line) => {
                assert_eq!(line.id, id);
                assert_eq!(line.line.quantity, 1);
            }
            other => panic!("expected removal request, got {other:?}"),
        }
        assert_eq!(quantity_of(&transactor, &id).await, Some(1));

        assert_eq!(
            transactor.remove(&id).await.unwrap(),
            MutationOutcome::Removed(id.clone())
        );
        assert_eq!(quantity_of(&transactor, &id).await, None);
    }

    #[tokio::test]
    async fn mutation_on_removed_line_is_a_no_op() {
        let (transactor, id) = cart_with_line(2).await;
        transactor.remove(&id).await.unwrap();

        assert_eq!(
            transactor.increase(&id).await.unwrap(),
            MutationOutcome::Stale(id.clone())
        );
        assert_eq!(
            transactor.remove(&id).await.unwrap(),
            MutationOutcome::Stale(id.clone())
        );
    }

    #[tokio::test]
    async fn closed_store_is_a_retriable_failure() {
        let (actor, lines) = crate::line_actor::new(4);
        drop(actor);
        let transactor = LineMutationTransactor::new(lines, &Session::signed_in("alice"), 4).unwrap();

        let error = transactor.increase(&DocumentId::from("x")).await.unwrap_err();
        assert!(matches!(
            error,
            CartError::Remote(LineError::ActorCommunicationError(_))
        ));
        assert!(error.is_retriable());
    }
}
