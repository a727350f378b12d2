//! # Upsert Resolver
//!
//! "Add to cart": increments the line that already holds the same product and options,
//! or inserts a new single-unit line.
//!
//! The insert is conditional on the cart version the lookup observed. If anything was
//! committed to the cart in between (typically a concurrent add of the same product), the
//! insert is refused and the lookup runs again, so two adds can never create two lines for
//! the same product and options.

use crate::cart::{CartError, LineMutationTransactor, MutationOutcome};
use crate::clients::LineClient;
use crate::framework::DocumentId;
use crate::line_actor::LineError;
use crate::model::Line;
use crate::session::{OwnerId, Session};
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    /// A new line was created with quantity 1.
    Inserted(DocumentId),
    /// An existing line with the same options was incremented.
    Incremented { id: DocumentId, quantity: u32 },
}

#[derive(Clone)]
pub struct UpsertResolver {
    lines: LineClient,
    transactor: LineMutationTransactor,
    owner: OwnerId,
    max_attempts: u32,
}

impl UpsertResolver {
    pub fn new(lines: LineClient, session: &Session, max_attempts: u32) -> Result<Self, CartError> {
        let transactor = LineMutationTransactor::new(lines.clone(), session, max_attempts)?;
        Ok(Self {
            lines,
            owner: transactor.owner().clone(),
            transactor,
            max_attempts,
        })
    }

    /// Adds one unit of `candidate` to the cart. The candidate's own quantity is ignored.
    #[instrument(skip(self, candidate), fields(owner = %self.owner, product_id = %candidate.product.id))]
    pub async fn add_or_increment(&self, candidate: Line) -> Result<UpsertOutcome, CartError> {
        let candidate = candidate.with_quantity(1);
        let max_attempts = self.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let listing = self
                .lines
                .lines_for_product(&self.owner, &candidate.product.id)
                .await?;
            let existing = listing
                .documents
                .iter()
                .find(|stored| stored.data.same_options(&candidate));

            match existing {
                Some(stored) => match self.transactor.increase(&stored.id).await? {
                    MutationOutcome::Updated { id, quantity } => {
                        info!(%id, quantity, "Incremented existing line");
                        return Ok(UpsertOutcome::Incremented { id, quantity });
                    }
                    _ => debug!(attempt, "Matching line vanished, looking again"),
                },
                None => match self
                    .lines
                    .insert_if_unchanged(&self.owner, listing.version, candidate.clone())
                    .await
                {
                    Ok(id) => {
                        info!(%id, "Inserted new line");
                        return Ok(UpsertOutcome::Inserted(id));
                    }
                    Err(LineError::Conflict(_)) => {
                        debug!(attempt, "Cart changed before insert, looking again")
                    }
                    Err(e) => return Err(e.into()),
                },
            }
        }

        Err(LineError::Contention(format!(
            "add to cart gave up after {max_attempts} attempts"
        ))
        .into())
    }
}
