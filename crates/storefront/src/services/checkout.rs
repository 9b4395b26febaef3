//! Checkout sessions and payment settlement.
//!
//! A [`CheckoutSession`] owns one [`CheckoutState`] and reads the shared
//! cart for its order summary. Submitting runs settlement through a
//! [`PaymentProcessor`] while the state sits in `Processing`. Each session
//! carries a cancellation token: abandoning the session interrupts an
//! in-flight settlement, and a settlement that finishes after abandonment is
//! dropped instead of being applied.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use digital_store_core::checkout::{
    Advance, CheckoutError, CheckoutField, CheckoutState, CheckoutStep, OrderConfirmation,
    OrderNumber, PendingOrder, SettlementError, Submit,
};
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::CartStore;

/// Settles payment for an order.
pub trait PaymentProcessor: Send + Sync + 'static {
    /// Settle `order`, producing a confirmation or the reason it failed.
    fn settle(
        &self,
        order: &PendingOrder,
    ) -> impl Future<Output = Result<OrderConfirmation, SettlementError>> + Send;
}

/// Stand-in processor: waits a fixed delay, then always succeeds.
#[derive(Debug, Clone)]
pub struct SimulatedProcessor {
    delay: Duration,
}

impl SimulatedProcessor {
    /// Create a processor that settles after `delay`.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl PaymentProcessor for SimulatedProcessor {
    async fn settle(&self, order: &PendingOrder) -> Result<OrderConfirmation, SettlementError> {
        tokio::time::sleep(self.delay).await;

        let order_number = {
            let mut rng = rand::rng();
            OrderNumber::generate(|n| rng.random_range(0..n))
        };

        Ok(OrderConfirmation {
            order_number,
            placed_at: Utc::now(),
            order: order.clone(),
        })
    }
}

/// What happened to a settlement once it finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleOutcome {
    /// The order was placed; the session is complete.
    Completed(OrderNumber),
    /// The payment failed; the session is back on the payment step.
    Declined(String),
    /// The session was abandoned; nothing was applied.
    Abandoned,
}

/// One shopper's pass through checkout.
///
/// Cheap to clone; clones refer to the same session.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    id: Uuid,
    state: Mutex<CheckoutState>,
    cart: CartStore,
    cancel: CancellationToken,
}

impl CheckoutSession {
    /// Start a session at the personal info step.
    #[must_use]
    pub fn new(cart: CartStore) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id: Uuid::new_v4(),
                state: Mutex::new(CheckoutState::new()),
                cart,
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// The cart this session checks out.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Copy of the current checkout state.
    #[must_use]
    pub fn state(&self) -> CheckoutState {
        self.lock().clone()
    }

    /// Update form fields, clearing each edited field's error.
    ///
    /// The batch is all or nothing: on error no field is changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is processing or complete, or a
    /// country value is not selectable.
    pub fn set_fields<I, V>(&self, fields: I) -> Result<(), CheckoutError>
    where
        I: IntoIterator<Item = (CheckoutField, V)>,
        V: Into<String>,
    {
        self.lock().set_fields(fields)
    }

    /// Advance to the next step if the current one validates.
    ///
    /// # Errors
    ///
    /// See [`CheckoutState::advance`].
    #[instrument(skip(self), fields(session_id = %self.id()))]
    pub fn advance(&self) -> Result<Advance, CheckoutError> {
        let outcome = self.lock().advance()?;
        info!(?outcome, "Checkout advance");
        Ok(outcome)
    }

    /// Go back one step.
    ///
    /// # Errors
    ///
    /// See [`CheckoutState::retreat`].
    #[instrument(skip(self), fields(session_id = %self.id()))]
    pub fn retreat(&self) -> Result<CheckoutStep, CheckoutError> {
        self.lock().retreat()
    }

    /// Validate payment details and enter `Processing`.
    ///
    /// The order is captured from the cart as it is right now.
    ///
    /// # Errors
    ///
    /// See [`CheckoutState::begin_submit`].
    #[instrument(skip(self), fields(session_id = %self.id()))]
    pub fn begin_submit(&self) -> Result<Submit, CheckoutError> {
        if self.is_abandoned() {
            return Err(CheckoutError::Processing);
        }
        let cart = self.inner.cart.snapshot();
        self.lock().begin_submit(&cart)
    }

    /// Run settlement for an order returned by [`Self::begin_submit`] and
    /// apply the result.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotProcessing`] if no submit is in flight.
    #[instrument(skip_all, fields(session_id = %self.id()))]
    pub async fn settle<P: PaymentProcessor>(
        &self,
        processor: &P,
        order: PendingOrder,
    ) -> Result<SettleOutcome, CheckoutError> {
        let result = tokio::select! {
            () = self.inner.cancel.cancelled() => Err(SettlementError::Cancelled),
            result = processor.settle(&order) => result,
        };

        let outcome = {
            // Abandonment takes this lock before cancelling, so the check and
            // the transition below cannot interleave with it.
            let mut state = self.lock();
            if self.is_abandoned() {
                SettleOutcome::Abandoned
            } else {
                let outcome = match &result {
                    Ok(confirmation) => {
                        SettleOutcome::Completed(confirmation.order_number.clone())
                    }
                    Err(error) => SettleOutcome::Declined(error.to_string()),
                };
                state.finish_submit(result)?;
                outcome
            }
        };

        match &outcome {
            SettleOutcome::Completed(order_number) => {
                info!(%order_number, "Order placed");
            }
            SettleOutcome::Declined(reason) => warn!(%reason, "Payment declined"),
            SettleOutcome::Abandoned => {
                warn!("Checkout abandoned during settlement, discarding result");
            }
        }
        Ok(outcome)
    }

    /// Validate, then settle in one call.
    ///
    /// Returns `None` when the payment step has invalid fields; the
    /// session's errors say which.
    ///
    /// # Errors
    ///
    /// See [`Self::begin_submit`] and [`Self::settle`].
    pub async fn submit<P: PaymentProcessor>(
        &self,
        processor: &P,
    ) -> Result<Option<SettleOutcome>, CheckoutError> {
        match self.begin_submit()? {
            Submit::Started(order) => self.settle(processor, order).await.map(Some),
            Submit::Blocked(_) => Ok(None),
        }
    }

    /// Discard the session, cancelling any in-flight settlement.
    #[instrument(skip(self), fields(session_id = %self.id()))]
    pub fn abandon(&self) {
        let _state = self.lock();
        if !self.inner.cancel.is_cancelled() {
            info!("Checkout abandoned");
            self.inner.cancel.cancel();
        }
    }

    /// Whether [`Self::abandon`] was called.
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    fn lock(&self) -> MutexGuard<'_, CheckoutState> {
        // Transitions never panic mid-update; a poisoned state is consistent.
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use digital_store_core::{Catalog, ProductId};

    use super::*;

    /// Processor that always refuses.
    struct DecliningProcessor;

    impl PaymentProcessor for DecliningProcessor {
        async fn settle(&self, _order: &PendingOrder) -> Result<OrderConfirmation, SettlementError> {
            Err(SettlementError::Declined("card refused".to_string()))
        }
    }

    /// Processor that abandons its session just as settlement succeeds.
    struct AbandoningProcessor(CheckoutSession);

    impl PaymentProcessor for AbandoningProcessor {
        async fn settle(&self, order: &PendingOrder) -> Result<OrderConfirmation, SettlementError> {
            self.0.abandon();
            Ok(OrderConfirmation {
                order_number: OrderNumber::parse("ABC123XYZ").unwrap(),
                placed_at: Utc::now(),
                order: order.clone(),
            })
        }
    }

    fn session_with_item() -> CheckoutSession {
        let catalog = Catalog::sample().unwrap();
        let cart = CartStore::new();
        cart.add_item(catalog.get(ProductId::new(8)).unwrap());
        CheckoutSession::new(cart)
    }

    fn fill_to_payment(session: &CheckoutSession) {
        session
            .set_fields([
                (CheckoutField::FirstName, "Ada"),
                (CheckoutField::LastName, "Lovelace"),
                (CheckoutField::Email, "ada@example.com"),
                (CheckoutField::Phone, "555-0100"),
            ])
            .unwrap();
        assert_eq!(session.advance().unwrap(), Advance::Moved(CheckoutStep::Shipping));
        session
            .set_fields([
                (CheckoutField::Address, "12 Analytical Way"),
                (CheckoutField::City, "London"),
                (CheckoutField::State, "LDN"),
                (CheckoutField::ZipCode, "N1"),
            ])
            .unwrap();
        assert_eq!(session.advance().unwrap(), Advance::Moved(CheckoutStep::Payment));
        session
            .set_fields([
                (CheckoutField::CardNumber, "4242 4242 4242 4242"),
                (CheckoutField::ExpiryDate, "12/30"),
                (CheckoutField::Cvv, "123"),
                (CheckoutField::CardName, "A Lovelace"),
            ])
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_completes_after_delay() {
        let session = session_with_item();
        fill_to_payment(&session);
        let processor = SimulatedProcessor::new(Duration::from_secs(3));

        let outcome = session.submit(&processor).await.unwrap();

        assert!(matches!(outcome, Some(SettleOutcome::Completed(_))));
        let state = session.state();
        assert_eq!(state.step(), CheckoutStep::Complete);
        assert!(!state.is_processing());
        assert!(state.is_completed());
        let confirmation = state.confirmation().unwrap();
        assert_eq!(confirmation.order.totals.subtotal.to_string(), "$149.99");
        assert_eq!(confirmation.order_number.as_str().len(), OrderNumber::LENGTH);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_submit_rejected_while_processing() {
        let session = session_with_item();
        fill_to_payment(&session);
        let processor = SimulatedProcessor::new(Duration::from_secs(3));

        let Submit::Started(order) = session.begin_submit().unwrap() else {
            panic!("submit should start");
        };
        assert!(session.state().is_processing());
        assert_eq!(session.begin_submit(), Err(CheckoutError::Processing));

        session.settle(&processor, order).await.unwrap();
        assert!(session.state().is_completed());
    }

    #[tokio::test]
    async fn test_blocked_submit_reports_errors() {
        let session = session_with_item();
        fill_to_payment(&session);
        session.set_fields([(CheckoutField::CardName, "")]).unwrap();

        let outcome = session
            .submit(&SimulatedProcessor::new(Duration::ZERO))
            .await
            .unwrap();

        assert!(outcome.is_none());
        let state = session.state();
        assert_eq!(state.step(), CheckoutStep::Payment);
        assert_eq!(
            state.errors().get(CheckoutField::CardName),
            Some("Cardholder name is required")
        );
    }

    #[tokio::test]
    async fn test_declined_payment_can_retry() {
        let session = session_with_item();
        fill_to_payment(&session);

        let outcome = session.submit(&DecliningProcessor).await.unwrap();
        assert_eq!(
            outcome,
            Some(SettleOutcome::Declined("payment declined: card refused".to_string()))
        );
        assert_eq!(session.state().step(), CheckoutStep::Payment);

        let outcome = session
            .submit(&SimulatedProcessor::new(Duration::ZERO))
            .await
            .unwrap();
        assert!(matches!(outcome, Some(SettleOutcome::Completed(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandon_cancels_in_flight_settlement() {
        let session = session_with_item();
        fill_to_payment(&session);
        let processor = SimulatedProcessor::new(Duration::from_secs(60));

        let Submit::Started(order) = session.begin_submit().unwrap() else {
            panic!("submit should start");
        };
        let task = {
            let session = session.clone();
            tokio::spawn(async move { session.settle(&processor, order).await })
        };

        tokio::task::yield_now().await;
        session.abandon();

        let outcome = task.await.unwrap().unwrap();
        assert_eq!(outcome, SettleOutcome::Abandoned);
        // The abandoned session's state was never completed.
        assert!(!session.state().is_completed());
        assert!(session.is_abandoned());
    }

    #[tokio::test]
    async fn test_success_after_abandon_is_discarded() {
        let session = session_with_item();
        fill_to_payment(&session);
        let processor = AbandoningProcessor(session.clone());

        let outcome = session.submit(&processor).await.unwrap();

        assert_eq!(outcome, Some(SettleOutcome::Abandoned));
        let state = session.state();
        assert!(!state.is_completed());
        assert!(state.confirmation().is_none());
    }

    #[tokio::test]
    async fn test_settle_after_abandon_applies_nothing() {
        let session = session_with_item();
        fill_to_payment(&session);
        let Submit::Started(order) = session.begin_submit().unwrap() else {
            panic!("submit should start");
        };
        session.abandon();

        let outcome = session
            .settle(&SimulatedProcessor::new(Duration::ZERO), order)
            .await
            .unwrap();

        assert_eq!(outcome, SettleOutcome::Abandoned);
        assert!(session.state().is_processing());
    }

    #[tokio::test]
    async fn test_set_fields_rejects_whole_batch() {
        let session = session_with_item();
        let result = session.set_fields([
            (CheckoutField::Address, "12 Analytical Way"),
            (CheckoutField::Country, "Atlantis"),
        ]);

        assert!(matches!(result, Err(CheckoutError::InvalidCountry(_))));
        assert_eq!(session.state().form().value(CheckoutField::Address), "");
    }

    #[tokio::test]
    async fn test_empty_cart_cannot_submit() {
        let session = CheckoutSession::new(CartStore::new());
        fill_to_payment(&session);
        assert_eq!(session.begin_submit(), Err(CheckoutError::EmptyCart));
    }
}
