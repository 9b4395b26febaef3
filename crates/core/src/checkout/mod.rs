//! The four-step checkout wizard.
//!
//! ```text
//! Personal ──advance──▶ Shipping ──advance──▶ Payment ──submit──▶ Processing ──▶ Complete
//!    ▲                     │  ▲                  │                    │
//!    └──────retreat────────┘  └─────retreat──────┘        declined ◀──┘ (back to Payment)
//! ```
//!
//! `advance` is gated on the current step validating cleanly. `submit` from
//! the payment step validates it, captures the order, and parks the state in
//! `Processing` until the caller reports a settlement outcome with
//! [`CheckoutState::finish_submit`]. While processing, every other
//! operation is rejected. `Complete` is terminal.

mod form;
mod order;

use serde::Serialize;
use thiserror::Error;

use crate::cart::Cart;

pub use form::{CheckoutField, CheckoutForm, Country, FieldErrors};
pub use order::{OrderConfirmation, OrderNumber, OrderNumberError, PendingOrder, SettlementError};

/// Errors from checkout operations that are not allowed in the current state.
///
/// Empty required fields are not errors; they are reported as
/// [`FieldErrors`] through [`Advance::Blocked`] and [`Submit::Blocked`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// A settlement is in flight; input is disabled.
    #[error("payment is being processed")]
    Processing,

    /// The checkout already completed.
    #[error("checkout is already complete")]
    Completed,

    /// The payment step finishes with submit, not advance.
    #[error("the payment step is completed by submitting the order")]
    SubmitRequired,

    /// Submit was called before reaching the payment step.
    #[error("cannot submit from the {0} step")]
    NotAtPayment(CheckoutStep),

    /// A settlement outcome arrived while nothing was processing.
    #[error("no payment is being processed")]
    NotProcessing,

    /// There is nothing in the cart to pay for.
    #[error("cart is empty")]
    EmptyCart,

    /// No form field has this name.
    #[error("unknown checkout field: {0}")]
    UnknownField(String),

    /// The country is not one of the selectable options.
    #[error("unsupported country: {0}")]
    InvalidCountry(String),
}

/// A wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Personal,
    Shipping,
    Payment,
    Complete,
}

impl CheckoutStep {
    /// Every step in order.
    pub const ALL: [Self; 4] = [Self::Personal, Self::Shipping, Self::Payment, Self::Complete];

    /// 1-based step number.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Personal => 1,
            Self::Shipping => 2,
            Self::Payment => 3,
            Self::Complete => 4,
        }
    }

    /// Progress indicator title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Personal => "Personal Info",
            Self::Shipping => "Shipping",
            Self::Payment => "Payment",
            Self::Complete => "Complete",
        }
    }

    /// Fields collected on this step.
    #[must_use]
    pub const fn fields(self) -> &'static [CheckoutField] {
        match self {
            Self::Personal => &[
                CheckoutField::FirstName,
                CheckoutField::LastName,
                CheckoutField::Email,
                CheckoutField::Phone,
            ],
            Self::Shipping => &[
                CheckoutField::Address,
                CheckoutField::City,
                CheckoutField::State,
                CheckoutField::ZipCode,
                CheckoutField::Country,
            ],
            Self::Payment => &[
                CheckoutField::CardNumber,
                CheckoutField::ExpiryDate,
                CheckoutField::Cvv,
                CheckoutField::CardName,
            ],
            Self::Complete => &[],
        }
    }

    const fn next(self) -> Self {
        match self {
            Self::Personal => Self::Shipping,
            Self::Shipping => Self::Payment,
            Self::Payment | Self::Complete => Self::Complete,
        }
    }

    const fn previous(self) -> Self {
        match self {
            Self::Personal | Self::Shipping => Self::Personal,
            Self::Payment => Self::Shipping,
            Self::Complete => Self::Payment,
        }
    }
}

impl core::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.title())
    }
}

/// One entry of the step progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepProgress {
    pub step: CheckoutStep,
    pub number: u8,
    pub title: &'static str,
    /// The current step or any before it.
    pub active: bool,
    /// Strictly before the current step.
    pub completed: bool,
}

/// Where the checkout is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckoutPhase {
    /// Accepting input.
    #[default]
    Editing,
    /// A settlement is in flight.
    Processing,
    /// The order was settled.
    Completed { confirmation: OrderConfirmation },
}

/// Result of [`CheckoutState::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to this step.
    Moved(CheckoutStep),
    /// The current step has this many invalid fields; nothing moved.
    Blocked(usize),
}

/// Result of [`CheckoutState::begin_submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submit {
    /// Processing started; settle this order.
    Started(PendingOrder),
    /// The payment step has this many invalid fields; nothing started.
    Blocked(usize),
}

/// State of one checkout session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckoutState {
    step: CheckoutStep,
    form: CheckoutForm,
    errors: FieldErrors,
    phase: CheckoutPhase,
    payment_error: Option<String>,
}

impl CheckoutState {
    /// A fresh checkout at the personal info step.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current step.
    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Values entered so far.
    #[must_use]
    pub const fn form(&self) -> &CheckoutForm {
        &self.form
    }

    /// Outstanding validation errors.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> &CheckoutPhase {
        &self.phase
    }

    /// Whether a settlement is in flight.
    #[must_use]
    pub const fn is_processing(&self) -> bool {
        matches!(self.phase, CheckoutPhase::Processing)
    }

    /// Whether the order was settled.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.phase, CheckoutPhase::Completed { .. })
    }

    /// Confirmation of the settled order.
    #[must_use]
    pub const fn confirmation(&self) -> Option<&OrderConfirmation> {
        match &self.phase {
            CheckoutPhase::Completed { confirmation } => Some(confirmation),
            _ => None,
        }
    }

    /// Why the last settlement failed, until the next submit.
    #[must_use]
    pub fn payment_error(&self) -> Option<&str> {
        self.payment_error.as_deref()
    }

    /// Progress indicator entries for every step.
    #[must_use]
    pub fn progress(&self) -> Vec<StepProgress> {
        CheckoutStep::ALL
            .into_iter()
            .map(|step| StepProgress {
                step,
                number: step.number(),
                title: step.title(),
                active: self.step >= step,
                completed: self.step > step,
            })
            .collect()
    }

    /// Validate the fields of `step` against the current form.
    #[must_use]
    pub fn validate(&self, step: CheckoutStep) -> FieldErrors {
        self.form.validate(step)
    }

    /// Update a field and clear that field's error.
    ///
    /// # Errors
    ///
    /// Rejected while processing or after completion, and for an unknown
    /// country.
    pub fn set_field(
        &mut self,
        field: CheckoutField,
        value: impl Into<String>,
    ) -> Result<(), CheckoutError> {
        self.ensure_editable()?;
        self.form.set(field, value)?;
        self.errors.clear(field);
        Ok(())
    }

    /// Update several fields at once. Either every field is applied or,
    /// on error, none is.
    ///
    /// # Errors
    ///
    /// Same as [`CheckoutState::set_field`].
    pub fn set_fields<I, V>(&mut self, fields: I) -> Result<(), CheckoutError>
    where
        I: IntoIterator<Item = (CheckoutField, V)>,
        V: Into<String>,
    {
        self.ensure_editable()?;
        let mut form = self.form.clone();
        let mut touched = Vec::new();
        for (field, value) in fields {
            form.set(field, value)?;
            touched.push(field);
        }
        self.form = form;
        for field in touched {
            self.errors.clear(field);
        }
        Ok(())
    }

    /// Move to the next step if the current one validates.
    ///
    /// On failure the step is unchanged and [`Self::errors`] holds one entry
    /// per invalid field.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::SubmitRequired`] on the payment step, and
    /// rejects calls while processing or after completion.
    pub fn advance(&mut self) -> Result<Advance, CheckoutError> {
        self.ensure_editable()?;
        if self.step == CheckoutStep::Payment {
            return Err(CheckoutError::SubmitRequired);
        }

        self.errors = self.validate(self.step);
        if !self.errors.is_empty() {
            return Ok(Advance::Blocked(self.errors.len()));
        }

        self.step = self.step.next();
        Ok(Advance::Moved(self.step))
    }

    /// Move back one step. Staying on the first step is not an error.
    ///
    /// # Errors
    ///
    /// Rejected while processing or after completion.
    pub fn retreat(&mut self) -> Result<CheckoutStep, CheckoutError> {
        self.ensure_editable()?;
        self.step = self.step.previous();
        Ok(self.step)
    }

    /// Validate the payment step and start processing.
    ///
    /// On [`Submit::Started`] the state is `Processing` until
    /// [`Self::finish_submit`] is called with the settlement outcome.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Processing`] for a duplicate submit,
    /// [`CheckoutError::NotAtPayment`] before the payment step, and
    /// [`CheckoutError::EmptyCart`] when there is nothing to pay for.
    pub fn begin_submit(&mut self, cart: &Cart) -> Result<Submit, CheckoutError> {
        self.ensure_editable()?;
        if self.step != CheckoutStep::Payment {
            return Err(CheckoutError::NotAtPayment(self.step));
        }

        self.errors = self.validate(CheckoutStep::Payment);
        if !self.errors.is_empty() {
            return Ok(Submit::Blocked(self.errors.len()));
        }

        let order = PendingOrder::capture(cart, &self.form)?;
        self.payment_error = None;
        self.phase = CheckoutPhase::Processing;
        Ok(Submit::Started(order))
    }

    /// Apply a settlement outcome.
    ///
    /// Success lands on `Complete`; failure returns to the payment step
    /// with the reason in [`Self::payment_error`].
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotProcessing`] if no submit is in flight.
    pub fn finish_submit(
        &mut self,
        outcome: Result<OrderConfirmation, SettlementError>,
    ) -> Result<(), CheckoutError> {
        if !self.is_processing() {
            return Err(CheckoutError::NotProcessing);
        }

        match outcome {
            Ok(confirmation) => {
                self.step = CheckoutStep::Complete;
                self.phase = CheckoutPhase::Completed { confirmation };
            }
            Err(error) => {
                self.phase = CheckoutPhase::Editing;
                self.payment_error = Some(error.to_string());
            }
        }
        Ok(())
    }

    const fn ensure_editable(&self) -> Result<(), CheckoutError> {
        match self.phase {
            CheckoutPhase::Editing => Ok(()),
            CheckoutPhase::Processing => Err(CheckoutError::Processing),
            CheckoutPhase::Completed { .. } => Err(CheckoutError::Completed),
        }
    }
}
