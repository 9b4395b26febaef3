//! Checkout route handlers.
//!
//! One checkout session is live at a time. Starting a new one abandons the
//! previous session, cancelling its settlement if one is running. Submit
//! answers `202 Accepted` and settles in a background task; clients poll
//! `GET /checkout` until the status leaves `processing`.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use digital_store_core::checkout::{CheckoutField, CheckoutState, Country, StepProgress, Submit};
use serde::Serialize;
use tracing::{error, instrument};
use uuid::Uuid;

use super::cart::CartView;
use crate::error::{AppError, Result};
use crate::services::CheckoutSession;
use crate::state::AppState;

/// Checkout display data.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub state: CheckoutState,
    pub is_processing: bool,
    pub is_completed: bool,
    pub steps: Vec<StepProgress>,
    pub countries: Vec<&'static str>,
    /// Live order summary from the shared cart.
    pub summary: CartView,
}

impl From<&CheckoutSession> for CheckoutView {
    fn from(session: &CheckoutSession) -> Self {
        let state = session.state();
        Self {
            session_id: session.id(),
            is_processing: state.is_processing(),
            is_completed: state.is_completed(),
            steps: state.progress(),
            countries: Country::ALL.into_iter().map(Country::label).collect(),
            summary: CartView::from(&session.cart().snapshot()),
            state,
        }
    }
}

fn current_session(state: &AppState) -> Result<CheckoutSession> {
    state
        .checkout()
        .ok_or_else(|| AppError::NotFound("checkout session".to_string()))
}

/// Start a fresh checkout session.
#[instrument(skip(state))]
pub async fn start(State(state): State<AppState>) -> (StatusCode, Json<CheckoutView>) {
    let session = state.start_checkout();
    (StatusCode::CREATED, Json(CheckoutView::from(&session)))
}

/// Current checkout state.
pub async fn show(State(state): State<AppState>) -> Result<Json<CheckoutView>> {
    let session = current_session(&state)?;
    Ok(Json(CheckoutView::from(&session)))
}

/// Abandon the current checkout session.
#[instrument(skip(state))]
pub async fn abandon(State(state): State<AppState>) -> Result<StatusCode> {
    if state.abandon_checkout() {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("checkout session".to_string()))
    }
}

/// Update form fields. Body: `{"firstName": "Ada", ...}`.
#[instrument(skip(state, fields))]
pub async fn update_fields(
    State(state): State<AppState>,
    Json(fields): Json<BTreeMap<String, String>>,
) -> Result<Json<CheckoutView>> {
    let session = current_session(&state)?;
    let fields = fields
        .into_iter()
        .map(|(name, value)| -> Result<_> { Ok((name.parse::<CheckoutField>()?, value)) })
        .collect::<Result<Vec<_>>>()?;
    session.set_fields(fields)?;
    Ok(Json(CheckoutView::from(&session)))
}

/// Advance to the next step. Invalid fields are reported in `errors`.
pub async fn next(State(state): State<AppState>) -> Result<Json<CheckoutView>> {
    let session = current_session(&state)?;
    session.advance()?;
    Ok(Json(CheckoutView::from(&session)))
}

/// Go back one step.
pub async fn back(State(state): State<AppState>) -> Result<Json<CheckoutView>> {
    let session = current_session(&state)?;
    session.retreat()?;
    Ok(Json(CheckoutView::from(&session)))
}

/// Submit the order.
///
/// Responds `202 Accepted` once settlement has started, or `200 OK` with
/// the payment step's errors if it did not validate.
#[instrument(skip(state))]
pub async fn submit(State(state): State<AppState>) -> Result<Response> {
    let session = current_session(&state)?;

    let order = match session.begin_submit()? {
        Submit::Started(order) => order,
        Submit::Blocked(_) => return Ok(Json(CheckoutView::from(&session)).into_response()),
    };

    let task_session = session.clone();
    let processor = state.processor().clone();
    tokio::spawn(async move {
        if let Err(e) = task_session.settle(&processor, order).await {
            error!(error = %e, "Settlement result could not be applied");
        }
    });

    Ok((StatusCode::ACCEPTED, Json(CheckoutView::from(&session))).into_response())
}
