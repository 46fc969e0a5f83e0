//! Checkout orchestration.
//!
//! [`CheckoutOrchestrator::submit`] turns a cart snapshot into an order:
//!
//! 1. require a signed-in user
//! 2. require a non-empty cart
//! 3. validate customer info (required when configured so)
//! 4. price the cart
//! 5. call the order endpoint exactly once
//! 6. on success clear the cached cart; on failure leave it untouched
//!
//! Each call is one attempt moving through
//! `Idle -> Validating -> Submitting -> {Succeeded, Failed}`. While an attempt
//! is `Submitting`, further calls are rejected with
//! [`CheckoutError::SubmissionInProgress`] so a double tap cannot create two
//! orders. The guard is local to this instance.

use std::sync::{Mutex, PoisonError};

use quickcart_core::{
    Cart, CartTotals, CreateOrderRequest, CustomerField, CustomerInfo, Money, MoneyError, OrderId,
};
use tracing::{info, instrument, warn};

use crate::cache::{CART_CACHE_KEY, CartCache};
use crate::config::CheckoutConfig;
use crate::endpoint::OrderEndpoint;
use crate::error::CheckoutError;
use crate::session::SessionProvider;

/// Where the current (or most recent) checkout attempt stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded(OrderId),
    Failed,
}

/// Checkout behavior that is not tied to a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutPolicy {
    /// Flat fee added to non-empty carts.
    pub delivery_fee: Money,
    /// Reject submissions without valid customer info.
    pub require_customer_info: bool,
}

impl From<&CheckoutConfig> for CheckoutPolicy {
    fn from(config: &CheckoutConfig) -> Self {
        Self {
            delivery_fee: config.delivery_fee,
            require_customer_info: config.require_customer_info,
        }
    }
}

/// Coordinates the session, the order endpoint and the cart cache for one
/// client.
pub struct CheckoutOrchestrator<S, E, C> {
    session: S,
    endpoint: E,
    cache: C,
    policy: CheckoutPolicy,
    state: Mutex<CheckoutState>,
}

impl<S, E, C> CheckoutOrchestrator<S, E, C>
where
    S: SessionProvider,
    E: OrderEndpoint,
    C: CartCache,
{
    pub fn new(session: S, endpoint: E, cache: C, policy: CheckoutPolicy) -> Self {
        Self {
            session,
            endpoint,
            cache,
            policy,
            state: Mutex::new(CheckoutState::Idle),
        }
    }

    /// State of the current or last attempt.
    pub fn state(&self) -> CheckoutState {
        self.lock_state().clone()
    }

    /// Subtotal, delivery fee and total for `cart`. Pure.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::TooLarge` if the total exceeds [`Money::MAX`].
    pub fn compute_totals(&self, cart: &Cart) -> Result<CartTotals, MoneyError> {
        cart.totals(self.policy.delivery_fee)
    }

    /// Place an order for `cart`.
    ///
    /// # Errors
    ///
    /// - `NotAuthenticated` if nobody is signed in
    /// - `EmptyCart` if the cart has no lines
    /// - `InvalidCustomerInfo` if customer info is invalid, or missing when required
    /// - `TotalOutOfRange` if the cart's total is too large to place
    /// - `SubmissionInProgress` if another attempt is still waiting on the endpoint
    /// - `EndpointFailure` / `Network` if the endpoint refused or could not be reached
    #[instrument(skip_all, fields(lines = cart.len()))]
    pub async fn submit(
        &self,
        cart: &Cart,
        customer_info: Option<&CustomerInfo>,
    ) -> Result<OrderId, CheckoutError> {
        if *self.lock_state() == CheckoutState::Submitting {
            warn!("Checkout already in progress, ignoring submit");
            return Err(CheckoutError::SubmissionInProgress);
        }
        self.set_unless_submitting(CheckoutState::Validating);

        let request = match self.prepare(cart, customer_info).await {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "Checkout rejected before submission");
                self.set_unless_submitting(CheckoutState::Failed);
                return Err(err);
            }
        };

        let guard = SubmitGuard::enter(&self.state)?;

        match self.endpoint.create_order(&request).await {
            Ok(order_id) => {
                info!(order_id = %order_id, user_id = %request.user_id, "Order placed");
                if let Err(e) = self.cache.remove(CART_CACHE_KEY).await {
                    // The order exists; a stale cart is the lesser problem
                    warn!(error = %e, order_id = %order_id, "Failed to clear cart cache");
                }
                guard.finish(CheckoutState::Succeeded(order_id.clone()));
                Ok(order_id)
            }
            Err(e) => {
                warn!(error = %e, "Order endpoint call failed");
                guard.finish(CheckoutState::Failed);
                Err(e.into())
            }
        }
    }

    /// Steps 1-4: everything before the endpoint call.
    async fn prepare(
        &self,
        cart: &Cart,
        customer_info: Option<&CustomerInfo>,
    ) -> Result<CreateOrderRequest, CheckoutError> {
        let user_id = self
            .session
            .current_user()
            .await
            .ok_or(CheckoutError::NotAuthenticated)?;

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        match customer_info {
            Some(info) => info
                .validate()
                .map_err(|e| CheckoutError::InvalidCustomerInfo(e.fields))?,
            None if self.policy.require_customer_info => {
                return Err(CheckoutError::InvalidCustomerInfo(CustomerField::ALL.to_vec()));
            }
            None => {}
        }

        let totals = self.compute_totals(cart)?;

        Ok(CreateOrderRequest::new(
            cart,
            user_id,
            totals.total,
            customer_info.cloned(),
        ))
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, CheckoutState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_unless_submitting(&self, next: CheckoutState) {
        let mut state = self.lock_state();
        if *state != CheckoutState::Submitting {
            *state = next;
        }
    }
}

/// Ownership of the `Submitting` state for one attempt.
///
/// Dropping the guard without calling [`SubmitGuard::finish`] (the attempt's
/// future was dropped mid-flight) records the attempt as failed.
struct SubmitGuard<'a> {
    state: &'a Mutex<CheckoutState>,
    finished: bool,
}

impl<'a> SubmitGuard<'a> {
    fn enter(state: &'a Mutex<CheckoutState>) -> Result<Self, CheckoutError> {
        let mut current = state.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == CheckoutState::Submitting {
            return Err(CheckoutError::SubmissionInProgress);
        }
        *current = CheckoutState::Submitting;
        Ok(Self {
            state,
            finished: false,
        })
    }

    fn finish(mut self, outcome: CheckoutState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = outcome;
        self.finished = true;
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *self.state.lock().unwrap_or_else(PoisonError::into_inner) = CheckoutState::Failed;
        }
    }
}
