//! Who is signed in on this client.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use quickcart_core::UserId;

/// Supplies the authenticated user, if any.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The current user, or `None` when signed out.
    async fn current_user(&self) -> Option<UserId>;
}

#[async_trait]
impl<T: SessionProvider + ?Sized> SessionProvider for Arc<T> {
    async fn current_user(&self) -> Option<UserId> {
        (**self).current_user().await
    }
}

/// Session held in memory, updated on sign-in and sign-out.
#[derive(Debug, Default)]
pub struct StaticSession {
    user: RwLock<Option<UserId>>,
}

impl StaticSession {
    /// A signed-out session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session signed in as `user`.
    #[must_use]
    pub fn signed_in(user: impl Into<UserId>) -> Self {
        Self {
            user: RwLock::new(Some(user.into())),
        }
    }

    pub fn sign_in(&self, user: impl Into<UserId>) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user.into());
    }

    pub fn sign_out(&self) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_user(&self) -> Option<UserId> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|user| !user.is_blank())
    }
}
