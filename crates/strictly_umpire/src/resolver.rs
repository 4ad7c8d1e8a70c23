//! Move resolver contract.

use crate::{MoveToken, ResolveError};
use async_trait::async_trait;

/// Turns free-form text into a candidate move token.
///
/// Resolvers are advisory: the umpire never trusts them for legality. They
/// must not mutate game state and may be slow (network, model inference),
/// which is why resolution is the one suspension point of a submission.
#[async_trait]
pub trait MoveResolver<S: Sync>: Send + Sync {
    /// Extracts a single move token from `text` given the current `state`.
    async fn resolve(&self, text: &str, state: &S) -> Result<MoveToken, ResolveError>;
}

#[async_trait]
impl<S, R> MoveResolver<S> for std::sync::Arc<R>
where
    S: Sync,
    R: MoveResolver<S> + ?Sized,
{
    async fn resolve(&self, text: &str, state: &S) -> Result<MoveToken, ResolveError> {
        (**self).resolve(text, state).await
    }
}

#[async_trait]
impl<S: Sync> MoveResolver<S> for Box<dyn MoveResolver<S>> {
    async fn resolve(&self, text: &str, state: &S) -> Result<MoveToken, ResolveError> {
        (**self).resolve(text, state).await
    }
}
