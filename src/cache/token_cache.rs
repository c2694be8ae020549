use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::debug;

use crate::cache::token::Token;
use crate::errors::FetchError;
use crate::sources::fetch::TokenFetcher;

type PendingFetch = Shared<BoxFuture<'static, Result<Token, FetchError>>>;

enum Slot {
    Empty,
    /// One fetch in flight; every caller arriving now awaits this future.
    Pending { generation: u64, fetch: PendingFetch },
    Ready(Token),
}

struct CacheState {
    slot: Slot,
    /// bumped each time a fetch is started, so only the outcome of the
    /// fetch currently installed may settle the slot
    generation: u64,
}

/// Single-slot token cache with single-flight population.
///
/// The slot is shared by every identifier: the first token fetched serves
/// all callers for the lifetime of the cache. Per-identifier caching would
/// have to key the slot by identifier explicitly.
///
/// - hit: the stored token is returned, the fetcher is not invoked
/// - cold: exactly one fetch runs, concurrent callers share its outcome
/// - failed fetch: the slot returns to empty, the next caller fetches again
///
/// The shared fetch settles the slot itself before yielding its outcome, so
/// a caller never joins a fetch that has already finished.
pub struct TokenCache {
    // never held across an await
    state: Arc<Mutex<CacheState>>,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCache {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState {
                slot: Slot::Empty,
                generation: 0,
            })),
        }
    }

    pub async fn get_or_fetch<F>(
        &self,
        identifier: &str,
        fetcher: Arc<F>,
    ) -> Result<Token, FetchError>
    where
        F: TokenFetcher + 'static,
    {
        let fetch = {
            let mut state = lock(&self.state);
            let pending = match &state.slot {
                Slot::Ready(token) => {
                    debug!(identifier, "token cache hit");
                    return Ok(token.clone());
                }
                Slot::Pending { fetch, .. } => Some(fetch.clone()),
                Slot::Empty => None,
            };

            match pending {
                Some(fetch) => {
                    debug!(identifier, "joining in-flight token fetch");
                    fetch
                }
                None => {
                    debug!(identifier, "token cache miss, starting fetch");
                    state.generation += 1;
                    let generation = state.generation;
                    let fetch = settling_fetch(
                        Arc::downgrade(&self.state),
                        generation,
                        identifier.to_owned(),
                        fetcher,
                    );
                    state.slot = Slot::Pending {
                        generation,
                        fetch: fetch.clone(),
                    };
                    fetch
                }
            }
        };

        // the slot keeps its own handle on the fetch, so a cancelled caller
        // leaves it resumable by the next one
        fetch.await
    }

    /// Currently cached token, without fetching
    #[cfg(test)]
    pub(crate) fn peek(&self) -> Option<Token> {
        match &lock(&self.state).slot {
            Slot::Ready(token) => Some(token.clone()),
            Slot::Empty | Slot::Pending { .. } => None,
        }
    }
}

fn lock(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fetch that stores its outcome in the slot in the same poll that
/// completes it. Holds the state weakly; the slot owns the fetch.
fn settling_fetch<F>(
    state: Weak<Mutex<CacheState>>,
    generation: u64,
    identifier: String,
    fetcher: Arc<F>,
) -> PendingFetch
where
    F: TokenFetcher + 'static,
{
    async move {
        let outcome = fetcher.fetch(&identifier).await;
        if let Some(shared_state) = state.upgrade() {
            let mut state = lock(&shared_state);
            let installed = matches!(
                &state.slot,
                Slot::Pending { generation: current, .. } if *current == generation
            );
            if installed {
                state.slot = match &outcome {
                    Ok(token) => Slot::Ready(token.clone()),
                    Err(_) => Slot::Empty,
                };
            }
        }
        outcome
    }
    .boxed()
    .shared()
}
