#![forbid(unsafe_code)]

//! Run a batch of [`MutationRequest`]s against an [`EntityStore`].
//!
//! Requests within a batch are independent, so [`execute_concurrent`] issues
//! them in parallel on scoped threads. Responses come back in request order
//! either way.

use std::thread;

use crate::dispatcher::{MutationRequest, MutationResponse};
use crate::error::StoreError;
use crate::store::EntityStore;

/// Perform each request in turn.
pub fn execute<S: EntityStore + ?Sized>(
    store: &S,
    requests: &[MutationRequest],
) -> Vec<MutationResponse> {
    requests
        .iter()
        .map(|request| request.respond(store.update_entity(request.entity, request.patch)))
        .collect()
}

/// Perform the requests of one batch in parallel.
///
/// A panicking store call is reported as a transport failure for that
/// request.
pub fn execute_concurrent<S: EntityStore + Sync + ?Sized>(
    store: &S,
    requests: &[MutationRequest],
) -> Vec<MutationResponse> {
    if requests.len() <= 1 {
        return execute(store, requests);
    }

    thread::scope(|scope| {
        let handles: Vec<_> = requests
            .iter()
            .map(|request| {
                scope.spawn(move || {
                    request.respond(store.update_entity(request.entity, request.patch))
                })
            })
            .collect();

        handles
            .into_iter()
            .zip(requests)
            .map(|(handle, request)| {
                handle.join().unwrap_or_else(|_| {
                    tracing::error!(
                        target: "menusort.sync",
                        entity = request.entity.0,
                        "store call panicked"
                    );
                    request.respond(Err(StoreError::Transport("store call panicked".into())))
                })
            })
            .collect()
    })
}
