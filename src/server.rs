use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use log::info;
use tokio::net::TcpListener;

use crate::handlers::{create_person, delete_person, get_person, list_persons, update_person};
use crate::stores::PersonStore;
use crate::Result;

/// The HTTP server of the person API.
///
/// Generic over the storage backend `E`. The store is acquired once at
/// startup and handed to every request handler as router state.
pub struct PersonServer<E: PersonStore> {
    store: E,
}

impl<E: PersonStore> PersonServer<E> {
    /// Creates a `PersonServer` over the given store.
    pub fn new(store: E) -> Self {
        Self { store }
    }

    /// Builds the router with all five person routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/persons", get(list_persons::<E>))
            .route("/person", post(create_person::<E>))
            .route(
                "/person/:id",
                get(get_person::<E>)
                    .put(update_person::<E>)
                    .delete(delete_person::<E>),
            )
            .with_state(self.store.clone())
    }

    /// Runs the server, listening for connections on the given address.
    pub async fn run(&self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on {}", listener.local_addr()?);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}
