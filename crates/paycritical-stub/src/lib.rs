// SPDX-License-Identifier: BUSL-1.1
//! # paycritical-stub -- In-memory Paycritical gateway simulator
//!
//! Answers the POS endpoints `paycritical-client` calls, backed by DashMap
//! storage that is lost on restart. Extra `/simulator` routes play the
//! customer's side so a payment can be accepted, rejected or paid without a
//! phone in the loop.
//!
//! Used standalone through the `paycritical-stub` binary, or in-process from
//! tests via [`serve`].

pub mod routes;
pub mod store;

pub use store::AppState;

/// Serve the simulator on an already bound listener until the task is
/// dropped or the listener fails.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, routes::router(state).into_make_service()).await
}
