//! Trusted provider proxy.
//!
//! Holds the provider credential server-side; clients (the terminal REPL,
//! or a browser front-end) only ever talk to this endpoint. A request that
//! arrives while no credential is configured is rejected with 500 — it is
//! never forwarded upstream unauthenticated.

mod routes;

pub use routes::{ProxyState, proxy_router};
