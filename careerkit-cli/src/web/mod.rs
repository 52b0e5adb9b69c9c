//! Browser front end - server-rendered HTML over axum

mod pages;
mod routes;

pub use routes::{router, AppState};
