pub mod extractor;
pub mod handlers;
pub mod protocol;
pub mod routes;
pub mod sessions;
pub mod state;
