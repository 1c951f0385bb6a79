pub mod autofill;
pub mod config;
pub mod dom;
pub mod errors;
pub mod routes;
pub mod state;
