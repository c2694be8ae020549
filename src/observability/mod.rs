pub mod metrics;
pub mod observer;
pub mod routes;
