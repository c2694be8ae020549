//! Token sources: the authorization exchange that produces a [`Token`](crate::cache::token::Token).

pub mod fetch;

pub use fetch::{HttpTokenFetcher, TokenFetcher};
