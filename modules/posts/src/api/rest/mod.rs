//! REST surface mounted under `/post`.

pub mod dto;
pub mod error;
mod handlers;
pub mod routes;
