mod app_secret_proof;
mod client;
mod default_client;
mod error_mapper;
mod json_mapper;
mod multiquery;
mod pages;
mod signed_request;
mod utils;

pub use app_secret_proof::*;
pub use client::*;
pub use default_client::*;
pub use error_mapper::*;
pub use json_mapper::*;
pub use multiquery::*;
pub use pages::*;
pub use signed_request::*;
pub use utils::*;

pub mod domain {
    pub use graph_domain::*;
}
