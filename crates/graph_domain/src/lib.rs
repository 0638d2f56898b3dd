mod access_token;
mod attachment;
mod batch;
mod connection;
mod debug_token;
mod error;
mod graph_config;
mod http_config;
mod infra;
mod parameter;
mod query;
pub mod serde_ext;

pub use access_token::*;
pub use attachment::*;
pub use batch::*;
pub use connection::*;
pub use debug_token::*;
pub use error::*;
pub use graph_config::*;
pub use http_config::*;
pub use infra::*;
pub use parameter::*;
pub use query::*;
