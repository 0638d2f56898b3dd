mod env;
mod http;
mod sanitize;

pub use env::*;
pub use http::*;
pub use sanitize::*;
