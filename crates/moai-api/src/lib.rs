mod error;
pub use error::ApiError;

mod handler;
pub use handler::JobHandler;

mod adapter;
pub use adapter::CoreAdapter;

mod http;
pub use http::HttpApi;

pub use axum;
