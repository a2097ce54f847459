pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod service;

pub use config::AppConfig;
pub use error::{InvoiceError, NormalizeError, RenderError};
pub use render::{FontBook, InvoiceRenderer, TableRenderer};
pub use service::{InvoiceService, UpstreamClient};
