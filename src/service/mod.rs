pub mod client;
pub mod invoice;
pub mod normalizer;

pub use client::{RawPayloads, UpstreamClient};
pub use invoice::{InvoiceService, RenderedInvoice};
pub use normalizer::{merge, normalize};
