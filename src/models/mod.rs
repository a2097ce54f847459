pub mod invoice;
pub mod upstream;

pub use invoice::{Invoice, LineItem, OrderSummary, TaxLine};
pub use upstream::{OrderDelivery, OrderRecord, OrderTax, OrderUser, OrderedItem, ShopRecord};
