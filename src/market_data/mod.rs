// =============================================================================
// Market Data Module
// =============================================================================
//
// Optional live quotes consumed by the Timing factor. The ranking pipeline
// only ever sees a `MarketSnapshot`; how it was filled is this module's
// concern.

pub mod quote_client;

pub use quote_client::{LiveQuote, MarketSnapshot, QuoteClient};
