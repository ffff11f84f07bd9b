//! Core data types for the volatility snapshot service
//!
//! Defines fundamental types:
//! - OptionQuote: raw bid/ask per strike and expiration
//! - MarketContext: spot, rates, valuation date for one attempt
//! - SurfacePoint / SurfaceSnapshot: the solved surface and its unit of persistence
//! - Instrument: a tracked symbol

pub mod error;
pub mod quote;
pub mod surface;

pub use error::*;
pub use quote::*;
pub use surface::*;
