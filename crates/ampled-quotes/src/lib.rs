//! Ampled Quotes - periodic quotation announcer
//!
//! Fetches a quote from a [`QuoteSource`] on a fixed interval and hands it to
//! an [`Announcer`]. [`QuoteTask`] plugs the loop into the plugin lifecycle as
//! an [`ampled_core::SideTask`], so a policy-disabled plugin silences it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod announcer;
pub mod config;
pub mod error;
pub mod source;

pub use announcer::{Announcer, LogAnnouncer, QuoteAnnouncer, QuoteTask};
pub use config::QuoteConfig;
pub use error::{QuoteError, Result};
pub use source::{parse_forismatic, ForismaticSource, Quote, QuoteSource, FORISMATIC_ENDPOINT};
