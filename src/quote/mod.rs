//! Quote source - real-time price lookups

pub mod parse;
pub mod sina;

pub use parse::parse_quote_line;
pub use sina::SinaQuoteClient;
