//! DcaProvider 구현체.

mod kraken;

pub use kraken::KrakenProvider;
