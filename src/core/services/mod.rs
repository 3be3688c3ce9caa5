pub mod fingerprint;
pub mod key_parser;
pub mod key_store;
