pub mod caption;
pub mod parse;
pub mod request;
pub mod runtime;
