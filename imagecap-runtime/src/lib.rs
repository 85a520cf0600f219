pub mod caption;
pub mod config_store;
pub mod defaults;
pub mod fs;
pub mod runtime_view;
