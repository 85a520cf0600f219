pub mod state;
pub mod traits;
pub mod view;
