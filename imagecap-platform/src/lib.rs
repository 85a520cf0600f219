pub mod clipboard;
pub mod picker;
pub mod preview;
