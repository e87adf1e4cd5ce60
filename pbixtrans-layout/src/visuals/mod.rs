//! Built-in visual handlers

pub mod literal;
pub mod slicer;
pub mod textbox;

pub use literal::LiteralTextHandler;
pub use slicer::SlicerHandler;
pub use textbox::TextboxHandler;
