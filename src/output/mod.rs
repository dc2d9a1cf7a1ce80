// Output generation module

pub mod html;
pub mod templates;

pub use html::*;
pub use templates::*;
