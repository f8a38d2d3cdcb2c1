pub mod fs;
pub mod html;
pub mod logging;
pub mod text;

pub use text::clean_text;
