pub mod bucket;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod output;
pub mod render;
