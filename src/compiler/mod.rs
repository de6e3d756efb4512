pub mod core;
pub mod loader;
pub mod seed;
pub mod template;
