pub mod domain;
pub mod infrastructure;
pub mod overlay_driver;
