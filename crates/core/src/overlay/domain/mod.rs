pub mod overlay_positioning;
pub mod overlay_renderer;
