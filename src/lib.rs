//! Interactive bubble canvas: a force-directed node graph with pan, zoom,
//! menus, linking and JSON persistence.

pub mod app;
pub mod canvas;
pub mod geometry;
pub mod graph;
pub mod physics;
pub mod scheduler;
pub mod viewport;
