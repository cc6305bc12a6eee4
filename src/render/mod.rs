//! CPU rasterization of scenes onto the drawing surface (vello_cpu + parley).

pub(crate) mod blur;
pub mod surface;
pub mod text;
