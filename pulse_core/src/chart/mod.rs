pub mod config;
pub mod raster;
pub mod renderer;
pub mod spec;
pub mod surface;

pub use config::{ChartConfig, Color};
pub use renderer::{ChartData, ChartRenderer};
pub use spec::{ChartSpec, Overlays};
pub use surface::{DrawingSurface, Point, TextAlign};
