pub mod error;
pub mod geometry;
pub mod history;
pub mod input;
pub mod model;
pub mod raster;
pub mod render;
pub mod save;
pub mod settings;
pub mod transform;

pub use error::{EditorError, EditorResult};
pub use geometry::{Point, PointF};
pub use history::{CanvasSize, ClipStage, Command, Editor, Operation, Placement, SceneEvent};
pub use input::{CanvasInput, Tool};
pub use model::{Algorithm, Color, Entity, EntityDesc, EntityId, PrimitiveKind, TransformKind};
pub use raster::{rasterize, Rasterizer};
pub use render::{render_scene_to_rgba, RenderSettings};
pub use save::SessionFile;
pub use transform::{clip, p_transform, rotate, scale, translate, Angle, ClipRect};
