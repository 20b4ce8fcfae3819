use crate::draw::geometry::Point;
use crate::draw::history::Editor;
use crate::draw::model::{Algorithm, Color, Entity, PrimitiveKind};
use crate::draw::raster::Rasterizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub background: Color,
    /// Pen for the control polygon drawn under curves.
    pub control_polygon: Color,
    /// Pen for the selection box.
    pub selection: Color,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            background: Color::WHITE,
            control_polygon: Color::BLUE,
            selection: Color::RED,
        }
    }
}

/// Paints the whole scene into a fresh RGBA buffer the size of the canvas.
pub fn render_scene_to_rgba(editor: &Editor, settings: RenderSettings) -> Vec<u8> {
    let canvas = editor.canvas();
    let (width, height) = (canvas.width, canvas.height);
    let mut pixels = vec![0u8; (width as usize) * (height as usize) * 4];
    clear_rgba_pixels(&mut pixels, settings.background);

    let raster = Rasterizer::new(*editor.settings());
    let mut target = Target {
        pixels: &mut pixels,
        width,
        height,
    };
    for entity in editor.entities() {
        render_entity_rgba(entity, &raster, settings, &mut target);
    }
    if let Some(overlay) = editor.clip_overlay() {
        render_entity_rgba(&overlay, &raster, settings, &mut target);
    }
    pixels
}

struct Target<'a> {
    pixels: &'a mut [u8],
    width: u32,
    height: u32,
}

impl Target<'_> {
    fn plot(&mut self, points: &[Point], color: Color) {
        for p in points {
            set_pixel_rgba(self.pixels, self.width, self.height, p.x, p.y, color);
        }
    }
}

fn render_entity_rgba(
    entity: &Entity,
    raster: &Rasterizer,
    settings: RenderSettings,
    target: &mut Target<'_>,
) {
    let points = entity.display_points(raster.settings());
    match raster.rasterize(entity.kind, &points, entity.algorithm) {
        Ok(pixels) => target.plot(&pixels, entity.color),
        Err(err) => {
            tracing::warn!(id = %entity.id, %err, "entity skipped while painting");
            return;
        }
    }

    if entity.kind == PrimitiveKind::Curve {
        let outline = raster.rasterize(PrimitiveKind::Polygon, &points, Algorithm::Bresenham);
        if let Ok(outline) = outline {
            target.plot(&outline, settings.control_polygon);
        }
    }

    if entity.selected {
        if let Some(bbox) = entity.bounding_box(raster.settings()) {
            let [lo, hi] = bbox.corners();
            let outline = [lo, Point::new(hi.x, lo.y), hi, Point::new(lo.x, hi.y)];
            let pixels = raster.rasterize(PrimitiveKind::Polygon, &outline, Algorithm::Bresenham);
            if let Ok(pixels) = pixels {
                target.plot(&pixels, settings.selection);
            }
        }
    }
}

fn clear_rgba_pixels(pixels: &mut [u8], color: Color) {
    let rgba = color.to_rgba_array();
    for px in pixels.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn set_pixel_rgba(pixels: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return;
    }
    let idx = (y as usize * width as usize + x as usize) * 4;
    if let Some(px) = pixels.get_mut(idx..idx + 4) {
        px.copy_from_slice(&color.to_rgba_array());
    }
}

#[cfg(test)]
mod tests {
    use super::{render_scene_to_rgba, RenderSettings};
    use crate::draw::{
        geometry::Point,
        history::{CanvasSize, Editor},
        model::{Algorithm, Color, PrimitiveKind, TransformKind},
        settings::GeometrySettings,
    };
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn editor(width: u32, height: u32) -> Editor {
        Editor::new(CanvasSize::new(width, height), GeometrySettings::default())
    }

    fn add(
        editor: &mut Editor,
        kind: PrimitiveKind,
        algorithm: Algorithm,
        points: &[(i32, i32)],
        color: Color,
    ) -> crate::draw::model::EntityId {
        let placement = editor
            .issue_primitive(
                kind,
                algorithm,
                points.iter().copied().map(Point::from).collect(),
                color,
            )
            .expect("issue primitive");
        editor.finish(&placement).expect("finish primitive");
        editor.end_placement();
        placement.id().clone()
    }

    fn pixel(pixels: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * width + x) * 4) as usize;
        [pixels[idx], pixels[idx + 1], pixels[idx + 2], pixels[idx + 3]]
    }

    fn pixel_hash(pixels: &[u8]) -> u64 {
        let mut hasher = DefaultHasher::new();
        pixels.hash(&mut hasher);
        hasher.finish()
    }

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];
    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    #[test]
    fn empty_scene_is_background() {
        let pixels = render_scene_to_rgba(&editor(2, 1), RenderSettings::default());
        assert_eq!(pixels, vec![255; 8]);

        let tinted = render_scene_to_rgba(
            &editor(1, 1),
            RenderSettings {
                background: Color::rgba(7, 8, 9, 255),
                ..RenderSettings::default()
            },
        );
        assert_eq!(tinted, vec![7, 8, 9, 255]);
    }

    #[test]
    fn line_pixels_are_painted_in_entity_color() {
        let mut editor = editor(8, 8);
        add(
            &mut editor,
            PrimitiveKind::Line,
            Algorithm::Bresenham,
            &[(1, 3), (6, 3)],
            Color::BLACK,
        );
        let pixels = render_scene_to_rgba(&editor, RenderSettings::default());
        for x in 1..=6 {
            assert_eq!(pixel(&pixels, 8, x, 3), BLACK);
        }
        assert_eq!(pixel(&pixels, 8, 0, 3), WHITE);
        assert_eq!(pixel(&pixels, 8, 7, 3), WHITE);
    }

    #[test]
    fn painting_is_bounds_safe() {
        let mut editor = editor(8, 8);
        add(
            &mut editor,
            PrimitiveKind::Line,
            Algorithm::Dda,
            &[(-20, -20), (40, 40)],
            Color::BLACK,
        );
        let pixels = render_scene_to_rgba(&editor, RenderSettings::default());
        assert_eq!(pixels.len(), 8 * 8 * 4);
        for i in 0..8 {
            assert_eq!(pixel(&pixels, 8, i, i), BLACK);
        }
    }

    #[test]
    fn selected_entity_gets_red_box() {
        let mut editor = editor(16, 16);
        let id = add(
            &mut editor,
            PrimitiveKind::Line,
            Algorithm::Bresenham,
            &[(4, 4), (10, 8)],
            Color::BLACK,
        );
        editor.select(Some(&id)).expect("select");
        let pixels = render_scene_to_rgba(&editor, RenderSettings::default());
        assert_eq!(pixel(&pixels, 16, 3, 3), RED);
        assert_eq!(pixel(&pixels, 16, 11, 9), RED);
        assert_eq!(pixel(&pixels, 16, 7, 3), RED);
    }

    #[test]
    fn curve_shows_blue_control_polygon() {
        let mut editor = editor(32, 32);
        add(
            &mut editor,
            PrimitiveKind::Curve,
            Algorithm::Bezier,
            &[(2, 20), (16, 2), (30, 20)],
            Color::BLACK,
        );
        let pixels = render_scene_to_rgba(&editor, RenderSettings::default());
        // Closing edge of the control polygon; the curve never reaches y = 20
        // away from its endpoints.
        assert_eq!(pixel(&pixels, 32, 16, 20), BLUE);
        assert_eq!(pixel(&pixels, 32, 16, 2), BLUE);
    }

    #[test]
    fn pending_transform_and_clip_overlay_are_previewed() {
        let mut editor = editor(32, 32);
        let id = add(
            &mut editor,
            PrimitiveKind::Line,
            Algorithm::Bresenham,
            &[(0, 0), (4, 0)],
            Color::BLACK,
        );
        let placement = editor
            .issue_transform(
                TransformKind::Translate,
                &id,
                vec![Point::new(0, 0), Point::new(10, 10)],
                Algorithm::None,
            )
            .expect("issue translate");
        let pixels = render_scene_to_rgba(&editor, RenderSettings::default());
        assert_eq!(pixel(&pixels, 32, 12, 10), BLACK);
        assert_eq!(pixel(&pixels, 32, 2, 0), WHITE);
        editor.finish(&placement).expect("finish translate");

        editor
            .issue_transform(
                TransformKind::Clip,
                &id,
                vec![Point::new(20, 20), Point::new(25, 25)],
                Algorithm::CohenSutherland,
            )
            .expect("issue clip");
        let pixels = render_scene_to_rgba(&editor, RenderSettings::default());
        assert_eq!(pixel(&pixels, 32, 20, 20), RED);
        assert_eq!(pixel(&pixels, 32, 25, 22), RED);
    }

    #[test]
    fn undo_redo_reproduces_pixels() {
        let mut editor = editor(64, 64);
        add(
            &mut editor,
            PrimitiveKind::Ellipse,
            Algorithm::None,
            &[(5, 5), (40, 30)],
            Color::BLUE,
        );
        add(
            &mut editor,
            PrimitiveKind::Polygon,
            Algorithm::Dda,
            &[(10, 40), (50, 40), (30, 60)],
            Color::BLACK,
        );
        let before = pixel_hash(&render_scene_to_rgba(&editor, RenderSettings::default()));

        editor.undo().expect("undo");
        let undone = pixel_hash(&render_scene_to_rgba(&editor, RenderSettings::default()));
        assert_ne!(before, undone);

        editor.redo().expect("redo");
        let after = pixel_hash(&render_scene_to_rgba(&editor, RenderSettings::default()));
        assert_eq!(before, after);
    }
}
