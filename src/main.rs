use std::path::PathBuf;

use anyhow::Context;
use vecdraw::draw::{render_scene_to_rgba, Rasterizer, RenderSettings};
use vecdraw::settings::Settings;

/// Replays a saved session and prints what it contains.
fn main() -> anyhow::Result<()> {
    let settings = Settings::load("settings.json")?;
    let _guard = vecdraw::logging::init(settings.debug_logging, settings.log_file.clone());

    let session = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: vecdraw <session.json>")?;

    let mut editor = settings.new_editor();
    editor.load_from_path(&session)?;

    let raster = Rasterizer::new(*editor.settings());
    for entity in editor.entities() {
        let points = entity.display_points(raster.settings());
        let pixels = raster
            .rasterize(entity.kind, &points, entity.algorithm)
            .map(|p| p.len())
            .unwrap_or_default();
        println!(
            "{:>4} {:<8} {:<16} {:>3} control points {:>6} pixels",
            entity.id,
            entity.kind,
            entity.algorithm,
            entity.control_points.len(),
            pixels
        );
    }

    let background = RenderSettings::default().background.to_rgba_array();
    let painted = render_scene_to_rgba(&editor, RenderSettings::default())
        .chunks_exact(4)
        .filter(|px| *px != background)
        .count();
    let canvas = editor.canvas();
    println!(
        "{} entities, {} undo / {} redo, {painted} of {}x{} pixels painted",
        editor.len(),
        editor.undo_stack().len(),
        editor.redo_stack().len(),
        canvas.width,
        canvas.height
    );
    Ok(())
}
