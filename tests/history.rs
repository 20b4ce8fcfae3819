use vecdraw::draw::{
    Algorithm, Color, Editor, EditorError, EntityId, Operation, Point, PrimitiveKind,
    TransformKind,
};

fn pts(raw: &[(i32, i32)]) -> Vec<Point> {
    raw.iter().copied().map(Point::from).collect()
}

fn create(
    editor: &mut Editor,
    kind: PrimitiveKind,
    algorithm: Algorithm,
    raw: &[(i32, i32)],
) -> EntityId {
    create_colored(editor, kind, algorithm, raw, Color::BLACK)
}

fn create_colored(
    editor: &mut Editor,
    kind: PrimitiveKind,
    algorithm: Algorithm,
    raw: &[(i32, i32)],
    color: Color,
) -> EntityId {
    let placement = editor
        .issue_primitive(kind, algorithm, pts(raw), color)
        .unwrap();
    editor.finish(&placement).unwrap();
    editor.end_placement();
    placement.id().clone()
}

fn transform(
    editor: &mut Editor,
    kind: TransformKind,
    id: &EntityId,
    handles: &[(i32, i32)],
    algorithm: Algorithm,
) {
    let placement = editor
        .issue_transform(kind, id, pts(handles), algorithm)
        .unwrap();
    assert!(editor.finish(&placement).unwrap());
}

fn points(editor: &Editor, id: &EntityId) -> Vec<Point> {
    editor.entity(id).unwrap().control_points.clone()
}

#[test]
fn clip_finish_undo_restores_original_segment() {
    let mut editor = Editor::default();
    let id = create(&mut editor, PrimitiveKind::Line, Algorithm::Dda, &[(-5, 5), (15, 5)]);
    transform(&mut editor, TransformKind::Clip, &id, &[(0, 0), (10, 10)], Algorithm::LiangBarsky);
    assert_eq!(points(&editor, &id), pts(&[(0, 5), (10, 5)]));

    editor.undo().unwrap();
    assert_eq!(points(&editor, &id), pts(&[(-5, 5), (15, 5)]));
}

#[test]
fn rejected_clip_empties_line_until_undone() {
    let mut editor = Editor::default();
    let id = create(&mut editor, PrimitiveKind::Line, Algorithm::Dda, &[(-9, 1), (-2, 8)]);
    transform(
        &mut editor,
        TransformKind::Clip,
        &id,
        &[(0, 0), (10, 10)],
        Algorithm::CohenSutherland,
    );
    assert!(points(&editor, &id).is_empty());
    assert!(!editor.can_clip(&id));

    editor.undo().unwrap();
    assert_eq!(points(&editor, &id), pts(&[(-9, 1), (-2, 8)]));
    assert!(editor.can_clip(&id));
}

#[test]
fn chained_transforms_unwind_in_reverse() {
    let mut editor = Editor::default();
    let id = create(
        &mut editor,
        PrimitiveKind::Polygon,
        Algorithm::Bresenham,
        &[(10, 10), (30, 10), (20, 30)],
    );
    let original = points(&editor, &id);

    transform(&mut editor, TransformKind::Translate, &id, &[(0, 0), (5, -3)], Algorithm::None);
    transform(&mut editor, TransformKind::Scale, &id, &[(10, 10), (110, 60)], Algorithm::None);
    let scaled = points(&editor, &id);
    assert_eq!(scaled, pts(&[(20, 7), (60, 7), (40, 27)]));

    editor.undo().unwrap();
    editor.undo().unwrap();
    assert_eq!(points(&editor, &id), original);

    editor.redo().unwrap();
    editor.redo().unwrap();
    assert_eq!(points(&editor, &id), scaled);
}

#[test]
fn rotate_quarter_turn_and_back() {
    let mut editor = Editor::default();
    let id = create(&mut editor, PrimitiveKind::Line, Algorithm::Bresenham, &[(0, 0), (10, 0)]);
    transform(&mut editor, TransformKind::Rotate, &id, &[(0, 0), (0, 25)], Algorithm::None);
    assert_eq!(points(&editor, &id), pts(&[(0, 0), (0, 10)]));
    editor.undo().unwrap();
    assert_eq!(points(&editor, &id), pts(&[(0, 0), (10, 0)]));
}

#[test]
fn delete_undo_keeps_identity_and_history() {
    let mut editor = Editor::default();
    let a = create(&mut editor, PrimitiveKind::Rect, Algorithm::None, &[(0, 0), (5, 5)]);
    let b = create_colored(
        &mut editor,
        PrimitiveKind::Ellipse,
        Algorithm::None,
        &[(0, 0), (8, 4)],
        Color::RED,
    );
    editor.delete(&b).unwrap();
    editor.undo().unwrap();
    let back = editor.entity(&b).unwrap();
    assert_eq!(back.kind, PrimitiveKind::Ellipse);
    assert_eq!(back.color, Color::RED);
    assert_eq!(back.control_points, pts(&[(0, 0), (8, 4)]));

    editor.delete(&a).unwrap();
    assert!(matches!(
        editor.undo_stack().last().map(|c| &c.op),
        Some(Operation::Delete(_))
    ));

    editor.undo().unwrap();
    let ids: Vec<_> = editor.entities().map(|e| e.id.clone()).collect();
    assert_eq!(ids, vec![b, a.clone()]);
    assert_eq!(points(&editor, &a), pts(&[(0, 0), (5, 5)]));
}

#[test]
fn stale_placement_is_a_precondition_violation() {
    let mut editor = Editor::default();
    let placement = editor
        .issue_primitive(
            PrimitiveKind::Line,
            Algorithm::Naive,
            pts(&[(0, 0), (0, 0)]),
            Color::BLACK,
        )
        .unwrap();
    assert!(editor.finish(&placement).unwrap());
    assert!(matches!(
        editor.move_last_point(&placement, Point::new(3, 3)),
        Err(EditorError::PreconditionViolation(_))
    ));
    assert!(matches!(
        editor.finish(&placement),
        Err(EditorError::PreconditionViolation(_))
    ));
}

#[test]
fn mismatched_algorithm_is_rejected_up_front() {
    let mut editor = Editor::default();
    assert!(matches!(
        editor.issue_primitive(
            PrimitiveKind::Curve,
            Algorithm::Dda,
            pts(&[(0, 0)]),
            Color::BLACK
        ),
        Err(EditorError::InvalidArgument(_))
    ));
    assert!(!editor.can_undo());
}
