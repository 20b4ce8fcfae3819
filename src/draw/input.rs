use crate::draw::error::{EditorError, EditorResult};
use crate::draw::geometry::Point;
use crate::draw::history::{Editor, Placement};
use crate::draw::model::{Algorithm, Color, EntityId, PrimitiveKind, TransformKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Idle,
    Draw {
        kind: PrimitiveKind,
        algorithm: Algorithm,
    },
    Transform {
        kind: TransformKind,
        algorithm: Algorithm,
    },
}

/// Turns pointer gestures into editor commands.
///
/// A press starts a primitive (or a transform on the selection) with both
/// points at the cursor, moving drags the last point and release finishes.
/// Polygons and curves keep taking one vertex per press until another tool is
/// started.
#[derive(Debug, Clone)]
pub struct CanvasInput {
    editor: Editor,
    tool: Tool,
    color: Color,
    active: Option<Placement>,
}

impl CanvasInput {
    pub fn new(editor: Editor) -> Self {
        Self {
            editor,
            tool: Tool::Idle,
            color: Color::default(),
            active: None,
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn into_editor(self) -> Editor {
        self.editor
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn start(&mut self, tool: Tool) -> EditorResult<()> {
        self.end_active();
        if let Tool::Transform {
            kind: TransformKind::Clip,
            ..
        } = tool
        {
            let clippable = self
                .editor
                .selected()
                .is_some_and(|id| self.editor.can_clip(id));
            if !clippable {
                self.tool = Tool::Idle;
                return Err(EditorError::invalid("only a selected line can be clipped"));
            }
        }
        if matches!(tool, Tool::Draw { .. }) {
            self.editor.select(None)?;
        }
        tracing::debug!(?tool, "tool started");
        self.tool = tool;
        Ok(())
    }

    /// Selecting from the entity list drops back to the idle tool.
    pub fn select(&mut self, id: Option<&EntityId>) -> EditorResult<()> {
        self.end_active();
        self.editor.select(id)?;
        self.tool = Tool::Idle;
        Ok(())
    }

    pub fn pointer_down(&mut self, point: Point) -> EditorResult<()> {
        match self.tool {
            Tool::Idle => Ok(()),
            Tool::Draw { kind, algorithm } => {
                if let Some(placement) = self.live_placement() {
                    return self.editor.append_control_point(&placement, point);
                }
                let placement =
                    self.editor
                        .issue_primitive(kind, algorithm, vec![point, point], self.color)?;
                self.active = Some(placement);
                Ok(())
            }
            Tool::Transform { kind, algorithm } => {
                let Some(id) = self.editor.selected().cloned() else {
                    self.tool = Tool::Idle;
                    return Err(EditorError::precondition(
                        "select an entity before transforming",
                    ));
                };
                let placement =
                    self.editor
                        .issue_transform(kind, &id, vec![point, point], algorithm)?;
                self.active = Some(placement);
                Ok(())
            }
        }
    }

    pub fn pointer_move(&mut self, point: Point) -> EditorResult<()> {
        match self.live_placement() {
            Some(placement) => self.editor.move_last_point(&placement, point),
            None => Ok(()),
        }
    }

    /// Returns whether the gesture produced a complete command.
    pub fn pointer_up(&mut self) -> EditorResult<bool> {
        let Some(placement) = self.live_placement() else {
            return Ok(false);
        };
        let complete = self.editor.finish(&placement)?;
        if complete {
            self.active = None;
        }
        Ok(complete)
    }

    pub fn delete_selected(&mut self) -> EditorResult<()> {
        let Some(id) = self.editor.selected().cloned() else {
            return Err(EditorError::precondition("nothing is selected"));
        };
        self.active = None;
        self.editor.delete(&id)
    }

    pub fn undo(&mut self) -> EditorResult<bool> {
        self.active = None;
        self.editor.undo()
    }

    pub fn redo(&mut self) -> EditorResult<bool> {
        self.active = None;
        self.editor.redo()
    }

    fn end_active(&mut self) {
        if self.active.take().is_some() {
            self.editor.end_placement();
        }
    }

    fn live_placement(&self) -> Option<Placement> {
        let active = self.active.as_ref()?;
        (self.editor.placement().as_ref() == Some(active)).then(|| active.clone())
    }
}
