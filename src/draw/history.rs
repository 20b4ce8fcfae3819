use hashlink::LinkedHashMap;
use serde::{Deserialize, Serialize};

use crate::draw::error::{EditorError, EditorResult};
use crate::draw::geometry::Point;
use crate::draw::model::{
    Algorithm, Color, Entity, EntityDesc, EntityId, PendingTransform, PrimitiveKind,
    TransformKind,
};
use crate::draw::settings::GeometrySettings;
use crate::draw::transform;

pub const DEFAULT_CANVAS_SIZE: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_SIZE, DEFAULT_CANVAS_SIZE)
    }
}

/// A clip staged against a line. `pre_clip` is filled in when the clip is
/// committed and is what undo restores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipStage {
    pub handles: Vec<Point>,
    pub algorithm: Algorithm,
    #[serde(default)]
    pub pre_clip: Option<Vec<Point>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create(EntityDesc),
    Edit(PendingTransform),
    Clip(ClipStage),
    Delete(EntityDesc),
}

/// One entry of the undo/redo log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub id: EntityId,
    pub op: Operation,
}

impl Command {
    pub fn new(id: EntityId, op: Operation) -> Self {
        Self { id, op }
    }
}

/// Handle to the command currently being placed with the pointer.
///
/// Only the most recently issued command accepts points; any older handle is
/// rejected with [`EditorError::PreconditionViolation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    serial: u64,
    id: EntityId,
}

impl Placement {
    pub fn id(&self) -> &EntityId {
        &self.id
    }
}

/// Notifications for whoever mirrors the scene (entity list, repaint).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    EntityAdded(EntityId),
    EntityRemoved(EntityId),
    HistoryChanged,
    Redraw,
}

/// The live scene plus its command log.
#[derive(Debug, Clone)]
pub struct Editor {
    entities: LinkedHashMap<EntityId, Entity>,
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    next_id: u64,
    canvas: CanvasSize,
    selected: Option<EntityId>,
    in_flight: Option<u64>,
    next_serial: u64,
    settings: GeometrySettings,
    events: Vec<SceneEvent>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(CanvasSize::default(), GeometrySettings::default())
    }
}

impl Editor {
    pub fn new(canvas: CanvasSize, mut settings: GeometrySettings) -> Self {
        settings.sanitize();
        Self {
            entities: LinkedHashMap::new(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            next_id: 1,
            canvas,
            selected: None,
            in_flight: None,
            next_serial: 0,
            settings,
            events: Vec::new(),
        }
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn settings(&self) -> &GeometrySettings {
        &self.settings
    }

    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Entities in paint order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn undo_stack(&self) -> &[Command] {
        &self.undo_stack
    }

    pub fn redo_stack(&self) -> &[Command] {
        &self.redo_stack
    }

    pub fn selected(&self) -> Option<&EntityId> {
        self.selected.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Only two-point lines can be clipped.
    pub fn can_clip(&self, id: &EntityId) -> bool {
        self.entities
            .get(id)
            .is_some_and(|e| e.kind == PrimitiveKind::Line && e.control_points.len() == 2)
    }

    /// The placement still accepting points, if any.
    pub fn placement(&self) -> Option<Placement> {
        let serial = self.in_flight?;
        let top = self.undo_stack.last()?;
        Some(Placement {
            serial,
            id: top.id.clone(),
        })
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Issuing
    // ------------------------------------------------------------------

    pub fn issue_primitive(
        &mut self,
        kind: PrimitiveKind,
        algorithm: Algorithm,
        initial_points: Vec<Point>,
        color: Color,
    ) -> EditorResult<Placement> {
        if !kind.accepts(algorithm) {
            return Err(EditorError::invalid(format!(
                "algorithm '{algorithm}' cannot draw a {kind}"
            )));
        }
        self.end_placement();
        let id = self.allocate_id();
        let desc = EntityDesc {
            kind,
            points: initial_points,
            algorithm,
            color,
        };
        self.issue(Command::new(id, Operation::Create(desc)), true)
    }

    pub fn issue_transform(
        &mut self,
        kind: TransformKind,
        id: &EntityId,
        handles: Vec<Point>,
        algorithm: Algorithm,
    ) -> EditorResult<Placement> {
        let op = match kind {
            TransformKind::Clip => Operation::Clip(ClipStage {
                handles,
                algorithm,
                pre_clip: None,
            }),
            _ => Operation::Edit(PendingTransform {
                kind,
                handles,
                algorithm,
            }),
        };
        self.end_placement();
        self.issue(Command::new(id.clone(), op), true)
    }

    /// Adds a vertex to a primitive, or a handle to a transform, in flight.
    pub fn append_control_point(
        &mut self,
        placement: &Placement,
        point: Point,
    ) -> EditorResult<()> {
        self.with_placed_points(placement, |points, _| points.push(point))
    }

    /// Drags the last point of the placement. Freeform strokes grow instead.
    pub fn move_last_point(&mut self, placement: &Placement, point: Point) -> EditorResult<()> {
        self.with_placed_points(placement, |points, kind| match points.last_mut() {
            Some(last) if kind != Some(PrimitiveKind::Freeform) => *last = point,
            _ => points.push(point),
        })
    }

    /// Commits the placement.
    ///
    /// Returns `false` while a polygon, curve or freeform stroke is still
    /// collecting points; the placement then stays valid.
    pub fn finish(&mut self, placement: &Placement) -> EditorResult<bool> {
        self.check_placement(placement)?;
        let complete = self.commit_top()?;
        if complete {
            self.in_flight = None;
        }
        self.events.push(SceneEvent::Redraw);
        Ok(complete)
    }

    /// Ends whatever placement is in flight. An unfinished transform is
    /// committed as it stands.
    pub fn end_placement(&mut self) {
        if self.in_flight.take().is_none() {
            return;
        }
        let unfinished_edit = matches!(
            self.undo_stack.last().map(|c| &c.op),
            Some(Operation::Edit(_) | Operation::Clip(_))
        );
        if unfinished_edit {
            if let Err(err) = self.commit_top() {
                tracing::warn!(%err, "dropping transform that could not be committed");
                if let Some(command) = self.undo_stack.pop() {
                    if let Some(entity) = self.entities.get_mut(&command.id) {
                        entity.pending = None;
                    }
                }
                self.events.push(SceneEvent::HistoryChanged);
            }
            self.events.push(SceneEvent::Redraw);
        }
    }

    pub fn delete(&mut self, id: &EntityId) -> EditorResult<()> {
        self.end_placement();
        let desc = self
            .entities
            .get(id)
            .map(Entity::desc)
            .ok_or_else(|| EditorError::NotFound(id.clone()))?;
        self.issue(Command::new(id.clone(), Operation::Delete(desc)), true)?;
        self.in_flight = None;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Undo / redo
    // ------------------------------------------------------------------

    /// Rolls back the newest command. `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self) -> EditorResult<bool> {
        self.end_placement();
        let Some(command) = self.undo_stack.last().cloned() else {
            return Ok(false);
        };
        self.clear_selection();
        self.revert(&command)?;
        self.undo_stack.pop();
        tracing::debug!(id = %command.id, op = op_name(&command.op), "undo");
        self.redo_stack.push(command);
        self.events.push(SceneEvent::HistoryChanged);
        self.events.push(SceneEvent::Redraw);
        Ok(true)
    }

    /// Re-applies the newest undone command. `Ok(false)` when there is nothing
    /// to redo.
    pub fn redo(&mut self) -> EditorResult<bool> {
        self.end_placement();
        let Some(command) = self.redo_stack.last().cloned() else {
            return Ok(false);
        };
        self.clear_selection();
        tracing::debug!(id = %command.id, op = op_name(&command.op), "redo");
        self.replay(command, false)?;
        self.redo_stack.pop();
        Ok(true)
    }

    fn revert(&mut self, command: &Command) -> EditorResult<()> {
        match &command.op {
            Operation::Create(_) => {
                self.remove_entity(&command.id);
            }
            Operation::Delete(desc) => {
                self.entities
                    .insert(command.id.clone(), Entity::from_desc(command.id.clone(), desc));
                self.events.push(SceneEvent::EntityAdded(command.id.clone()));
            }
            Operation::Edit(pending) => {
                let settings = self.settings;
                let entity = self.entity_mut(&command.id)?;
                entity.control_points = pending.apply(&entity.control_points, true, &settings)?;
            }
            Operation::Clip(stage) => {
                let entity = self.entity_mut(&command.id)?;
                if let Some(pre_clip) = &stage.pre_clip {
                    entity.control_points = pre_clip.clone();
                }
            }
        }
        Ok(())
    }

    /// Issue followed by finish, as redo and session loading do it.
    pub(crate) fn replay(&mut self, command: Command, clear_redo: bool) -> EditorResult<()> {
        if let Some(seq) = command.id.sequence() {
            self.next_id = self.next_id.max(seq + 1);
        }
        self.issue(command, clear_redo)?;
        if let Err(err) = self.commit_top() {
            self.in_flight = None;
            return Err(err);
        }
        self.in_flight = None;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Selection and lifecycle
    // ------------------------------------------------------------------

    /// Moves the selection flag. `None` clears it.
    pub fn select(&mut self, id: Option<&EntityId>) -> EditorResult<()> {
        if let Some(id) = id {
            if !self.entities.contains_key(id) {
                return Err(EditorError::NotFound(id.clone()));
            }
        }
        self.clear_selection();
        if let Some(id) = id {
            if let Some(entity) = self.entities.get_mut(id) {
                entity.selected = true;
            }
            self.selected = Some(id.clone());
        }
        self.events.push(SceneEvent::Redraw);
        Ok(())
    }

    /// Drops every entity and both stacks. Ids keep counting up.
    pub fn clear(&mut self) {
        self.in_flight = None;
        let removed: Vec<EntityId> = self.entities.keys().cloned().collect();
        self.entities.clear();
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.selected = None;
        self.events
            .extend(removed.into_iter().map(SceneEvent::EntityRemoved));
        self.events.push(SceneEvent::HistoryChanged);
        self.events.push(SceneEvent::Redraw);
    }

    /// Fresh canvas of the given size.
    pub fn reset(&mut self, canvas: CanvasSize) {
        self.clear();
        self.canvas = canvas;
        self.next_id = 1;
    }

    /// Red rectangle shown while a clip window is being dragged.
    pub fn clip_overlay(&self) -> Option<Entity> {
        self.in_flight?;
        let command = self.undo_stack.last()?;
        let Operation::Clip(stage) = &command.op else {
            return None;
        };
        Some(Entity::from_desc(
            command.id.clone(),
            &EntityDesc {
                kind: PrimitiveKind::Rect,
                points: stage.handles.clone(),
                algorithm: Algorithm::None,
                color: Color::RED,
            },
        ))
    }

    pub(crate) fn push_events(&mut self, events: impl IntoIterator<Item = SceneEvent>) {
        self.events.extend(events);
    }

    pub(crate) fn set_redo_stack(&mut self, redo: Vec<Command>) {
        for command in &redo {
            if let Some(seq) = command.id.sequence() {
                self.next_id = self.next_id.max(seq + 1);
            }
        }
        self.redo_stack = redo;
        self.events.push(SceneEvent::HistoryChanged);
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn allocate_id(&mut self) -> EntityId {
        loop {
            let id = EntityId::new(self.next_id.to_string());
            self.next_id += 1;
            if !self.entities.contains_key(&id) {
                return id;
            }
        }
    }

    fn entity_mut(&mut self, id: &EntityId) -> EditorResult<&mut Entity> {
        self.entities
            .get_mut(id)
            .ok_or_else(|| EditorError::NotFound(id.clone()))
    }

    fn remove_entity(&mut self, id: &EntityId) -> Option<Entity> {
        let removed = self.entities.remove(id)?;
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        self.events.push(SceneEvent::EntityRemoved(id.clone()));
        Some(removed)
    }

    fn clear_selection(&mut self) {
        if let Some(id) = self.selected.take() {
            if let Some(entity) = self.entities.get_mut(&id) {
                entity.selected = false;
            }
        }
    }

    fn check_placement(&self, placement: &Placement) -> EditorResult<()> {
        if self.in_flight == Some(placement.serial) {
            Ok(())
        } else {
            Err(EditorError::precondition(format!(
                "placement for {} is no longer active",
                placement.id
            )))
        }
    }

    /// Validates `command` against the scene, applies its immediate effect
    /// and pushes it as the new in-flight entry.
    fn issue(&mut self, command: Command, clear_redo: bool) -> EditorResult<Placement> {
        match &command.op {
            Operation::Create(desc) => {
                if !desc.kind.accepts(desc.algorithm) {
                    return Err(EditorError::invalid(format!(
                        "algorithm '{}' cannot draw a {}",
                        desc.algorithm, desc.kind
                    )));
                }
                if self.entities.contains_key(&command.id) {
                    return Err(EditorError::invalid(format!(
                        "entity {} already exists",
                        command.id
                    )));
                }
                self.entities.insert(
                    command.id.clone(),
                    Entity::from_desc(command.id.clone(), desc),
                );
                self.events.push(SceneEvent::EntityAdded(command.id.clone()));
            }
            Operation::Edit(pending) => {
                if pending.kind == TransformKind::Clip {
                    return Err(EditorError::invalid("clip must be staged as a clip"));
                }
                check_handles(&pending.handles)?;
                self.entity_mut(&command.id)?.pending = Some(pending.clone());
            }
            Operation::Clip(stage) => {
                if !self.entities.contains_key(&command.id) {
                    return Err(EditorError::NotFound(command.id.clone()));
                }
                if !self.can_clip(&command.id) {
                    return Err(EditorError::invalid(format!(
                        "entity {} is not a line segment and cannot be clipped",
                        command.id
                    )));
                }
                if !stage.algorithm.is_clip_algorithm() {
                    return Err(EditorError::invalid(format!(
                        "'{}' is not a clipping algorithm",
                        stage.algorithm
                    )));
                }
                check_handles(&stage.handles)?;
            }
            Operation::Delete(_) => {
                if self.remove_entity(&command.id).is_none() {
                    return Err(EditorError::NotFound(command.id.clone()));
                }
            }
        }

        tracing::debug!(id = %command.id, op = op_name(&command.op), "issue");
        let placement = Placement {
            serial: self.next_serial,
            id: command.id.clone(),
        };
        self.next_serial += 1;
        self.in_flight = Some(placement.serial);
        self.undo_stack.push(command);
        if clear_redo {
            self.redo_stack.clear();
        }
        self.events.push(SceneEvent::HistoryChanged);
        self.events.push(SceneEvent::Redraw);
        Ok(placement)
    }

    /// Applies the top entry to its entity. Returns whether the interaction is
    /// complete.
    fn commit_top(&mut self) -> EditorResult<bool> {
        let settings = self.settings;
        let Some(command) = self.undo_stack.last_mut() else {
            return Ok(true);
        };
        let entity = self
            .entities
            .get_mut(&command.id)
            .ok_or_else(|| EditorError::NotFound(command.id.clone()));

        match &mut command.op {
            Operation::Create(desc) => Ok(!desc.kind.is_multi_click()),
            Operation::Delete(_) => Ok(true),
            Operation::Edit(pending) => {
                let entity = entity?;
                entity.control_points = pending.apply(&entity.control_points, false, &settings)?;
                entity.pending = None;
                Ok(true)
            }
            Operation::Clip(stage) => {
                let entity = entity?;
                let clipped = transform::p_transform(
                    TransformKind::Clip,
                    &entity.control_points,
                    &stage.handles,
                    stage.algorithm,
                    false,
                    settings.scale_reference,
                )?;
                stage.pre_clip = Some(std::mem::replace(&mut entity.control_points, clipped));
                Ok(true)
            }
        }
    }

    fn with_placed_points(
        &mut self,
        placement: &Placement,
        update: impl Fn(&mut Vec<Point>, Option<PrimitiveKind>),
    ) -> EditorResult<()> {
        self.check_placement(placement)?;
        let Some(command) = self.undo_stack.last_mut() else {
            return Err(EditorError::precondition("nothing is being placed"));
        };
        match &mut command.op {
            Operation::Create(desc) => {
                update(&mut desc.points, Some(desc.kind));
                let points = desc.points.clone();
                if let Some(entity) = self.entities.get_mut(&command.id) {
                    entity.control_points = points;
                }
            }
            Operation::Edit(pending) => {
                update(&mut pending.handles, None);
                let pending = pending.clone();
                if let Some(entity) = self.entities.get_mut(&command.id) {
                    entity.pending = Some(pending);
                }
            }
            Operation::Clip(stage) => update(&mut stage.handles, None),
            Operation::Delete(_) => {
                return Err(EditorError::precondition("a deletion takes no points"));
            }
        }
        self.events.push(SceneEvent::Redraw);
        Ok(())
    }
}

fn check_handles(handles: &[Point]) -> EditorResult<()> {
    if handles.len() < 2 {
        return Err(EditorError::invalid(format!(
            "transforms need 2 handle points, got {}",
            handles.len()
        )));
    }
    Ok(())
}

fn op_name(op: &Operation) -> &'static str {
    match op {
        Operation::Create(_) => "create",
        Operation::Edit(_) => "edit",
        Operation::Clip(_) => "clip",
        Operation::Delete(_) => "delete",
    }
}
