use crate::draw::history::{CanvasSize, Command, Editor, SceneEvent};
use crate::draw::settings::GeometrySettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// On-disk session: the canvas size plus both command stacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionFile {
    pub height: u32,
    pub width: u32,
    #[serde(default)]
    pub undo: Vec<Command>,
    #[serde(default)]
    pub redo: Vec<Command>,
}

impl SessionFile {
    pub fn capture(editor: &Editor) -> Self {
        let canvas = editor.canvas();
        Self {
            height: canvas.height,
            width: canvas.width,
            undo: editor.undo_stack().to_vec(),
            redo: editor.redo_stack().to_vec(),
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read session file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parse session file {}", path.display()))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serialize session")?;
        fs::write(path, json).with_context(|| format!("write session file {}", path.display()))
    }

    /// Rebuilds a scene by replaying every undo entry in order, then restores
    /// the redo stack untouched.
    pub fn into_editor(self, settings: GeometrySettings) -> Result<Editor> {
        let mut editor = Editor::new(CanvasSize::new(self.width, self.height), settings);
        for (index, command) in self.undo.into_iter().enumerate() {
            let id = command.id.clone();
            editor
                .replay(command, true)
                .with_context(|| format!("replay command {index} for entity {id}"))?;
        }
        editor.set_redo_stack(self.redo);
        Ok(editor)
    }
}

impl Editor {
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        SessionFile::capture(self).write(path)?;
        tracing::info!(
            path = %path.display(),
            commands = self.undo_stack().len(),
            "session saved"
        );
        Ok(())
    }

    /// Replaces the whole editor with the session stored at `path`. On error
    /// the current scene is left as it was.
    pub fn load_from_path(&mut self, path: &Path) -> Result<()> {
        let session = SessionFile::read(path)?;
        let mut loaded = session.into_editor(*self.settings())?;
        self.end_placement();

        let removed: Vec<SceneEvent> = self
            .entities()
            .map(|e| SceneEvent::EntityRemoved(e.id.clone()))
            .collect();
        let mut events = removed;
        events.extend(loaded.drain_events());
        *self = loaded;
        self.push_events(events);

        tracing::info!(
            path = %path.display(),
            entities = self.len(),
            "session loaded"
        );
        Ok(())
    }
}
