//! Drive a scene editor from a gesture script.

use crate::script::{Script, Step};
use scenecanvas_core::input::Instant;
use scenecanvas_core::{
    DisplayList, EditorConfig, EditorEvent, PendingLabelId, SceneEditor, Storage, StorageResult,
    TouchEvent,
};
use std::time::Duration;

/// Replays scripts against one editor, acting as the host page.
pub struct Replay {
    editor: SceneEditor<DisplayList>,
    started: Instant,
    pending: Option<PendingLabelId>,
    events: Vec<EditorEvent>,
}

impl Replay {
    pub fn new(width: f64, height: f64, config: EditorConfig) -> Self {
        Self {
            editor: SceneEditor::with_config(DisplayList::new(), width, height, config),
            started: Instant::now(),
            pending: None,
            events: Vec::new(),
        }
    }

    /// Editor sized for `script`.
    pub fn for_script(script: &Script, config: EditorConfig) -> Self {
        Self::new(script.width, script.height, config)
    }

    pub fn editor(&self) -> &SceneEditor<DisplayList> {
        &self.editor
    }

    /// Events the editor raised so far, in order.
    pub fn events(&self) -> &[EditorEvent] {
        &self.events
    }

    /// Apply every step of `script`.
    pub fn run(&mut self, script: &Script) {
        for step in &script.steps {
            self.apply(step);
        }
    }

    /// Apply one step.
    pub fn apply(&mut self, step: &Step) {
        match step {
            Step::Start { .. } => {
                if let Some(event) = self.touch_event(step) {
                    self.editor.pointer_start(&event);
                }
            }
            Step::Move { .. } => {
                if let Some(event) = self.touch_event(step) {
                    self.editor.pointer_move(&event);
                }
            }
            Step::End { .. } => {
                let raised = self
                    .touch_event(step)
                    .and_then(|event| self.editor.pointer_end(&event));
                if let Some(raised) = raised {
                    self.handle(raised);
                }
            }
            Step::Mode { mode } => self.editor.set_mode(*mode),
            Step::Tool { tool } => self.editor.set_tool(*tool),
            Step::Undo => {
                if let Some(removed) = self.editor.undo() {
                    log::info!("Undo removed {}", removed.kind());
                }
            }
            Step::Delete => {
                if let Some(removed) = self.editor.delete_selected() {
                    log::info!("Deleted {}", removed.kind());
                }
            }
            Step::Label { text, cancel } => self.answer_label(text.as_deref(), *cancel),
        }
    }

    fn touch_event(&self, step: &Step) -> Option<TouchEvent> {
        let at = step.at()?;
        let (touches, changed) = step.contacts()?;
        let timestamp = self.started + Duration::from_millis(at);
        Some(TouchEvent::at(touches, timestamp).with_changed(changed))
    }

    fn handle(&mut self, event: EditorEvent) {
        match &event {
            EditorEvent::LabelRequested { pending, position } => {
                log::info!("Label requested at ({:.1}, {:.1})", position.x, position.y);
                self.pending = Some(*pending);
            }
            EditorEvent::NavigateToLabel { id, text } => {
                log::info!("Navigate to label {:?} ({})", text, id);
            }
        }
        self.events.push(event);
    }

    fn answer_label(&mut self, text: Option<&str>, cancel: bool) {
        let Some(pending) = self.pending else {
            log::warn!("Label step without a pending label request");
            return;
        };
        if cancel {
            self.editor.cancel_label(pending);
            self.pending = None;
            return;
        }
        match text.and_then(|text| self.editor.confirm_label(pending, text)) {
            Some(id) => {
                log::info!("Placed label {}", id);
                self.pending = None;
            }
            None => log::warn!("Label text rejected; request {} still open", pending),
        }
    }

    /// Save the current drawing under `key`.
    pub async fn save<T: Storage + ?Sized>(&self, storage: &T, key: &str) -> StorageResult<()> {
        self.editor.save_to(storage, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenecanvas_core::{Element, EditorMode, MemoryStorage, ToolKind};

    fn replay(json: &str) -> Replay {
        let script = Script::from_json(json).unwrap();
        let mut replay = Replay::for_script(&script, EditorConfig::default());
        replay.run(&script);
        replay
    }

    #[test]
    fn test_replay_draws_rectangle() {
        let replay = replay(
            r#"{"steps": [
                {"step": "mode", "mode": "edit"},
                {"step": "tool", "tool": "rect"},
                {"step": "start", "at": 0, "touches": [[100, 100]]},
                {"step": "move", "at": 40, "touches": [[200, 160]]},
                {"step": "end", "at": 60, "changed": [[200, 160]]}
            ]}"#,
        );

        let editor = replay.editor();
        assert_eq!(editor.mode(), EditorMode::Edit);
        assert_eq!(editor.tool(), ToolKind::None);
        assert_eq!(editor.elements().len(), 1);
        let Element::Rect(rect) = &editor.elements()[0] else {
            panic!("expected a rectangle");
        };
        assert!((rect.width - 100.0).abs() < 1e-9);
        assert!((rect.height - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_replay_places_label() {
        let replay = replay(
            r#"{"steps": [
                {"step": "mode", "mode": "edit"},
                {"step": "tool", "tool": "label"},
                {"step": "start", "at": 0, "touches": [[50, 60]]},
                {"step": "end", "at": 80, "changed": [[50, 60]]},
                {"step": "label", "text": "  Sofa  "}
            ]}"#,
        );

        assert!(matches!(
            replay.events(),
            [EditorEvent::LabelRequested { .. }]
        ));
        let label = replay.editor().elements()[0].as_label().unwrap();
        assert_eq!(label.text, "Sofa");
        assert!(replay.editor().pending_label().is_none());
    }

    #[test]
    fn test_replay_cancelled_label() {
        let replay = replay(
            r#"{"steps": [
                {"step": "mode", "mode": "edit"},
                {"step": "tool", "tool": "label"},
                {"step": "start", "at": 0, "touches": [[50, 60]]},
                {"step": "end", "at": 80, "changed": [[50, 60]]},
                {"step": "label", "cancel": true}
            ]}"#,
        );

        assert!(replay.editor().elements().is_empty());
        assert!(replay.editor().pending_label().is_none());
    }

    #[test]
    fn test_label_step_without_request_is_ignored() {
        let replay = replay(r#"{"steps": [{"step": "label", "text": "Desk"}]}"#);
        assert!(replay.editor().elements().is_empty());
    }

    #[test]
    fn test_replay_undo() {
        let replay = replay(
            r#"{"steps": [
                {"step": "mode", "mode": "edit"},
                {"step": "tool", "tool": "line"},
                {"step": "start", "at": 0, "touches": [[0, 0]]},
                {"step": "move", "at": 20, "touches": [[90, 0]]},
                {"step": "end", "at": 30, "changed": [[90, 0]]},
                {"step": "undo"}
            ]}"#,
        );
        assert!(replay.editor().elements().is_empty());
    }

    #[test]
    fn test_replay_save() {
        let replay = replay(
            r#"{"steps": [
                {"step": "mode", "mode": "edit"},
                {"step": "tool", "tool": "line"},
                {"step": "start", "at": 0, "touches": [[0, 0]]},
                {"step": "move", "at": 20, "touches": [[0, 90]]},
                {"step": "end", "at": 30, "changed": [[0, 90]]}
            ]}"#,
        );
        let storage = MemoryStorage::new();
        pollster::block_on(replay.save(&storage, "hall")).unwrap();

        let doc = pollster::block_on(storage.load("hall")).unwrap();
        assert_eq!(doc.elements.len(), 1);
    }
}
