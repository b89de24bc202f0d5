// ============================================================================
// INTERACTION CONTROLLER — input events → grid edits
// ============================================================================
//
// States: Idle ⇄ Dragging { mode, anchor, source }.
// A drag starts on a pointer press or a paint-key press over a cell, paints
// every cell the pointer crosses (Bresenham between samples), and commits a
// single history entry when the pointer button or that key is released.

use eframe::egui;
use egui::{Key, Modifiers, PointerButton, Pos2, Rect, Vec2};

use crate::geometry::{CellHit, resolve};
use crate::grid::{CellState, Corner, ShiftDirection};
use crate::line::CellLine;
use crate::project::{EditAction, Project};

/// What started the current stroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragSource {
    Pointer,
    Key(Key),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrawState {
    #[default]
    Idle,
    Dragging {
        mode: CellState,
        anchor: (usize, usize),
        source: DragSource,
    },
}

/// Discrete input fed to the controller. Positions are relative to the grid's
/// top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerMoved(Vec2),
    PointerLeft,
    PointerPressed(PointerButton),
    PointerReleased(PointerButton),
    KeyPressed {
        key: Key,
        modifiers: Modifiers,
        repeat: bool,
    },
    KeyReleased(Key),
    Action(EditAction),
}

/// Transient UI state: pointer position, cell size, stroke in progress.
#[derive(Clone, Debug)]
pub struct InteractionState {
    pub hover: Option<Vec2>,
    pub cell_size: f32,
    pub draw: DrawState,
}

impl InteractionState {
    pub fn new(cell_size: f32) -> Self {
        Self {
            hover: None,
            cell_size,
            draw: DrawState::Idle,
        }
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.draw, DrawState::Dragging { .. })
    }

    /// Cell and region under the pointer.
    pub fn hovered(&self, project: &Project) -> Option<CellHit> {
        let pos = self.hover?;
        resolve(pos.x, pos.y, self.cell_size, project.grid().size())
    }

    /// Mode of the stroke in progress, `None` when idle. The renderer falls
    /// back to the hovered region's own mode.
    pub fn preview_mode(&self) -> Option<CellState> {
        match self.draw {
            DrawState::Dragging { mode, .. } => Some(mode),
            DrawState::Idle => None,
        }
    }
}

/// Paint mode bound to a key, if any.
pub fn key_mode(key: Key) -> Option<CellState> {
    match key {
        Key::Z => Some(CellState::Filled),
        Key::X => Some(CellState::Empty),
        Key::Q => Some(CellState::Triangle(Corner::BottomRight)),
        Key::W => Some(CellState::Triangle(Corner::BottomLeft)),
        Key::A => Some(CellState::Triangle(Corner::TopRight)),
        Key::S => Some(CellState::Triangle(Corner::TopLeft)),
        _ => None,
    }
}

/// Whole-grid action bound to a key chord, if any.
pub fn key_action(key: Key, modifiers: Modifiers) -> Option<EditAction> {
    let command = modifiers.command || modifiers.ctrl;
    match key {
        Key::Z if command && modifiers.shift => Some(EditAction::Redo),
        Key::Z if command => Some(EditAction::Undo),
        Key::Y if command => Some(EditAction::Redo),
        Key::I if command => Some(EditAction::Invert),
        Key::ArrowUp => Some(EditAction::Shift(ShiftDirection::Up)),
        Key::ArrowDown => Some(EditAction::Shift(ShiftDirection::Down)),
        Key::ArrowLeft => Some(EditAction::Shift(ShiftDirection::Left)),
        Key::ArrowRight => Some(EditAction::Shift(ShiftDirection::Right)),
        _ => None,
    }
}

/// Map a raw egui event to a controller event. Positions become relative to
/// `origin`. Presses outside `canvas` are dropped so a stroke cannot start
/// from another panel; moves and releases always pass through.
pub fn translate_event(
    event: &egui::Event,
    canvas: Rect,
    origin: Pos2,
    keyboard_free: bool,
) -> Option<InputEvent> {
    match event {
        egui::Event::PointerMoved(pos) => Some(InputEvent::PointerMoved(*pos - origin)),
        egui::Event::PointerGone => Some(InputEvent::PointerLeft),
        egui::Event::PointerButton {
            pos, button, pressed, ..
        } => {
            if !*pressed {
                Some(InputEvent::PointerReleased(*button))
            } else if canvas.contains(*pos) {
                Some(InputEvent::PointerPressed(*button))
            } else {
                None
            }
        }
        egui::Event::Key {
            key,
            pressed,
            repeat,
            modifiers,
            ..
        } if keyboard_free => Some(if *pressed {
            InputEvent::KeyPressed {
                key: *key,
                modifiers: *modifiers,
                repeat: *repeat,
            }
        } else {
            InputEvent::KeyReleased(*key)
        }),
        _ => None,
    }
}

/// Feed one event through the state machine.
pub fn handle_event(state: &mut InteractionState, project: &mut Project, event: InputEvent) {
    match event {
        InputEvent::PointerMoved(pos) => {
            state.hover = Some(pos);
            continue_stroke(state, project);
        }
        InputEvent::PointerLeft => {
            state.hover = None;
        }
        InputEvent::PointerPressed(button) => {
            if state.is_drawing() {
                return;
            }
            let Some(hit) = state.hovered(project) else {
                return;
            };
            let mode = match button {
                PointerButton::Primary => {
                    let mode = hit.region.paint_mode();
                    // Pressing on an identical cell erases instead
                    if project.grid().get(hit.row, hit.col) == Some(mode) {
                        CellState::Empty
                    } else {
                        mode
                    }
                }
                PointerButton::Secondary => CellState::Empty,
                _ => return,
            };
            begin_stroke(state, project, hit, mode, DragSource::Pointer);
        }
        InputEvent::PointerReleased(_) => {
            if let DrawState::Dragging {
                source: DragSource::Pointer,
                ..
            } = state.draw
            {
                end_stroke(state, project);
            }
        }
        InputEvent::KeyPressed { key, modifiers, repeat } => {
            if let Some(action) = key_action(key, modifiers) {
                end_stroke(state, project);
                project.apply(action);
                return;
            }
            if repeat || state.is_drawing() || modifiers.command || modifiers.ctrl {
                return;
            }
            let (Some(mode), Some(hit)) = (key_mode(key), state.hovered(project)) else {
                return;
            };
            begin_stroke(state, project, hit, mode, DragSource::Key(key));
        }
        InputEvent::KeyReleased(key) => {
            if let DrawState::Dragging {
                source: DragSource::Key(held),
                ..
            } = state.draw
                && held == key
            {
                end_stroke(state, project);
            }
        }
        InputEvent::Action(action) => {
            end_stroke(state, project);
            project.apply(action);
        }
    }
}

fn begin_stroke(
    state: &mut InteractionState,
    project: &mut Project,
    hit: CellHit,
    mode: CellState,
    source: DragSource,
) {
    project.store.set_cell(hit.row, hit.col, mode);
    state.draw = DrawState::Dragging {
        mode,
        anchor: hit.cell(),
        source,
    };
}

/// Paint from the anchor to the hovered cell, filling skipped cells.
fn continue_stroke(state: &mut InteractionState, project: &mut Project) {
    let DrawState::Dragging { mode, anchor, source } = state.draw else {
        return;
    };
    let Some(hit) = state.hovered(project) else {
        return;
    };
    if hit.cell() == anchor {
        return;
    }
    for (row, col) in CellLine::new(anchor, hit.cell()).skip(1) {
        project.store.set_cell(row, col, mode);
    }
    state.draw = DrawState::Dragging {
        mode,
        anchor: hit.cell(),
        source,
    };
}

/// Finish any stroke in progress and record it as one history entry.
pub fn end_stroke(state: &mut InteractionState, project: &mut Project) {
    if state.is_drawing() {
        state.draw = DrawState::Idle;
        project.commit();
    }
}
