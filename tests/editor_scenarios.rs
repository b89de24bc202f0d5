// End-to-end editing sessions driven through the public controller API.

use egui::{Key, Modifiers, PointerButton, Vec2};

use tripaint::controller::{self, InputEvent, InteractionState};
use tripaint::grid::{CellState, Corner, ShiftDirection};
use tripaint::io;
use tripaint::project::{EditAction, Project};

const CS: f32 = 16.0;

struct Session {
    state: InteractionState,
    project: Project,
}

impl Session {
    fn new(size: usize) -> Self {
        Self {
            state: InteractionState::new(CS),
            project: Project::new(size, 100),
        }
    }

    fn send(&mut self, event: InputEvent) {
        controller::handle_event(&mut self.state, &mut self.project, event);
    }

    fn hover(&mut self, row: usize, col: usize, fx: f32, fy: f32) {
        self.send(InputEvent::PointerMoved(Vec2::new(
            (col as f32 + fx) * CS,
            (row as f32 + fy) * CS,
        )));
    }

    fn tap_key(&mut self, key: Key) {
        self.send(InputEvent::KeyPressed {
            key,
            modifiers: Modifiers::NONE,
            repeat: false,
        });
        self.send(InputEvent::KeyReleased(key));
    }

    fn command(&mut self, key: Key, shift: bool) {
        self.send(InputEvent::KeyPressed {
            key,
            modifiers: Modifiers {
                command: true,
                ctrl: true,
                shift,
                ..Default::default()
            },
            repeat: false,
        });
    }

    fn get(&self, row: usize, col: usize) -> CellState {
        self.project.grid().get(row, col).unwrap_or_default()
    }
}

#[test]
fn keyboard_scenario_exports_expected_compact_code() {
    let mut s = Session::new(3);
    s.hover(0, 0, 0.5, 0.5);
    s.tap_key(Key::Z);
    s.hover(1, 1, 0.5, 0.5);
    s.tap_key(Key::S);

    let compact = io::encode_compact(s.project.grid());
    assert_eq!(compact, "zxxxsxxxx");
    assert_eq!(&io::decode_compact(&compact).unwrap(), s.project.grid());
    // empty start plus two strokes
    assert_eq!(s.project.history.len(), 3);
}

#[test]
fn pointer_drag_paints_diagonal_as_one_step() {
    let mut s = Session::new(6);
    s.hover(0, 0, 0.5, 0.5);
    s.send(InputEvent::PointerPressed(PointerButton::Primary));
    s.hover(3, 3, 0.5, 0.5);
    s.send(InputEvent::PointerReleased(PointerButton::Primary));

    for i in 0..4 {
        assert_eq!(s.get(i, i), CellState::Filled);
    }
    assert_eq!(s.get(0, 1), CellState::Empty);
    assert_eq!(s.project.history.undo_count(), 1);

    s.command(Key::Z, false);
    assert!(s.project.grid().is_blank());
    s.command(Key::Z, true);
    assert_eq!(s.get(3, 3), CellState::Filled);
}

#[test]
fn corner_press_draws_triangles_and_toggles_off() {
    let mut s = Session::new(4);
    s.hover(2, 1, 0.9, 0.9);
    s.send(InputEvent::PointerPressed(PointerButton::Primary));
    s.send(InputEvent::PointerReleased(PointerButton::Primary));
    assert_eq!(s.get(2, 1), CellState::Triangle(Corner::BottomRight));

    s.send(InputEvent::PointerPressed(PointerButton::Primary));
    s.send(InputEvent::PointerReleased(PointerButton::Primary));
    assert_eq!(s.get(2, 1), CellState::Empty);
}

#[test]
fn grid_actions_are_undoable() {
    let mut s = Session::new(5);
    s.hover(0, 0, 0.5, 0.5);
    s.tap_key(Key::Z);
    s.hover(4, 4, 0.5, 0.5);
    s.tap_key(Key::Q);

    s.send(InputEvent::Action(EditAction::Shrink));
    s.send(InputEvent::Action(EditAction::Shrink));
    assert_eq!(s.project.grid().size(), 3);
    assert_eq!(s.get(0, 0), CellState::Filled);

    s.send(InputEvent::Action(EditAction::Grow));
    s.send(InputEvent::Action(EditAction::Grow));
    assert_eq!(s.project.grid().size(), 5);
    // Cells dropped by the shrink come back empty
    assert_eq!(s.get(4, 4), CellState::Empty);

    for _ in 0..4 {
        s.send(InputEvent::Action(EditAction::Undo));
    }
    assert_eq!(s.project.grid().size(), 5);
    assert_eq!(s.get(4, 4), CellState::Triangle(Corner::BottomRight));
}

#[test]
fn arrow_keys_shift_with_wraparound() {
    let mut s = Session::new(3);
    s.hover(0, 0, 0.5, 0.5);
    s.tap_key(Key::Z);
    let before = s.project.grid().clone();

    s.tap_key(Key::ArrowLeft);
    assert_eq!(s.get(0, 2), CellState::Filled);
    s.tap_key(Key::ArrowUp);
    assert_eq!(s.get(2, 2), CellState::Filled);

    let mut g = before.clone();
    for dir in [ShiftDirection::Right; 3] {
        g = g.shifted(dir);
    }
    assert_eq!(g, before);
}

#[test]
fn history_stays_bounded_over_long_sessions() {
    let mut s = Session {
        state: InteractionState::new(CS),
        project: Project::new(4, 5),
    };
    for i in 0..40 {
        s.hover(i % 4, (i / 4) % 4, 0.5, 0.5);
        s.tap_key(if i % 2 == 0 { Key::Z } else { Key::X });
    }
    assert!(s.project.history.len() <= 5);
    for _ in 0..50 {
        s.send(InputEvent::Action(EditAction::Undo));
    }
    assert!(!s.project.history.can_undo());
    assert_eq!(s.project.history.len(), 5);
}
