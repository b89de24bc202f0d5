use eframe::egui;

use crate::components::history::{HistoryManager, HistoryPanel};
use crate::grid::{MAX_GRID_SIZE, ShiftDirection};
use crate::io::ExportFormat;
use crate::project::EditAction;

/// Something the user asked for from the toolbar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolbarCommand {
    Edit(EditAction),
    /// `None` exports every format.
    Export(Option<ExportFormat>),
    Open,
    ClearBackdrop,
    ToggleGridLines,
}

#[derive(Default)]
pub struct Toolbar {
    history_panel: HistoryPanel,
}

impl Toolbar {
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        history: &HistoryManager,
        grid_size: usize,
        has_backdrop: bool,
    ) -> Vec<ToolbarCommand> {
        let mut out = Vec::new();

        ui.horizontal_wrapped(|ui| {
            if ui.button("📂 Open").on_hover_text("Load a grid file or backdrop image").clicked() {
                out.push(ToolbarCommand::Open);
            }
            ui.separator();

            if ui
                .add_enabled(history.can_undo(), egui::Button::new("↶"))
                .on_hover_text("Undo (Ctrl+Z)")
                .clicked()
            {
                out.push(ToolbarCommand::Edit(EditAction::Undo));
            }
            if ui
                .add_enabled(history.can_redo(), egui::Button::new("↷"))
                .on_hover_text("Redo (Ctrl+Shift+Z / Ctrl+Y)")
                .clicked()
            {
                out.push(ToolbarCommand::Edit(EditAction::Redo));
            }
            ui.separator();

            for (label, dir) in [
                ("⬆", ShiftDirection::Up),
                ("⬇", ShiftDirection::Down),
                ("⬅", ShiftDirection::Left),
                ("➡", ShiftDirection::Right),
            ] {
                let action = EditAction::Shift(dir);
                if ui.button(label).on_hover_text(action.label()).clicked() {
                    out.push(ToolbarCommand::Edit(action));
                }
            }
            if ui.button("Invert").on_hover_text("Ctrl+I").clicked() {
                out.push(ToolbarCommand::Edit(EditAction::Invert));
            }
            if ui.button("Clear").clicked() {
                out.push(ToolbarCommand::Edit(EditAction::Clear));
            }
            ui.separator();

            if ui.add_enabled(grid_size > 1, egui::Button::new("−")).clicked() {
                out.push(ToolbarCommand::Edit(EditAction::Shrink));
            }
            ui.label(format!("{}×{}", grid_size, grid_size));
            if ui
                .add_enabled(grid_size < MAX_GRID_SIZE, egui::Button::new("+"))
                .clicked()
            {
                out.push(ToolbarCommand::Edit(EditAction::Grow));
            }
            ui.separator();

            for &format in ExportFormat::all() {
                let label = format!("Export {}", format.extension().to_uppercase());
                if ui.button(label).clicked() {
                    out.push(ToolbarCommand::Export(Some(format)));
                }
            }
            if ui.button("Export all").clicked() {
                out.push(ToolbarCommand::Export(None));
            }
            ui.separator();

            if ui.button("#").on_hover_text("Toggle grid lines").clicked() {
                out.push(ToolbarCommand::ToggleGridLines);
            }
            if has_backdrop && ui.button("Remove backdrop").clicked() {
                out.push(ToolbarCommand::ClearBackdrop);
            }
            ui.separator();
            self.history_panel.show(ui, history);
        });

        out
    }
}
