use std::path::{Path, PathBuf};

use eframe::egui;
use egui::{Color32, Pos2, Rect, Sense, TextureOptions};
use image::RgbaImage;

use crate::components::toolbar::{Toolbar, ToolbarCommand};
use crate::controller::{self, InputEvent, InteractionState};
use crate::io::{self, BACKDROP_EXTENSIONS, DataVersion, DropKind, ExportFormat};
use crate::project::Project;
use crate::render::{self, RenderParams};
use crate::settings::AppSettings;
use crate::{log_err, log_info, log_warn};

/// Gap between the canvas edge and the grid.
const CANVAS_PADDING: f32 = 12.0;

pub struct TriPaintApp {
    settings: AppSettings,
    project: Project,
    interaction: InteractionState,
    toolbar: Toolbar,
    backdrop: Option<egui::TextureHandle>,
    /// Folder picked for exports this session when none is configured.
    export_dir: Option<PathBuf>,
    status: String,
    last_title: String,
}

impl TriPaintApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load();
        log_info!("Settings: {:?}", settings);

        let mut project = Project::new(settings.grid_size, settings.history_capacity);
        let ctx = cc.egui_ctx.clone();
        project
            .store
            .set_on_change(Box::new(move |_| ctx.request_repaint()));

        Self {
            interaction: InteractionState::new(settings.cell_size),
            export_dir: settings.export_dir(),
            settings,
            project,
            toolbar: Toolbar::default(),
            backdrop: None,
            status: String::from("Z fill · X clear · Q/W/A/S triangles · arrows shift"),
            last_title: String::new(),
        }
    }

    // ========================================================================
    // FILE INPUT
    // ========================================================================

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            let bytes = match (&file.bytes, &file.path) {
                (Some(b), _) => b.to_vec(),
                (None, Some(path)) => match std::fs::read(path) {
                    Ok(b) => b,
                    Err(e) => {
                        log_err!("Could not read dropped file {}: {}", path.display(), e);
                        self.status = format!("Could not read {}", path.display());
                        continue;
                    }
                },
                (None, None) => continue,
            };
            let name = file.path.clone().or_else(|| {
                (!file.name.is_empty()).then(|| PathBuf::from(&file.name))
            });
            self.load_bytes(ctx, name, &bytes);
        }
    }

    fn open_dialog(&mut self, ctx: &egui::Context) {
        let picked = rfd::FileDialog::new()
            .add_filter("Grid", &["json"])
            .add_filter("Backdrop image", BACKDROP_EXTENSIONS)
            .pick_file();
        let Some(path) = picked else { return };
        match std::fs::read(&path) {
            Ok(bytes) => self.load_bytes(ctx, Some(path), &bytes),
            Err(e) => {
                log_err!("Could not read {}: {}", path.display(), e);
                self.status = format!("Could not read {}", path.display());
            }
        }
    }

    /// Route a file to the grid loader or the backdrop. Failures leave the
    /// grid untouched.
    fn load_bytes(&mut self, ctx: &egui::Context, path: Option<PathBuf>, bytes: &[u8]) {
        let label = path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "dropped data".to_string());

        match io::classify_drop(path.as_deref(), Some(bytes)) {
            DropKind::GridData => {
                let parsed = std::str::from_utf8(bytes)
                    .map_err(|e| io::GridFileError::Json(e.to_string()))
                    .and_then(io::from_json);
                match parsed {
                    Ok(grid) => {
                        controller::end_stroke(&mut self.interaction, &mut self.project);
                        self.project.load(grid, path);
                        self.status = format!("Loaded {}", label);
                    }
                    Err(e) => {
                        log_err!("Rejected grid file {}: {}", label, e);
                        self.status = format!("Could not load {}: {}", label, e);
                    }
                }
            }
            DropKind::Backdrop => match io::decode_backdrop(bytes) {
                Ok(img) => {
                    self.set_backdrop(ctx, &img);
                    log_info!("Backdrop {} ({}×{})", label, img.width(), img.height());
                    self.status = format!("Backdrop: {}", label);
                }
                Err(e) => {
                    log_err!("Could not decode backdrop {}: {}", label, e);
                    self.status = format!("Could not decode {}", label);
                }
            },
            DropKind::Unknown => {
                log_warn!("Ignored dropped file {}", label);
                self.status = format!("Unsupported file: {}", label);
            }
        }
    }

    fn set_backdrop(&mut self, ctx: &egui::Context, img: &RgbaImage) {
        let size = [img.width() as usize, img.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, img.as_raw());
        self.backdrop = Some(ctx.load_texture("backdrop", color_image, TextureOptions::LINEAR));
    }

    // ========================================================================
    // EXPORT
    // ========================================================================

    fn export(&mut self, format: Option<ExportFormat>) {
        let dir = match self.export_dir.clone() {
            Some(dir) => dir,
            None => match rfd::FileDialog::new().set_title("Export folder").pick_folder() {
                Some(dir) => {
                    self.export_dir = Some(dir.clone());
                    dir
                }
                None => return,
            },
        };
        let grid = self.project.store.snapshot();

        let result = match format {
            Some(format) => io::export_to_dir(&grid, &dir, format, DataVersion::V2).map(|p| vec![p]),
            None => io::export_all(&grid, &dir),
        };
        match result {
            Ok(paths) => {
                for p in &paths {
                    log_info!("Exported {}", p.display());
                }
                self.status = format!("Exported {}", describe(&paths));
                self.project.mark_clean();
            }
            Err(e) => {
                log_err!("Export to {} failed: {}", dir.display(), e);
                self.status = format!("Export failed: {}", e);
            }
        }
    }

    // ========================================================================
    // INPUT
    // ========================================================================

    /// This frame's controller events, with positions relative to the grid
    /// origin and presses limited to the visible canvas.
    fn collect_input(&self, ctx: &egui::Context, canvas: Rect, origin: Pos2) -> Vec<InputEvent> {
        let keyboard_free = !ctx.wants_keyboard_input();
        ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| controller::translate_event(event, canvas, origin, keyboard_free))
                .collect()
        })
    }

    fn run_toolbar_command(&mut self, ctx: &egui::Context, command: ToolbarCommand) {
        match command {
            ToolbarCommand::Edit(action) => {
                controller::handle_event(
                    &mut self.interaction,
                    &mut self.project,
                    InputEvent::Action(action),
                );
            }
            ToolbarCommand::Export(format) => self.export(format),
            ToolbarCommand::Open => self.open_dialog(ctx),
            ToolbarCommand::ClearBackdrop => self.backdrop = None,
            ToolbarCommand::ToggleGridLines => {
                self.settings.show_grid_lines = !self.settings.show_grid_lines;
                self.settings.save();
            }
        }
    }

    fn update_title(&mut self, ctx: &egui::Context) {
        let title = format!("TriPaint — {}", self.project.display_title());
        if title != self.last_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.last_title = title;
        }
    }
}

fn describe(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .filter_map(|p| p.file_name().map(Path::new))
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl eframe::App for TriPaintApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        let commands = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                self.toolbar.show(
                    ui,
                    &self.project.history,
                    self.project.grid().size(),
                    self.backdrop.is_some(),
                )
            })
            .inner;
        for command in commands {
            self.run_toolbar_command(ctx, command);
        }

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status);
                if let Some(hit) = self.interaction.hovered(&self.project) {
                    ui.separator();
                    ui.label(format!("row {} col {} · {}", hit.row, hit.col, hit.region.paint_mode().label()));
                }
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::from_gray(230)))
            .show(ctx, |ui| {
                let n = self.project.grid().size();
                let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
                let inner = response.rect.shrink(CANVAS_PADDING);
                self.interaction.cell_size = render::fit_cell_size(inner.size(), n, self.settings.cell_size);
                let origin = inner.min;

                for event in self.collect_input(ctx, response.rect, origin) {
                    controller::handle_event(&mut self.interaction, &mut self.project, event);
                }

                let commands = render::render(&RenderParams {
                    grid: self.project.grid(),
                    origin,
                    cell_size: self.interaction.cell_size,
                    hover: self.interaction.hover,
                    hover_mode: self.interaction.preview_mode(),
                    backdrop: self.backdrop.as_ref().map(|t| t.id()),
                    show_grid_lines: self.settings.show_grid_lines,
                });
                render::paint(&painter, &commands);
            });

        self.update_title(ctx);
    }
}
