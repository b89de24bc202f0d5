use image::codecs::png::PngEncoder;
use image::{ImageEncoder, ImageError, Rgba, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::grid::{CellState, Corner, Grid};

/// Pixels per cell in raster and vector exports, independent of on-screen zoom.
pub const EXPORT_CELL_SIZE: u32 = 20;

/// File name prefix for content-addressed exports.
const EXPORT_PREFIX: &str = "tripaint";

// ============================================================================
// EXPORT FORMATS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Svg,
    Json,
}

impl ExportFormat {
    pub fn all() -> &'static [ExportFormat] {
        &[ExportFormat::Png, ExportFormat::Svg, ExportFormat::Json]
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
            ExportFormat::Json => "json",
        }
    }

    pub fn from_extension(ext: &str) -> Option<ExportFormat> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "svg" => Some(ExportFormat::Svg),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

/// Layout of a structured-data grid file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DataVersion {
    /// `{"version":1,"grid":[[...]]}` — one enumerated value per cell.
    V1,
    /// `{"version":2,"data":"..."}` — one character per cell, row-major.
    #[default]
    V2,
}

// ============================================================================
// ERRORS
// ============================================================================

/// Error type for grid file loading and export
#[derive(Debug)]
pub enum GridFileError {
    Io(std::io::Error),
    Json(String),
    /// `version` missing (`None`) or not one we understand.
    UnsupportedVersion(Option<u64>),
    /// Compact data whose length is not a perfect square.
    NotSquare(usize),
    InvalidCode(char),
    InvalidGrid(String),
    Encode(String),
}

impl std::fmt::Display for GridFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridFileError::Io(e) => write!(f, "I/O error: {}", e),
            GridFileError::Json(e) => write!(f, "JSON error: {}", e),
            GridFileError::UnsupportedVersion(Some(v)) => write!(f, "Unsupported grid file version {}", v),
            GridFileError::UnsupportedVersion(None) => write!(f, "Grid file has no version"),
            GridFileError::NotSquare(len) => {
                write!(f, "Compact data length {} is not a square number", len)
            }
            GridFileError::InvalidCode(c) => write!(f, "Unknown cell code '{}'", c),
            GridFileError::InvalidGrid(e) => write!(f, "Invalid grid: {}", e),
            GridFileError::Encode(e) => write!(f, "Encode error: {}", e),
        }
    }
}

impl std::error::Error for GridFileError {}

impl From<std::io::Error> for GridFileError {
    fn from(e: std::io::Error) -> Self {
        GridFileError::Io(e)
    }
}

impl From<serde_json::Error> for GridFileError {
    fn from(e: serde_json::Error) -> Self {
        GridFileError::Json(e.to_string())
    }
}

impl From<ImageError> for GridFileError {
    fn from(e: ImageError) -> Self {
        GridFileError::Encode(e.to_string())
    }
}

// ============================================================================
// STRUCTURED DATA (JSON)
// ============================================================================

#[derive(Serialize, Deserialize)]
struct GridFileV1 {
    version: u32,
    grid: Vec<Vec<CellState>>,
}

#[derive(Serialize, Deserialize)]
struct GridFileV2 {
    version: u32,
    data: String,
}

pub fn cell_code(state: CellState) -> char {
    match state {
        CellState::Filled => 'z',
        CellState::Empty => 'x',
        CellState::Triangle(Corner::TopLeft) => 's',
        CellState::Triangle(Corner::TopRight) => 'a',
        CellState::Triangle(Corner::BottomLeft) => 'w',
        CellState::Triangle(Corner::BottomRight) => 'q',
    }
}

pub fn cell_from_code(code: char) -> Option<CellState> {
    match code {
        'z' => Some(CellState::Filled),
        'x' => Some(CellState::Empty),
        's' => Some(CellState::Triangle(Corner::TopLeft)),
        'a' => Some(CellState::Triangle(Corner::TopRight)),
        'w' => Some(CellState::Triangle(Corner::BottomLeft)),
        'q' => Some(CellState::Triangle(Corner::BottomRight)),
        _ => None,
    }
}

/// One character per cell, row-major.
pub fn encode_compact(grid: &Grid) -> String {
    grid.cells().iter().map(|c| cell_code(*c)).collect()
}

/// Inverse of [`encode_compact`]. The dimension is the integer square root of
/// the character count; other lengths are rejected.
pub fn decode_compact(data: &str) -> Result<Grid, GridFileError> {
    let len = data.chars().count();
    let size = len.isqrt();
    if len == 0 || size * size != len {
        return Err(GridFileError::NotSquare(len));
    }
    let cells = data
        .chars()
        .map(|c| cell_from_code(c).ok_or(GridFileError::InvalidCode(c)))
        .collect::<Result<Vec<_>, _>>()?;
    Grid::from_cells(size, cells)
        .ok_or_else(|| GridFileError::InvalidGrid(format!("{}×{} exceeds the size limit", size, size)))
}

/// Serialize a grid as a JSON document in the requested layout.
pub fn to_json(grid: &Grid, version: DataVersion) -> Result<String, GridFileError> {
    let text = match version {
        DataVersion::V1 => serde_json::to_string(&GridFileV1 {
            version: 1,
            grid: grid.to_rows(),
        })?,
        DataVersion::V2 => serde_json::to_string(&GridFileV2 {
            version: 2,
            data: encode_compact(grid),
        })?,
    };
    Ok(text)
}

/// Parse a grid file, dispatching on its `version` field.
pub fn from_json(text: &str) -> Result<Grid, GridFileError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    match value.get("version").and_then(|v| v.as_u64()) {
        Some(1) => {
            let file: GridFileV1 = serde_json::from_value(value)?;
            Grid::from_rows(file.grid)
                .ok_or_else(|| GridFileError::InvalidGrid("grid rows do not form a square".into()))
        }
        Some(2) => {
            let file: GridFileV2 = serde_json::from_value(value)?;
            decode_compact(&file.data)
        }
        other => Err(GridFileError::UnsupportedVersion(other)),
    }
}

pub fn load_grid(path: &Path) -> Result<Grid, GridFileError> {
    let text = std::fs::read_to_string(path)?;
    from_json(&text)
}

pub fn save_json(grid: &Grid, path: &Path, version: DataVersion) -> Result<(), GridFileError> {
    let text = to_json(grid, version)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}

// ============================================================================
// CONTENT HASH / FILE NAMES
// ============================================================================

/// 32-bit rolling hash (`h = h * 31 + byte`) over the compact JSON text.
pub fn content_hash(grid: &Grid) -> String {
    let text = format!(r#"{{"version":2,"data":"{}"}}"#, encode_compact(grid));
    let hash = text
        .bytes()
        .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(b as u32));
    format!("{:08x}", hash)
}

/// Content-addressed file name: the same grid always maps to the same name.
pub fn export_file_name(grid: &Grid, format: ExportFormat) -> String {
    format!("{}-{}.{}", EXPORT_PREFIX, content_hash(grid), format.extension())
}

// ============================================================================
// RASTER
// ============================================================================

/// Whether the pixel centre at (fx, fy) inside a unit cell is covered.
fn covers(state: CellState, fx: f32, fy: f32) -> bool {
    match state {
        CellState::Empty => false,
        CellState::Filled => true,
        CellState::Triangle(Corner::TopLeft) => fx + fy <= 1.0,
        CellState::Triangle(Corner::TopRight) => fx >= fy,
        CellState::Triangle(Corner::BottomLeft) => fy >= fx,
        CellState::Triangle(Corner::BottomRight) => fx + fy >= 1.0,
    }
}

/// Render the grid at [`EXPORT_CELL_SIZE`] pixels per cell on white.
pub fn render_raster(grid: &Grid) -> RgbaImage {
    let scale = EXPORT_CELL_SIZE;
    let side = grid.size() as u32 * scale;
    let mut img = RgbaImage::from_pixel(side, side, Rgba([255, 255, 255, 255]));
    let ink = Rgba([0, 0, 0, 255]);

    for (row, col, state) in grid.iter_cells() {
        if state.is_empty() {
            continue;
        }
        let x0 = col as u32 * scale;
        let y0 = row as u32 * scale;
        for py in 0..scale {
            let fy = (py as f32 + 0.5) / scale as f32;
            for px in 0..scale {
                let fx = (px as f32 + 0.5) / scale as f32;
                if covers(state, fx, fy) {
                    img.put_pixel(x0 + px, y0 + py, ink);
                }
            }
        }
    }
    img
}

pub fn save_png(grid: &Grid, path: &Path) -> Result<(), GridFileError> {
    let img = render_raster(grid);
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    PngEncoder::new(&mut writer).write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        image::ColorType::Rgba8,
    )?;
    writer.flush()?;
    Ok(())
}

// ============================================================================
// VECTOR
// ============================================================================

/// Self-contained SVG document at [`EXPORT_CELL_SIZE`] units per cell.
pub fn render_svg(grid: &Grid) -> String {
    let s = EXPORT_CELL_SIZE;
    let side = grid.size() as u32 * s;
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{side}\" height=\"{side}\" viewBox=\"0 0 {side} {side}\">\n"
    );
    svg.push_str(&format!(
        "  <rect x=\"0\" y=\"0\" width=\"{side}\" height=\"{side}\" fill=\"#ffffff\"/>\n"
    ));

    for (row, col, state) in grid.iter_cells() {
        let (x0, y0) = (col as u32 * s, row as u32 * s);
        let (x1, y1) = (x0 + s, y0 + s);
        let points = match state {
            CellState::Empty => continue,
            CellState::Filled => {
                svg.push_str(&format!(
                    "  <rect x=\"{x0}\" y=\"{y0}\" width=\"{s}\" height=\"{s}\" fill=\"#000000\"/>\n"
                ));
                continue;
            }
            CellState::Triangle(Corner::TopLeft) => [(x0, y0), (x1, y0), (x0, y1)],
            CellState::Triangle(Corner::TopRight) => [(x0, y0), (x1, y0), (x1, y1)],
            CellState::Triangle(Corner::BottomLeft) => [(x0, y0), (x1, y1), (x0, y1)],
            CellState::Triangle(Corner::BottomRight) => [(x1, y0), (x1, y1), (x0, y1)],
        };
        let [(ax, ay), (bx, by), (cx, cy)] = points;
        svg.push_str(&format!(
            "  <path d=\"M{ax} {ay} L{bx} {by} L{cx} {cy} Z\" fill=\"#000000\"/>\n"
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

pub fn save_svg(grid: &Grid, path: &Path) -> Result<(), GridFileError> {
    std::fs::write(path, render_svg(grid))?;
    Ok(())
}

// ============================================================================
// EXPORT ENTRY POINTS
// ============================================================================

/// Write `grid` to `path` in `format`.
pub fn export(grid: &Grid, path: &Path, format: ExportFormat, version: DataVersion) -> Result<(), GridFileError> {
    match format {
        ExportFormat::Png => save_png(grid, path),
        ExportFormat::Svg => save_svg(grid, path),
        ExportFormat::Json => save_json(grid, path, version),
    }
}

/// Write `grid` into `dir` under its content-addressed name.
pub fn export_to_dir(
    grid: &Grid,
    dir: &Path,
    format: ExportFormat,
    version: DataVersion,
) -> Result<PathBuf, GridFileError> {
    let path = dir.join(export_file_name(grid, format));
    export(grid, &path, format, version)?;
    Ok(path)
}

/// PNG, SVG and JSON side by side; returns the written paths in that order.
pub fn export_all(grid: &Grid, dir: &Path) -> Result<Vec<PathBuf>, GridFileError> {
    ExportFormat::all()
        .iter()
        .map(|&format| export_to_dir(grid, dir, format, DataVersion::V2))
        .collect()
}

// ============================================================================
// DROPPED FILES
// ============================================================================

/// Image extensions accepted as a backdrop guide.
pub const BACKDROP_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropKind {
    GridData,
    Backdrop,
    Unknown,
}

/// Decide what a dropped file is from its name, falling back to sniffing the
/// first bytes.
pub fn classify_drop(path: Option<&Path>, bytes: Option<&[u8]>) -> DropKind {
    let ext = path
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("json") => return DropKind::GridData,
        Some(e) if BACKDROP_EXTENSIONS.contains(&e) => return DropKind::Backdrop,
        _ => {}
    }

    let Some(bytes) = bytes else {
        return DropKind::Unknown;
    };
    if bytes.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'{') {
        DropKind::GridData
    } else if image::guess_format(bytes).is_ok() {
        DropKind::Backdrop
    } else {
        DropKind::Unknown
    }
}

/// Decode a backdrop image from raw bytes.
pub fn decode_backdrop(bytes: &[u8]) -> Result<RgbaImage, GridFileError> {
    Ok(image::load_from_memory(bytes)?.into_rgba8())
}
