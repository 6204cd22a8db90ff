//! Correlation heat map rendering with the plotters SVG backend

use crate::error::{FeatError, Result};
use ndarray::Array2;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use std::path::Path;
use tracing::info;

/// Default output file of [`plot_heat_map`]
pub const DEFAULT_HEAT_MAP_FILE: &str = "heat_map.svg";

/// Value range mapped onto the color scale
const VMIN: f64 = -1.0;
const VMAX: f64 = 1.0;

const CHAR_WIDTH: i32 = 8;
const PAD: i32 = 10;
const TICK_GAP: i32 = 4;
const BAR_GAP: i32 = 20;
const BAR_WIDTH: i32 = 18;
const BAR_LABEL_WIDTH: i32 = 40;
const BAR_TICKS: [f64; 5] = [-1.0, -0.5, 0.0, 0.5, 1.0];
const NAN_COLOR: RGBColor = RGBColor(255, 255, 255);

/// Color scales available for heat maps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Colormap {
    /// Perceptually uniform, dark blue to yellow
    #[default]
    Viridis,
    /// Perceptually uniform, black to pale yellow
    Magma,
    /// Diverging blue to red around a light center
    Coolwarm,
    /// White to black
    Greys,
}

impl Colormap {
    fn stops(self) -> &'static [(f64, (u8, u8, u8))] {
        match self {
            Self::Viridis => &[
                (0.0, (68, 1, 84)),
                (0.125, (71, 44, 122)),
                (0.25, (59, 81, 139)),
                (0.375, (44, 113, 142)),
                (0.5, (33, 144, 141)),
                (0.625, (39, 173, 129)),
                (0.75, (92, 200, 99)),
                (0.875, (170, 220, 50)),
                (1.0, (253, 231, 37)),
            ],
            Self::Magma => &[
                (0.0, (0, 0, 4)),
                (0.25, (81, 18, 124)),
                (0.5, (183, 55, 121)),
                (0.75, (252, 137, 97)),
                (1.0, (252, 253, 191)),
            ],
            Self::Coolwarm => &[
                (0.0, (59, 76, 192)),
                (0.25, (141, 176, 254)),
                (0.5, (221, 221, 221)),
                (0.75, (244, 154, 123)),
                (1.0, (180, 4, 38)),
            ],
            Self::Greys => &[(0.0, (255, 255, 255)), (1.0, (0, 0, 0))],
        }
    }

    /// Color of `value` within `[min, max]`, clamped at both ends. NaN maps to white.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn color(self, value: f64, min: f64, max: f64) -> RGBColor {
        if value.is_nan() || max <= min {
            return NAN_COLOR;
        }
        let t = ((value - min) / (max - min)).clamp(0.0, 1.0);

        let stops = self.stops();
        let upper = stops
            .iter()
            .position(|&(at, _)| at >= t)
            .unwrap_or(stops.len() - 1)
            .max(1);
        let (t0, c0) = stops[upper - 1];
        let (t1, c1) = stops[upper];
        let frac = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };

        let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * frac).round() as u8;
        RGBColor(lerp(c0.0, c1.0), lerp(c0.1, c1.1), lerp(c0.2, c1.2))
    }
}

fn label_font<'a>() -> FontDesc<'a> {
    ("sans-serif", 13).into_font()
}

/// Pixel layout of the figure, sized to its content
struct Layout {
    n: i32,
    cell: i32,
    grid_x: i32,
    grid_y: i32,
    bar_x: i32,
    width: i32,
    height: i32,
}

impl Layout {
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn new(n: usize, labels: &[String]) -> Self {
        let n = n as i32;
        let cell = if n <= 25 { 36 } else { (900 / n).max(10) };
        let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as i32;
        let label_extent = longest * CHAR_WIDTH + TICK_GAP * 2;

        let grid_x = PAD + label_extent;
        let grid_y = PAD;
        let grid = n * cell;
        let bar_x = grid_x + grid + BAR_GAP;

        Self {
            n,
            cell,
            grid_x,
            grid_y,
            bar_x,
            width: bar_x + BAR_WIDTH + TICK_GAP + BAR_LABEL_WIDTH + PAD,
            height: grid_y + grid + label_extent + PAD,
        }
    }

    fn grid_size(&self) -> i32 {
        self.n * self.cell
    }
}

/// Render `matrix` as a labeled heat map over the range [-1, 1] and write it to `path`.
///
/// The figure is SVG whatever the extension of `path`.
///
/// # Errors
/// Returns `NotSquare` or `LabelCountMismatch` for inconsistent input, and
/// `Render` if the matrix is empty or the file cannot be written
pub fn plot_heat_map(
    matrix: &Array2<f64>,
    labels: &[String],
    path: &Path,
    colormap: Colormap,
) -> Result<()> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(FeatError::NotSquare { rows, cols });
    }
    if labels.len() != rows {
        return Err(FeatError::LabelCountMismatch {
            labels: labels.len(),
            dim: rows,
        });
    }
    if rows == 0 {
        return Err(FeatError::Render("cannot draw an empty matrix".into()));
    }

    let layout = Layout::new(rows, labels);
    #[allow(clippy::cast_sign_loss)]
    let size = (layout.width as u32, layout.height as u32);

    let root = SVGBackend::new(path, size).into_drawing_area();
    draw(&root, &layout, matrix, labels, colormap)
        .map_err(|e| FeatError::Render(e.to_string()))?;

    info!(path = %path.display(), features = rows, "wrote heat map");
    Ok(())
}

type DrawResult = std::result::Result<(), DrawingAreaErrorKind<std::io::Error>>;

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn draw(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    layout: &Layout,
    matrix: &Array2<f64>,
    labels: &[String],
    colormap: Colormap,
) -> DrawResult {
    root.fill(&WHITE)?;

    let (gx, gy, cell) = (layout.grid_x, layout.grid_y, layout.cell);
    let grid = layout.grid_size();

    for ((i, j), &value) in matrix.indexed_iter() {
        let x0 = gx + j as i32 * cell;
        let y0 = gy + i as i32 * cell;
        let color = colormap.color(value, VMIN, VMAX);
        root.draw(&Rectangle::new(
            [(x0, y0), (x0 + cell, y0 + cell)],
            color.filled(),
        ))?;
    }
    root.draw(&Rectangle::new([(gx, gy), (gx + grid, gy + grid)], &BLACK))?;

    let y_style = label_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Center));
    let x_style = label_font()
        .transform(FontTransform::Rotate90)
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));

    for (k, label) in labels.iter().enumerate() {
        let center = k as i32 * cell + cell / 2;
        root.draw(&Text::new(
            label.as_str(),
            (gx - TICK_GAP, gy + center),
            y_style.clone(),
        ))?;
        root.draw(&Text::new(
            label.as_str(),
            (gx + center, gy + grid + TICK_GAP),
            x_style.clone(),
        ))?;
    }

    draw_colorbar(root, layout, colormap)?;
    root.present()
}

/// Vertical color scale next to the grid, `VMAX` at the top
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn draw_colorbar(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    layout: &Layout,
    colormap: Colormap,
) -> DrawResult {
    let (bx, top) = (layout.bar_x, layout.grid_y);
    let height = layout.grid_size();

    for y in 0..height {
        let value = VMAX - (VMAX - VMIN) * (f64::from(y) + 0.5) / f64::from(height);
        root.draw(&Rectangle::new(
            [(bx, top + y), (bx + BAR_WIDTH, top + y + 1)],
            colormap.color(value, VMIN, VMAX).filled(),
        ))?;
    }
    root.draw(&Rectangle::new(
        [(bx, top), (bx + BAR_WIDTH, top + height)],
        &BLACK,
    ))?;

    let style = label_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    for tick in BAR_TICKS {
        let y = top + ((VMAX - tick) / (VMAX - VMIN) * f64::from(height)).round() as i32;
        root.draw(&PathElement::new(
            vec![(bx + BAR_WIDTH, y), (bx + BAR_WIDTH + TICK_GAP, y)],
            &BLACK,
        ))?;
        root.draw(&Text::new(
            format!("{tick:.1}"),
            (bx + BAR_WIDTH + TICK_GAP + 2, y),
            style.clone(),
        ))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::TempDir;

    fn abc() -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into()]
    }

    #[test]
    fn test_plot_identity() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("corr.svg");
        let matrix = Array2::eye(3);

        plot_heat_map(&matrix, &abc(), &path, Colormap::default()).expect("plot");

        let svg = std::fs::read_to_string(&path).expect("read svg");
        assert!(svg.contains("<svg"));
        // 3 y labels, 3 x labels, 5 color bar ticks
        assert_eq!(svg.matches("<text").count(), 11);
        for label in abc() {
            assert!(svg.contains(&format!("\n{label}\n")), "label {label} missing");
        }
    }

    #[test]
    fn test_plot_with_nan() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join(DEFAULT_HEAT_MAP_FILE);
        let matrix = array![[1.0, f64::NAN], [f64::NAN, f64::NAN]];
        let labels = vec!["x".to_string(), "y".to_string()];

        plot_heat_map(&matrix, &labels, &path, Colormap::Coolwarm).expect("plot");
        assert!(path.exists());
    }

    #[test]
    fn test_label_count_mismatch() {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("corr.svg");
        let labels = vec!["a".to_string(), "b".to_string()];

        let err = plot_heat_map(&Array2::eye(3), &labels, &path, Colormap::Viridis)
            .expect_err("mismatch");
        assert!(matches!(err, FeatError::LabelCountMismatch { labels: 2, dim: 3 }));
        assert!(!path.exists());
    }

    #[test]
    fn test_not_square() {
        let dir = TempDir::new().expect("create temp dir");
        let err = plot_heat_map(
            &Array2::zeros((2, 3)),
            &abc(),
            &dir.path().join("corr.svg"),
            Colormap::Viridis,
        )
        .expect_err("not square");
        assert!(matches!(err, FeatError::NotSquare { rows: 2, cols: 3 }));
    }

    #[test]
    fn test_colormap_endpoints() {
        assert_eq!(Colormap::Viridis.color(-1.0, -1.0, 1.0), RGBColor(68, 1, 84));
        assert_eq!(Colormap::Viridis.color(1.0, -1.0, 1.0), RGBColor(253, 231, 37));
        assert_eq!(Colormap::Viridis.color(0.0, -1.0, 1.0), RGBColor(33, 144, 141));
        assert_eq!(Colormap::Greys.color(5.0, -1.0, 1.0), RGBColor(0, 0, 0));
        assert_eq!(Colormap::Greys.color(0.0, -1.0, 1.0), RGBColor(128, 128, 128));
        assert_eq!(Colormap::Magma.color(f64::NAN, -1.0, 1.0), NAN_COLOR);
    }
}
