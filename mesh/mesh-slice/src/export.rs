//! SVG preview of sliced layers.

use std::fmt::Write;
use std::path::Path;

use crate::error::{SliceError, SliceResult};
use crate::layer::Layer;

/// Parameters for SVG export.
#[derive(Debug, Clone)]
pub struct SvgExportParams {
    /// Width of the SVG in pixels.
    pub width: u32,
    /// Height of the SVG in pixels.
    pub height: u32,
    /// Padding around the content in pixels.
    pub padding: u32,
    /// Stroke width for perimeters, in pixels.
    pub stroke_width: f64,
    /// Fill color for the cross-section (CSS color string).
    pub fill_color: String,
    /// Stroke color for perimeters.
    pub stroke_color: String,
    /// Stroke color for infill lines.
    pub infill_color: String,
    /// Background color.
    pub background_color: String,
    /// Whether to fill the cross-section.
    pub fill_perimeters: bool,
    /// Whether to draw infill lines.
    pub show_infill: bool,
}

impl Default for SvgExportParams {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            padding: 20,
            stroke_width: 1.0,
            fill_color: "#4a90d9".to_string(),
            stroke_color: "#2d5986".to_string(),
            infill_color: "#d9822b".to_string(),
            background_color: "#f5f5f5".to_string(),
            fill_perimeters: true,
            show_infill: true,
        }
    }
}

impl SvgExportParams {
    /// Create params with custom colors.
    #[must_use]
    pub fn with_colors(mut self, fill: &str, stroke: &str) -> Self {
        self.fill_color = fill.to_string();
        self.stroke_color = stroke.to_string();
        self
    }

    /// Create params with custom size.
    #[must_use]
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}


/// Render a layer's perimeters and infill as an SVG document.
///
/// All perimeters share one even-odd path, so holes show as background.
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_slice::{slice_layer, export_layer_svg, SvgExportParams};
///
/// let layer = slice_layer(&unit_cube(), 0.5, Some(0.2));
/// let svg = export_layer_svg(&layer, &SvgExportParams::default());
/// assert!(svg.contains("<svg"));
/// assert!(svg.contains("<polyline"));
/// ```
#[must_use]
pub fn export_layer_svg(layer: &Layer, params: &SvgExportParams) -> String {
    if layer.is_empty() {
        return format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">\n\
  <rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n\
  <text x=\"50%\" y=\"50%\" text-anchor=\"middle\" fill=\"#999\">Empty layer {}</text>\n\
</svg>",
            params.width,
            params.height,
            params.width,
            params.height,
            params.background_color,
            layer.index
        );
    }

    let bounds = layer.bounds();
    let content_width = bounds.width();
    let content_height = bounds.height();

    let padding = f64::from(params.padding);
    let available_width = 2.0f64.mul_add(-padding, f64::from(params.width));
    let available_height = 2.0f64.mul_add(-padding, f64::from(params.height));

    let scale = if content_width > 0.0 && content_height > 0.0 {
        (available_width / content_width).min(available_height / content_height)
    } else {
        1.0
    };

    let offset_x = padding + content_width.mul_add(-scale, available_width) / 2.0;
    let offset_y = padding + content_height.mul_add(-scale, available_height) / 2.0;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
  <rect width="100%" height="100%" fill="{}"/>
  <g transform="translate({:.2},{:.2}) scale({:.6},{:.6})">
"#,
        params.width,
        params.height,
        params.width,
        params.height,
        params.background_color,
        bounds.min_x.mul_add(-scale, offset_x),
        bounds.max_y.mul_add(scale, offset_y), // SVG Y is inverted
        scale,
        -scale
    );

    let mut path = String::new();
    for polygon in &layer.perimeters {
        for (i, point) in polygon.points().iter().enumerate() {
            let op = if i == 0 { "M" } else { " L" };
            let _ = write!(path, "{op} {:.4} {:.4}", point.x, point.y);
        }
        path.push_str(" Z ");
    }
    let fill = if params.fill_perimeters {
        params.fill_color.as_str()
    } else {
        "none"
    };
    let _ = writeln!(
        svg,
        r#"    <path d="{}" fill="{}" fill-rule="evenodd" stroke="{}" stroke-width="{:.4}"/>"#,
        path.trim_end(),
        fill,
        params.stroke_color,
        params.stroke_width / scale
    );

    if params.show_infill {
        for line in &layer.infill {
            let points: Vec<String> = line
                .points()
                .iter()
                .map(|p| format!("{:.4},{:.4}", p.x, p.y))
                .collect();
            let _ = writeln!(
                svg,
                r#"    <polyline points="{}" fill="none" stroke="{}" stroke-width="{:.4}"/>"#,
                points.join(" "),
                params.infill_color,
                params.stroke_width * 0.5 / scale
            );
        }
    }

    svg.push_str("  </g>\n");

    let _ = write!(
        svg,
        "  <text x=\"10\" y=\"20\" font-family=\"monospace\" font-size=\"12\" fill=\"#666\">\n\
    Layer {}: Z={:.2}mm, {} perimeters, {} infill lines\n\
  </text>\n",
        layer.index,
        layer.z,
        layer.perimeters.len(),
        layer.infill.len()
    );

    svg.push_str("</svg>");

    svg
}

/// Render a layer and write it to `path`.
///
/// # Errors
///
/// Returns [`SliceError::IoWrite`] if the file cannot be written.
pub fn write_layer_svg(
    layer: &Layer,
    params: &SvgExportParams,
    path: impl AsRef<Path>,
) -> SliceResult<()> {
    let path = path.as_ref();
    std::fs::write(path, export_layer_svg(layer, params)).map_err(|source| SliceError::IoWrite {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{InfillLine, Polygon};
    use nalgebra::Point2;

    fn create_test_layer() -> Layer {
        Layer {
            perimeters: vec![
                Polygon::new(vec![
                    Point2::new(0.0, 0.0),
                    Point2::new(10.0, 0.0),
                    Point2::new(10.0, 10.0),
                    Point2::new(0.0, 10.0),
                ]),
                Polygon::new(vec![
                    Point2::new(4.0, 4.0),
                    Point2::new(6.0, 4.0),
                    Point2::new(6.0, 6.0),
                    Point2::new(4.0, 6.0),
                ]),
            ],
            infill: vec![
                InfillLine::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)),
                InfillLine::new(Point2::new(10.0, 2.0), Point2::new(0.0, 2.0)),
            ],
            ..Layer::empty(0, 1.0)
        }
    }

    #[test]
    fn test_svg_export_params_default() {
        let params = SvgExportParams::default();
        assert_eq!(params.width, 800);
        assert_eq!(params.height, 600);
        assert_eq!(params.padding, 20);
        assert!(params.fill_perimeters);
        assert!(params.show_infill);
    }

    #[test]
    fn test_svg_export_params_builder() {
        let params = SvgExportParams::default()
            .with_colors("#ff0000", "#000000")
            .with_size(1024, 768);

        assert_eq!(params.fill_color, "#ff0000");
        assert_eq!(params.stroke_color, "#000000");
        assert_eq!(params.width, 1024);
        assert_eq!(params.height, 768);
    }

    #[test]
    fn test_export_layer_svg_empty() {
        let svg = export_layer_svg(&Layer::empty(4, 0.0), &SvgExportParams::default());

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Empty layer 4"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn test_export_layer_svg_with_geometry() {
        let svg = export_layer_svg(&create_test_layer(), &SvgExportParams::default());

        assert!(svg.contains("<path"));
        assert!(svg.contains("evenodd"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains(" Z M "));
        assert!(svg.contains("Layer 0:"));
    }

    #[test]
    fn test_export_without_infill() {
        let params = SvgExportParams {
            show_infill: false,
            ..Default::default()
        };
        let svg = export_layer_svg(&create_test_layer(), &params);
        assert!(!svg.contains("<polyline"));
    }

    #[test]
    fn test_write_layer_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layer.svg");
        write_layer_svg(&create_test_layer(), &SvgExportParams::default(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("<svg"));

        let bad = dir.path().join("missing").join("layer.svg");
        assert!(matches!(
            write_layer_svg(&create_test_layer(), &SvgExportParams::default(), &bad),
            Err(SliceError::IoWrite { .. })
        ));
    }
}
