//! PNG rendering of the call graph.
//!
//! The graph is drawn as an SVG scene (edges, then nodes, then labels),
//! rasterised with resvg and encoded with the image crate.

use crate::error::{ExportError, Result};
use crate::graph::CallGraph;
use crate::layout::{spring_layout, Point, SPRING_ITERATIONS, SPRING_K};
use resvg::{tiny_skia, usvg};
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

/// Width and height of the rendered image, in pixels.
pub const CANVAS_SIZE: u32 = 2400;

const MARGIN: f64 = 120.0;
const NODE_RADIUS: f64 = 14.0;
const NODE_FILL: &str = "#add8e6";
const ARROW_SIZE: f64 = 8.0;
const FONT_SIZE: f64 = 11.0;

/// Renders `graph` and writes it to `path` as a PNG.
pub fn render_png(graph: &CallGraph, path: &Path) -> Result<()> {
    let svg = render_svg(graph);
    let pixels = rasterize(&svg)?;

    let image = image::RgbaImage::from_raw(CANVAS_SIZE, CANVAS_SIZE, pixels)
        .ok_or_else(|| ExportError::Render("pixel buffer does not match canvas size".into()))?;
    image.save_with_format(path, image::ImageFormat::Png)?;

    debug!("Rendered {} nodes to {}", graph.node_count(), path.display());
    Ok(())
}

/// Builds the SVG scene for `graph` on a square canvas.
pub fn render_svg(graph: &CallGraph) -> String {
    let positions: Vec<Point> = spring_layout(graph, SPRING_K, SPRING_ITERATIONS)
        .into_iter()
        .map(to_canvas)
        .collect();

    let size = CANVAS_SIZE;
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}">"#
    );
    let _ = writeln!(
        svg,
        r#"<defs><marker id="arrow" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="{a}" markerHeight="{a}" markerUnits="userSpaceOnUse" orient="auto"><path d="M0,0 L10,5 L0,10" fill="none" stroke="black" stroke-width="1.5"/></marker></defs>"#,
        a = ARROW_SIZE
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);

    for (from, to) in graph.edge_endpoints() {
        let (a, b) = (positions[from.index()], positions[to.index()]);
        if let Some((start, end)) = trim_to_circles(a, b) {
            let _ = writeln!(
                svg,
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="black" stroke-width="1" marker-end="url(#arrow)"/>"#,
                start.x, start.y, end.x, end.y
            );
        }
    }

    for p in &positions {
        let _ = writeln!(
            svg,
            r#"<circle cx="{:.2}" cy="{:.2}" r="{}" fill="{}" stroke="black" stroke-width="0.25"/>"#,
            p.x, p.y, NODE_RADIUS, NODE_FILL
        );
    }

    for (node, p) in graph.nodes().zip(&positions) {
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="{}" text-anchor="middle" dominant-baseline="central">{}</text>"#,
            p.x,
            p.y,
            FONT_SIZE,
            escape_xml(&node.id)
        );
    }

    svg.push_str("</svg>\n");
    svg
}

fn rasterize(svg: &str) -> Result<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| ExportError::Render(format!("invalid SVG scene: {}", e)))?;
    let mut pixmap = tiny_skia::Pixmap::new(CANVAS_SIZE, CANVAS_SIZE)
        .ok_or_else(|| ExportError::Render("could not allocate canvas".into()))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    // The background is opaque, so premultiplied and straight alpha agree.
    Ok(pixmap.take())
}

/// Maps a layout position in [-1, 1] to canvas pixels.
fn to_canvas(p: Point) -> Point {
    let half = (CANVAS_SIZE as f64 - 2.0 * MARGIN) / 2.0;
    let center = CANVAS_SIZE as f64 / 2.0;
    Point {
        x: center + p.x * half,
        y: center + p.y * half,
    }
}

/// Shortens the segment a -> b so it starts and ends on the node
/// circles. `None` when the circles overlap.
fn trim_to_circles(a: Point, b: Point) -> Option<(Point, Point)> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length <= 2.0 * NODE_RADIUS {
        return None;
    }
    let (ux, uy) = (dx / length, dy / length);
    Some((
        Point {
            x: a.x + ux * NODE_RADIUS,
            y: a.y + uy * NODE_RADIUS,
        },
        Point {
            x: b.x - ux * NODE_RADIUS,
            y: b.y - uy * NODE_RADIUS,
        },
    ))
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
