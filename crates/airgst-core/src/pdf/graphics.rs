//! Content stream interpretation.
//!
//! Walks the decoded operations of a page and records two things: the
//! axis-aligned line segments that were painted (candidate table rulings)
//! and the positioned text runs. Coordinates are in PDF user space after the
//! current transformation matrix, so y grows upwards.

use lopdf::content::Operation;
use lopdf::Object;
use tracing::trace;

/// Segments within this distance of axis-aligned count as ruling lines.
const AXIS_TOLERANCE: f32 = 0.5;

/// TJ adjustments more negative than this are treated as a word gap.
const TJ_SPACE_THRESHOLD: f32 = -200.0;

/// Average glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// An axis-aligned ruling line.
///
/// `position` is the y coordinate of a horizontal edge or the x coordinate
/// of a vertical one; `start < end` along the other axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub orientation: Orientation,
    pub position: f32,
    pub start: f32,
    pub end: f32,
}

impl Edge {
    pub fn horizontal(y: f32, x0: f32, x1: f32) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            position: y,
            start: x0.min(x1),
            end: x0.max(x1),
        }
    }

    pub fn vertical(x: f32, y0: f32, y1: f32) -> Self {
        Self {
            orientation: Orientation::Vertical,
            position: x,
            start: y0.min(y1),
            end: y0.max(y1),
        }
    }

    pub fn length(&self) -> f32 {
        self.end - self.start
    }
}

/// A string shown at a position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub text: String,
}

/// Everything the table finder needs from one page.
#[derive(Debug, Clone, Default)]
pub struct PageGraphics {
    pub edges: Vec<Edge>,
    pub runs: Vec<TextRun>,
}

type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `a × b` in PDF row-vector convention.
fn multiply(a: &Matrix, b: &Matrix) -> Matrix {
    [
        a[0] * b[0] + a[1] * b[2],
        a[0] * b[1] + a[1] * b[3],
        a[2] * b[0] + a[3] * b[2],
        a[2] * b[1] + a[3] * b[3],
        a[4] * b[0] + a[5] * b[2] + b[4],
        a[4] * b[1] + a[5] * b[3] + b[5],
    ]
}

fn apply(m: &Matrix, x: f32, y: f32) -> (f32, f32) {
    (m[0] * x + m[2] * y + m[4], m[1] * x + m[3] * y + m[5])
}

fn translation(tx: f32, ty: f32) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

fn operand(op: &Operation, index: usize) -> Option<f32> {
    op.operands.get(index)?.as_float().ok()
}

fn operands<const N: usize>(op: &Operation) -> Option<[f32; N]> {
    let mut values = [0.0; N];
    for (i, value) in values.iter_mut().enumerate() {
        *value = operand(op, i)?;
    }
    Some(values)
}

/// Decode a PDF string: UTF-16BE when it carries a byte order mark,
/// otherwise one byte per character.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| b as char).collect()
}

#[derive(Default)]
struct PathState {
    segments: Vec<((f32, f32), (f32, f32))>,
    current: Option<(f32, f32)>,
    subpath_start: Option<(f32, f32)>,
}

impl PathState {
    fn move_to(&mut self, point: (f32, f32)) {
        self.current = Some(point);
        self.subpath_start = Some(point);
    }

    fn line_to(&mut self, point: (f32, f32)) {
        if let Some(from) = self.current {
            self.segments.push((from, point));
        }
        self.current = Some(point);
    }

    fn close(&mut self) {
        if let (Some(from), Some(start)) = (self.current, self.subpath_start) {
            if from != start {
                self.segments.push((from, start));
            }
            self.current = Some(start);
        }
    }

    fn take(&mut self) -> Vec<((f32, f32), (f32, f32))> {
        self.current = None;
        self.subpath_start = None;
        std::mem::take(&mut self.segments)
    }
}

struct TextState {
    matrix: Matrix,
    line_matrix: Matrix,
    leading: f32,
    font_size: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: IDENTITY,
            line_matrix: IDENTITY,
            leading: 0.0,
            font_size: 10.0,
        }
    }
}

impl TextState {
    fn next_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = multiply(&translation(tx, ty), &self.line_matrix);
        self.matrix = self.line_matrix;
    }
}

/// Interpret decoded page operations.
pub fn interpret(operations: &[Operation]) -> PageGraphics {
    let mut graphics = PageGraphics::default();
    let mut ctm = IDENTITY;
    let mut stack: Vec<Matrix> = Vec::new();
    let mut path = PathState::default();
    let mut text = TextState::default();

    for op in operations {
        match op.operator.as_str() {
            "q" => stack.push(ctm),
            "Q" => ctm = stack.pop().unwrap_or(IDENTITY),
            "cm" => {
                if let Some(m) = operands::<6>(op) {
                    ctm = multiply(&m, &ctm);
                }
            }
            "m" => {
                if let Some([x, y]) = operands::<2>(op) {
                    path.move_to(apply(&ctm, x, y));
                }
            }
            "l" => {
                if let Some([x, y]) = operands::<2>(op) {
                    path.line_to(apply(&ctm, x, y));
                }
            }
            "c" => {
                if let Some([.., x, y]) = operands::<6>(op) {
                    path.current = Some(apply(&ctm, x, y));
                }
            }
            "v" | "y" => {
                if let Some([.., x, y]) = operands::<4>(op) {
                    path.current = Some(apply(&ctm, x, y));
                }
            }
            "h" => path.close(),
            "re" => {
                if let Some([x, y, w, h]) = operands::<4>(op) {
                    path.move_to(apply(&ctm, x, y));
                    path.line_to(apply(&ctm, x + w, y));
                    path.line_to(apply(&ctm, x + w, y + h));
                    path.line_to(apply(&ctm, x, y + h));
                    path.close();
                }
            }
            "s" | "b" | "b*" => {
                path.close();
                commit_segments(path.take(), &mut graphics.edges);
            }
            "S" | "f" | "F" | "f*" | "B" | "B*" => {
                commit_segments(path.take(), &mut graphics.edges);
            }
            "n" => {
                path.take();
            }
            "BT" => {
                text.matrix = IDENTITY;
                text.line_matrix = IDENTITY;
            }
            "Tf" => {
                if let Some(size) = operand(op, 1) {
                    text.font_size = size;
                }
            }
            "TL" => {
                if let Some(leading) = operand(op, 0) {
                    text.leading = leading;
                }
            }
            "Td" => {
                if let Some([tx, ty]) = operands::<2>(op) {
                    text.next_line(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = operands::<2>(op) {
                    text.leading = -ty;
                    text.next_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = operands::<6>(op) {
                    text.matrix = m;
                    text.line_matrix = m;
                }
            }
            "T*" => {
                let leading = text.leading;
                text.next_line(0.0, -leading);
            }
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    show_text(&decode_pdf_string(bytes), &ctm, &mut text, &mut graphics.runs);
                }
            }
            "'" => {
                let leading = text.leading;
                text.next_line(0.0, -leading);
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    show_text(&decode_pdf_string(bytes), &ctm, &mut text, &mut graphics.runs);
                }
            }
            "\"" => {
                let leading = text.leading;
                text.next_line(0.0, -leading);
                if let Some(Object::String(bytes, _)) = op.operands.get(2) {
                    show_text(&decode_pdf_string(bytes), &ctm, &mut text, &mut graphics.runs);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    let mut combined = String::new();
                    for item in items {
                        match item {
                            Object::String(bytes, _) => combined.push_str(&decode_pdf_string(bytes)),
                            other => {
                                if other.as_float().map(|k| k < TJ_SPACE_THRESHOLD).unwrap_or(false)
                                    && !combined.ends_with(' ')
                                {
                                    combined.push(' ');
                                }
                            }
                        }
                    }
                    show_text(&combined, &ctm, &mut text, &mut graphics.runs);
                }
            }
            _ => {}
        }
    }

    trace!(
        "Interpreted {} operations: {} edges, {} text runs",
        operations.len(),
        graphics.edges.len(),
        graphics.runs.len()
    );
    graphics
}

fn commit_segments(segments: Vec<((f32, f32), (f32, f32))>, edges: &mut Vec<Edge>) {
    for ((x0, y0), (x1, y1)) in segments {
        if (y0 - y1).abs() <= AXIS_TOLERANCE && (x0 - x1).abs() > AXIS_TOLERANCE {
            edges.push(Edge::horizontal((y0 + y1) / 2.0, x0, x1));
        } else if (x0 - x1).abs() <= AXIS_TOLERANCE && (y0 - y1).abs() > AXIS_TOLERANCE {
            edges.push(Edge::vertical((x0 + x1) / 2.0, y0, y1));
        }
    }
}

fn show_text(s: &str, ctm: &Matrix, text: &mut TextState, runs: &mut Vec<TextRun>) {
    if s.trim().is_empty() {
        return;
    }
    let render = multiply(&text.matrix, ctm);
    let (x, y) = apply(&render, 0.0, 0.0);
    let scale = (render[2] * render[2] + render[3] * render[3]).sqrt();
    runs.push(TextRun {
        x,
        y,
        size: text.font_size * scale,
        text: s.to_string(),
    });

    let advance = s.chars().count() as f32 * text.font_size * GLYPH_ADVANCE;
    text.matrix = multiply(&translation(advance, 0.0), &text.matrix);
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::StringFormat;

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    fn nums(values: &[f32]) -> Vec<Object> {
        values.iter().map(|v| Object::Real(*v)).collect()
    }

    fn string(s: &str) -> Object {
        Object::String(s.as_bytes().to_vec(), StringFormat::Literal)
    }

    #[test]
    fn test_rectangle_becomes_four_edges() {
        let graphics = interpret(&[
            op("re", nums(&[10.0, 20.0, 100.0, 50.0])),
            op("S", vec![]),
        ]);
        let horizontal: Vec<_> = graphics
            .edges
            .iter()
            .filter(|e| e.orientation == Orientation::Horizontal)
            .collect();
        assert_eq!(graphics.edges.len(), 4);
        assert_eq!(horizontal.len(), 2);
        assert!(horizontal.iter().any(|e| e.position == 20.0 && e.start == 10.0 && e.end == 110.0));
        assert!(horizontal.iter().any(|e| e.position == 70.0));
    }

    #[test]
    fn test_discarded_path_and_diagonals_are_ignored() {
        let graphics = interpret(&[
            op("m", nums(&[0.0, 0.0])),
            op("l", nums(&[50.0, 50.0])),
            op("S", vec![]),
            op("re", nums(&[0.0, 0.0, 10.0, 10.0])),
            op("n", vec![]),
        ]);
        assert!(graphics.edges.is_empty());
    }

    #[test]
    fn test_ctm_is_applied_and_restored() {
        let graphics = interpret(&[
            op("q", vec![]),
            op("cm", nums(&[1.0, 0.0, 0.0, 1.0, 100.0, 200.0])),
            op("m", nums(&[0.0, 0.0])),
            op("l", nums(&[50.0, 0.0])),
            op("S", vec![]),
            op("Q", vec![]),
            op("m", nums(&[0.0, 0.0])),
            op("l", nums(&[0.0, 30.0])),
            op("S", vec![]),
        ]);
        assert_eq!(graphics.edges[0], Edge::horizontal(200.0, 100.0, 150.0));
        assert_eq!(graphics.edges[1], Edge::vertical(0.0, 0.0, 30.0));
    }

    #[test]
    fn test_text_positions() {
        let graphics = interpret(&[
            op("BT", vec![]),
            op("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
            op("Td", nums(&[72.0, 700.0])),
            op("Tj", vec![string("Taxable Value")]),
            op("TL", nums(&[14.0])),
            op("T*", vec![]),
            op(
                "TJ",
                vec![Object::Array(vec![string("IGST"), Object::Integer(-300), string("500.00")])],
            ),
            op("ET", vec![]),
        ]);

        assert_eq!(graphics.runs.len(), 2);
        assert_eq!(graphics.runs[0].text, "Taxable Value");
        assert_eq!((graphics.runs[0].x, graphics.runs[0].y), (72.0, 700.0));
        assert_eq!(graphics.runs[0].size, 12.0);
        assert_eq!(graphics.runs[1].text, "IGST 500.00");
        assert_eq!((graphics.runs[1].x, graphics.runs[1].y), (72.0, 686.0));
    }

    #[test]
    fn test_decode_utf16_string() {
        let bytes = [0xFE, 0xFF, 0x00, 0x49, 0x00, 0x4E, 0x00, 0x52];
        assert_eq!(decode_pdf_string(&bytes), "INR");
        assert_eq!(decode_pdf_string(b"CGST"), "CGST");
    }
}
