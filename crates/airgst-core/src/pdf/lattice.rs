//! Table detection from ruling lines.
//!
//! The lattice approach: snap nearly-equal ruling lines together, join
//! collinear pieces, find where horizontal and vertical lines cross, close
//! the smallest rectangles between crossings into cells, and group cells that
//! share corners into tables. Text runs are then assigned to the cell that
//! contains them.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use tracing::debug;

use super::graphics::{Edge, Orientation, PageGraphics, TextRun};
use super::Row;
use crate::models::config::PdfConfig;

/// Tolerances for the table finder, in PDF units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeSettings {
    pub snap_tolerance: f32,
    pub join_tolerance: f32,
    pub intersection_tolerance: f32,
    pub edge_min_length: f32,
}

impl Default for LatticeSettings {
    fn default() -> Self {
        Self {
            snap_tolerance: 3.0,
            join_tolerance: 3.0,
            intersection_tolerance: 3.0,
            edge_min_length: 3.0,
        }
    }
}

impl From<&PdfConfig> for LatticeSettings {
    fn from(config: &PdfConfig) -> Self {
        Self {
            snap_tolerance: config.snap_tolerance,
            join_tolerance: config.join_tolerance,
            intersection_tolerance: config.intersection_tolerance,
            edge_min_length: config.edge_min_length,
        }
    }
}

/// A cell rectangle. `y0` is the bottom edge, `y1` the top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl CellBox {
    fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    fn corners(&self) -> [PointKey; 4] {
        [
            PointKey::new(self.x0, self.y0),
            PointKey::new(self.x0, self.y1),
            PointKey::new(self.x1, self.y0),
            PointKey::new(self.x1, self.y1),
        ]
    }
}

/// Hashable point key at 1/100 unit resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct PointKey(i64, i64);

impl PointKey {
    fn new(x: f32, y: f32) -> Self {
        Self((x * 100.0).round() as i64, (y * 100.0).round() as i64)
    }
}

/// A crossing of ruling lines and the edges passing through it.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    pub x: f32,
    pub y: f32,
    horizontal: BTreeSet<usize>,
    vertical: BTreeSet<usize>,
}

impl Intersection {
    fn shares_horizontal(&self, other: &Intersection) -> bool {
        !self.horizontal.is_disjoint(&other.horizontal)
    }

    fn shares_vertical(&self, other: &Intersection) -> bool {
        !self.vertical.is_disjoint(&other.vertical)
    }
}

/// Find all tables on a page. Each table is a grid of optional cell strings,
/// rows top to bottom; `None` marks a position covered by a merged cell.
pub fn find_tables(graphics: &PageGraphics, settings: &LatticeSettings) -> Vec<Vec<Row>> {
    let edges = snap_edges(graphics.edges.clone(), settings.snap_tolerance);
    let edges: Vec<Edge> = join_edges(edges, settings.join_tolerance)
        .into_iter()
        .filter(|e| e.length() >= settings.edge_min_length)
        .collect();

    let intersections = edges_to_intersections(&edges, settings.intersection_tolerance);
    let cells = intersections_to_cells(&intersections);
    let tables = cells_to_tables(&cells);

    debug!(
        "Lattice: {} edges, {} intersections, {} cells, {} tables",
        edges.len(),
        intersections.len(),
        cells.len(),
        tables.len()
    );

    tables
        .iter()
        .map(|cells| table_grid(cells, &graphics.runs))
        .collect()
}

/// Cluster edges of each orientation whose positions lie within `tolerance`
/// of their neighbour and move them onto the cluster mean.
pub fn snap_edges(edges: Vec<Edge>, tolerance: f32) -> Vec<Edge> {
    let (mut horizontal, mut vertical): (Vec<Edge>, Vec<Edge>) = edges
        .into_iter()
        .partition(|e| e.orientation == Orientation::Horizontal);

    snap_group(&mut horizontal, tolerance);
    snap_group(&mut vertical, tolerance);

    horizontal.extend(vertical);
    horizontal
}

fn snap_group(edges: &mut [Edge], tolerance: f32) {
    edges.sort_by(|a, b| a.position.total_cmp(&b.position));

    let mut start = 0;
    while start < edges.len() {
        let mut end = start + 1;
        while end < edges.len() && edges[end].position - edges[end - 1].position <= tolerance {
            end += 1;
        }
        let cluster = &mut edges[start..end];
        let mean = cluster.iter().map(|e| e.position).sum::<f32>() / cluster.len() as f32;
        for edge in cluster.iter_mut() {
            edge.position = mean;
        }
        start = end;
    }
}

/// Merge collinear edges that overlap or are separated by at most
/// `tolerance`.
pub fn join_edges(edges: Vec<Edge>, tolerance: f32) -> Vec<Edge> {
    let mut groups: BTreeMap<(u8, i64), Vec<Edge>> = BTreeMap::new();
    for edge in edges {
        let kind = match edge.orientation {
            Orientation::Horizontal => 0,
            Orientation::Vertical => 1,
        };
        let key = (kind, (edge.position * 100.0).round() as i64);
        groups.entry(key).or_default().push(edge);
    }

    let mut joined = Vec::new();
    for (_, mut group) in groups {
        group.sort_by(|a, b| a.start.total_cmp(&b.start));
        let mut current = group[0];
        for edge in group.into_iter().skip(1) {
            if edge.start <= current.end + tolerance {
                current.end = current.end.max(edge.end);
            } else {
                joined.push(current);
                current = edge;
            }
        }
        joined.push(current);
    }
    joined
}

/// Crossings between horizontal and vertical edges.
pub fn edges_to_intersections(edges: &[Edge], tolerance: f32) -> Vec<Intersection> {
    let mut points: BTreeMap<PointKey, Intersection> = BTreeMap::new();

    for (vi, v) in edges.iter().enumerate() {
        if v.orientation != Orientation::Vertical {
            continue;
        }
        for (hi, h) in edges.iter().enumerate() {
            if h.orientation != Orientation::Horizontal {
                continue;
            }
            let crosses = v.position >= h.start - tolerance
                && v.position <= h.end + tolerance
                && h.position >= v.start - tolerance
                && h.position <= v.end + tolerance;
            if !crosses {
                continue;
            }

            let point = points
                .entry(PointKey::new(v.position, h.position))
                .or_insert_with(|| Intersection {
                    x: v.position,
                    y: h.position,
                    horizontal: BTreeSet::new(),
                    vertical: BTreeSet::new(),
                });
            point.horizontal.insert(hi);
            point.vertical.insert(vi);
        }
    }

    points.into_values().collect()
}

/// Close the smallest rectangles whose four corners are connected crossings.
pub fn intersections_to_cells(points: &[Intersection]) -> Vec<CellBox> {
    let by_key: HashMap<PointKey, &Intersection> =
        points.iter().map(|p| (PointKey::new(p.x, p.y), p)).collect();

    // Top to bottom, left to right.
    let mut ordered: Vec<&Intersection> = points.iter().collect();
    ordered.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut cells = Vec::new();
    for p in &ordered {
        let mut below: Vec<&Intersection> = ordered
            .iter()
            .filter(|q| q.x == p.x && q.y < p.y)
            .copied()
            .collect();
        below.sort_by(|a, b| b.y.total_cmp(&a.y));

        let mut right: Vec<&Intersection> = ordered
            .iter()
            .filter(|q| q.y == p.y && q.x > p.x)
            .copied()
            .collect();
        right.sort_by(|a, b| a.x.total_cmp(&b.x));

        'search: for b in &below {
            if !p.shares_vertical(b) {
                continue;
            }
            for r in &right {
                if !p.shares_horizontal(r) {
                    continue;
                }
                let Some(corner) = by_key.get(&PointKey::new(r.x, b.y)) else {
                    continue;
                };
                if corner.shares_vertical(r) && corner.shares_horizontal(b) {
                    cells.push(CellBox {
                        x0: p.x,
                        y0: b.y,
                        x1: r.x,
                        y1: p.y,
                    });
                    break 'search;
                }
            }
        }
    }
    cells
}

/// Group cells sharing at least one corner. Single-cell groups are dropped.
pub fn cells_to_tables(cells: &[CellBox]) -> Vec<Vec<CellBox>> {
    let mut by_corner: HashMap<PointKey, Vec<usize>> = HashMap::new();
    for (i, cell) in cells.iter().enumerate() {
        for corner in cell.corners() {
            by_corner.entry(corner).or_default().push(i);
        }
    }

    let mut seen = vec![false; cells.len()];
    let mut tables = Vec::new();
    for start in 0..cells.len() {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut members = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(i) = queue.pop_front() {
            members.push(cells[i]);
            for corner in cells[i].corners() {
                for &j in by_corner.get(&corner).into_iter().flatten() {
                    if !seen[j] {
                        seen[j] = true;
                        queue.push_back(j);
                    }
                }
            }
        }
        if members.len() > 1 {
            tables.push(members);
        }
    }

    tables.sort_by(|a, b| {
        let top = |t: &Vec<CellBox>| t.iter().map(|c| c.y1).fold(f32::MIN, f32::max);
        let left = |t: &Vec<CellBox>| t.iter().map(|c| c.x0).fold(f32::MAX, f32::min);
        top(b).total_cmp(&top(a)).then(left(a).total_cmp(&left(b)))
    });
    tables
}

fn table_grid(cells: &[CellBox], runs: &[TextRun]) -> Vec<Row> {
    let mut tops: Vec<f32> = cells.iter().map(|c| c.y1).collect();
    tops.sort_by(|a, b| b.total_cmp(a));
    tops.dedup();
    let mut lefts: Vec<f32> = cells.iter().map(|c| c.x0).collect();
    lefts.sort_by(|a, b| a.total_cmp(b));
    lefts.dedup();

    tops.iter()
        .map(|top| {
            lefts
                .iter()
                .map(|left| {
                    cells
                        .iter()
                        .find(|c| c.y1 == *top && c.x0 == *left)
                        .map(|cell| cell_text(cell, runs))
                })
                .collect()
        })
        .collect()
}

fn cell_text(cell: &CellBox, runs: &[TextRun]) -> String {
    // Anchor slightly above the baseline so descenders stay in their cell.
    let mut inside: Vec<&TextRun> = runs
        .iter()
        .filter(|r| cell.contains(r.x + 0.5, r.y + r.size * 0.3))
        .collect();
    inside.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<Vec<&TextRun>> = Vec::new();
    for run in inside {
        let same_line = lines
            .last()
            .is_some_and(|line| (line[0].y - run.y).abs() <= run.size * 0.5);
        if same_line {
            if let Some(line) = lines.last_mut() {
                line.push(run);
            }
        } else {
            lines.push(vec![run]);
        }
    }

    lines
        .iter_mut()
        .map(|line| {
            line.sort_by(|a, b| a.x.total_cmp(&b.x));
            line.iter()
                .map(|r| r.text.trim())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
