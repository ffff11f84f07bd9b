//! Mesh reconstruction
//!
//! Interpolates the sparse (time, strike-or-moneyness, vol) point cloud a
//! snapshot carries onto a regular grid for rendering and export. The
//! cloud is a union of constant-time strike slices (one per expiration),
//! so each mesh node is resolved by linear interpolation in the strike
//! direction within the two bracketing slices, then linearly in time
//! between them. Nodes outside the data envelope stay empty rather than
//! being extrapolated or zero-filled.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::core::{SurfacePoint, VolError, VolResult};

/// Default mesh resolution per axis.
pub const DEFAULT_GRID_SIZE: usize = 50;

/// Time values closer than this are treated as the same expiration slice.
const TIME_EPS: f64 = 1e-9;

/// One scattered input point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    /// Time to expiration in years
    pub time: f64,
    /// Strike or moneyness, the caller's choice of vertical axis
    pub level: f64,
    /// Implied volatility in percent
    pub vol: f64,
}

impl GridPoint {
    pub fn new(time: f64, level: f64, vol: f64) -> Self {
        Self { time, level, vol }
    }

    /// View a surface row with strike on the vertical axis.
    pub fn by_strike(p: &SurfacePoint) -> Self {
        Self::new(p.time_to_expiration, p.strike, p.implied_volatility)
    }

    /// View a surface row with moneyness on the vertical axis.
    pub fn by_moneyness(p: &SurfacePoint) -> Self {
        Self::new(p.time_to_expiration, p.moneyness, p.implied_volatility)
    }
}

/// A regular mesh over the data envelope.
///
/// `values` is indexed `[level, time]`; `None` cells lie outside the
/// convex hull of the inputs and must be rendered as absent, never as
/// zero volatility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSurface {
    pub times: Vec<f64>,
    pub levels: Vec<f64>,
    pub values: Array2<Option<f64>>,
}

impl GridSurface {
    /// Value at mesh node (`level_idx`, `time_idx`).
    pub fn value(&self, level_idx: usize, time_idx: usize) -> Option<f64> {
        self.values[[level_idx, time_idx]]
    }

    /// Number of populated cells.
    pub fn populated(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// One expiration's worth of points, sorted by level.
struct Slice {
    time: f64,
    points: Vec<(f64, f64)>,
}

impl Slice {
    /// Linear interpolation at `level`, `None` outside this slice's range.
    fn value_at(&self, level: f64) -> Option<f64> {
        if self.points.len() < 2 {
            return self
                .points
                .iter()
                .find(|(l, _)| (l - level).abs() < TIME_EPS)
                .map(|&(_, v)| v);
        }

        let (first, _) = self.points[0];
        let (last, _) = self.points[self.points.len() - 1];
        // Tolerate the one-ulp overshoot a linspace endpoint can carry
        let eps = (last - first).abs() * 1e-12;
        if level < first - eps || level > last + eps {
            return None;
        }
        let level = level.clamp(first, last);

        let right = self.points.partition_point(|&(l, _)| l < level);
        if right == 0 {
            return Some(self.points[0].1);
        }
        let (l0, v0) = self.points[right - 1];
        let (l1, v1) = self.points[right.min(self.points.len() - 1)];
        if (l1 - l0).abs() < f64::EPSILON {
            return Some((v0 + v1) / 2.0);
        }

        let alpha = (level - l0) / (l1 - l0);
        Some(v0 + alpha * (v1 - v0))
    }
}

fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let step = (hi - lo) / (n - 1) as f64;
    (0..n).map(|i| lo + step * i as f64).collect()
}

fn group_slices(points: &[GridPoint]) -> Vec<Slice> {
    let mut sorted: Vec<&GridPoint> = points.iter().collect();
    sorted.sort_by(|a, b| a.time.total_cmp(&b.time).then(a.level.total_cmp(&b.level)));

    let mut slices: Vec<Slice> = Vec::new();
    for p in sorted {
        match slices.last_mut() {
            Some(s) if (s.time - p.time).abs() < TIME_EPS => s.points.push((p.level, p.vol)),
            _ => slices.push(Slice {
                time: p.time,
                points: vec![(p.level, p.vol)],
            }),
        }
    }
    slices
}

/// Reconstruct a `grid_size` × `grid_size` mesh from scattered points.
///
/// Degenerate inputs (fewer than three points, a single expiration
/// slice, zero strike spread, no slice with two or more points) return
/// `VolError::InsufficientData` instead of a mesh of empty cells
/// masquerading as a surface.
pub fn reconstruct(points: &[GridPoint], grid_size: usize) -> VolResult<GridSurface> {
    if grid_size < 2 {
        return Err(VolError::invalid_input("grid size must be at least 2"));
    }
    if points.len() < 3 {
        return Err(VolError::insufficient_data(format!(
            "{} points, need at least 3",
            points.len()
        )));
    }

    let slices = group_slices(points);
    if slices.len() < 2 {
        return Err(VolError::insufficient_data(
            "all points share one expiration",
        ));
    }
    if !slices.iter().any(|s| s.points.len() >= 2) {
        return Err(VolError::insufficient_data(
            "no expiration has two or more strikes",
        ));
    }

    let level_min = points.iter().map(|p| p.level).fold(f64::INFINITY, f64::min);
    let level_max = points
        .iter()
        .map(|p| p.level)
        .fold(f64::NEG_INFINITY, f64::max);
    if level_max - level_min < TIME_EPS {
        return Err(VolError::insufficient_data("zero strike spread"));
    }

    let time_min = slices[0].time;
    let time_max = slices[slices.len() - 1].time;

    let times = linspace(time_min, time_max, grid_size);
    let levels = linspace(level_min, level_max, grid_size);

    let mut values: Array2<Option<f64>> = Array2::from_elem((grid_size, grid_size), None);
    for (i, &level) in levels.iter().enumerate() {
        for (j, &time) in times.iter().enumerate() {
            values[[i, j]] = node_value(&slices, time, level);
        }
    }

    Ok(GridSurface {
        times,
        levels,
        values,
    })
}

/// Resolve one mesh node against the bracketing slices.
fn node_value(slices: &[Slice], time: f64, level: f64) -> Option<f64> {
    let right = slices.partition_point(|s| s.time < time - TIME_EPS);

    // Node sits on a slice
    if right < slices.len() && (slices[right].time - time).abs() <= TIME_EPS {
        return slices[right].value_at(level);
    }
    // Off either end of the tenor range
    if right == 0 || right == slices.len() {
        return None;
    }

    let (lo, hi) = (&slices[right - 1], &slices[right]);
    let v0 = lo.value_at(level)?;
    let v1 = hi.value_at(level)?;
    let alpha = (time - lo.time) / (hi.time - lo.time);
    Some(v0 + alpha * (v1 - v0))
}
