//! Shapes feature values into the series the chart widgets draw.

use crate::layer::Shape;
use crate::theme::Aggregate;

/// Folds `value` per distinct `group` property, in first-seen order.
/// Shapes missing either property are skipped.
pub fn group_by(shapes: &[Shape], group: &str, value: &str, agg: Aggregate) -> Vec<(String, f64)> {
    let mut groups: Vec<(String, f64, usize)> = Vec::new();
    for shape in shapes {
        let (Some(label), Some(v)) = (shape.text(group), shape.number(value)) else {
            continue;
        };
        match groups.iter_mut().find(|(l, _, _)| l == label) {
            Some((_, total, n)) => {
                *total += v;
                *n += 1;
            }
            None => groups.push((label.to_string(), v, 1)),
        }
    }
    groups
        .into_iter()
        .map(|(label, total, n)| match agg {
            Aggregate::Sum => (label, total),
            Aggregate::Mean => (label, total / n as f64),
        })
        .collect()
}

/// Largest first, ties by label.
pub fn ranked(mut bars: Vec<(String, f64)>, limit: usize) -> Vec<(String, f64)> {
    bars.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    bars.truncate(limit);
    bars
}

/// Bars in the `(&str, u64)` form `BarChart` takes.
pub fn bar_data(bars: &[(String, f64)]) -> Vec<(&str, u64)> {
    bars.iter().map(|(l, v)| (l.as_str(), v.max(0.0).round() as u64)).collect()
}

/// `(x, y)` points with the bounds a line chart needs; `None` when empty.
pub fn line_bounds(points: &[(f64, f64)]) -> Option<([f64; 2], [f64; 2])> {
    let first = points.first()?;
    let (mut x, mut y) = ([first.0, first.0], [first.1, first.1]);
    for &(px, py) in points {
        x = [x[0].min(px), x[1].max(px)];
        y = [y[0].min(py), y[1].max(py)];
    }
    if y[0] == y[1] {
        y[1] += 1.0;
    }
    Some((x, [y[0].min(0.0), y[1]]))
}
