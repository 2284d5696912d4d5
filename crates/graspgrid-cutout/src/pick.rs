use graspgrid_core::Cloud;

/// Resolve a pick that hit several points: the highest one (first on ties)
/// wins and its X/Y are truncated toward zero. Out-of-range indices are
/// ignored; `None` when nothing valid was picked.
pub fn pick_highest(points: &Cloud, picked: &[usize]) -> Option<(i32, i32)> {
    let mut best: Option<usize> = None;
    for &i in picked.iter().filter(|&&i| i < points.len()) {
        match best {
            Some(b) if points.z[i] <= points.z[b] => {}
            _ => best = Some(i),
        }
    }
    best.map(|i| (points.x[i].trunc() as i32, points.y[i].trunc() as i32))
}
