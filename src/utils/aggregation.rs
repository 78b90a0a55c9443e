/// Thin out chart points to reduce visual noise on long campaigns.
///
/// The first and last points (the window boundaries) are always kept as they
/// are. Interior points are grouped into consecutive buckets; each bucket is
/// drawn at the instant of its middle point with the rounded mean of its
/// counts, so the plotted values stay per-day values.
pub fn downsample_points(points: &[(i64, u64)], target_points: usize) -> Vec<(i64, u64)> {
    if target_points == 0 || points.len() <= target_points {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];
    let interior = &points[1..points.len() - 1];
    let buckets = target_points.saturating_sub(2);

    let mut reduced = Vec::with_capacity(target_points.max(2));
    reduced.push(first);

    if buckets > 0 && !interior.is_empty() {
        let window_size = interior.len().div_ceil(buckets);
        for chunk in interior.chunks(window_size) {
            let len = chunk.len() as u64;
            let total = chunk
                .iter()
                .fold(0u64, |total, (_, count)| total.saturating_add(*count));
            let mean = total / len + u64::from(total % len * 2 >= len);
            reduced.push((chunk[chunk.len() / 2].0, mean));
        }
    }

    reduced.push(last);
    reduced
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DAY: i64 = 86_400;

    #[test]
    fn test_no_aggregation_needed() {
        let data = vec![(0, 10), (DAY, 20)];
        let result = downsample_points(&data, 5);
        assert_eq!(result, data);
    }

    #[test]
    fn test_basic_aggregation() {
        let data = vec![(0, 10), (DAY, 20), (2 * DAY, 30), (3 * DAY, 40)];

        let result = downsample_points(&data, 3);
        assert_eq!(result, vec![(0, 10), (2 * DAY, 25), (3 * DAY, 40)]);
    }

    #[test]
    fn test_empty_data() {
        let data: Vec<(i64, u64)> = vec![];
        assert!(downsample_points(&data, 5).is_empty());
    }

    #[test]
    fn test_zero_target_keeps_everything() {
        let data = vec![(0, 1), (DAY, 2), (2 * DAY, 3)];
        assert_eq!(downsample_points(&data, 0), data);
    }

    #[test]
    fn test_uneven_chunks() {
        let data: Vec<(i64, u64)> = (0..7).map(|day| (day * DAY, 10 * (day as u64 + 1))).collect();

        let result = downsample_points(&data, 4);
        // 5 interior points into 2 buckets means windows of 3: [1,2,3] and [4,5]
        assert_eq!(result, vec![(0, 10), (2 * DAY, 30), (5 * DAY, 55), (6 * DAY, 70)]);
    }

    #[test]
    fn test_boundaries_always_survive() {
        let data = vec![(0, 0), (DAY, 5), (2 * DAY, 5), (3 * DAY, 0)];
        assert_eq!(downsample_points(&data, 2), vec![(0, 0), (3 * DAY, 0)]);
        assert_eq!(downsample_points(&data, 1), vec![(0, 0), (3 * DAY, 0)]);
    }
}
