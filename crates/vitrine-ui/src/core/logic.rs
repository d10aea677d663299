//! Shared pure helpers kept host-testable.

/// Aspect-ratio clamp bounds applied before the ratio drives layout.
pub const MIN_ASPECT: f64 = 0.5;
/// Upper aspect-ratio clamp bound.
pub const MAX_ASPECT: f64 = 2.4;

/// Number of pages for a total/page-size pair. Never less than one so the
/// pager always has a valid current page.
#[must_use]
pub const fn total_pages(total: u32, per_page: u32) -> u32 {
    if per_page == 0 {
        return 1;
    }
    let pages = total.div_ceil(per_page);
    if pages == 0 { 1 } else { pages }
}

/// Clamp a width/height ratio to the range the modal layout can render.
#[must_use]
pub fn clamp_aspect(ratio: f64) -> f64 {
    if !ratio.is_finite() || ratio <= 0.0 {
        return 1.0;
    }
    ratio.clamp(MIN_ASPECT, MAX_ASPECT)
}

/// Percent-encode query pairs into a `k=v&k=v` string.
#[must_use]
pub fn encode_query(pairs: &[(&str, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up_and_floors_at_one() {
        assert_eq!(total_pages(0, 24), 1);
        assert_eq!(total_pages(24, 24), 1);
        assert_eq!(total_pages(25, 24), 2);
        assert_eq!(total_pages(10, 0), 1);
    }

    #[test]
    fn aspect_clamps_to_layout_range() {
        assert!((clamp_aspect(0.1) - MIN_ASPECT).abs() < f64::EPSILON);
        assert!((clamp_aspect(9.0) - MAX_ASPECT).abs() < f64::EPSILON);
        assert!((clamp_aspect(1.5) - 1.5).abs() < f64::EPSILON);
        assert!((clamp_aspect(f64::NAN) - 1.0).abs() < f64::EPSILON);
        assert!((clamp_aspect(0.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn query_pairs_are_percent_encoded() {
        let query = encode_query(&[
            ("page", "1".to_string()),
            ("tags", "demo,b&w".to_string()),
        ]);
        assert_eq!(query, "page=1&tags=demo%2Cb%26w");
    }
}
