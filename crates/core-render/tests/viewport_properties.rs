//! Property tests for viewport projection and auto-scroll.

use core_render::{Viewport, ViewportProjector};
use proptest::prelude::*;

proptest! {
    // In-document scroll offsets always yield a non-empty range holding the first visible line.
    #[test]
    fn range_contains_first_visible_line(
        total in 1usize..5000,
        lh in prop_oneof![Just(14.0f32), Just(18.0), Just(20.0), Just(22.5)],
        overscan in 0usize..10,
        h in 0.0f32..2000.0,
        frac in 0.0f64..1.0,
    ) {
        let p = ViewportProjector::new(lh, overscan);
        let top = ((total as f64 * lh as f64) * frac).floor() as f32;
        prop_assume!(top < total as f32 * lh);
        let r = p.project(top, h, total);
        let first = (top / lh).floor() as usize;
        prop_assert!(!r.is_empty());
        prop_assert!(r.contains(first), "{r:?} missing {first}");
        prop_assert!(r.end <= total);
    }

    // Both bounds are non-decreasing as scroll_top grows.
    #[test]
    fn range_is_monotonic(
        total in 1usize..5000,
        overscan in 0usize..10,
        h in 0.0f32..1000.0,
        a in 0u32..100_000,
        b in 0u32..100_000,
    ) {
        let p = ViewportProjector::new(20.0, overscan);
        let (lo, hi) = (a.min(b) as f32, a.max(b) as f32);
        let r1 = p.project(lo, h, total);
        let r2 = p.project(hi, h, total);
        prop_assert!(r1.start <= r2.start && r1.end <= r2.end);
    }

    // After auto-scroll the cursor line is fully inside the viewport when it fits.
    #[test]
    fn cursor_visible_after_auto_scroll(
        total in 1usize..2000,
        cursor_seed in any::<usize>(),
        start_top in 0u32..50_000,
        pages in 1usize..40,
        margin in 0usize..8,
    ) {
        let lh = 20.0f32;
        let p = ViewportProjector::new(lh, 3).with_scroll_margin(margin);
        let mut vp = Viewport::new(300.0, pages as f32 * lh);
        vp.scroll_top = start_top as f32;
        p.clamp_scroll(&mut vp, total);
        let cursor = cursor_seed % total;
        p.ensure_cursor_visible(&mut vp, cursor, total);
        let top = p.line_top(cursor);
        prop_assert!(vp.scroll_top >= 0.0);
        prop_assert!(vp.scroll_top <= p.max_scroll_top(total, vp.container_height));
        prop_assert!(top >= vp.scroll_top);
        prop_assert!(top + lh <= vp.scroll_top + vp.container_height);
        prop_assert!(p.project(vp.scroll_top, vp.container_height, total).contains(cursor));
    }
}
