use krbcam_viewer::data::model::{Frame, RawKineticBuffer};
use krbcam_viewer::data::od::{od_pixel, split_sub_frames, ExtractorConfig, OdExtractor};
use ndarray::{concatenate, Array2, Axis};
use proptest::prelude::*;

const OD_MAX: f64 = 3.0;

/// Small counts so that equal shadow/light/dark values come up often.
fn count() -> impl Strategy<Value = f64> {
    (-4i32..=4).prop_map(f64::from)
}

fn frame(rows: usize, cols: usize, values: impl Strategy<Value = f64>) -> impl Strategy<Value = Frame> {
    prop::collection::vec(values, rows * cols)
        .prop_map(move |v| Array2::from_shape_vec((rows, cols), v).unwrap())
}

/// A buffer of `k` blocks, each holding three `h x w` sub-frames.
fn buffer(k: usize) -> impl Strategy<Value = RawKineticBuffer> {
    (0usize..5, 0usize..5).prop_flat_map(move |(h, w)| {
        prop::collection::vec(frame(3 * h, w, count()), k).prop_map(RawKineticBuffer::new)
    })
}

fn extractor(k: usize) -> OdExtractor {
    OdExtractor::new(ExtractorConfig {
        kinetic_series_length: k,
        num_sub_images: 3,
        od_max: OD_MAX,
    })
    .unwrap()
}

// ── Splitting a block and stacking the bands back is lossless ─────────────

proptest! {
    #[test]
    fn split_then_concatenate_restores_block(
        (n, block) in (1usize..5, 0usize..4, 0usize..4).prop_flat_map(|(n, h, w)| {
            (Just(n), frame(n * h, w, -1e6f64..1e6))
        })
    ) {
        let subs = split_sub_frames(&block, n).unwrap();
        prop_assert_eq!(subs.len(), n);
        let views: Vec<_> = subs.iter().map(|f| f.view()).collect();
        let joined = concatenate(Axis(0), &views).unwrap();
        prop_assert_eq!(joined, block);
    }
}

// ── OD is finite for every finite input ───────────────────────────────────

proptest! {
    #[test]
    fn od_is_always_finite(buf in buffer(2)) {
        let ds = extractor(2).process(&buf).unwrap();
        for series in &ds.series {
            prop_assert!(series.od().iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn od_pixel_is_finite_for_any_finite_pair(
        shadow in prop::num::f64::NORMAL | prop::num::f64::ZERO,
        background in prop::num::f64::NORMAL | prop::num::f64::ZERO,
    ) {
        prop_assert!(od_pixel(shadow, background, OD_MAX).is_finite());
    }
}

// ── Degenerate ratios map to their sentinels ──────────────────────────────

proptest! {
    #[test]
    fn zero_shadow_with_light_is_od_max(background in 1e-9f64..1e9) {
        prop_assert_eq!(od_pixel(0.0, background, OD_MAX), OD_MAX);
    }

    #[test]
    fn zero_background_is_zero(shadow in prop::num::f64::NORMAL) {
        prop_assert_eq!(od_pixel(shadow, 0.0, OD_MAX), 0.0);
    }

    #[test]
    fn opposite_signs_are_zero(shadow in 1e-9f64..1e9, background in 1e-9f64..1e9) {
        prop_assert_eq!(od_pixel(-shadow, background, OD_MAX), 0.0);
        prop_assert_eq!(od_pixel(shadow, -background, OD_MAX), 0.0);
    }

    #[test]
    fn ordinary_pixels_are_ln_ratio(shadow in 1.0f64..1e4, background in 1.0f64..1e4) {
        let od = od_pixel(shadow, background, OD_MAX);
        prop_assert!((od - (background / shadow).ln()).abs() < 1e-12);
    }
}

#[test]
fn zero_over_zero_is_zero() {
    assert_eq!(od_pixel(0.0, 0.0, OD_MAX), 0.0);
}

// ── Output order and purity ───────────────────────────────────────────────

proptest! {
    #[test]
    fn series_follow_input_order(buf in buffer(3)) {
        let ds = extractor(3).process(&buf).unwrap();
        prop_assert_eq!(ds.len(), 3);
        for (block, series) in buf.blocks.iter().zip(&ds.series) {
            let subs = split_sub_frames(block, 3).unwrap();
            prop_assert_eq!(series.frames().len(), 4);
            prop_assert_eq!(&series.frames()[1..], &subs[..]);
        }
    }

    #[test]
    fn processing_is_pure(buf in buffer(2)) {
        let copy = buf.clone();
        let ex = extractor(2);
        let first = ex.process(&buf).unwrap();
        let second = ex.process(&copy).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(buf, copy);
    }
}
