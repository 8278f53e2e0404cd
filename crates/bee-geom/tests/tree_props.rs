// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Property tests for the R-tree wrapper against a brute-force list.

use bee_geom::{BBox, RTree, Vec3};
use proptest::prelude::*;
use proptest::test_runner::{Config as PropConfig, RngAlgorithm, TestRng, TestRunner};

const SEED_BYTES: [u8; 32] = [
    0x12, 0x34, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0,
];
const SIZE: f64 = 128.0;

fn runner() -> TestRunner {
    let rng = TestRng::from_seed(RngAlgorithm::ChaCha, &SEED_BYTES);
    TestRunner::new_with_rng(PropConfig::with_cases(64), rng)
}

// Integer-valued coordinates keep ties and touching faces common.
fn coord() -> impl Strategy<Value = f64> {
    (-128i32..=128).prop_map(f64::from)
}

fn point() -> impl Strategy<Value = Vec3> {
    (coord(), coord(), coord()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn volume() -> impl Strategy<Value = (Vec3, Vec3)> {
    (point(), point()).prop_filter("needs volume", |(a, b)| {
        BBox::new(*a, *b).flat_axes() == 0
    })
}

#[test]
fn find_bbox_matches_brute_force() {
    let strategy = (
        prop::collection::vec(volume(), 0..120),
        point(),
        point(),
    );
    runner()
        .run(&strategy, |(boxes, q1, q2)| {
            let mut tree = RTree::new();
            for (i, (a, b)) in boxes.iter().enumerate() {
                tree.insert(*a, *b, i).expect("valid box");
            }
            let query = BBox::new(q1, q2);
            let mut expected: Vec<usize> = boxes
                .iter()
                .enumerate()
                .filter(|(_, (a, b))| BBox::new(*a, *b).overlaps(&query))
                .map(|(i, _)| i)
                .collect();
            let mut found: Vec<usize> = tree.find_bbox(q1, q2).copied().collect();
            expected.sort_unstable();
            found.sort_unstable();
            prop_assert_eq!(found, expected);
            Ok(())
        })
        .expect("brute force comparison");
}

#[test]
fn insert_remove_round_trip_keeps_survivors() {
    // Each op: (box, value, remove-afterwards?)
    let strategy = prop::collection::vec((volume(), 0u8..4, any::<bool>()), 0..80);
    runner()
        .run(&strategy, |ops| {
            let mut tree = RTree::new();
            let mut live: Vec<(Vec3, Vec3, u8)> = Vec::new();
            for ((a, b), value, remove) in ops {
                let inserted = tree.insert(a, b, value).expect("valid box");
                let (min, max) = Vec3::bbox(&a, &b);
                let present = live
                    .iter()
                    .any(|&(lmin, lmax, lv)| lmin == min && lmax == max && lv == value);
                prop_assert_eq!(inserted, !present);
                if !present {
                    live.push((min, max, value));
                }
                if remove {
                    prop_assert_eq!(tree.remove(b, a, &value), Ok(value));
                    live.retain(|&(lmin, lmax, lv)| !(lmin == min && lmax == max && lv == value));
                }
                prop_assert_eq!(tree.len(), live.len());
            }
            let everything = Vec3::new(SIZE, SIZE, SIZE);
            let mut found: Vec<u8> = tree
                .find_bbox(everything.scale(-1.0), everything)
                .copied()
                .collect();
            let mut expected: Vec<u8> = live.iter().map(|&(_, _, v)| v).collect();
            found.sort_unstable();
            expected.sort_unstable();
            prop_assert_eq!(found, expected);
            Ok(())
        })
        .expect("round trip");
}

#[test]
fn nearest_returns_closest_first() {
    let strategy = (prop::collection::vec(volume(), 1..60), point(), 1usize..5);
    runner()
        .run(&strategy, |(boxes, p, min_count)| {
            let mut tree = RTree::new();
            for (i, (a, b)) in boxes.iter().enumerate() {
                tree.insert(*a, *b, i).expect("valid box");
            }
            let dist2 = |i: usize| {
                let (a, b) = boxes[i];
                let bbox = BBox::new(a, b);
                (0..3)
                    .map(|axis| {
                        let c = p.to_array()[axis];
                        let lo = bbox.min().to_array()[axis];
                        let hi = bbox.max().to_array()[axis];
                        let d = if c < lo { lo - c } else if c > hi { c - hi } else { 0.0 };
                        d * d
                    })
                    .sum::<f64>()
            };
            let found: Vec<usize> = tree
                .find_nearest(p, min_count)
                .into_iter()
                .copied()
                .collect();
            prop_assert!(found.len() >= min_count.min(boxes.len()));
            let worst = found.iter().map(|&i| dist2(i)).fold(0.0, f64::max);
            // Nothing left out may be strictly closer, or tied with the cutoff.
            for i in 0..boxes.len() {
                if !found.contains(&i) {
                    prop_assert!(dist2(i) > worst);
                }
            }
            Ok(())
        })
        .expect("nearest");
}
