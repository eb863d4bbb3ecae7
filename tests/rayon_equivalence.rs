#![cfg(feature = "rayon")]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stripjoin::{find_optimal_seam, stitch, JoinSpec, PixelBuffer, SeamSearch};

fn noise(width: usize, height: usize, seed: u64) -> PixelBuffer {
    let mut rng = StdRng::seed_from_u64(seed);
    PixelBuffer::from_fn(width, height, |_, _| {
        [
            rng.random_range(0..=255),
            rng.random_range(0..=255),
            rng.random_range(0..=255),
        ]
    })
    .unwrap()
}

#[test]
fn parallel_seam_search_matches_sequential() {
    for seed in 0..8u64 {
        let top = noise(64, 12, seed);
        let mut bottom = noise(64, 40, seed + 100);
        let last = top.crop(0, 11, 64, 1).unwrap();
        bottom.paste(&last, 0, (seed % 5) as i64);

        let sequential = SeamSearch::default();
        let parallel = sequential.with_parallel(true);
        assert_eq!(
            find_optimal_seam(&top, &bottom, &sequential),
            find_optimal_seam(&top, &bottom, &parallel),
            "seed {seed}"
        );
    }
}

#[test]
fn parallel_ties_keep_the_lowest_row() {
    let top = PixelBuffer::filled(16, 4, [10, 10, 10]).unwrap();
    let bottom = PixelBuffer::filled(16, 30, [40, 40, 40]).unwrap();
    let seam = find_optimal_seam(&top, &bottom, &SeamSearch::default().with_parallel(true));
    assert_eq!(seam.row, 0);
}

#[test]
fn parallel_seam_trim_stitches_identically() {
    let top = noise(32, 10, 1);
    let mut bottom = noise(32, 20, 2);
    bottom.paste(&top.crop(0, 9, 32, 1).unwrap(), 0, 2);

    let sequential = JoinSpec::vertical().with_seam_search(SeamSearch::default());
    let parallel =
        JoinSpec::vertical().with_seam_search(SeamSearch::default().with_parallel(true));
    let pieces = [top, bottom];
    assert_eq!(
        stitch(&pieces, &sequential).unwrap(),
        stitch(&pieces, &parallel).unwrap()
    );
}
