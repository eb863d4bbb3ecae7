use stripjoin::{stitch, JoinSpec, Overlap, PixelBuffer, SeamSearch, StripJoinError};

const RED: [u8; 3] = [255, 0, 0];
const GREEN: [u8; 3] = [0, 255, 0];
const BLUE: [u8; 3] = [0, 0, 255];
const BLACK: [u8; 3] = [0, 0, 0];

fn solid(width: usize, height: usize, rgb: [u8; 3]) -> PixelBuffer {
    PixelBuffer::filled(width, height, rgb).unwrap()
}

fn row_is(buf: &PixelBuffer, y: usize, rgb: [u8; 3]) -> bool {
    (0..buf.width()).all(|x| buf.pixel(x, y) == Some(rgb))
}

#[test]
fn plain_vertical_join_concatenates() {
    let out = stitch(&[solid(4, 3, RED), solid(4, 2, GREEN)], &JoinSpec::vertical()).unwrap();
    assert_eq!((out.width(), out.height()), (4, 5));
    assert!((0..3).all(|y| row_is(&out, y, RED)));
    assert!((3..5).all(|y| row_is(&out, y, GREEN)));
}

#[test]
fn spacing_bands_sit_between_pieces() {
    let pieces = [solid(100, 50, RED), solid(100, 50, GREEN), solid(100, 50, BLUE)];
    let spec = JoinSpec::vertical().with_spacing(5);
    let out = stitch(&pieces, &spec).unwrap();

    assert_eq!((out.width(), out.height()), (100, 160));
    let expect = |y: usize| match y {
        0..=49 => RED,
        50..=54 => BLACK,
        55..=104 => GREEN,
        105..=109 => BLACK,
        _ => BLUE,
    };
    for y in 0..160 {
        assert!(row_is(&out, y, expect(y)), "row {y}");
    }
}

#[test]
fn forward_overlap_draws_later_piece_over_earlier() {
    let top = solid(4, 20, RED);
    let bottom = PixelBuffer::from_fn(4, 20, |_, y| [0, y as u8, 0]).unwrap();
    let spec = JoinSpec::vertical().with_overlap(Overlap::forward(10));
    let out = stitch(&[top, bottom], &spec).unwrap();

    assert_eq!(out.height(), 30);
    assert!((0..10).all(|y| row_is(&out, y, RED)));
    assert!(row_is(&out, 10, [0, 0, 0]));
    assert!(row_is(&out, 29, [0, 19, 0]));
}

#[test]
fn reverse_overlap_keeps_earlier_tail_and_clips_later_head() {
    let top = solid(4, 20, RED);
    let bottom = PixelBuffer::from_fn(4, 20, |_, y| [0, y as u8, 0]).unwrap();
    let spec = JoinSpec::vertical().with_overlap(Overlap {
        forward: 3,
        reverse: 10,
    });
    let out = stitch(&[top, bottom], &spec).unwrap();

    assert_eq!(out.height(), 30);
    assert!((0..20).all(|y| row_is(&out, y, RED)));
    assert!(row_is(&out, 20, [0, 10, 0]));
    assert!(row_is(&out, 29, [0, 19, 0]));
}

#[test]
fn reverse_overlap_with_spacing_puts_the_band_after_the_earlier_piece() {
    let top = solid(4, 20, RED);
    let bottom = PixelBuffer::from_fn(4, 20, |_, y| [0, y as u8, 0]).unwrap();
    let spec = JoinSpec::vertical()
        .with_overlap(Overlap::reverse(10))
        .with_spacing(3);
    let out = stitch(&[top, bottom], &spec).unwrap();

    assert_eq!(out.height(), 33);
    assert!((0..20).all(|y| row_is(&out, y, RED)));
    assert!((20..23).all(|y| row_is(&out, y, BLACK)));
    for y in 23..33 {
        assert!(row_is(&out, y, [0, (y - 13) as u8, 0]), "row {y}");
    }
}

#[test]
fn equal_overlaps_resolve_forward() {
    let overlap = Overlap {
        forward: 4,
        reverse: 4,
    };
    assert_eq!(overlap.winning(), 4);
    assert!(!overlap.reverse_wins());
}

#[test]
fn forced_widths_are_centered() {
    let spec = JoinSpec::vertical().with_force(true).with_fill([9, 9, 9]);
    let out = stitch(&[solid(10, 2, RED), solid(6, 2, GREEN)], &spec).unwrap();

    assert_eq!((out.width(), out.height()), (10, 4));
    assert!(row_is(&out, 0, RED));
    for x in 0..10 {
        let expect = if (2..8).contains(&x) { GREEN } else { [9, 9, 9] };
        assert_eq!(out.pixel(x, 3), Some(expect), "column {x}");
    }
}

#[test]
fn odd_width_difference_puts_extra_margin_on_the_right() {
    let spec = JoinSpec::vertical().with_force(true).with_fill([9, 9, 9]);
    let out = stitch(&[solid(10, 2, RED), solid(7, 2, GREEN)], &spec).unwrap();

    assert_eq!(out.width(), 10);
    for x in 0..10 {
        let expect = if (1..8).contains(&x) { GREEN } else { [9, 9, 9] };
        assert_eq!(out.pixel(x, 2), Some(expect), "column {x}");
    }
}

#[test]
fn width_mismatch_without_force_fails() {
    let err = stitch(&[solid(10, 2, RED), solid(6, 2, GREEN)], &JoinSpec::vertical())
        .err()
        .unwrap();
    assert_eq!(err, StripJoinError::DimensionMismatch { expected: 10, got: 6 });
}

#[test]
fn offset_shifts_later_pieces_across_the_seam() {
    let spec = JoinSpec::vertical().with_offset(1);
    let out = stitch(&[solid(5, 1, RED), solid(5, 1, GREEN)], &spec).unwrap();
    assert_eq!(out.pixel(0, 1), Some(BLACK));
    assert_eq!(out.pixel(1, 1), Some(GREEN));
    assert_eq!(out.pixel(4, 1), Some(GREEN));
    assert!(row_is(&out, 0, RED));
}

#[test]
fn extreme_offsets_clip_later_pieces_away() {
    for offset in [i64::MAX, i64::MIN] {
        let spec = JoinSpec::vertical().with_offset(offset);
        let out = stitch(&[solid(4, 2, RED), solid(4, 2, GREEN)], &spec).unwrap();
        assert_eq!((out.width(), out.height()), (4, 4), "offset {offset}");
        assert!((0..2).all(|y| row_is(&out, y, RED)));
        assert!((2..4).all(|y| row_is(&out, y, BLACK)));
    }
}

#[test]
fn horizontal_join_places_pieces_side_by_side() {
    let out = stitch(&[solid(5, 4, RED), solid(3, 4, BLUE)], &JoinSpec::horizontal()).unwrap();
    assert_eq!((out.width(), out.height()), (8, 4));
    for y in 0..4 {
        assert_eq!(out.pixel(4, y), Some(RED));
        assert_eq!(out.pixel(5, y), Some(BLUE));
    }

    let err = stitch(&[solid(5, 4, RED), solid(5, 3, BLUE)], &JoinSpec::horizontal())
        .err()
        .unwrap();
    assert_eq!(err, StripJoinError::DimensionMismatch { expected: 4, got: 3 });
}

#[test]
fn seam_trim_drops_repeated_rows() {
    let top = PixelBuffer::from_fn(8, 4, |x, y| [(x * 20) as u8, (y * 30) as u8, 0]).unwrap();
    let bottom = PixelBuffer::from_fn(8, 6, |x, y| {
        if y == 0 {
            [(x * 20) as u8, 90, 0]
        } else {
            [0, 0, (y * 40) as u8]
        }
    })
    .unwrap();
    let spec = JoinSpec::vertical().with_seam_search(SeamSearch::default());
    let out = stitch(&[top, bottom], &spec).unwrap();

    assert_eq!(out.height(), 9);
    assert_eq!(out.pixel(0, 3), Some([0, 90, 0]));
    assert_eq!(out.pixel(0, 4), Some([0, 0, 40]));
}

#[test]
fn rejects_too_few_pieces_and_swallowing_overlap() {
    let err = stitch(&[solid(4, 4, RED)], &JoinSpec::vertical()).err().unwrap();
    assert!(matches!(err, StripJoinError::InvalidInput(_)));

    let spec = JoinSpec::vertical().with_overlap(Overlap::forward(4));
    let err = stitch(&[solid(4, 8, RED), solid(4, 4, GREEN)], &spec)
        .err()
        .unwrap();
    assert_eq!(
        err,
        StripJoinError::OverlapTooLarge {
            overlap: 4,
            extent: 4
        }
    );
}
