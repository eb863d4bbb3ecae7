use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use stripjoin::{
    find_optimal_seam, row_distance, stitch, ColorModel, JoinSpec, MemorySource, Overlap,
    PixelBuffer, SeamSearch, Sequencer,
};

fn make_strip(width: usize, height: usize, phase: usize) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, y| {
        let v = ((x * 13) ^ ((y + phase) * 7) ^ (x * (y + phase))) & 0xFF;
        [v as u8, (v as u8).wrapping_mul(3), 255 - v as u8]
    })
    .unwrap()
}

fn bench_row_distance(c: &mut Criterion) {
    let a = make_strip(2048, 4, 0);
    let b = make_strip(2048, 4, 3);

    c.bench_function("row_distance_rgb_2048", |bench| {
        bench.iter(|| black_box(row_distance(&a, 3, &b, 0, ColorModel::RGB, 0, false).unwrap()));
    });

    let hsl = ColorModel::HSL.with_hsl_conversion(stripjoin::HslConversion::Converted);
    c.bench_function("row_distance_hsl_converted_2048", |bench| {
        bench.iter(|| black_box(row_distance(&a, 3, &b, 0, hsl, 0, false).unwrap()));
    });
}

fn bench_seam(c: &mut Criterion) {
    let top = make_strip(1024, 64, 0);
    let bottom = make_strip(1024, 256, 64);
    let search = SeamSearch::default();

    c.bench_function("seam_search_1024x256", |bench| {
        bench.iter(|| black_box(find_optimal_seam(&top, &bottom, &search)));
    });

    if cfg!(feature = "rayon") {
        let parallel = search.with_parallel(true);
        c.bench_function("seam_search_1024x256_parallel", |bench| {
            bench.iter(|| black_box(find_optimal_seam(&top, &bottom, &parallel)));
        });
    }
}

fn bench_stitch(c: &mut Criterion) {
    let pieces: Vec<PixelBuffer> = (0..6).map(|i| make_strip(1024, 128, i * 128)).collect();

    let plain = JoinSpec::vertical();
    c.bench_function("stitch_6x1024x128", |bench| {
        bench.iter(|| black_box(stitch(&pieces, &plain).unwrap()));
    });

    let adjusted = JoinSpec::vertical()
        .with_overlap(Overlap::reverse(8))
        .with_spacing(4);
    c.bench_function("stitch_6x1024x128_overlap_spacing", |bench| {
        bench.iter(|| black_box(stitch(&pieces, &adjusted).unwrap()));
    });

    let horizontal = JoinSpec::horizontal();
    c.bench_function("stitch_6x1024x128_horizontal", |bench| {
        bench.iter(|| black_box(stitch(&pieces, &horizontal).unwrap()));
    });
}

fn bench_sequencer(c: &mut Criterion) {
    let mut source = MemorySource::new();
    for i in 0..12 {
        source.push(format!("strip{i:02}"), make_strip(512, 64, i * 64));
    }
    let sequencer = Sequencer::default();

    c.bench_function("sequence_plan_12x512x64", |bench| {
        bench.iter(|| black_box(sequencer.plan(&source).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_row_distance,
    bench_seam,
    bench_stitch,
    bench_sequencer
);
criterion_main!(benches);
