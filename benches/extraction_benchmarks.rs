//! Benchmarks for single-video and batch extraction.
//!
//! Run with: cargo bench
//!
//! Requires fixture files from `tests/fixtures/generate_fixtures.sh`.

use std::{fs, path::Path};

use criterion::{Criterion, criterion_group, criterion_main};
use framesplit::{
    ExtractOptions, FfmpegLogLevel, FrameSource, VideoReader, extract_all, extract_video,
    set_ffmpeg_log_level,
};

const LONG_VIDEO: &str = "tests/fixtures/long.mp4";

fn benchmark_decode_only(criterion: &mut Criterion) {
    set_ffmpeg_log_level(FfmpegLogLevel::Error);

    if !Path::new(LONG_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    criterion.bench_function("decode 30 frames (no writes)", |bencher| {
        bencher.iter(|| {
            let mut reader = VideoReader::open(LONG_VIDEO).unwrap();
            while reader.next_frame().unwrap().is_some() {}
        });
    });
}

fn benchmark_single_video(criterion: &mut Criterion) {
    if !Path::new(LONG_VIDEO).exists() {
        return;
    }

    let out = tempfile::tempdir().unwrap();
    criterion.bench_function("extract 30 frames to png", |bencher| {
        bencher.iter(|| extract_video(LONG_VIDEO, out.path()).unwrap());
    });
}

fn benchmark_batch(criterion: &mut Criterion) {
    if !Path::new(LONG_VIDEO).exists() {
        return;
    }

    let input = tempfile::tempdir().unwrap();
    let videos: Vec<_> = (0..8)
        .map(|index| {
            let path = input.path().join(format!("copy_{index}.mp4"));
            fs::copy(LONG_VIDEO, &path).unwrap();
            path
        })
        .collect();
    let out = tempfile::tempdir().unwrap();

    let mut group = criterion.benchmark_group("batch of 8 videos");
    group.sample_size(10);
    for workers in [1, 4] {
        let options = ExtractOptions::new().with_workers(workers);
        group.bench_function(format!("{workers} worker(s)"), |bencher| {
            bencher.iter(|| extract_all(&videos, out.path(), &options).unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_decode_only,
    benchmark_single_video,
    benchmark_batch
);
criterion_main!(benches);
