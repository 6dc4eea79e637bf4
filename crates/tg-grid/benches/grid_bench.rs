use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tg_grid::{ColumnLayout, FrameInput, GridMetrics, NavDirection, PatternViewState};
use tg_ir::{CollapseLevel, Song};

fn song() -> Song {
    let mut song = Song::with_channels("bench", 64, 64);
    for o in 1..32 {
        song.add_order(o);
    }
    for ch in (0..64).step_by(5) {
        song.set_collapse(ch, CollapseLevel::from_level((ch % 4) as u8));
        song.set_effect_columns(ch + 1, 4);
    }
    song.set_visible(7, false);
    song
}

fn layout_rebuild(c: &mut Criterion) {
    let mut song = song();
    let mut layout = ColumnLayout::new(GridMetrics::default());
    c.bench_function("layout_rebuild_64ch", |b| {
        b.iter(|| {
            song.set_visible(7, !layout.is_visible(7));
            black_box(layout.sync(&song));
        })
    });
}

fn hit_test(c: &mut Criterion) {
    let song = song();
    let mut view = PatternViewState::default();
    view.set_viewport(1920.0, 1080.0);
    view.tick(&song, &FrameInput::stopped());
    c.bench_function("hit_test_grid", |b| {
        b.iter(|| {
            let mut hits = 0u32;
            for y in (0..1080).step_by(16) {
                for x in (0..1920).step_by(24) {
                    hits += view.hit_test(&song, [x as f32, y as f32]).is_some() as u32;
                }
            }
            black_box(hits)
        })
    });
}

fn follow_tick(c: &mut Criterion) {
    let song = song();
    let mut view = PatternViewState::default();
    view.set_viewport(1920.0, 1080.0);
    let mut step = 0u32;
    c.bench_function("follow_tick", |b| {
        b.iter(|| {
            step = step.wrapping_add(1);
            let frame = FrameInput::playing_at(((step / 64) % 32) as u16, (step % 64) as u16);
            black_box(view.tick(&song, &frame))
        })
    });
}

fn navigate(c: &mut Criterion) {
    let song = song();
    let mut view = PatternViewState::default();
    view.tick(&song, &FrameInput::stopped());
    c.bench_function("navigate_right", |b| {
        b.iter(|| black_box(view.on_key_navigate(&song, NavDirection::Right, false, false)))
    });
}

criterion_group!(benches, layout_rebuild, hit_test, follow_tick, navigate);
criterion_main!(benches);
