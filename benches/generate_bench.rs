use msdf_rs::*;

use criterion::{criterion_group, criterion_main, Criterion};

// Rounded "O"-like glyph: outer square with bulging cubic sides and a square counter.
fn glyph() -> Shape {
    let mut commands = vec![
        PathCommand::MoveTo(Vec2::new(0.0, 0.0)),
        PathCommand::CubicTo(Vec2::new(0.3, -0.1), Vec2::new(0.7, -0.1), Vec2::new(1.0, 0.0)),
        PathCommand::QuadTo(Vec2::new(1.15, 0.5), Vec2::new(1.0, 1.0)),
        PathCommand::LineTo(Vec2::new(0.0, 1.0)),
        PathCommand::Close,
    ];
    commands.extend([
        PathCommand::MoveTo(Vec2::new(0.3, 0.3)),
        PathCommand::LineTo(Vec2::new(0.3, 0.7)),
        PathCommand::LineTo(Vec2::new(0.7, 0.7)),
        PathCommand::LineTo(Vec2::new(0.7, 0.3)),
        PathCommand::Close,
    ]);
    edge_coloring_simple(&Shape::from_commands(commands), DEFAULT_ANGLE_THRESHOLD, 0)
}

fn generate(c: &mut Criterion) {
    let shape = glyph();
    let width = 64;
    let height = 64;
    let projection = Projection::fit(
        Vec2::new(0.0, -0.1),
        Vec2::new(1.15, 1.0),
        width,
        height,
        4.0,
    )
    .unwrap();
    let config = GeneratorConfig::default();

    c.bench_function("generate_msdf_64", |b| {
        b.iter(|| generate_msdf(&shape, &projection, 0.1, width, height, &config).unwrap())
    });
    c.bench_function("generate_mtsdf_64", |b| {
        b.iter(|| generate_mtsdf(&shape, &projection, 0.1, width, height, &config).unwrap())
    });
    c.bench_function("generate_sdf_64", |b| {
        b.iter(|| generate_sdf(&shape, &projection, 0.1, width, height, &config).unwrap())
    });
}

criterion_group!(benches, generate);
criterion_main!(benches);
