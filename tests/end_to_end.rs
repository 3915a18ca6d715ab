use msdf_rs::*;

const SIZE: u32 = 32;

/// Unit circle from four quadratic arcs passing through the exact quadrant midpoints.
fn circle_commands() -> Vec<PathCommand> {
    let k = std::f64::consts::SQRT_2 - 0.5;
    vec![
        PathCommand::MoveTo(Vec2::new(1.0, 0.0)),
        PathCommand::QuadTo(Vec2::new(k, k), Vec2::new(0.0, 1.0)),
        PathCommand::QuadTo(Vec2::new(-k, k), Vec2::new(-1.0, 0.0)),
        PathCommand::QuadTo(Vec2::new(-k, -k), Vec2::new(0.0, -1.0)),
        PathCommand::QuadTo(Vec2::new(k, -k), Vec2::new(1.0, 0.0)),
        PathCommand::Close,
    ]
}

fn circle_projection() -> Projection {
    // Radius 16 texels centered in a 32x32 bitmap.
    Projection::new(Vec2::splat(16.0), Vec2::splat(1.0))
}

/// Radius at which the bilinear median crosses 0.5 along `direction` from the center.
fn crossing_radius(bitmap: &Bitmap, direction: Vec2) -> f64 {
    let center = Vec2::splat(16.0);
    let step = 0.05;
    let mut r = 10.0;
    let mut previous = bitmap.sample_median(center + direction * r);
    while r < 22.0 {
        let next = bitmap.sample_median(center + direction * (r + step));
        if previous >= 0.5 && next < 0.5 {
            let t = f64::from(previous - 0.5) / f64::from(previous - next);
            return r + t * step;
        }
        previous = next;
        r += step;
    }
    f64::INFINITY
}

#[test]
fn circle_boundary_within_one_texel_rms() {
    let shape = edge_coloring_simple(
        &Shape::from_commands(circle_commands()),
        DEFAULT_ANGLE_THRESHOLD,
        0,
    );
    let bitmap = generate_msdf(
        &shape,
        &circle_projection(),
        0.25,
        SIZE,
        SIZE,
        &GeneratorConfig::default(),
    )
    .unwrap();

    let samples = 64;
    let sum_squares: f64 = (0..samples)
        .map(|i| {
            let angle = f64::from(i) * std::f64::consts::TAU / f64::from(samples);
            let error = crossing_radius(&bitmap, Vec2::new(angle.cos(), angle.sin())) - 16.0;
            error * error
        })
        .sum();
    let rms = (sum_squares / f64::from(samples)).sqrt();
    assert!(rms < 1.0, "rms {rms}");
}

#[test]
fn output_does_not_depend_on_thread_count() {
    let shape = edge_coloring_simple(
        &Shape::from_commands(circle_commands()),
        DEFAULT_ANGLE_THRESHOLD,
        5,
    );
    let projection = circle_projection();
    let config = GeneratorConfig::default();
    let parallel = generate_mtsdf(&shape, &projection, 0.25, SIZE, SIZE, &config).unwrap();
    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| generate_mtsdf(&shape, &projection, 0.25, SIZE, SIZE, &config))
        .unwrap();
    assert_eq!(parallel.pixels, single.pixels);
}

#[test]
fn glyph_from_commands_renders_counter() {
    // Square "O" with the counter traced in the opposite direction, left open.
    let commands = [
        PathCommand::MoveTo(Vec2::new(0.0, 0.0)),
        PathCommand::LineTo(Vec2::new(3.0, 0.0)),
        PathCommand::LineTo(Vec2::new(3.0, 3.0)),
        PathCommand::LineTo(Vec2::new(0.0, 3.0)),
        PathCommand::Close,
        PathCommand::MoveTo(Vec2::new(1.0, 1.0)),
        PathCommand::LineTo(Vec2::new(1.0, 2.0)),
        PathCommand::LineTo(Vec2::new(2.0, 2.0)),
        PathCommand::LineTo(Vec2::new(2.0, 1.0)),
    ];
    let shape = edge_coloring_simple(
        &Shape::from_commands(commands),
        DEFAULT_ANGLE_THRESHOLD,
        0,
    );
    assert_eq!(shape.contours.len(), 2);
    assert_eq!(shape.edge_count(), 8);

    let (min, max) = shape.bounds().unwrap();
    let projection = Projection::fit(min, max, 40, 40, 2.0).unwrap();
    let config = GeneratorConfig {
        overlap_support: false,
        ..GeneratorConfig::default()
    };
    let bitmap = generate_msdf(&shape, &projection, 0.5, 40, 40, &config).unwrap();
    assert!(bitmap.sample_median(projection.project(Vec2::new(0.5, 1.5))) > 0.5);
    assert!(bitmap.sample_median(projection.project(Vec2::new(1.5, 1.5))) < 0.5);
    assert!(bitmap.sample_median(projection.project(Vec2::new(-0.2, 1.5))) < 0.5);
    assert_eq!(bitmap.to_rgba8().len(), 40 * 40 * 4);
}
