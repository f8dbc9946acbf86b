// SPDX-License-Identifier: MPL-2.0
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use svgscale::conversion::{RasterOptions, RasterRenderer};
use svgscale::domain::ScaleFactor;

const ICON: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24">
  <circle cx="12" cy="12" r="10" fill="#36c"/>
  <path d="M7 12l3 3 7-7" stroke="#fff" stroke-width="2" fill="none"/>
</svg>"##;

fn rasterize_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("rasterize");

    let renderer = RasterRenderer::new(RasterOptions {
        load_system_fonts: false,
        ..RasterOptions::default()
    });

    for value in [1.0, 8.0, 32.0] {
        let scale = ScaleFactor::new(value).unwrap();
        group.bench_function(format!("icon_{scale}x"), |b| {
            b.iter(|| {
                // Use black_box to prevent the compiler from optimizing away the call
                let _ = black_box(renderer.render_svg(black_box(ICON), scale).unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, rasterize_benchmark);
criterion_main!(benches);
