use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rigstate_controller_core::Controller;
use rigstate_test_fixtures as fixtures;

fn controller_tick(c: &mut Criterion) {
    let mut controller = Controller::new(
        Arc::new(fixtures::layered().expect("fixture graph")),
        Arc::new(fixtures::clip_set()),
        Arc::new(fixtures::bone_masks()),
    );
    let speed = controller.parameter_index("speed").expect("speed param");
    let wave = controller.parameter_index("wave").expect("wave param");
    let mut instance = controller.instantiate();

    c.bench_function("controller_update_3_layers", |b| {
        let mut tick = 0u32;
        b.iter(|| {
            tick = tick.wrapping_add(1);
            instance
                .params
                .set_float(speed, if tick % 120 < 60 { 1.0 } else { 0.0 });
            instance.params.set_bool(wave, tick % 90 < 45);
            let out = controller.update(&mut instance, black_box(1.0 / 60.0));
            black_box(out.layers.len());
        })
    });
}

criterion_group!(benches, controller_tick);
criterion_main!(benches);
