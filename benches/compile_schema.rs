use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use schemaform::{
    compile_fields, validators, ComponentKit, FieldDescriptor, FormAction, FormOptions, FormProps, FormStore,
    MemoryStore, Schema, SchemaForm,
};
use serde_json::json;

fn schema(fields: usize) -> Schema {
    (0..fields)
        .map(|i| {
            let mut descriptor = FieldDescriptor::new(if i % 2 == 0 { "number" } else { "text" })
                .validate(validators::required())
                .validate(validators::number());
            if i > 0 {
                descriptor = descriptor.visible_if(format!("field{}", i - 1));
            }
            (format!("field{}", i), descriptor)
        })
        .collect()
}

fn benchmark_compile(c: &mut Criterion) {
    let kit = ComponentKit::html();
    let mut group = c.benchmark_group("compile_fields");

    for size in [5usize, 25, 100] {
        let schema = schema(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &schema, |b, schema| {
            b.iter(|| compile_fields(&kit, black_box("bench"), black_box(schema)).unwrap())
        });
    }
    group.finish();
}

fn benchmark_render(c: &mut Criterion) {
    let store = MemoryStore::shared();
    let form = SchemaForm::new(&ComponentKit::html(), store.clone(), "bench", &schema(25), FormOptions::default())
        .unwrap();
    let mounted = form.mount(FormProps::new().class_name("bench"));
    for i in 0..25 {
        store.dispatch(FormAction::change("bench", format!("field{}", i), json!(i + 1)));
    }

    c.bench_function("render_form_25", |b| b.iter(|| black_box(mounted.render()).to_string()));
    c.bench_function("is_invalid_25", |b| b.iter(|| store.is_invalid(black_box("bench"))));
}

criterion_group!(benches, benchmark_compile, benchmark_render);
criterion_main!(benches);
