//! Resolution benchmarks for the binding store and module catalog.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use scopewire_core::container::{BindingStore, ImplementationDescriptor, ServiceScope};
use scopewire_core::{Bootstrapper, Module, ModuleRegistration, ModuleType, RequestContext};

trait Counter: Send + Sync {
    fn value(&self) -> usize;
}

struct FixedCounter(usize);

impl Counter for FixedCounter {
    fn value(&self) -> usize {
        self.0
    }
}

#[derive(Default)]
struct BenchModule;
impl Module for BenchModule {}

fn counter_store(lifetime: ServiceScope) -> BindingStore {
    let mut store = BindingStore::new();
    store
        .register_descriptor(
            ImplementationDescriptor::new::<dyn Counter, FixedCounter, _>(|_| {
                Ok(Arc::new(FixedCounter(7)) as Arc<dyn Counter>)
            }),
            lifetime,
        )
        .unwrap();
    store
}

fn benchmark_single_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_resolution");

    let singleton = counter_store(ServiceScope::Singleton);
    group.bench_function("singleton", |b| {
        b.iter(|| black_box(singleton.resolve::<dyn Counter>(None).unwrap().value()))
    });

    let transient = counter_store(ServiceScope::Transient);
    group.bench_function("transient", |b| {
        b.iter(|| black_box(transient.resolve::<dyn Counter>(None).unwrap().value()))
    });

    let per_request = counter_store(ServiceScope::PerRequestSingleton);
    group.bench_function("per_request_fresh_context", |b| {
        b.iter(|| {
            let context = RequestContext::new();
            black_box(per_request.resolve::<dyn Counter>(Some(&context)).unwrap().value())
        })
    });

    let context = RequestContext::new();
    group.bench_function("per_request_cached", |b| {
        b.iter(|| black_box(per_request.resolve::<dyn Counter>(Some(&context)).unwrap().value()))
    });

    group.finish();
}

fn benchmark_collection_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection_resolution");

    for size in [1usize, 8, 32, 128].iter() {
        let mut store = BindingStore::new();
        let elements = (0..*size)
            .map(|i| {
                ImplementationDescriptor::new::<dyn Counter, FixedCounter, _>(move |_| {
                    Ok(Arc::new(FixedCounter(i)) as Arc<dyn Counter>)
                })
            })
            .collect();
        store
            .register_collection(
                scopewire_core::ServiceId::of::<dyn Counter>(),
                elements,
                ServiceScope::Singleton,
            )
            .unwrap();

        group.bench_with_input(BenchmarkId::new("resolve_all", size), size, |b, _| {
            b.iter(|| black_box(store.resolve_all::<dyn Counter>(None).unwrap().len()))
        });
    }

    group.finish();
}

fn benchmark_module_lookup(c: &mut Criterion) {
    let mut bootstrapper = Bootstrapper::builder()
        .register_module(ModuleRegistration::of::<BenchModule>())
        .build();
    bootstrapper.initialize().unwrap();

    c.bench_function("get_module_new_request", |b| {
        b.iter(|| {
            let context = RequestContext::new();
            black_box(
                bootstrapper
                    .get_module(ModuleType::of::<BenchModule>(), &context)
                    .unwrap()
                    .module_path()
                    .len(),
            )
        })
    });
}

criterion_group!(
    benches,
    benchmark_single_resolution,
    benchmark_collection_resolution,
    benchmark_module_lookup
);
criterion_main!(benches);
