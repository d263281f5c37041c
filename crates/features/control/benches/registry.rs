use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ied_control::{BindingRegistry, ModelWalker};
use ied_kernel::diagnostics::MemorySink;
use ied_model::{DataType, FunctionalConstraint, IedModel, IedServer};
use std::hint::black_box;
use std::sync::Arc;

/// One logical device with `nodes` GGIO nodes of eight single-point controls each.
fn synthetic_model(nodes: usize) -> IedModel {
    let mut b = IedModel::builder("bench");
    let ld = b.logical_device("Device").unwrap();
    for n in 0..nodes {
        let ln = b.logical_node(ld, &format!("GGIO{n}")).unwrap();
        for o in 0..8 {
            let spc = b.data_object(ln, &format!("SPCSO{o}")).unwrap();
            b.data_attribute(spc, "stVal", FunctionalConstraint::St, DataType::Boolean).unwrap();
            b.data_attribute(spc, "t", FunctionalConstraint::St, DataType::UtcTime).unwrap();
            b.data_attribute(spc, "Oper", FunctionalConstraint::Co, DataType::Constructed).unwrap();
        }
        let ind = b.data_object(ln, "Ind1").unwrap();
        b.data_attribute(ind, "stVal", FunctionalConstraint::St, DataType::Boolean).unwrap();
    }
    b.build()
}

// ============================================================================
// Benchmark: Pre-order walk
// ============================================================================

fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk");

    for nodes in [16, 256, 4096] {
        let model = synthetic_model(nodes);
        let root = model.logical_devices()[0];
        group.throughput(Throughput::Elements(u64::try_from(model.len()).unwrap_or(u64::MAX)));

        group.bench_with_input(BenchmarkId::from_parameter(nodes), &model, |b, model| {
            b.iter(|| black_box(ModelWalker::new(model).iter(root).count()));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Registry build (walk + handler installation)
// ============================================================================

fn bench_registry_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_build");

    for nodes in [16, 256] {
        let server = IedServer::new(Arc::new(synthetic_model(nodes))).unwrap();
        group.throughput(Throughput::Elements(u64::try_from(nodes * 8).unwrap_or(u64::MAX)));

        group.bench_with_input(BenchmarkId::from_parameter(nodes), &server, |b, server| {
            b.iter(|| {
                let registry = BindingRegistry::build(server, Arc::new(MemorySink::new())).unwrap();
                black_box(registry.len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_walk, bench_registry_build);
criterion_main!(benches);
