use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use shnn_connect::{
    AllToAllConnector, ConnectOptions, Connector, DistanceDependentProbabilityConnector,
    FixedNumberPostConnector, MemoryBackend, PeriodicBoundaries, Population, Projection,
    RandomSource, SynapseType,
};

fn run(connector: &dyn Connector, pop: &Population) -> usize {
    let mut projection =
        Projection::new(pop, pop, SynapseType::Excitatory).with_rng(RandomSource::seeded(1234));
    let mut backend = MemoryBackend::new();
    connector
        .connect(&mut projection, &mut backend, &ConnectOptions::unchecked())
        .expect("bench connect")
}

fn bench_connectors(c: &mut Criterion) {
    let mut group = c.benchmark_group("shnn_connect");

    let all_to_all = AllToAllConnector::new(false).with_weights(0.1);
    let fixed_number = FixedNumberPostConnector::new(10usize, false)
        .expect("bench connector")
        .with_weights(0.1);
    let gaussian = DistanceDependentProbabilityConnector::new("exp(-d**2 / 8)", false)
        .expect("bench connector")
        .with_periodic_boundaries(PeriodicBoundaries::Population);

    for &side in &[8usize, 16, 32] {
        let pop = Population::new("grid", 0, &[side, side]).expect("bench population");
        group.throughput(Throughput::Elements(pop.size() as u64));

        group.bench_with_input(BenchmarkId::new("fixed_number_post", side), &pop, |b, pop| {
            b.iter_batched(|| (), |_| run(&fixed_number, pop), BatchSize::SmallInput);
        });
        group.bench_with_input(BenchmarkId::new("distance_gaussian", side), &pop, |b, pop| {
            b.iter_batched(|| (), |_| run(&gaussian, pop), BatchSize::SmallInput);
        });

        // all-to-all grows quadratically
        if side <= 16 {
            group.bench_with_input(BenchmarkId::new("all_to_all", side), &pop, |b, pop| {
                b.iter_batched(|| (), |_| run(&all_to_all, pop), BatchSize::SmallInput);
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_connectors);
criterion_main!(benches);
