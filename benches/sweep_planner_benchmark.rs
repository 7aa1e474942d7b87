use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use navio_planner::{
    algorithms::sweep::SweepPlanner,
    algorithms::TourBuilder,
    models::normalize_orders,
    planner::geocode_orders,
    utils::ReferenceRecord,
    GeoIndex, PlanRequest, Planner, PlannerConfig, RawOrder,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const DEPOT_ZIP: &str = "33181";

fn benchmark_sweep_planner(c: &mut Criterion) {
    let index = create_index();
    let config = PlannerConfig::default();
    let planner = Planner::new(&index, &config);

    let mut group = c.benchmark_group("plan_request");
    for size in [50, 250, 1000] {
        let request = create_request(size, 42);
        group.bench_with_input(BenchmarkId::from_parameter(size), &request, |b, request| {
            b.iter(|| planner.plan(black_box(request)))
        });
    }
    group.finish();

    // Packing alone, without geocoding and formatting
    let request = create_request(1000, 7);
    let depot = index
        .resolve(DEPOT_ZIP)
        .map(|coordinate| coordinate.point())
        .unwrap_or_else(|| geo::Point::new(8.707, 51.512));
    let planned = geocode_orders(&index, &depot, normalize_orders(&request.orders)).planned;
    let sweep = SweepPlanner::new(config.planner.balance);
    c.bench_function("sweep_build_tours_1000", |b| {
        b.iter(|| sweep.build_tours(black_box(planned.clone()), black_box(1200.0)))
    });

    let requests: Vec<PlanRequest> = (0..16).map(|seed| create_request(250, seed)).collect();
    c.bench_function("plan_batch_16x250", |b| {
        b.iter(|| planner.plan_batch(black_box(&requests)))
    });
}

// Reference codes on a grid of roughly 100 km around the depot
fn create_index() -> GeoIndex {
    let mut records = vec![ReferenceRecord::new(DEPOT_ZIP, 51.512, 8.707)];
    for i in 0..400 {
        let lat = 51.0 + (i / 20) as f64 * 0.05;
        let lon = 8.2 + (i % 20) as f64 * 0.05;
        records.push(ReferenceRecord::new(format!("{}", 33200 + i), lat, lon));
    }
    GeoIndex::from_records(records)
}

// Random request; a few codes fall outside the reference data
fn create_request(size: usize, seed: u64) -> PlanRequest {
    let mut rng = SmallRng::seed_from_u64(seed);
    let orders = (0..size)
        .map(|i| {
            let zip = 33200 + rng.gen_range(0..420);
            let weight = rng.gen_range(20.0..400.0);
            let order = RawOrder::new(format!("LS-{}", i), zip.to_string(), weight);
            match rng.gen_range(0..4) {
                0 => order,
                day => order.with_delivery_date(format!("{}.03.2024", day + 4)),
            }
        })
        .collect();
    PlanRequest::new(orders)
}

criterion_group!(benches, benchmark_sweep_planner);
criterion_main!(benches);
