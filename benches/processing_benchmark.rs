use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use divvy_processor::models::{
    NeighborhoodPolygon, NeighborhoodTable, RawTrip, RawTripTable, Station, StationTable,
};
use divvy_processor::processors::{Normalizer, PartitionPlan, StationDeriver, TripAnnotator};

// Grid of square neighborhoods covering roughly the city extent
fn create_neighborhood_grid(side: usize) -> NeighborhoodTable {
    let step = 0.3 / side as f64;
    let mut polygons = Vec::with_capacity(side * side);

    for row in 0..side {
        for col in 0..side {
            let lon = -87.85 + col as f64 * step;
            let lat = 41.65 + row as f64 * step;
            polygons.push(NeighborhoodPolygon::new(
                format!("Neighborhood {}-{}", row, col),
                vec![
                    (lon, lat),
                    (lon + step, lat),
                    (lon + step, lat + step),
                    (lon, lat + step),
                ],
            ));
        }
    }

    NeighborhoodTable::new(polygons)
}

fn create_raw_trips(count: usize, station_count: usize) -> RawTripTable {
    let rows = (0..count)
        .map(|i| {
            let from = i % station_count;
            let to = (i * 7 + 3) % station_count;
            RawTrip {
                gender: Some(if i % 2 == 0 { "Male" } else { "Female" }.to_string()),
                usertype: Some("Subscriber".to_string()),
                events: Some("cloudy".to_string()),
                from_station_name: Some(format!("Station {}", from)),
                to_station_name: Some(format!("Station {}", to)),
                day: Some((i % 7) as f64),
                month: Some((i % 12 + 1) as f64),
                week: Some((i % 52 + 1) as f64),
                hour: Some((i % 24) as f64),
                tripduration: Some((i % 60) as f64 + 0.4),
                dpcapacity_start: Some(15.0),
                dpcapacity_end: Some(23.0),
                year: Some(2014.0 + (i % 4) as f64),
                from_station_id: Some(from as f64),
                latitude_start: Some(41.66 + (from as f64 / station_count as f64) * 0.28),
                longitude_start: Some(-87.84 + (from as f64 / station_count as f64) * 0.28),
                latitude_end: Some(41.66 + (to as f64 / station_count as f64) * 0.28),
                longitude_end: Some(-87.84 + (to as f64 / station_count as f64) * 0.28),
                temperature: Some((i % 90) as f64 - 10.0),
            }
        })
        .collect();

    RawTripTable::with_required_headers(rows)
}

fn benchmark_resolve(c: &mut Criterion) {
    let neighborhoods = create_neighborhood_grid(10);
    let points: Vec<(f64, f64)> = (0..100)
        .map(|i| (-87.84 + i as f64 * 0.0028, 41.66 + i as f64 * 0.0028))
        .collect();

    c.bench_function("resolve_100_points", |b| {
        b.iter(|| {
            let mut resolved = 0;
            for &(lon, lat) in &points {
                if neighborhoods.find_containing(lon, lat).is_some() {
                    resolved += 1;
                }
            }
            black_box(resolved)
        })
    });
}

fn benchmark_normalize(c: &mut Criterion) {
    let raw = create_raw_trips(10_000, 300);

    c.bench_function("normalize_10k_trips", |b| {
        b.iter(|| {
            let table = Normalizer::new().normalize(&raw);
            black_box(table.map(|t| t.len()).unwrap_or(0))
        })
    });
}

fn benchmark_derive_and_annotate(c: &mut Criterion) {
    let neighborhoods = create_neighborhood_grid(10);
    let trips = match Normalizer::new().normalize(&create_raw_trips(10_000, 300)) {
        Ok(trips) => trips,
        Err(e) => panic!("benchmark input failed to normalize: {}", e),
    };

    c.bench_function("derive_stations_10k_trips", |b| {
        b.iter(|| black_box(StationDeriver::new().derive(&trips, &neighborhoods).len()))
    });

    let stations = StationDeriver::new().derive(&trips, &neighborhoods);
    c.bench_function("annotate_10k_trips", |b| {
        b.iter(|| {
            let annotated = TripAnnotator::new().annotate(trips.clone(), &stations);
            black_box(annotated.map(|t| t.len()).unwrap_or(0))
        })
    });
}

fn benchmark_varying_polygon_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_by_polygon_count");

    for &side in &[2, 5, 10, 20] {
        group.bench_with_input(
            BenchmarkId::new("polygons", side * side),
            &side,
            |b, &side| {
                let neighborhoods = create_neighborhood_grid(side);
                let stations: StationTable = (0..200)
                    .map(|i| {
                        let lon = -87.84 + i as f64 * 0.0014;
                        let lat = 41.66 + i as f64 * 0.0014;
                        Station::new(format!("Station {}", i), lat, lon, String::new())
                    })
                    .collect::<Vec<_>>()
                    .into();

                b.iter(|| {
                    let labels: usize = stations
                        .iter()
                        .map(|s| neighborhoods.resolve(s.longitude, s.latitude).len())
                        .sum();
                    black_box(labels)
                });
            },
        );
    }

    group.finish();
}

fn benchmark_partition_plan(c: &mut Criterion) {
    c.bench_function("partition_plan_9_5m_rows", |b| {
        b.iter(|| {
            let plan = PartitionPlan::new(black_box(9_500_000), 1_000_000)
                .and_then(|p| p.with_max_partitions(Some(10)));
            black_box(plan.map(|p| p.ranges().len()).unwrap_or(0))
        })
    });
}

criterion_group!(
    benches,
    benchmark_resolve,
    benchmark_normalize,
    benchmark_derive_and_annotate,
    benchmark_varying_polygon_counts,
    benchmark_partition_plan
);
criterion_main!(benches);
