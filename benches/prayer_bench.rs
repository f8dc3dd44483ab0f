use chrono::{Days, NaiveDate};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use prayertimes::astronomy::julian_day;
use prayertimes::coordinates::SolarCoordinates;
use prayertimes::solar::SolarTime;
use prayertimes::{Coordinates, Method, OutputZone, PrayerTimeEngine};

fn solar_bench(c: &mut Criterion) {
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let coords = Coordinates::new_unchecked(51.5074, -0.1278);

    let mut group = c.benchmark_group("solar");
    group.bench_function("solar_coordinates", |b| {
        b.iter(|| SolarCoordinates::new(black_box(julian_day(2024, 3, 1, 0.0))))
    });
    group.bench_function("solar_time", |b| {
        b.iter(|| SolarTime::new(black_box(date), black_box(coords)))
    });
    group.finish();
}

fn engine_bench(c: &mut Criterion) {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let dates: Vec<NaiveDate> = (0..366).map(|d| start + Days::new(d)).collect();

    let mut group = c.benchmark_group("engine");
    let london = Coordinates::new_unchecked(51.5074, -0.1278);
    let oslo = Coordinates::new_unchecked(59.9094, 10.7349);
    let tromso = Coordinates::new_unchecked(69.6492, 18.9553);
    for (name, method, coords) in [
        ("mwl_london_year", Method::MuslimWorldLeague, london),
        ("mc_oslo_year", Method::MoonsightingCommittee, oslo),
        ("mwl_tromso_year", Method::MuslimWorldLeague, tromso),
    ] {
        let engine = PrayerTimeEngine::new(method.parameters()).with_output_zone(OutputZone::Utc);
        group.bench_function(name, |b| {
            b.iter(|| {
                for date in &dates {
                    let _ = black_box(engine.calculate(black_box(coords), *date));
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, solar_bench, engine_bench);
criterion_main!(benches);
