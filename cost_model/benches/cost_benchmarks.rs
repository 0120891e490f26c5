use chrono::{Duration, NaiveDate};
use cost_model::smoothing::trailing_mean;
use cost_model::{AlignedDay, CostCalculator, ModelConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn two_years_of_days() -> Vec<AlignedDay> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    (0..730)
        .map(|i| AlignedDay {
            date: start + Duration::days(i),
            hashrate: 300_000_000.0 + i as f64 * 500_000.0,
            price: 20_000.0 + i as f64 * 60.0,
        })
        .collect()
}

fn benchmark_single_day(c: &mut Criterion) {
    let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let calculator = CostCalculator::new(ModelConfig::full(), day).unwrap();

    c.bench_function("scenario_costs_single_day", |b| {
        b.iter(|| black_box(calculator.scenario_costs(black_box(day), black_box(650_000_000.0))));
    });
}

fn benchmark_series(c: &mut Criterion) {
    let days = two_years_of_days();
    let as_of = days.last().unwrap().date;
    let calculator = CostCalculator::new(ModelConfig::full(), as_of).unwrap();

    c.bench_function("calculate_series_two_years", |b| {
        b.iter(|| black_box(calculator.calculate_series(black_box(&days))));
    });
}

fn benchmark_smoothing(c: &mut Criterion) {
    let values: Vec<f64> = (0..730).map(|i| 40_000.0 + (i % 17) as f64 * 250.0).collect();

    c.bench_function("trailing_mean_14", |b| {
        b.iter(|| black_box(trailing_mean(black_box(&values), 14)));
    });
}

criterion_group!(benches, benchmark_single_day, benchmark_series, benchmark_smoothing);
criterion_main!(benches);
