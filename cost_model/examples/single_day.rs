use chrono::NaiveDate;
use cost_model::{CostCalculator, CostScenario, ModelConfig};

fn main() {
    // Default model: era-table efficiency, hardware depreciation, fee ramp
    let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let calculator = CostCalculator::new(ModelConfig::full(), date).unwrap();

    // ~520 EH/s expressed in TH/s
    let hashrate_th = 520_000_000.0;

    println!("Mining Cost Breakdown");
    println!("=====================");
    println!("Date: {}", date);
    println!("Hashrate: {:.0} EH/s", hashrate_th / 1e6);
    println!("Efficiency: {:.1} J/TH", calculator.efficiency_at(date));
    println!("Block reward: {} BTC", calculator.block_reward_at(date));
    println!("Fee ratio: {:.1}%", calculator.fee_ratio_at(date) * 100.0);
    if let Some(hardware) = calculator.hardware_cost_at(date) {
        println!("Hardware: ${:.2}/TH", hardware);
    }
    println!();

    for scenario in CostScenario::ALL {
        let price = calculator.config().electricity.price(scenario);
        let breakdown = calculator.daily_breakdown(date, hashrate_th, price);
        println!("{} (${:.3}/kWh):", scenario.label(), price);
        println!("  Energy: {:.0} MWh/day", breakdown.energy_kwh / 1000.0);
        println!("  Electricity: ${:.0}/day", breakdown.electricity_cost);
        println!("  Hardware: ${:.0}/day", breakdown.hardware_cost);
        println!("  Output: {:.1} BTC/day", breakdown.coins_per_day);
        println!("  Cost per BTC: ${:.2}", breakdown.cost_per_coin);
    }
}
