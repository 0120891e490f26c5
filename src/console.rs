use cost_model::{CostCalculator, CostRow, CostScenario, MidCostMode, ModelConfig};

/// `$1,234,567` style, whole dollars.
pub fn format_usd(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

pub fn print_summary(calculator: &CostCalculator, rows: &[CostRow]) {
    let Some(latest) = rows.last() else {
        return;
    };

    println!("\n📊 Current Stats ({}):", latest.date);
    println!("   BTC Price: {}", format_usd(latest.price));
    println!(
        "   Mining Cost: {} low / {} mid / {} high",
        format_usd(latest.cost_low),
        format_usd(latest.cost_mid),
        format_usd(latest.cost_high)
    );
    println!("   Hashrate: {:.2} EH/s", latest.hashrate_th / 1e6);
    match latest.margin_pct() {
        Some(margin) => println!("   Margin: {:.1}%", margin),
        None => println!("   Margin: n/a"),
    }

    let config = calculator.config();
    if config.mid_cost == MidCostMode::MeanOfBounds {
        println!("\n   Mid cost is the mean of the low and high breakdowns below");
    }
    for scenario in breakdown_scenarios(config) {
        print_breakdown(calculator, latest, *scenario);
    }
}

/// Scenarios whose direct evaluation explains the reported mid cost.
fn breakdown_scenarios(config: &ModelConfig) -> &'static [CostScenario] {
    match config.mid_cost {
        MidCostMode::Direct => &[CostScenario::Mid],
        MidCostMode::MeanOfBounds => &[CostScenario::Low, CostScenario::High],
    }
}

fn print_breakdown(calculator: &CostCalculator, latest: &CostRow, scenario: CostScenario) {
    let config = calculator.config();
    let price = config.electricity.price(scenario);
    let breakdown = calculator.daily_breakdown(latest.date, latest.hashrate_th, price);
    println!(
        "\n🔎 Unsmoothed {} breakdown, evaluated directly at ${:.3}/kWh:",
        scenario.label(),
        price
    );
    println!("   Efficiency: {:.1} J/TH", breakdown.efficiency_j_per_th);
    println!("   Network energy: {:.2} GWh/day", breakdown.energy_kwh / 1e6);
    println!(
        "   Electricity: {}/day (overhead x{:.2})",
        format_usd(breakdown.electricity_cost),
        config.overhead_factor
    );
    if config.hardware.is_some() {
        println!("   Hardware depreciation: {}/day", format_usd(breakdown.hardware_cost));
    }
    println!(
        "   Output: {:.1} BTC/day ({} reward, {:.1}% fees)",
        breakdown.coins_per_day,
        breakdown.block_reward,
        breakdown.fee_ratio * 100.0
    );
    println!("   Cost per BTC: {}", format_usd(breakdown.cost_per_coin));
}
