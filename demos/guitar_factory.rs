//! Plays a default four-period session and prints each period's outcome.
//!
//! Set `RUST_LOG=debug` to see the per-event trace.

use linesim::factory::{
    run_replications, Buffer, FactoryConfig, FactoryError, Orchestrator, PeriodParams,
    WorkerCounts,
};
use log::LevelFilter;

fn main() -> Result<(), FactoryError> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let config = FactoryConfig::default();
    let mut orchestrator = Orchestrator::new(config.clone())?;

    // Second half of the session adds a painter.
    let staffing = [
        WorkerCounts::new(2, 1, 3, 2),
        WorkerCounts::new(2, 1, 3, 2),
        WorkerCounts::new(2, 1, 4, 2),
        WorkerCounts::new(2, 1, 4, 2),
    ];
    let plan: Vec<PeriodParams> = staffing
        .iter()
        .enumerate()
        .map(|(i, workers)| {
            PeriodParams::default()
                .with_period(i as u32 + 1)
                .with_workers(*workers)
        })
        .collect();

    for params in &plan {
        let result = orchestrator.run_period(params.clone())?;
        println!("=== period {} ===", result.period_index);
        for line in result.log.iter().rev().take(5).rev() {
            println!("  {line}");
        }
        println!(
            "produced {:>4}  shipped {:>4}  remaining demand {:>4}  overproduction {:>3}",
            result.units_produced,
            result.units_shipped,
            result.remaining_demand,
            result.overproduction
        );
        for buffer in Buffer::ALL {
            println!(
                "  {:<16} {:>4} -> {:>4}",
                buffer.name(),
                result.opening_levels[&buffer],
                result.levels[&buffer]
            );
        }
        let p = result.period_ledger;
        println!(
            "revenue {:>10.2}  materials {:>9.2}  labor {:>9.2}  idle {:>8.2}  fixed {:>8.2}  penalty {:>8.2}  profit {:>10.2}",
            p.total_revenue,
            p.material_costs,
            p.labor_costs,
            p.idle_costs,
            p.fixed_costs,
            p.demand_penalty,
            p.profit
        );
        if result.discarded_in_flight > 0 {
            println!("{} unit(s) lost at the period boundary", result.discarded_in_flight);
        }
    }

    let seeds: Vec<u64> = (1..=8).collect();
    let summaries = run_replications(&config, &plan, &seeds)?;
    println!("=== {} replications ===", summaries.len());
    for s in &summaries {
        println!(
            "seed {:>2}: produced {:>4}  remaining {:>4}  profit {:>10.2}",
            s.seed, s.units_produced, s.remaining_demand, s.profit
        );
    }
    let mean = summaries.iter().map(|s| s.profit).sum::<f64>() / summaries.len() as f64;
    println!("mean profit {mean:.2}");

    Ok(())
}
