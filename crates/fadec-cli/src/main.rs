//! FADEC CLI - scripted runs of the fuel-injection digital twin.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

use fadec_core::{FaultKind, HealthStatus, SloshIntensity};
use fadec_sim::{run, Command, Scenario, ScenarioOutcome};

#[derive(Parser, Debug)]
#[command(name = "fadec")]
#[command(about = "Helicopter fuel-injection digital twin")]
#[command(version)]
struct Args {
    /// Output directory
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Skip writing the per-tick trace CSV
    #[arg(long)]
    no_export: bool,

    // ── Run parameters ────────────────────────────────────────
    /// Number of ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Tick period in milliseconds
    #[arg(long, default_value_t = fadec_core::SIMULATION_TICK_RATE_MS)]
    tick_ms: u64,

    /// RNG seed (runs are reproducible for a fixed seed and schedule)
    #[arg(long, default_value_t = 42)]
    seed: u64,

    // ── Control schedule ──────────────────────────────────────
    /// Throttle command as TICK:PERCENT (repeatable)
    #[arg(long = "throttle-at", value_parser = parse_tick_value)]
    throttle_at: Vec<(u64, f64)>,

    /// Collective pitch command as TICK:DEGREES (repeatable)
    #[arg(long = "collective-at", value_parser = parse_tick_value)]
    collective_at: Vec<(u64, f64)>,

    /// Fault injection as TICK:FAULT (repeatable); see --help for names
    #[arg(long = "fault-at", value_parser = parse_tick_fault)]
    fault_at: Vec<(u64, FaultKind)>,

    /// Slosh intensity as TICK:LEVEL (none|low|medium|high, repeatable)
    #[arg(long = "slosh-at", value_parser = parse_tick_slosh)]
    slosh_at: Vec<(u64, SloshIntensity)>,

    /// Pause the simulation at this tick
    #[arg(long = "pause-at")]
    pause_at: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let scenario = build_scenario(&args);

    println!("FADEC Digital Twin");
    println!("==================\n");
    println!(
        "Running {} ticks at {} ms ({} s simulated, seed {})...",
        args.ticks,
        args.tick_ms,
        args.ticks as f64 * args.tick_ms as f64 / 1000.0,
        args.seed
    );

    let mut rng = StdRng::seed_from_u64(args.seed);
    let outcome = run(&scenario, &mut rng);
    tracing::info!(
        ticks = outcome.state.tick,
        fuel_remaining = outcome.state.totalizer.calculated_fuel,
        "run complete"
    );

    print_run_stats(&outcome, args.tick_ms);

    if !args.no_export {
        write_trace(&args, &outcome)?;
    }

    Ok(())
}

fn build_scenario(args: &Args) -> Scenario {
    let mut scenario = Scenario::new(args.ticks, args.tick_ms);
    for &(tick, value) in &args.throttle_at {
        scenario = scenario.at(tick, Command::SetThrottle(value));
    }
    for &(tick, value) in &args.collective_at {
        scenario = scenario.at(tick, Command::SetCollectivePitch(value));
    }
    for &(tick, fault) in &args.fault_at {
        scenario = scenario.at(tick, Command::InjectFault(fault));
    }
    for &(tick, intensity) in &args.slosh_at {
        scenario = scenario.at(tick, Command::SetSloshIntensity(intensity));
    }
    if let Some(tick) = args.pause_at {
        scenario = scenario.at(tick, Command::Pause);
    }
    scenario
}

// ---------------------------------------------------------------------------
// Schedule parsing
// ---------------------------------------------------------------------------

fn split_tick(s: &str) -> Result<(u64, &str)> {
    let (tick, rest) = s
        .split_once(':')
        .ok_or_else(|| anyhow!("expected TICK:VALUE, got '{s}'"))?;
    let tick = tick
        .parse::<u64>()
        .with_context(|| format!("invalid tick in '{s}'"))?;
    Ok((tick, rest))
}

fn parse_tick_value(s: &str) -> Result<(u64, f64), String> {
    let inner = || -> Result<(u64, f64)> {
        let (tick, rest) = split_tick(s)?;
        let value = rest
            .parse::<f64>()
            .with_context(|| format!("invalid value in '{s}'"))?;
        Ok((tick, value))
    };
    inner().map_err(|e| format!("{e:#}"))
}

fn parse_tick_fault(s: &str) -> Result<(u64, FaultKind), String> {
    let inner = || -> Result<(u64, FaultKind)> {
        let (tick, rest) = split_tick(s)?;
        Ok((tick, fault_from_name(rest)?))
    };
    inner().map_err(|e| format!("{e:#}"))
}

fn parse_tick_slosh(s: &str) -> Result<(u64, SloshIntensity), String> {
    let inner = || -> Result<(u64, SloshIntensity)> {
        let (tick, rest) = split_tick(s)?;
        let intensity = match rest.to_ascii_lowercase().as_str() {
            "none" => SloshIntensity::None,
            "low" => SloshIntensity::Low,
            "medium" => SloshIntensity::Medium,
            "high" => SloshIntensity::High,
            other => return Err(anyhow!("unknown slosh intensity '{other}'")),
        };
        Ok((tick, intensity))
    };
    inner().map_err(|e| format!("{e:#}"))
}

fn fault_from_name(name: &str) -> Result<FaultKind> {
    let fault = match name.to_ascii_lowercase().as_str() {
        "none" => FaultKind::None,
        "sensor-bias-n1" => FaultKind::SensorBiasN1,
        "blockage-fuel-line" => FaultKind::BlockageFuelLine,
        "fail-fuel-probe" => FaultKind::FailFuelProbe,
        "intermittent-wiring-injector1" => FaultKind::IntermittentWiringInjector1,
        "connector-failure-injector2" => FaultKind::ConnectorFailureInjector2,
        "total-fuel-flow-sensor-failure" => FaultKind::TotalFuelFlowSensorFailure,
        "sloshing-fuel-tank" => FaultKind::SloshingFuelTank,
        "afr-enhanced" => FaultKind::FadecAfrEnhanced,
        other => return Err(anyhow!("unknown fault '{other}'")),
    };
    Ok(fault)
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_run_stats(outcome: &ScenarioOutcome, tick_ms: u64) {
    let state = &outcome.state;

    println!("\nRun Stats:");
    println!("  Ticks:          {}", state.tick);
    println!(
        "  N1 / N2:        {:.0} / {:.0} RPM",
        state.n1_rpm, state.n2_rpm
    );
    println!(
        "  NR / NT:        {:.1} / {:.1} RPM ({})",
        state.nr_rpm,
        state.nt_rpm,
        if state.is_rotor_ready { "at speed" } else { "not ready" }
    );
    println!("  EGT:            {:.0} K", state.exhaust_temp);
    println!("  HP Pressure:    {:.2} MPa", state.pressure_hp);
    println!(
        "  Fuel (truth):   {:.1} L  (probe {:.1} L, filtered {:.1} L)",
        state.totalizer.calculated_fuel, state.fuel_quantity, state.kalman.x
    );
    match state.endurance_hours() {
        Some(hours) => println!("  Endurance:      {:.2} h", hours),
        None => println!("  Endurance:      n/a"),
    }
    if let Some(rate) = state.manual_flow_rate(tick_ms) {
        println!("  Manual flow:    {:.1} L/hr", rate);
    }
    println!("  Active fault:   {}", state.active_fault.description());

    let alerts: Vec<String> = state
        .components
        .iter()
        .filter(|c| matches!(c.status, HealthStatus::Warn | HealthStatus::Fault))
        .map(|c| format!("{} ({})", c.id.label(), c.status.label()))
        .collect();
    if alerts.is_empty() {
        println!("  Alerts:         none");
    } else {
        println!("  Alerts:         {}", alerts.join(", "));
    }

    println!("\nRecent events:");
    for entry in state.logs.iter().take(8) {
        println!("  [{:>5}] {:<5} {}", entry.tick, entry.level.label(), entry.message);
    }
    println!("-----------------------------");
}

fn write_trace(args: &Args, outcome: &ScenarioOutcome) -> Result<()> {
    std::fs::create_dir_all(&args.output_dir)?;
    let path = args.output_dir.join("trace.csv");
    let mut wtr = csv::Writer::from_path(&path)?;

    wtr.write_record([
        "tick",
        "throttle",
        "afr",
        "efficiency_pct",
        "injector1_flow",
        "pressure_hp",
        "fuel_flow",
        "exhaust_temp",
        "kalman_gain",
        "kalman_filter_qty",
    ])?;

    for p in &outcome.trace {
        wtr.write_record(&[
            format!("{}", p.tick),
            format!("{:.2}", p.throttle),
            format!("{:.4}", p.afr),
            format!("{:.2}", p.efficiency),
            format!("{:.2}", p.injector1_flow),
            format!("{:.4}", p.pressure_hp),
            format!("{:.2}", p.fuel_flow),
            format!("{:.2}", p.exhaust_temp),
            format!("{:.6}", p.kalman_gain),
            format!("{:.2}", p.kalman_filter_qty),
        ])?;
    }

    wtr.flush()?;
    println!("Trace written to {:?}", path);
    Ok(())
}
