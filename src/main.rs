use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use rocket_flight::data::FlightSummary;
use rocket_flight::io;
use rocket_flight::vehicle::StageSet;
use rocket_flight::{
    config, presets, BarrowmanCalculator, FlightConditions, Rocket, Simulation,
    SimulationOptions, SimulationOutcome, WarningSet,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    Sport,
    TwoStage,
}

/// Simulate a preset model rocket and print its flight.
#[derive(Debug, Parser)]
#[command(name = "rocket-flight", version, about)]
struct Args {
    /// Rocket to fly
    #[arg(long, value_enum, default_value = "sport")]
    preset: Preset,

    /// TOML file with launch and integrator options
    #[arg(long)]
    options: Option<PathBuf>,

    /// Launch rod length in metres, overriding the options file
    #[arg(long)]
    rod_length: Option<f64>,

    /// Launch rod tilt from vertical in degrees, overriding the options file
    #[arg(long)]
    rod_angle: Option<f64>,

    /// Write the primary branch to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the flight summary to this JSON file
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let mut options = match &args.options {
        Some(path) => config::load_options(path)
            .with_context(|| format!("loading options from {}", path.display()))?,
        None => SimulationOptions::default(),
    };
    if let Some(length) = args.rod_length {
        if length < 0.0 {
            bail!("launch rod length must not be negative, got {}", length);
        }
        options = options.rod_length(length);
    }
    if let Some(angle) = args.rod_angle {
        options = options.rod_angle(angle.to_radians());
    }
    let rocket = match args.preset {
        Preset::Sport => presets::sport(),
        Preset::TwoStage => presets::two_stage(),
    };

    println!();
    println!("====================================================================");
    println!("  ROCKET FLIGHT SIMULATION: {}", rocket.name);
    println!("====================================================================");
    println!();
    print_motors(&rocket);
    print_stability(&rocket)?;

    let mut sim = Simulation::new(rocket, options);
    let data = match sim.run()? {
        SimulationOutcome::Completed(data) => data,
        SimulationOutcome::CannotRun(reason) => bail!("simulation cannot run: {}", reason),
    };

    for branch in data.branches() {
        println!("  Flight Events: {}", branch.name());
        println!("  ──────────────────────────────────────────────────────────────────");
        for e in branch.events() {
            println!("  t={:>7.2}s   {}", e.time, e.kind);
        }
        let phases: Vec<String> = branch
            .phases()
            .iter()
            .map(|(t, p)| format!("{} ({:.2}s)", p, t))
            .collect();
        println!("  Phases: {}", phases.join(" -> "));
        println!();

        let s = FlightSummary::from_branch(branch);
        println!("  Performance Summary: {}", branch.name());
        println!("  ──────────────────────────────────────────────────────────────────");
        println!("  Max altitude:     {:>8.1} m   at t={:.2} s", s.max_altitude, s.time_to_apogee);
        println!("  Max velocity:     {:>8.1} m/s (Mach {:.2})", s.max_velocity, s.max_mach);
        println!(
            "  Max acceleration: {:>8.1} m/s^2 ({:.1} g)",
            s.max_acceleration,
            s.max_acceleration / 9.80665
        );
        println!("  Rod clearance:    {:>8.1} m/s", s.launch_rod_velocity);
        println!("  Deployment:       {:>8.1} m/s", s.deployment_velocity);
        println!("  Ground hit:       {:>8.1} m/s", s.ground_hit_velocity);
        println!("  Flight time:      {:>8.1} s", s.flight_time);
        println!();
    }

    if !data.warnings().is_empty() {
        println!("  Warnings");
        println!("  ──────────────────────────────────────────────────────────────────");
        for w in data.warnings().iter() {
            println!("  - {}", w);
        }
        println!();
    }

    if let Some(path) = &args.csv {
        if let Some(primary) = data.primary() {
            io::write_branch_file(path, primary)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("  Flight data written to {}", path.display());
        }
    }
    if let Some(path) = &args.json {
        io::write_summary_file(path, &sim.rocket().name, &data)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("  Summary written to {}", path.display());
    }

    println!("  Simulation: {} steps", sim.steps_taken());
    println!("====================================================================");
    println!();
    Ok(())
}

fn print_motors(rocket: &Rocket) {
    println!("  Motors");
    println!("  ──────────────────────────────────────────────────────────────────");
    for (tube, mount) in rocket.motor_mounts() {
        let m = &mount.motor;
        let stage = rocket.stages().get(tube.stage).map_or("?", |s| s.name.as_str());
        println!(
            "  {:<10} {:<10} {:>6.1} N·s  avg {:>6.1} N  burn {:>5.2} s",
            stage,
            m.designation,
            m.total_impulse(),
            m.average_thrust(),
            m.burn_time()
        );
    }
    println!();
}

/// Print CP, CNa and drag of the full rocket at Mach 0.3.
fn print_stability(rocket: &Rocket) -> Result<()> {
    let stages = StageSet::all(rocket.stage_count());
    let mut calc = BarrowmanCalculator::new()?;
    calc.prepare(rocket)?;
    let mut conditions = FlightConditions::new(rocket.reference_length(&stages));
    conditions.set_mach(0.3);
    let forces = calc.forces(rocket, &stages, &conditions, &mut WarningSet::new())?;

    println!("  Aerodynamics (Mach 0.30, zero AOA)");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  CP location:  {:>8.3} m    CNa:          {:>8.3} /rad", forces.cp.x(), forces.cna);
    println!(
        "  CD:           {:>8.3}      friction {:.3}  pressure {:.3}  base {:.3}",
        forces.cd, forces.friction_cd, forces.pressure_cd, forces.base_cd
    );
    println!();
    Ok(())
}
