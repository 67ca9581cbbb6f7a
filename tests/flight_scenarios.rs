use rocket_flight::data::{FlightDataBranch, FlightDataType};
use rocket_flight::sim::AbortCause;
use rocket_flight::vehicle::{
    BodyTube, DeployTrigger, FinSet, Motor, MotorMount, Parachute, Transition, TransitionShape,
};
use rocket_flight::{
    presets, CannotRunReason, FlightData, FlightEventKind, FlightPhase, Rocket, RocketBuilder,
    Simulation, SimulationOptions, SimulationOutcome, Warning,
};

fn fly(rocket: Rocket, options: SimulationOptions) -> FlightData {
    let mut sim = Simulation::new(rocket, options);
    match sim.run().expect("simulation failed") {
        SimulationOutcome::Completed(data) => data,
        SimulationOutcome::CannotRun(reason) => panic!("cannot run: {}", reason),
    }
}

fn event_time(branch: &FlightDataBranch, kind: FlightEventKind) -> f64 {
    branch
        .first_event(kind)
        .unwrap_or_else(|| panic!("no {} event", kind))
        .time
}

#[test]
fn single_stage_flight_event_sequence() {
    let data = fly(presets::sport(), SimulationOptions::default());
    let branch = data.primary().unwrap();

    let launch = event_time(branch, FlightEventKind::Launch);
    let burnout = event_time(branch, FlightEventKind::Burnout);
    let rod = event_time(branch, FlightEventKind::LaunchRod);
    let apogee = event_time(branch, FlightEventKind::Apogee);
    let ground = event_time(branch, FlightEventKind::GroundHit);

    assert_eq!(launch, 0.0);
    assert!((burnout - 1.5).abs() < 1e-6, "burnout at {}", burnout);
    assert!(rod < burnout, "rod cleared at {}", rod);
    assert!(burnout < apogee && apogee < ground);

    let apogee_alt = branch.maximum(FlightDataType::Altitude).unwrap();
    assert!(apogee_alt > 50.0 && apogee_alt < 2000.0, "apogee {}", apogee_alt);
    assert_eq!(branch.last(FlightDataType::Altitude), Some(0.0));
    assert_eq!(branch.events().last().map(|e| e.kind), Some(FlightEventKind::SimulationEnd));
}

#[test]
fn vertical_launch_without_wind_stays_on_axis() {
    let data = fly(presets::sport(), SimulationOptions::default().rod_angle(0.0).wind(0.0, 0.0));
    let branch = data.primary().unwrap();
    let apogee = event_time(branch, FlightEventKind::Apogee);

    let times = branch.get(FlightDataType::Time).unwrap();
    let lateral = branch.get(FlightDataType::LateralDistance).unwrap();
    let i = times.partition_point(|&t| t < apogee);
    assert!(lateral[i].abs() < 1e-6, "lateral {} m at apogee", lateral[i]);
}

#[test]
fn rocket_without_motor_fails_fast() {
    let rocket = RocketBuilder::new("Unpowered")
        .nose_cone(Transition::nose(TransitionShape::Ogive, 0.12, 0.025), 0.03)
        .body_tube(BodyTube::new(0.45, 0.025), 0.08)
        .fins(FinSet::trapezoid(3, 0.04, 0.02, 0.02, 0.1, 0.003), 0.03)
        .build();
    let mut sim = Simulation::new(rocket, SimulationOptions::default());
    let outcome = sim.run().unwrap();
    assert!(matches!(outcome, SimulationOutcome::CannotRun(CannotRunReason::NoMotorsDefined)));
    assert_eq!(sim.steps_taken(), 0);
}

#[test]
fn thick_fins_warn_once() {
    let motor = Motor::constant("T20-1.5", 20.0, 1.5, 0.060, 0.030).dimensions(0.07, 0.024);
    let rocket = RocketBuilder::new("Thick fins")
        .nose_cone(Transition::nose(TransitionShape::Ogive, 0.12, 0.025), 0.03)
        .body_tube(BodyTube::new(0.45, 0.025), 0.08)
        .motor(MotorMount::new(motor).ejection_delay(3.0))
        .fins(FinSet::trapezoid(3, 0.04, 0.02, 0.02, 0.1, 0.015), 0.05)
        .parachute(Parachute::new(0.5, 0.8).deploy(DeployTrigger::Apogee, 1.0), 0.05, 0.02)
        .build();
    let data = fly(rocket, SimulationOptions::default());
    let thick = data.warnings().iter().filter(|w| **w == Warning::ThickFin).count();
    assert_eq!(thick, 1);
}

#[test]
fn two_stage_flight_splits_into_branches() {
    let data = fly(presets::two_stage(), SimulationOptions::default());
    assert_eq!(data.branches().len(), 2);

    let sustainer = data.branch(0).unwrap();
    let booster = data.branch(1).unwrap();
    assert_eq!(booster.name(), "Booster");

    let sep = event_time(sustainer, FlightEventKind::StageSeparation);
    assert!((sep - 1.0).abs() < 1e-6, "separation at {}", sep);
    assert_eq!(event_time(booster, FlightEventKind::StageSeparation), sep);

    // Branches share the history up to separation
    let t_s = sustainer.get(FlightDataType::Time).unwrap();
    let t_b = booster.get(FlightDataType::Time).unwrap();
    let shared = t_s.partition_point(|&t| t <= sep);
    assert_eq!(&t_s[..shared], &t_b[..shared]);

    assert!(
        sustainer.maximum(FlightDataType::Altitude).unwrap()
            > booster.maximum(FlightDataType::Altitude).unwrap()
    );
    assert!(booster.first_event(FlightEventKind::GroundHit).is_some());
}

#[test]
fn single_stage_flight_phase_sequence() {
    let data = fly(presets::sport(), SimulationOptions::default());
    let branch = data.primary().unwrap();
    let phases: Vec<FlightPhase> = branch.phases().iter().map(|&(_, p)| p).collect();
    assert_eq!(
        phases,
        [
            FlightPhase::OnPad,
            FlightPhase::OnRod,
            FlightPhase::Powered,
            FlightPhase::Coast,
            FlightPhase::RecoveryDeployed,
            FlightPhase::Landed,
        ]
    );

    let entered = |phase| branch.phases().iter().find(|&&(_, p)| p == phase).unwrap().0;
    for (phase, kind) in [
        (FlightPhase::Powered, FlightEventKind::LaunchRod),
        (FlightPhase::Coast, FlightEventKind::Burnout),
        (FlightPhase::Landed, FlightEventKind::GroundHit),
    ] {
        let (t, expected) = (entered(phase), event_time(branch, kind));
        assert!((t - expected).abs() < 1e-6, "{} entered at {} not {}", phase, t, expected);
    }
}

/// Sport airframe with the given motor and chute.
fn sport_with(motor: Motor, chute: Parachute) -> Rocket {
    RocketBuilder::new("Sport variant")
        .nose_cone(Transition::nose(TransitionShape::Ogive, 0.12, 0.025), 0.03)
        .body_tube(BodyTube::new(0.45, 0.025), 0.08)
        .motor(MotorMount::new(motor.dimensions(0.07, 0.024)))
        .fins(FinSet::trapezoid(3, 0.04, 0.02, 0.02, 0.1, 0.003), 0.03)
        .parachute(chute, 0.05, 0.02)
        .build()
}

fn abort_cause(branch: &FlightDataBranch) -> Option<AbortCause> {
    branch.events().iter().find_map(|e| match e.kind {
        FlightEventKind::SimulationAbort(cause) => Some(cause),
        _ => None,
    })
}

#[test]
fn weak_motor_aborts_without_liftoff() {
    let rocket = sport_with(
        Motor::constant("W1", 1.0, 1.0, 0.060, 0.030),
        Parachute::new(0.5, 0.8).deploy(DeployTrigger::Apogee, 1.0),
    );
    let data = fly(rocket, SimulationOptions::default());
    let branch = data.primary().unwrap();

    assert_eq!(abort_cause(branch), Some(AbortCause::NoLiftoff));
    assert!(branch.first_event(FlightEventKind::Liftoff).is_none());
    assert!((event_time(branch, FlightEventKind::Burnout) - 1.0).abs() < 1e-6);
    assert!(branch.maximum(FlightDataType::Altitude).unwrap() < 1e-9);
    assert_eq!(branch.phases().last().map(|&(_, p)| p), Some(FlightPhase::OnRod));
}

#[test]
fn deployment_under_thrust_aborts() {
    let rocket = sport_with(
        Motor::constant("T20-1.5", 20.0, 1.5, 0.060, 0.030),
        Parachute::new(0.5, 0.8).deploy(DeployTrigger::Launch, 0.5),
    );
    let data = fly(rocket, SimulationOptions::default());
    let branch = data.primary().unwrap();

    assert_eq!(abort_cause(branch), Some(AbortCause::DeploymentUnderThrust));
    let abort = branch.events().last().unwrap();
    assert!((abort.time - 0.5).abs() < 1e-6, "abort at {}", abort.time);
    assert!(branch.first_event(FlightEventKind::Burnout).is_none());
    assert!(!branch.phases().iter().any(|&(_, p)| p == FlightPhase::RecoveryDeployed));
}
