use std::f64::consts::PI;

use nalgebra::{Rotation3, Vector3};

use crate::aero::{AerodynamicForces, BarrowmanCalculator, FlightConditions, WarningSet};
use crate::error::SimulationError;
use crate::physics::gravity::gravity;
use crate::physics::{AtmosphereModel, AtmosphericConditions, WindModel};
use crate::util::{pow2, EPSILON};
use crate::vehicle::{ComponentKind, MassCalculator, MassData, Rocket};

use super::options::SimulationOptions;
use super::state::{SimulationState, StateDerivative};
use super::status::SimulationStatus;

/// Shared, read-only inputs of every integration step.
pub struct StepContext<'a> {
    pub rocket: &'a Rocket,
    pub aero: &'a BarrowmanCalculator,
    pub mass: &'a MassCalculator,
    pub atmosphere: &'a dyn AtmosphereModel,
    pub wind: &'a dyn WindModel,
    pub options: &'a SimulationOptions,
}

/// Quantities evaluated at the start of a step, kept for the data store.
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub time_step: f64, // s
    pub mass: MassData,
    pub atmosphere: AtmosphericConditions,
    pub reference_length: f64, // m
    pub airspeed: f64,         // m/s
    pub mach: f64,
    pub reynolds: f64,
    pub aoa: f64,              // rad
    /// (roll, pitch, yaw) rates in the airflow frame, rad/s.
    pub rates: Vector3<f64>,
    pub thrust: f64,           // N
    pub drag: f64,             // N
    pub gravity: f64,          // m/s^2
    pub acceleration: Vector3<f64>,
    /// Drag coefficient referenced to the reference area.
    pub drag_coefficient: f64,
    /// Full coefficient set of the rigid-body stepper; None during descent.
    pub forces: Option<AerodynamicForces>,
}

/// Advances one branch by one step.
pub trait Stepper {
    fn step(
        &self,
        ctx: &StepContext<'_>,
        status: &mut SimulationStatus,
    ) -> Result<StepRecord, SimulationError>;
}

/// Environment shared by both steppers at one instant.
struct Environment {
    mass: MassData,
    atmosphere: AtmosphericConditions,
    airspeed: Vector3<f64>,
    gravity: f64,
}

fn environment(
    ctx: &StepContext<'_>,
    status: &SimulationStatus,
    state: &SimulationState,
) -> Result<Environment, SimulationError> {
    let mass = ctx.mass.mass_data(&status.stages, &status.motors, state.time);
    if !(mass.mass > EPSILON) {
        return Err(SimulationError::calculation(
            state.time,
            status.phase,
            format!("non-positive mass {:.6} kg", mass.mass),
        ));
    }
    let altitude = ctx.options.launch_altitude + state.pos.z;
    let atmosphere = ctx.atmosphere.conditions(altitude);
    let airspeed = state.vel - ctx.wind.velocity(state.time, altitude);
    Ok(Environment { mass, atmosphere, airspeed, gravity: gravity(altitude) })
}

fn body_length(rocket: &Rocket, status: &SimulationStatus) -> f64 {
    rocket.airframe_extent(&status.stages).map_or(0.0, |(fore, aft)| aft - fore)
}

// ---------------------------------------------------------------------------
// Six degree of freedom RK4 stepper
// ---------------------------------------------------------------------------

/// Rigid-body RK4 stepper with adaptive time step, used from launch until
/// recovery deployment or tumbling.
#[derive(Debug, Clone, Copy, Default)]
pub struct RK4Stepper;

struct Evaluation {
    accel: Vector3<f64>,
    ang_accel: Vector3<f64>,
    record: StepRecord,
}

impl RK4Stepper {
    /// Linear and angular acceleration at `state`.
    fn evaluate(
        &self,
        ctx: &StepContext<'_>,
        status: &SimulationStatus,
        state: &SimulationState,
        warnings: &mut WarningSet,
    ) -> Result<Evaluation, SimulationError> {
        let env = environment(ctx, status, state)?;
        let ref_length = ctx.rocket.reference_length(&status.stages);
        let speed = env.airspeed.norm();

        // Airflow direction in the body frame
        let inverse = state.orientation.inverse();
        let v_body = inverse * env.airspeed;
        let (aoa, theta) = if speed > EPSILON {
            ((v_body.z / speed).clamp(-1.0, 1.0).acos(), v_body.y.atan2(v_body.x))
        } else {
            (0.0, 0.0)
        };
        let to_body = Rotation3::from_axis_angle(&Vector3::z_axis(), theta);

        // Rates in the frame whose x axis is the lateral airflow
        let omega_body = inverse * state.omega;
        let omega_flow = to_body.inverse() * omega_body;
        let rates = Vector3::new(omega_body.z, omega_flow.y, -omega_flow.x);

        let mut conditions = FlightConditions::new(ref_length);
        conditions.set_atmosphere(env.atmosphere);
        conditions.set_velocity(speed);
        conditions.set_aoa(aoa);
        conditions.set_theta(theta);
        conditions.set_roll_rate(rates.x);
        conditions.set_pitch_rate(rates.y);
        conditions.set_yaw_rate(rates.z);
        conditions.set_pitch_center(env.mass.cg);

        let forces = ctx.aero.forces(ctx.rocket, &status.stages, &conditions, warnings)?;
        if !forces.is_finite() {
            return Err(SimulationError::calculation(
                state.time,
                status.phase,
                "non-finite aerodynamic coefficients",
            ));
        }

        let q_area = conditions.dynamic_pressure() * conditions.ref_area();
        let m = env.mass.mass;
        let thrust = status.thrust(state.time);
        let drag = forces.caxial * q_area;

        let force_flow = Vector3::new(-forces.cn * q_area, -forces.cside * q_area, thrust - drag);
        let mut accel = state.orientation * (to_body * force_flow) / m;
        accel.z -= env.gravity;

        let ang_accel = if !status.rod_cleared {
            let along = accel.dot(&status.rod_direction);
            accel = if !status.liftoff && along < 0.0 {
                Vector3::zeros()
            } else {
                status.rod_direction * along
            };
            Vector3::zeros()
        } else {
            let (i_long, i_rot) =
                (env.mass.longitudinal_inertia, env.mass.rotational_inertia);
            if !(i_long > EPSILON && i_rot > EPSILON) {
                return Err(SimulationError::calculation(
                    state.time,
                    status.phase,
                    "non-positive moment of inertia",
                ));
            }
            let moment = q_area * ref_length;
            let cm = forces.cm - forces.cn * env.mass.cg / ref_length;
            let cyaw = forces.cyaw - forces.cside * env.mass.cg / ref_length;
            let alpha_flow = Vector3::new(
                -cyaw * moment / i_long,
                cm * moment / i_long,
                forces.croll * moment / i_rot,
            );
            state.orientation * (to_body * alpha_flow)
        };

        let record = StepRecord {
            time_step: 0.0,
            mass: env.mass,
            atmosphere: env.atmosphere,
            reference_length: ref_length,
            airspeed: speed,
            mach: conditions.mach(),
            reynolds: conditions.reynolds(body_length(ctx.rocket, status)),
            aoa,
            rates,
            thrust,
            drag,
            gravity: env.gravity,
            acceleration: accel,
            drag_coefficient: forces.cd,
            forces: Some(forces),
        };
        Ok(Evaluation { accel, ang_accel, record })
    }

    /// Step length from the user step, the rotation limits, the launch rod
    /// and the next queued event.
    fn time_step(
        &self,
        ctx: &StepContext<'_>,
        status: &SimulationStatus,
        first: &Evaluation,
    ) -> f64 {
        let options = ctx.options;
        let state = &status.state;
        let min_step = options.time_step / 20.0;

        let mut dt = options.time_step;
        if !status.rod_cleared {
            dt /= 5.0;
            let speed = state.vel.norm();
            let remaining = options.launch_rod_length - state.pos.norm();
            if speed > EPSILON && remaining > 0.0 {
                dt = dt.min(remaining / speed);
            }
        }
        let rate = state.omega.norm();
        if rate > EPSILON {
            dt = dt.min(options.max_angle_step / rate);
        }
        let ang = first.ang_accel.norm();
        if ang > EPSILON {
            dt = dt.min((2.0 * options.max_angle_step / ang).sqrt());
        }
        dt = dt.min(1.5 * status.prev_time_step).max(min_step);

        clip_to_next_event(status, dt)
    }
}

fn clip_to_next_event(status: &SimulationStatus, dt: f64) -> f64 {
    match status.queue.next_time() {
        Some(next) if next - status.state.time > EPSILON => dt.min(next - status.state.time),
        _ => dt,
    }
}

impl RK4Stepper {
    fn integrate(
        &self,
        ctx: &StepContext<'_>,
        status: &SimulationStatus,
        warnings: &mut WarningSet,
    ) -> Result<(SimulationState, StepRecord, f64), SimulationError> {
        let s0 = &status.state;
        let first = self.evaluate(ctx, status, s0, warnings)?;
        let dt = self.time_step(ctx, status, &first);

        let k1 = StateDerivative::new(s0, first.accel, first.ang_accel);
        let s1 = s0.apply(&k1, dt / 2.0);
        let e2 = self.evaluate(ctx, status, &s1, warnings)?;
        let k2 = StateDerivative::new(&s1, e2.accel, e2.ang_accel);
        let s2 = s0.apply(&k2, dt / 2.0);
        let e3 = self.evaluate(ctx, status, &s2, warnings)?;
        let k3 = StateDerivative::new(&s2, e3.accel, e3.ang_accel);
        let s3 = s0.apply(&k3, dt);
        let e4 = self.evaluate(ctx, status, &s3, warnings)?;
        let k4 = StateDerivative::new(&s3, e4.accel, e4.ang_accel);

        let mut next = s0.combine([&k1, &k2, &k3, &k4], dt);
        if !status.liftoff && next.pos.z < 0.0 {
            next.pos = Vector3::zeros();
            next.vel = Vector3::zeros();
        }
        if !status.rod_cleared {
            next.omega = Vector3::zeros();
        }
        Ok((next, first.record, dt))
    }
}

impl Stepper for RK4Stepper {
    fn step(
        &self,
        ctx: &StepContext<'_>,
        status: &mut SimulationStatus,
    ) -> Result<StepRecord, SimulationError> {
        // Warnings from the rod phase are not reported
        let mut warnings = std::mem::take(&mut status.warnings);
        let result = if status.rod_cleared {
            self.integrate(ctx, status, &mut warnings)
        } else {
            self.integrate(ctx, status, &mut WarningSet::new())
        };
        status.warnings = warnings;
        let (next, mut record, dt) = result?;
        status.state = next;
        status.prev_time_step = dt;
        record.time_step = dt;
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// Three degree of freedom descent stepper
// ---------------------------------------------------------------------------

/// Point-mass RK4 stepper for descent under recovery devices or while
/// tumbling. Orientation is frozen and rotation is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescentStepper;

impl DescentStepper {
    /// Drag coefficient times area of the deployed recovery devices, or of
    /// the tumbling airframe when none is deployed (m^2).
    fn drag_area(
        &self,
        ctx: &StepContext<'_>,
        status: &SimulationStatus,
    ) -> Result<f64, SimulationError> {
        let chutes: f64 = status
            .deployed
            .iter()
            .filter_map(|id| ctx.rocket.component(*id))
            .filter(|c| status.stages.is_active(c.stage))
            .map(|c| match &c.kind {
                ComponentKind::Parachute(p) => p.cd * p.area(),
                _ => 0.0,
            })
            .sum();
        if chutes > 0.0 || !status.tumbling {
            return Ok(chutes);
        }
        let ref_area = PI * pow2(ctx.rocket.reference_length(&status.stages) / 2.0);
        Ok(ctx.aero.tumble_cd(ctx.rocket, &status.stages, ref_area)? * ref_area)
    }

    fn evaluate(
        &self,
        ctx: &StepContext<'_>,
        status: &SimulationStatus,
        state: &SimulationState,
        drag_area: f64,
    ) -> Result<(Vector3<f64>, StepRecord), SimulationError> {
        let env = environment(ctx, status, state)?;
        let speed = env.airspeed.norm();
        let drag = 0.5 * env.atmosphere.density * pow2(speed) * drag_area;

        let mut accel = Vector3::new(0.0, 0.0, -env.gravity);
        if speed > EPSILON {
            accel -= env.airspeed / speed * drag / env.mass.mass;
        }

        let ref_length = ctx.rocket.reference_length(&status.stages);
        let ref_area = PI * pow2(ref_length / 2.0);
        let nu = env.atmosphere.kinematic_viscosity();
        let length = body_length(ctx.rocket, status);
        let record = StepRecord {
            time_step: 0.0,
            mass: env.mass,
            atmosphere: env.atmosphere,
            reference_length: ref_length,
            airspeed: speed,
            mach: if env.atmosphere.sound_speed > 0.0 {
                speed / env.atmosphere.sound_speed
            } else {
                0.0
            },
            reynolds: speed * length / nu,
            aoa: f64::NAN,
            rates: Vector3::zeros(),
            thrust: 0.0,
            drag,
            gravity: env.gravity,
            acceleration: accel,
            drag_coefficient: if ref_area > 0.0 { drag_area / ref_area } else { f64::NAN },
            forces: None,
        };
        Ok((accel, record))
    }

    fn integrate(
        &self,
        ctx: &StepContext<'_>,
        status: &SimulationStatus,
        drag_area: f64,
        dt: f64,
    ) -> Result<(SimulationState, StepRecord), SimulationError> {
        let zero = Vector3::zeros();
        let s0 = &status.state;
        let (a1, record) = self.evaluate(ctx, status, s0, drag_area)?;
        let k1 = StateDerivative::new(s0, a1, zero);
        let s1 = s0.apply(&k1, dt / 2.0);
        let k2 = StateDerivative::new(&s1, self.evaluate(ctx, status, &s1, drag_area)?.0, zero);
        let s2 = s0.apply(&k2, dt / 2.0);
        let k3 = StateDerivative::new(&s2, self.evaluate(ctx, status, &s2, drag_area)?.0, zero);
        let s3 = s0.apply(&k3, dt);
        let k4 = StateDerivative::new(&s3, self.evaluate(ctx, status, &s3, drag_area)?.0, zero);
        Ok((s0.combine([&k1, &k2, &k3, &k4], dt), record))
    }
}

impl Stepper for DescentStepper {
    fn step(
        &self,
        ctx: &StepContext<'_>,
        status: &mut SimulationStatus,
    ) -> Result<StepRecord, SimulationError> {
        status.state.omega = Vector3::zeros();
        let drag_area = self.drag_area(ctx, status)?;
        let mut dt = clip_to_next_event(status, ctx.options.time_step);

        let (mut next, mut record) = self.integrate(ctx, status, drag_area, dt)?;

        // Land exactly on the ground
        let z0 = status.state.pos.z;
        if status.liftoff && z0 > 0.0 && next.pos.z < 0.0 {
            dt *= z0 / (z0 - next.pos.z);
            (next, record) = self.integrate(ctx, status, drag_area, dt)?;
            next.pos.z = 0.0;
        }

        status.state = next;
        status.prev_time_step = dt;
        record.time_step = dt;
        Ok(record)
    }
}
