use std::fmt;

// ---------------------------------------------------------------------------
// Recorded physical quantities
// ---------------------------------------------------------------------------

/// A physical quantity recorded once per simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FlightDataType {
    Time,
    Altitude,
    PositionX,
    PositionY,
    LateralDistance,
    VerticalVelocity,
    TotalVelocity,
    VerticalAcceleration,
    TotalAcceleration,
    Mach,
    Reynolds,
    AngleOfAttack,
    Zenith,
    Azimuth,
    RollRate,
    PitchRate,
    YawRate,
    CpLocation,
    CgLocation,
    Stability,
    Mass,
    PropellantMass,
    LongitudinalInertia,
    RotationalInertia,
    Thrust,
    Drag,
    Gravity,
    NormalForceCoeff,
    PitchMomentCoeff,
    YawMomentCoeff,
    SideForceCoeff,
    RollMomentCoeff,
    RollForcingCoeff,
    RollDampingCoeff,
    DragCoeff,
    AxialDragCoeff,
    FrictionDragCoeff,
    PressureDragCoeff,
    BaseDragCoeff,
    PitchDampingCoeff,
    YawDampingCoeff,
    ReferenceLength,
    ReferenceArea,
    AirTemperature,
    AirPressure,
    AirDensity,
    SpeedOfSound,
    TimeStep,
}

impl FlightDataType {
    pub const ALL: [FlightDataType; 48] = [
        FlightDataType::Time,
        FlightDataType::Altitude,
        FlightDataType::PositionX,
        FlightDataType::PositionY,
        FlightDataType::LateralDistance,
        FlightDataType::VerticalVelocity,
        FlightDataType::TotalVelocity,
        FlightDataType::VerticalAcceleration,
        FlightDataType::TotalAcceleration,
        FlightDataType::Mach,
        FlightDataType::Reynolds,
        FlightDataType::AngleOfAttack,
        FlightDataType::Zenith,
        FlightDataType::Azimuth,
        FlightDataType::RollRate,
        FlightDataType::PitchRate,
        FlightDataType::YawRate,
        FlightDataType::CpLocation,
        FlightDataType::CgLocation,
        FlightDataType::Stability,
        FlightDataType::Mass,
        FlightDataType::PropellantMass,
        FlightDataType::LongitudinalInertia,
        FlightDataType::RotationalInertia,
        FlightDataType::Thrust,
        FlightDataType::Drag,
        FlightDataType::Gravity,
        FlightDataType::NormalForceCoeff,
        FlightDataType::PitchMomentCoeff,
        FlightDataType::YawMomentCoeff,
        FlightDataType::SideForceCoeff,
        FlightDataType::RollMomentCoeff,
        FlightDataType::RollForcingCoeff,
        FlightDataType::RollDampingCoeff,
        FlightDataType::DragCoeff,
        FlightDataType::AxialDragCoeff,
        FlightDataType::FrictionDragCoeff,
        FlightDataType::PressureDragCoeff,
        FlightDataType::BaseDragCoeff,
        FlightDataType::PitchDampingCoeff,
        FlightDataType::YawDampingCoeff,
        FlightDataType::ReferenceLength,
        FlightDataType::ReferenceArea,
        FlightDataType::AirTemperature,
        FlightDataType::AirPressure,
        FlightDataType::AirDensity,
        FlightDataType::SpeedOfSound,
        FlightDataType::TimeStep,
    ];

    pub fn name(self) -> &'static str {
        use FlightDataType::*;
        match self {
            Time => "Time",
            Altitude => "Altitude",
            PositionX => "Position East of launch",
            PositionY => "Position North of launch",
            LateralDistance => "Lateral distance",
            VerticalVelocity => "Vertical velocity",
            TotalVelocity => "Total velocity",
            VerticalAcceleration => "Vertical acceleration",
            TotalAcceleration => "Total acceleration",
            Mach => "Mach number",
            Reynolds => "Reynolds number",
            AngleOfAttack => "Angle of attack",
            Zenith => "Vertical orientation (zenith)",
            Azimuth => "Lateral orientation (azimuth)",
            RollRate => "Roll rate",
            PitchRate => "Pitch rate",
            YawRate => "Yaw rate",
            CpLocation => "CP location",
            CgLocation => "CG location",
            Stability => "Stability margin calibers",
            Mass => "Mass",
            PropellantMass => "Propellant mass",
            LongitudinalInertia => "Longitudinal moment of inertia",
            RotationalInertia => "Rotational moment of inertia",
            Thrust => "Thrust",
            Drag => "Drag force",
            Gravity => "Gravitational acceleration",
            NormalForceCoeff => "Normal force coefficient",
            PitchMomentCoeff => "Pitch moment coefficient",
            YawMomentCoeff => "Yaw moment coefficient",
            SideForceCoeff => "Side force coefficient",
            RollMomentCoeff => "Roll moment coefficient",
            RollForcingCoeff => "Roll forcing coefficient",
            RollDampingCoeff => "Roll damping coefficient",
            DragCoeff => "Drag coefficient",
            AxialDragCoeff => "Axial drag coefficient",
            FrictionDragCoeff => "Friction drag coefficient",
            PressureDragCoeff => "Pressure drag coefficient",
            BaseDragCoeff => "Base drag coefficient",
            PitchDampingCoeff => "Pitch damping coefficient",
            YawDampingCoeff => "Yaw damping coefficient",
            ReferenceLength => "Reference length",
            ReferenceArea => "Reference area",
            AirTemperature => "Air temperature",
            AirPressure => "Air pressure",
            AirDensity => "Air density",
            SpeedOfSound => "Speed of sound",
            TimeStep => "Simulation time step",
        }
    }

    /// SI unit symbol; empty for dimensionless quantities.
    pub fn unit(self) -> &'static str {
        use FlightDataType::*;
        match self {
            Time | TimeStep => "s",
            Altitude | PositionX | PositionY | LateralDistance | CpLocation | CgLocation
            | ReferenceLength => "m",
            VerticalVelocity | TotalVelocity | SpeedOfSound => "m/s",
            VerticalAcceleration | TotalAcceleration | Gravity => "m/s²",
            AngleOfAttack | Zenith | Azimuth => "rad",
            RollRate | PitchRate | YawRate => "rad/s",
            Mass | PropellantMass => "kg",
            LongitudinalInertia | RotationalInertia => "kg·m²",
            Thrust | Drag => "N",
            ReferenceArea => "m²",
            AirTemperature => "K",
            AirPressure => "Pa",
            AirDensity => "kg/m³",
            Mach | Reynolds | Stability | NormalForceCoeff | PitchMomentCoeff | YawMomentCoeff
            | SideForceCoeff | RollMomentCoeff | RollForcingCoeff | RollDampingCoeff | DragCoeff
            | AxialDragCoeff | FrictionDragCoeff | PressureDragCoeff | BaseDragCoeff
            | PitchDampingCoeff | YawDampingCoeff => "",
        }
    }
}

impl fmt::Display for FlightDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
