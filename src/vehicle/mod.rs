pub mod component;
pub mod mass;
pub mod motor;
pub mod rocket;
pub mod shape;

pub use component::{
    BodyTube, Component, ComponentId, ComponentKind, CrossSection, DeployTrigger, Finish, FinSet,
    LaunchLug, Parachute, RailButton, Transition,
};
pub use mass::{MassCalculator, MassData};
pub use motor::{IgnitionTrigger, Motor, MotorInstance, MotorMount};
pub use rocket::{presets, Rocket, RocketBuilder, SeparationTrigger, Stage, StageSeparation, StageSet};
pub use shape::TransitionShape;
