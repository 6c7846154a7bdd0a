//! The closed set of motion models and their parameter records.
//!
//! This module only defines the data; `hlx-model` implements evaluation.
//! Splitting it this way keeps `hlx-core` (shared data, no logic) free of a
//! dependency on the registry crate, while `Animation` (in this crate) can
//! still carry a `ModelKind` + `Parameters` pair.

use serde::{Deserialize, Serialize};

use crate::track::TrackId;
use crate::vector::Position;

/// The closed set of motion models. Names are contractual: used in
/// multi-track-mode logic (rotational-model detection) and optimiser
/// coordinate-system hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    Linear,
    Circular,
    Elliptical,
    Spiral,
    Random,
    Pendulum,
    Bounce,
    Spring,
    Wave,
    Lissajous,
    Helix,
    Bezier,
    CatmullRom,
    Zigzag,
    PerlinNoise,
    RoseCurve,
    Epicycloid,
    Orbit,
    Formation,
    AttractRepel,
    Doppler,
    CircularScan,
    Zoom,
    Custom,
}

impl ModelKind {
    pub const ALL: [ModelKind; 24] = [
        ModelKind::Linear,
        ModelKind::Circular,
        ModelKind::Elliptical,
        ModelKind::Spiral,
        ModelKind::Random,
        ModelKind::Pendulum,
        ModelKind::Bounce,
        ModelKind::Spring,
        ModelKind::Wave,
        ModelKind::Lissajous,
        ModelKind::Helix,
        ModelKind::Bezier,
        ModelKind::CatmullRom,
        ModelKind::Zigzag,
        ModelKind::PerlinNoise,
        ModelKind::RoseCurve,
        ModelKind::Epicycloid,
        ModelKind::Orbit,
        ModelKind::Formation,
        ModelKind::AttractRepel,
        ModelKind::Doppler,
        ModelKind::CircularScan,
        ModelKind::Zoom,
        ModelKind::Custom,
    ];

    /// Models whose motion is a rotation in a plane — their barycentric
    /// offsets must be rotated rather than held fixed (§4.3).
    pub fn is_rotational(&self) -> bool {
        matches!(self, ModelKind::Circular | ModelKind::Spiral | ModelKind::Orbit | ModelKind::CircularScan)
    }

    /// The model's preferred coordinate system for OSC emission, used by the
    /// optimiser unless overridden by settings (§4.5).
    pub fn preferred_coordinate_system(&self) -> CoordinateSystem {
        match self {
            ModelKind::Circular
            | ModelKind::CircularScan
            | ModelKind::Zoom
            | ModelKind::Spiral
            | ModelKind::RoseCurve
            | ModelKind::Epicycloid
            | ModelKind::Orbit => CoordinateSystem::Aed,
            _ => CoordinateSystem::Xyz,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateSystem {
    Xyz,
    Aed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plane {
    Xy,
    Xz,
    Yz,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearParams {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircularParams {
    pub center: Position,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub plane: Plane,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EllipticalParams {
    pub center: Position,
    pub radius_a: f64,
    pub radius_b: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub plane: Plane,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpiralParams {
    pub center: Position,
    pub start_radius: f64,
    pub end_radius: f64,
    pub turns: f64,
    pub height: f64,
    pub plane: Plane,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RandomParams {
    pub center: Position,
    pub extent: Position,
    pub seed: u64,
    pub steps: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendulumParams {
    pub pivot: Position,
    pub length: f64,
    pub amplitude_deg: f64,
    pub plane: Plane,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BounceParams {
    pub start: Position,
    pub end: Position,
    pub bounce_height: f64,
    pub bounces: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringParams {
    pub anchor: Position,
    pub rest: Position,
    pub stiffness: f64,
    pub damping: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveParams {
    pub start: Position,
    pub end: Position,
    pub amplitude: f64,
    pub frequency: f64,
    pub plane: Plane,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LissajousParams {
    pub center: Position,
    pub amplitude_x: f64,
    pub amplitude_y: f64,
    pub freq_x: f64,
    pub freq_y: f64,
    pub phase: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HelixParams {
    pub center: Position,
    pub radius: f64,
    pub turns: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BezierParams {
    pub p0: Position,
    pub p1: Position,
    pub p2: Position,
    pub p3: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatmullRomParams {
    pub points: Vec<Position>,
    pub closed: bool,
    pub tension: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZigzagParams {
    pub start: Position,
    pub end: Position,
    pub amplitude: f64,
    pub segments: u32,
    pub plane: Plane,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerlinNoiseParams {
    pub center: Position,
    pub extent: Position,
    pub seed: u64,
    pub frequency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoseCurveParams {
    pub center: Position,
    pub radius: f64,
    pub petals: f64,
    pub plane: Plane,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpicycloidParams {
    pub center: Position,
    pub fixed_radius: f64,
    pub rolling_radius: f64,
    pub plane: Plane,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitParams {
    pub center: Position,
    pub radius: f64,
    pub inclination_deg: f64,
    pub revolutions: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormationParams {
    pub center: Position,
    pub spread: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttractRepelParams {
    pub target: Position,
    pub start: Position,
    pub strength: f64,
    pub repel: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DopplerParams {
    pub start: Position,
    pub end: Position,
    pub pass_distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircularScanParams {
    pub center: Position,
    pub radius: f64,
    pub sweep_deg: f64,
    pub scans: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomParams {
    pub anchor: Position,
    /// Unit direction vector from `anchor`.
    pub direction: Position,
    pub start_distance: f64,
    pub end_distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomParams {
    pub keyframes: Vec<(f64, Position)>,
}

/// Per-track custom parameters keyed by track, used by `BarycentricCustom`.
pub type CustomParamsPerTrack = std::collections::HashMap<TrackId, Parameters>;

/// A model's parameter record. Variant must match the owning `ModelKind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Parameters {
    Linear(LinearParams),
    Circular(CircularParams),
    Elliptical(EllipticalParams),
    Spiral(SpiralParams),
    Random(RandomParams),
    Pendulum(PendulumParams),
    Bounce(BounceParams),
    Spring(SpringParams),
    Wave(WaveParams),
    Lissajous(LissajousParams),
    Helix(HelixParams),
    Bezier(BezierParams),
    CatmullRom(CatmullRomParams),
    Zigzag(ZigzagParams),
    PerlinNoise(PerlinNoiseParams),
    RoseCurve(RoseCurveParams),
    Epicycloid(EpicycloidParams),
    Orbit(OrbitParams),
    Formation(FormationParams),
    AttractRepel(AttractRepelParams),
    Doppler(DopplerParams),
    CircularScan(CircularScanParams),
    Zoom(ZoomParams),
    Custom(CustomParams),
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters::Linear(LinearParams { start: Position::ORIGIN, end: Position::ORIGIN })
    }
}

impl Parameters {
    pub fn kind(&self) -> ModelKind {
        match self {
            Parameters::Linear(_) => ModelKind::Linear,
            Parameters::Circular(_) => ModelKind::Circular,
            Parameters::Elliptical(_) => ModelKind::Elliptical,
            Parameters::Spiral(_) => ModelKind::Spiral,
            Parameters::Random(_) => ModelKind::Random,
            Parameters::Pendulum(_) => ModelKind::Pendulum,
            Parameters::Bounce(_) => ModelKind::Bounce,
            Parameters::Spring(_) => ModelKind::Spring,
            Parameters::Wave(_) => ModelKind::Wave,
            Parameters::Lissajous(_) => ModelKind::Lissajous,
            Parameters::Helix(_) => ModelKind::Helix,
            Parameters::Bezier(_) => ModelKind::Bezier,
            Parameters::CatmullRom(_) => ModelKind::CatmullRom,
            Parameters::Zigzag(_) => ModelKind::Zigzag,
            Parameters::PerlinNoise(_) => ModelKind::PerlinNoise,
            Parameters::RoseCurve(_) => ModelKind::RoseCurve,
            Parameters::Epicycloid(_) => ModelKind::Epicycloid,
            Parameters::Orbit(_) => ModelKind::Orbit,
            Parameters::Formation(_) => ModelKind::Formation,
            Parameters::AttractRepel(_) => ModelKind::AttractRepel,
            Parameters::Doppler(_) => ModelKind::Doppler,
            Parameters::CircularScan(_) => ModelKind::CircularScan,
            Parameters::Zoom(_) => ModelKind::Zoom,
            Parameters::Custom(_) => ModelKind::Custom,
        }
    }
}
