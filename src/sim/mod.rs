//! Smoke and fire particle simulation

pub mod camera;
pub mod color;
pub mod emission;
pub mod pool;
pub mod simulator;
pub mod stage;
pub mod text_shape;

pub use camera::Camera;
pub use pool::{ParticlePool, PoolConfig};
pub use simulator::{ParticleSimulator, StepContext, StepStats};
pub use stage::{Reconfigured, SceneState, SimulationStage};
pub use text_shape::{CosmicTextRasterizer, TextPointCloud, TextShapeSampler};
