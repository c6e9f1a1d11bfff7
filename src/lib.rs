//! Core of the Vapor engine, rewritten in Rust.
//!
//! A [`Scene`] owns a graph of [`Entity`] values, each carrying an ordered
//! list of [`Behavior`]s that receive lifecycle hooks once per frame.
//! Cameras, input buffering, time, a small physics world and draw
//! submission are provided as building blocks; turning the draw list into
//! pixels and decoding audio are left to the host so the core stays
//! testable headless. The [`pong`] module is a complete game built on top.

pub mod app;
pub mod audio;
pub mod behavior;
pub mod camera;
pub mod config;
pub mod entity;
pub mod error;
pub mod input;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
pub mod math;
pub mod physics;
pub mod pong;
pub mod render;
pub mod scene;
pub mod time;
pub mod transform;
pub mod viewport;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use audio::{AudioBackend, AudioClip, AudioSource, LogAudioBackend};
pub use behavior::{AwakeContext, Behavior, BehaviorId, BehaviorKind, CameraView, FrameContext};
pub use camera::Camera;
pub use config::EngineConfig;
pub use entity::{Entity, EntityId};
pub use error::{AudioError, ConfigError, SceneError};
pub use input::{InputSink, InputState, KeyCode, MouseButton, NamedKey, Touch, TouchData, TouchPhase};
pub use math::{BoundingBox2D, BoundingBox3D, Color, MatrixExt};
pub use physics::{Collider, PhysicsWorld, RevoluteJoint, RigidBody};
pub use render::{DrawCommand, DrawList, Material, Mesh, MeshRenderer};
pub use scene::{Scene, SceneCommand, SceneGraph};
#[cfg(not(target_arch = "wasm32"))]
pub use time::FrameClock;
pub use time::Time;
pub use transform::Transform;
pub use viewport::{Viewport, ViewportProvider, WindowViewport};
