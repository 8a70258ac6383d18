//! CogniSpy - visual search games for older adults
//!
//! This crate provides the core engine for CogniSpy, including:
//! - Variant generators for digits, symbols, vehicles, houses and shoes
//! - A position allocator for padded grids and free scatter layouts
//! - A per-type difficulty table and a generic board builder
//! - A session state machine with scoring and stage progression
//! - Path-tracing, maze and spot-the-difference mini-games
//!
//! # Architecture
//!
//! The engine is synchronous and platform-agnostic. Randomness is injected, so
//! boards are reproducible under a fixed seed. It can be compiled to:
//! - Native Rust for the WebSocket server
//! - WebAssembly for fully client-side play
//!
//! Data flows one way per round:
//! `(game type, stage) -> BoardBuilder -> Board -> clicks -> Session -> events`.
//!
//! # Modules
//!
//! - [`variant`]: Item values, target signatures and distractor sampling
//! - [`layout`]: Canvas coordinates and position allocation
//! - [`policy`]: Game types and their stage parameters
//! - [`board`]: Boards and the board builder
//! - [`session`]: Phases, scoring and the `Playable` trait
//! - [`activity`]: Route-name dispatch over every game

pub mod actions;
pub mod activity;
pub mod advisory;
pub mod board;
pub mod feedback;
pub mod layout;
pub mod maze;
pub mod policy;
pub mod scene;
pub mod session;
pub mod trace;
pub mod variant;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{SessionAction, SessionEvent};
pub use activity::{Activity, ActivityKind, ActivitySnapshot, ParseActivityError};
pub use advisory::{fallback_message, AdvisoryError, AdvisoryRequest, Locale, RoundToken};
pub use board::{Board, BoardBuilder, ClickResult, Item, DISTRACTOR_Z_BASE, TARGET_Z_BASE};
pub use feedback::{Feedback, FeedbackError, FeedbackKind, FeedbackSink};
pub use layout::{GridSpec, Point};
pub use maze::{MazeGame, MazeKind, MazePhase};
pub use policy::{GameType, Layout, OverlapPolicy, StageParams, UnknownGameType};
pub use scene::BearsGame;
pub use session::{Playable, Progress, Session, SessionError, SessionPhase, SessionSnapshot};
pub use trace::{TraceGame, TraceKind};
pub use variant::{
    Door, HouseConfig, Laces, ShoeDirection, ShoeStyle, ShoeVariant, Symbol, SymbolSet,
    TargetSignature, TransportType, Variant, VariantDomain, Windows,
};
