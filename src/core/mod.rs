//! Core module - routing, status indicators, and event dispatch.
//!
//! This module contains the heart of agentrelay's message processing:
//! - Agent registry and message router
//! - Status indicator board
//! - Typed event dispatch over a channel

pub mod dispatch;
pub mod routing;
pub mod status;

pub use dispatch::{run_dispatcher, Dispatched, Dispatcher, EventBus};
pub use routing::{AgentRegistry, RouteOutcome, Router};
pub use status::{IndicatorBoard, IndicatorElement};
