//! Discord Integration - gateway-facing interaction layer
//!
//! This crate provides the platform interface for formbot:
//! - **Commands** (`commands`) - legacy `!`-prefixed text parsing and the
//!   native command catalog registered at startup
//! - **Events** (`events`) - the interaction event model and the router
//!   that maps discriminators to handlers
//! - **Embeds** (`embeds`) - typed panel, button, and modal payloads plus
//!   the concrete messages the bot sends
//! - **Gateway** (`gateway`) - the transport trait and the event-loop
//!   runner with per-event failure isolation
//!
//! # Architecture
//!
//! ```text
//! Gateway Events → InteractionRouter → Handlers → Record Store
//!                        ↓
//!                  Embed/Modal Payloads ← Response
//! ```
//!
//! The actual wire connection lives behind [`gateway::GatewayTransport`];
//! everything above it is testable with in-memory fakes.

pub mod commands;
pub mod embeds;
pub mod events;
pub mod gateway;
