//! seatbridge - Wayland seat input bridge with ordered cross-process delivery
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │     Display-server callbacks (seat)      │
//! ├──────────────────────────────────────────┤
//! │  InputDevice ── KeymapEngine (xkb)       │
//! │      │      └─ TextInput (IME)           │
//! │      ↓                                   │
//! │  RemoteEventDispatcher (ordered queue)   │
//! │      ↓                                   │
//! │  DeliveryPump → outbound channel         │
//! │      ↓                                   │
//! │  WindowEventRouter → observers           │
//! └──────────────────────────────────────────┘
//! ```

pub mod config;
pub mod constants;
pub mod events;
pub mod input;
pub mod replay;
pub mod shell;
