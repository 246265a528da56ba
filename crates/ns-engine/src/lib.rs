//! # ns-engine — Neon Shinobi spin-outcome engine
//!
//! The engine is the sole source of truth for randomness and payout in the
//! Neon Shinobi slot game. It consumes a bet amount and a spin request and
//! produces a [`SpinOutcome`] and a [`SessionState`] snapshot for the
//! presentation layer to display. Rendering, audio, input widgets and any
//! transport layer are external collaborators behind [`EventSink`].
//!
//! ## Architecture
//!
//! ```text
//! SlotSession
//!     │
//!     ├── SymbolCatalog (symbol ids, payouts, appearance weights)
//!     ├── ReelGenerator (weighted 5×4 grid draws)
//!     ├── PayTable (25 payline patterns, run evaluation)
//!     └── BonusEngine (Cyber Hack scatter trigger, Shadow Dash free spins)
//!           │
//!           v
//!     SpinOutcome → EventSink callbacks
//! ```
//!
//! Outcomes are computed synchronously and are fully reproducible from a
//! seed: any spin-to-reveal latency is a presentation concern of the caller.

pub mod bonus;
pub mod calibration;
pub mod config;
pub mod events;
pub mod paytable;
pub mod reels;
pub mod session;
pub mod symbols;

pub use bonus::*;
pub use config::*;
pub use events::*;
pub use paytable::*;
pub use reels::*;
pub use session::*;
pub use symbols::*;
