//! HTTP presentation adapter
//!
//! This module exposes the studio to a browser front end:
//! - POST /stream/start, /stream/stop, /stream/restart - Session control
//! - GET /stream/status - Current readouts
//! - GET /platforms, POST /platforms/:platform/{connect,disconnect} - Platform intents
//! - GET /events - Server-sent studio events
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
