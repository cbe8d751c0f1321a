//! urpaq-server
//!
//! HTTP surface for the assistant plus the shared wiring used by the
//! `urpaq-server`, `urpaq-indexer` and `urpaq-ask` binaries.
pub mod logging;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;

/// `--verbose`/`-v` anywhere on the command line.
pub fn verbose_flag(args: &[String]) -> bool {
    args.iter().any(|a| a == "--verbose" || a == "-v")
}
