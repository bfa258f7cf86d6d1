// =============================================================================
// Metal Spot Tracker — library crate
// =============================================================================
//
// Tracks spot prices for a small fixed set of metals, converts them to a
// local currency, and maintains a bounded historical series per metal.
//
//   series    — per-metal log: idempotent append + age/count retention
//   window    — pure transforms: trailing window, bucketed downsampling,
//               nearest-by-age lookup, percentage change
//   ratio     — derived cross-metal ratio series (gold/silver)
//   providers — spot price and exchange rate fetch collaborators
//   storage   — flat JSON blob store, one file per metal plus the snapshot
//   ingest    — one sampling tick across all configured metals
//
// The binary in `main.rs` wires these together for one tick per invocation;
// the window engine is equally usable by any display consumer of the
// persisted series.
// =============================================================================

pub mod config;
pub mod ingest;
pub mod providers;
pub mod ratio;
pub mod series;
pub mod storage;
pub mod types;
pub mod window;
