//! Settings resolution and native compatibility mapping for the Wawona
//! waypipe client.
//!
//! Wawona keeps its settings as a flat key/value space: the compositor
//! options (scaling, safe area, color management) and the waypipe transport
//! options (display, socket, compression, video, SSH). This crate owns the
//! rules around that key space: which keys exist, what they default to, how
//! values written by older releases are honored, which options are active,
//! and how the result is handed to the native compositor layer.
//!
//! ```ignore
//! let mut settings = SettingsBuilder::new().open_default()?;
//! settings.set("waypipeCompress", "zstd")?;
//! let view = settings.view();
//! assert!(view.active.contains("waypipeCompressLevel"));
//! settings.apply(&mut native_sink)?;
//! ```
//!
//! # Design: the option table is the source of truth
//!
//! Every option is one [`OptionDef`] row in a [`Schema`]: key, type,
//! default, description, legacy aliases, dependency and write rules. Reads,
//! writes, visibility and the native record all derive from that table.
//! [`Schema::new`] checks it up front, so a bad default, a duplicated key or
//! a dependency cycle fails at construction instead of at read time.
//!
//! # Reading: resolution
//!
//! [`resolve()`](resolve::resolve) turns the raw store into a
//! [`ResolvedConfig`] with exactly one value per option:
//!
//! ```text
//! Default               OptionDef::default
//!        ↑ overridden by
//! Stored primary key    when present with the right type
//!        ↑ combined with
//! Legacy aliases        Fallback: used only when the primary is absent
//!                       Or: OR-ed into booleans, either key can enable
//!        ↑ overridden by
//! Platform values       forced / read-only options ignore the store
//! ```
//!
//! A value that does not fit its option (a number outside the native `i32`
//! range, an enum value outside its choices) resolves to the default.
//!
//! Resolution never writes. Forced values are written back by
//! [`sync_forced()`](resolve::sync_forced), which the session runs when it is
//! built and before every read action.
//!
//! # Writing: normalization
//!
//! [`normalize_write()`] decides what a raw user value becomes. Read-only
//! and forced options refuse writes, enum values must be one of the
//! choices, and options flagged to revert on empty drop back to their
//! default. A refused write is a [`WriteOutcome::Rejected`], not an error,
//! and leaves the store as it was.
//!
//! # Visibility
//!
//! Some options only matter when another has a particular value: the zstd
//! level only when compression is zstd, the SSH fields only when SSH is on.
//! [`active_keys()`](visibility::active_keys) evaluates those predicates
//! against a resolved snapshot. Inactive options keep their stored values.
//!
//! # The native record
//!
//! [`build_apply_record()`](apply::build_apply_record) produces the fixed
//! [`ApplyRecord`] the native layer consumes: fourteen scalar fields, each
//! taken from a platform constant or from a bound option. The record goes
//! out through a [`NativeSink`] exactly once per apply.
//!
//! # Platform profile
//!
//! Platform facts (socket directory, Xwayland availability, the native
//! constants) come from a [`PlatformProfile`], a confique struct loaded
//! from compiled Android defaults, optional `platform.toml` files and
//! `WAWONA_*` env vars. Profile files are strict by default: an unknown key
//! fails with its file and line.
//!
//! # Clap adapter
//!
//! The `cli` module (behind the `clap` feature, on by default) provides
//! [`SettingsArgs`], which gives an app
//! `settings list|get|set|unset|reset|active|apply` subcommands. It converts
//! to a [`SettingsAction`], handled by [`Settings::handle()`].
//!
//! # Error handling
//!
//! All fallible operations return [`SettingsError`]. See the [`error`]
//! module for the full set.

pub mod error;
pub mod types;

pub mod apply;
#[cfg(feature = "clap")]
mod cli;
pub mod file;
pub mod net;
mod normalize;
mod ops;
mod platform;
pub mod resolve;
pub mod schema;
mod session;
mod store;
mod validate;
pub mod visibility;

#[cfg(test)]
mod fixtures;

pub use apply::{ApplyRecord, NativeParam, NativeSink, PlatformConstants, Primitive};
#[cfg(feature = "clap")]
pub use cli::{SettingsArgs, SettingsSubcommand};
pub use error::SettingsError;
pub use normalize::{Rejection, WriteOutcome, normalize_write};
pub use ops::{Entry, SettingsResult};
pub use platform::{NativeConstants, PlatformProfile};
pub use resolve::ResolvedConfig;
pub use schema::{Combinator, LegacyAlias, OptionDef, Predicate, Schema, wawona_schema};
pub use session::{Settings, SettingsBuilder, SettingsView};
pub use store::{MemoryStore, Store, TomlFileStore};
pub use types::{OptionType, SettingsAction, Value};
pub use visibility::ActiveSet;
