//! The option table: every setting's key, type, default, aliases and
//! visibility predicate.
//!
//! A [`Schema`] is validated once at construction and never changes afterwards.
//! Everything downstream (resolution, visibility, write normalization, the
//! native record) reads from it, so adding an option or a legacy alias is a
//! one-line change to [`wawona_schema`].

use std::collections::HashMap;

use crate::error::SettingsError;
use crate::platform::PlatformProfile;
use crate::types::{OptionType, Value};

/// Option keys as they appear in the persisted store.
pub mod keys {
    pub const AUTO_SCALE: &str = "autoScale";
    pub const RESPECT_SAFE_AREA: &str = "respectSafeArea";
    pub const RENDERING_BACKEND: &str = "renderingBackend";
    pub const UNIVERSAL_CLIPBOARD: &str = "universalClipboard";
    pub const COLOR_OPERATIONS: &str = "colorOperations";
    pub const NESTED_COMPOSITORS: &str = "nestedCompositorsSupport";
    pub const MULTIPLE_CLIENTS: &str = "multipleClients";
    pub const DISPLAY: &str = "waypipeDisplay";
    pub const SOCKET: &str = "waypipeSocket";
    pub const COMPRESS: &str = "waypipeCompress";
    pub const COMPRESS_LEVEL: &str = "waypipeCompressLevel";
    pub const THREADS: &str = "waypipeThreads";
    pub const VIDEO: &str = "waypipeVideo";
    pub const VIDEO_ENCODING: &str = "waypipeVideoEncoding";
    pub const VIDEO_DECODING: &str = "waypipeVideoDecoding";
    pub const VIDEO_BPF: &str = "waypipeVideoBpf";
    pub const SSH_ENABLED: &str = "waypipeSSHEnabled";
    pub const SSH_HOST: &str = "waypipeSSHHost";
    pub const SSH_USER: &str = "waypipeSSHUser";
    pub const SSH_BINARY: &str = "waypipeSSHBinary";
    pub const DEBUG: &str = "waypipeDebug";
    pub const NO_GPU: &str = "waypipeNoGpu";
    pub const ONESHOT: &str = "waypipeOneshot";
    pub const UNLINK_SOCKET: &str = "waypipeUnlinkSocket";
    pub const LOGIN_SHELL: &str = "waypipeLoginShell";
    pub const VSOCK: &str = "waypipeVsock";
    pub const XWLS: &str = "waypipeXwls";
    pub const TITLE_PREFIX: &str = "waypipeTitlePrefix";
    pub const SEC_CTX: &str = "waypipeSecCtx";
    pub const TCP_PORT: &str = "tcpPort";

    pub const LEGACY_AUTO_RETINA_SCALING: &str = "autoRetinaScaling";
    pub const LEGACY_COLOR_SYNC: &str = "colorSyncSupport";
}

pub const COMPRESSION_METHODS: &[&str] = &["none", "lz4", "zstd"];
pub const VIDEO_CODECS: &[&str] = &["none", "h264", "vp9", "av1"];
pub const VIDEO_ENCODERS: &[&str] = &["hw", "sw", "hwenc", "swenc"];
pub const VIDEO_DECODERS: &[&str] = &["hw", "sw", "hwdec", "swdec"];

/// How a legacy key's value combines with the option that replaced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Used only when the primary key is absent from the store.
    Fallback,
    /// Boolean OR with the primary (or its default). Either key can enable
    /// the feature.
    Or,
}

/// A previous name under which an option used to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyAlias {
    pub key: &'static str,
    pub ty: OptionType,
    pub combine: Combinator,
}

/// Condition under which a dependent option is active.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `key` resolves exactly to `value`.
    Equals {
        key: &'static str,
        value: &'static str,
    },
    /// `key` resolves to `value` or to a parameterized `value=...` form.
    Selects {
        key: &'static str,
        value: &'static str,
    },
    /// `key` resolves to anything but `value`.
    NotEquals {
        key: &'static str,
        value: &'static str,
    },
    /// `key` resolves to `true`.
    Enabled { key: &'static str },
}

impl Predicate {
    /// The option this predicate reads.
    pub fn key(&self) -> &'static str {
        match self {
            Predicate::Equals { key, .. }
            | Predicate::Selects { key, .. }
            | Predicate::NotEquals { key, .. }
            | Predicate::Enabled { key } => *key,
        }
    }
}

/// One declared option.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDef {
    pub key: &'static str,
    pub ty: OptionType,
    pub default: Value,
    pub doc: &'static str,
    pub aliases: Vec<LegacyAlias>,
    /// Platform-imposed value; wins over anything persisted.
    pub forced: Option<Value>,
    pub depends_on: Option<Predicate>,
    pub read_only: bool,
    pub revert_on_empty: bool,
}

impl OptionDef {
    fn new(key: &'static str, ty: OptionType, default: Value) -> Self {
        Self {
            key,
            ty,
            default,
            doc: "",
            aliases: Vec::new(),
            forced: None,
            depends_on: None,
            read_only: false,
            revert_on_empty: false,
        }
    }

    pub fn bool(key: &'static str, default: bool) -> Self {
        Self::new(key, OptionType::Bool, Value::Bool(default))
    }

    pub fn int(key: &'static str, default: i64) -> Self {
        Self::new(key, OptionType::Int, Value::Int(default))
    }

    pub fn string(key: &'static str, default: impl Into<String>) -> Self {
        Self::new(key, OptionType::String, Value::Str(default.into()))
    }

    pub fn int_string(key: &'static str, default: &str) -> Self {
        Self::new(key, OptionType::IntString, Value::from(default))
    }

    pub fn choice(key: &'static str, choices: &'static [&'static str], default: &str) -> Self {
        Self::new(key, OptionType::Enum(choices), Value::from(default))
    }

    pub fn doc(mut self, doc: &'static str) -> Self {
        self.doc = doc;
        self
    }

    pub fn alias(mut self, key: &'static str, ty: OptionType, combine: Combinator) -> Self {
        self.aliases.push(LegacyAlias { key, ty, combine });
        self
    }

    pub fn forced(mut self, value: impl Into<Value>) -> Self {
        self.forced = Some(value.into());
        self
    }

    /// Only the platform writes this option; its default is the platform value.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self.forced = Some(self.default.clone());
        self
    }

    pub fn revert_on_empty(mut self) -> Self {
        self.revert_on_empty = true;
        self
    }

    pub fn when(mut self, predicate: Predicate) -> Self {
        self.depends_on = Some(predicate);
        self
    }
}

/// A validated, immutable option table.
#[derive(Debug, Clone)]
pub struct Schema {
    options: Vec<OptionDef>,
    index: HashMap<&'static str, usize>,
}

impl Schema {
    /// Validate and freeze an option table.
    ///
    /// Rejects duplicate keys, defaults or forced values of the wrong type or
    /// outside their enum choices, predicates over undeclared keys, and
    /// dependency cycles.
    pub fn new(options: Vec<OptionDef>) -> Result<Self, SettingsError> {
        let mut index = HashMap::with_capacity(options.len());
        for (i, opt) in options.iter().enumerate() {
            if index.insert(opt.key, i).is_some() {
                return Err(SettingsError::DuplicateKey(opt.key.into()));
            }
        }

        for opt in &options {
            check_value(opt, &opt.default)?;
            if let Some(forced) = &opt.forced {
                check_value(opt, forced)?;
            }
            if opt.ty != OptionType::Bool
                && opt.aliases.iter().any(|a| a.combine == Combinator::Or)
            {
                return Err(SettingsError::TypeMismatch {
                    key: opt.key.into(),
                    expected: "bool (required by an OR alias)".into(),
                });
            }
            if let Some(pred) = &opt.depends_on
                && !index.contains_key(pred.key())
            {
                return Err(SettingsError::UnknownDependency {
                    key: opt.key.into(),
                    depends_on: pred.key().into(),
                });
            }
        }

        let schema = Self { options, index };
        schema.check_cycles()?;
        Ok(schema)
    }

    pub fn lookup(&self, key: &str) -> Option<&OptionDef> {
        self.index.get(key).map(|&i| &self.options[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Options in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &OptionDef> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    // Each option depends on at most one other, so following the chain from
    // every option is enough to find any cycle.
    fn check_cycles(&self) -> Result<(), SettingsError> {
        for opt in &self.options {
            let mut chain = vec![opt.key];
            let mut current = opt;
            while let Some(pred) = &current.depends_on {
                let next = pred.key();
                if let Some(pos) = chain.iter().position(|k| *k == next) {
                    let mut cycle: Vec<String> =
                        chain[pos..].iter().map(|k| (*k).to_string()).collect();
                    cycle.push(next.to_string());
                    return Err(SettingsError::DependencyCycle(cycle));
                }
                chain.push(next);
                match self.lookup(next) {
                    Some(dep) => current = dep,
                    None => break,
                }
            }
        }
        Ok(())
    }
}

fn check_value(opt: &OptionDef, value: &Value) -> Result<(), SettingsError> {
    if !opt.ty.accepts(value) {
        return Err(SettingsError::TypeMismatch {
            key: opt.key.into(),
            expected: opt.ty.name().into(),
        });
    }
    if let (Some(choices), Some(s)) = (opt.ty.choices(), value.as_str())
        && !choices.iter().any(|c| *c == s)
    {
        return Err(SettingsError::DefaultNotInChoices {
            key: opt.key.into(),
            value: s.into(),
            choices: choices.iter().map(|c| (*c).to_string()).collect(),
        });
    }
    Ok(())
}

/// The Wawona option table for the given platform.
pub fn wawona_schema(profile: &PlatformProfile) -> Result<Schema, SettingsError> {
    use keys::*;

    let video_active = Predicate::NotEquals {
        key: VIDEO,
        value: "none",
    };
    let ssh_active = Predicate::Enabled { key: SSH_ENABLED };

    Schema::new(vec![
        // Display & rendering
        OptionDef::bool(AUTO_SCALE, true)
            .doc("Detect and match the platform UI scaling")
            .alias(LEGACY_AUTO_RETINA_SCALING, OptionType::Bool, Combinator::Or),
        OptionDef::bool(RESPECT_SAFE_AREA, true).doc("Avoid system UI and notches"),
        OptionDef::int(RENDERING_BACKEND, 0)
            .doc("Rendering backend (0 automatic, 1 Vulkan, 2 surface)"),
        OptionDef::bool(UNIVERSAL_CLIPBOARD, true).doc("Share the clipboard with clients"),
        // Advanced features
        OptionDef::bool(COLOR_OPERATIONS, true)
            .doc("Enable color profiles, HDR requests, etc.")
            .alias(LEGACY_COLOR_SYNC, OptionType::Bool, Combinator::Or),
        OptionDef::bool(NESTED_COMPOSITORS, true).doc("Support nested Wayland compositors"),
        OptionDef::bool(MULTIPLE_CLIENTS, false).doc("Allow multiple Wayland clients"),
        // Waypipe
        OptionDef::string(DISPLAY, "wayland-0")
            .doc("Display socket name")
            .revert_on_empty(),
        OptionDef::string(SOCKET, profile.socket_path())
            .doc("Unix socket path (set by platform)")
            .read_only(),
        OptionDef::choice(COMPRESS, COMPRESSION_METHODS, "lz4")
            .doc("Compression method for data transfers"),
        OptionDef::int_string(COMPRESS_LEVEL, "7")
            .doc("Zstd compression level (1-22)")
            .when(Predicate::Selects {
                key: COMPRESS,
                value: "zstd",
            }),
        OptionDef::int_string(THREADS, "0")
            .doc("Number of threads (0 = auto)")
            .revert_on_empty(),
        OptionDef::choice(VIDEO, VIDEO_CODECS, "none").doc("DMABUF video compression codec"),
        OptionDef::choice(VIDEO_ENCODING, VIDEO_ENCODERS, "hw")
            .doc("Hardware or software encoding")
            .when(video_active.clone()),
        OptionDef::choice(VIDEO_DECODING, VIDEO_DECODERS, "hw")
            .doc("Hardware or software decoding")
            .when(video_active.clone()),
        OptionDef::int_string(VIDEO_BPF, "")
            .doc("Target bits per frame")
            .when(video_active),
        OptionDef::bool(SSH_ENABLED, false).doc("Allow SSH connections for waypipe"),
        OptionDef::string(SSH_HOST, "")
            .doc("Remote host for SSH connection")
            .when(ssh_active.clone()),
        OptionDef::string(SSH_USER, "")
            .doc("SSH username")
            .when(ssh_active.clone()),
        OptionDef::string(SSH_BINARY, "ssh")
            .doc("Path to ssh binary")
            .when(ssh_active),
        OptionDef::bool(DEBUG, false).doc("Print debug log messages"),
        OptionDef::bool(NO_GPU, false).doc("Block GPU-accelerated protocols"),
        OptionDef::bool(ONESHOT, false).doc("Exit after single connection closes"),
        OptionDef::bool(UNLINK_SOCKET, false).doc("Remove socket file on shutdown"),
        OptionDef::bool(LOGIN_SHELL, false).doc("Open login shell if no command"),
        OptionDef::bool(VSOCK, false).doc("Use vsock for VM communication"),
        OptionDef::bool(XWLS, false)
            .doc("Use xwayland-satellite for X clients")
            .forced(profile.xwayland_available),
        OptionDef::string(TITLE_PREFIX, "").doc("Prefix for window titles"),
        OptionDef::string(SEC_CTX, "").doc("Application ID for security context"),
        OptionDef::int_string(TCP_PORT, "1234")
            .doc("TCP listener port (unused, kept for the native record)"),
    ])
}
