//! The native boundary: translate resolved settings into the fixed record the
//! compositor layer consumes, and hand it over.
//!
//! Every native parameter has exactly one explicit source. Platform constants
//! come first; anything else must be bound to an option in [`BINDINGS`]. A
//! parameter with neither is an error rather than a silent default.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::SettingsError;
use crate::platform::NativeConstants;
use crate::resolve::ResolvedConfig;
use crate::schema::{Schema, keys};
use crate::types::Value;
use crate::visibility::ActiveSet;

/// Native parameters in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NativeParam {
    ServerSideDecorations,
    AutoScale,
    RenderingBackend,
    RespectSafeArea,
    RenderPointerOverlay,
    ModifierSwap,
    UniversalClipboard,
    ColorOperations,
    NestedCompositors,
    ExperimentalCompositeMode,
    MultipleClients,
    TransportRsSupport,
    TcpListenerEnabled,
    TcpPort,
}

impl NativeParam {
    pub const ORDER: [NativeParam; 14] = [
        NativeParam::ServerSideDecorations,
        NativeParam::AutoScale,
        NativeParam::RenderingBackend,
        NativeParam::RespectSafeArea,
        NativeParam::RenderPointerOverlay,
        NativeParam::ModifierSwap,
        NativeParam::UniversalClipboard,
        NativeParam::ColorOperations,
        NativeParam::NestedCompositors,
        NativeParam::ExperimentalCompositeMode,
        NativeParam::MultipleClients,
        NativeParam::TransportRsSupport,
        NativeParam::TcpListenerEnabled,
        NativeParam::TcpPort,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NativeParam::ServerSideDecorations => "serverSideDecorations",
            NativeParam::AutoScale => "autoScale",
            NativeParam::RenderingBackend => "renderingBackend",
            NativeParam::RespectSafeArea => "respectSafeArea",
            NativeParam::RenderPointerOverlay => "renderPointerOverlay",
            NativeParam::ModifierSwap => "modifierSwap",
            NativeParam::UniversalClipboard => "universalClipboard",
            NativeParam::ColorOperations => "colorOperations",
            NativeParam::NestedCompositors => "nestedCompositors",
            NativeParam::ExperimentalCompositeMode => "experimentalCompositeMode",
            NativeParam::MultipleClients => "multipleClients",
            NativeParam::TransportRsSupport => "transportRSSupport",
            NativeParam::TcpListenerEnabled => "tcpListenerEnabled",
            NativeParam::TcpPort => "tcpPort",
        }
    }

    fn is_int(self) -> bool {
        matches!(self, NativeParam::RenderingBackend | NativeParam::TcpPort)
    }
}

/// Native parameters sourced from a user-facing option.
pub const BINDINGS: &[(NativeParam, &str)] = &[
    (NativeParam::AutoScale, keys::AUTO_SCALE),
    (NativeParam::RenderingBackend, keys::RENDERING_BACKEND),
    (NativeParam::RespectSafeArea, keys::RESPECT_SAFE_AREA),
    (NativeParam::UniversalClipboard, keys::UNIVERSAL_CLIPBOARD),
    (NativeParam::ColorOperations, keys::COLOR_OPERATIONS),
    (NativeParam::NestedCompositors, keys::NESTED_COMPOSITORS),
    (NativeParam::MultipleClients, keys::MULTIPLE_CLIENTS),
    (NativeParam::TcpPort, keys::TCP_PORT),
];

/// A primitive native value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Primitive {
    Bool(bool),
    Int(i32),
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Primitive::Bool(true) => write!(f, "enabled"),
            Primitive::Bool(false) => write!(f, "disabled"),
            Primitive::Int(i) => write!(f, "{i}"),
        }
    }
}

/// Platform-fixed native values, keyed by parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformConstants(BTreeMap<NativeParam, Primitive>);

impl PlatformConstants {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, param: NativeParam, value: Primitive) -> Self {
        self.0.insert(param, value);
        self
    }

    pub fn get(&self, param: NativeParam) -> Option<Primitive> {
        self.0.get(&param).copied()
    }
}

impl From<&NativeConstants> for PlatformConstants {
    fn from(c: &NativeConstants) -> Self {
        use NativeParam::*;
        Self::new()
            .with(ServerSideDecorations, Primitive::Bool(c.server_side_decorations))
            .with(RenderPointerOverlay, Primitive::Bool(c.render_pointer_overlay))
            .with(ModifierSwap, Primitive::Bool(c.modifier_swap))
            .with(ExperimentalCompositeMode, Primitive::Bool(c.experimental_composite_mode))
            .with(TransportRsSupport, Primitive::Bool(c.transport_rs_support))
            .with(TcpListenerEnabled, Primitive::Bool(c.tcp_listener_enabled))
    }
}

/// The record handed to the native layer. Field order and count are the wire
/// contract; bump [`ApplyRecord::VERSION`] when changing either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRecord {
    pub server_side_decorations: bool,
    pub auto_scale: bool,
    pub rendering_backend: i32,
    pub respect_safe_area: bool,
    pub render_pointer_overlay: bool,
    pub modifier_swap: bool,
    pub universal_clipboard: bool,
    pub color_operations: bool,
    pub nested_compositors: bool,
    pub experimental_composite_mode: bool,
    pub multiple_clients: bool,
    #[serde(rename = "transportRSSupport")]
    pub transport_rs_support: bool,
    pub tcp_listener_enabled: bool,
    pub tcp_port: i32,
}

impl ApplyRecord {
    pub const VERSION: u32 = 1;

    /// The record as (parameter, value) pairs in wire order.
    pub fn fields(&self) -> [(NativeParam, Primitive); 14] {
        use NativeParam::*;
        use Primitive::{Bool, Int};
        [
            (ServerSideDecorations, Bool(self.server_side_decorations)),
            (AutoScale, Bool(self.auto_scale)),
            (RenderingBackend, Int(self.rendering_backend)),
            (RespectSafeArea, Bool(self.respect_safe_area)),
            (RenderPointerOverlay, Bool(self.render_pointer_overlay)),
            (ModifierSwap, Bool(self.modifier_swap)),
            (UniversalClipboard, Bool(self.universal_clipboard)),
            (ColorOperations, Bool(self.color_operations)),
            (NestedCompositors, Bool(self.nested_compositors)),
            (ExperimentalCompositeMode, Bool(self.experimental_composite_mode)),
            (MultipleClients, Bool(self.multiple_clients)),
            (TransportRsSupport, Bool(self.transport_rs_support)),
            (TcpListenerEnabled, Bool(self.tcp_listener_enabled)),
            (TcpPort, Int(self.tcp_port)),
        ]
    }
}

/// Translate resolved settings into an [`ApplyRecord`].
///
/// Bound options that are currently inactive contribute their schema default.
pub fn build_apply_record(
    schema: &Schema,
    resolved: &ResolvedConfig,
    active: &ActiveSet,
    constants: &PlatformConstants,
) -> Result<ApplyRecord, SettingsError> {
    let mut values = BTreeMap::new();
    for param in NativeParam::ORDER {
        let value = match constants.get(param) {
            Some(constant) => constant,
            None => bound_value(param, schema, resolved, active)?,
        };
        if value_is_int(value) != param.is_int() {
            return Err(SettingsError::InvalidValue {
                key: param.name().into(),
                reason: format!("expected {}", if param.is_int() { "int" } else { "bool" }),
            });
        }
        values.insert(param, value);
    }

    let flag = |p: NativeParam| matches!(values.get(&p), Some(Primitive::Bool(true)));
    let int = |p: NativeParam| match values.get(&p) {
        Some(Primitive::Int(i)) => *i,
        _ => 0,
    };

    use NativeParam::*;
    Ok(ApplyRecord {
        server_side_decorations: flag(ServerSideDecorations),
        auto_scale: flag(AutoScale),
        rendering_backend: int(RenderingBackend),
        respect_safe_area: flag(RespectSafeArea),
        render_pointer_overlay: flag(RenderPointerOverlay),
        modifier_swap: flag(ModifierSwap),
        universal_clipboard: flag(UniversalClipboard),
        color_operations: flag(ColorOperations),
        nested_compositors: flag(NestedCompositors),
        experimental_composite_mode: flag(ExperimentalCompositeMode),
        multiple_clients: flag(MultipleClients),
        transport_rs_support: flag(TransportRsSupport),
        tcp_listener_enabled: flag(TcpListenerEnabled),
        tcp_port: int(TcpPort),
    })
}

fn value_is_int(value: Primitive) -> bool {
    matches!(value, Primitive::Int(_))
}

fn bound_value(
    param: NativeParam,
    schema: &Schema,
    resolved: &ResolvedConfig,
    active: &ActiveSet,
) -> Result<Primitive, SettingsError> {
    let key = BINDINGS
        .iter()
        .find(|(p, _)| *p == param)
        .map(|(_, key)| *key)
        .ok_or(SettingsError::UnboundNativeParam(param))?;
    let opt = schema
        .lookup(key)
        .ok_or_else(|| SettingsError::KeyNotFound(key.into()))?;

    let value = if active.contains(key) {
        resolved
            .get(key)
            .ok_or_else(|| SettingsError::KeyNotFound(key.into()))?
    } else {
        &opt.default
    };
    to_primitive(key, value)
}

fn to_primitive(key: &str, value: &Value) -> Result<Primitive, SettingsError> {
    let int = |i: i64| {
        i32::try_from(i).map_err(|_| SettingsError::InvalidValue {
            key: key.into(),
            reason: format!("{i} does not fit the native int"),
        })
    };
    match value {
        Value::Bool(b) => Ok(Primitive::Bool(*b)),
        Value::Int(i) => int(*i).map(Primitive::Int),
        Value::Str(s) => {
            let parsed = s.trim().parse::<i64>().map_err(|_| SettingsError::InvalidValue {
                key: key.into(),
                reason: format!("'{s}' is not a number"),
            })?;
            int(parsed).map(Primitive::Int)
        }
    }
}

/// The native compositor/transport layer.
pub trait NativeSink {
    fn apply_settings(
        &mut self,
        record: &ApplyRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<F> NativeSink for F
where
    F: FnMut(&ApplyRecord) -> Result<(), Box<dyn std::error::Error + Send + Sync>>,
{
    fn apply_settings(
        &mut self,
        record: &ApplyRecord,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self(record)
    }
}

/// Log the record and make the single native call. No retry.
pub fn send<N: NativeSink + ?Sized>(
    record: &ApplyRecord,
    sink: &mut N,
) -> Result<(), SettingsError> {
    tracing::info!(version = ApplyRecord::VERSION, "applying settings");
    for (param, value) in record.fields() {
        tracing::info!(param = param.name(), %value);
    }
    sink.apply_settings(record).map_err(|source| {
        tracing::warn!(error = %source, "native layer rejected settings");
        SettingsError::NativeApply { source }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{android_profile, wawona};
    use crate::resolve::resolve;
    use crate::schema::OptionDef;
    use crate::store::MemoryStore;
    use crate::visibility::active_keys;

    fn record(store: &MemoryStore) -> ApplyRecord {
        let schema = wawona();
        let resolved = resolve(&schema, store);
        let active = active_keys(&schema, &resolved);
        let constants = PlatformConstants::from(&android_profile().constants);
        build_apply_record(&schema, &resolved, &active, &constants).unwrap()
    }

    #[test]
    fn defaults_on_android() {
        let r = record(&MemoryStore::new());
        assert!(r.server_side_decorations);
        assert!(r.auto_scale);
        assert_eq!(r.rendering_backend, 0);
        assert!(r.respect_safe_area);
        assert!(!r.render_pointer_overlay);
        assert!(!r.modifier_swap);
        assert!(r.universal_clipboard);
        assert!(r.color_operations);
        assert!(r.nested_compositors);
        assert!(!r.experimental_composite_mode);
        assert!(!r.multiple_clients);
        assert!(r.transport_rs_support);
        assert!(!r.tcp_listener_enabled);
        assert_eq!(r.tcp_port, 1234);
    }

    #[test]
    fn options_flow_into_record() {
        let store = MemoryStore::new()
            .with(keys::MULTIPLE_CLIENTS, true)
            .with(keys::RENDERING_BACKEND, 2i64)
            .with(keys::RESPECT_SAFE_AREA, false)
            .with(keys::TCP_PORT, "4000");
        let r = record(&store);
        assert!(r.multiple_clients);
        assert_eq!(r.rendering_backend, 2);
        assert!(!r.respect_safe_area);
        assert_eq!(r.tcp_port, 4000);
    }

    #[test]
    fn legacy_color_sync_reaches_record_once() {
        let store = MemoryStore::new()
            .with(keys::COLOR_OPERATIONS, false)
            .with(keys::LEGACY_COLOR_SYNC, true);
        assert!(record(&store).color_operations);
    }

    #[test]
    fn constants_win_over_bindings() {
        let schema = wawona();
        let store = MemoryStore::new().with(keys::MULTIPLE_CLIENTS, true);
        let resolved = resolve(&schema, &store);
        let active = active_keys(&schema, &resolved);
        let constants = PlatformConstants::from(&android_profile().constants)
            .with(NativeParam::MultipleClients, Primitive::Bool(false));
        let r = build_apply_record(&schema, &resolved, &active, &constants).unwrap();
        assert!(!r.multiple_clients);
    }

    #[test]
    fn missing_constant_is_an_error() {
        let schema = wawona();
        let resolved = resolve(&schema, &MemoryStore::new());
        let active = active_keys(&schema, &resolved);
        let err = build_apply_record(&schema, &resolved, &active, &PlatformConstants::new())
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::UnboundNativeParam(NativeParam::ServerSideDecorations)
        ));
    }

    #[test]
    fn constant_of_wrong_kind_is_rejected() {
        let schema = wawona();
        let resolved = resolve(&schema, &MemoryStore::new());
        let active = active_keys(&schema, &resolved);
        let constants = PlatformConstants::from(&android_profile().constants)
            .with(NativeParam::TcpPort, Primitive::Bool(true));
        let err = build_apply_record(&schema, &resolved, &active, &constants).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { key, .. } if key == "tcpPort"));
    }

    #[test]
    fn inactive_bound_option_uses_default() {
        let schema = Schema::new(vec![
            OptionDef::bool("gate", false),
            OptionDef::bool(keys::MULTIPLE_CLIENTS, false)
                .when(crate::schema::Predicate::Enabled { key: "gate" }),
            OptionDef::bool(keys::AUTO_SCALE, true),
            OptionDef::int(keys::RENDERING_BACKEND, 0),
            OptionDef::bool(keys::RESPECT_SAFE_AREA, true),
            OptionDef::bool(keys::UNIVERSAL_CLIPBOARD, true),
            OptionDef::bool(keys::COLOR_OPERATIONS, true),
            OptionDef::bool(keys::NESTED_COMPOSITORS, true),
            OptionDef::int_string(keys::TCP_PORT, "1234"),
        ])
        .unwrap();
        let constants = PlatformConstants::from(&android_profile().constants);

        let store = MemoryStore::new().with(keys::MULTIPLE_CLIENTS, true);
        let resolved = resolve(&schema, &store);
        let active = active_keys(&schema, &resolved);
        let r = build_apply_record(&schema, &resolved, &active, &constants).unwrap();
        assert!(!r.multiple_clients);

        let store = store.with("gate", true);
        let resolved = resolve(&schema, &store);
        let active = active_keys(&schema, &resolved);
        let r = build_apply_record(&schema, &resolved, &active, &constants).unwrap();
        assert!(r.multiple_clients);
    }

    #[test]
    fn oversized_port_uses_default() {
        let r = record(&MemoryStore::new().with(keys::TCP_PORT, "99999999999"));
        assert_eq!(r.tcp_port, 1234);
    }

    #[test]
    fn oversized_backend_uses_default() {
        let r = record(&MemoryStore::new().with(keys::RENDERING_BACKEND, 1i64 << 40));
        assert_eq!(r.rendering_backend, 0);
    }

    #[test]
    fn fields_follow_wire_order() {
        let r = record(&MemoryStore::new());
        let order: Vec<NativeParam> = r.fields().iter().map(|(p, _)| *p).collect();
        assert_eq!(order, NativeParam::ORDER.to_vec());
    }

    #[test]
    fn json_uses_native_names() {
        let json = serde_json::to_value(record(&MemoryStore::new())).unwrap();
        assert_eq!(json["transportRSSupport"], serde_json::Value::Bool(true));
        assert_eq!(json["tcpPort"], serde_json::json!(1234));
        assert_eq!(json.as_object().unwrap().len(), 14);
    }

    #[test]
    fn send_reports_sink_failure() {
        let r = record(&MemoryStore::new());
        let mut failing =
            |_: &ApplyRecord| -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
                Err("compositor not running".into())
            };
        let err = send(&r, &mut failing).unwrap_err();
        assert!(matches!(err, SettingsError::NativeApply { .. }));
        assert!(err.to_string().contains("compositor not running"));
    }

    #[test]
    fn send_calls_sink_once() {
        let r = record(&MemoryStore::new());
        let mut calls = Vec::new();
        let mut sink = |rec: &ApplyRecord| -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            calls.push(*rec);
            Ok(())
        };
        send(&r, &mut sink).unwrap();
        assert_eq!(calls, vec![r]);
    }
}
