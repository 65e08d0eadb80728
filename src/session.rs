use std::path::PathBuf;

use crate::apply::{self, ApplyRecord, NativeSink, PlatformConstants};
use crate::error::SettingsError;
use crate::file;
use crate::normalize::{WriteOutcome, normalize_write};
use crate::ops::{self, SettingsResult};
use crate::platform::PlatformProfile;
use crate::resolve::{self, ResolvedConfig};
use crate::schema::{self, Schema};
use crate::store::{Store, TomlFileStore};
use crate::types::{SettingsAction, Value};
use crate::visibility::{self, ActiveSet};

/// A consistent snapshot: effective values and the options they activate.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsView {
    pub resolved: ResolvedConfig,
    pub active: ActiveSet,
}

/// Builder for a [`Settings`] session.
///
/// The platform profile comes from [`profile()`](Self::profile) if given,
/// otherwise it is loaded from the profile files and the environment. The
/// option table defaults to the Wawona schema for that profile.
#[derive(Debug)]
pub struct SettingsBuilder {
    profile: Option<PlatformProfile>,
    profile_files: Vec<PathBuf>,
    strict: bool,
    schema: Option<Schema>,
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self {
            profile: None,
            profile_files: Vec::new(),
            strict: true,
            schema: None,
        }
    }

    /// Use this profile as-is; profile files and env are not consulted.
    pub fn profile(mut self, profile: PlatformProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Add a profile file layer. Later files take precedence.
    pub fn profile_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.profile_files.push(path.into());
        self
    }

    /// Enable or disable strict mode for profile files (default: `true`).
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Replace the Wawona option table.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    fn effective_profile(&self) -> Result<PlatformProfile, SettingsError> {
        match &self.profile {
            Some(profile) => Ok(profile.clone()),
            None => PlatformProfile::load(&self.profile_files, self.strict),
        }
    }

    /// Build a session over `store`. Forced values are written back into the
    /// store before this returns.
    pub fn build<S: Store>(self, mut store: S) -> Result<Settings<S>, SettingsError> {
        let profile = self.effective_profile()?;
        let schema = match self.schema {
            Some(schema) => schema,
            None => schema::wawona_schema(&profile)?,
        };
        resolve::sync_forced(&schema, &mut store)?;
        let constants = PlatformConstants::from(&profile.constants);
        Ok(Settings {
            schema,
            profile,
            constants,
            store,
        })
    }

    /// Build a session over the default settings file, layering the default
    /// profile file under any added with [`profile_file()`](Self::profile_file).
    pub fn open_default(mut self) -> Result<Settings<TomlFileStore>, SettingsError> {
        let mut files = file::default_profile_paths(file::APP_NAME);
        files.append(&mut self.profile_files);
        self.profile_files = files;

        let store = TomlFileStore::open(file::default_store_path(file::APP_NAME)?)?;
        self.build(store)
    }
}

/// One settings session: the single owner of a store.
#[derive(Debug)]
pub struct Settings<S: Store> {
    schema: Schema,
    profile: PlatformProfile,
    constants: PlatformConstants,
    store: S,
}

impl<S: Store> Settings<S> {
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn resolve(&self) -> ResolvedConfig {
        resolve::resolve(&self.schema, &self.store)
    }

    pub fn view(&self) -> SettingsView {
        let resolved = self.resolve();
        let active = visibility::active_keys(&self.schema, &resolved);
        SettingsView { resolved, active }
    }

    /// Re-sync forced values (the store may have been changed by another
    /// writer) and take a fresh view.
    pub fn refresh(&mut self) -> Result<SettingsView, SettingsError> {
        resolve::sync_forced(&self.schema, &mut self.store)?;
        Ok(self.view())
    }

    pub fn get(&self, key: &str) -> Result<Value, SettingsError> {
        let opt = self
            .schema
            .lookup(key)
            .ok_or_else(|| SettingsError::KeyNotFound(key.into()))?;
        Ok(resolve::resolve_option(opt, &self.store))
    }

    /// Normalize and persist a raw value. Rejected writes leave the store as
    /// it was.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<WriteOutcome, SettingsError> {
        let opt = self
            .schema
            .lookup(key)
            .ok_or_else(|| SettingsError::KeyNotFound(key.into()))?;
        let outcome = normalize_write(opt, raw);
        match &outcome {
            WriteOutcome::Stored(value) => {
                self.store.set_value(opt.key, value)?;
                tracing::debug!(key, %value, "stored");
            }
            WriteOutcome::Rejected(reason) => {
                tracing::warn!(key, raw, %reason, "write rejected");
            }
        }
        Ok(outcome)
    }

    /// Drop the persisted value so the option resolves to its default again.
    /// Legacy keys are left alone.
    pub fn reset(&mut self, key: &str) -> Result<(), SettingsError> {
        let opt = self
            .schema
            .lookup(key)
            .ok_or_else(|| SettingsError::KeyNotFound(key.into()))?;
        if opt.forced.is_none() {
            self.store.remove(opt.key)?;
        }
        Ok(())
    }

    /// Remove every option and every legacy key, then restore forced values.
    pub fn reset_all(&mut self) -> Result<(), SettingsError> {
        for opt in self.schema.iter() {
            self.store.remove(opt.key)?;
            for alias in &opt.aliases {
                self.store.remove(alias.key)?;
            }
        }
        resolve::sync_forced(&self.schema, &mut self.store)?;
        tracing::info!("settings reset to defaults");
        Ok(())
    }

    /// The record that [`apply()`](Self::apply) would send.
    pub fn apply_record(&self) -> Result<ApplyRecord, SettingsError> {
        let view = self.view();
        apply::build_apply_record(&self.schema, &view.resolved, &view.active, &self.constants)
    }

    /// Build the native record and send it once. The store is not touched,
    /// whatever the sink answers.
    pub fn apply<N: NativeSink + ?Sized>(
        &self,
        sink: &mut N,
    ) -> Result<ApplyRecord, SettingsError> {
        let record = self.apply_record()?;
        tracing::info!(platform = %self.profile.name, "applying settings to native layer");
        apply::send(&record, sink)?;
        Ok(record)
    }

    /// Handle a [`SettingsAction`]. `sink` is used only by `Apply`.
    pub fn handle<N: NativeSink + ?Sized>(
        &mut self,
        action: &SettingsAction,
        sink: &mut N,
    ) -> Result<SettingsResult, SettingsError> {
        match action {
            SettingsAction::List => {
                let view = self.refresh()?;
                Ok(ops::list_values(&view.resolved, &view.active))
            }
            SettingsAction::Get { key } => {
                let view = self.refresh()?;
                ops::get_value(&self.schema, &view.resolved, &view.active, key)
            }
            SettingsAction::Active => {
                let view = self.refresh()?;
                Ok(ops::list_active(&self.schema, &view.active))
            }
            SettingsAction::Set { key, value } => match self.set(key, value)? {
                WriteOutcome::Stored(stored) => Ok(SettingsResult::ValueSet {
                    key: key.clone(),
                    value: stored.to_string(),
                }),
                WriteOutcome::Rejected(reason) => Ok(SettingsResult::Rejected {
                    key: key.clone(),
                    reason: reason.to_string(),
                }),
            },
            SettingsAction::Unset { key } => {
                self.reset(key)?;
                Ok(SettingsResult::ValueUnset { key: key.clone() })
            }
            SettingsAction::Reset => {
                self.reset_all()?;
                Ok(SettingsResult::Reset)
            }
            SettingsAction::Apply { dry_run: true } => {
                self.refresh()?;
                ops::dry_run(&self.apply_record()?)
            }
            SettingsAction::Apply { dry_run: false } => {
                self.refresh()?;
                self.apply(sink).map(SettingsResult::Applied)
            }
        }
    }

    /// Handle a [`SettingsAction`] and print the result to stdout.
    pub fn handle_and_print<N: NativeSink + ?Sized>(
        &mut self,
        action: &SettingsAction,
        sink: &mut N,
    ) -> Result<(), SettingsError> {
        let result = self.handle(action, sink)?;
        println!("{result}");
        Ok(())
    }
}
