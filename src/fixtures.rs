#[cfg(test)]
pub mod test {
    use crate::apply::{ApplyRecord, NativeSink};
    use crate::platform::PlatformProfile;
    use crate::schema::{Schema, wawona_schema};
    use confique::Config;

    pub const SOCKET_PATH: &str = "/data/user/0/com.aspauldingcode.wawona/cache/waypipe";

    /// Built-in defaults only, no env, no files.
    pub fn android_profile() -> PlatformProfile {
        PlatformProfile::builder().load().unwrap()
    }

    pub fn wawona() -> Schema {
        wawona_schema(&android_profile()).unwrap()
    }

    #[test]
    fn android_profile_defaults() {
        let profile = android_profile();
        assert_eq!(profile.name, "android");
        assert_eq!(profile.socket_path(), SOCKET_PATH);
        assert!(!profile.xwayland_available);
        assert!(profile.constants.transport_rs_support);
    }

    // -- Native sink that records every call -----------------------------------

    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub records: Vec<ApplyRecord>,
        pub fail_with: Option<String>,
    }

    impl RecordingSink {
        pub fn failing(message: &str) -> Self {
            Self {
                records: Vec::new(),
                fail_with: Some(message.into()),
            }
        }
    }

    impl NativeSink for RecordingSink {
        fn apply_settings(
            &mut self,
            record: &ApplyRecord,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.records.push(*record);
            match &self.fail_with {
                Some(message) => Err(message.clone().into()),
                None => Ok(()),
            }
        }
    }
}
