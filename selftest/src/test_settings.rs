use serde::Deserialize;
use std::time::Duration;

/// Test settings provides a way to send arguments into the Rust tests using environment variables.
pub struct TestSettings {}

impl TestSettings {
    /// The path or name of the `kind` binary.
    pub fn kind_path() -> &'static str {
        TEST_SETTINGS.kind_path.as_str()
    }

    /// How long a test waits for the controller to record an event.
    pub fn event_timeout() -> Duration {
        Duration::from_secs(TEST_SETTINGS.event_timeout_secs)
    }
}

#[derive(Debug, Deserialize)]
struct Inner {
    /// The path to the [kind] binary. Defaults to `kind` (i.e. by default the kind binary is
    /// expected to be found via `$PATH`).
    ///
    /// # Example
    ///
    /// ```text
    /// CAPI_SELFTEST_KIND_PATH=/wherever/kind
    /// ```
    ///
    /// [kind]: https://kind.sigs.k8s.io/
    #[serde(default = "kind")]
    kind_path: String,

    /// Seconds to wait for an event about a new `Cluster`. Defaults to 120.
    ///
    /// ```text
    /// CAPI_SELFTEST_EVENT_TIMEOUT_SECS=300
    /// ```
    #[serde(default = "event_timeout_secs")]
    event_timeout_secs: u64,
}

lazy_static::lazy_static! {
    static ref TEST_SETTINGS: Inner =
        envy::prefixed("CAPI_SELFTEST_")
            .from_env::<Inner>()
            .expect("Error parsing TestSettings environment variables");
}

/// We need this to provide a default for serde.
fn kind() -> String {
    String::from("kind")
}

fn event_timeout_secs() -> u64 {
    120
}
