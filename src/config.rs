//! Public, backend-agnostic client configuration.
//!
//! This type contains no backend-specific concepts (project ids, API keys).
//! Backend adapters interpret their own connection settings; the screens only
//! need window sizes, timeouts and the data-path layout.

use std::time::Duration;

use chrono::{FixedOffset, Local, Offset};

use crate::{Channel, DataPath, MissingValuePolicy};

/// Layout of the backend data tree.
///
/// One schema, optionally nested under `root`:
///
/// ```text
/// {root}/configuration/actuator
/// {root}/configuration/setpoints
/// {root}/history/{channel}
/// {root}/users/{uid}
/// ```
///
/// # Example
///
/// ```
/// use bioreactor_client::{Channel, DataPaths};
///
/// let paths = DataPaths::under("plant-a");
/// assert_eq!(paths.history(Channel::WaterLevel).as_str(), "plant-a/history/waterLevel");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    root: DataPath,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            root: DataPath::root(),
        }
    }
}

impl DataPaths {
    // ---
    /// Nest every path under `root`.
    pub fn under(root: impl Into<DataPath>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &DataPath {
        &self.root
    }

    pub fn actuator(&self) -> DataPath {
        self.root.child("configuration").child("actuator")
    }

    pub fn setpoints(&self) -> DataPath {
        self.root.child("configuration").child("setpoints")
    }

    pub fn history(&self, channel: Channel) -> DataPath {
        self.root.child("history").child(channel.key())
    }

    pub fn user(&self, uid: &str) -> DataPath {
        self.root.child("users").child(uid)
    }
}

/// Client configuration.
///
/// # Example
///
/// ```
/// use bioreactor_client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_window_capacity(20)
///     .with_request_timeout(Duration::from_secs(5));
/// assert_eq!(config.chart_window, 6);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // ---
    /// Samples retained per channel on the monitoring screen.
    ///
    /// Default: 10
    pub window_capacity: usize,

    /// Samples retained per channel on the charts screen.
    ///
    /// Default: 6
    pub chart_window: usize,

    /// Label thinning stride on the monitoring screen.
    ///
    /// Default: 3
    pub monitoring_label_stride: usize,

    /// Label thinning stride on the charts screen.
    ///
    /// Default: 2
    pub chart_label_stride: usize,

    /// Offset applied before formatting `DD/MM` labels.
    ///
    /// Default: the host's offset when the config is built
    pub label_offset: FixedOffset,

    /// Upper bound on every backend call made by a screen.
    ///
    /// Expiry surfaces as a read or write failure; calls are not retried.
    ///
    /// Default: 30 seconds
    pub request_timeout: Duration,

    /// Treatment of history records without a value.
    pub missing_value_policy: MissingValuePolicy,

    /// Minimum length for a new password.
    ///
    /// Default: 6
    pub min_password_len: usize,

    pub paths: DataPaths,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            window_capacity: 10,
            chart_window: 6,
            monitoring_label_stride: 3,
            chart_label_stride: 2,
            label_offset: local_offset(),
            request_timeout: Duration::from_secs(30),
            missing_value_policy: MissingValuePolicy::default(),
            min_password_len: 6,
            paths: DataPaths::default(),
        }
    }
}

/// The host's current UTC offset, frozen at call time.
fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}

impl ClientConfig {
    // ---
    pub fn with_window_capacity(mut self, capacity: usize) -> Self {
        self.window_capacity = capacity.max(1);
        self
    }

    pub fn with_chart_window(mut self, capacity: usize) -> Self {
        self.chart_window = capacity.max(1);
        self
    }

    pub fn with_label_strides(mut self, monitoring: usize, charts: usize) -> Self {
        self.monitoring_label_stride = monitoring.max(1);
        self.chart_label_stride = charts.max(1);
        self
    }

    pub fn with_label_offset(mut self, offset: FixedOffset) -> Self {
        self.label_offset = offset;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_missing_value_policy(mut self, policy: MissingValuePolicy) -> Self {
        self.missing_value_policy = policy;
        self
    }

    pub fn with_min_password_len(mut self, len: usize) -> Self {
        self.min_password_len = len;
        self
    }

    pub fn with_paths(mut self, paths: DataPaths) -> Self {
        self.paths = paths;
        self
    }
}
