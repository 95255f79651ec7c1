// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::Value;
use tokio::time::{sleep, timeout, Duration};

use bioreactor_client::{
    // ---
    create_memory_auth_provider,
    create_memory_data_source,
    AppBuilder,
    AppContext,
    AuthProvider,
    Channel,
    ClientConfig,
    MemoryAuthProvider,
    MemoryDataSource,
    Notice,
    RecordingNotifier,
    RemoteDataSource,
    Sample,
};

pub const EMAIL: &str = "operador@example.com";
pub const PASSWORD: &str = "bomba123";

/// Memory backends with one seeded account, wired into a context.
pub struct Rig {
    pub data: Arc<MemoryDataSource>,
    pub auth: Arc<MemoryAuthProvider>,
    pub notifier: Arc<RecordingNotifier>,
    pub ctx: AppContext,
    pub uid: String,
}

impl Rig {
    // ---
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        // ---
        let data = create_memory_data_source();
        let auth = create_memory_auth_provider();
        let notifier = RecordingNotifier::new();
        let uid = auth.seed_account(EMAIL, PASSWORD);

        let ctx = AppBuilder::new(data.clone(), auth.clone())
            .notifier(notifier.clone())
            .config(config)
            .context();

        Self {
            data,
            auth,
            notifier,
            ctx,
            uid,
        }
    }

    /// A rig whose seeded account is already signed in.
    pub async fn signed_in() -> Self {
        Self::signed_in_with(ClientConfig::default()).await
    }

    pub async fn signed_in_with(config: ClientConfig) -> Self {
        // ---
        let rig = Self::with_config(config);
        rig.auth.sign_in(EMAIL, PASSWORD).await.expect("seeded sign-in failed");
        rig
    }

    pub fn messages(&self) -> Vec<String> {
        self.notifier.notices().into_iter().map(|notice| notice.message).collect()
    }

    pub fn last_notice(&self) -> Notice {
        self.notifier.last().expect("no notice was shown")
    }

    /// Append one reading to the channel's history log.
    pub async fn append_reading(&self, channel: Channel, value: f64) {
        // ---
        let sample = Sample::now(value).expect("reading must be finite");
        self.data
            .append(&self.ctx.config.paths.history(channel), sample.to_value())
            .await
            .expect("append failed");
    }

    pub async fn read(&self, path: &bioreactor_client::DataPath) -> Option<Value> {
        self.data.read(path).await.expect("read failed")
    }

    /// Number of entries in a channel's history log.
    pub async fn history_len(&self, channel: Channel) -> usize {
        // ---
        self.read(&self.ctx.config.paths.history(channel))
            .await
            .and_then(|log| log.as_object().map(|entries| entries.len()))
            .unwrap_or(0)
    }
}

/// Poll `condition` until it holds, failing the test after one second.
pub async fn wait_until<F>(what: &str, condition: F)
where
    F: Fn() -> bool,
{
    // ---
    let polled = timeout(Duration::from_secs(1), async {
        while !condition() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(polled.is_ok(), "timed out waiting until {what}");
}

/// Give spawned feeds a moment to drain anything already queued.
pub async fn settle() {
    sleep(Duration::from_millis(30)).await;
}
