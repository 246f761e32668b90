use log::{debug, error, info, warn};
use std::future::Future;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tokio::time::{interval, MissedTickBehavior};

use crate::codec::encode::salt_refill_command;
use crate::codec::register::{RegisterCode, TRACKED_REGISTERS};
use crate::config::Config;
use crate::devices::{DecodedSnapshot, Freshness, SoftwellDevice};
use crate::output::{formatter_for, ConsoleSender, DataFormatter, DataSender, FileSender};
use crate::output::raw_sender::RawRegisterDump;
use crate::rest::client::{JudoRestClient, RestTransport};
use crate::utils::error::{ErrorKind, JudoError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Updated,
    /// Another cycle or a write was in flight; this trigger was dropped.
    Skipped,
}

/// What consumers see: either nothing yet, or the latest complete snapshot
/// together with whether the most recent cycle confirmed it.
#[derive(Debug, Clone)]
pub enum SnapshotStatus {
    NoData,
    Available {
        snapshot: Arc<DecodedSnapshot>,
        freshness: Freshness,
    },
}

impl SnapshotStatus {
    pub fn snapshot(&self) -> Option<&DecodedSnapshot> {
        match self {
            SnapshotStatus::NoData => None,
            SnapshotStatus::Available { snapshot, .. } => Some(snapshot),
        }
    }
}

#[derive(Debug, Default)]
struct PollState {
    snapshot: Option<Arc<DecodedSnapshot>>,
    last_update_success: bool,
    was_unavailable: bool,
    consecutive_failures: u32,
}

pub struct DataService {
    config: Config,
    device: SoftwellDevice,
    state: RwLock<PollState>,
    poll_lock: Mutex<()>,
    formatter: Box<dyn DataFormatter>,
    senders: Vec<Box<dyn DataSender>>,
}

impl DataService {
    pub fn new(config: Config) -> Result<Self, JudoError> {
        let client = JudoRestClient::new(
            &config.host,
            config.port,
            &config.username,
            &config.password,
            config.timeout(),
        )?;
        Ok(Self::with_transport(config, Arc::new(client)))
    }

    pub fn with_transport(config: Config, transport: Arc<dyn RestTransport>) -> Self {
        info!("🚀 Initializing Data Service for '{}'", config.device_name);
        info!("⏱️  Polling: {} second intervals", config.update_interval_seconds);

        let device = SoftwellDevice::new(config.device_name.clone(), transport, config.timeout());
        let formatter = formatter_for(&config.output.default_format);

        let mut senders: Vec<Box<dyn DataSender>> = vec![Box::new(ConsoleSender)];
        if let Some(file) = config.output.file_output.as_ref().filter(|f| f.enabled) {
            senders.push(Box::new(FileSender::new(&file.path, file.append)));
        }

        Self {
            config,
            device,
            state: RwLock::new(PollState::default()),
            poll_lock: Mutex::new(()),
            formatter,
            senders,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn device(&self) -> &SoftwellDevice {
        &self.device
    }

    pub async fn probe(&self) -> Result<&'static str, JudoError> {
        self.device.probe().await
    }

    /// One poll cycle over every tracked register, unless one is already running.
    pub async fn refresh(&self) -> Result<RefreshOutcome, JudoError> {
        let Ok(_guard) = self.poll_lock.try_lock() else {
            debug!("⏭️  Poll cycle already in flight, skipping this trigger");
            return Ok(RefreshOutcome::Skipped);
        };
        self.refresh_locked().await?;
        Ok(RefreshOutcome::Updated)
    }

    // caller holds `poll_lock`
    async fn refresh_locked(&self) -> Result<(), JudoError> {
        debug!("🔄 Requesting {} registers from {}", TRACKED_REGISTERS.len(), self.device.name());
        match self.device.fetch_all(&TRACKED_REGISTERS).await {
            Ok(snapshot) => {
                self.record_success(snapshot);
                Ok(())
            }
            Err(e) => {
                self.record_failure(&e);
                Err(e)
            }
        }
    }

    fn record_success(&self, snapshot: DecodedSnapshot) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if state.was_unavailable {
            info!(
                "✅ {} is back online after {} failed cycle(s)",
                self.device.name(),
                state.consecutive_failures
            );
            state.was_unavailable = false;
        }
        state.snapshot = Some(Arc::new(snapshot));
        state.last_update_success = true;
        state.consecutive_failures = 0;
    }

    fn record_failure(&self, err: &JudoError) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.last_update_success = false;
        state.consecutive_failures += 1;

        let what = match err.kind() {
            ErrorKind::Transport => "transport error",
            ErrorKind::Protocol => "protocol error",
            _ => "error",
        };
        if !state.was_unavailable {
            warn!("⚠️  {} unavailable ({}): {}", self.device.name(), what, err);
            state.was_unavailable = true;
        } else {
            debug!(
                "{} still unavailable, {} consecutive failures ({}): {}",
                self.device.name(),
                state.consecutive_failures,
                what,
                err
            );
        }
    }

    pub fn status(&self) -> SnapshotStatus {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        match &state.snapshot {
            None => SnapshotStatus::NoData,
            Some(snapshot) => SnapshotStatus::Available {
                snapshot: Arc::clone(snapshot),
                freshness: if state.last_update_success {
                    Freshness::Fresh
                } else {
                    Freshness::Stale
                },
            },
        }
    }

    pub fn is_available(&self) -> bool {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.last_update_success
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.state.read().unwrap_or_else(|e| e.into_inner()).consecutive_failures
    }

    /// Writes the salt refill amount, then re-reads every register straight
    /// away instead of waiting for the next interval.
    pub async fn write_salt_refill(&self, mass_kg: f64) -> Result<(), JudoError> {
        salt_refill_command(mass_kg)?;

        let _guard = self.poll_lock.lock().await;
        self.device.write_salt_refill(mass_kg).await?;
        if self.refresh_locked().await.is_err() {
            info!("Re-read after salt refill failed, the next scheduled poll will retry");
        }
        Ok(())
    }

    /// Fetches raw payloads for debugging without touching the held snapshot.
    pub async fn read_raw_registers(
        &self,
        registers: &[RegisterCode],
    ) -> Result<Vec<RawRegisterDump>, JudoError> {
        let _guard = self.poll_lock.lock().await;
        let mut dumps = Vec::with_capacity(registers.len());
        for &register in registers {
            let hex = self.device.fetch(register).await?;
            dumps.push(RawRegisterDump::new(register, hex, chrono::Utc::now()));
        }
        Ok(dumps)
    }

    async fn broadcast_data(&self, data: &str) -> Result<(), JudoError> {
        let mut error_count = 0;
        for sender in &self.senders {
            if let Err(e) = sender.send(data).await {
                error!(
                    "❌ Failed to send data via {} to {}: {}",
                    sender.sender_type(),
                    sender.destination(),
                    e
                );
                error_count += 1;
            }
        }
        if error_count > 0 {
            debug!("📊 Broadcast finished with {} failed sender(s)", error_count);
        }
        Ok(())
    }

    pub fn render_snapshot(&self) -> String {
        match self.status() {
            SnapshotStatus::NoData => self.formatter.format_no_data(),
            SnapshotStatus::Available { snapshot, freshness } => format!(
                "{}{}",
                self.formatter.format_header(),
                self.formatter.format_snapshot(&*snapshot, freshness)
            ),
        }
    }

    pub fn render_parameter(&self, key: &str) -> String {
        match self.status() {
            SnapshotStatus::NoData => self.formatter.format_no_data(),
            SnapshotStatus::Available { snapshot, freshness } => {
                let value = snapshot.measurement(key);
                self.formatter.format_parameter(key, value.as_ref(), freshness)
            }
        }
    }

    pub async fn print_snapshot(&self) -> Result<(), JudoError> {
        let output = self.render_snapshot();
        self.broadcast_data(&output).await
    }

    pub async fn print_parameter(&self, key: &str) -> Result<(), JudoError> {
        let output = self.render_parameter(key);
        self.broadcast_data(&output).await
    }

    /// Polls on the configured interval until Ctrl-C.
    pub async fn run(&self) -> Result<(), JudoError> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("❌ Failed to listen for Ctrl-C: {}", e);
            }
        })
        .await
    }

    /// Polls on the configured interval until `shutdown` completes. A cycle in
    /// flight at that point is abandoned and the held snapshot stays as it was.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<(), JudoError>
    where
        F: Future<Output = ()>,
    {
        info!(
            "🚀 Starting continuous monitoring of {} every {}s",
            self.device.base_url(),
            self.config.update_interval_seconds
        );

        let mut ticker = interval(self.config.update_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = &mut shutdown => break,
            }

            tokio::select! {
                outcome = self.refresh() => match outcome {
                    Ok(RefreshOutcome::Updated) => {
                        if let Err(e) = self.print_snapshot().await {
                            error!("❌ Failed to broadcast snapshot: {}", e);
                        }
                    }
                    Ok(RefreshOutcome::Skipped) => {}
                    // already reported by record_failure
                    Err(_) => {}
                },
                _ = &mut shutdown => {
                    info!("Abandoning poll cycle in flight");
                    break;
                }
            }
        }

        info!("👋 Shutting down monitor");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::mock::{MockReply, MockTransport};
    use std::time::Duration;

    fn service(mock: Arc<MockTransport>) -> DataService {
        let mut config = Config::default();
        config.timeout_ms = 200;
        let mut service = DataService::with_transport(config, mock);
        service.senders.clear();
        service
    }

    #[tokio::test]
    async fn test_refresh_stores_complete_snapshot() {
        let mock = Arc::new(MockTransport::healthy());
        let service = service(mock);
        assert!(matches!(service.status(), SnapshotStatus::NoData));

        assert_eq!(service.refresh().await.unwrap(), RefreshOutcome::Updated);
        match service.status() {
            SnapshotStatus::Available { snapshot, freshness } => {
                assert_eq!(freshness, Freshness::Fresh);
                assert_eq!(snapshot.len(), TRACKED_REGISTERS.len());
                assert_eq!(snapshot.operating_hours(), Some(130.5));
            }
            SnapshotStatus::NoData => panic!("expected a snapshot"),
        }
        assert!(service.is_available());
    }

    #[tokio::test]
    async fn test_failed_cycle_keeps_previous_snapshot() {
        let mock = Arc::new(MockTransport::healthy());
        let service = service(mock.clone());
        service.refresh().await.unwrap();
        let before = service.status().snapshot().cloned().unwrap();

        // first three registers change, the fourth fails
        mock.set("FF00", MockReply::data("48"));
        mock.set("0600", MockReply::data("0001"));
        mock.set("0100", MockReply::data("000399"));
        mock.set("2500", MockReply::Refused);
        mock.clear_calls();

        assert!(service.refresh().await.is_err());
        assert_eq!(mock.calls(), vec!["FF00", "0600", "0100", "2500"]);

        match service.status() {
            SnapshotStatus::Available { snapshot, freshness } => {
                assert_eq!(freshness, Freshness::Stale);
                assert_eq!(*snapshot, before);
                assert_eq!(snapshot.device_type(), Some("SOFTwell KP"));
            }
            SnapshotStatus::NoData => panic!("previous snapshot was dropped"),
        }
        assert!(!service.is_available());
    }

    #[tokio::test]
    async fn test_first_cycle_failure_leaves_no_data() {
        let mock = Arc::new(MockTransport::healthy());
        mock.set("5100", MockReply::status(503));
        let service = service(mock);
        let err = service.refresh().await.unwrap_err();
        assert!(matches!(err, JudoError::HttpStatus(503)));
        assert!(matches!(service.status(), SnapshotStatus::NoData));
        assert!(service.render_snapshot().contains("No data available"));
    }

    #[tokio::test]
    async fn test_unavailable_flag_flips_on_change_only() {
        let mock = Arc::new(MockTransport::healthy());
        let service = service(mock.clone());
        service.refresh().await.unwrap();

        mock.set("FF00", MockReply::Refused);
        assert!(service.refresh().await.is_err());
        assert!(service.state.read().unwrap().was_unavailable);
        assert!(service.refresh().await.is_err());
        assert!(service.state.read().unwrap().was_unavailable);
        assert_eq!(service.consecutive_failures(), 2);

        mock.set("FF00", MockReply::data("47"));
        service.refresh().await.unwrap();
        assert!(!service.state.read().unwrap().was_unavailable);
        assert_eq!(service.consecutive_failures(), 0);
    }

    #[tokio::test]
    async fn test_overlapping_trigger_is_skipped() {
        let mock = Arc::new(MockTransport::healthy());
        let service = service(mock.clone());

        let guard = service.poll_lock.lock().await;
        assert_eq!(service.refresh().await.unwrap(), RefreshOutcome::Skipped);
        assert!(mock.calls().is_empty());
        drop(guard);

        assert_eq!(service.refresh().await.unwrap(), RefreshOutcome::Updated);
    }

    #[tokio::test]
    async fn test_salt_refill_write_then_refetch() {
        let mock = Arc::new(MockTransport::healthy());
        mock.set("56000BB8", MockReply::body("{}"));
        let service = service(mock.clone());

        service.write_salt_refill(3.0).await.unwrap();
        assert_eq!(
            mock.calls(),
            vec!["56000BB8", "FF00", "0600", "0100", "2500", "2900", "5600", "5100"]
        );
        assert!(matches!(service.status(), SnapshotStatus::Available { .. }));
    }

    #[tokio::test]
    async fn test_salt_refill_validation_skips_network() {
        let mock = Arc::new(MockTransport::healthy());
        let service = service(mock.clone());
        assert!(matches!(
            service.write_salt_refill(-1.0).await,
            Err(JudoError::ValidationError(_))
        ));
        assert!(matches!(
            service.write_salt_refill(25.1).await,
            Err(JudoError::ValidationError(_))
        ));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_raw_reads_leave_snapshot_alone() {
        let mock = Arc::new(MockTransport::healthy());
        let service = service(mock);
        let dumps = service
            .read_raw_registers(&[RegisterCode::Salt, RegisterCode::WaterHardness])
            .await
            .unwrap();
        assert_eq!(dumps.len(), 2);
        assert_eq!(dumps[0].hex_string, "0BB81400");
        assert!(matches!(service.status(), SnapshotStatus::NoData));
    }

    #[tokio::test]
    async fn test_render_parameter_marks_stale() {
        let mock = Arc::new(MockTransport::healthy());
        let service = service(mock.clone());
        service.refresh().await.unwrap();
        assert_eq!(service.render_parameter("water_hardness"), "📈 water_hardness: 14 °dH\n");

        mock.set("0600", MockReply::Hang(std::time::Duration::from_secs(5)));
        assert!(matches!(service.refresh().await, Err(JudoError::Timeout)));
        assert_eq!(
            service.render_parameter("water_hardness"),
            "📈 water_hardness: 14 °dH (stale)\n"
        );
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_cycle_in_flight() {
        let mock = Arc::new(MockTransport::healthy());
        mock.set("0100", MockReply::Hang(Duration::from_secs(30)));
        let mut config = Config::default();
        config.timeout_ms = 20_000;
        let mut service = DataService::with_transport(config, mock.clone());
        service.senders.clear();

        let stopped = tokio::time::timeout(
            Duration::from_secs(2),
            service.run_until(tokio::time::sleep(Duration::from_millis(100))),
        )
        .await;
        assert!(matches!(stopped, Ok(Ok(()))));
        assert_eq!(mock.calls(), vec!["FF00", "0600", "0100"]);
        assert!(matches!(service.status(), SnapshotStatus::NoData));

        // the abandoned cycle released the poll lock
        mock.set("0100", MockReply::data("000215"));
        assert_eq!(service.refresh().await.unwrap(), RefreshOutcome::Updated);
    }

    #[tokio::test]
    async fn test_monitor_polls_immediately() {
        let mock = Arc::new(MockTransport::healthy());
        let service = service(mock.clone());
        service
            .run_until(tokio::time::sleep(Duration::from_millis(100)))
            .await
            .unwrap();
        assert_eq!(mock.calls().len(), TRACKED_REGISTERS.len());
        assert!(service.is_available());
    }
}
