//! In-memory implementations of the relay ports

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use async_trait::async_trait;
use LinguaRelay::middleware::{BroadcastRateLimiter, RateLimitConfig};
use LinguaRelay::models::{BroadcastPayload, BroadcastReport, GroupRecord, Lang};
use LinguaRelay::services::{
    AuditStore, BroadcastDispatcher, ChainSettings, DeliveryOutcome, DeliveryTransport, DispatchSettings,
    GroupRegistry, OwnerNotifier, PermissionResolver, PermissionStore, RelayService, RelaySettings,
    TranslationProvider, TranslatorChain,
};
use LinguaRelay::utils::errors::{ProviderResult, RelayError, Result};

use super::test_data::{BROADCASTER_ID, CONTROLLER_ID, OWNER_ID};

/// Delivery transport answering from a per-chat script; chats without a
/// script (or with an exhausted one) are delivered
#[derive(Default)]
pub struct FakeTransport {
    scripts: Mutex<HashMap<i64, VecDeque<DeliveryOutcome>>>,
    calls: Mutex<Vec<i64>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay, ..Self::default() }
    }

    pub fn script(&self, chat_id: i64, outcomes: impl IntoIterator<Item = DeliveryOutcome>) {
        self.scripts.lock().unwrap().insert(chat_id, outcomes.into_iter().collect());
    }

    pub fn calls(&self) -> Vec<i64> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, chat_id: i64) -> usize {
        self.calls.lock().unwrap().iter().filter(|&&c| c == chat_id).count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn answer(&self, chat_id: i64) -> DeliveryOutcome {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        self.calls.lock().unwrap().push(chat_id);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let outcome = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&chat_id)
            .and_then(|script| script.pop_front())
            .unwrap_or(DeliveryOutcome::Delivered);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

#[async_trait]
impl DeliveryTransport for FakeTransport {
    async fn deliver(&self, chat_id: i64, _payload: &BroadcastPayload) -> DeliveryOutcome {
        self.answer(chat_id).await
    }

    async fn probe(&self, chat_id: i64) -> DeliveryOutcome {
        self.answer(chat_id).await
    }
}

/// Registry kept in a vector, recording every mutation
#[derive(Default)]
pub struct FakeRegistry {
    groups: Mutex<Vec<GroupRecord>>,
    migrations: Mutex<Vec<(i64, i64)>>,
    deactivations: Mutex<Vec<(i64, String)>>,
    fail_migrations: AtomicBool,
}

impl FakeRegistry {
    pub fn with_groups(groups: Vec<GroupRecord>) -> Self {
        Self { groups: Mutex::new(groups), ..Self::default() }
    }

    pub fn group(&self, chat_id: i64) -> Option<GroupRecord> {
        self.groups.lock().unwrap().iter().find(|g| g.chat_id == chat_id).cloned()
    }

    pub fn migrations(&self) -> Vec<(i64, i64)> {
        self.migrations.lock().unwrap().clone()
    }

    pub fn deactivations(&self) -> Vec<(i64, String)> {
        self.deactivations.lock().unwrap().clone()
    }

    /// Make every later `migrate` call fail without touching the groups
    pub fn fail_migrations(&self) {
        self.fail_migrations.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl GroupRegistry for FakeRegistry {
    async fn list_active(&self) -> Result<Vec<GroupRecord>> {
        let mut active: Vec<GroupRecord> = self.groups.lock().unwrap().iter().filter(|g| g.active).cloned().collect();
        active.sort_by_key(|g| (g.activated_at, g.chat_id));
        Ok(active)
    }

    async fn migrate(&self, old_chat_id: i64, new_chat_id: i64) -> Result<()> {
        if self.fail_migrations.load(Ordering::SeqCst) {
            return Err(RelayError::Database(sqlx::Error::PoolTimedOut));
        }
        self.migrations.lock().unwrap().push((old_chat_id, new_chat_id));
        let mut groups = self.groups.lock().unwrap();
        if groups.iter().any(|g| g.chat_id == new_chat_id) {
            groups.retain(|g| g.chat_id != old_chat_id);
        } else if let Some(group) = groups.iter_mut().find(|g| g.chat_id == old_chat_id) {
            group.chat_id = new_chat_id;
        }
        Ok(())
    }

    async fn deactivate(&self, chat_id: i64, reason: &str) -> Result<()> {
        self.deactivations.lock().unwrap().push((chat_id, reason.to_string()));
        if let Some(group) = self.groups.lock().unwrap().iter_mut().find(|g| g.chat_id == chat_id) {
            group.active = false;
            group.deactivated_reason = Some(reason.to_string());
        }
        Ok(())
    }
}

/// Audit store keeping reports in memory
#[derive(Default)]
pub struct RecordingAudit {
    reports: Mutex<Vec<BroadcastReport>>,
}

impl RecordingAudit {
    pub fn reports(&self) -> Vec<BroadcastReport> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditStore for RecordingAudit {
    async fn record_broadcast(&self, report: &BroadcastReport) -> Result<i64> {
        let mut reports = self.reports.lock().unwrap();
        reports.push(report.clone());
        Ok(reports.len() as i64)
    }
}

/// Owner notifier collecting notices
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl OwnerNotifier for RecordingNotifier {
    async fn notify_owner(&self, text: &str) {
        self.notices.lock().unwrap().push(text.to_string());
    }
}

/// Translation provider replaying scripted answers, then repeating a fallback
pub struct ScriptedProvider {
    name: &'static str,
    script: Mutex<VecDeque<ProviderResult<String>>>,
    fallback: ProviderResult<String>,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, Option<Lang>, Lang)>>,
}

impl ScriptedProvider {
    pub fn new(name: &'static str, fallback: ProviderResult<String>) -> Self {
        Self {
            name,
            script: Mutex::new(VecDeque::new()),
            fallback,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(name: &'static str, output: &str) -> Self {
        Self::new(name, Ok(output.to_string()))
    }

    pub fn then(self, answers: impl IntoIterator<Item = ProviderResult<String>>) -> Self {
        self.script.lock().unwrap().extend(answers);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(String, Option<Lang>, Lang)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranslationProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn translate(&self, text: &str, source: Option<Lang>, target: Lang) -> ProviderResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push((text.to_string(), source, target));
        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Chain settings with millisecond backoff
pub fn fast_chain_settings() -> ChainSettings {
    ChainSettings {
        max_attempts: 3,
        backoff_base: Duration::from_millis(1),
        max_output_chars: 4000,
    }
}

/// Dispatch settings with millisecond backoff
pub fn fast_dispatch_settings(concurrency: usize) -> DispatchSettings {
    DispatchSettings {
        concurrency,
        max_retries: 2,
        retry_base_delay: Duration::from_millis(1),
        failure_sample_size: 10,
    }
}

/// Owner, one Controller and one Broadcaster
pub fn test_permissions() -> PermissionResolver {
    let store = Arc::new(PermissionStore::new([CONTROLLER_ID], [BROADCASTER_ID]));
    PermissionResolver::new(Some(OWNER_ID), store)
}

/// Everything a relay test needs to inspect afterwards
pub struct RelayHarness {
    pub relay: RelayService,
    pub transport: Arc<FakeTransport>,
    pub registry: Arc<FakeRegistry>,
    pub audit: Arc<RecordingAudit>,
    pub notifier: Arc<RecordingNotifier>,
}

impl RelayHarness {
    pub fn new(groups: Vec<GroupRecord>, providers: Vec<Arc<dyn TranslationProvider>>) -> Self {
        Self::with_transport(groups, providers, FakeTransport::new(), fast_dispatch_settings(3))
    }

    pub fn with_transport(
        groups: Vec<GroupRecord>,
        providers: Vec<Arc<dyn TranslationProvider>>,
        transport: FakeTransport,
        dispatch: DispatchSettings,
    ) -> Self {
        let transport = Arc::new(transport);
        let registry = Arc::new(FakeRegistry::with_groups(groups));
        let audit = Arc::new(RecordingAudit::default());
        let notifier = Arc::new(RecordingNotifier::default());

        let chain = Arc::new(TranslatorChain::new(providers, notifier.clone(), fast_chain_settings()));
        let dispatcher = BroadcastDispatcher::new(transport.clone(), registry.clone(), dispatch);
        let relay = RelayService::new(
            chain,
            dispatcher,
            test_permissions(),
            Arc::new(BroadcastRateLimiter::new(RateLimitConfig::default())),
            registry.clone(),
            audit.clone(),
            RelaySettings { max_groups: 100, skip_prefix: "/notranslate".to_string() },
        );

        Self { relay, transport, registry, audit, notifier }
    }
}
