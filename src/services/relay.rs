//! Relay service: the two entry points the Telegram handlers call
//!
//! Group path: preprocessing, then the translator chain.
//! Private path: permission, rate limit, dispatch and report.

use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::config::Settings;
use crate::middleware::rate_limit::{BroadcastRateLimiter, RateLimitStatus};
use crate::models::{ActorRole, BroadcastPayload, BroadcastReport, GroupRecord, Lang};
use crate::services::broadcast::{select_targets, BroadcastDispatcher, GroupCheckSummary};
use crate::services::permission::PermissionResolver;
use crate::services::ports::{AuditStore, GroupRegistry};
use crate::services::translation::direction::{contains_cjk, contains_latin};
use crate::services::translation::{TranslatedText, Translation, TranslatorChain};
use crate::utils::errors::{RelayError, Result};
use crate::utils::helpers::{is_bare_mention, split_mention_prefix};
use crate::utils::logging::log_broadcast_outcome;

/// Text of a group message after preprocessing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedText<'a> {
    /// Leading `@mention` echoed in front of the reply
    pub mention: &'a str,
    pub body: &'a str,
}

/// Strip what must not be translated; `None` when the message is ignored
pub fn prepare_group_text<'a>(text: &'a str, skip_prefix: &str) -> Option<PreparedText<'a>> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('/') {
        return None;
    }
    if !skip_prefix.is_empty() && trimmed.starts_with(skip_prefix) {
        return None;
    }
    if is_bare_mention(trimmed) {
        return None;
    }

    let (mention, body) = split_mention_prefix(trimmed);
    let body = body.trim_start_matches([':', '：']).trim();
    if body.is_empty() {
        return None;
    }
    Some(PreparedText { mention, body })
}

/// A translation ready to be posted as a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTranslation {
    pub reply_text: String,
    pub translation: TranslatedText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupReply {
    Translated(GroupTranslation),
    Skip,
}

fn has_target_script(text: &str, target: Lang) -> bool {
    match target {
        Lang::Zh => contains_cjk(text),
        Lang::En => contains_latin(text),
    }
}

/// Settings the relay applies around its components
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub max_groups: usize,
    pub skip_prefix: String,
}

impl From<&Settings> for RelaySettings {
    fn from(settings: &Settings) -> Self {
        Self {
            max_groups: settings.broadcast.max_groups,
            skip_prefix: settings.translation.skip_prefix.clone(),
        }
    }
}

pub struct RelayService {
    chain: Arc<TranslatorChain>,
    dispatcher: BroadcastDispatcher,
    permissions: PermissionResolver,
    rate_limiter: Arc<BroadcastRateLimiter>,
    registry: Arc<dyn GroupRegistry>,
    audit: Arc<dyn AuditStore>,
    settings: RelaySettings,
}

impl RelayService {
    pub fn new(
        chain: Arc<TranslatorChain>,
        dispatcher: BroadcastDispatcher,
        permissions: PermissionResolver,
        rate_limiter: Arc<BroadcastRateLimiter>,
        registry: Arc<dyn GroupRegistry>,
        audit: Arc<dyn AuditStore>,
        settings: RelaySettings,
    ) -> Self {
        Self { chain, dispatcher, permissions, rate_limiter, registry, audit, settings }
    }

    pub fn permissions(&self) -> &PermissionResolver {
        &self.permissions
    }

    pub fn rate_limit_status(&self, actor_id: i64) -> RateLimitStatus {
        self.rate_limiter.status(actor_id)
    }

    /// Translate a message posted in an activated group
    pub async fn handle_group_message(&self, group: &GroupRecord, text: &str) -> GroupReply {
        if !group.accepts_translation() {
            return GroupReply::Skip;
        }
        let Some(prepared) = prepare_group_text(text, &self.settings.skip_prefix) else {
            return GroupReply::Skip;
        };

        let translated = match self.chain.translate(prepared.body, group.language_mode).await {
            Translation::Translated(translated) => translated,
            Translation::Skip => return GroupReply::Skip,
        };

        // Word-list output is only worth posting when it reached the target script
        if translated.from_dictionary() && !has_target_script(&translated.text, translated.target) {
            debug!(chat_id = group.chat_id, target = %translated.target, "Dictionary output not in target script");
            return GroupReply::Skip;
        }

        let reply_text = if prepared.mention.is_empty() {
            translated.text.clone()
        } else {
            format!("{} {}", prepared.mention, translated.text)
        };

        GroupReply::Translated(GroupTranslation { reply_text, translation: translated })
    }

    /// Fan a private message out to every active group
    pub async fn handle_broadcast_request(&self, actor_id: i64, payload: BroadcastPayload) -> Result<BroadcastReport> {
        let role = self.permissions.require(actor_id, ActorRole::Broadcaster)?;
        if !self.rate_limiter.check_and_record(actor_id, role) {
            warn!(actor_id, %role, "Broadcast refused by rate limit");
            return Err(RelayError::RateLimited { user_id: actor_id });
        }

        let groups = self.registry.list_active().await?;
        let (targets, skipped) = select_targets(&groups, self.settings.max_groups);
        if skipped > 0 {
            info!(actor_id, skipped, max_groups = self.settings.max_groups, "Active groups over the broadcast cap");
        }

        let job = self.dispatcher.dispatch(actor_id, &payload, targets, skipped).await;
        if job.target_count == 0 {
            info!(actor_id, skipped, "No active groups, broadcast not recorded");
            return Ok(job.into_report());
        }
        let report = job.finalize(self.audit.as_ref()).await?;
        log_broadcast_outcome(&report);
        Ok(report)
    }

    /// Probe every active group (`/check_groups`)
    pub async fn check_groups(&self, actor_id: i64) -> Result<GroupCheckSummary> {
        self.permissions.require(actor_id, ActorRole::Controller)?;
        let groups = self.registry.list_active().await?;
        let chat_ids = groups.iter().map(|g| g.chat_id).collect();
        Ok(self.dispatcher.check_groups(chat_ids).await)
    }
}
