//! SettlementScheduler - 決済タスクの状態機械
//!
//! 1 回の発火（fire）で行うこと:
//! 1. secret_hash なし → fallback を配信して終了
//! 2. Payment を参照
//!    - 見つからない → 中止（配信も再アームもしない）
//!    - secret 未公開 → 新しいタスク値を作って再アーム
//!    - secret 公開済み → 請求権を判定し、あれば settlement を組み立てて配信
//! 3. 請求権ありの分岐のあとは、設定に応じて fallback をもう一度配信
//!
//! 失敗は fire の中で全て捕まえて FiringReport に記録します。
//! タイマー側にエラーが伝播することはありません。

use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::config::SchedulerConfig;
use crate::domain::{
    BroadcastKind, BroadcastRecord, ChannelId, ClaimDecision, ErrorKind, FiringReport, NodeRole,
    Payment, Secret, SecretGate, SettlementError, SettlementState, SettlementTask, TaskId,
    TimerError, Transaction, authorize,
};
use crate::observability::{Counters, SettlementCounts};
use crate::ports::{
    Broadcaster, ChannelLookup, IdGenerator, KeyResolver, PaymentLookup, SettlementTimer, Signer,
};
use crate::script::{
    Script, ScriptAssembler, SignatureExtractor, SignatureSlot, place_signatures,
};

/// Settlement transactions spend the channel output through their first input.
const SETTLEMENT_INPUT: usize = 0;

pub struct SettlementScheduler {
    config: SchedulerConfig,
    payments: Arc<dyn PaymentLookup>,
    channels: Arc<dyn ChannelLookup>,
    keys: Arc<dyn KeyResolver>,
    signer: Arc<dyn Signer>,
    broadcaster: Arc<dyn Broadcaster>,
    timer: Arc<dyn SettlementTimer>,
    ids: Arc<dyn IdGenerator>,
    assembler: ScriptAssembler,
    extractor: SignatureExtractor,
    counters: Counters,
}

/// The collaborators a scheduler is wired with. Filled in by
/// [`SchedulerBuilder`](super::SchedulerBuilder).
pub(crate) struct Collaborators {
    pub payments: Arc<dyn PaymentLookup>,
    pub channels: Arc<dyn ChannelLookup>,
    pub keys: Arc<dyn KeyResolver>,
    pub signer: Arc<dyn Signer>,
    pub broadcaster: Arc<dyn Broadcaster>,
    pub timer: Arc<dyn SettlementTimer>,
    pub ids: Arc<dyn IdGenerator>,
}

impl SettlementScheduler {
    pub(crate) fn new(config: SchedulerConfig, parts: Collaborators) -> Self {
        Self {
            config,
            payments: parts.payments,
            channels: parts.channels,
            keys: parts.keys,
            signer: parts.signer,
            broadcaster: parts.broadcaster,
            timer: parts.timer,
            ids: parts.ids,
            assembler: ScriptAssembler::new(),
            extractor: SignatureExtractor::new(),
            counters: Counters::default(),
        }
    }

    pub fn role(&self) -> NodeRole {
        self.config.role
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn counts(&self) -> SettlementCounts {
        self.counters.snapshot()
    }

    /// New refund-only task created by this node.
    pub fn unconditional_task(&self, channel_id: ChannelId, fallback: Transaction) -> SettlementTask {
        SettlementTask::unconditional(self.ids.generate_task_id(), channel_id, self.role(), fallback)
    }

    /// New secret-gated task created by this node.
    pub fn secret_gated_task(
        &self,
        channel_id: ChannelId,
        fallback: Transaction,
        gate: SecretGate,
    ) -> SettlementTask {
        SettlementTask::secret_gated(
            self.ids.generate_task_id(),
            channel_id,
            self.role(),
            fallback,
            gate,
        )
    }

    /// Schedule the first firing of `task`.
    pub fn arm(&self, task: SettlementTask, delay: Duration) -> Result<TaskId, TimerError> {
        let id = task.id();
        self.timer.schedule_after(delay, task)?;
        info!(task_id = %id, delay_secs = delay.as_secs(), "settlement task armed");
        Ok(id)
    }

    /// Run one attempt of `task`. Never fails; see the returned report.
    pub async fn fire(&self, task: &SettlementTask) -> FiringReport {
        let span = info_span!(
            "settlement_firing",
            task_id = %task.id(),
            attempt = task.attempt(),
            channel_id = %task.channel_id(),
        );
        self.fire_inner(task).instrument(span).await
    }

    async fn fire_inner(&self, task: &SettlementTask) -> FiringReport {
        Counters::incr(&self.counters.firings);
        let mut report = FiringReport::new(
            task.id(),
            self.ids.generate_attempt_id(),
            task.attempt(),
            SettlementState::entry(task.is_secret_gated()),
        );

        if task.created_by() != self.role() {
            warn!(
                created_by = %task.created_by(),
                role = %self.role(),
                "task was created under a different role; acting as configured role"
            );
        }

        match task.gate() {
            None => {
                self.broadcast(BroadcastKind::Fallback, task.fallback_transaction(), &mut report)
                    .await;
            }
            Some(gate) => self.check_secret(task, gate, &mut report).await,
        }

        debug!(state = ?report.state, broadcasts = report.broadcasts.len(), "firing finished");
        report
    }

    async fn check_secret(&self, task: &SettlementTask, gate: &SecretGate, report: &mut FiringReport) {
        let payment = match self
            .payments
            .lookup_payment(&gate.secret_hash, task.channel_id())
            .await
        {
            Ok(payment) => payment,
            Err(e) => {
                let err = SettlementError::from(e);
                report.state = match err.kind() {
                    // storage hiccup: treat as not revealed yet so the chain stays alive
                    ErrorKind::Unavailable => SettlementState::NotYetRevealed,
                    _ => {
                        Counters::incr(&self.counters.aborted);
                        SettlementState::Aborted
                    }
                };
                self.record_failure(err, report);
                if report.state.rearms() {
                    self.rearm(task, report);
                }
                return;
            }
        };

        let Some(secret) = payment.secret.as_ref() else {
            report.state = SettlementState::NotYetRevealed;
            self.rearm(task, report);
            return;
        };

        if authorize(payment.payment_to_server, gate.server_issued, self.role())
            == ClaimDecision::Refuse
        {
            Counters::incr(&self.counters.unauthorized);
            report.state = SettlementState::RevealedUnauthorized;
            info!(
                payment_to_server = payment.payment_to_server,
                server_issued = gate.server_issued,
                "secret revealed but branch belongs to the counterparty; nothing to do"
            );
            return;
        }

        report.state = SettlementState::RevealedAuthorized;
        match self.build_settlement(task, gate, &payment, secret).await {
            Ok((settlement, script)) => {
                report.settlement_script = Some(script);
                // no lock time on settlements: broadcast right away
                self.broadcast(BroadcastKind::Settlement, &settlement, report)
                    .await;
            }
            Err(err) => self.record_failure(err, report),
        }

        if self.config.broadcast_fallback_after_settlement {
            self.broadcast(BroadcastKind::Fallback, task.fallback_transaction(), report)
                .await;
        }
    }

    /// Sign the settlement input and attach the unlocking script.
    async fn build_settlement(
        &self,
        task: &SettlementTask,
        gate: &SecretGate,
        payment: &Payment,
        secret: &Secret,
    ) -> Result<(Transaction, Script), SettlementError> {
        let channel = self.channels.lookup_channel(task.channel_id()).await?;
        let key = self.keys.current_signing_key(&channel).await?;

        let mut settlement = gate.settlement_transaction.clone();
        let input = settlement
            .input(SETTLEMENT_INPUT)
            .ok_or(SettlementError::MissingInput(SETTLEMENT_INPUT))?;
        let counterparty_slot = SignatureSlot::of(self.role().counterparty());
        // anything in our own slot is stale and gets replaced
        let counterparty_sig = self.extractor.extract_slot(input, counterparty_slot);
        if counterparty_sig.is_none() {
            debug!("no counterparty signature on settlement input yet");
        }

        let own_sig = self
            .signer
            .sign(&settlement, SETTLEMENT_INPUT, &gate.claimable_output, &key)
            .await?;

        let (server_sig, client_sig) =
            place_signatures(self.role(), Some(&own_sig), counterparty_sig.as_ref());
        let script = self.assembler.settlement_script_sig(
            &channel.keys,
            server_sig,
            client_sig,
            Some(secret),
            gate.server_issued,
            payment.payment_to_server,
        );

        if let Some(input) = settlement.input_mut(SETTLEMENT_INPUT) {
            input.script_sig = script.clone();
        }
        Ok((settlement, script))
    }

    /// Schedule an identical task under a fresh id.
    fn rearm(&self, task: &SettlementTask, report: &mut FiringReport) {
        let next = task.rearmed(self.ids.generate_task_id());
        let next_id = next.id();
        let delay = self.config.retry_delay();

        match self.timer.schedule_after(delay, next) {
            Ok(()) => {
                Counters::incr(&self.counters.rearms);
                report.rearmed_as = Some(next_id);
                info!(next_task_id = %next_id, delay_secs = delay.as_secs(), "re-armed");
            }
            Err(e) => self.record_failure(SettlementError::Rearm(e), report),
        }
    }

    async fn broadcast(&self, kind: BroadcastKind, tx: &Transaction, report: &mut FiringReport) {
        let txid = tx.txid();
        match self.broadcaster.broadcast(tx).await {
            Ok(()) => {
                let counter = match kind {
                    BroadcastKind::Settlement => &self.counters.settlements_broadcast,
                    BroadcastKind::Fallback => &self.counters.fallbacks_broadcast,
                };
                Counters::incr(counter);
                info!(?kind, %txid, "transaction broadcast");
                report.broadcasts.push(BroadcastRecord {
                    kind,
                    txid,
                    error: None,
                });
            }
            Err(e) => {
                report.broadcasts.push(BroadcastRecord {
                    kind,
                    txid,
                    error: Some(e.clone()),
                });
                self.record_failure(e.into(), report);
            }
        }
    }

    /// Log and record a failure. Nothing is retried from here.
    fn record_failure(&self, err: SettlementError, report: &mut FiringReport) {
        match err.kind() {
            ErrorKind::NotFound => warn!(error = %err, "lookup found nothing; attempt aborted"),
            ErrorKind::Unavailable => warn!(error = %err, "store unavailable"),
            ErrorKind::Signing => warn!(error = %err, "could not sign settlement"),
            ErrorKind::MalformedTask => warn!(error = %err, "settlement transaction is malformed"),
            ErrorKind::Broadcast => {
                Counters::incr(&self.counters.broadcast_failures);
                warn!(error = %err, "broadcast failed; not retrying");
            }
            ErrorKind::Rearm => {
                Counters::incr(&self.counters.rearm_failures);
                error!(error = %err, "could not re-arm; payment may go unclaimed");
            }
        }
        report.errors.push(err);
    }
}
