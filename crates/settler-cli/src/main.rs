use std::error::Error;
use std::sync::Arc;

use settler_core::app::{SchedulerBuilder, TimerLoop, TimerLoopHandle};
use settler_core::config::SchedulerConfig;
use settler_core::domain::{
    Channel, ChannelId, FiringReport, OutPoint, Payment, Secret, SecretGate, SecretHash,
    SettlementState, SigningKey, Transaction, TxInput, TxOutput,
};
use settler_core::impls::{DigestSigner, InMemoryStore, InMemoryTimer, RecordingBroadcaster};
use settler_core::ports::{Clock, FixedClock, SystemClock, UlidGenerator};
use settler_core::script::Script;
use tokio::time::{Duration, timeout};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const CHANNEL: u64 = 7;

fn load_config() -> Result<SchedulerConfig, Box<dyn Error>> {
    // both loaders validate
    let config = match std::env::var("SETTLER_CONFIG") {
        Ok(path) => SchedulerConfig::from_file(path)?,
        Err(_) => SchedulerConfig::from_env()?,
    };
    Ok(config)
}

fn spend(prev: &str, vout: u32, value: u64) -> Transaction {
    Transaction::new(
        vec![TxInput::unsigned(OutPoint {
            txid: prev.repeat(32),
            vout,
        })],
        vec![TxOutput {
            value,
            script_pubkey: Script::from_bytes(vec![0x51]),
        }],
    )
}

/// Wait for the next firing report; the demo gives up after a few seconds.
async fn next_report(handle: &mut TimerLoopHandle) -> Result<FiringReport, Box<dyn Error>> {
    match timeout(Duration::from_secs(5), handle.reports().recv()).await {
        Ok(Some(report)) => Ok(report),
        Ok(None) => Err("timer loop stopped".into()),
        Err(_) => Err("no firing within 5s".into()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;
    let retry_delay = config.retry_delay();
    let tick = config.tick();
    println!("config: {}", serde_json::to_string(&config)?);

    // demo time is driven by hand so re-arms do not take minutes
    let clock = Arc::new(FixedClock::new(SystemClock.now()));
    let store = Arc::new(InMemoryStore::new());
    let broadcaster = Arc::new(RecordingBroadcaster::new());
    let timer = Arc::new(InMemoryTimer::new(clock.clone()));

    let channel = Channel::new(ChannelId::new(CHANNEL), vec![0x02; 33], vec![0x03; 33]);
    store
        .set_signing_key(channel.id, SigningKey::new("demo-key", vec![0x42; 32]))
        .await;
    store.insert_channel(channel).await;

    let secret = Secret::new(b"demo-preimage".to_vec());
    let secret_hash = SecretHash::of(&secret);
    // claimable by either role: server-bound payment on a client-issued branch
    store
        .insert_payment(Payment::new(secret_hash.clone(), ChannelId::new(CHANNEL), true))
        .await;

    let scheduler = Arc::new(
        SchedulerBuilder::new(config)
            .store(store.clone())
            .signer(Arc::new(DigestSigner::new()))
            .broadcaster(broadcaster.clone())
            .timer(timer.clone())
            .id_generator(Arc::new(UlidGenerator::new(clock.clone())))
            .build()?,
    );

    let task = scheduler.secret_gated_task(
        ChannelId::new(CHANNEL),
        spend("aa", 0, 9_000).with_lock_time(800_000),
        SecretGate {
            secret_hash: secret_hash.clone(),
            settlement_transaction: spend("bb", 1, 9_500),
            server_issued: false,
            claimable_output: TxOutput {
                value: 10_000,
                script_pubkey: Script::from_bytes(vec![0xa9]),
            },
        },
    );
    scheduler.arm(task, Duration::ZERO)?;

    let mut handle = TimerLoop::new(timer, scheduler.clone()).spawn(tick);

    let first = next_report(&mut handle).await?;
    println!("attempt {}: {:?}", first.attempt, first.state);

    store
        .reveal_secret(&secret_hash, ChannelId::new(CHANNEL), secret)
        .await;
    clock.advance(chrono::Duration::from_std(retry_delay)?);

    let second = next_report(&mut handle).await?;
    println!("attempt {}: {:?}", second.attempt, second.state);
    if second.state == SettlementState::RevealedAuthorized {
        for record in &second.broadcasts {
            println!("broadcast {:?} txid={}", record.kind, record.txid);
        }
    }

    handle.shutdown_and_join().await;
    println!("broadcasts sent: {}", broadcaster.sent_count());
    println!("counts: {}", serde_json::to_string_pretty(&scheduler.counts())?);
    Ok(())
}
