//! Application wiring: key, wallet, resolver, signer.

use std::sync::Arc;

use alloy::primitives::Address;
use hlsign_core::{ExpiresAfter, NonceManager, SystemClock, TracingEventSink};
use hlsign_registry::{MetaClient, MetaResolver};
use hlsign_signer::{ExchangeSigner, KeyManager, SignedPayload, SigningContext};
use hlsign_telemetry::MetricsEventSink;
use tracing::info;

use crate::commands::{cancel_request, Command};
use crate::config::AppConfig;
use crate::error::AppResult;

/// Signs one command at a time with the configured key.
pub struct Application {
    config: AppConfig,
    address: Address,
    resolver: Arc<MetaResolver>,
    signer: ExchangeSigner,
    nonces: NonceManager<SystemClock>,
}

impl Application {
    /// Validate config, load the key and build the signer. No network I/O.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let key = KeyManager::load(&config.key.source(), config.expected_address()?)?;
        let address = key.address();
        let wallet = key.into_wallet().with_active_chain(config.chain_id);

        let resolver = Arc::new(MetaResolver::new(MetaClient::new(config.info_url())?));
        let events = Arc::new(MetricsEventSink::new(Arc::new(TracingEventSink)));
        let signer = ExchangeSigner::new(resolver.clone(), Arc::new(wallet)).with_event_sink(events);

        info!(
            %address,
            chain_id = %config.chain_id,
            network = %config.network(),
            "Signer ready"
        );

        Ok(Self {
            config,
            address,
            resolver,
            signer,
            nonces: NonceManager::with_system_clock(),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Fresh context: new nonce, configured vault and expiry.
    pub fn context(&self) -> AppResult<SigningContext> {
        let nonce = self.nonces.next();
        let mut ctx = SigningContext::new(self.config.chain_id, nonce);
        if let Some(declared) = self.config.declared_chain_id {
            ctx = ctx.with_declared_chain_id(declared);
        }
        if let Some(vault) = self.config.vault_address()? {
            ctx = ctx.with_vault(vault);
        }
        if let Some(ms) = self.config.expires_after_ms {
            ctx = ctx.with_expires_after(ExpiresAfter::new(nonce.value().saturating_add(ms)));
        }
        Ok(ctx)
    }

    pub async fn run(&self, command: &Command) -> AppResult<SignedPayload> {
        let ctx = self.context()?;

        let payload = match command {
            Command::Order(args) => {
                let request = args.to_request()?;
                self.signer
                    .place_order(&ctx, &[request], args.builder_fee().as_ref())
                    .await?
            }
            Command::Cancel { coin, oid, cloid } => {
                self.signer
                    .cancel(&ctx, &cancel_request(coin, *oid, cloid.as_ref()))
                    .await?
            }
            Command::CancelAll { coin } => {
                let user = self.config.vault_address()?.unwrap_or(self.address);
                self.signer
                    .cancel_all_open(&ctx, self.resolver.as_ref(), user, coin.as_deref())
                    .await?
            }
            Command::ScheduleCancel { time } => self.signer.schedule_cancel(&ctx, *time).await?,
            Command::ApproveAgent { agent, name } => {
                self.signer
                    .approve_agent(&ctx, *agent, name.as_deref())
                    .await?
            }
            Command::Withdraw {
                destination,
                amount,
            } => self.signer.withdraw(&ctx, *destination, amount).await?,
        };

        Ok(payload)
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("address", &self.address)
            .field("chain_id", &self.config.chain_id)
            .finish_non_exhaustive()
    }
}
