use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, bail};
use stablepay::application::balance::BalanceQuery;
use stablepay::application::engine::PaymentEngine;
use stablepay::application::reconciler::Reconciler;
use stablepay::application::submitter::{DirectSubmitter, GatewaySubmitter};
use stablepay::application::validator::validate;
use stablepay::config::{BASE_CHAIN_ID, DEFAULT_GATEWAY_URL, EngineConfig, SettlementConfig};
use stablepay::domain::address::Address;
use stablepay::domain::feature::PremiumFeature;
use stablepay::domain::ports::{SharedPaymentLedger, SharedSettlementClient, SharedSubmitter};
use stablepay::domain::request::PaymentRequest;
use stablepay::infrastructure::http::HttpSettlementClient;
use stablepay::infrastructure::in_memory::InMemoryPaymentLedger;
use stablepay::infrastructure::rpc_signer::JsonRpcSigner;
use stablepay::interfaces::console::reporter::ConsoleReporter;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the payment gateway
    #[arg(long, global = true, env = "STABLEPAY_GATEWAY_URL", default_value = DEFAULT_GATEWAY_URL)]
    gateway_url: String,

    /// Settlement chain id
    #[arg(long, global = true, env = "STABLEPAY_CHAIN_ID", default_value_t = BASE_CHAIN_ID)]
    chain_id: u64,

    /// Path to persistent payment ledger (optional). If provided, uses RocksDB.
    #[arg(long, global = true, env = "STABLEPAY_DB_PATH")]
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the premium features and their prices
    Features,
    /// Show the stablecoin balance of an address
    Balance { address: Address },
    /// Pay for a feature, or an arbitrary amount
    Pay {
        /// Feature to unlock (see `features`)
        #[arg(long, conflicts_with_all = ["amount", "description"], required_unless_present = "amount")]
        feature: Option<String>,

        #[arg(long, requires = "description")]
        amount: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Recipient of the payment
        #[arg(long)]
        recipient: String,

        /// Payer address
        #[arg(long)]
        from: Address,

        /// User id attached to feature payments
        #[arg(long, default_value = "cli")]
        user: String,

        /// Build the token transfer locally and send it through the wallet
        #[arg(long)]
        direct: bool,

        /// Wallet node JSON-RPC endpoint
        #[arg(long, env = "STABLEPAY_WALLET_RPC", default_value = "http://127.0.0.1:8545")]
        wallet_rpc: String,
    },
    /// Re-check payments that were never seen confirmed
    Reconcile,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let settlement = SettlementConfig::new(cli.gateway_url, cli.chain_id).into_diagnostic()?;

    match cli.command {
        Command::Features => {
            let mut reporter = ConsoleReporter::new(io::stdout().lock());
            reporter
                .write_features(PremiumFeature::all())
                .into_diagnostic()?;
        }
        Command::Balance { address } => {
            let client = HttpSettlementClient::new(&settlement).into_diagnostic()?;
            let balance = BalanceQuery::new(Arc::new(client))
                .get_balance(&address)
                .await;
            let mut reporter = ConsoleReporter::new(io::stdout().lock());
            reporter
                .write_balance(&address, balance)
                .into_diagnostic()?;
        }
        Command::Pay {
            feature,
            amount,
            description,
            recipient,
            from,
            user,
            direct,
            wallet_rpc,
        } => {
            let request = match (feature, amount) {
                (Some(id), _) => match PremiumFeature::lookup(&id) {
                    Some(feature) => feature.payment_request(&recipient, &user),
                    None => bail!("unknown feature '{}'", id),
                },
                (None, Some(amount)) => {
                    PaymentRequest::new(amount, recipient, description.unwrap_or_default())
                }
                (None, None) => bail!("either --feature or --amount is required"),
            };

            let client: SharedSettlementClient =
                Arc::new(HttpSettlementClient::new(&settlement).into_diagnostic()?);
            let submitter: SharedSubmitter = if direct {
                Arc::new(DirectSubmitter::new(&settlement))
            } else {
                Arc::new(GatewaySubmitter::new(client.clone(), &settlement))
            };
            let signer = Arc::new(JsonRpcSigner::new(wallet_rpc, from.clone()).into_diagnostic()?);

            // Advisory only: the settlement service re-checks funds.
            if let Ok(validated) = validate(&request) {
                let balance = BalanceQuery::new(client.clone()).get_balance(&from).await;
                if !balance.covers(validated.amount()) {
                    warn!(
                        "Balance {} of {} may not cover {}",
                        balance,
                        from,
                        validated.amount()
                    );
                }
            }

            let engine = PaymentEngine::new(submitter, client, EngineConfig::default())
                .with_ledger(open_ledger(cli.db_path)?);
            let mut task = engine.spawn_payment(request, signer);

            let mut progress = ConsoleReporter::new(io::stderr());
            loop {
                tokio::select! {
                    event = task.next_progress() => match event {
                        Some(event) => progress.write_progress(&event).into_diagnostic()?,
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => {
                        eprintln!("Interrupted; stopped waiting for confirmation.");
                        task.cancel();
                    }
                }
            }

            let outcome = task.outcome().await;
            let mut reporter = ConsoleReporter::new(io::stdout().lock());
            reporter.write_outcome(&outcome).into_diagnostic()?;
            if !outcome.is_success() {
                bail!("payment failed");
            }
        }
        Command::Reconcile => {
            let client = HttpSettlementClient::new(&settlement).into_diagnostic()?;
            let ledger = open_ledger(cli.db_path)?;
            let report = Reconciler::new(Arc::new(client), ledger)
                .reconcile()
                .await
                .into_diagnostic()?;
            let mut reporter = ConsoleReporter::new(io::stdout().lock());
            reporter.write_report(&report).into_diagnostic()?;
        }
    }

    Ok(())
}

fn open_ledger(db_path: Option<PathBuf>) -> Result<SharedPaymentLedger> {
    if let Some(db_path) = db_path {
        #[cfg(feature = "storage-rocksdb")]
        {
            use stablepay::infrastructure::rocksdb::RocksDbPaymentLedger;
            let ledger = RocksDbPaymentLedger::open(db_path).into_diagnostic()?;
            return Ok(Arc::new(ledger));
        }

        #[cfg(not(feature = "storage-rocksdb"))]
        {
            let _ = db_path;
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
        }
    }

    Ok(Arc::new(InMemoryPaymentLedger::new()))
}
