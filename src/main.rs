//! Solana Vanity Token Minter CLI
//!
//! Usage:
//!   vanity_mint grind -p AB -i                    # Find a key starting with "ab" in any case
//!   vanity_mint grind -s pump                     # Find a key ending with "pump"
//!   vanity_mint mint -k payer.json --name Test --symbol TST --supply 1000000 -p AB

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use solana_sdk::signature::{read_keypair_file, Keypair, Signer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vanity_mint::config::{Command, GrindArgs, MintArgs};
use vanity_mint::flow::search_async;
use vanity_mint::metadata::{ContentStore, MetadataUriResolver, PinataStore, UriMode};
use vanity_mint::token::{AuthorityFlags, MetadataStep, SocialLinks, TokenSpec};
use vanity_mint::worker::{
    SearchJob, SearchOutcome, SearchProgress, StopHandle, TimeoutResponse, VanityResponse,
};
use vanity_mint::{
    Config, KeypairWallet, MintRequest, RpcLedger, TokenMinter, VanityPattern, VanitySearchEngine,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    match config.command {
        Command::Grind(args) => grind(args).await,
        Command::Mint(args) => mint(args).await,
    }
}

async fn grind(args: GrindArgs) -> anyhow::Result<()> {
    args.validate().context("Configuration error")?;

    let pattern = VanityPattern::new(&args.prefix, &args.suffix, !args.ignore_case)?;

    println!("Solana Vanity Address Generator");
    println!("===============================");
    println!("Pattern:    {}", pattern);
    println!("Difficulty: {}", pattern.difficulty_description());
    println!("Workers:    {}", args.worker_count());
    println!();

    let job = SearchJob::new(pattern, args.worker_count());
    ctrlc_handler(job.stop_handle())?;
    println!(
        "Searching for up to {}s... (Press Ctrl+C to stop)\n",
        job.deadline().as_secs()
    );

    let engine = VanitySearchEngine::default()
        .with_progress_interval(Duration::from_secs(args.report_interval));
    match search_async(&engine, job, print_progress).await? {
        SearchOutcome::Found {
            result,
            attempts,
            elapsed,
        } => {
            print_final_stats(attempts, elapsed);
            println!("\n=== Match (worker {}) ===", result.worker_id);
            println!(
                "{}",
                serde_json::to_string_pretty(&VanityResponse::from(&result))?
            );
        }
        SearchOutcome::TimedOut {
            attempts,
            elapsed,
            suggestion,
        } => {
            print_final_stats(attempts, elapsed);
            let response = TimeoutResponse {
                error: "Search timed out".to_string(),
                suggestion,
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
            std::process::exit(1);
        }
        SearchOutcome::Cancelled { attempts, elapsed } => {
            println!("\nStopped by user.");
            print_final_stats(attempts, elapsed);
        }
    }

    Ok(())
}

async fn mint(args: MintArgs) -> anyhow::Result<()> {
    args.validate().context("Configuration error")?;

    let payer = read_keypair_file(&args.keypair)
        .map_err(|e| anyhow!("failed to read keypair {}: {}", args.keypair.display(), e))?;
    info!(payer = %payer.pubkey(), rpc = %args.rpc_url, "loaded payer keypair");

    let mut spec = TokenSpec::new(&args.name, &args.symbol, args.decimals, &args.supply)
        .with_description(&args.description)
        .with_social(SocialLinks {
            website: args.website.clone(),
            twitter: args.twitter.clone(),
            discord: args.discord.clone(),
            telegram: args.telegram.clone(),
        });
    if let Some(created_on) = &args.created_on {
        spec = spec.with_created_on(created_on);
    }
    spec.validate()?;

    let mint_keypair = if args.vanity.is_requested() {
        grind_mint_keypair(&args.vanity).await?
    } else {
        Keypair::new()
    };
    println!("Mint address: {}", mint_keypair.pubkey());

    let store: Option<Arc<dyn ContentStore>> =
        match (&args.pinata_jwt, &args.pinata_gateway) {
            (Some(jwt), Some(gateway)) => Some(Arc::new(PinataStore::new(jwt, gateway)?)),
            _ => None,
        };

    let image = match (&args.image_file, &store) {
        (Some(path), Some(store)) => Some(upload_image(store.as_ref(), path).await?),
        (Some(_), None) => bail!("--image-file requires a content store"),
        (None, _) => args.image.clone(),
    };

    let uri_mode = match (&args.metadata_uri, args.upload) {
        (Some(uri), _) => UriMode::DirectUrl(uri.clone()),
        (None, true) => UriMode::ContentStoreUpload,
        (None, false) => UriMode::InlineEncoded,
    };

    let ledger = RpcLedger::new(&args.rpc_url);
    let wallet = KeypairWallet::new(payer, ledger.client());
    let resolver = MetadataUriResolver::new(store).with_inline_fallback(args.inline_fallback);
    let minter = TokenMinter::new(Arc::new(ledger), resolver)
        .with_confirm_timeout(Duration::from_secs(args.confirm_timeout));

    let request = MintRequest {
        spec,
        image,
        uri_mode,
        flags: AuthorityFlags {
            revoke_mint: args.revoke_mint,
            revoke_freeze: args.revoke_freeze,
        },
    };

    let report = minter
        .mint(&request, mint_keypair, &wallet, |state| {
            println!("  -> {}", state)
        })
        .await?;

    println!("\n=== Token Created ===");
    println!("Mint:      {}", report.mint_address);
    println!("Signature: {}", report.signature);
    println!("Cost:      {:.6} SOL", report.cost.total_sol());
    match &report.metadata {
        MetadataStep::Attached { uri } if uri.starts_with("data:") => {
            println!("Metadata:  inline ({} chars)", uri.len())
        }
        MetadataStep::Attached { uri } => println!("Metadata:  {}", uri),
        MetadataStep::Skipped { reason } => println!("Metadata:  skipped ({})", reason),
    }

    Ok(())
}

async fn grind_mint_keypair(args: &GrindArgs) -> anyhow::Result<Keypair> {
    let pattern = VanityPattern::new(&args.prefix, &args.suffix, !args.ignore_case)?;
    println!(
        "Grinding mint address {} ({})",
        pattern,
        pattern.difficulty_description()
    );

    let job = SearchJob::new(pattern, args.worker_count());
    ctrlc_handler(job.stop_handle())?;

    let engine = VanitySearchEngine::default()
        .with_progress_interval(Duration::from_secs(args.report_interval));
    match search_async(&engine, job, print_progress).await? {
        SearchOutcome::Found {
            result,
            attempts,
            elapsed,
        } => {
            print_final_stats(attempts, elapsed);
            Ok(result.keypair)
        }
        SearchOutcome::TimedOut { suggestion, .. } => match suggestion {
            Some(suggestion) => bail!("vanity search timed out. {}", suggestion),
            None => bail!("vanity search timed out"),
        },
        SearchOutcome::Cancelled { .. } => bail!("vanity search stopped by user"),
    }
}

async fn upload_image(store: &dyn ContentStore, path: &Path) -> anyhow::Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read image {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image");

    let stored = store.upload_file(bytes, file_name).await?;
    info!(url = %stored.url, cid = %stored.content_id, "image uploaded");
    Ok(stored.url)
}

fn print_progress(progress: &SearchProgress) {
    println!(
        "[{:>4}s/{}s] Generated {} keys ({}/s)",
        progress.elapsed.as_secs(),
        progress.deadline.as_secs(),
        format_number(progress.total_attempts()),
        format_number(progress.keys_per_second() as u64)
    );
}

fn print_final_stats(attempts: u64, elapsed: Duration) {
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 { attempts as f64 / secs } else { 0.0 };

    println!("\n--- Final Statistics ---");
    println!("Total keys generated: {}", format_number(attempts));
    println!("Time elapsed:         {:.2}s", secs);
    println!("Average speed:        {}/s", format_number(rate as u64));
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn ctrlc_handler(stop: StopHandle) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        warn!("interrupt received, stopping search");
        stop.stop();
    })
    .context("Error setting Ctrl-C handler")
}
