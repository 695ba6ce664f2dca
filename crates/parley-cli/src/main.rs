//! # parley
//!
//! Command-line access to the quote engine for a local message database.
//!
//! - `quote` prints the snapshot a reply to a stored message would carry
//! - `quote-reply` rebuilds the quote a stored reply carries
//! - `serialize` prints the wire quote for a stored message
//! - `resend` queues a resend request for an envelope that failed to decrypt

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use parley_compose::{FailedEnvelope, QuoteConfig, QuoteResolver, ResendRequestBuilder};
use parley_shared::types::{CipherType, MessageId, ServiceAddress, ThreadId};
use parley_store::Database;

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Resolve quoted replies and queue resend requests", long_about = None)]
struct Cli {
    /// Database file (defaults to the platform data directory)
    #[arg(long, env = "PARLEY_DB", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the quote snapshot for a stored message
    Quote {
        message_id: MessageId,
    },

    /// Print the quote carried by a stored reply
    QuoteReply {
        message_id: MessageId,
    },

    /// Print the wire quote for a stored message
    Serialize {
        message_id: MessageId,
    },

    /// Queue a resend request for an undecryptable envelope
    Resend {
        /// Thread the request is sent in
        #[arg(long)]
        thread: ThreadId,

        /// UUID of the envelope's sender
        #[arg(long)]
        source: ServiceAddress,

        /// Sender device id
        #[arg(long)]
        device: u32,

        /// Envelope sent-time in milliseconds
        #[arg(long)]
        timestamp: u64,

        /// Envelope content, hex encoded
        #[arg(long)]
        content_hex: String,

        /// Cipher type tag of the envelope
        #[arg(long)]
        cipher_type: u8,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,parley_compose=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let resolver = QuoteResolver::new(QuoteConfig::from_env());
    info!(config = ?resolver.config(), "Loaded configuration");

    let mut db = match &cli.db {
        Some(path) => Database::open_at(path)
            .with_context(|| format!("opening database at {}", path.display()))?,
        None => Database::new().context("opening default database")?,
    };

    match cli.command {
        Commands::Quote { message_id } => {
            let tx = db.read()?;
            let reply = resolver.quoted_reply_for_message(message_id, &tx)?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Commands::QuoteReply { message_id } => {
            let tx = db.read()?;
            let message = tx
                .get_message(message_id)?
                .ok_or_else(|| anyhow!("message {message_id} not found"))?;
            let record = message
                .quoted_message
                .as_ref()
                .ok_or_else(|| anyhow!("message {message_id} is not a reply"))?;
            let reply = resolver.quoted_reply_for_record(record, &tx)?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Commands::Serialize { message_id } => {
            let tx = db.read()?;
            let reply = resolver.quoted_reply_for_message(message_id, &tx)?;
            println!("{}", serde_json::to_string_pretty(&reply.to_wire())?);
        }
        Commands::Resend {
            thread,
            source,
            device,
            timestamp,
            content_hex,
            cipher_type,
        } => {
            let content = hex::decode(content_hex.trim()).context("decoding --content-hex")?;
            let envelope = FailedEnvelope {
                source,
                source_device: device,
                timestamp,
                content,
            };

            let mut tx = db.write()?;
            let id = ResendRequestBuilder::new(thread).enqueue(
                &mut tx,
                &envelope,
                CipherType(cipher_type),
            )?;
            tx.commit()?;
            println!("{id}");
        }
    }

    Ok(())
}
