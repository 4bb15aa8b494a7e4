//! `rc-cli` — operator commands against the paste store / task queue.
//!
//! Thin by design: every subcommand connects to Postgres, delegates to
//! `rc-db`, and prints a handful of `key=value` lines so the output is easy
//! to grep in a shell or CI log, matching the teacher CLI's convention.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rc_db::TaskQueue;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "rc")]
#[command(about = "paste-and-run operator CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },

    /// Task queue commands
    Queue {
        #[command(subcommand)]
        cmd: QueueCmd,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    /// Connectivity check plus a confirmation the `pastes` table exists.
    Status,
    /// Run embedded SQLx migrations.
    Migrate,
}

#[derive(Subcommand)]
enum QueueCmd {
    /// Re-queue a paste whose queue entry was lost (see the dequeue failure
    /// model: a claim that doesn't reach the worker leaves the paste row
    /// intact but never re-judged without this).
    Enqueue {
        /// UUID of the paste to enqueue.
        paste_id: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Db { cmd } => {
            let pool = rc_db::connect_from_env().await?;
            match cmd {
                DbCmd::Status => {
                    let s = rc_db::status(&pool).await?;
                    println!("db_ok={} has_pastes_table={}", s.ok, s.has_pastes_table);
                }
                DbCmd::Migrate => {
                    rc_db::migrate(&pool).await?;
                    println!("migrations_applied=true");
                }
            }
        }

        Commands::Queue { cmd } => match cmd {
            QueueCmd::Enqueue { paste_id } => {
                let pool = rc_db::connect_from_env().await?;
                let store = rc_db::PostgresStore::new(pool);
                store.enqueue(paste_id).await?;
                println!("enqueued paste_id={paste_id}");
            }
        },
    }

    Ok(())
}
