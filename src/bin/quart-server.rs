#![forbid(unsafe_code)]
use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use quart::{api, io, model::ShiftDraft, OverlapPolicy, ShiftId, ShiftQuery, ShiftService};
use quart::{Page, SqliteStore};
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// Serveur + CLI de plannings de quarts (SQLite)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (filtre via RUST_LOG)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier SQLite
    #[arg(long, global = true, default_value = "shifts.db")]
    db: String,

    /// Compte les bornes qui se touchent comme des chevauchements
    #[arg(long, global = true)]
    inclusive_bounds: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Servir l'API HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,
    },

    /// Créer un quart
    CreateShift {
        #[arg(long)]
        name: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// HH:MM:SS
        #[arg(long)]
        start: NaiveTime,
        /// HH:MM:SS
        #[arg(long)]
        end: NaiveTime,
    },

    /// Importer des quarts depuis un CSV (name,date,start,end)
    ImportShifts {
        #[arg(long)]
        csv: String,
    },

    /// Lister et optionnellement exporter
    List {
        /// Restreint à la semaine contenant cette date (YYYY-MM-DD)
        #[arg(long)]
        week: Option<NaiveDate>,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Publier d'un bloc la semaine contenant la date donnée
    Publish {
        /// YYYY-MM-DD
        #[arg(long)]
        week: NaiveDate,
    },

    /// Supprimer un quart non publié
    Delete {
        #[arg(long)]
        id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let store = SqliteStore::open(&cli.db)?;
    let policy = if cli.inclusive_bounds {
        OverlapPolicy::Inclusive
    } else {
        OverlapPolicy::Strict
    };
    let service = ShiftService::with_policy(store, policy);

    let code = match cli.cmd {
        Commands::Serve { addr } => {
            api::serve(&addr, &service)?;
            0
        }
        Commands::CreateShift {
            name,
            date,
            start,
            end,
        } => {
            let shift = service.create(ShiftDraft {
                name,
                date,
                start_time: start,
                end_time: end,
            })?;
            println!("created {}", shift.id.as_str());
            0
        }
        Commands::ImportShifts { csv } => {
            let drafts = io::import_shifts_csv(csv)?;
            let mut created = 0usize;
            let mut failed = 0usize;
            for (row, draft) in drafts.into_iter().enumerate() {
                match service.create(draft) {
                    Ok(_) => created += 1,
                    Err(e) => {
                        failed += 1;
                        eprintln!("row {}: {e}", row + 2);
                    }
                }
            }
            println!("imported {created} shift(s), {failed} failure(s)");
            // Code 2 = WARNING/INCOMPLETE
            if failed > 0 {
                2
            } else {
                0
            }
        }
        Commands::List {
            week,
            out_json,
            out_csv,
        } => {
            let query = ShiftQuery {
                week_id: week,
                ..ShiftQuery::default()
            };
            let (shifts, total) = service.find(&query, Page::default())?;
            if let Some(path) = out_json {
                std::fs::write(&path, serde_json::to_string_pretty(&shifts)?)?;
            }
            if let Some(path) = out_csv {
                io::export_shifts_csv(path, &shifts)?;
            }
            // impression compacte
            for s in &shifts {
                println!(
                    "{} | {} {} → {} | {} | {}",
                    s.id.as_str(),
                    s.date,
                    s.start_time,
                    s.end_time,
                    s.name,
                    if s.is_published { "published" } else { "draft" }
                );
            }
            println!("{total} shift(s)");
            0
        }
        Commands::Publish { week } => {
            let published = service.publish_week(week)?;
            println!("published {} shift(s)", published.len());
            0
        }
        Commands::Delete { id } => {
            service.delete_by_id(&ShiftId::new(id))?;
            println!("deleted");
            0
        }
    };

    std::process::exit(code);
}
