//! Operator CLI for generating and advancing single-elimination brackets.

use anyhow::{Context, Error, bail};
use log::info;
use pico_args::Arguments;

use bracketry::{
    BracketBuilder, BracketManager,
    db::{Database, DatabaseConfig},
};

const HELP: &str = "\
Generate and advance single-elimination brackets

USAGE:
  bracketry <COMMAND> [OPTIONS]

COMMANDS:
  preview    Lay out a bracket without touching the database
  generate   Create and link the matches of a tournament
  winner     Record a match winner and advance them
  show       Print the bracket of a tournament as JSON

OPTIONS:
  --tournament ID        Tournament ID (generate, show)
  --entrants   A,B,...   Comma-separated entrant IDs in seeding order (preview, generate)
  --match      ID        Match ID (winner)
  --entrant    ID        Winning entrant ID (winner)
  --db-url     URL       Database connection string  [default: env DATABASE_URL]

FLAGS:
  -h, --help             Print help information

ENVIRONMENT:
  DATABASE_URL           PostgreSQL connection string
  DB_QUERY_TIMEOUT       Per-query timeout in seconds
  RUST_LOG               Log filter (e.g. info, bracketry=debug)
";

fn parse_entrants(value: &str) -> Result<Vec<i64>, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().map_err(|e| format!("invalid entrant '{s}': {e}")))
        .collect()
}

async fn connect(pargs: &mut Arguments) -> Result<BracketManager, Error> {
    let mut config = DatabaseConfig::from_env();
    if let Some(url) = pargs.opt_value_from_str("--db-url")? {
        config.database_url = url;
    }

    let db = Database::connect(&config)
        .await
        .context("Failed to connect to database")?;
    if !db.schema_ready().await? {
        bail!("Bracket tables missing; apply migrations/001_brackets.sql first");
    }
    info!("Database connected successfully");

    Ok(db.manager())
}

fn preview(entrants: &[i64]) -> Result<(), Error> {
    let layout = BracketBuilder::new(0, entrants)?;
    println!(
        "{} entrants, {} rounds, {} byes",
        layout.entrant_count(),
        layout.round_count(),
        layout.bye_count()
    );

    let show = |slot: Option<i64>| slot.map_or_else(|| "-".to_string(), |id| id.to_string());
    for round in 1..=layout.round_count() {
        println!("Round {round}");
        for draft in layout.drafts().iter().filter(|d| d.round == round) {
            println!(
                "  #{:<3} {:>8} vs {:<8}",
                draft.match_number,
                show(draft.team1_id),
                show(draft.team2_id)
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    env_logger::builder().format_target(false).init();

    match pargs.subcommand()?.as_deref() {
        Some("preview") => {
            let entrants = pargs.value_from_fn("--entrants", parse_entrants)?;
            preview(&entrants)?;
        }
        Some("generate") => {
            let tournament_id: i64 = pargs.value_from_str("--tournament")?;
            let entrants = pargs.value_from_fn("--entrants", parse_entrants)?;
            let manager = connect(&mut pargs).await?;

            let matches = manager.generate_bracket(tournament_id, &entrants).await?;
            info!(
                "Created {} matches for tournament {}",
                matches.len(),
                tournament_id
            );
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }
        Some("winner") => {
            let match_id: i64 = pargs.value_from_str("--match")?;
            let entrant: i64 = pargs.value_from_str("--entrant")?;
            let manager = connect(&mut pargs).await?;

            let advancement = manager.record_winner(match_id, entrant).await?;
            if let Some(champion) = advancement.champion() {
                info!("Entrant {} is the champion", champion);
            }
            println!("{}", serde_json::to_string_pretty(&advancement)?);
        }
        Some("show") => {
            let tournament_id: i64 = pargs.value_from_str("--tournament")?;
            let manager = connect(&mut pargs).await?;

            let bracket = manager.get_bracket(tournament_id).await?;
            println!("{}", serde_json::to_string_pretty(&bracket)?);
        }
        Some(other) => bail!("unknown command '{other}'\n\n{HELP}"),
        None => bail!("missing command\n\n{HELP}"),
    }

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        log::warn!("Ignoring unused arguments: {:?}", remaining);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entrants() {
        assert_eq!(parse_entrants("1,2, 3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_entrants("4,").unwrap(), vec![4]);
        assert!(parse_entrants("1,x").is_err());
    }

    #[test]
    fn test_preview_rejects_single_entrant() {
        assert!(preview(&[1]).is_err());
        assert!(preview(&[1, 2, 3]).is_ok());
    }
}
