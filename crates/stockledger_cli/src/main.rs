//! Command-line front end for the stock ledger.
//!
//! # Responsibility
//! - Map subcommands onto `Inventory` facade calls.
//! - Load configuration (JSON file + `STOCKLEDGER_*` env) and logging once.
//! - Print plain, line-oriented output; exit non-zero on any failure.

use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use stockledger_core::{
    init_logging_from_config, Inventory, Item, LedgerConfig, Movement, MovementRequest,
    MovementType,
};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "stockledger", version, about = "Track stock levels and movements")]
struct Cli {
    /// JSON config file; `STOCKLEDGER_*` environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides config and environment).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core linkage information.
    Ping,
    /// Register a new item with zero stock.
    AddItem {
        name: String,
        #[arg(long, default_value = stockledger_core::DEFAULT_UNIT)]
        unit: String,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        min: i64,
    },
    /// List items with their alert tier.
    List,
    /// Show one item.
    Get { id: Uuid },
    /// Delete an item; its movement history is kept.
    Delete { id: Uuid },
    /// Record an IN or OUT movement.
    Record {
        id: Uuid,
        #[arg(value_parser = parse_movement_type)]
        kind: MovementType,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
        #[arg(long)]
        responsible: String,
        #[arg(long)]
        request_code: Option<String>,
        #[arg(long)]
        remarks: Option<String>,
    },
    /// Show the most recent movements, newest first.
    Recent {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show every movement of one item, oldest first.
    History { id: Uuid },
    /// List items at or below their minimum level.
    Alerts,
    /// Print catalog totals.
    Summary,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Command::Ping = cli.command {
        println!("stockledger_core ping={}", stockledger_core::ping());
        println!("stockledger_core version={}", stockledger_core::core_version());
        return Ok(());
    }

    let config = load_config(&cli)?;
    init_logging_from_config(&config)?;
    info!("event=cli_command module=cli status=start");

    let mut inventory = Inventory::open_with_config(&config)?;
    execute(&mut inventory, cli.command, &config)?;
    inventory.close()?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<LedgerConfig, Box<dyn Error>> {
    let base = match &cli.config {
        Some(path) => LedgerConfig::from_file(path)?,
        None => LedgerConfig::default(),
    };
    let mut config = base.with_env_overrides()?;
    if let Some(db) = &cli.db {
        config.db_path = Some(db.clone());
    }
    if config.db_path.is_none() {
        return Err("no database configured; pass --db or set STOCKLEDGER_DB_PATH".into());
    }
    Ok(config)
}

fn execute(
    inventory: &mut Inventory,
    command: Command,
    config: &LedgerConfig,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Ping => {}
        Command::AddItem { name, unit, min } => {
            let item = inventory.create_item(&name, &unit, min)?;
            println!("{}", item.id);
        }
        Command::List => {
            for status in inventory.list_items_with_tiers()? {
                println!("{} {:<7} {}", format_item(&status.item), status.tier, status.item.id);
            }
        }
        Command::Get { id } => {
            let item = inventory.get_item(id)?;
            println!("{} {:<7} {}", format_item(&item), item.alert_tier(), item.id);
        }
        Command::Delete { id } => {
            inventory.delete_item(id)?;
            println!("deleted {id}");
        }
        Command::Record {
            id,
            kind,
            quantity,
            responsible,
            request_code,
            remarks,
        } => {
            let request = MovementRequest {
                item_id: id,
                kind,
                quantity,
                request_code,
                responsible_person: responsible,
                remarks,
            };
            let applied = inventory.record_movement(&request)?;
            println!(
                "{} stock={} {}",
                format_movement(&applied.movement),
                applied.item.current_stock,
                applied.item.alert_tier()
            );
        }
        Command::Recent { limit } => {
            let limit = limit.unwrap_or(config.recent_movements_limit);
            for movement in inventory.list_recent_movements(limit)? {
                println!("{}", format_movement(&movement));
            }
        }
        Command::History { id } => {
            for movement in inventory.movements_for_item(id)? {
                println!("{}", format_movement(&movement));
            }
        }
        Command::Alerts => {
            for item in inventory.low_stock_alerts()? {
                println!("{} min={}", format_item(&item), item.min_stock_level);
            }
        }
        Command::Summary => {
            let summary = inventory.summary()?;
            println!("total_items={}", summary.total_items);
            println!("total_stock={}", summary.total_stock);
            println!("low_stock_items={}", summary.low_stock_items);
        }
    }
    Ok(())
}

fn parse_movement_type(value: &str) -> Result<MovementType, String> {
    value.parse().map_err(|err| format!("{err}"))
}

fn format_item(item: &Item) -> String {
    format!("{:<24} {:>10} {:<6}", item.name, item.current_stock, item.unit)
}

fn format_movement(movement: &Movement) -> String {
    format!(
        "{} {:<3} {:>8} {} by {}{}{}",
        movement.created_at,
        movement.kind,
        movement.quantity,
        movement.item_name,
        movement.responsible_person,
        movement
            .request_code
            .as_deref()
            .map(|code| format!(" [{code}]"))
            .unwrap_or_default(),
        movement
            .remarks
            .as_deref()
            .map(|remarks| format!(" - {remarks}"))
            .unwrap_or_default(),
    )
}
