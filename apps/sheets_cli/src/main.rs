use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{load_settings, ClientSettings, SheetsApi, SheetsClient};
use shared::domain::Row;
use store::{RouteParams, SheetStatus, Store, StoreEvent, StoreState};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sheets", about = "Browse and edit sheets on a sheets backend")]
struct Args {
    /// Base path of the API, absolute or relative to --origin.
    #[arg(long)]
    api_host: Option<String>,
    #[arg(long)]
    origin: Option<String>,
    /// Do not keep session cookies between requests.
    #[arg(long)]
    production: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List sheets and open the first one.
    List,
    /// Open the sheet named by the last segment of a location.
    Open { location: String },
    Update {
        sheet: String,
        row: usize,
        /// JSON object of column updates.
        updates: String,
    },
    DeleteRow { sheet: String, row: usize },
    RenameField {
        sheet: String,
        column: String,
        new_name: String,
    },
    InsertRow {
        sheet: String,
        /// JSON object of column values.
        data: String,
    },
    AddField { sheet: String, name: String },
    Login { code: String },
    Logout,
    Whoami,
}

fn settings_from(args: &Args) -> ClientSettings {
    let mut settings = load_settings();
    if let Some(v) = &args.api_host {
        settings.api_host = v.clone();
    }
    if let Some(v) = &args.origin {
        settings.origin = v.clone();
    }
    if args.production {
        settings.production = true;
    }
    settings
}

fn parse_row(raw: &str) -> Result<Row> {
    let value: serde_json::Value =
        serde_json::from_str(raw).with_context(|| format!("invalid JSON: {raw}"))?;
    match value {
        serde_json::Value::Object(row) => Ok(row),
        other => bail!("expected a JSON object, got {other}"),
    }
}

async fn opened(client: SheetsClient, sheet: &str) -> Store<SheetsClient> {
    let state = StoreState::with_params(RouteParams {
        sheet: Some(sheet.to_string()),
    });
    let mut store = Store::with_state(client, state);
    store.handle(StoreEvent::SelectSheet(sheet.to_string())).await;
    store
}

fn print_state(state: &StoreState) -> Result<()> {
    if state.status() == SheetStatus::Unselected {
        tracing::warn!("no sheet is loaded; see the log above for the failing request");
    }
    println!("{}", serde_json::to_string_pretty(state)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = settings_from(&args);
    let client = SheetsClient::new(&settings)?;
    tracing::debug!(base_url = client.base_url(), "using api");

    match args.command {
        Command::List => {
            let mut store = Store::new(client);
            store.handle(StoreEvent::GetList).await;
            print_state(store.state())?;
        }
        Command::Open { location } => {
            let mut store = Store::new(client);
            store.handle(StoreEvent::PushState(location)).await;
            print_state(store.state())?;
        }
        Command::Update {
            sheet,
            row,
            updates,
        } => {
            let updates = parse_row(&updates)?;
            let mut store = opened(client, &sheet).await;
            let revision = Some(store.state().active_sheet.revision);
            store
                .handle(StoreEvent::Update {
                    row_index: row,
                    updates,
                    revision,
                })
                .await;
            print_state(store.state())?;
        }
        Command::DeleteRow { sheet, row } => {
            let mut store = opened(client, &sheet).await;
            let revision = Some(store.state().active_sheet.revision);
            store
                .handle(StoreEvent::DeleteRow {
                    row_index: row,
                    revision,
                })
                .await;
            print_state(store.state())?;
        }
        Command::RenameField {
            sheet,
            column,
            new_name,
        } => {
            let mut store = opened(client, &sheet).await;
            let active = &store.state().active_sheet;
            let column_index = active
                .fields
                .as_deref()
                .unwrap_or_default()
                .iter()
                .position(|field| field.name == column)
                .ok_or_else(|| anyhow!("sheet '{sheet}' has no column '{column}'"))?;
            let revision = Some(active.revision);
            store
                .handle(StoreEvent::RenameField {
                    column_index,
                    old_value: column,
                    value: new_name,
                    revision,
                })
                .await;
            print_state(store.state())?;
        }
        Command::InsertRow { sheet, data } => {
            let data = parse_row(&data)?;
            let mut store = opened(client, &sheet).await;
            let revision = Some(store.state().active_sheet.revision);
            store.handle(StoreEvent::InsertRow { data, revision }).await;
            print_state(store.state())?;
        }
        Command::AddField { sheet, name } => {
            let mut store = opened(client, &sheet).await;
            let revision = Some(store.state().active_sheet.revision);
            store.handle(StoreEvent::AddField { name, revision }).await;
            print_state(store.state())?;
        }
        Command::Login { code } => {
            let session = client.authenticate(&code).await?;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        Command::Logout => {
            client.logout().await?;
            println!("Logged out");
        }
        Command::Whoami => {
            let user = client.current_user().await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
    }

    Ok(())
}
