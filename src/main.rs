use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rental_scout::config::{ClientConfig, ServerConfig};
use rental_scout::dates::{parse_request_date, parse_stay};
use rental_scout::error::ValidationError;
use rental_scout::fetcher::AvailabilityFetcher;
use rental_scout::models::{AvailabilityRecord, Booking, SearchRequest, Span};
use rental_scout::reconcile::{self, build_draft, search, validate_selection, SearchOptions};
use rental_scout::server;
use rental_scout::sources::{FixtureSource, RowSource, SheetsSource};

#[derive(Debug, Parser)]
#[command(author, version, about = "Search vacation-rental availability")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve spreadsheet rows at /api/availability
    Serve(ServeArgs),
    /// Find availability that can host a stay
    Search(SearchArgs),
    /// List the resorts and unit types on offer
    Options(ClientArgs),
    /// Price a stay in one availability span and print the booking handoff
    Draft(DraftArgs),
}

#[derive(Debug, Args)]
struct ServeArgs {
    /// JSON file of raw rows to serve instead of the spreadsheet
    #[arg(long, value_name = "FILE")]
    fixture: Option<PathBuf>,
    /// Port override (defaults to RENTAL_SCOUT_PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Debug, Args)]
struct ClientArgs {
    /// Backend base URL (defaults to RENTAL_SCOUT_API_URL)
    #[arg(long)]
    api_url: Option<String>,
    /// Date year-less ranges are resolved against, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    reference_date: Option<String>,
}

#[derive(Debug, Args)]
struct SearchArgs {
    #[command(flatten)]
    client: ClientArgs,
    /// JSON file of existing bookings
    #[arg(long, value_name = "FILE")]
    bookings: Option<PathBuf>,
    #[arg(long)]
    check_in: String,
    #[arg(long)]
    check_out: String,
    /// Exact resort name
    #[arg(long)]
    resort: Option<String>,
    /// Unit type substring, e.g. "2 bedroom"
    #[arg(long)]
    unit_type: Option<String>,
    #[arg(long)]
    guests: Option<u32>,
    #[arg(long)]
    min_stay: Option<u32>,
    #[arg(long)]
    max_stay: Option<u32>,
    /// Print matches as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct DraftArgs {
    #[command(flatten)]
    client: ClientArgs,
    #[arg(long, value_name = "FILE")]
    bookings: Option<PathBuf>,
    #[arg(long)]
    availability_id: String,
    #[arg(long)]
    check_in: String,
    #[arg(long, required_unless_present = "nights")]
    check_out: Option<String>,
    /// Stay length, as an alternative to --check-out
    #[arg(long, conflicts_with = "check_out")]
    nights: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Search(args) => run_search(args).await,
        Command::Options(args) => list_options(args).await,
        Command::Draft(args) => run_draft(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.port {
        config.port = port;
    }

    let source = pick_source(&config, args.fixture)?;
    let listener = TcpListener::bind(config.address())
        .await
        .with_context(|| format!("Failed to bind {}", config.address()))?;
    server::serve(listener, source).await
}

fn pick_source(config: &ServerConfig, fixture: Option<PathBuf>) -> Result<Arc<dyn RowSource>> {
    if let Some(path) = fixture.or_else(|| config.fixture.clone()) {
        info!("📁 Serving rows from {}", path.display());
        return Ok(Arc::new(FixtureSource::from_file(path)));
    }
    if let Some((params, credentials)) = config.sheet_access() {
        info!("📊 Serving rows from spreadsheet {}", params.spreadsheet_id);
        return Ok(Arc::new(SheetsSource::new(params, credentials)?));
    }
    warn!("No spreadsheet configured (set SPREADSHEET_ID and GOOGLE_API_KEY or GOOGLE_ACCESS_TOKEN)");
    Ok(Arc::new(FixtureSource::sample()))
}

async fn fetch_records(args: &ClientArgs) -> Result<Arc<Vec<AvailabilityRecord>>> {
    let config = ClientConfig::from_env()?;
    let api_url = args.api_url.clone().unwrap_or(config.api_url);
    let fetcher = AvailabilityFetcher::new(&api_url, config.fetch_timeout)?;
    fetcher
        .refresh()
        .await
        .with_context(|| format!("Could not load availability from {}", fetcher.endpoint()))
}

async fn load_bookings(path: Option<&Path>) -> Result<Vec<Booking>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read bookings from {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Bookings file {} is not a JSON booking array", path.display()))
}

fn reference_date(args: &ClientArgs) -> Result<NaiveDate, ValidationError> {
    match &args.reference_date {
        Some(text) => parse_request_date(text),
        None => Ok(Local::now().date_naive()),
    }
}

async fn load_spans(args: &ClientArgs, bookings: Option<&Path>) -> Result<Vec<Span>> {
    let reference = reference_date(args)?;
    let records = fetch_records(args).await?;
    let bookings = load_bookings(bookings).await?;
    Ok(reconcile::reconcile(&records, &bookings, reference, Utc::now()))
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let (check_in, check_out) = match parse_stay(&args.check_in, Some(&args.check_out), None) {
        Ok(stay) => stay,
        Err(err) => {
            println!("⚠️  {}", err);
            return Ok(());
        }
    };

    let mut request = SearchRequest::new(check_in, check_out)
        .with_stay_bounds(args.min_stay, args.max_stay);
    request.resort = args.resort;
    request.unit_type = args.unit_type;
    request.guests = args.guests;

    let spans = load_spans(&args.client, args.bookings.as_deref()).await?;
    let matches = match search(&spans, &request) {
        Ok(matches) => matches,
        Err(err) => {
            println!("⚠️  {}", err);
            return Ok(());
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No available units found");
        println!("Try adjusting your search criteria or widening your dates.");
        return Ok(());
    }

    println!("\nAvailable Units ({})\n", matches.len());
    for (i, span) in matches.iter().enumerate() {
        println!("{}. {} - {}", i + 1, span.resort, span.unit_type);
        println!("   Available: {} ({} nights)", span.date_range, span.nights);
        println!("   Rate basis: {} for {} nights", span.base_cost, span.base_nights);
        println!("   Minimum stay: {} nights", span.min_stay_days);
        if let Some(latest) = span.latest_check_in() {
            println!("   Latest check-in: {}", latest);
        }
        println!("   ID: {}", span.availability_id);
        if !span.link.is_empty() {
            println!("   Details: {}", span.link);
        }
        println!();
    }

    Ok(())
}

async fn list_options(args: ClientArgs) -> Result<()> {
    let records = fetch_records(&args).await?;
    let options = SearchOptions::from_records(records.iter());

    println!("Resorts:");
    for resort in &options.resorts {
        println!("  {}", resort);
    }
    println!("Unit types:");
    for unit_type in &options.unit_types {
        println!("  {}", unit_type);
    }
    Ok(())
}

async fn run_draft(args: DraftArgs) -> Result<()> {
    let stay = parse_stay(&args.check_in, args.check_out.as_deref(), args.nights);
    let (check_in, check_out) = match stay {
        Ok(stay) => stay,
        Err(err) => {
            println!("⚠️  {}", err);
            return Ok(());
        }
    };

    let spans = load_spans(&args.client, args.bookings.as_deref()).await?;
    let Some(span) = spans
        .iter()
        .find(|span| span.availability_id == args.availability_id)
    else {
        println!("⚠️  {}", ValidationError::UnknownAvailability(args.availability_id));
        return Ok(());
    };

    if let Err(err) = validate_selection(span, check_in, check_out) {
        println!("⚠️  {}", err);
        return Ok(());
    }

    let draft = build_draft(span, check_in, check_out);
    if let Some(issue) = &draft.issue {
        warn!("Draft could not be priced: {}", issue);
    }
    println!("{}", serde_json::to_string_pretty(&draft)?);
    Ok(())
}
