//! slotbook - command-line client for the service booking API.
//!
//! Keeps the session in the OS keyring (or a local file) and renews it
//! transparently when the server rejects an expired token.

use std::io;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use slotbook_core::auth::{FileCredentialStore, KeyringCredentialStore};
use slotbook_core::config::CredentialStoreKind;
use slotbook_core::models::{Booking, LoginRequest, PageRequest, Service, ServiceQuery, User};
use slotbook_core::stores::{AuthStore, NotificationsStore};
use slotbook_core::utils::{
    format_date_time, format_phone, format_price, format_relative_time, truncate_string,
};
use slotbook_core::{ApiClient, Config, CredentialStore};

const USAGE: &str = "\
Usage: slotbook [--json] <command> [args]

Commands:
  login <email>         Log in (prompts for the password)
  logout                Forget the saved session
  profile               Show the logged-in user
  services [page]       List services
  search <query>        Search services
  bookings              List your bookings (received bookings for providers)
  cancel <booking-id>   Cancel a booking
  notifications         List provider notifications
  read <id>             Mark a notification as read
";

/// Column width for descriptions in list output
const DESCRIPTION_WIDTH: usize = 60;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // RUST_LOG overrides the level, e.g. RUST_LOG=slotbook_core=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let json = match args.iter().position(|a| a == "--json") {
        Some(i) => {
            args.remove(i);
            true
        }
        None => false,
    };
    let Some(command) = args.first().cloned() else {
        eprint!("{}", USAGE);
        return Ok(());
    };
    let rest = &args[1..];

    let config = Config::load()?;
    info!(api_url = %config.base_url(), mode = ?config.credential_mode, "slotbook starting");
    let client = ApiClient::new(&config, credential_store(&config)?)?;
    let out = Output { json };

    match command.as_str() {
        "login" => login(&client, rest, &out).await,
        "logout" => {
            AuthStore::new(client).logout().await?;
            println!("Logged out.");
            Ok(())
        }
        "profile" => profile(&client, &out).await,
        "services" => services(&client, rest, &out).await,
        "search" => search(&client, rest, &out).await,
        "bookings" => bookings(&client, &out).await,
        "cancel" => cancel(&client, rest, &out).await,
        "notifications" => notifications(&client, &out).await,
        "read" => {
            let id = required(rest, "notification id")?;
            let store = NotificationsStore::new(client);
            store.mark_as_read(id).await?;
            println!("Notification {} marked as read.", id);
            Ok(())
        }
        "help" | "-h" | "--help" => {
            print!("{}", USAGE);
            Ok(())
        }
        other => bail!("Unknown command '{}'\n\n{}", other, USAGE),
    }
}

fn credential_store(config: &Config) -> Result<Arc<dyn CredentialStore>> {
    Ok(match config.credential_store {
        CredentialStoreKind::Keyring => Arc::new(KeyringCredentialStore::new()),
        CredentialStoreKind::File => Arc::new(FileCredentialStore::new(config.data_dir()?)),
    })
}

fn required<'a>(args: &'a [String], what: &str) -> Result<&'a str> {
    args.first()
        .map(String::as_str)
        .with_context(|| format!("missing {}\n\n{}", what, USAGE))
}

struct Output {
    json: bool,
}

impl Output {
    /// Print `value` as JSON in `--json` mode, otherwise run `human`.
    fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}

async fn login(client: &ApiClient, args: &[String], out: &Output) -> Result<()> {
    let email = required(args, "email")?.to_string();
    let password = rpassword::prompt_password(format!("Password for {}: ", email))
        .context("Failed to read password")?;

    let store = AuthStore::new(client.clone());
    let user = store
        .login(&LoginRequest { email, password })
        .await
        .context("Login failed")?;
    out.emit(&user, |u| println!("Logged in as {} ({:?}).", u.name, u.role))
}

async fn profile(client: &ApiClient, out: &Output) -> Result<()> {
    let store = AuthStore::new(client.clone());
    store.load_user().await;
    let state = store.snapshot();
    let Some(user) = state.current_user() else {
        bail!("Not logged in. Run `slotbook login <email>` first.");
    };
    out.emit(user, print_user)
}

fn print_user(user: &User) {
    println!("{}", user.name);
    println!("  Email:  {}", user.email);
    println!("  Phone:  {}", format_phone(&user.phone));
    println!("  Role:   {:?}", user.role);
    println!("  Since:  {}", format_date_time(&user.created_at.to_rfc3339()));
}

async fn services(client: &ApiClient, args: &[String], out: &Output) -> Result<()> {
    let page = match args.first() {
        Some(p) => p.parse().with_context(|| format!("invalid page '{}'", p))?,
        None => 1,
    };
    let query = ServiceQuery {
        page: Some(PageRequest::new(page, PageRequest::default().limit)),
        ..ServiceQuery::default()
    };
    let result = client.get_services(&query).await?;
    out.emit(&result, |r| {
        print_services(&r.data);
        println!(
            "Page {} of {} ({} services)",
            r.pagination.page, r.pagination.total_pages, r.pagination.total
        );
    })
}

async fn search(client: &ApiClient, args: &[String], out: &Output) -> Result<()> {
    if args.is_empty() {
        bail!("missing search query\n\n{}", USAGE);
    }
    let query = args.join(" ");
    let result = client.search_services(&query, PageRequest::default()).await?;
    out.emit(&result, |r| {
        if r.data.is_empty() {
            println!("No services match '{}'.", query);
        } else {
            print_services(&r.data);
        }
    })
}

fn print_services(services: &[Service]) {
    for service in services {
        let from = service
            .cheapest_variation()
            .and_then(|v| v.price_value())
            .map(|p| format!("from {}", format_price(p)))
            .unwrap_or_default();
        println!("{}  {} [{}] {}", service.id, service.name, service.category, from);
        println!("    {}", truncate_string(&service.description, DESCRIPTION_WIDTH));
    }
}

async fn bookings(client: &ApiClient, out: &Output) -> Result<()> {
    let store = AuthStore::new(client.clone());
    store.load_user().await;
    let state = store.snapshot();
    if !state.is_authenticated() {
        bail!("Not logged in. Run `slotbook login <email>` first.");
    }

    let page = if state.is_provider() {
        debug!("Listing bookings received by provider");
        client.get_provider_bookings(PageRequest::default()).await?
    } else {
        client.get_my_bookings(PageRequest::default()).await?
    };
    out.emit(&page, |p| {
        if p.data.is_empty() {
            println!("No bookings.");
        }
        for booking in &p.data {
            print_booking(booking);
        }
    })
}

fn print_booking(booking: &Booking) {
    let variation = booking
        .service_variation
        .as_ref()
        .map(|v| v.name.as_str())
        .unwrap_or("-");
    let price = booking
        .final_price
        .trim()
        .parse::<f64>()
        .map(format_price)
        .unwrap_or_else(|_| booking.final_price.clone());
    println!(
        "{}  {}  {}  {}  {}",
        booking.id,
        format_date_time(&booking.start_time.to_rfc3339()),
        booking.status.display_name(),
        variation,
        price
    );
}

async fn cancel(client: &ApiClient, args: &[String], out: &Output) -> Result<()> {
    let id = required(args, "booking id")?;
    let booking = client.cancel_booking(id).await?;
    out.emit(&booking, |b| {
        println!("Booking {} is now {}.", b.id, b.status.display_name())
    })
}

async fn notifications(client: &ApiClient, out: &Output) -> Result<()> {
    let store = NotificationsStore::new(client.clone());
    store.fetch().await;
    let state = store.snapshot();
    if let Some(error) = &state.error {
        bail!("Failed to load notifications: {}", error);
    }
    out.emit(&state.notifications, |list| {
        println!("{} unread", state.unread_count);
        for n in list {
            let marker = if n.read { ' ' } else { '*' };
            println!(
                "{} {}  {}  ({})",
                marker,
                n.id,
                n.title,
                format_relative_time(&n.created_at.to_rfc3339())
            );
            println!("    {}", n.message);
        }
    })
}
