//! DocAssist CLI
//!
//! Command-line front-end for the DocAssist clinic service:
//! - Register and log in as a patient or doctor
//! - Describe symptoms, review the triage and book a doctor
//! - Review and cancel appointments
//! - Work the doctor's patient queue

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use docassist::backend::{DoctorRegistration, PatientRegistration};
use docassist::config::{generate_default_config, Config, LoggingConfig};
use docassist::{
    AssumeYes, AuthService, BackendClient, BigDataCloudGeocoder, BookingOutcome, BookingRecord,
    CancelOutcome, Confirm, Coordinates, DoctorCandidate, DoctorDashboard, FixedPosition,
    FlowError, Geolocator, IntakeForm, NoGeolocation, ReverseGeocoder, Role, Session,
    SessionStore, TriageFlow, TriageResult, Urgency,
};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "docassist")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Symptom triage and appointment booking")]
#[command(long_about = "DocAssist analyzes your symptoms, finds a matching specialist nearby\nand books the visit for you.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend API URL, including the /api prefix
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Output format for listings
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account
    Register {
        #[command(subcommand)]
        account: RegisterCommand,
    },

    /// Log in and remember the session
    Login {
        /// patient or doctor
        role: Role,
        /// Email (patients) or username (doctors)
        user: String,
        #[arg(short, long)]
        password: String,
    },

    /// Forget the saved session
    Logout,

    /// Show who is logged in
    Whoami,

    /// Describe symptoms, pick a doctor and book
    Triage {
        /// Symptom description
        #[arg(short, long)]
        description: String,
        /// City (default: detected or remembered city)
        #[arg(short, long)]
        city: Option<String>,
        /// Detect the city from the configured device position
        #[arg(long)]
        gps: bool,
        /// Book the Nth doctor without asking
        #[arg(long)]
        book: Option<usize>,
    },

    /// List your appointments
    History,

    /// Cancel one of your appointments
    Cancel {
        id: i64,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Doctor: show the patient queue
    Queue,

    /// Doctor: accept a pending request
    Approve { id: i64 },

    /// Doctor: cancel an appointment in the queue
    QueueCancel {
        id: i64,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Detect the current city
    Locate {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum RegisterCommand {
    Patient {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        age: u32,
    },
    Doctor {
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        city: String,
        /// e.g. Cardiologist
        #[arg(long)]
        specialty: String,
        /// Hospital or clinic name
        #[arg(long)]
        hospital: String,
        /// Street address, used for the maps link
        #[arg(long)]
        address: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match Config::load_with_env(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        },
        None => Config::load_default(),
    };
    if let Some(url) = &cli.backend_url {
        config.backend.base_url = url.clone();
    }

    init_logging(&config.logging);

    if let Err(e) = run(cli, config).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("docassist={}", config.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let store = SessionStore::new(config.session_path());

    match cli.command {
        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }

        Commands::Whoami => match store.load()?.identity() {
            Some(identity) => {
                println!("{} ({}, id {})", identity.name, identity.role, identity.id);
                if let Some(city) = &identity.city {
                    println!("City: {}", city);
                }
                if let Some(hospital) = &identity.hospital_name {
                    println!("Clinic: {}", hospital);
                }
            }
            None => println!("Not logged in."),
        },

        Commands::Logout => {
            if store.clear()? {
                println!("Logged out.");
            } else {
                println!("Not logged in.");
            }
        }

        Commands::Locate { lat, lon } => {
            let locator: Arc<dyn Geolocator> = match (lat, lon) {
                (Some(lat), Some(lon)) => Arc::new(FixedPosition(Coordinates::new(lat, lon))),
                _ => device_locator(&config),
            };
            let flow = TriageFlow::new(Arc::new(backend(&config)?), store.load()?)
                .with_geolocation(locator, geocoder(&config));

            match flow.detect_location().await {
                Some(fix) => {
                    println!("Position: {:.4}, {:.4}", fix.coordinates.lat, fix.coordinates.lon);
                    match fix.city {
                        Some(city) => println!("City: {}", city),
                        None => println!("City: unknown"),
                    }
                }
                None => {
                    println!("No device position available.");
                    println!("Set [location] latitude/longitude in the config or pass --lat/--lon.");
                }
            }
        }

        Commands::Register { account } => {
            let auth = AuthService::new(backend(&config)?, store);
            match account {
                RegisterCommand::Patient {
                    name,
                    email,
                    password,
                    city,
                    age,
                } => {
                    auth.register_patient(&PatientRegistration {
                        name,
                        email,
                        password,
                        city,
                        age,
                    })
                    .await?;
                }
                RegisterCommand::Doctor {
                    name,
                    username,
                    password,
                    city,
                    specialty,
                    hospital,
                    address,
                } => {
                    auth.register_doctor(&DoctorRegistration::new(
                        name, username, password, city, specialty, hospital, address,
                    ))
                    .await?;
                }
            }
            println!("Registration successful! Please log in.");
        }

        Commands::Login {
            role,
            user,
            password,
        } => {
            let auth = AuthService::new(backend(&config)?, store);
            let session = auth.login(role, &user, &password).await?;
            if let Some(identity) = session.identity() {
                println!("Welcome, {}", identity.name);
            }
        }

        Commands::Triage {
            description,
            city,
            gps,
            book,
        } => {
            let session = store.load()?;
            let mut flow = TriageFlow::new(Arc::new(backend(&config)?), session);
            if gps {
                flow = flow.with_geolocation(device_locator(&config), geocoder(&config));
                if let Some(city) = flow.detect_location().await.and_then(|fix| fix.city) {
                    println!("Detected location: {}", city);
                }
            }

            let city = match city {
                Some(city) => city,
                None => flow.snapshot().await.form.city,
            };
            if city.trim().is_empty() {
                bail!("No city given. Pass --city or use --gps.");
            }

            println!("Analyzing...");
            flow.analyze(IntakeForm::new(city, description))
                .await
                .map_err(notice)?;

            let snapshot = flow.snapshot().await;
            if let Some(triage) = &snapshot.triage {
                print_triage(triage, snapshot.candidates.len());
            }
            print_candidates(&snapshot.candidates);

            if snapshot.candidates.is_empty() {
                return Ok(());
            }

            let choice = match book {
                Some(n) => Some(n),
                None => ask_choice(snapshot.candidates.len())?,
            };
            let Some(n) = choice else {
                return Ok(());
            };
            let candidate = snapshot
                .candidates
                .get(n.wrapping_sub(1))
                .ok_or_else(|| anyhow!("No doctor #{} in the list", n))?;

            let outcome = flow.book(candidate).await.map_err(notice)?;
            print_confirmation(&outcome);

            println!();
            print_history(&flow.snapshot().await.history, cli.format)?;
        }

        Commands::History => {
            let session = require_session(&store, Role::Patient)?;
            let flow = TriageFlow::new(Arc::new(backend(&config)?), session);
            flow.refresh_history().await.map_err(notice)?;
            print_history(&flow.snapshot().await.history, cli.format)?;
        }

        Commands::Cancel { id, yes } => {
            let session = require_session(&store, Role::Patient)?;
            let flow = TriageFlow::new(Arc::new(backend(&config)?), session);
            flow.refresh_history().await.map_err(notice)?;

            let outcome = flow.cancel(id, confirmer(yes).as_ref()).await.map_err(notice)?;
            match outcome {
                CancelOutcome::Cancelled => println!("Appointment {} cancelled.", id),
                CancelOutcome::Declined => println!("Kept appointment {}.", id),
            }
        }

        Commands::Queue => {
            let dashboard = DoctorDashboard::new(
                Arc::new(backend(&config)?),
                require_session(&store, Role::Doctor)?,
            );
            dashboard.refresh().await.map_err(notice)?;
            println!("{}", dashboard.hospital_name());
            println!(
                "{} total, {} awaiting approval",
                dashboard.appointments().await.len(),
                dashboard.pending_count().await
            );
            println!();
            print_history(&dashboard.appointments().await, cli.format)?;
        }

        Commands::Approve { id } => {
            let dashboard = DoctorDashboard::new(
                Arc::new(backend(&config)?),
                require_session(&store, Role::Doctor)?,
            );
            dashboard.approve(id).await.map_err(notice)?;
            println!("Appointment {} confirmed.", id);
        }

        Commands::QueueCancel { id, yes } => {
            let dashboard = DoctorDashboard::new(
                Arc::new(backend(&config)?),
                require_session(&store, Role::Doctor)?,
            );
            let outcome = dashboard
                .cancel(id, confirmer(yes).as_ref())
                .await
                .map_err(notice)?;
            match outcome {
                CancelOutcome::Cancelled => println!("Appointment {} cancelled.", id),
                CancelOutcome::Declined => println!("Kept appointment {}.", id),
            }
        }
    }

    Ok(())
}

fn backend(config: &Config) -> anyhow::Result<BackendClient> {
    BackendClient::new(&config.backend).context("Failed to create HTTP client")
}

fn device_locator(config: &Config) -> Arc<dyn Geolocator> {
    match FixedPosition::from_config(&config.location) {
        Some(position) => Arc::new(position),
        None => Arc::new(NoGeolocation),
    }
}

fn geocoder(config: &Config) -> Option<Arc<dyn ReverseGeocoder>> {
    if !config.geocoding.enabled {
        return None;
    }
    match BigDataCloudGeocoder::new(&config.geocoding) {
        Ok(geocoder) => Some(Arc::new(geocoder)),
        Err(e) => {
            tracing::warn!(error = %e, "Reverse geocoding disabled");
            None
        }
    }
}

/// Saved session, which must belong to `role`
fn require_session(store: &SessionStore, role: Role) -> anyhow::Result<Session> {
    let session = store.load()?;
    if session.identity().map(|i| i.role) != Some(role) {
        bail!("{}", FlowError::Unauthenticated);
    }
    Ok(session)
}

/// Flow errors become one-line notices
fn notice(err: FlowError) -> anyhow::Error {
    anyhow!(err.user_message())
}

fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(|prompt: &str| ask_yes_no(prompt).unwrap_or(false))
    }
}

fn read_line(question: &str) -> io::Result<String> {
    print!("{} ", question);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn ask_yes_no(question: &str) -> io::Result<bool> {
    let answer = read_line(&format!("{} [y/N]", question))?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn ask_choice(count: usize) -> anyhow::Result<Option<usize>> {
    let answer = read_line(&format!("Book which doctor? [1-{}, blank to skip]", count))?;
    if answer.is_empty() {
        return Ok(None);
    }
    let n = answer
        .parse::<usize>()
        .with_context(|| format!("Not a number: {}", answer))?;
    Ok(Some(n))
}

fn print_triage(triage: &TriageResult, count: usize) {
    let marker = if triage.urgency == Urgency::High { "!!" } else { "--" };
    println!();
    println!("{} {} Urgency {}", marker, triage.urgency, marker);
    println!("{}", triage.summary);
    if let Some(reasoning) = &triage.reasoning {
        println!("Why: {}", reasoning);
    }
    if let Some(advice) = &triage.care_advice {
        println!("Care advice: {}", advice);
    }
    println!();
    println!("Nearby {}s ({}):", triage.recommended_specialist, count);
}

fn print_candidates(candidates: &[DoctorCandidate]) {
    if candidates.is_empty() {
        println!("No doctors found.");
        return;
    }

    println!(
        "{:<3} {:<24} {:<28} {:<6} {:<14} {}",
        "#", "Doctor", "Hospital", "Rating", "Action", "Address"
    );
    println!("{}", "-".repeat(100));

    for (i, doc) in candidates.iter().enumerate() {
        println!(
            "{:<3} {:<24} {:<28} {:<6.1} {:<14} {}",
            i + 1,
            doc.name,
            doc.hospital_name,
            doc.rating,
            doc.booking_action(),
            doc.address
        );
        if !doc.google_maps_link.is_empty() {
            println!("    {}", doc.google_maps_link);
        }
    }
}

fn print_confirmation(outcome: &BookingOutcome) {
    let record = &outcome.record;
    println!();
    match record.status {
        docassist::AppointmentStatus::Confirmed => {
            println!("Booking Confirmed!");
            println!("Status: CONFIRMED");
        }
        docassist::AppointmentStatus::Pending => {
            println!("Request Sent");
            println!("Status: PENDING - waiting for hospital approval.");
        }
    }
    println!(
        "Appointment #{} at {}",
        record.id,
        record.appointment_time.format("%Y-%m-%d %H:%M")
    );

    if let Some(creds) = &outcome.demo_credentials {
        println!();
        println!("[DEMO] New doctor account created");
        println!("  User: {}", creds.username);
        println!("  Pass: {}", creds.password);
    }
}

/// Flat row for table and CSV output
#[derive(Serialize)]
struct AppointmentRow {
    id: i64,
    date: String,
    time: String,
    status: String,
    doctor: String,
    patient: String,
    urgency: String,
    clinic_address: String,
}

impl From<&BookingRecord> for AppointmentRow {
    fn from(apt: &BookingRecord) -> Self {
        Self {
            id: apt.id,
            date: apt.appointment_time.format("%Y-%m-%d").to_string(),
            time: apt.appointment_time.format("%H:%M").to_string(),
            status: apt.status.to_string(),
            doctor: apt.doctor_name.clone().unwrap_or_default(),
            patient: apt.patient_name.clone().unwrap_or_default(),
            urgency: apt.urgency.map(|u| u.to_string()).unwrap_or_default(),
            clinic_address: apt.clinic_address.clone().unwrap_or_default(),
        }
    }
}

fn print_history(appointments: &[BookingRecord], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(appointments)?);
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(io::stdout());
            for apt in appointments {
                writer.serialize(AppointmentRow::from(apt))?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => {
            if appointments.is_empty() {
                println!("No history.");
                return Ok(());
            }

            println!(
                "{:<6} {:<11} {:<6} {:<10} {:<22} {:<8} {}",
                "ID", "Date", "Time", "Status", "With", "Urgency", "Address"
            );
            println!("{}", "-".repeat(90));

            for apt in appointments {
                let row = AppointmentRow::from(apt);
                let with = if row.doctor.is_empty() { &row.patient } else { &row.doctor };
                println!(
                    "{:<6} {:<11} {:<6} {:<10} {:<22} {:<8} {}",
                    row.id,
                    row.date,
                    row.time,
                    row.status,
                    if with.is_empty() { "Unknown" } else { with },
                    if row.urgency.is_empty() { "-" } else { &row.urgency },
                    row.clinic_address
                );
            }
        }
    }
    Ok(())
}
