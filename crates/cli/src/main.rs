use clap::{Args, Parser, Subcommand};
use patient_core::pb::{PatientRequest, PatientResponse};
use patient_core::{store_from_env_value, CoreConfig, PatientId, PatientService};

#[derive(Parser)]
#[command(name = "patients")]
#[command(about = "Patient record service CLI")]
struct Cli {
    /// `memory`, or a SQLite database path
    #[arg(long, env = "PATIENT_STORE", global = true)]
    store: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all patients
    List,
    /// Show one patient
    Get {
        /// Patient UUID
        id: String,
    },
    /// Register a new patient
    Create {
        #[command(flatten)]
        fields: PatientFields,
        /// Registration date (YYYY-MM-DD)
        #[arg(long)]
        registered_date: Option<String>,
    },
    /// Replace a patient's details
    Update {
        /// Patient UUID
        id: String,
        #[command(flatten)]
        fields: PatientFields,
    },
    /// Delete a patient (no error if absent)
    Delete {
        /// Patient UUID
        id: String,
    },
}

/// Patient fields shared by `create` and `update`.
///
/// All are optional so that missing values are reported by validation, not by clap.
#[derive(Args)]
struct PatientFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    address: Option<String>,
    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    date_of_birth: Option<String>,
}

impl PatientFields {
    fn into_request(self, registered_date: Option<String>) -> PatientRequest {
        PatientRequest {
            name: self.name,
            email: self.email,
            address: self.address,
            date_of_birth: self.date_of_birth,
            registered_date,
        }
    }
}

fn print_patient(patient: &PatientResponse) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(patient)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = CoreConfig::new(store_from_env_value(cli.store)?);
    let service = PatientService::from_config(&cfg)?;

    match cli.command {
        Commands::List => {
            let patients = service.list_patients()?;
            if patients.is_empty() {
                println!("No patients found.");
            } else {
                for patient in patients {
                    println!(
                        "ID: {}, Name: {}, Email: {}, Born: {}",
                        patient.id, patient.name, patient.email, patient.date_of_birth
                    );
                }
            }
        }
        Commands::Get { id } => {
            let patient = service.get_patient(PatientId::parse(&id)?)?;
            print_patient(&patient)?;
        }
        Commands::Create {
            fields,
            registered_date,
        } => {
            let patient = service.create_patient(&fields.into_request(registered_date))?;
            print_patient(&patient)?;
        }
        Commands::Update { id, fields } => {
            let id = PatientId::parse(&id)?;
            let patient = service.update_patient(id, &fields.into_request(None))?;
            print_patient(&patient)?;
        }
        Commands::Delete { id } => {
            let id = PatientId::parse(&id)?;
            service.delete_patient(id)?;
            println!("Deleted patient {id}");
        }
    }

    Ok(())
}
