use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use homefax_client::api::ApiClient;
use homefax_client::config;
use homefax_client::errors::ResultExt;
use homefax_client::models::{PaymentMethod, PropertyFilter, RegisterRequest};
use homefax_client::navigation::RecordingNavigator;
use homefax_client::onboarding::{AuthFlow, OnboardingStep};
use homefax_client::payment::{CardDetails, PaymentProcessor};
use homefax_client::session::{JsonFileStore, Session};
use homefax_client::views::{PropertyDetailsView, PropertyListView};
use homefax_client::wallet::{BasenameRegistrar, InMemoryBasenameDirectory};

#[derive(Parser)]
#[command(name = "homefax")]
#[command(about = "HomeFax - property history reports from the command line", long_about = None)]
#[command(version)]
struct Cli {
    /// Session file (overrides HOMEFAX_SESSION_FILE)
    #[arg(short, long)]
    session: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List properties
    Properties {
        /// Matches address, city or zip code
        #[arg(long)]
        search: Option<String>,

        /// Exact state code, e.g. CA
        #[arg(long)]
        state: Option<String>,
    },

    /// Show one property with its reports
    Property {
        id: String,
    },

    /// List reports for a property
    Reports {
        property_id: String,
    },

    /// Print a report's content
    Content {
        report_id: String,
    },

    /// Buy a report listed on a property
    Purchase {
        property_id: String,
        report_id: String,

        #[arg(short, long, value_enum, default_value_t = MethodArg::Card)]
        method: MethodArg,

        /// Card number for card payments
        #[arg(long)]
        card: Option<String>,
    },

    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        #[arg(short, long)]
        name: Option<String>,
    },

    /// Forget the stored token
    Logout,

    /// Create or reconnect a smart wallet, optionally claiming a basename
    Wallet {
        #[arg(short, long)]
        basename: Option<String>,
    },

    /// Show the on-chain record of a property
    Chain {
        property_id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    ApplePay,
    Card,
    Crypto,
}

impl From<MethodArg> for PaymentMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::ApplePay => PaymentMethod::ApplePay,
            MethodArg::Card => PaymentMethod::Card,
            MethodArg::Crypto => PaymentMethod::Crypto,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "homefax_client=debug,homefax=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = config::get();

    let session = match cli.session.as_ref().or(config.session_file.as_ref()) {
        Some(path) => Session::new(Arc::new(JsonFileStore::open(path)?)),
        None => Session::in_memory(),
    };

    let api = ApiClient::from_config(config, session.clone())?;
    tracing::info!("Using {} data source", api.source_name());

    match cli.command {
        Commands::Properties { search, state } => {
            let filter = PropertyFilter {
                search,
                state,
                ..Default::default()
            };
            let view = PropertyListView::new(api);
            let page = view.load(&filter).await?;
            print_json(&page)?;
        }

        Commands::Property { id } => {
            let view = PropertyDetailsView::new(api);
            if view.load(&id).await.is_err() {
                if let Some(message) = view.error() {
                    anyhow::bail!(message);
                }
            }
            if let Some(details) = view.state().value() {
                print_json(&details.property)?;
                print_json(&details.reports)?;
            }
        }

        Commands::Reports { property_id } => {
            let reports = api.reports().get_by_property_id(&property_id).await?;
            print_json(&reports)?;
        }

        Commands::Content { report_id } => {
            let content = api
                .reports()
                .get_content(&report_id)
                .await
                .context("Failed to load report content")?;
            println!("{}", content.content);
        }

        Commands::Purchase {
            property_id,
            report_id,
            method,
            card,
        } => {
            let view = PropertyDetailsView::new(api);
            view.load(&property_id).await?;

            let mut processor = PaymentProcessor::new(config.mock_latency);
            if matches!(method, MethodArg::Crypto) {
                processor.connect_wallet(session.wallet_address())?;
            }
            let card = card.map(|card_number| CardDetails {
                card_number,
                ..Default::default()
            });
            let payment = processor.process(method.into(), card.as_ref()).await?;
            let record = view.purchase(&report_id, &payment).await?;
            print_json(&record)?;
        }

        Commands::Login { email, password } => {
            let auth = api.auth().login(&email, &password).await?;
            print_json(&auth.user)?;
        }

        Commands::Register {
            email,
            password,
            name,
        } => {
            let request = RegisterRequest {
                email,
                password,
                name,
            };
            let auth = api.auth().register(&request).await?;
            print_json(&auth.user)?;
        }

        Commands::Logout => {
            api.auth().logout()?;
        }

        Commands::Wallet { basename } => {
            let navigator = Arc::new(RecordingNavigator::new());
            let mut flow = AuthFlow::new(api, navigator.clone(), config.redirect_delay);
            flow.start_wallet_auth();

            let step = match flow.resume_saved_wallet().await? {
                Some(step) => step,
                None => flow.create_wallet().await?,
            };
            let address = flow.wallet_address().unwrap_or_default().to_string();
            println!("Wallet: {}", address);

            if step == OnboardingStep::Basename {
                match basename {
                    Some(raw) => {
                        let mut registrar = BasenameRegistrar::new(
                            address,
                            session.clone(),
                            Arc::new(InMemoryBasenameDirectory::default()),
                            config.mock_latency,
                        );
                        registrar.set_input(&raw);
                        registrar.check_availability().await?;
                        flow.register_basename(&mut registrar).await?;
                    }
                    None => println!("Run again with --basename <name> to finish onboarding"),
                }
            }

            if let Some(name) = flow.basename() {
                println!("Basename: {}.base", name);
            }
            if let Some(route) = navigator.current() {
                println!("Next: {}", route);
            }
        }

        Commands::Chain { property_id } => {
            let record = api.blockchain().get_property(&property_id).await?;
            print_json(&record)?;
        }
    }

    Ok(())
}
