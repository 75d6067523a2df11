use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use storefront::auth::{Credentials, RegistrationForm, SessionManager};
use storefront::config::ClientConfig;
use storefront::error::{AuthAction, ClientError};
use storefront::http::ApiClient;
use storefront::products::{self, ImageUpload, ProductService, SortOrder};
use storefront::routes::{GuardDecision, RouteGuard};
use storefront::storage::{FileStore, SessionStore};
use storefront::validation::{validate_login, validate_registration};
use storefront_api::{Product, ProductDraft};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        // Si RUST_LOG n'est pas défini, utiliser ces règles par défaut
        tracing_subscriber::EnvFilter::new("info,storefront=debug,reqwest=warn")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[derive(Debug, Parser)]
#[command(name = "storefront", version, about = "Storefront API client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and keep the session on disk
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List products
    Products {
        #[arg(long)]
        category: Option<String>,
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
    },
    /// List the categories present in the catalog
    Categories,
    /// Show one product
    Product { id: i64 },
    /// Delete a product (admin)
    DeleteProduct { id: i64 },
    /// Create a product from a JSON file (admin)
    AddProduct {
        /// JSON product draft
        file: PathBuf,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Print the gating decision for a path
    Route { path: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    PriceAsc,
    PriceDesc,
}

impl From<SortArg> for SortOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::PriceAsc => SortOrder::Asc,
            SortArg::PriceDesc => SortOrder::Desc,
        }
    }
}

// ----------------- Main -----------------

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();

    let config = ClientConfig::from_env()?;
    let store = SessionStore::new(Arc::new(FileStore::new(&config.session_file)));
    let client = ApiClient::from_config(&config, store).context("Failed to build HTTP client")?;
    let catalog = ProductService::new(client.clone());
    let session = Arc::new(SessionManager::new(client));

    session.restore();
    if config.revalidate_on_startup
        && let Err(e) = session.revalidate().await
    {
        tracing::warn!(error = %e, "Could not revalidate stored session");
    }

    match cli.command {
        Command::Login { email, password } => {
            let credentials = Credentials::new(email, password);
            let user = match validate_login(&credentials).into_result() {
                Ok(()) => session.login(&credentials).await,
                Err(errors) => Err(errors.into()),
            }
            .map_err(|e| auth_failure(&e, AuthAction::Login))?;
            println!("Signed in as {} <{}>", user.name, user.email);
        }
        Command::Register {
            name,
            email,
            username,
            password,
            confirm_password,
        } => {
            let form = RegistrationForm {
                name,
                email,
                username,
                password,
                confirm_password,
            };
            let user = match validate_registration(&form).into_result() {
                Ok(()) => session.register(&form).await,
                Err(errors) => Err(errors.into()),
            }
            .map_err(|e| auth_failure(&e, AuthAction::Register))?;
            println!("Account created for {} <{}>", user.name, user.email);
        }
        Command::Logout => {
            session.logout();
            println!("Signed out");
        }
        Command::Whoami => match session.current_user() {
            Some(user) => {
                let role = user.role.as_ref().map_or("USER", |r| r.as_str());
                println!("{} <{}> ({role})", user.name, user.email);
            }
            None => println!("Not signed in"),
        },
        Command::Products { category, sort } => {
            let all = catalog.list().await.map_err(product_failure)?;
            let mut listed = products::filter_by_category(&all, category.as_deref().unwrap_or(""));
            if let Some(sort) = sort {
                products::sort_by_price(&mut listed, sort.into());
            }
            for product in listed {
                print_product_line(product);
            }
        }
        Command::Categories => {
            let all = catalog.list().await.map_err(product_failure)?;
            for category in products::categories(&all) {
                println!("{category}");
            }
        }
        Command::Product { id } => {
            let product = catalog.get(id).await.map_err(product_failure)?;
            println!("{}", serde_json::to_string_pretty(&product)?);
            if product.has_image() {
                println!("image: {}", catalog.image_url(id));
            }
        }
        Command::DeleteProduct { id } => {
            catalog.delete(id).await.map_err(product_failure)?;
            println!("Product {id} deleted");
        }
        Command::AddProduct { file, image } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Cannot read {}", file.display()))?;
            let draft: ProductDraft = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid product JSON in {}", file.display()))?;
            let created = match image {
                Some(path) => {
                    let upload = ImageUpload::from_path(&path)
                        .with_context(|| format!("Cannot read image {}", path.display()))?;
                    catalog.create_with_image(&draft, upload).await
                }
                None => catalog.create(&draft).await,
            }
            .map_err(product_failure)?;
            println!("Product {} created", created.id);
        }
        Command::Route { path } => {
            let guard = RouteGuard::new(session.clone());
            match guard.check_path(&path) {
                GuardDecision::Loading => println!("loading"),
                GuardDecision::Redirect(target) => println!("redirect {target}"),
                GuardDecision::Render(route) => println!("render {route}"),
            }
        }
    }

    Ok(())
}

fn print_product_line(product: &Product) {
    let stock = if product.available { "" } else { " (out of stock)" };
    println!(
        "#{:<5} {:<30} {:>10.2}  {}{stock}",
        product.id, product.name, product.price, product.category
    );
}

fn auth_failure(error: &ClientError, action: AuthAction) -> anyhow::Error {
    tracing::debug!(error = %error, "Authentication command failed");
    anyhow::anyhow!(error.auth_message(action))
}

fn product_failure(error: ClientError) -> anyhow::Error {
    if error.is_unauthorized() {
        return anyhow::anyhow!("{} (admin session required)", error.user_message());
    }
    anyhow::anyhow!(error.user_message())
}
