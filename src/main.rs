use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokio::sync::broadcast;

use qrmenu_admin::auth::{SessionEvent, SessionEvents, SessionStore, TokenJar};
use qrmenu_admin::config::{AppConfig, ConfigError};
use qrmenu_admin::net::types::{CategoryForm, LoginRequest, MenuForm, ProductForm, RegisterRequest};
use qrmenu_admin::services::upload::ImageUploader;
use qrmenu_admin::services::{auth, category, menu, product};
use qrmenu_admin::{ApiClient, ApiError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("image upload is not configured; set QRMENU_UPLOAD_PRESET and QRMENU_UPLOAD_CLOUD_NAME")]
    UploadNotConfigured,
    #[error("not logged in; run `qrmenu-admin login`")]
    NotLoggedIn,
    #[error("failed to encode output: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "qrmenu-admin", about = "QR menu dashboard admin CLI")]
struct Cli {
    /// Overrides `QRMENU_API_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    #[arg(long, env = "QRMENU_LANGUAGE", default_value = "tr", global = true)]
    language: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "QRMENU_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "QRMENU_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        full_name: Option<String>,
    },
    Logout,
    Whoami {
        /// Ask the backend instead of reading the local session.
        #[arg(long, default_value_t = false)]
        remote: bool,
    },
    /// Exchange the stored refresh token for a new access token.
    Refresh,
    Menu(MenuCommand),
    Category(CategoryCommand),
    Product(ProductCommand),
    /// Upload an image and print its hosted URL.
    Upload {
        path: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
struct EntityArgs {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    image_url: String,
    /// Local image to upload; its URL replaces `--image-url`.
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct MenuCommand {
    #[command(subcommand)]
    command: MenuSubcommand,
}

#[derive(Subcommand, Debug)]
enum MenuSubcommand {
    List,
    Create(EntityArgs),
    Delete { menu_id: String },
}

#[derive(Args, Debug)]
struct CategoryCommand {
    #[command(subcommand)]
    command: CategorySubcommand,
}

#[derive(Subcommand, Debug)]
enum CategorySubcommand {
    List {
        menu_id: String,
    },
    Create {
        #[arg(long, default_value = "")]
        menu_id: String,
        #[command(flatten)]
        entity: EntityArgs,
    },
    Delete {
        category_id: String,
    },
}

#[derive(Args, Debug)]
struct ProductCommand {
    #[command(subcommand)]
    command: ProductSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProductSubcommand {
    List {
        category_id: String,
    },
    Create {
        #[arg(long, default_value = "")]
        category_id: String,
        #[arg(long)]
        price: Option<f64>,
        #[command(flatten)]
        entity: EntityArgs,
    },
    Delete {
        product_id: String,
    },
}

struct CliContext {
    config: AppConfig,
    api: ApiClient,
    store: Arc<SessionStore>,
    language: String,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("warning: failed to load .env: {e}");
        }
    }
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url)?;
    }

    let jar = Arc::new(TokenJar::open(config.cookie_file()));
    let store = Arc::new(SessionStore::open(Arc::clone(&jar), config.session_file()));
    let api = ApiClient::from_config(&config, jar, SessionEvents::new())?;
    let _listener = store.spawn_logout_listener(api.events());
    let mut events = api.events().subscribe();

    let ctx = CliContext { config, api, store, language: cli.language };
    let result = run(&ctx, cli.command).await;

    if matches!(result, Err(CliError::Api(ApiError::AuthExpired))) {
        wait_for_login_prompt(&mut events, &ctx.config).await;
    }
    result
}

async fn run(ctx: &CliContext, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { email, password } => {
            let session = auth::sign_in(&ctx.api, &ctx.store, &LoginRequest { email, password }).await?;
            println!("logged in as {} ({})", session.email, session.user_id);
            Ok(())
        }
        Command::Register { email, password, full_name } => {
            let request = RegisterRequest { email, password, full_name };
            let session = auth::sign_up(&ctx.api, &ctx.store, &request).await?;
            println!("registered {} ({})", session.email, session.user_id);
            Ok(())
        }
        Command::Logout => {
            ctx.store.logout();
            println!("logged out");
            Ok(())
        }
        Command::Whoami { remote } => {
            if remote {
                return print_json(&auth::current_user(&ctx.api).await?);
            }
            let session = ctx.store.current().ok_or(CliError::NotLoggedIn)?;
            println!("{} ({})", session.email, session.user_id);
            Ok(())
        }
        Command::Refresh => {
            auth::refresh(&ctx.api).await?;
            println!("access token refreshed");
            Ok(())
        }
        Command::Menu(command) => run_menu(ctx, command).await,
        Command::Category(command) => run_category(ctx, command).await,
        Command::Product(command) => run_product(ctx, command).await,
        Command::Upload { path } => {
            let url = upload_image(ctx, &path).await?;
            println!("{url}");
            Ok(())
        }
    }
}

async fn run_menu(ctx: &CliContext, command: MenuCommand) -> Result<(), CliError> {
    match command.command {
        MenuSubcommand::List => print_json(&menu::list_menus(&ctx.api, &ctx.language).await?),
        MenuSubcommand::Create(entity) => {
            let form = MenuForm {
                image_url: resolve_image_url(ctx, &entity).await?,
                title: entity.title,
                description: entity.description,
                language: ctx.language.clone(),
            };
            print_json(&menu::create_menu(&ctx.api, &form).await?)
        }
        MenuSubcommand::Delete { menu_id } => print_json(&menu::delete_menu(&ctx.api, &menu_id).await?),
    }
}

async fn run_category(ctx: &CliContext, command: CategoryCommand) -> Result<(), CliError> {
    match command.command {
        CategorySubcommand::List { menu_id } => {
            print_json(&category::list_categories(&ctx.api, &menu_id, &ctx.language).await?)
        }
        CategorySubcommand::Create { menu_id, entity } => {
            let form = CategoryForm {
                menu_id,
                image_url: resolve_image_url(ctx, &entity).await?,
                title: entity.title,
                description: entity.description,
                language: ctx.language.clone(),
            };
            print_json(&category::create_category(&ctx.api, &form).await?)
        }
        CategorySubcommand::Delete { category_id } => {
            print_json(&category::delete_category(&ctx.api, &category_id).await?)
        }
    }
}

async fn run_product(ctx: &CliContext, command: ProductCommand) -> Result<(), CliError> {
    match command.command {
        ProductSubcommand::List { category_id } => {
            print_json(&product::list_products(&ctx.api, &category_id, &ctx.language).await?)
        }
        ProductSubcommand::Create { category_id, price, entity } => {
            let form = ProductForm {
                category_id,
                image_url: resolve_image_url(ctx, &entity).await?,
                title: entity.title,
                description: entity.description,
                language: ctx.language.clone(),
                price,
            };
            print_json(&product::create_product(&ctx.api, &form).await?)
        }
        ProductSubcommand::Delete { product_id } => print_json(&product::delete_product(&ctx.api, &product_id).await?),
    }
}

async fn resolve_image_url(ctx: &CliContext, entity: &EntityArgs) -> Result<String, CliError> {
    match &entity.image {
        Some(path) => upload_image(ctx, path).await,
        None => Ok(entity.image_url.clone()),
    }
}

async fn upload_image(ctx: &CliContext, path: &Path) -> Result<String, CliError> {
    let upload = ctx.config.upload.clone().ok_or(CliError::UploadNotConfigured)?;
    let uploader = ImageUploader::new(upload, ctx.config.timeouts)?;
    Ok(uploader.upload_file(path).await?)
}

/// Block until the client asks for a fresh login, then say so.
async fn wait_for_login_prompt(events: &mut broadcast::Receiver<SessionEvent>, config: &AppConfig) {
    let deadline = config.logout_redirect_delay * 2;
    loop {
        match tokio::time::timeout(deadline, events.recv()).await {
            Ok(Ok(SessionEvent::LoginRequired)) => {
                eprintln!("session expired; run `qrmenu-admin login` to sign in again");
                return;
            }
            Ok(Ok(SessionEvent::LoggedOut) | Err(broadcast::error::RecvError::Lagged(_))) => {}
            Ok(Err(broadcast::error::RecvError::Closed)) | Err(_) => return,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
