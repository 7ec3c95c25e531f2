use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use foodgram::config::Config;
use foodgram::domain::users::NewUser;
use foodgram::{build_app, cli, db};

#[derive(Parser)]
#[command(name = "foodgram", about = "Recipe sharing backend")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Create a user account.
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        password: String,
    },
    /// Create a tag.
    CreateTag {
        #[arg(long)]
        name: String,
        #[arg(long)]
        color: String,
        #[arg(long)]
        slug: Option<String>,
    },
    /// Import the ingredient catalog from a JSON file.
    ImportIngredients { file: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("foodgram=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    let pool = db::init_pool(&config.database_url).await?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let app = build_app(pool, config.secure_cookies).await?;
            let listener = TcpListener::bind(config.bind_addr).await?;

            tracing::info!("listening on {}", config.bind_addr);
            axum::serve(listener, app).await?;
        }
        Command::CreateUser {
            username,
            email,
            first_name,
            last_name,
            password,
        } => {
            let new = NewUser {
                email,
                username,
                first_name,
                last_name,
                password,
            };
            cli::create_user(&pool, new).await?;
        }
        Command::CreateTag { name, color, slug } => {
            cli::create_tag(&pool, &name, &color, slug.as_deref()).await?;
        }
        Command::ImportIngredients { file } => {
            cli::import_ingredients(&pool, &file).await?;
        }
    }

    Ok(())
}
