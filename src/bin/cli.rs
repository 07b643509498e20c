use clap::{Parser, Subcommand};
use place_backend::{
    config::AppConfig,
    db,
    repositories::user_repository::SqliteUserRepository,
    services::user_service::{RegisterRequest, UserService},
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "place-cli")]
#[command(about = "Administer Place API users", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a new user
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,

        /// Avatar reference; the placeholder avatar when omitted
        #[arg(long)]
        avatar_uri: Option<String>,
    },

    /// List users
    List {
        /// Maximum number of users to display
        #[arg(short, long, default_value_t = 100)]
        limit: i64,

        /// Offset for pagination
        #[arg(short = 'o', long, default_value_t = 0)]
        offset: i64,
    },

    /// Delete a user along with their comments and favorites
    Delete {
        #[arg(short, long)]
        email: String,
    },

    /// Set a new password without the old one
    SetPassword {
        #[arg(short, long)]
        email: String,

        /// New password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
}

fn get_password(prompt: &str) -> anyhow::Result<String> {
    use std::io::{self, Write};
    print!("{}: ", prompt);
    io::stdout().flush()?;

    Ok(rpassword::read_password()?)
}

fn password_or_prompt(password: Option<String>, prompt: &str) -> anyhow::Result<String> {
    if let Some(pw) = password {
        return Ok(pw);
    }

    let password = get_password(prompt)?;
    let confirm = get_password("Confirm password")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }
    Ok(password)
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("❌ {}", message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    let config = AppConfig::from_env()?;
    let pool = db::create_pool(&config).await?;
    db::run_migrations(&pool).await?;

    let user_repository = Arc::new(SqliteUserRepository::new(pool));
    let user_service = UserService::new(user_repository);

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Create {
                name,
                email,
                password,
                avatar_uri,
            } => {
                let password = password_or_prompt(password, "Password").unwrap_or_else(|e| fail(e));

                let request = RegisterRequest {
                    name,
                    email,
                    password,
                    avatar_uri,
                };

                match user_service.register(request).await {
                    Ok(user) => {
                        println!("✅ User created successfully!");
                        println!("  ID: {}", user.id);
                        println!("  Name: {}", user.name);
                        println!("  Email: {}", user.email);
                    }
                    Err(err) => fail(format!("Failed to create user: {}", err)),
                }
            }

            UserCommands::List { limit, offset } => {
                match user_service.list_users(Some(limit), Some(offset)).await {
                    Ok(users) if users.is_empty() => println!("No users found."),
                    Ok(users) => {
                        println!("{:<5} {:<24} {:<40} {:<30}", "ID", "Name", "Email", "Avatar");
                        println!("{}", "-".repeat(100));
                        for user in users {
                            println!(
                                "{:<5} {:<24} {:<40} {:<30}",
                                user.id, user.name, user.email, user.avatar_uri
                            );
                        }
                    }
                    Err(err) => fail(format!("Failed to list users: {}", err)),
                }
            }

            UserCommands::Delete { email } => match user_service.find_user_by_email(&email).await {
                Ok(Some(user)) => match user_service.delete_user(user.id).await {
                    Ok(()) => println!("✅ User '{}' deleted successfully!", email),
                    Err(err) => fail(format!("Failed to delete user: {}", err)),
                },
                Ok(None) => fail(format!("User '{}' not found", email)),
                Err(err) => fail(format!("Failed to find user: {}", err)),
            },

            UserCommands::SetPassword { email, password } => {
                let user = match user_service.find_user_by_email(&email).await {
                    Ok(Some(user)) => user,
                    Ok(None) => fail(format!("User '{}' not found", email)),
                    Err(err) => fail(format!("Failed to find user: {}", err)),
                };

                let new_password =
                    password_or_prompt(password, "New password").unwrap_or_else(|e| fail(e));

                match user_service.set_password(user.id, &new_password).await {
                    Ok(()) => println!("✅ Password updated successfully for '{}'!", email),
                    Err(err) => fail(format!("Failed to update password: {}", err)),
                }
            }
        },
    }

    Ok(())
}
