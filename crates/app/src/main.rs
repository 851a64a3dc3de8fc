//! Linkboard entry point: a foreground client for the shared link feed.

use std::sync::Arc;

use async_trait::async_trait;
use linkboard_backend::models::Link;
use linkboard_backend::{AuthProvider, HttpBackend, LinkStore};
use linkboard_common::{AppResult, Config};
use linkboard_core::{App, ShareOutcome, ShareRequest, ShareTarget, ToggleOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Terminal stand-in for the platform share capability: no native share
/// sheet, so every share goes through the clipboard path, which here prints
/// the URL for the user to copy.
struct ConsoleShare;

#[async_trait]
impl ShareTarget for ConsoleShare {
    fn supports_native_share(&self) -> bool {
        false
    }

    async fn native_share(&self, _request: &ShareRequest) -> AppResult<()> {
        Ok(())
    }

    async fn copy_to_clipboard(&self, text: &str) -> AppResult<()> {
        println!("copy this URL: {text}");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linkboard=debug".into()),
        )
        .init();

    info!("Starting linkboard...");

    let config = Config::load()?;
    let backend = Arc::new(HttpBackend::new(&config.backend)?);
    let auth: Arc<dyn AuthProvider> = backend.clone();
    let store: Arc<dyn LinkStore> = backend;

    let app = App::new(auth, store, Arc::new(ConsoleShare), &config.share).await?;
    let listener = app.spawn_session_listener();

    println!("linkboard: type `help` for commands");
    run_loop(&app).await;

    drop(app);
    listener.await?;
    Ok(())
}

async fn run_loop(app: &App) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let Ok(Some(line)) = lines.next_line().await else {
            break;
        };
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => {}
            ["quit" | "exit"] => break,
            ["help"] => print_help(),
            ["signup", email, password] => {
                report(app.session.sign_up(email, password).await.map(|s| {
                    format!("signed up as {}", s.user.email)
                }));
            }
            ["signin", email, password] => {
                report(app.session.sign_in(email, password).await.map(|s| {
                    format!("signed in as {}", s.user.email)
                }));
            }
            ["signout"] => {
                report(app.session.sign_out().await.map(|()| "signed out".to_string()));
            }
            ["list"] => print_links(app).await,
            ["add", name, url] => {
                report(
                    app.links
                        .add_link(name, url)
                        .await
                        .map(|()| format!("added {name}")),
                );
            }
            ["delete", index] => match link_at(app, index).await {
                Some(link) => report(
                    app.links
                        .delete_link(&link.id, &link.user_email)
                        .await
                        .map(|()| format!("deleted {}", link.name)),
                ),
                None => println!("no such link"),
            },
            ["fav", index] => match link_at(app, index).await {
                Some(link) => report(app.links.toggle_favorite(&link.id).await.map(|outcome| {
                    match outcome {
                        ToggleOutcome::Added => format!("favorited {}", link.name),
                        ToggleOutcome::Removed => format!("unfavorited {}", link.name),
                        ToggleOutcome::AlreadyFavorited => {
                            format!("{} was already favorited", link.name)
                        }
                    }
                })),
                None => println!("no such link"),
            },
            ["share", index] => match link_at(app, index).await {
                Some(link) => report(app.share.share_link(&link).await.map(|outcome| {
                    match outcome {
                        ShareOutcome::Shared => "shared".to_string(),
                        ShareOutcome::CopiedToClipboard => "copied to clipboard".to_string(),
                    }
                })),
                None => println!("no such link"),
            },
            _ => println!("unrecognized command, type `help`"),
        }
    }
}

async fn link_at(app: &App, index: &str) -> Option<Link> {
    let index: usize = index.parse().ok()?;
    app.links.links().await.into_iter().nth(index)
}

async fn print_links(app: &App) {
    let links = app.links.links().await;
    if links.is_empty() {
        println!("no links (are you signed in?)");
        return;
    }
    for (i, link) in links.iter().enumerate() {
        let marker = if app.links.is_favorited(&link.id).await {
            "*"
        } else {
            " "
        };
        println!("{i:3} {marker} {}  {}  ({})", link.name, link.url, link.user_email);
    }
}

fn report(result: AppResult<String>) {
    match result {
        Ok(message) => println!("{message}"),
        Err(err) => println!("error: {err}"),
    }
}

fn print_help() {
    println!("commands:");
    println!("  signup <email> <password>   create an account");
    println!("  signin <email> <password>   sign in");
    println!("  signout                     sign out");
    println!("  list                        show the shared feed (* = favorite)");
    println!("  add <name> <url>            submit a link");
    println!("  delete <n>                  delete your own link");
    println!("  fav <n>                     toggle favorite");
    println!("  share <n>                   share a link");
    println!("  quit                        exit");
}
