use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use arttoktok_uploader::auth::{complete_social_login, AuthContext, LoginCallback};
use arttoktok_uploader::config::{self, Config};
use arttoktok_uploader::events::{LogSink, OriginView};
use arttoktok_uploader::models::ArtworkStatus;
use arttoktok_uploader::uploader::{ArtApiClient, UploadSession, UserApi};

#[derive(Parser, Debug)]
#[command(name = "arttoktok", version, about = "Upload artworks to ArtTokTok")]
struct Cli {
    /// Access token for authenticated requests
    #[arg(long, env = "ARTTOKTOK_ACCESS_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Override the API base URL from the config file
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload images and publish them as one artwork
    Upload(UploadArgs),
    /// Show a user profile
    User { id: i64 },
    /// Complete a social login and print the resulting auth state
    Login {
        #[arg(long)]
        social_id: String,
        /// kakao or naver; inferred from the id when omitted
        #[arg(long)]
        provider: Option<String>,
    },
    /// Inspect or reset the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Show,
    Reset,
}

#[derive(clap::Args, Debug)]
struct UploadArgs {
    #[arg(long)]
    title: String,

    /// HTML description
    #[arg(long)]
    description: String,

    /// PUBLIC, SELLING or FREE
    #[arg(long, default_value = "PUBLIC")]
    status: String,

    /// Refresh the home feed after posting
    #[arg(long)]
    from_home: bool,

    /// Remove the image at INDEX after uploading (repeatable)
    #[arg(long = "drop", value_name = "INDEX")]
    drops: Vec<usize>,

    /// Move an image, e.g. --move 3:0 (repeatable, applied after --drop)
    #[arg(long = "move", value_name = "FROM:TO", value_parser = parse_move)]
    moves: Vec<(usize, usize)>,

    #[arg(required = true)]
    files: Vec<String>,
}

fn parse_move(value: &str) -> Result<(usize, usize), String> {
    let (from, to) = value
        .split_once(':')
        .ok_or_else(|| format!("expected FROM:TO, got '{}'", value))?;
    let from = from.trim().parse().map_err(|e| format!("bad FROM: {}", e))?;
    let to = to.trim().parse().map_err(|e| format!("bad TO: {}", e))?;
    Ok((from, to))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = config::load_config();
    let mut cfg = loaded.as_ref().cloned().unwrap_or_default();

    env_logger::Builder::new()
        .filter_level(cfg.log_level_filter())
        .parse_default_env()
        .init();

    if let Err(e) = &loaded {
        log::error!("Failed to load configuration: {}. Using defaults.", e);
    }

    if let Some(url) = &cli.api_url {
        cfg.api_base_url = url.clone();
        config::validate_config(&cfg)?;
    }

    match cli.command {
        Command::Upload(args) => upload(&cfg, cli.token, args).await,
        Command::User { id } => {
            let client = ArtApiClient::new(&cfg)?.with_access_token(cli.token);
            let profile = client.get_user(id).await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
            Ok(())
        }
        Command::Login {
            social_id,
            provider,
        } => {
            let client = ArtApiClient::new(&cfg)?;
            let mut ctx = AuthContext::new();
            let callback = LoginCallback {
                social_id,
                provider,
            };

            let route = complete_social_login(&client, &mut ctx, &callback, &LogSink).await;

            let state = serde_json::json!({
                "loggedIn": ctx.is_logged_in(),
                "loginAttempted": ctx.login_attempted(),
                "userRole": ctx.user_role(),
                "accessToken": ctx.access_token(),
                "refreshToken": ctx.refresh_token(),
                "redirect": route.path(),
            });
            println!("{}", serde_json::to_string_pretty(&state)?);
            Ok(())
        }
        Command::Config { action } => {
            let shown = match action {
                ConfigAction::Show => cfg,
                ConfigAction::Reset => config::reset_config()?,
            };
            println!("{}", serde_json::to_string_pretty(&shown)?);
            Ok(())
        }
    }
}

async fn upload(cfg: &Config, token: Option<String>, args: UploadArgs) -> Result<()> {
    let status: ArtworkStatus = args.status.parse()?;
    let client = ArtApiClient::new(cfg)?.with_access_token(token);
    if !client.has_access_token() {
        log::warn!("No access token given; the API will likely reject the upload");
    }

    let mut session = UploadSession::new(cfg);
    session.set_title(args.title);
    session.set_description(args.description);
    session.set_visibility(status);

    let report = session.add_image_paths(&client, args.files.as_slice()).await;
    for failure in &report.failed {
        eprintln!("skipped {}: {}", failure.file_name, failure.error);
    }
    if report.truncated > 0 {
        eprintln!(
            "only the first {} images are kept ({} dropped)",
            session.max_images(),
            report.truncated
        );
    }

    let mut drops = args.drops;
    drops.sort_unstable_by(|a, b| b.cmp(a));
    drops.dedup();
    for index in drops {
        if session.delete_image(index).is_none() {
            log::warn!("No image at index {} to drop", index);
        }
    }

    for (from, to) in args.moves {
        if !session.reorder(from, Some(to)) {
            log::warn!("Move {}:{} left the order unchanged", from, to);
        }
    }

    let origin = if args.from_home {
        OriginView::Home
    } else {
        OriginView::Other("cli".to_string())
    };

    let ack = session
        .submit(&client, &origin, &LogSink)
        .await
        .map_err(|e| {
            if e.is_unauthorized() {
                log::error!("The access token was rejected; log in again");
            }
            e
        })
        .context("artwork was not published")?;

    println!("{}", serde_json::to_string_pretty(&ack)?);
    Ok(())
}
