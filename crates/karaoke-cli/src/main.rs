//! Karaoke CLI: command-line client for the karaoke API.
//!
//! Set KARAOKE_API_URL (or API_URL) and store a token with `karaoke auth set-token`
//! (or set KARAOKE_TOKEN). Uses bearer auth.

use anyhow::Context;
use clap::{Parser, Subcommand};
use karaoke_api_client::ApiClient;
use karaoke_cli::{
    init_tracing, print_albums, print_json, print_status, print_video, print_videos, OutputFormat,
};
use karaoke_core::models::{CreateAlbumRequest, JobId, LanguageHint, UpdateAlbumRequest};
use karaoke_core::{
    ClientConfig, DirectorySink, ErrorMetadata, Route, SelectedFile, TokenStore, UploadController,
    UploadError,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "karaoke", about = "Karaoke voice-separation client")]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the stored access token
    Auth {
        #[command(subcommand)]
        sub: AuthCommands,
    },
    /// Album operations
    Albums {
        #[command(subcommand)]
        sub: AlbumCommands,
    },
    /// Processed video operations
    Videos {
        #[command(subcommand)]
        sub: VideoCommands,
    },
    /// Upload a file for voice separation and download the karaoke version
    Upload(UploadArgs),
}

#[derive(clap::Args)]
struct UploadArgs {
    /// Path to the audio or video file
    file: PathBuf,
    /// Album that receives the processed video
    #[arg(long)]
    album: Option<i64>,
    /// Spoken language: auto, es, en, pt
    #[arg(long, default_value = "auto")]
    language: LanguageHint,
    /// Download directory (defaults to KARAOKE_DOWNLOAD_DIR)
    #[arg(long)]
    out: Option<PathBuf>,
    /// Show the processed video's details after the upload
    #[arg(long)]
    show_result: bool,
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Store a bearer token for later commands
    SetToken {
        token: String,
    },
    /// Remove the stored token
    Logout,
    /// Show where the token comes from
    Status,
}

#[derive(Subcommand)]
enum AlbumCommands {
    /// List albums of a user
    List {
        /// User ID (defaults to KARAOKE_USER_ID)
        #[arg(long)]
        user: Option<i64>,
    },
    /// Create a new album
    Create {
        name: String,
        /// User ID (defaults to KARAOKE_USER_ID)
        #[arg(long)]
        user: Option<i64>,
    },
    /// Rename an album
    Rename {
        id: i64,
        name: String,
    },
    /// Set an album's description
    Describe {
        id: i64,
        description: String,
    },
    /// Delete an album and all its videos
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// List the videos of an album
    Videos {
        id: i64,
    },
}

#[derive(Subcommand)]
enum VideoCommands {
    /// Show a processed video
    Show {
        job_id: JobId,
    },
    /// Move a video to another album
    Move {
        job_id: JobId,
        album_id: i64,
    },
    /// Delete a processed video
    Delete {
        job_id: JobId,
    },
    /// Download a video's thumbnail
    Thumbnail {
        job_id: JobId,
        /// Output file (defaults to <job_id>.jpg in the download directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn resolve_user(user: Option<i64>, config: &ClientConfig) -> anyhow::Result<i64> {
    user.or(config.default_user_id)
        .context("No user given. Pass --user or set KARAOKE_USER_ID")
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    eprint!("{} [y/N] ", prompt);
    std::io::stderr().flush().ok();
    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn run_auth(sub: AuthCommands, config: &ClientConfig) -> anyhow::Result<()> {
    let store = config.file_token_store();
    match sub {
        AuthCommands::SetToken { token } => {
            store.save(&token)?;
            println!("Token stored in {}", store.path().display());
        }
        AuthCommands::Logout => {
            store.clear()?;
            println!("Signed out");
        }
        AuthCommands::Status => {
            let client = ApiClient::from_config(config)?;
            println!("API: {}", client.base_url());
            if !client.has_token() {
                println!("Not signed in. Run `karaoke auth set-token <token>`.");
            } else if config.token.is_some() {
                println!("Using token from KARAOKE_TOKEN");
            } else {
                println!("Using token from {}", store.path().display());
            }
        }
    }
    Ok(())
}

async fn run_albums(
    sub: AlbumCommands,
    client: &ApiClient,
    config: &ClientConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match sub {
        AlbumCommands::List { user } => {
            let albums = client.list_albums(resolve_user(user, config)?).await?;
            print_albums(&albums, format)?;
        }
        AlbumCommands::Create { name, user } => {
            let user_id = resolve_user(user, config)?;
            let created = client
                .create_album(&CreateAlbumRequest::new(&name, user_id)?)
                .await?;
            tracing::info!(album_id = created.id, "Album created");
            // Displayed state always comes from a fresh read.
            print_albums(&client.list_albums(user_id).await?, format)?;
        }
        AlbumCommands::Rename { id, name } => {
            client
                .update_album(id, &UpdateAlbumRequest::rename(&name)?)
                .await?;
            print_albums(&[client.get_album(id).await?], format)?;
        }
        AlbumCommands::Describe { id, description } => {
            client
                .update_album(id, &UpdateAlbumRequest::describe(&description))
                .await?;
            print_albums(&[client.get_album(id).await?], format)?;
        }
        AlbumCommands::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete album {} and all its videos?", id))? {
                println!("Aborted");
                return Ok(());
            }
            client.delete_album(id).await?;
            tracing::info!(album_id = id, "Album deleted");
            match config.default_user_id {
                Some(user_id) => print_albums(&client.list_albums(user_id).await?, format)?,
                None => print_status(&format!("Album {} deleted", id), format)?,
            }
        }
        AlbumCommands::Videos { id } => {
            let videos = client.list_album_videos(id).await?;
            print_videos(&videos, format)?;
        }
    }
    Ok(())
}

async fn run_videos(
    sub: VideoCommands,
    client: &ApiClient,
    config: &ClientConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match sub {
        VideoCommands::Show { job_id } => {
            let video = client.get_video(&job_id).await?;
            print_video(&video, &client.thumbnail_url(&job_id), format)?;
        }
        VideoCommands::Move { job_id, album_id } => {
            client.move_video(&job_id, album_id).await?;
            tracing::info!(job_id = %job_id, album_id = album_id, "Video moved");
            let video = client.get_video(&job_id).await?;
            print_video(&video, &client.thumbnail_url(&job_id), format)?;
        }
        VideoCommands::Delete { job_id } => {
            client.delete_video(&job_id).await?;
            print_status(&format!("Video {} deleted", job_id), format)?;
        }
        VideoCommands::Thumbnail { job_id, out } => {
            let bytes = client.download_thumbnail(&job_id).await?;
            let path = out.unwrap_or_else(|| config.download_dir.join(format!("{}.jpg", job_id)));
            tokio::fs::write(&path, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Thumbnail saved to {}", path.display());
        }
    }
    Ok(())
}

async fn run_upload(
    args: UploadArgs,
    client: &ApiClient,
    config: &ClientConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let UploadArgs {
        file,
        album,
        language,
        out,
        show_result,
    } = args;
    let sink = DirectorySink::new(out.unwrap_or_else(|| config.download_dir.clone()));
    let mut controller =
        match UploadController::enter(album, client.clone(), sink, config.token_store()) {
            Ok(controller) => controller,
            Err(redirect) => {
                eprintln!("{}", redirect);
                if redirect.to == Route::AlbumPicker {
                    eprintln!("Pick an album with `karaoke albums list` and pass --album <id>.");
                }
                return Err(anyhow::anyhow!(redirect));
            }
        };

    let selected = SelectedFile::from_path(&file)?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    eprintln!(
        "Uploading {} to album {} ({}). Press Ctrl-C to cancel.",
        selected.file_name,
        controller.album_id(),
        language.label()
    );

    let outcome = match controller.process(selected, language, cancel).await {
        Ok(outcome) => outcome,
        Err(UploadError::Cancelled) => {
            eprintln!("Upload cancelled.");
            return Ok(());
        }
        Err(err) => {
            let message = err.client_message();
            if let Some(action) = err.suggested_action() {
                eprintln!("{}", action);
            }
            return Err(anyhow::Error::new(err).context(message));
        }
    };

    if let Some(warning) = &outcome.warning {
        eprintln!("warning: {}", warning);
    }

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "state": controller.state(),
            "artifact": outcome,
            "warning": outcome.warning.as_ref().map(|w| w.to_string()),
            "result_route": controller.view_result().map(|r| r.path()),
        }))?,
        OutputFormat::Table => {
            println!("Video processed successfully.");
            println!("Saved to {}", outcome.artifact_path.display());
            if let Some(route) = controller.view_result() {
                println!("Result: {}", route);
            }
        }
    }

    if show_result {
        match controller.view_result() {
            Some(Route::VideoDetails { job_id }) => {
                let video = client.get_video(&job_id).await?;
                print_video(&video, &client.thumbnail_url(&job_id), format)?;
            }
            _ => eprintln!("The result page is unavailable for this upload."),
        }
    }

    Ok(())
}

fn api_client(config: &ClientConfig) -> anyhow::Result<ApiClient> {
    ApiClient::from_config(config)
        .context("Failed to create API client. Check KARAOKE_API_URL and the stored token")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = ClientConfig::from_env().context("Invalid configuration")?;

    match cli.command {
        Commands::Auth { sub } => run_auth(sub, &config)?,
        Commands::Albums { sub } => {
            run_albums(sub, &api_client(&config)?, &config, cli.format).await?
        }
        Commands::Videos { sub } => {
            run_videos(sub, &api_client(&config)?, &config, cli.format).await?
        }
        Commands::Upload(args) => {
            run_upload(args, &api_client(&config)?, &config, cli.format).await?
        }
    }

    Ok(())
}
