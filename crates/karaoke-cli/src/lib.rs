use anyhow::Context;
use karaoke_core::models::{Album, Video};
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn status_json(message: &str) -> serde_json::Value {
    serde_json::json!({ "success": true, "message": message })
}

/// Print a confirmation for commands that return no resource.
pub fn print_status(message: &str, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&status_json(message)),
        OutputFormat::Table => {
            println!("{}", message);
            Ok(())
        }
    }
}

pub fn print_albums(albums: &[Album], format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(&albums);
    }

    if albums.is_empty() {
        println!("No albums yet. Create one with `karaoke albums create <name>`.");
        return Ok(());
    }

    println!("{:>6}  {:<30}  {:<30}  {:>19}", "ID", "Name", "Description", "Created");
    println!("{}", "-".repeat(92));
    for album in albums {
        println!(
            "{:>6}  {:<30}  {:<30}  {:>19}",
            album.id,
            truncate_string(&album.name, 30),
            truncate_string(album.description.as_deref().unwrap_or(""), 30),
            album.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

pub fn print_videos(videos: &[Video], format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(&videos);
    }

    if videos.is_empty() {
        println!("No videos in this album. Upload one with `karaoke upload <file> --album <id>`.");
        return Ok(());
    }

    println!("{:<36}  {:<30}  {:>8}  {:>19}", "Job ID", "Name", "Duration", "Created");
    println!("{}", "-".repeat(99));
    for video in videos {
        println!(
            "{:<36}  {:<30}  {:>8}  {:>19}",
            truncate_string(video.job_id.as_str(), 36),
            truncate_string(&video.name, 30),
            video.formatted_duration(),
            video.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

pub fn print_video(video: &Video, thumbnail_url: &str, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "video": video,
            "thumbnail_url": thumbnail_url,
        }));
    }

    println!("Job ID:    {}", video.job_id);
    println!("Name:      {}", video.name);
    println!("Album:     {}", video.album_id);
    println!("Duration:  {}", video.formatted_duration());
    println!("Created:   {}", video.created_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(updated) = video.updated_at {
        println!("Updated:   {}", updated.format("%Y-%m-%d %H:%M:%S"));
    }
    println!("Thumbnail: {}", thumbnail_url);
    Ok(())
}

/// Initialize tracing for the CLI. Logs go to stderr so JSON output stays parseable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
