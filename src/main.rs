use smarta_notes_lib::commands::notes;
use std::path::PathBuf;

const USAGE: &str = "usage: smarta-notes [--data-dir DIR] [--export DIR] [FILE...]";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    smarta_notes_lib::init_tracing();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "smarta-notes failed");
        eprintln!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut data_dir = std::env::var_os("SMARTA_NOTES_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".smarta-notes"));
    let mut export_dir = None;
    let mut files = Vec::new();

    let mut args = std::env::args_os().skip(1);
    while let Some(arg) = args.next() {
        match arg.to_str() {
            Some("--data-dir") => data_dir = args.next().map(PathBuf::from).ok_or(USAGE)?,
            Some("--export") => export_dir = Some(args.next().map(PathBuf::from).ok_or(USAGE)?),
            Some("-h" | "--help") => {
                println!("{USAGE}");
                return Ok(());
            }
            _ => files.push(PathBuf::from(arg)),
        }
    }

    let state = smarta_notes_lib::setup(&data_dir)?;
    if !files.is_empty() {
        let created = notes::upload_paths(&state, &files).await?;
        println!("{}", serde_json::to_string_pretty(&created)?);
    }
    if let Some(dir) = export_dir {
        let path = notes::export_notes(&state, &dir).await?;
        tracing::info!(path = %path.display(), "export written");
    }
    Ok(())
}
