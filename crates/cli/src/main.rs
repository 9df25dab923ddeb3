use clap::{Parser, Subcommand};
use docstore_core::{open_store, IncomingFile, StoreConfig, UploadOutcome};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docstore")]
#[command(about = "docstore local storage CLI")]
struct Cli {
    /// Upload directory (overrides DOCSTORE_UPLOAD_DIR)
    #[arg(long, global = true)]
    upload_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Store local files, in the order given
    Upload {
        /// Files to store
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Host used to build the returned document URLs
        #[arg(long, default_value = "localhost:3000")]
        host: String,
    },
    /// Read a stored file
    Fetch {
        /// Stored file name
        name: String,
        /// Write the bytes to this path instead of reporting the size
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List stored files
    List,
    /// Check whether a file is stored under a name
    Exists {
        /// Stored file name
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut cfg = StoreConfig::from_env()?;
    if let Some(upload_dir) = cli.upload_dir {
        cfg = cfg.with_upload_dir(upload_dir)?;
    }

    match cli.command {
        Some(Commands::Upload { paths, host }) => {
            let service = open_store(&cfg)?;

            let mut files = Vec::with_capacity(paths.len());
            for path in &paths {
                let file = tokio::fs::File::open(path).await?;
                let length = file.metadata().await?.len();
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                files.push(IncomingFile::new(name, length, file));
            }

            match service.upload_many(files, &host).await {
                Ok(outcomes) => {
                    for outcome in outcomes {
                        match outcome {
                            UploadOutcome::Stored(descriptor) => println!(
                                "Stored {} ({}) at {}",
                                descriptor.document_name,
                                descriptor.document_type,
                                descriptor.document_url
                            ),
                            UploadOutcome::RejectedExtension { file_name, .. } => {
                                println!("Skipped {}: extension not allowed", file_name)
                            }
                            UploadOutcome::RejectedEmpty { file_name } => {
                                println!("Skipped {}: file is empty", file_name)
                            }
                        }
                    }
                }
                Err(e) => eprintln!("Error uploading files: {}", e),
            }
        }
        Some(Commands::Fetch { name, out }) => {
            let service = open_store(&cfg)?;
            match service.read(&name).await {
                Ok(bytes) => match out {
                    Some(out) => {
                        tokio::fs::write(&out, &bytes).await?;
                        println!("Wrote {} bytes to {}", bytes.len(), out.display());
                    }
                    None => println!("{}: {} bytes", name, bytes.len()),
                },
                Err(e) => eprintln!("Error fetching {}: {}", name, e),
            }
        }
        Some(Commands::List) => {
            let service = open_store(&cfg)?;
            let names = service.list().await?;
            if names.is_empty() {
                println!("No files stored.");
            } else {
                for name in names {
                    println!("{}", name);
                }
            }
        }
        Some(Commands::Exists { name }) => {
            let service = open_store(&cfg)?;
            match service.exists(&name).await {
                Ok(true) => println!("{} is stored", name),
                Ok(false) => println!("{} is not stored", name),
                Err(e) => eprintln!("Error checking {}: {}", name, e),
            }
        }
        None => {
            println!("Use 'docstore --help' for commands");
        }
    }

    Ok(())
}
