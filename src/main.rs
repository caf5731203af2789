use anyhow::Result;
use bitstore::areas::repository::Repository;
use bitstore::commands::plumbing::cat_file::CatFileMode;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bitstore",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "Inspect and write git objects and index files",
    long_about = "A small git-compatible storage tool. \
    It reads and writes loose objects and the version 2 index file \
    byte-for-byte the way git does.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(
        short = 'C',
        long = "repo",
        global = true,
        env = "BITSTORE_REPO",
        help = "Run as if started in this directory"
    )]
    repo: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "BITSTORE_VERIFY_READS",
        help = "Re-hash every object read and reject mismatches"
    )]
    verify_reads: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command creates the .git directory layout in the repository path."
    )]
    Init,
    #[command(
        name = "hash-object",
        about = "Compute a blob id and optionally write it to the object database"
    )]
    HashObject {
        #[arg(short, long, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: PathBuf,
    },
    #[command(
        name = "cat-file",
        about = "Print the type, size or content of an object",
        group(ArgGroup::new("mode").required(true).args(["show_type", "size", "pretty"]))
    )]
    CatFile {
        #[arg(short = 't', help = "Show the object type")]
        show_type: bool,
        #[arg(short = 's', help = "Show the object size")]
        size: bool,
        #[arg(short = 'p', help = "Pretty-print the object content")]
        pretty: bool,
        #[arg(index = 1)]
        object: String,
    },
    #[command(name = "ls-tree", about = "List the contents of a tree object")]
    LsTree {
        #[arg(short = 'r', help = "Recurse into sub-trees")]
        recursive: bool,
        #[arg(index = 1)]
        object: String,
    },
    #[command(name = "ls-files", about = "Show the entries of the index")]
    LsFiles {
        #[arg(short, long, help = "Show mode, object id and stage")]
        stage: bool,
    },
    #[command(name = "add", about = "Add file contents to the index")]
    Add {
        #[arg(required = true, index = 1)]
        paths: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let path = match cli.repo {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let mut repository = Repository::new(&path, Box::new(std::io::stdout()))?
        .with_verified_reads(cli.verify_reads);

    match cli.command {
        Commands::Init => repository.init()?,
        Commands::HashObject { write, file } => repository.hash_object(&file, write)?,
        Commands::CatFile {
            show_type,
            size,
            pretty: _,
            object,
        } => {
            let mode = if show_type {
                CatFileMode::Type
            } else if size {
                CatFileMode::Size
            } else {
                CatFileMode::Pretty
            };
            repository.cat_file(&object, mode)?
        }
        Commands::LsTree { recursive, object } => repository.ls_tree(&object, recursive)?,
        Commands::LsFiles { stage } => repository.ls_files(stage)?,
        Commands::Add { paths } => repository.add(&paths)?,
    }

    repository.writer().flush()?;

    Ok(())
}
