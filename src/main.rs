use anyhow::Result;
use clap::{Parser, Subcommand};
use kit::areas::repository::Repository;
use kit::commands::plumbing::cat_file::CatFileMode;
use kit::commands::plumbing::ls_tree::LsTreeFormat;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "KIT_LOG";

#[derive(Parser)]
#[command(
    name = "kit",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A content-addressed object store with a git-compatible layout",
    long_about = "kit stores blobs, trees and commits as zlib-compressed, SHA-1 addressed objects \
    in a git-compatible .git/objects directory, using its own DEFLATE codec.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(
        name = "cat-file",
        about = "Print the type or content of an object",
        long_about = "This command prints the type (-t) or the content (-p) of an object. \
        Given an object type instead of a flag, it prints the raw content after checking the type."
    )]
    CatFile {
        #[arg(short = 'p', help = "Pretty-print the object content")]
        pretty: bool,
        #[arg(short = 't', help = "Print the object type")]
        show_type: bool,
        #[arg(index = 1, help = "The object SHA, or the expected type followed by the SHA")]
        first: String,
        #[arg(index = 2, help = "The object SHA when a type is given")]
        second: Option<String>,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file as a blob and optionally write it to the object database",
        long_about = "This command hashes a file as a blob object and can write it to the object database. \
        It requires the path to the file to be specified."
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
    #[command(
        name = "ls-tree",
        about = "List the contents of a tree object",
        long_about = "This command lists the entries of a tree object in stored order."
    )]
    LsTree {
        #[arg(long, help = "List only the entry names")]
        name_only: bool,
        #[arg(long, help = "List only the entry object SHAs")]
        object_only: bool,
        #[arg(index = 1, help = "The tree SHA")]
        sha: String,
    },
    #[command(
        name = "write-tree",
        about = "Write the working tree as tree objects",
        long_about = "This command stores every file of the working tree as a blob and every non-empty \
        directory as a tree, then prints the root tree SHA."
    )]
    WriteTree,
    #[command(
        name = "commit-tree",
        about = "Create a commit object from a tree",
        long_about = "This command creates a commit for an existing tree, with at most one parent, \
        and prints its SHA. Author and committer come from the GIT_AUTHOR_* and GIT_COMMITTER_* variables."
    )]
    CommitTree {
        #[arg(index = 1, help = "The tree SHA")]
        tree: String,
        #[arg(short = 'p', help = "The parent commit SHA")]
        parents: Vec<String>,
        #[arg(short, long = "message", required = true, help = "A paragraph of the commit message")]
        messages: Vec<String>,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command snapshots the working tree and creates a new commit on the current branch."
    )]
    Commit {
        #[arg(short, long = "message", required = true, help = "A paragraph of the commit message")]
        messages: Vec<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_repository(path: Option<&str>) -> Result<Repository> {
    let path = match path {
        Some(path) => path.into(),
        None => std::env::current_dir()?,
    };

    Repository::new(path, Box::new(std::io::stdout()))
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { path } => open_repository(path.as_deref())?.init()?,
        Commands::CatFile {
            pretty,
            show_type,
            first,
            second,
        } => {
            let (expected, sha) = match second {
                Some(sha) => (Some(first.as_str()), sha),
                None => (None, first),
            };
            let mode = CatFileMode::try_from_flags(*pretty, *show_type, expected)?;

            open_repository(None)?.cat_file(sha, mode)?
        }
        Commands::HashObject { write, file } => open_repository(None)?.hash_object(file, *write)?,
        Commands::LsTree {
            name_only,
            object_only,
            sha,
        } => {
            let format = LsTreeFormat::try_from_flags(*name_only, *object_only)?;

            open_repository(None)?.ls_tree(sha, format)?
        }
        Commands::WriteTree => open_repository(None)?.write_tree()?,
        Commands::CommitTree {
            tree,
            parents,
            messages,
        } => open_repository(None)?.commit_tree(tree, parents, messages)?,
        Commands::Commit { messages } => open_repository(None)?.commit(messages)?,
    }

    Ok(())
}
