use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use git_hunks::GitRepo;

#[derive(Parser)]
#[command(name = "git-hunks")]
#[command(about = "Hunk-level diff inspection and staging for git")]
struct Cli {
    /// Repository path
    #[arg(short = 'C', long = "repo", default_value = ".")]
    repo: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show aggregate diff statistics
    Stats {
        /// Inspect staged changes instead of the working tree
        #[arg(long)]
        staged: bool,
    },
    /// List changed files with status and per-file counts
    Files {
        #[arg(long)]
        staged: bool,
    },
    /// List a file's hunks with their headers
    Hunks {
        file: String,
        #[arg(long)]
        staged: bool,
    },
    /// Stage one hunk of a file's unstaged changes (0-indexed)
    Stage { file: String, index: usize },
    /// Unstage one hunk of a file's staged changes (0-indexed)
    Unstage { file: String, index: usize },
    /// Generate shell completions
    Completions { shell: Shell },
    /// Render the man page
    Man,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let repo = GitRepo::new(&cli.repo);

    match cli.command {
        Commands::Stats { staged } => {
            let result = diff_for(&repo, staged, None)?;
            let stats = result.stats;
            println!(
                "{} file(s) changed, {} insertion(s), {} deletion(s)",
                stats.files_changed, stats.insertions, stats.deletions
            );
        }
        Commands::Files { staged } => {
            let result = diff_for(&repo, staged, None)?;
            for file in &result.files {
                println!(
                    "{}\t{}\t+{} -{}",
                    file.status, file.new_path, file.insertions, file.deletions
                );
            }
        }
        Commands::Hunks { file, staged } => {
            let result = diff_for(&repo, staged, Some(&file))?;
            for file_diff in &result.files {
                for (i, hunk) in file_diff.hunks().iter().enumerate() {
                    println!("{}\t{}", i, hunk.header);
                }
            }
        }
        Commands::Stage { file, index } => repo.stage_hunk_at(&file, index)?,
        Commands::Unstage { file, index } => repo.unstage_hunk_at(&file, index)?,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "git-hunks", &mut std::io::stdout());
        }
        Commands::Man => {
            clap_mangen::Man::new(Cli::command()).render(&mut std::io::stdout())?;
        }
    }

    Ok(())
}

fn diff_for(
    repo: &GitRepo<'_>,
    staged: bool,
    file: Option<&str>,
) -> Result<git_hunks::DiffResult, git_hunks::GitCommandError> {
    if staged {
        repo.staged_diff(file)
    } else {
        repo.working_tree_diff(file)
    }
}
