use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use parley_cli::OutputFormat;
use parley_cli::commands::{self, session::BrowserArgs};

#[derive(Parser)]
#[command(name = "parley")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Talk to a web chat assistant from the terminal through a real Chrome window",
    long_about = "Parley opens the chat page in Chrome, waits for you to log in, types your prompt \
                  into the page and prints the assistant's reply once it has finished rendering."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (pretty, json)
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one prompt and print the reply
    Ask {
        /// Prompt text; multiple words are joined with spaces
        #[arg(value_name = "PROMPT", required = true, num_args = 1..)]
        prompt: Vec<String>,

        #[command(flatten)]
        browser: BrowserArgs,
    },

    /// Chat interactively until 'exit', 'quit' or Ctrl+C
    Chat {
        #[command(flatten)]
        browser: BrowserArgs,
    },

    /// Manage Chrome profiles that keep chat logins
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Generate shell completion scripts
    #[command(after_long_help = "SUPPORTED SHELLS:\n    \
        bash, zsh, fish, powershell, elvish\n\n\
        INSTALLATION:\n    \
        bash:  parley completion --shell bash >> ~/.bashrc\n    \
        zsh:   parley completion --shell zsh > \"${fpath[1]}/_parley\"\n    \
        fish:  parley completion --shell fish > ~/.config/fish/completions/parley.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// List all profiles
    List,

    /// Show details about a profile
    Info {
        /// Profile name
        name: String,
    },

    /// Delete a profile and its saved login
    Delete {
        /// Profile name
        name: String,

        /// Skip confirmation (required for the default profile)
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Ask { prompt, browser } => commands::ask::execute(prompt, &browser, cli.format),
        Commands::Chat { browser } => commands::chat::execute(&browser, cli.format),
        Commands::Profile { command } => match command {
            ProfileCommands::List => commands::profile::list(),
            ProfileCommands::Info { name } => commands::profile::info(&name),
            ProfileCommands::Delete { name, force } => commands::profile::delete(&name, force),
        },
        Commands::Completion { shell } => commands::completion::execute(shell, &mut Cli::command()),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("parley=debug,parley_core=debug,parley_browser=debug")
        } else {
            EnvFilter::new("parley=warn,parley_core=warn,parley_browser=warn")
        }
    });

    // stderr keeps stdout clean for replies
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
