//! # sharetask
//!
//! A terminal to-do manager with personal lists and shared task spaces.
//!
//! ## Features
//!
//! *   **Accounts**: register, sign in and out, change password.
//! *   **Lists**: personal task lists plus unscheduled "My Day" tasks.
//! *   **Views**: My Day, the coming week grouped by weekday, every task
//!     grouped A to Z, and a dated agenda.
//! *   **Share spaces**: collaborative lists joined through an invite code.
//!     Members are owners, editors or viewers; viewers can read but only edit
//!     tasks assigned to them.
//!
//! ## Usage
//!
//! ```bash
//! sharetask register me@example.com --password hunter22 --confirm hunter22
//! sharetask task add "Buy milk"
//! sharetask myday
//!
//! sharetask space create "Family"
//! sharetask space join K3X9QZ
//! sharetask space role <SPACE> friend@example.com editor
//! sharetask task add "Plan trip" --space <SPACE>
//! sharetask space show <SPACE> --mine
//! ```
//!
//! Records are referred to by any unique prefix of their id.
//!
//! ## Data Storage
//!
//! Records are saved in your local data directory:
//! *   Linux: `~/.local/share/sharetask/db.json`
//! *   macOS: `~/Library/Application Support/sharetask/db.json`
//! *   Windows: `%APPDATA%\sharetask\db.json`
//!
//! Override this with the `SHARETASK_DB` environment variable or `data_dir`
//! in `config.toml`. Set `RUST_LOG=debug` for diagnostics on stderr.

use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::generate;

use sharetask::commands::*;
use sharetask::config::Config;
use sharetask::models::Role;
use sharetask::storage::Store;
use sharetask::tasks::{parse_date, parse_time, TaskUpdate};
use sharetask::{logging, Result};

#[derive(Parser)]
#[command(name = "sharetask")]
#[command(about = "To-do lists with shared task spaces", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign in
    Register {
        email: String,
        #[arg(short, long)]
        password: String,
        /// Repeat the password
        #[arg(short, long)]
        confirm: String,
    },
    /// Sign in
    Login {
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Change your password
    Passwd {
        #[arg(short, long)]
        password: String,
        #[arg(short, long)]
        confirm: String,
    },
    /// Manage personal lists
    List {
        #[command(subcommand)]
        command: ListCommands,
    },
    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Manage subtasks
    Subtask {
        #[command(subcommand)]
        command: SubtaskCommands,
    },
    /// Tasks scheduled for today
    Myday,
    /// Tasks for the coming days, grouped by weekday
    Week,
    /// All your tasks, grouped alphabetically
    All,
    /// Your tasks as a dated agenda
    Agenda,
    /// Search task names and notes
    Search { query: String },
    /// Manage share spaces
    Space {
        #[command(subcommand)]
        command: SpaceCommands,
    },
    /// Reset the database (delete every record)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
}

#[derive(Subcommand)]
enum ListCommands {
    /// Add a new list
    Add { name: String },
    /// Show your lists and share spaces
    Ls,
    /// Show the tasks of a list
    Show { list: String },
    /// Rename a list
    Rename { list: String, name: String },
    /// Remove a list and its tasks
    Rm { list: String },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Add a task (to My Day unless a list or space is given)
    Add {
        name: String,
        #[arg(short, long, conflicts_with = "space")]
        list: Option<String>,
        #[arg(short, long)]
        space: Option<String>,
    },
    /// Mark a task as complete
    Done { task: String },
    /// Mark a task as not completed
    Undo { task: String },
    /// Edit a task
    Edit {
        task: String,
        #[arg(short, long)]
        name: Option<String>,
        /// Start date in YYYY-MM-DD
        #[arg(short, long)]
        date: Option<String>,
        /// Start time in HH:MM
        #[arg(short, long)]
        time: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Member (email or id) to assign the task to
        #[arg(short, long)]
        assign: Option<String>,
    },
    /// Remove a task
    Rm { task: String },
    /// Show task details and subtasks
    Show { task: String },
}

#[derive(Subcommand)]
enum SubtaskCommands {
    /// Add a subtask to a task
    Add { task: String, name: String },
    /// Mark a subtask as complete
    Done { subtask: String },
    /// Mark a subtask as not completed
    Undo { subtask: String },
    /// Remove a subtask
    Rm { subtask: String },
}

#[derive(Subcommand)]
enum SpaceCommands {
    /// Create a share space
    Create { name: String },
    /// Join a share space by invite code
    Join { code: String },
    /// List your share spaces
    Ls,
    /// Show the tasks of a share space
    Show {
        space: String,
        /// Only tasks assigned to you
        #[arg(short, long)]
        mine: bool,
    },
    /// List members and their roles
    Members { space: String },
    /// Change a member's role (editor or viewer)
    Role {
        space: String,
        /// Member email or id
        member: String,
        role: Role,
    },
    /// Rename a share space (owner only)
    Rename { space: String, name: String },
    /// Delete a share space and its tasks (owner only)
    Rm { space: String },
    /// Print the invite code
    Code { space: String },
}

fn run(app: &App, command: Commands) -> Result<()> {
    match command {
        Commands::Register { email, password, confirm } => cmd_register(app, &email, &password, &confirm),
        Commands::Login { email, password } => cmd_login(app, &email, &password),
        Commands::Logout => cmd_logout(app),
        Commands::Whoami => cmd_whoami(app),
        Commands::Passwd { password, confirm } => cmd_passwd(app, &password, &confirm),
        Commands::List { command } => match command {
            ListCommands::Add { name } => cmd_list_add(app, &name),
            ListCommands::Ls => cmd_list_ls(app),
            ListCommands::Show { list } => cmd_list_show(app, &list),
            ListCommands::Rename { list, name } => cmd_list_rename(app, &list, &name),
            ListCommands::Rm { list } => cmd_list_remove(app, &list),
        },
        Commands::Task { command } => match command {
            TaskCommands::Add { name, list, space } => cmd_task_add(app, &name, list, space),
            TaskCommands::Done { task } => cmd_task_complete(app, &task, true),
            TaskCommands::Undo { task } => cmd_task_complete(app, &task, false),
            TaskCommands::Edit { task, name, date, time, notes, assign } => {
                let update = TaskUpdate {
                    name,
                    completed: None,
                    date: date.as_deref().map(parse_date).transpose()?,
                    time: time.as_deref().map(parse_time).transpose()?,
                    notes,
                    assignee: assign,
                };
                cmd_task_edit(app, &task, update)
            }
            TaskCommands::Rm { task } => cmd_task_remove(app, &task),
            TaskCommands::Show { task } => cmd_task_show(app, &task),
        },
        Commands::Subtask { command } => match command {
            SubtaskCommands::Add { task, name } => cmd_subtask_add(app, &task, &name),
            SubtaskCommands::Done { subtask } => cmd_subtask_complete(app, &subtask, true),
            SubtaskCommands::Undo { subtask } => cmd_subtask_complete(app, &subtask, false),
            SubtaskCommands::Rm { subtask } => cmd_subtask_remove(app, &subtask),
        },
        Commands::Myday => cmd_myday(app),
        Commands::Week => cmd_week(app),
        Commands::All => cmd_all(app),
        Commands::Agenda => cmd_agenda(app),
        Commands::Search { query } => cmd_search(app, &query),
        Commands::Space { command } => match command {
            SpaceCommands::Create { name } => cmd_space_create(app, &name),
            SpaceCommands::Join { code } => cmd_space_join(app, &code),
            SpaceCommands::Ls => cmd_space_ls(app),
            SpaceCommands::Show { space, mine } => cmd_space_show(app, &space, mine),
            SpaceCommands::Members { space } => cmd_space_members(app, &space),
            SpaceCommands::Role { space, member, role } => cmd_space_role(app, &space, &member, role),
            SpaceCommands::Rename { space, name } => cmd_space_rename(app, &space, &name),
            SpaceCommands::Rm { space } => cmd_space_remove(app, &space),
            SpaceCommands::Code { space } => cmd_space_code(app, &space),
        },
        Commands::Reset { force } => cmd_reset(app, force),
        Commands::Completions { shell } => {
            let shell_enum = parse_shell(&shell)?;
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "sharetask", &mut io::stdout());
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };
    logging::init(&config.log_level);

    let app = App::new(Store::from_config(&config), config);
    match run(&app, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
