//! Command-line front end for the to-do blueprint
//!
//! Wires the local table and the simulated remote into the repository, then
//! drives one screen's view-model per command and prints its state.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_app::{
    AddEditTaskViewModel, StatisticsViewModel, TaskDetailViewModel, TasksFilterType,
    TasksUiState, TasksViewModel, UserMessage,
};
use todo_core::task::{
    DefaultTaskRepository, FileTaskStore, SimulatedNetworkDataSource, Task, TaskRepository,
};
use todo_core::TodoConfig;

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Manage to-do tasks kept in a local cache and a simulated remote")]
#[command(version)]
struct Cli {
    /// Directory holding tasks.json and remote.json (overrides TODO_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Simulated network latency in milliseconds (overrides TODO_NETWORK_LATENCY_MS)
    #[arg(long, global = true)]
    latency_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Filter {
    All,
    Active,
    Completed,
}

impl From<Filter> for TasksFilterType {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::All => TasksFilterType::AllTasks,
            Filter::Active => TasksFilterType::ActiveTasks,
            Filter::Completed => TasksFilterType::CompletedTasks,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List tasks
    List {
        #[arg(short, long, value_enum, default_value = "all")]
        filter: Filter,
    },
    /// Show a single task
    Show { id: String },
    /// Add a new task
    Add { title: String, description: String },
    /// Change the title and description of a task
    Edit {
        id: String,
        title: String,
        description: String,
    },
    /// Mark a task as completed
    Complete { id: String },
    /// Mark a task as active
    Activate { id: String },
    /// Delete a task
    Delete { id: String },
    /// Delete all completed tasks
    ClearCompleted,
    /// Show the share of active and completed tasks
    Stats,
    /// Reload every task from the remote
    Refresh,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo=info,todo_core=warn,todo_app=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = TodoConfig::from_env();
    if let Some(data_dir) = cli.data_dir {
        config = config.with_data_dir(data_dir);
    }
    if let Some(ms) = cli.latency_ms {
        config = config.with_network_latency(Duration::from_millis(ms));
    }
    tracing::info!("Using data directory: {:?}", config.data_dir);

    let repository = build_repository(&config).await?;

    match cli.command {
        Command::List { filter } => {
            let vm = TasksViewModel::new(repository, filter.into());
            print_tasks(&vm.settled().await);
        }
        Command::Refresh => {
            let vm = TasksViewModel::new(repository, TasksFilterType::AllTasks);
            let state = vm.settled().await;
            match state.user_message {
                Some(message) => println!("{}", message),
                None => println!("Refreshed {} tasks", state.items.len()),
            }
        }
        Command::Show { id } => {
            let vm = TaskDetailViewModel::new(repository, id);
            vm.refresh().await?;
            let state = vm.ui_state();
            match &state.task {
                Some(task) => print_task(task),
                None => print_message(state.user_message),
            }
        }
        Command::Add { title, description } => {
            let vm = AddEditTaskViewModel::new(repository.clone(), None);
            vm.update_title(title);
            vm.update_description(description);
            if save(&vm).await? {
                show_list_with_message(repository, UserMessage::SuccessfullyAddedTask).await;
            }
        }
        Command::Edit {
            id,
            title,
            description,
        } => {
            let vm = AddEditTaskViewModel::new(repository.clone(), Some(id));
            let loaded = vm.settled().await;
            if loaded.user_message.is_some() {
                print_message(loaded.user_message);
                return Ok(());
            }
            vm.update_title(title);
            vm.update_description(description);
            if save(&vm).await? {
                show_list_with_message(repository, UserMessage::SuccessfullySavedTask).await;
            }
        }
        Command::Complete { id } => set_completed(repository, id, true).await?,
        Command::Activate { id } => set_completed(repository, id, false).await?,
        Command::Delete { id } => {
            let vm = TaskDetailViewModel::new(repository.clone(), id);
            vm.refresh().await?;
            if vm.ui_state().task.is_none() {
                print_message(vm.ui_state().user_message);
                return Ok(());
            }
            vm.delete_task().await?;
            if vm.ui_state().is_task_deleted {
                show_list_with_message(repository, UserMessage::SuccessfullyDeletedTask).await;
            }
        }
        Command::ClearCompleted => {
            let vm = TasksViewModel::new(repository, TasksFilterType::AllTasks);
            vm.settled().await;
            vm.clear_completed_tasks().await?;
            print_tasks(&vm.ui_state());
        }
        Command::Stats => {
            let vm = StatisticsViewModel::new(repository);
            let state = vm.settled().await;
            if let Some(error) = &state.error {
                println!("Error while loading statistics: {}", error);
            } else if state.is_empty {
                println!("You have no tasks.");
            } else {
                println!("Active tasks: {:.1}%", state.active_tasks_percent);
                println!("Completed tasks: {:.1}%", state.completed_tasks_percent);
            }
        }
    }

    Ok(())
}

async fn build_repository(config: &TodoConfig) -> Result<Arc<dyn TaskRepository>> {
    let local = FileTaskStore::new(config.local_store_path()).await?;
    let network = if config.persist_remote {
        SimulatedNetworkDataSource::with_snapshot(
            config.remote_snapshot_path(),
            config.network_latency,
        )
        .await?
    } else {
        SimulatedNetworkDataSource::new(config.network_latency)
    };
    if config.offline {
        network.set_unavailable(true);
    }
    tracing::debug!("Simulated remote latency: {:?}", network.latency());

    Ok(Arc::new(DefaultTaskRepository::new(
        Arc::new(local),
        Arc::new(network),
    )))
}

/// Save the add/edit screen, printing any message. Returns whether it saved.
async fn save(vm: &AddEditTaskViewModel) -> Result<bool> {
    match vm.save_task() {
        Some(handle) => handle.await?,
        None => {
            print_message(vm.ui_state().user_message);
            return Ok(false);
        }
    }
    let state = vm.ui_state();
    if !state.is_task_saved {
        print_message(state.user_message);
    }
    Ok(state.is_task_saved)
}

async fn set_completed(
    repository: Arc<dyn TaskRepository>,
    id: String,
    completed: bool,
) -> Result<()> {
    let vm = TaskDetailViewModel::new(repository, id);
    vm.refresh().await?;
    if vm.ui_state().task.is_none() {
        print_message(vm.ui_state().user_message);
        return Ok(());
    }
    vm.set_completed(completed).await?;
    print_message(vm.ui_state().user_message);
    Ok(())
}

async fn show_list_with_message(repository: Arc<dyn TaskRepository>, message: UserMessage) {
    let vm = TasksViewModel::new(repository, TasksFilterType::AllTasks);
    vm.settled().await;
    vm.show_edit_result_message(message);
    print_tasks(&vm.ui_state());
}

fn print_tasks(state: &TasksUiState) {
    println!("{}", state.filtering_ui_info.current_filtering_label);
    if state.items.is_empty() {
        println!("  {}", state.filtering_ui_info.no_tasks_label);
    }
    for task in &state.items {
        let mark = if task.is_completed { "x" } else { " " };
        println!("  [{}] {}  {}", mark, task.title_for_list(), task.id);
    }
    if let Some(message) = state.user_message {
        println!("{}", message);
    }
}

fn print_task(task: &Task) {
    let status = if task.is_completed { "completed" } else { "active" };
    println!("{} ({})", task.title, status);
    println!("{}", task.description);
    println!("id: {}", task.id);
}

fn print_message(message: Option<UserMessage>) {
    if let Some(message) = message {
        println!("{}", message);
    }
}
