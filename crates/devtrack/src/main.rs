//! devtrack command-line front end
//!
//! Opens the issue store in the configured data directory, runs one command,
//! and flushes any pending write before exiting.

use anyhow::Result;
use clap::Parser;
use devtrack::cli::{Cli, Commands};
use devtrack::config::{resolve_data_dir, DevtrackConfig};
use devtrack::domain::{validate_title, NewIssue, Priority, Status};
use devtrack::errors::DevtrackError;
use devtrack::output::{
    format_counts, format_issue_details, format_issue_line, ExitCode, IssueListResponse,
    JsonError, JsonOutput, OutputContext, StatsResponse,
};
use devtrack::sink::TracingSink;
use devtrack::storage::JsonFileStorage;
use devtrack::store::{IssueStore, LoadOutcome};
use devtrack::StatusFilter;
use tracing::debug;
use tracing_subscriber::EnvFilter;

type Store = IssueStore<JsonFileStorage, TracingSink>;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = OutputContext::new(cli.quiet, cli.json);
    let command = cli.command.name();

    let exit_code = match run(cli, &output) {
        Ok(()) => ExitCode::Success,
        Err(e) => report_error(&e, command, &output),
    };

    if exit_code != ExitCode::Success {
        std::process::exit(exit_code.code());
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "devtrack=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn report_error(error: &anyhow::Error, command: &str, output: &OutputContext) -> ExitCode {
    let domain_error = error.downcast_ref::<DevtrackError>();

    if output.is_json() {
        let json = match domain_error {
            Some(e) => JsonError::from_error(e, command),
            None => JsonError::new("EXTERNAL_ERROR", format!("{:#}", error), command),
        };
        match json.to_json_string() {
            Ok(text) => println!("{}", text),
            Err(_) => eprintln!("Error: {:#}", error),
        }
    } else {
        match domain_error {
            Some(e) => eprint!("{}", e.to_actionable()),
            None => eprintln!("Error: {:#}", error),
        }
    }

    match domain_error {
        Some(e) => ExitCode::for_error(e),
        None => ExitCode::ExternalError,
    }
}

fn run(cli: Cli, output: &OutputContext) -> Result<()> {
    let data_dir = resolve_data_dir(cli.data_dir);
    let config = DevtrackConfig::load(&data_dir)?.with_env_overrides()?;
    let options = config.store_options();
    let storage = JsonFileStorage::new(&data_dir);
    debug!(data_dir = %data_dir.display(), key = %options.key, "Using data directory");

    let mut store = Store::new(storage, TracingSink, options);
    if store.load() == Some(LoadOutcome::Recovered) {
        output.print_warning("Saved issues could not be read; starting from the example issues")?;
    }

    execute(cli.command, &mut store, output)?;
    store.flush()?;
    Ok(())
}

fn execute(command: Commands, store: &mut Store, output: &OutputContext) -> Result<()> {
    match command {
        Commands::Add {
            title,
            description,
            priority,
            status,
            assignee,
        } => {
            let mut data = NewIssue::new(title)
                .with_description(description)
                .with_priority(priority.parse::<Priority>()?)
                .with_status(status.parse::<Status>()?);
            if let Some(assignee) = assignee {
                data = data.with_assignee(assignee);
            }

            let issue = store.add_issue(data)?;
            output.print_json(&JsonOutput::success(&issue, "add"))?;
            output.print_success("Issue created successfully!")?;
            output.print_data(&issue.id)?;
        }

        Commands::List { search, status } => {
            let filter = status.parse::<StatusFilter>()?;
            let issues = store.filter(&search, filter);

            output.print_json(&JsonOutput::success(
                IssueListResponse {
                    count: issues.len(),
                    issues: issues.clone(),
                    search: &search,
                    status: filter.to_string(),
                },
                "list",
            ))?;
            if issues.is_empty() {
                output.print_success("No issues found")?;
            }
            for issue in issues {
                output.print_data(format_issue_line(issue))?;
            }
        }

        Commands::Show { id } => {
            let issue = store.get(&id).ok_or_else(|| DevtrackError::not_found(&id))?;
            output.print_json(&JsonOutput::success(issue, "show"))?;
            output.print_data(format_issue_details(issue))?;
        }

        Commands::Update {
            id,
            title,
            description,
            priority,
            status,
            assignee,
        } => {
            let mut edited = store
                .get(&id)
                .cloned()
                .ok_or_else(|| DevtrackError::not_found(&id))?;

            if let Some(title) = title {
                validate_title(&title)?;
                edited.title = title;
            }
            if let Some(description) = description {
                edited.description = description;
            }
            if let Some(priority) = priority {
                edited.priority = priority.parse()?;
            }
            if let Some(status) = status {
                edited.status = status.parse()?;
            }
            if let Some(assignee) = assignee {
                edited.assignee = assignee;
            }

            let updated = store
                .update_issue(edited)
                .ok_or_else(|| DevtrackError::not_found(&id))?;
            output.print_json(&JsonOutput::success(&updated, "update"))?;
            output.print_success("Issue updated successfully!")?;
        }

        Commands::Delete { id } => {
            if !store.delete_issue(&id) {
                return Err(DevtrackError::not_found(id).into());
            }
            output.print_json(&JsonOutput::success(
                serde_json::json!({ "deleted": id }),
                "delete",
            ))?;
            output.print_success("Issue deleted successfully!")?;
        }

        Commands::Stats => {
            let counts = store.aggregate_counts();
            output.print_json(&JsonOutput::success(
                StatsResponse {
                    counts,
                    total: counts.total(),
                },
                "stats",
            ))?;
            output.print_data(format_counts(&counts))?;
        }

        Commands::Reset => {
            store.reset()?;
            output.print_json(&JsonOutput::success(
                serde_json::json!({ "cleared": store.key() }),
                "reset",
            ))?;
            output.print_success("Saved issues cleared; example issues will be used from now on")?;
        }
    }

    Ok(())
}
