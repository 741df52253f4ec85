use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use worktrack::api::HttpStore;
use worktrack::cli::{Cli, Command};
use worktrack::config::WorkTrackConfig;
use worktrack::lifecycle::{Action, Actor, Application, ApplicationStatus, Transition};
use worktrack::store::{MemoryStore, SessionStore};
use worktrack::tracker::WorkTracker;
use worktrack::ui::{self, ActionProgress};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::Demo = cli.command {
        return run_demo().await;
    }

    let mut config = WorkTrackConfig::load()?;
    if let Some(role) = cli.role {
        config.role = role.into();
    }
    if let Some(user) = &cli.user {
        config.user_id = user.clone();
    }
    if config.user_id.is_empty() {
        bail!("No user configured. Set `user_id` in worktrack.toml or pass --user.");
    }

    let actor = Actor {
        id: config.user_id.clone(),
        role: config.role,
    };
    let store = HttpStore::from_config(&config)?;
    let mut tracker = WorkTracker::new(store, actor);

    match &cli.command {
        Command::Create { job, daily_payment } => {
            let progress = ActionProgress::start(&format!("Creating work session for job {job}"));
            let result = tracker.create(job, *daily_payment).await;
            report(&progress, Action::Create, result)?;
        }
        Command::List => {
            tracker.refresh().await?;
            ui::print_view(tracker.view());
        }
        Command::Summary => {
            tracker.refresh().await?;
            if let Some(summary) = &tracker.view().summary {
                ui::print_summary(summary);
            }
        }
        Command::Jobs => {
            let jobs = tracker.accepted_jobs().await?;
            ui::print_jobs(&jobs);
        }
        command => {
            if let Some((action, session_id, notes)) = command.transition() {
                let progress = ActionProgress::start(&format!("{action}: session {session_id}"));
                let result = tracker.perform(action, session_id, notes).await;
                report(&progress, action, result)?;
            }
        }
    }

    Ok(())
}

fn report(
    progress: &ActionProgress,
    action: Action,
    result: worktrack::Result<worktrack::lifecycle::WorkSession>,
) -> Result<()> {
    match result {
        Ok(session) => {
            progress.succeed(action, &session);
            Ok(())
        }
        Err(err) => {
            progress.finish();
            Err(err).with_context(|| format!("failed to {action}"))
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("worktrack=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Walk one session through the handshake against an in-memory store.
async fn run_demo() -> Result<()> {
    println!("worktrack demo: one session through the approval handshake\n");

    let worker = Actor::worker("worker-1");
    let employer = Actor::employer("employer-1");
    let store = MemoryStore::with_applications([Application {
        id: "application-1".into(),
        job_id: "job-1".into(),
        worker_id: worker.id.clone(),
        employer_id: employer.id.clone(),
        status: ApplicationStatus::Accepted,
        job_title: Some("Warehouse loader".into()),
        job_company: Some("Kigali Logistics".into()),
    }]);
    let mut tracker = WorkTracker::new(store, worker.clone());

    let session = tracker.create("job-1", 5000).await?;
    println!("  created session {} (RWF 5,000 / day)", session.id);

    let progress = ActionProgress::start("Starting work before the employer approves");
    match tracker
        .perform(Action::RequestStart, &session.id, None)
        .await
    {
        Err(err) => progress.fail(&err.to_string()),
        Ok(_) => {
            progress.finish();
            bail!("starting before approval should have been rejected");
        }
    }

    let steps = [
        (&employer, Action::ApproveStart, Some("Report at gate 2")),
        (&worker, Action::RequestStart, None),
        (&worker, Action::RequestEnd, Some("Loaded both trucks")),
        (&employer, Action::ApproveEnd, Some("Paid in full")),
    ];
    let mut phase = session.phase();
    for (actor, action, notes) in steps {
        let updated = tracker
            .store()
            .transition(actor, &session.id, action, notes.map(str::to_string))
            .await?;
        ui::print_transition(&Transition {
            session_id: updated.id.clone(),
            action,
            from: phase,
            to: updated.phase(),
        });
        phase = updated.phase();
    }

    tracker.refresh().await?;
    ui::print_view(tracker.view());
    Ok(())
}
