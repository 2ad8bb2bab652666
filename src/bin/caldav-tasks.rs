//! A command-line front-end to a CalDAV task list
//!
//! The server and the account are read from the `CALDAV_URL`, `CALDAV_USERNAME` and `CALDAV_PASSWORD` environment variables.

use caldav_tasks::provider::refresh_progress::feedback_channel;
use caldav_tasks::utils::{print_calendar_list, NO_TASKS_MESSAGE};
use caldav_tasks::{CalDavError, Command, CommandOutcome, EnvCredentials, Provider, RefreshStatus};

const USAGE: &str = "Usage: caldav-tasks [list [<calendar name>] | add <summary> | toggle <uid> | delete <uid>]";
const NOT_CONFIGURED_MESSAGE: &str = "Configure server in settings";


#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut provider = Provider::new(EnvCredentials);

    if let Err(err) = run(&mut provider, &args).await {
        match err {
            CalDavError::NotConfigured => println!("{}", NOT_CONFIGURED_MESSAGE),
            err => {
                eprintln!("Error: {}", err);
                std::process::exit(1);
            },
        }
    }
}

async fn run(provider: &mut Provider<EnvCredentials>, args: &[String]) -> Result<(), CalDavError> {
    let (sender, mut receiver) = feedback_channel();
    let watcher = tokio::spawn(async move {
        while receiver.changed().await.is_ok() {
            log::info!("{}", *receiver.borrow());
        }
    });
    let status = provider.refresh_with_feedback(sender).await;
    let _ = watcher.await;

    if status? == RefreshStatus::NotConfigured {
        return Err(CalDavError::NotConfigured);
    }

    let command = match args.get(0).map(|s| s.as_str()) {
        None | Some("list") => {
            if let Some(name) = args.get(1) {
                let calendar = provider.store().calendars()
                    .iter()
                    .find(|cal| cal.name() == name.as_str())
                    .map(|cal| cal.url().clone())
                    .ok_or(CalDavError::NoCalendar)?;
                provider.select_calendar(Some(calendar));
            }
            print_calendar_list(provider.store());
            return Ok(());
        },
        Some("add") if args.len() > 1 => Command::Create(args[1..].join(" ")),
        Some("toggle") if args.len() == 2 => Command::ToggleComplete(args[1].clone()),
        Some("delete") if args.len() == 2 => Command::Delete(args[1].clone()),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        },
    };

    match provider.execute(command).await? {
        CommandOutcome::Created{ url, .. } => println!("Created {}", url),
        CommandOutcome::Toggled{ uid, completed } => println!("{} is now {}", uid, if completed { "completed" } else { "not completed" }),
        CommandOutcome::Deleted{ uid } => println!("Deleted {}", uid),
        CommandOutcome::Refreshed(_) | CommandOutcome::Selected => (),
    }
    if provider.store().filtered().is_empty() {
        println!("{}", NO_TASKS_MESSAGE);
    }
    Ok(())
}
