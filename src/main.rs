//! Agent hook entry point.

use agent_hook_guards::analysis::{Context, Guard, HookEvent, decide, decide_event};
use agent_hook_guards::config::Config;
use agent_hook_guards::decision::Decision;
use agent_hook_guards::input::{InputError, ToolInvocation};
use agent_hook_guards::logging;
use agent_hook_guards::output::{HookResponse, format_response};
use agent_hook_guards::state::{FileRateStore, FileSessionStore};
use agent_hook_guards::subprocess::SystemRunner;

use chrono::Utc;
use clap::Parser;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

/// Policy checks for AI agent tool calls.
///
/// Reads one JSON tool invocation on stdin, prints a JSON decision on stdout,
/// and exits 0 to proceed or 2 to block.
#[derive(Parser, Debug)]
#[command(name = "agent-hooks", version)]
struct Args {
    /// Guard or lifecycle event to evaluate
    target: Option<String>,

    /// Print guard and event names
    #[arg(long)]
    list: bool,
}

#[derive(Clone, Copy)]
enum Target {
    Guard(Guard),
    Event(HookEvent),
}

fn fail_open() -> ExitCode {
    println!("{}", HookResponse::fail_open().to_json());
    ExitCode::SUCCESS
}

fn read_input() -> Result<ToolInvocation, InputError> {
    let mut raw = String::new();
    io::stdin().read_to_string(&mut raw)?;
    ToolInvocation::parse(&raw)
}

fn main() -> ExitCode {
    logging::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            eprint!("{e}");
            return fail_open();
        }
        Err(e) => e.exit(),
    };

    if args.list {
        for guard in Guard::ALL {
            println!("{}", guard.name());
        }
        for event in HookEvent::ALL {
            println!("{}", event.name());
        }
        return ExitCode::SUCCESS;
    }

    let Some(name) = args.target else {
        tracing::warn!("no guard named, allowing");
        return fail_open();
    };

    let target = if let Some(guard) = Guard::from_name(&name) {
        Target::Guard(guard)
    } else if let Some(event) = HookEvent::from_name(&name) {
        Target::Event(event)
    } else {
        tracing::warn!(name = %name, "unknown guard, allowing");
        return fail_open();
    };

    let process_cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = Config::from_env(&process_cwd);

    if let Target::Guard(guard) = target
        && config.is_disabled(guard.name())
    {
        return fail_open();
    }

    let input = match read_input() {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!(error = %e, "unreadable hook input, allowing");
            return fail_open();
        }
    };

    let cwd = match input.cwd() {
        "" => process_cwd,
        dir => PathBuf::from(dir),
    };
    let rate_store = FileRateStore::new(&config.rate_dir);
    let session_store = FileSessionStore::new(&config.session_dir);
    let ctx = Context {
        config: &config,
        cwd,
        rate_store: &rate_store,
        session_store: &session_store,
        runner: &SystemRunner,
        now: Utc::now(),
    };

    let decision: Decision = match target {
        Target::Guard(guard) => decide(guard, &input, &ctx),
        Target::Event(event) => decide_event(event, &input, &ctx),
    };

    println!("{}", format_response(&decision));
    ExitCode::from(decision.exit_code())
}
