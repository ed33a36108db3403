use std::{convert::TryFrom, path::PathBuf, process};

use structopt::{clap::AppSettings, StructOpt};
use tracing_subscriber::*;

use rollcall::{
    report,
    settings::{RedisSettings, Settings},
    storage::{redis::Client, RosterStorage},
    Roster,
    RollcallError,
    Selector,
};

#[macro_use]
extern crate tracing;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "rollcall",
    about = "Picks students at random, favoring those picked less often",
    setting = AppSettings::ArgRequiredElseHelp,
    global_settings = &[AppSettings::VersionlessSubcommands, AppSettings::DisableHelpSubcommand]
)]
struct Opt {
    /// Path of the configuration file
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, StructOpt)]
enum Command {
    /// Selects a number of students and increments their counters
    #[structopt(alias = "s")]
    Select {
        /// The number of students to select
        #[structopt(allow_hyphen_values = true)]
        sample: i64,
    },
    /// Resets the counter of a student
    #[structopt(alias = "r")]
    Reset {
        /// The name of the student
        name: String,
        /// The new value of the counter
        #[structopt(default_value = "0")]
        count: u64,
    },
    /// Resets the counters of all students
    #[structopt(name = "reset-all", alias = "ra")]
    ResetAll {
        /// The new value of the counters
        #[structopt(default_value = "0")]
        count: u64,
    },
    /// Imports students from a CSV file
    #[structopt(alias = "l")]
    Load {
        /// The file to import, one `name,count` record per line
        #[structopt(parse(from_os_str))]
        file: PathBuf,
        /// Skips the first line of the file
        #[structopt(short, long)]
        skip: bool,
    },
    /// Exports all students as CSV
    #[structopt(alias = "e")]
    Export {
        /// The file to write
        #[structopt(parse(from_os_str))]
        file: PathBuf,
    },
    /// Prints this message or the help of the given subcommand
    #[structopt(alias = "h")]
    Help {
        /// The subcommand to describe
        command: Option<String>,
    },
}

fn main() {
    let opt = Opt::from_args();
    if let Command::Help { command } = opt.command {
        print_help(command);
        return;
    }

    let settings = Settings::new(opt.config.as_ref()).unwrap_or_else(|err| {
        eprintln!("{}", err);
        process::exit(1);
    });
    let Settings {
        redis: redis_settings,
        log: log_settings,
        selection: selection_settings,
    } = settings;

    let _fmt_subscriber = FmtSubscriber::builder()
        .with_env_filter(log_settings.filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .init();

    if let Err(err) = run(opt.command, redis_settings, selection_settings.seed) {
        eprintln!("{}", err);
        process::exit(1);
    }
}

fn run(
    command: Command,
    redis_settings: RedisSettings,
    seed: Option<u64>,
) -> Result<(), RollcallError> {
    let mut store = Client::new(redis_settings.url, redis_settings.key)
        .map_err(|err| RollcallError::StoreUnavailable(err.into()))?;
    store.is_ready()?;

    let mut roster = Roster::new(store, Selector::from_seed(seed));
    match command {
        Command::Select { sample } => {
            let picks = roster.select(sample_size(sample))?;
            println!("{}", report::render(&picks));
        }
        Command::Reset { name, count } => roster.reset(&name, count)?,
        Command::ResetAll { count } => roster.reset_all(count)?,
        Command::Load { file, skip } => {
            let imported = roster.import(&file, skip)?;
            debug!("imported {} students from {}", imported, file.display());
        }
        Command::Export { file } => {
            let exported = roster.export(&file)?;
            debug!("exported {} students to {}", exported, file.display());
        }
        Command::Help { .. } => {}
    }
    Ok(())
}

/// Prints the help of the program, or of `command` if given, and exits.
fn print_help(command: Option<String>) {
    let mut args = vec!["rollcall".to_string()];
    args.extend(command);
    args.push("--help".into());
    Opt::from_iter(args);
}

/// Converts the requested sample size. A negative sample size selects nobody.
fn sample_size(sample: i64) -> usize {
    usize::try_from(sample).unwrap_or(0)
}
