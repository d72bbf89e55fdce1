use crate::collectors::{COLLECTOR_NAMES, Collector, all_factories};
use clap::{Arg, ArgAction, Command};

/// Statements each step runs, shown in `--help`.
fn step_queries(name: &str) -> &'static str {
    match name {
        "default" => "SHOW GLOBAL STATUS, SHOW GLOBAL VARIABLES",
        "innodb" => "SHOW ENGINE INNODB STATUS",
        "replication" => "SHOW BINARY LOGS, SHOW SLAVE STATUS",
        _ => "",
    }
}

fn leak(text: String) -> &'static str {
    Box::leak(text.into_boxed_str())
}

/// `--collector.<step>` and `--no-collector.<step>`; the last one given wins.
fn step_args(name: &str, enabled_by_default: bool) -> [Arg; 2] {
    let run = leak(format!("collector.{name}"));
    let skip = leak(format!("no-collector.{name}"));
    let queries = step_queries(name);
    let default = if enabled_by_default { "runs" } else { "skipped" };

    [
        Arg::new(run)
            .long(run)
            .help(leak(format!("Run the {name} step ({queries}) [default: {default}]")))
            .action(ArgAction::SetTrue)
            .default_value(if enabled_by_default { "true" } else { "false" }),
        Arg::new(skip)
            .long(skip)
            .help(leak(format!("Skip the {name} step")))
            .action(ArgAction::SetTrue)
            .overrides_with(run),
    ]
}

pub fn add_collectors_args(cmd: Command) -> Command {
    let factories = all_factories();

    COLLECTOR_NAMES.iter().fold(cmd, |cmd, &name| {
        let enabled = factories
            .get(name)
            .is_some_and(|factory| factory().enabled_by_default());
        cmd.args(step_args(name, enabled))
    })
}
