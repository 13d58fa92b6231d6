//! Command line frontend
//!
//! Presets are registered at runtime from configuration files, so the
//! command is assembled with the clap builder API. Options take effect in
//! the order they appear on the command line: a preset given after `-t`
//! merges on top of it, and `-I`/`-r` act immediately at their position.

use crate::config::RunContext;
use anyhow::Result;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use testrig_config::registry::{COMMON_PRESET, DEFAULT_PRESET};
use testrig_config::{ConfigBuilder, Registry};

/// Long names taken by built-in options; presets may not shadow them
const RESERVED_LONGS: &[&str] = &[
    "format",
    "tapy",
    "tapj",
    "tag",
    "unit",
    "match",
    "loadpath",
    "require",
    "verbose",
    "autopath",
    "no-autopath",
    "chdir",
    "ansi",
    "no-ansi",
    "debug",
    "help",
    "version",
];

const PRESET_PREFIX: &str = "preset:";

/// A command line option, tagged with its argv position when collected
#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Preset(String),
    Format(String),
    Tag(String),
    Unit(String),
    Match(String),
    Loadpath(String),
    Require(String),
    Verbose,
    Autopath(bool),
    Chdir(String),
    Ansi(bool),
}

/// Presets that can be offered as flags
fn flag_presets(registry: &Registry) -> Vec<&str> {
    registry
        .presets()
        .into_iter()
        .filter(|name| {
            let reserved = RESERVED_LONGS.contains(name);
            if reserved {
                tracing::warn!(preset = name, "preset name collides with a built-in option");
            }
            !reserved
        })
        .collect()
}

/// Build the `testrig` command with a flag for every preset.
pub fn command(registry: &Registry) -> Command {
    let mut command = Command::new("testrig")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run a test suite and report the results")
        .args_override_self(true)
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("NAME")
                .action(ArgAction::Append)
                .help("Report format (dotprogress, tapj, tapy)"),
        )
        .arg(
            Arg::new("tapy")
                .short('y')
                .long("tapy")
                .action(ArgAction::SetTrue)
                .help("Shortcut for --format=tapy"),
        )
        .arg(
            Arg::new("tapj")
                .short('j')
                .long("tapj")
                .action(ArgAction::SetTrue)
                .help("Shortcut for --format=tapj"),
        )
        .arg(
            Arg::new("tag")
                .short('t')
                .long("tag")
                .value_name("TAG")
                .action(ArgAction::Append)
                .help("Select tests by tag"),
        )
        .arg(
            Arg::new("unit")
                .short('u')
                .long("unit")
                .value_name("UNIT")
                .action(ArgAction::Append)
                .help("Select tests by unit name"),
        )
        .arg(
            Arg::new("match")
                .short('m')
                .long("match")
                .value_name("TEXT")
                .action(ArgAction::Append)
                .help("Select tests whose path contains TEXT"),
        )
        .arg(
            Arg::new("loadpath")
                .short('I')
                .long("loadpath")
                .value_name("PATH")
                .action(ArgAction::Append)
                .help("Add directories to the load path"),
        )
        .arg(
            Arg::new("require")
                .short('r')
                .long("require")
                .value_name("FILE")
                .action(ArgAction::Append)
                .help("Run a setup file before the suite"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Report omissions too"),
        )
        .arg(
            Arg::new("autopath")
                .long("autopath")
                .action(ArgAction::SetTrue)
                .help("Add project load paths"),
        )
        .arg(
            Arg::new("no-autopath")
                .long("no-autopath")
                .action(ArgAction::SetTrue)
                .help("Do not add project load paths"),
        )
        .arg(
            Arg::new("chdir")
                .short('C')
                .long("chdir")
                .value_name("DIR")
                .action(ArgAction::Append)
                .help("Change to DIR before running tests"),
        )
        .arg(
            Arg::new("ansi")
                .long("ansi")
                .action(ArgAction::SetTrue)
                .help("Force ANSI styling"),
        )
        .arg(
            Arg::new("no-ansi")
                .long("no-ansi")
                .action(ArgAction::SetTrue)
                .help("Disable ANSI styling"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Show full error context"),
        )
        .arg(
            Arg::new("files")
                .value_name("FILES")
                .num_args(1..)
                .action(ArgAction::Append)
                .help("Test files or directories (default: test/)"),
        );

    for name in flag_presets(registry) {
        command = command.arg(
            Arg::new(format!("{PRESET_PREFIX}{name}"))
                .long(name.to_string())
                .action(ArgAction::SetTrue)
                .help(format!("Apply the '{name}' preset"))
                .help_heading("Presets"),
        );
    }
    command
}

fn collect_values(
    matches: &ArgMatches,
    id: &str,
    make: fn(String) -> Event,
    events: &mut Vec<(usize, Event)>,
) {
    if let (Some(values), Some(indices)) = (matches.get_many::<String>(id), matches.indices_of(id)) {
        events.extend(indices.zip(values).map(|(index, value)| (index, make(value.clone()))));
    }
}

fn collect_flag(matches: &ArgMatches, id: &str, event: Event, events: &mut Vec<(usize, Event)>) {
    if matches.value_source(id) != Some(ValueSource::CommandLine) {
        return;
    }
    if let Some(index) = matches.indices_of(id).and_then(|indices| indices.last()) {
        events.push((index, event));
    }
}

/// Options in the order they were given
fn events(matches: &ArgMatches, presets: &[&str]) -> Vec<Event> {
    let mut events = Vec::new();

    collect_values(matches, "format", Event::Format, &mut events);
    collect_values(matches, "tag", Event::Tag, &mut events);
    collect_values(matches, "unit", Event::Unit, &mut events);
    collect_values(matches, "match", Event::Match, &mut events);
    collect_values(matches, "loadpath", Event::Loadpath, &mut events);
    collect_values(matches, "require", Event::Require, &mut events);
    collect_values(matches, "chdir", Event::Chdir, &mut events);

    collect_flag(matches, "tapy", Event::Format("tapy".to_string()), &mut events);
    collect_flag(matches, "tapj", Event::Format("tapj".to_string()), &mut events);
    collect_flag(matches, "verbose", Event::Verbose, &mut events);
    collect_flag(matches, "autopath", Event::Autopath(true), &mut events);
    collect_flag(matches, "no-autopath", Event::Autopath(false), &mut events);
    collect_flag(matches, "ansi", Event::Ansi(true), &mut events);
    collect_flag(matches, "no-ansi", Event::Ansi(false), &mut events);
    for name in presets {
        let id = format!("{PRESET_PREFIX}{name}");
        collect_flag(matches, &id, Event::Preset(name.to_string()), &mut events);
    }

    events.sort_by_key(|(index, _)| *index);
    events.into_iter().map(|(_, event)| event).collect()
}

fn apply(
    event: Event,
    registry: &Registry,
    config: &mut ConfigBuilder,
    context: &mut RunContext,
) -> Result<()> {
    match event {
        Event::Preset(name) => registry.apply_preset(&name, config)?,
        Event::Format(name) => {
            config.format(name);
        }
        // Filter values are taken whole, separators included
        Event::Tag(tag) => {
            config.tags(vec![tag]);
        }
        Event::Unit(unit) => {
            config.units(vec![unit]);
        }
        Event::Match(text) => {
            config.matches(vec![text]);
        }
        Event::Loadpath(list) => {
            context.prepend_load_path(&list);
            config.loadpath(list);
        }
        Event::Require(file) => {
            let path = context.locate(&file)?;
            context.require(&path)?;
            config.requires(vec![path.display().to_string()]);
        }
        Event::Verbose => {
            config.verbose(true);
        }
        Event::Autopath(enabled) => {
            config.autopath(enabled);
        }
        Event::Chdir(dir) => {
            config.chdir(dir);
        }
        Event::Ansi(enabled) => context.ansi = enabled,
    }
    Ok(())
}

/// Parse the command line into the active configuration.
///
/// Starts from the default profile, applies `common`, then every option in
/// argv order, then `default` when no preset flag was given. Positional
/// arguments replace the file list. `--debug` takes effect before any other
/// option. Help, version and usage errors come back as a [`clap::Error`]
/// inside the returned error.
pub fn parse<I, T>(registry: &Registry, context: &mut RunContext, args: I) -> Result<ConfigBuilder>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command(registry).try_get_matches_from(args)?;
    if matches.get_flag("debug") {
        context.debug = true;
    }

    let mut config = registry.profile("").cloned().unwrap_or_default();
    if registry.profile(COMMON_PRESET).is_some() {
        registry.apply_preset(COMMON_PRESET, &mut config)?;
    }

    let presets = flag_presets(registry);
    let mut preset_given = false;
    for event in events(&matches, &presets) {
        preset_given |= matches!(event, Event::Preset(_));
        apply(event, registry, &mut config, context)?;
    }

    if !preset_given && registry.profile(DEFAULT_PRESET).is_some() {
        registry.apply_preset(DEFAULT_PRESET, &mut config)?;
    }

    if let Some(files) = matches.get_many::<String>("files") {
        config.set_files(files.cloned().collect::<Vec<_>>());
    }

    Ok(config)
}
