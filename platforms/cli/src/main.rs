use clap::Parser;
use log::info;
use std::error::Error;
use std::io::{self, Read};
use std::path::PathBuf;
use turgen::analyzer::diagnose;
use turgen::loader::ProgramLoader;
use turgen::machine::TuringMachine;
use turgen::programs::ProgramManager;
use turgen::tape::Tape;
use turgen::view::{DisplayOptions, Snapshot};
use turgen::{MachineConfig, Program, TuringMachineError};

/// Runs a Turing machine written as a standard description.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  turgen-cli demos/busy-beaver-3.sd
  turgen-cli --demo \"Busy Beaver 2\" --debug
  cat machine.sd | turgen-cli --genome --json")]
struct Cli {
    /// Path to a standard description file (.sd).
    /// Can also pipe the description via stdin.
    program_file: Option<PathBuf>,

    /// Run a built-in demo by title instead of a file
    #[clap(long, conflicts_with = "program_file")]
    demo: Option<String>,

    /// List the built-in demos and exit
    #[clap(long)]
    list: bool,

    /// Initial tape as symbol tokens, e.g. "S1 S1 S0"
    #[clap(short, long)]
    input: Option<String>,

    /// Print every step of the execution
    #[clap(short, long)]
    debug: bool,

    /// Print the genome encodings of every rule before running
    #[clap(short, long)]
    genome: bool,

    /// Print the final snapshot as JSON
    #[clap(long)]
    json: bool,

    /// Analyze the description and exit without running it
    #[clap(long)]
    check: bool,

    /// Tape size at which the run is aborted (0 disables the ceiling)
    #[clap(long)]
    max_tape: Option<usize>,

    /// Number of steps after which the run is aborted (0 disables the limit)
    #[clap(long)]
    max_steps: Option<usize>,

    /// JSON machine configuration; flags above take precedence
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Number of tape cells shown around the head
    #[clap(short, long, default_value_t = 21)]
    window: usize,

    /// Log at debug level unless RUST_LOG says otherwise
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    if cli.list {
        for (index, name) in ProgramManager::list_program_names()?.iter().enumerate() {
            let info = ProgramManager::get_program_info(index)?;
            println!(
                "{}: {} ({} states, {} rules)",
                index, name, info.state_count, info.transition_count
            );
        }
        return Ok(());
    }

    let program = load_program(cli)?;

    if cli.check {
        return check(&program);
    }

    if cli.genome {
        print_genome(&program);
    }

    let config = machine_config(cli)?;
    let mut machine = TuringMachine::with_config(program, config.clone());
    if let Some(input) = &cli.input {
        machine.set_tape(Tape::from_tokens(input, config.tape_size, config.fill)?);
    }

    let options = DisplayOptions {
        window: cli.window,
        ..DisplayOptions::default()
    };

    let result = if cli.debug {
        println!("{}\n", Snapshot::capture(&machine, &options).render(&options));
        machine.run_with(|m| println!("{}\n", Snapshot::capture(m, &options).render(&options)))
    } else {
        machine.run()
    };

    // The final frame is printed even when the run failed.
    let snapshot = Snapshot::capture(&machine, &options);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else if !cli.debug {
        println!("{}", snapshot.render(&options));
    }

    result?;
    info!("Done after {} steps", machine.step_count());
    Ok(())
}

/// Loads the description from `--demo`, the file argument, or piped stdin, in that order.
fn load_program(cli: &Cli) -> Result<Program, Box<dyn Error>> {
    if let Some(name) = &cli.demo {
        Ok(ProgramManager::get_program_by_name(name)?)
    } else if let Some(path) = &cli.program_file {
        Ok(ProgramLoader::load_program(path)?)
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        Ok(ProgramLoader::load_program_from_string(&buffer)?)
    } else {
        Err("No description given: pass a file, pipe one via stdin, or use --demo".into())
    }
}

fn machine_config(cli: &Cli) -> Result<MachineConfig, TuringMachineError> {
    let mut config = match &cli.config {
        Some(path) => ProgramLoader::load_config(path)?,
        None => MachineConfig::default(),
    };

    if let Some(max_tape) = cli.max_tape {
        config.max_tape_size = limit(max_tape);
    }
    if let Some(max_steps) = cli.max_steps {
        config.max_steps = limit(max_steps);
    }

    Ok(config)
}

/// Zero means no limit.
fn limit(value: usize) -> Option<usize> {
    (value > 0).then_some(value)
}

fn check(program: &Program) -> Result<(), Box<dyn Error>> {
    let findings = diagnose(program);
    if findings.is_empty() {
        println!("No issues found");
        return Ok(());
    }

    for finding in &findings {
        eprintln!("{}", TuringMachineError::from(finding.clone()));
    }
    Err(format!("{} issue(s) found", findings.len()).into())
}

fn print_genome(program: &Program) {
    for (index, t) in program.transitions().iter().enumerate() {
        println!(
            "#{:<3} {} {} -> {} {} {:<6} sd={} sig={} num={}",
            index,
            t.state,
            t.read.token(),
            t.write.token(),
            t.direction.as_char(),
            t.next_state,
            t.gene.sd,
            t.gene.sig,
            t.gene.num
        );
    }
    println!("genome {}", program.genome());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_flags_override_defaults() {
        let cli = Cli::try_parse_from(["turgen-cli", "--max-tape", "0", "--max-steps", "50"])
            .unwrap();
        let config = machine_config(&cli).unwrap();

        assert_eq!(config.max_tape_size, None);
        assert_eq!(config.max_steps, Some(50));
        assert_eq!(config.tape_size, MachineConfig::default().tape_size);
    }

    #[test]
    fn test_demo_conflicts_with_file() {
        let result = Cli::try_parse_from(["turgen-cli", "machine.sd", "--demo", "Alternating"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_demo() {
        let cli = Cli::try_parse_from(["turgen-cli", "--demo", "busy beaver 2"]).unwrap();
        let program = load_program(&cli).unwrap();
        assert_eq!(program.title.as_deref(), Some("Busy Beaver 2"));
    }
}
