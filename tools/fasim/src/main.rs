use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::stdout;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use log::debug;

use fasim_automata::Automaton;
use fasim_automata::AutomatonFormat;
use fasim_automata::Determinism;
use fasim_automata::Dfa;
use fasim_automata::Nfa;
use fasim_automata::ReferencePolicy;
use fasim_automata::TransitionTable;
use fasim_automata::guess_format_from_extension;
use fasim_automata::read_dfa;
use fasim_automata::read_nfa;
use fasim_automata::subset_construction;
use fasim_automata::write_afd;
use fasim_utilities::FasimError;
use fasim_utilities::Timing;

use verbosity::VerbosityFlag;

mod verbosity;

#[derive(clap::Parser, Debug)]
#[command(name = "fasim", about = "A command line tool for finite automata", version)]
struct Cli {
    #[command(flatten)]
    verbosity: VerbosityFlag,

    #[command(flatten)]
    load: LoadArgs,

    #[command(subcommand)]
    commands: Option<Commands>,

    #[arg(long, global = true, help = "Print the time spent in every phase")]
    timings: bool,
}

/// Determines how an automaton file is read.
#[derive(clap::Args, Debug)]
struct LoadArgs {
    #[arg(long, global = true, help = "Explicitly specify the automaton file format")]
    format: Option<AutomatonFormat>,

    #[arg(
        long,
        global = true,
        default_value = "skip",
        help = "How to treat transitions that refer to a state that does not exist"
    )]
    policy: ReferencePolicy,

    #[arg(long, global = true, help = "Read a .jff file as a deterministic automaton")]
    dfa: bool,

    #[arg(
        long,
        global = true,
        default_value = "strict",
        help = "How a .jff file read with --dfa resolves non-deterministic transitions"
    )]
    determinism: Determinism,
}

/// Defines the subcommands for this tool.
#[derive(Debug, Subcommand)]
enum Commands {
    Info(InfoArgs),
    Table(TableArgs),
    Validate(ValidateArgs),
    Convert(ConvertArgs),
}

#[derive(clap::Args, Debug)]
#[command(about = "Prints information related to the given automaton")]
struct InfoArgs {
    filename: String,
}

#[derive(clap::Args, Debug)]
#[command(about = "Prints the transition table of the given automaton")]
struct TableArgs {
    filename: String,
}

#[derive(clap::Args, Debug)]
#[command(about = "Validates strings against the given automaton")]
struct ValidateArgs {
    filename: String,

    /// The strings to validate.
    inputs: Vec<String>,

    #[arg(long, help = "Validate every line of the given file")]
    strings: Option<String>,

    #[arg(long, help = "Print the steps of every simulation")]
    steps: bool,
}

#[derive(clap::Args, Debug)]
#[command(about = "Converts the given automaton into a DFA in the .afd format")]
struct ConvertArgs {
    filename: String,

    /// The output file, the automaton is printed when omitted.
    output: Option<String>,
}

/// An automaton read from a file.
enum LoadedAutomaton {
    Deterministic(Dfa),
    NonDeterministic(Nfa),
}

/// Reads the automaton from the given file, `.afd` files and `.jff` files
/// with `--dfa` are deterministic.
fn load(filename: &str, args: &LoadArgs, timing: &Timing) -> Result<LoadedAutomaton, FasimError> {
    let path = Path::new(filename);
    let format = guess_format_from_extension(path, args.format).ok_or("Unknown automaton file format.")?;

    let mut timer = timing.start("load");
    let automaton = match format {
        AutomatonFormat::Jff if !args.dfa => LoadedAutomaton::NonDeterministic(read_nfa(path, args.policy)?),
        _ => LoadedAutomaton::Deterministic(read_dfa(path, format, args.policy, args.determinism)?),
    };
    timer.finish();

    Ok(automaton)
}

/// Prints the number of states, transitions, the alphabet and the initial and final states.
fn print_info(automaton: &(impl Automaton + std::fmt::Display)) {
    println!("{automaton}");

    let initial = automaton
        .initial_state()
        .map(|state| automaton.state(state).name().to_string())
        .unwrap_or_else(|| "none".to_string());
    println!("Initial state: {initial}");

    let finals: Vec<&str> = automaton
        .final_states()
        .iter()
        .map(|state| automaton.state(*state).name())
        .collect();
    println!("Final states: {{{}}}", finals.join(", "));
}

/// Returns the strings given on the command line followed by the lines of the strings file.
fn read_inputs(args: &ValidateArgs) -> Result<Vec<String>, FasimError> {
    let mut inputs = args.inputs.clone();

    if let Some(strings) = &args.strings {
        for line in BufReader::new(File::open(strings)?).lines() {
            inputs.push(line?);
        }
    }

    Ok(inputs)
}

fn main() -> Result<ExitCode, FasimError> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbosity.log_level_filter())
        .parse_default_env()
        .init();

    let timing = Timing::new();

    if let Some(command) = cli.commands {
        match command {
            Commands::Info(args) => match load(&args.filename, &cli.load, &timing)? {
                LoadedAutomaton::Deterministic(dfa) => print_info(&dfa),
                LoadedAutomaton::NonDeterministic(nfa) => print_info(&nfa),
            },
            Commands::Table(args) => match load(&args.filename, &cli.load, &timing)? {
                LoadedAutomaton::Deterministic(dfa) => print!("{}", TransitionTable::from_dfa(&dfa)),
                LoadedAutomaton::NonDeterministic(nfa) => print!("{}", TransitionTable::from_nfa(&nfa)),
            },
            Commands::Validate(args) => {
                let automaton = load(&args.filename, &cli.load, &timing)?;
                let inputs = read_inputs(&args)?;

                let mut timer = timing.start("validate");
                for input in &inputs {
                    let (accepted, steps) = match &automaton {
                        LoadedAutomaton::Deterministic(dfa) => {
                            let result = dfa.validate_string(input);
                            (result.accepted, result.display(dfa).to_string())
                        }
                        LoadedAutomaton::NonDeterministic(nfa) => {
                            let result = nfa.validate_string(input);
                            (result.accepted, result.display(nfa).to_string())
                        }
                    };

                    if args.steps {
                        println!("Input \"{input}\":");
                        println!("{steps}");
                    } else {
                        println!("\"{input}\": {}", if accepted { "accepted" } else { "rejected" });
                    }
                }
                timer.finish();
            }
            Commands::Convert(args) => {
                let dfa = match load(&args.filename, &cli.load, &timing)? {
                    LoadedAutomaton::Deterministic(dfa) => dfa,
                    LoadedAutomaton::NonDeterministic(nfa) => {
                        let mut timer = timing.start("convert");
                        let result = subset_construction(&nfa);
                        timer.finish();

                        for (state, subset) in result.dfa.states().iter().zip(&result.subsets) {
                            debug!(
                                "{state} = {{{}}}",
                                subset
                                    .iter()
                                    .map(|index| nfa.state_name(*index))
                                    .collect::<Vec<_>>()
                                    .join(", ")
                            );
                        }
                        result.dfa
                    }
                };

                if let Some(file) = args.output {
                    write_afd(&mut File::create(file)?, &dfa)?;
                } else {
                    write_afd(&mut stdout(), &dfa)?;
                }
            }
        }
    }

    if cli.timings {
        timing.print();
    }

    Ok(ExitCode::SUCCESS)
}
