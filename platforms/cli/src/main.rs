use clap::Parser;
use std::io::{self, Write};
use std::path::Path;
use std::process;
use tapedeck::{
    DefinitionLoader, Direction, Library, Machine, Outcome, Snapshot, DEFAULT_MAX_STEPS,
};

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// The machine definition file to execute
    #[clap(short, long)]
    program: Option<String>,

    /// The name of an embedded machine to execute
    #[clap(short, long)]
    name: Option<String>,

    /// List the embedded machines and exit
    #[clap(short, long)]
    list: bool,

    /// Override the initial tape contents
    #[clap(short, long)]
    tape: Option<String>,

    /// The maximum number of steps to execute
    #[clap(short, long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Print each step of the execution
    #[clap(short = 'd', long)]
    debug: bool,

    /// Wait for Enter between steps (implies --debug)
    #[clap(short, long)]
    interactive: bool,

    /// Emit each step as a JSON line (implies --debug)
    #[clap(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.list {
        for name in Library::names() {
            println!("{}", name);
        }
        return;
    }

    let definition = match (&cli.program, &cli.name) {
        (Some(path), _) => DefinitionLoader::load_definition(Path::new(path)),
        (None, Some(name)) => Library::get_by_name(name),
        (None, None) => {
            eprintln!("Either --program or --name is required");
            process::exit(2);
        }
    }
    .unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    let blank = definition.blank;
    let mut machine = match &cli.tape {
        Some(input) => Machine::with_input(definition, input),
        None => Machine::new(definition),
    }
    .unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if !cli.json {
        println!("{}", machine.definition().name);
    }

    if cli.debug || cli.interactive || cli.json {
        for (step, snapshot) in machine.trace(cli.max_steps).enumerate() {
            if cli.json {
                println!("{}", serde_json::to_string(&snapshot).unwrap());
            } else {
                println!("{}", render(step, &snapshot, blank));
            }

            if cli.interactive {
                pause();
            }
        }
    }

    let outcome = machine.run(cli.max_steps).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if cli.json {
        println!("{}", serde_json::to_string(&outcome).unwrap());
        return;
    }

    match &outcome {
        Outcome::Accepted(_) => println!("Result: Accepted"),
        Outcome::Rejected(_) => println!("Result: Rejected"),
        Outcome::Halted(_) => println!("Result: Halted"),
        Outcome::StepLimitExceeded(_) => {
            println!("Result: step limit of {} exceeded", cli.max_steps)
        }
    }
    println!("Tape: {}", render_tape(outcome.snapshot(), blank));
}

/// One line per snapshot: step number, state, tape with the head cell
/// bracketed, and the transition that produced it.
fn render(step: usize, snapshot: &Snapshot, blank: char) -> String {
    let mut line = format!(
        "Step {:4} | State: {:12} | Tape: {}",
        step,
        snapshot.state,
        render_tape(snapshot, blank)
    );

    if let Some(applied) = snapshot.applied {
        let direction = match applied.direction {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Stay => 'S',
        };
        line.push_str(&format!(" | {} -> {}, {}", applied.read, applied.write, direction));
    }

    line
}

/// Renders the tape with trailing blanks stripped, keeping at least the
/// cell under the head visible and bracketing it.
fn render_tape(snapshot: &Snapshot, blank: char) -> String {
    let last_used = snapshot
        .tape
        .iter()
        .rposition(|&c| c != blank)
        .map_or(0, |i| i + 1);
    let end = last_used.max(snapshot.head + 1);

    let mut rendered = String::new();
    for (i, &cell) in snapshot.tape[..end].iter().enumerate() {
        if i == snapshot.head {
            rendered.push('[');
            rendered.push(cell);
            rendered.push(']');
        } else {
            rendered.push(cell);
        }
    }

    rendered
}

fn pause() {
    print!("Press Enter to continue...");
    io::stdout().flush().unwrap();
    io::stdin().read_line(&mut String::new()).unwrap();
}
