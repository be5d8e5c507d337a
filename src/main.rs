//! Tableau theorem prover for classical first-order and propositional modal
//! logic.
//!
//! Takes a conclusion (and optionally premises) in concrete syntax, searches
//! for a closed analytic tableau, and prints either the sentence tableau of
//! the proof or a countermodel read off an open branch.

use modal_tableau_prover::analysis::{analyse_inference, ProofOutcome};
use modal_tableau_prover::proving::search::SearchLimits;
use modal_tableau_prover::result_print::PrintOptions;

use clap::builder::PossibleValuesParser;
use clap::Parser;

/// Structure to collect CLI arguments.
#[derive(Parser)]
#[clap(
    version,
    about = "Analytic tableau prover for first-order and modal logic."
)]
struct Arguments {
    /// The conclusion to prove, e.g. "□p→◇p" or "∀x(Fx→Gx)→(∀xFx→∀xGx)".
    conclusion: String,

    /// Premises the proof may use (repeatable).
    #[clap(short, long)]
    premise: Vec<String>,

    /// Treat accessibility as universal (the modal logic S5).
    #[clap(long)]
    s5: bool,

    /// Maximal number of instances per universal formula and branch.
    #[clap(long, default_value_t = 3)]
    gamma_instances: usize,

    /// Choice of the amount of output regarding computation and results.
    #[clap(short = 'o', long, default_value = "medium", value_parser = PossibleValuesParser::new(["none", "short", "medium", "full"]))]
    print_option: String,
}

/// Wrapper function to invoke the prover, works with CLI arguments.
fn main() {
    let args = Arguments::parse();

    let print_options = match args.print_option.as_str() {
        "none" => PrintOptions::NoPrint,
        "short" => PrintOptions::ShortPrint,
        "medium" => PrintOptions::MediumPrint,
        "full" => PrintOptions::FullPrint,
        // this cant really happen, just here to be exhaustive
        _ => PrintOptions::MediumPrint,
    };
    let limits = SearchLimits {
        gamma_instances: args.gamma_instances,
        ..SearchLimits::default()
    };

    let result = analyse_inference(
        &args.premise,
        &args.conclusion,
        args.s5,
        &limits,
        print_options,
    );

    match result {
        Ok((ProofOutcome::Proved(_), _)) => println!("Valid."),
        Ok((ProofOutcome::Refuted(_), _)) => println!("Invalid."),
        Ok((ProofOutcome::Undecided, _)) => {
            println!("Gave up; try raising --gamma-instances.")
        }
        Err(message) => println!("{message}"),
    }
}
