//! Print results of a proof attempt: either an aggregated summary only, or
//! the full sentence tableau / countermodel.

use crate::model::Model;
use crate::postprocessing::sen_node::NodeId;
use crate::postprocessing::sen_tree::SenTree;
use crate::preprocessing::formula::Formula;
use crate::preprocessing::signature::{Signature, ACCESSIBILITY};
use crate::proving::Rule;

use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PrintOptions {
    NoPrint,
    ShortPrint,
    MediumPrint,
    FullPrint,
}

/// Print the given text, but only if a sufficiently verbose print option is
/// selected (medium or full). This simplifies the code regarding printing
/// (no redundant if statements).
pub(crate) fn print_if_allowed(text: String, print_options: PrintOptions) {
    if print_options == PrintOptions::NoPrint || print_options == PrintOptions::ShortPrint {
        return;
    }
    println!("{text}")
}

/// Render a node's formula for display. Accessibility literals read better
/// infix: `Rwv` is shown as `wRv` in a modal tableau.
fn format_node_formula(formula: &Formula, signature: &Signature) -> String {
    if signature.is_modal {
        if let Formula::Atomic(predicate, terms) = formula {
            if predicate == ACCESSIBILITY && terms.len() == 2 {
                return format!("{}{ACCESSIBILITY}{}", terms[0], terms[1]);
            }
        }
        if let Formula::Negation(sub) = formula {
            if let Formula::Atomic(predicate, terms) = sub.as_ref() {
                if predicate == ACCESSIBILITY && terms.len() == 2 {
                    return format!("¬{}{ACCESSIBILITY}{}", terms[0], terms[1]);
                }
            }
        }
    }
    formula.to_string()
}

/// Print the finished sentence tableau, one numbered line per node, indented
/// by tree depth, with rule annotations and a coloured marker on every
/// closed branch end.
pub fn print_sen_tree(tree: &SenTree, signature: &Signature, print_options: PrintOptions) {
    if print_options == PrintOptions::NoPrint {
        return;
    }
    if print_options == PrintOptions::ShortPrint {
        println!(
            "Tableau with {} nodes, {}.",
            tree.node_list.len(),
            if tree.closed { "all branches closed" } else { "open branches remain" }
        );
        return;
    }
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    print_subtree(tree, tree.root, 0, signature, &mut stdout);
}

fn print_subtree(
    tree: &SenTree,
    id: NodeId,
    depth: usize,
    signature: &Signature,
    stdout: &mut StandardStream,
) {
    let node = &tree.nodes[id];
    let number = tree.display_number(id).unwrap_or(0);
    let mut line = format!(
        "{:indent$}{number}. {}",
        "",
        format_node_formula(&node.formula, signature),
        indent = depth * 2
    );
    if let Some(world) = &node.world {
        line.push_str(&format!(" ({world})"));
    }
    if node.from_rule != Rule::Initial {
        let origins: Vec<String> = node
            .from_nodes
            .iter()
            .filter_map(|&o| tree.display_number(o))
            .map(|n| n.to_string())
            .collect();
        line.push_str(&format!("  [{} {}]", origins.join(","), node.from_rule));
    }
    write!(stdout, "{line}").unwrap();
    if node.closed_end {
        stdout
            .set_color(ColorSpec::new().set_fg(Some(Color::Red)))
            .unwrap();
        write!(stdout, " ✗").unwrap();
        stdout.reset().unwrap();
    }
    writeln!(stdout).unwrap();
    for &child in &node.children {
        print_subtree(tree, child, depth + 1, signature, stdout);
    }
}

/// Print a countermodel, colouring the header green the way satisfying
/// results are usually highlighted.
pub fn print_counter_model(model: &Model, print_options: PrintOptions) {
    if print_options == PrintOptions::NoPrint {
        return;
    }
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    stdout
        .set_color(ColorSpec::new().set_fg(Some(Color::Green)))
        .unwrap();
    writeln!(stdout, "Countermodel found:").unwrap();
    stdout.reset().unwrap();
    if print_options != PrintOptions::ShortPrint {
        write!(stdout, "{model}").unwrap();
    }
}
