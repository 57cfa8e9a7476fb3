//! Output formatting utilities for step traces, errors and shaped trees.

use crate::grammar::Grammar;
use crate::state::State;
use crate::step::Step;
use crate::tree::TreeNode;

/// Format one step with its rule spelled out.
pub fn format_step(grammar: &Grammar, step: &Step) -> String {
    let mut result = format!("{} @{}", grammar.display_rule(step.rule), step.pos);
    if let Some(end) = step.end_pos {
        result.push_str(&format!("-{}", end));
    }
    if let Some(value) = &step.value {
        result.push_str(&format!(" = {:?}", value));
    }
    result
}

/// Format a whole step trace, one frame per line.
pub fn format_steps(grammar: &Grammar, steps: &[Step]) -> String {
    let mut result = String::new();
    for step in steps {
        result.push_str(&format_step(grammar, step));
        result.push('\n');
    }
    result
}

/// Format the state's error set with source context.
///
/// Takes `&mut State` because the line table is built lazily. Returns the
/// empty string when no errors are recorded.
pub fn format_errors(state: &mut State) -> String {
    let Some(pos) = state.errors_pos() else {
        return String::new();
    };
    let (line, col) = state.pos_to_line_column(pos);
    let messages = state.errors().to_vec();

    let input = state.input();
    let line_start = input[..pos].rfind(['\n', '\r']).map(|i| i + 1).unwrap_or(0);
    let line_end = input[pos..]
        .find(['\n', '\r'])
        .map(|i| pos + i)
        .unwrap_or(input.len());
    let source_line = &input[line_start..line_end];

    let mut result = String::new();
    for msg in &messages {
        result.push_str(&format!("{}:{}: {}\n", line, col, msg));
    }
    result.push_str(&format!("  {}\n", source_line));
    result.push_str(&format!("  {}^\n", " ".repeat(col.saturating_sub(1) as usize)));
    result
}

/// Format a shaped tree for display (debug format).
pub fn format_tree(node: &TreeNode, indent: usize) -> String {
    let mut result = String::new();
    let prefix = "  ".repeat(indent);

    if node.is_leaf() {
        result.push_str(&format!(
            "{}{} {:?} @{}-{}\n",
            prefix, node.name, node.text, node.start, node.end
        ));
    } else {
        result.push_str(&format!(
            "{}{} @{}-{}\n",
            prefix, node.name, node.start, node.end
        ));
        for child in node.children {
            result.push_str(&format_tree(child, indent + 1));
        }
    }

    result
}
