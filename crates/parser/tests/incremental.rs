//! Incremental reparse tests: edits, memo reuse, line/column translation.

use indoc::indoc;
use parser::{Grammar, Rule, State};

fn arithmetic() -> Grammar {
    Grammar::builder()
        .rule("expr", Rule::reference("sum"))
        .rule(
            "sum",
            Rule::alts([
                vec![
                    Rule::reference("number"),
                    Rule::reference("op"),
                    Rule::reference("sum"),
                ],
                vec![Rule::reference("number")],
            ]),
        )
        .rule("op", Rule::pattern(r"\+|-"))
        .rule("number", Rule::pattern(r"\d+"))
        .build()
        .expect("grammar builds")
}

fn terminals<'a>(state: &'a State) -> Vec<(usize, &'a str)> {
    state
        .steps()
        .iter()
        .filter_map(|s| s.value.as_deref().map(|v| (s.pos, v)))
        .collect()
}

#[test]
fn test_edit_reuses_unaffected_work() {
    let grammar = arithmetic();
    let mut state = State::new(&grammar, "expr", "40+2").unwrap();
    state.parse().unwrap();
    assert!(state.errors().is_empty());
    let after_first = state.steps_created();

    state.increment("-", 2, 1);
    assert_eq!(state.input(), "40-2");
    assert!(!state.is_done());
    state.parse().unwrap();
    assert!(state.errors().is_empty());
    assert_eq!(terminals(&state), vec![(0, "40"), (2, "-"), (3, "2")]);
    let reparse_cost = state.steps_created() - after_first;

    // A fresh parse of the edited input does strictly more work: the "40"
    // subtree before the edit is replayed from the cache instead.
    let mut fresh = State::new(&grammar, "expr", "40-2").unwrap();
    fresh.parse().unwrap();
    assert!(
        reparse_cost < fresh.steps_created(),
        "reparse created {} frames, fresh parse {}",
        reparse_cost,
        fresh.steps_created()
    );

    // Replay is transparent: the final trace matches the fresh one.
    assert_eq!(state.steps(), fresh.steps());
}

#[test]
fn test_empty_edit_replays_everything() {
    let grammar = arithmetic();
    let mut state = State::new(&grammar, "expr", "40+2-7").unwrap();
    state.parse().unwrap();
    let trace = state.steps().to_vec();
    let after_first = state.steps_created();

    state.increment("", state.input().len(), 0);
    state.parse().unwrap();
    assert!(state.errors().is_empty());
    assert_eq!(state.steps(), trace);
    // Only the fresh root frame had to be created.
    assert_eq!(state.steps_created(), after_first + 1);
}

#[test]
fn test_edit_before_a_subtree_shifts_it() {
    let grammar = arithmetic();
    let mut state = State::new(&grammar, "expr", "40+2").unwrap();
    state.parse().unwrap();

    // Replace the leading number entirely; the "2" subtree shifts but is
    // otherwise untouched.
    state.increment("123", 0, 2);
    assert_eq!(state.input(), "123+2");
    state.parse().unwrap();
    assert!(state.errors().is_empty());
    assert_eq!(terminals(&state), vec![(0, "123"), (3, "+"), (4, "2")]);
}

#[test]
fn test_edit_can_break_the_parse() {
    let grammar = arithmetic();
    let mut state = State::new(&grammar, "expr", "40+2").unwrap();
    state.parse().unwrap();
    assert!(state.errors().is_empty());

    state.increment("+", 3, 1);
    assert_eq!(state.input(), "40++");
    state.parse().unwrap();
    assert!(state.is_done());
    assert_eq!(state.errors_pos(), Some(3));
    assert_eq!(state.errors(), [r"Expected match of '\d+'".to_string()]);

    // And a further edit repairs it again.
    state.increment("9", 3, 1);
    state.parse().unwrap();
    assert!(state.errors().is_empty());
    assert_eq!(terminals(&state), vec![(0, "40"), (2, "+"), (3, "9")]);
}

#[test]
fn test_line_column_translation() {
    let grammar = Grammar::builder()
        .rule("all", Rule::pattern(r"(?s).*"))
        .build()
        .unwrap();
    let input = indoc! {"
        alpha
        beta
    "};
    let mut state = State::new(&grammar, "all", input).unwrap();
    state.parse().unwrap();
    assert!(state.errors().is_empty());

    assert_eq!(state.pos_to_line_column(0), (1, 1));
    assert_eq!(state.pos_to_line_column(4), (1, 5));
    assert_eq!(state.pos_to_line_column(6), (2, 1));
    assert_eq!(state.pos_to_line_column(9), (2, 4));
    assert_eq!(state.pos_to_line_column(11), (3, 1));
}

#[test]
fn test_increment_rebuilds_line_table() {
    let grammar = Grammar::builder()
        .rule("all", Rule::pattern(r"(?s).*"))
        .build()
        .unwrap();
    let mut state = State::new(&grammar, "all", "a\nb").unwrap();
    state.parse().unwrap();
    assert_eq!(state.pos_to_line_column(2), (2, 1));

    state.increment("\n\n", 0, 0);
    assert_eq!(state.input(), "\n\na\nb");
    state.parse().unwrap();
    assert_eq!(state.pos_to_line_column(2), (3, 1));
    assert_eq!(state.pos_to_line_column(4), (4, 1));
}
