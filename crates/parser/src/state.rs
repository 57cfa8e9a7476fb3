//! The parse engine: an explicit parse stack driven one step at a time.
//!
//! A [`State`] owns everything one parse needs: the input, the stack of
//! [`Step`] frames, the expectation set, and the memoization cache. Progress
//! happens exclusively through [`State::advance`], which inspects the top
//! frame and either expands a non-terminal by pushing a child frame or
//! resolves a terminal against the input. A successful terminal triggers the
//! *forward* transition (climb the stack looking for the next element of an
//! enclosing sequence); a failed one triggers the *backward* transition
//! (unwind to the nearest enclosing sequence with an untried alternative).
//!
//! Because the stack is an ordinary vector rather than the host call stack,
//! deeply nested grammars cannot overflow, a driver can interleave `advance`
//! calls with unrelated work, and the finished step list doubles as the parse
//! result: every frame records which rule matched which span of input.
//!
//! The memo cache is what makes backtracking and incremental reparsing
//! affordable. When the backward transition discards completed frames, it
//! first records, for each of them, the frames that followed it inside its
//! own span; when a later alternative reopens the same rule at the same
//! position, [`State::advance`] replays the recorded frames instead of
//! matching again. [`State::increment`] builds the same kind of cache from
//! the frames of a previous parse that an edit did not touch.

use common::{create_logger, log, log_detail, log_fail, log_success, LineTable, Logger};
use hashbrown::HashMap;

use crate::error::EngineError;
use crate::grammar::{Grammar, RuleId, RuleNode, SeqItem};
use crate::step::{Step, StepKey};

/// A parse in progress (or finished): input, stack, errors, memo cache.
pub struct State<'g> {
    grammar: &'g Grammar,
    start: RuleId,
    input: String,
    steps: Vec<Step>,
    errors: Vec<String>,
    errors_pos: Option<usize>,
    done: bool,
    memo: HashMap<StepKey, Vec<Step>>,
    lines: Option<LineTable>,
    steps_created: usize,
    log: Logger,
}

impl<'g> State<'g> {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a state for `input`, rooted on a reference to the rule named
    /// `start`. Fails if the grammar does not define `start`.
    pub fn new(
        grammar: &'g Grammar,
        start: &str,
        input: impl Into<String>,
    ) -> Result<Self, EngineError> {
        let root = grammar
            .reference(start)
            .ok_or_else(|| EngineError::UnknownRule { name: start.to_string() })?;
        let mut state = Self {
            grammar,
            start: root,
            input: input.into(),
            steps: Vec::new(),
            errors: Vec::new(),
            errors_pos: None,
            done: false,
            memo: HashMap::new(),
            lines: None,
            steps_created: 0,
            log: create_logger("engine"),
        };
        state.push_step(root, 0);
        log!(state.log, "new parse of {} bytes", state.input.len());
        Ok(state)
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Whether the parse has terminated, successfully or not.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The step list. After a successful parse this is the complete trace:
    /// every frame is done and the first frame spans the whole input.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The expectations that failed at [`State::errors_pos`], deduplicated,
    /// in the order they were recorded. Empty unless the parse failed (or is
    /// mid-backtrack).
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// The input offset the current error set refers to.
    pub fn errors_pos(&self) -> Option<usize> {
        self.errors_pos
    }

    /// The current input text.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The grammar this state parses against.
    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    /// How many step frames this state has created so far, across all parses
    /// and reparses. Frames replayed from the memo cache are not created, so
    /// the counter makes cache hits observable.
    pub fn steps_created(&self) -> usize {
        self.steps_created
    }

    /// Translate an input byte offset into 1-based `(line, column)`. LF, CR
    /// and CR+LF each count as one line terminator; columns count bytes.
    pub fn pos_to_line_column(&mut self, pos: usize) -> (u32, u32) {
        let input = &self.input;
        self.lines
            .get_or_insert_with(|| LineTable::new(input))
            .line_col(pos)
    }

    // =========================================================================
    // Driving
    // =========================================================================

    /// Run [`State::advance`] until the parse terminates, then drop the memo
    /// cache. Inspect [`State::errors`] afterwards to tell success from
    /// failure.
    pub fn parse(&mut self) -> Result<(), EngineError> {
        while !self.done {
            self.advance()?;
        }
        self.memo.clear();
        Ok(())
    }

    /// Perform one unit of work on the top frame.
    ///
    /// A memoized frame is replayed wholesale; a sequence or reference pushes
    /// one child frame; a terminal is matched against the input, triggering
    /// the forward or backward transition. Does nothing once the parse is
    /// done. The only errors are fatal grammar problems; parse failures are
    /// recorded in the state instead.
    pub fn advance(&mut self) -> Result<(), EngineError> {
        if self.done {
            return Ok(());
        }
        let Some(top) = self.steps.last() else {
            self.done = true;
            return Ok(());
        };
        let rule = top.rule;
        let pos = top.pos;
        let rule_index = top.rule_index;
        let finished = top.end_pos;

        if let Some(pack) = self.memo.get(&top.key()) {
            log!(self.log, "memo hit @{} ({} steps replayed)", pos, pack.len());
            let pack = pack.clone();
            self.steps.extend(pack);
            return Ok(());
        }

        // A frame that is already done can only have been replayed from the
        // memo cache; resume the climb from its recorded end instead of
        // matching anything again.
        if let Some(end) = finished {
            self.resume(end);
            return Ok(());
        }

        let grammar = self.grammar;
        log_detail!(self.log, "advance {} @{}", grammar.display_rule(rule), pos);
        match grammar.node(rule) {
            RuleNode::Sequence(items) => {
                let index = rule_index.unwrap_or(0);
                match items.get(index) {
                    Some(&SeqItem::Rule(child)) => {
                        self.push_step(child, pos);
                        Ok(())
                    }
                    _ => Err(EngineError::MalformedSequence { index }),
                }
            }
            RuleNode::Reference(name) => match grammar.body(name) {
                Some(body) => {
                    self.push_step(body, pos);
                    Ok(())
                }
                None => Err(EngineError::UnknownRule { name: name.clone() }),
            },
            RuleNode::Regex { pattern, regex } => {
                let matched = regex
                    .find(&self.input[pos..])
                    .filter(|m| m.start() == 0)
                    .map(|m| m.as_str().to_owned());
                match matched {
                    Some(text) => self.forward(Some(text)),
                    None => self.backward(format!("Expected match of '{}'", pattern)),
                }
                Ok(())
            }
            RuleNode::Str(literal) => {
                if self.input[pos..].starts_with(literal) {
                    let text = literal.clone();
                    self.forward(Some(text));
                } else {
                    self.backward(format!("Expected string '{}'", literal));
                }
                Ok(())
            }
            RuleNode::Char(c) => {
                if self.input[pos..].chars().next() == Some(*c) {
                    self.forward(Some(c.to_string()));
                } else {
                    self.backward(format!("Expected character '{}'", c));
                }
                Ok(())
            }
        }
    }

    // =========================================================================
    // Incremental reparse
    // =========================================================================

    /// Replace `input[at..at + length]` with `replacement` and prepare the
    /// state for reparsing.
    ///
    /// Frames of the previous parse that lie strictly after the edited region
    /// are shifted in place; frames ending at or before the edit survive
    /// unchanged; frames intersecting it are dropped, as are frames that
    /// never finished. The survivors seed the memo cache, keyed on completed
    /// reference frames, so the next [`State::parse`] replays untouched
    /// subtrees instead of rematching them. The stack is reset to a fresh
    /// root frame and the done flag, error set and line table are cleared.
    ///
    /// # Panics
    ///
    /// Panics if `at..at + length` is out of bounds or does not fall on
    /// character boundaries.
    pub fn increment(&mut self, replacement: &str, at: usize, length: usize) {
        let edit_end = at + length;
        self.input.replace_range(at..edit_end, replacement);
        let shift = replacement.len() as isize - length as isize;

        self.memo.clear();
        let prior = std::mem::take(&mut self.steps);
        let mut survivors: Vec<Step> = Vec::with_capacity(prior.len());
        for mut step in prior {
            let Some(step_end) = step.end_pos else {
                // In-flight frames from an unfinished parse; never reusable.
                continue;
            };
            if step.pos > edit_end {
                step.pos = (step.pos as isize + shift) as usize;
                step.end_pos = Some((step_end as isize + shift) as usize);
                survivors.push(step);
            } else if step_end <= at {
                survivors.push(step);
            }
            // Frames intersecting the edited region are dropped.
        }

        // Rebuild the memo cache from the survivors. Keys are restricted to
        // reference frames: named rules are the join points whose identity
        // is stable, and keying on them keeps the cache proportional to the
        // grammar rather than to the trace.
        for i in 0..survivors.len() {
            let key = &survivors[i];
            if !matches!(self.grammar.node(key.rule), RuleNode::Reference(_)) {
                continue;
            }
            let Some(key_end) = key.end_pos else { continue };
            let pack: Vec<Step> = survivors[i + 1..]
                .iter()
                .take_while(|s| s.pos >= key.pos && s.end_pos.is_some_and(|e| e <= key_end))
                .cloned()
                .collect();
            if !pack.is_empty() {
                self.memo.insert(key.key(), pack);
            }
        }
        log!(
            self.log,
            "edit @{}..{} ({:+} bytes): {} frames reusable, {} cached subtrees",
            at,
            edit_end,
            shift,
            survivors.len(),
            self.memo.len()
        );

        let root = self.start;
        self.push_step(root, 0);
        self.errors.clear();
        self.errors_pos = None;
        self.lines = None;
        self.done = false;
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    fn push_step(&mut self, rule: RuleId, pos: usize) {
        let rule_index = match self.grammar.node(rule) {
            RuleNode::Sequence(_) => Some(0),
            _ => None,
        };
        self.steps_created += 1;
        self.steps.push(Step::new(rule, pos, rule_index));
    }

    /// Forward transition: the top frame matched `value` (absent when an
    /// enclosing sequence is stepping past an alternative separator).
    fn forward(&mut self, value: Option<String>) {
        let Some(top) = self.steps.last_mut() else {
            return;
        };
        let new_pos = top.pos + value.as_deref().map_or(0, str::len);
        top.value = value;
        self.resume(new_pos);
    }

    /// Climb the stack from the top: push the next element of the first
    /// enclosing sequence that still has one, marking every completed frame
    /// passed on the way. Running off the bottom means the start rule has
    /// matched everything it can.
    fn resume(&mut self, new_pos: usize) {
        let grammar = self.grammar;
        let mut idx = self.steps.len();
        while idx > 0 {
            idx -= 1;
            let next = {
                let step = &self.steps[idx];
                match grammar.node(step.rule) {
                    RuleNode::Sequence(items) => {
                        let index = step.rule_index.unwrap_or(0);
                        match items.get(index + 1) {
                            Some(&SeqItem::Rule(next)) => Some((index + 1, next)),
                            _ => None,
                        }
                    }
                    _ => None,
                }
            };
            if let Some((index, next)) = next {
                self.steps[idx].rule_index = Some(index);
                self.push_step(next, new_pos);
                return;
            }
            let step = &mut self.steps[idx];
            if step.end_pos.is_none() {
                step.end_pos = Some(new_pos);
            }
        }

        if new_pos == self.input.len() {
            log_success!(self.log, "parsed all {} bytes", new_pos);
            self.errors.clear();
            self.errors_pos = None;
            self.done = true;
        } else {
            self.backward("Expected EOF".to_string());
        }
    }

    /// Backward transition: the top frame failed to match.
    ///
    /// Records the expectation, then unwinds the stack to the nearest
    /// unfinished sequence with an untried alternative. Completed frames
    /// discarded on the way are written to the memo cache first, each keyed
    /// frame remembering the frames that followed it inside its own span.
    /// With no alternative left anywhere, the parse terminates in failure.
    fn backward(&mut self, message: String) {
        let fail_pos = match self.steps.last() {
            Some(step) => step.pos,
            None => {
                self.done = true;
                return;
            }
        };
        log_detail!(self.log, "backtrack @{}: {}", fail_pos, message);
        self.record_expectation(message, fail_pos);

        let grammar = self.grammar;
        let mut pack: Vec<Step> = Vec::new(); // discarded completed frames, top first

        loop {
            let Some(top) = self.steps.last() else { break };
            let alternative = if top.end_pos.is_none() {
                match grammar.node(top.rule) {
                    RuleNode::Sequence(items) => {
                        let index = top.rule_index.unwrap_or(0);
                        items
                            .get(index..)
                            .and_then(|tail| {
                                tail.iter().position(|item| matches!(item, SeqItem::Alt))
                            })
                            .map(|offset| index + offset)
                    }
                    _ => None,
                }
            } else {
                None
            };

            if let Some(separator) = alternative {
                let last = self.steps.len() - 1;
                self.steps[last].rule_index = Some(separator);
                pack.reverse();
                self.memoize(&pack);
                // The separator itself is not a rule; the forward climb steps
                // past it to the next alternative's first element, or keeps
                // backtracking if this alternative was the last.
                self.forward(None);
                return;
            }

            if let Some(discarded) = self.steps.pop() {
                if discarded.is_done() {
                    pack.push(discarded);
                }
            }
        }

        log_fail!(self.log, "no alternatives left; failed @{:?}", self.errors_pos);
        self.done = true;
    }

    /// Write the pack (in stack order, bottom first) into the memo cache:
    /// each completed frame maps to the maximal run of following frames that
    /// lie inside its own span. Only genuinely finished sub-parses are ever
    /// cached; the branch being abandoned sits above them and was never
    /// completed.
    fn memoize(&mut self, pack: &[Step]) {
        for (i, key) in pack.iter().enumerate() {
            let Some(key_end) = key.end_pos else { continue };
            let tail: Vec<Step> = pack[i + 1..]
                .iter()
                .take_while(|s| s.pos >= key.pos && s.end_pos.is_some_and(|e| e <= key_end))
                .cloned()
                .collect();
            if !tail.is_empty() {
                self.memo.insert(key.key(), tail);
            }
        }
    }

    /// Record a failed expectation. The furthest position wins: a failure
    /// beyond the current error position clears and reseeds the set, one at
    /// the same position is added (deduplicated), and one behind it is
    /// dropped - the report always describes the furthest point any branch
    /// reached.
    fn record_expectation(&mut self, message: String, at: usize) {
        match self.errors_pos {
            Some(p) if at < p => {}
            Some(p) if at == p => {
                if !self.errors.iter().any(|m| m == &message) {
                    self.errors.push(message);
                }
            }
            _ => {
                self.errors.clear();
                self.errors_pos = Some(at);
                self.errors.push(message);
            }
        }
    }
}
