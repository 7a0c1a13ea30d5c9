//! Read-only views of a running machine for display front ends.
//!
//! Front ends never reach into the machine; they take a `Snapshot` after each committed step
//! and decide what to draw from it and their `DisplayOptions`.

use serde::{Deserialize, Serialize};

use crate::machine::TuringMachine;
use crate::palette::Color;
use crate::types::Transition;

/// Typed display settings handed to a front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayOptions {
    /// Number of tape cells shown around the head.
    pub window: usize,
    /// Show the genome line.
    pub show_genome: bool,
    /// Show which state last wrote each visible cell.
    pub show_marks: bool,
    /// Show the signatures of the current rule.
    pub show_signature: bool,
    /// Animation speed. Only affects how often `update` steps.
    pub steps_per_second: f64,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            window: 21,
            show_genome: true,
            show_marks: true,
            show_signature: true,
            steps_per_second: 1.0,
        }
    }
}

impl DisplayOptions {
    /// Step duration matching `steps_per_second`. Non-positive rates mean one step per second.
    pub fn step_duration_ms(&self) -> u64 {
        if self.steps_per_second > 0.0 {
            (1000.0 / self.steps_per_second).round() as u64
        } else {
            1000
        }
    }
}

/// The display-relevant parts of a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleView {
    /// Position in definition order.
    pub index: usize,
    pub state: String,
    pub state_index: usize,
    pub signature: String,
    pub index_signature: String,
    pub sd: String,
    pub sd_sig: String,
    pub sd_num: String,
    pub color: Color,
}

impl RuleView {
    pub fn new(index: usize, transition: &Transition) -> Self {
        Self {
            index,
            state: transition.state.clone(),
            state_index: transition.state_index,
            signature: transition.signature.clone(),
            index_signature: transition.index_signature(),
            sd: transition.gene.sd.clone(),
            sd_sig: transition.gene.sig.clone(),
            sd_num: transition.gene.num.clone(),
            color: transition.color,
        }
    }
}

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub step: usize,
    pub state: String,
    pub halted: bool,
    pub head: usize,
    pub tape_len: usize,
    pub cells_in_use: usize,
    /// The visible tape cells, rendered with the head bracketed.
    pub window: String,
    /// State index of the rule that last wrote each visible cell, `.` if never written.
    pub marks: String,
    /// The rule the next step applies, `None` when halted or stuck.
    pub rule: Option<RuleView>,
    /// Fraction of the current step duration already elapsed.
    pub progress: f64,
    pub genes: usize,
    pub nucleotides: usize,
    /// Rules never applied so far, each as its state and read token, e.g. `B S1`.
    pub unused: Vec<String>,
}

impl Snapshot {
    /// Copies the visible state of `machine`.
    pub fn capture(machine: &TuringMachine, options: &DisplayOptions) -> Self {
        let tape = machine.tape();
        let transitions = machine.program().transitions();

        let marks = tape.marks()[tape.window(options.window)]
            .iter()
            .map(|mark| match mark {
                Some(mark) => state_digit(transitions[mark.rule].state_index),
                None => '.',
            })
            .collect();

        let rule = machine
            .current_rule_index()
            .map(|i| RuleView::new(i, &transitions[i]));

        Self {
            step: machine.step_count(),
            state: machine.state().to_string(),
            halted: machine.is_halted(),
            head: tape.head(),
            tape_len: tape.len(),
            cells_in_use: tape.cells_in_use(),
            window: tape.render(options.window),
            marks,
            rule,
            progress: machine.progress(),
            genes: machine.program().gene_count(),
            nucleotides: machine.program().genome_len(),
            unused: machine
                .unused_rules()
                .iter()
                .map(|t| format!("{} {}", t.state, t.read.token()))
                .collect(),
        }
    }

    /// Renders the snapshot as a few lines of plain text.
    pub fn render(&self, options: &DisplayOptions) -> String {
        let mut lines = vec![
            format!(
                "Iteration #{}, state {}, on square #{} of {} ({} in use)",
                self.step, self.state, self.head, self.tape_len, self.cells_in_use
            ),
            self.window.clone(),
        ];

        if options.show_marks {
            lines.push(format!("marks  {}", self.marks));
        }

        if options.show_signature {
            match &self.rule {
                Some(rule) => lines.push(format!(
                    "rule   {}  {}  {}  {}",
                    rule.signature, rule.index_signature, rule.sd_sig, rule.color
                )),
                None if self.halted => lines.push("rule   HALT".to_string()),
                None => lines.push("rule   <undefined>".to_string()),
            }
        }

        if options.show_genome {
            lines.push(format!(
                "genome {} genes, {} nucleotides",
                self.genes, self.nucleotides
            ));
        }

        lines.join("\n")
    }
}

/// Single-character label of a state index: `0-9`, then `a-z`, then `+`.
fn state_digit(index: usize) -> char {
    u32::try_from(index)
        .ok()
        .and_then(|i| char::from_digit(i, 36))
        .unwrap_or('+')
}
