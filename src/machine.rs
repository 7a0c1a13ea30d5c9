//! This module defines the `TuringMachine` struct, which executes a parsed standard
//! description on a growing tape. It handles the machine's state, transition lookup, the
//! time-gated update used by animated front ends, and the safety bounds of a run.

use log::{debug, info, warn};
use std::collections::BTreeSet;

use crate::parser::parse;
use crate::tape::{Mark, Tape};
use crate::types::{MachineConfig, Program, Step, Transition, TuringMachineError, HALT_STATE};

/// A single-tape Turing machine running a parsed description.
///
/// Every `step` is all-or-nothing: it either commits the write, the move and the state
/// change together, or returns an error and leaves the machine untouched.
#[derive(Debug, Clone)]
pub struct TuringMachine {
    program: Program,
    config: MachineConfig,
    state: String,
    tape: Tape,
    initial_tape: Tape,
    step_count: usize,
    elapsed_ms: u64,
    unused: BTreeSet<usize>,
}

impl TuringMachine {
    /// Creates a machine with the default configuration on a blank tape.
    pub fn new(program: Program) -> Self {
        Self::with_config(program, MachineConfig::default())
    }

    /// Creates a machine on a fresh tape sized and filled as `config` says.
    pub fn with_config(program: Program, config: MachineConfig) -> Self {
        let tape = Tape::new(config.tape_size, config.fill);
        let state = program.initial_state.clone().unwrap_or_default();
        let unused = (0..program.table.len()).collect();

        Self {
            program,
            config,
            state,
            initial_tape: tape.clone(),
            tape,
            step_count: 0,
            elapsed_ms: 0,
            unused,
        }
    }

    /// Parses `input` and creates a machine with the default configuration.
    pub fn from_description(input: &str) -> Result<Self, TuringMachineError> {
        Ok(Self::new(parse(input)?))
    }

    /// Executes a single transition: read, look up, write, mark, move, change state.
    ///
    /// # Returns
    ///
    /// * `Ok(Step::Continue)` if a transition was applied and the machine is still running.
    /// * `Ok(Step::Halt)` if the applied transition entered `HALT`, or the machine had
    ///   already halted (nothing is done in that case).
    /// * `Err(TuringMachineError::EmptyProgram)` if the program has no rules.
    /// * `Err(TuringMachineError::TapeSizeExceeded)` if the tape reached the ceiling.
    /// * `Err(TuringMachineError::UndefinedTransition)` if no rule matches the current state
    ///   and symbol.
    pub fn step(&mut self) -> Result<Step, TuringMachineError> {
        if self.program.is_empty() {
            return Err(TuringMachineError::EmptyProgram);
        }

        if self.is_halted() {
            return Ok(Step::Halt);
        }

        if let Some(limit) = self.config.max_tape_size {
            if self.tape.len() >= limit {
                warn!(
                    "Tape reached {} cells after {} steps, aborting",
                    self.tape.len(),
                    self.step_count
                );
                return Err(TuringMachineError::TapeSizeExceeded {
                    size: self.tape.len(),
                    limit,
                });
            }
        }

        let symbol = self.tape.read();
        let position = self
            .program
            .table
            .position(&self.state, symbol)
            .ok_or_else(|| TuringMachineError::UndefinedTransition(self.state.clone(), symbol))?;
        let transition = &self.program.table.transitions()[position];

        self.tape.write(transition.write);
        self.tape.mark(Mark {
            rule: position,
            color: transition.color,
        });
        self.tape.shift(transition.direction);
        self.state.clone_from(&transition.next_state);

        self.unused.remove(&position);
        self.step_count += 1;

        debug!(
            "Step {}: {} -> {} at cell {}",
            self.step_count,
            transition.signature,
            self.state,
            self.tape.head()
        );

        if self.is_halted() {
            info!("Machine halted after {} steps", self.step_count);
            Ok(Step::Halt)
        } else {
            Ok(Step::Continue)
        }
    }

    /// Adds `elapsed_ms` to the time since the last step and performs one step once a full
    /// step duration has accumulated.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` if not enough time has passed; nothing else changes.
    /// * `Ok(Some(step))` if a step was performed; the accumulated time restarts at zero.
    /// * `Err(_)` if the step failed; the accumulated time is kept.
    pub fn update(&mut self, elapsed_ms: u64) -> Result<Option<Step>, TuringMachineError> {
        self.elapsed_ms = self.elapsed_ms.saturating_add(elapsed_ms);
        if self.elapsed_ms < self.config.step_duration_ms {
            return Ok(None);
        }

        let step = self.step()?;
        self.elapsed_ms = 0;

        Ok(Some(step))
    }

    /// Runs the machine until it halts, fails, or uses up `max_steps`.
    pub fn run(&mut self) -> Result<Step, TuringMachineError> {
        self.run_with(|_| {})
    }

    /// Like `run`, calling `observer` after every committed step.
    pub fn run_with<F>(&mut self, mut observer: F) -> Result<Step, TuringMachineError>
    where
        F: FnMut(&TuringMachine),
    {
        if self.program.is_empty() {
            return Err(TuringMachineError::EmptyProgram);
        }

        let mut taken = 0;
        while !self.is_halted() {
            if let Some(limit) = self.config.max_steps {
                if taken >= limit {
                    warn!("No halt within {limit} steps, aborting");
                    return Err(TuringMachineError::StepLimitExceeded(limit));
                }
            }

            self.step()?;
            taken += 1;
            observer(self);
        }

        Ok(Step::Halt)
    }

    /// Resets the Turing Machine to its initial configuration.
    /// This includes the state, the tape, the step count, the accumulated time and the set of
    /// unused transitions.
    pub fn reset(&mut self) {
        self.state = self.program.initial_state.clone().unwrap_or_default();
        self.tape = self.initial_tape.clone();
        self.step_count = 0;
        self.elapsed_ms = 0;
        self.unused = (0..self.program.table.len()).collect();
        info!("Machine reset");
    }

    /// Replaces the tape, both now and for future resets.
    pub fn set_tape(&mut self, tape: Tape) {
        self.initial_tape = tape.clone();
        self.tape = tape;
    }

    /// Changes how long `update` waits between steps. Has no effect on what a step does.
    pub fn set_step_duration(&mut self, step_duration_ms: u64) {
        self.config.step_duration_ms = step_duration_ms;
    }

    /// Returns the current state of the Turing Machine.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the initial state, `None` for an empty program.
    pub fn initial_state(&self) -> Option<&str> {
        self.program.initial_state.as_deref()
    }

    /// Returns the total number of steps executed by the Turing Machine.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Checks if the machine is in the `HALT` state.
    pub fn is_halted(&self) -> bool {
        self.state == HALT_STATE
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// The transition the next `step` will apply, if one matches.
    pub fn current_rule(&self) -> Option<&Transition> {
        self.program.table.get(&self.state, self.tape.read())
    }

    /// Position of `current_rule` in definition order.
    pub fn current_rule_index(&self) -> Option<usize> {
        self.program.table.position(&self.state, self.tape.read())
    }

    /// Transitions that have never been applied since construction or the last reset.
    pub fn unused_rules(&self) -> Vec<&Transition> {
        let transitions = self.program.transitions();
        self.unused.iter().map(|&i| &transitions[i]).collect()
    }

    /// Fraction of the step duration accumulated so far, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.config.step_duration_ms == 0 {
            return 1.0;
        }
        (self.elapsed_ms as f64 / self.config.step_duration_ms as f64).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol;
    use crate::types::TAPE_CHUNK;

    fn machine(input: &str) -> TuringMachine {
        TuringMachine::from_description(input).unwrap()
    }

    #[test]
    fn test_two_steps_on_blank_tape() {
        let mut machine = machine("A-S_-S1-R-B;B-S_-S0-R-A");

        assert_eq!(machine.state(), "A");
        assert_eq!(machine.step().unwrap(), Step::Continue);
        assert_eq!(machine.step().unwrap(), Step::Continue);

        assert_eq!(machine.tape().read_at(0).unwrap(), Symbol::One);
        assert_eq!(machine.tape().read_at(1).unwrap(), Symbol::Zero);
        assert_eq!(machine.tape().head(), 2);
        assert_eq!(machine.state(), "A");
        assert_eq!(machine.step_count(), 2);
    }

    #[test]
    fn test_halt_and_no_op_afterwards() {
        let mut machine = machine("A-S_-S1-R-B; B-S_-S1-R-C; C-S_-S0-N-HALT");

        assert_eq!(machine.step().unwrap(), Step::Continue);
        assert_eq!(machine.step().unwrap(), Step::Continue);
        assert_eq!(machine.step().unwrap(), Step::Halt);
        assert!(machine.is_halted());

        let tape = machine.tape().clone();
        assert_eq!(machine.step().unwrap(), Step::Halt);
        assert_eq!(machine.step_count(), 3);
        assert_eq!(machine.tape(), &tape);
    }

    #[test]
    fn test_undefined_transition_leaves_machine_untouched() {
        let mut machine = machine("A-S_-S1-R-B; B-S1-S0-R-A");
        machine.step().unwrap();

        let tape = machine.tape().clone();
        let error = machine.step().unwrap_err();

        assert_eq!(
            error,
            TuringMachineError::UndefinedTransition("B".to_string(), Symbol::Blank)
        );
        assert_eq!(machine.tape(), &tape);
        assert_eq!(machine.state(), "B");
        assert_eq!(machine.step_count(), 1);
        assert!(machine.current_rule().is_none());

        // the same call keeps failing the same way
        assert!(machine.step().is_err());
        assert_eq!(machine.step_count(), 1);
    }

    #[test]
    fn test_empty_program_fails_fast() {
        let mut machine = machine("just a title\n#########\n");

        assert_eq!(machine.initial_state(), None);
        assert_eq!(machine.step(), Err(TuringMachineError::EmptyProgram));
        assert_eq!(machine.run(), Err(TuringMachineError::EmptyProgram));
    }

    #[test]
    fn test_tape_ceiling_stops_runaway() {
        let mut machine = machine("A-S_-S1-R-A");

        let error = machine.run().unwrap_err();

        assert_eq!(
            error,
            TuringMachineError::TapeSizeExceeded {
                size: 1004,
                limit: 999
            }
        );
        assert_eq!(machine.step_count(), 994);
        assert_eq!(machine.tape().head(), 994);
        assert!(!machine.is_halted());
    }

    #[test]
    fn test_unbounded_config_uses_step_limit() {
        let config = MachineConfig {
            max_tape_size: None,
            max_steps: Some(50),
            ..MachineConfig::default()
        };
        let mut machine = TuringMachine::with_config(parse("A-S_-S1-N-A; A-S1-S_-N-A").unwrap(), config);

        assert_eq!(machine.run(), Err(TuringMachineError::StepLimitExceeded(50)));
        assert_eq!(machine.step_count(), 50);
    }

    #[test]
    fn test_left_growth_during_run() {
        let mut machine = machine("A-S_-S1-L-B; B-S_-S1-N-HALT");

        assert_eq!(machine.run().unwrap(), Step::Halt);

        let tape = machine.tape();
        assert_eq!(tape.head(), TAPE_CHUNK - 1);
        assert_eq!(tape.read_at(TAPE_CHUNK).unwrap(), Symbol::One);
        assert_eq!(tape.read_at(TAPE_CHUNK - 1).unwrap(), Symbol::One);
        assert_eq!(tape.mark_at(TAPE_CHUNK).unwrap().unwrap().rule, 0);
        assert_eq!(tape.mark_at(TAPE_CHUNK - 1).unwrap().unwrap().rule, 1);
        assert_eq!(tape.cells_in_use(), 2);
    }

    #[test]
    fn test_marks_follow_rule_colours() {
        let mut machine = machine("A-S_-S1-R-B; B-S_-S0-L-A; A-S1-S1-N-HALT");
        machine.run().unwrap();

        let colors: Vec<_> = machine.program().transitions().iter().map(|t| t.color).collect();
        let tape = machine.tape();

        assert_eq!(tape.mark_at(0).unwrap().unwrap().color, colors[2]);
        assert_eq!(tape.mark_at(1).unwrap().unwrap().color, colors[1]);
        assert_eq!(tape.cells_in_use(), 2);
    }

    #[test]
    fn test_update_is_time_gated() {
        let config = MachineConfig {
            step_duration_ms: 100,
            ..MachineConfig::default()
        };
        let mut machine = TuringMachine::with_config(parse("A-S_-S1-R-A").unwrap(), config);

        assert_eq!(machine.update(40).unwrap(), None);
        assert!((machine.progress() - 0.4).abs() < 1e-9);
        assert_eq!(machine.update(40).unwrap(), None);
        assert_eq!(machine.step_count(), 0);

        assert_eq!(machine.update(30).unwrap(), Some(Step::Continue));
        assert_eq!(machine.step_count(), 1);
        assert_eq!(machine.progress(), 0.0);

        // one step per threshold crossing, however large the jump
        assert_eq!(machine.update(1000).unwrap(), Some(Step::Continue));
        assert_eq!(machine.step_count(), 2);
    }

    #[test]
    fn test_update_keeps_time_on_error() {
        let config = MachineConfig {
            step_duration_ms: 10,
            ..MachineConfig::default()
        };
        let mut machine = TuringMachine::with_config(parse("A-S1-S1-R-A").unwrap(), config);

        assert!(machine.update(20).is_err());
        assert_eq!(machine.progress(), 1.0);
        assert_eq!(machine.step_count(), 0);
    }

    #[test]
    fn test_current_rule_matches_lookup() {
        let mut machine = machine("A-S_-S1-R-B; B-S_-S0-L-A; A-S1-S1-N-HALT");

        while !machine.is_halted() {
            let expected = machine
                .program()
                .table
                .get(machine.state(), machine.tape().read())
                .cloned();
            assert_eq!(machine.current_rule().cloned(), expected);
            machine.step().unwrap();
        }
        assert!(machine.current_rule().is_none());
    }

    #[test]
    fn test_unused_rules() {
        let mut machine = machine("A-S_-S1-R-B; B-S_-S0-N-HALT; B-S1-S1-R-A; C-S_-S_-N-HALT");
        assert_eq!(machine.unused_rules().len(), 4);

        machine.run().unwrap();

        let unused: Vec<_> = machine
            .unused_rules()
            .iter()
            .map(|t| (t.state.as_str(), t.read))
            .collect();
        assert_eq!(unused, vec![("B", Symbol::One), ("C", Symbol::Blank)]);
    }

    #[test]
    fn test_reset() {
        let mut machine = machine("A-S_-S1-R-B; B-S_-S0-N-HALT");
        machine.run().unwrap();

        machine.reset();

        assert_eq!(machine.state(), "A");
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.tape(), &Tape::default());
        assert_eq!(machine.unused_rules().len(), 2);
    }

    #[test]
    fn test_set_tape_input() {
        let mut machine = machine("A-S1-S0-R-A; A-S_-S_-N-HALT");
        machine.set_tape(Tape::from_tokens("S1 S1 S1", 0, Symbol::Blank).unwrap());

        assert_eq!(machine.run().unwrap(), Step::Halt);
        assert_eq!(machine.step_count(), 4);
        assert_eq!(machine.tape().count(Symbol::Zero), 3);

        machine.reset();
        assert_eq!(machine.tape().count(Symbol::One), 3);
    }

    #[test]
    fn test_run_with_observer() {
        let mut machine = machine("A-S_-S1-R-B; B-S_-S1-R-C; C-S_-S1-R-HALT");
        let mut seen = Vec::new();

        machine
            .run_with(|m| seen.push((m.step_count(), m.state().to_string())))
            .unwrap();

        assert_eq!(
            seen,
            vec![
                (1, "B".to_string()),
                (2, "C".to_string()),
                (3, "HALT".to_string())
            ]
        );
    }

    #[test]
    fn test_step_duration_does_not_change_semantics() {
        let mut fast = machine("A-S_-S1-R-B; B-S_-S0-L-A; A-S1-S1-N-HALT");
        let mut slow = fast.clone();
        fast.set_step_duration(1);
        slow.set_step_duration(500);

        while !fast.is_halted() {
            fast.update(1).unwrap();
        }
        while !slow.is_halted() {
            slow.update(250).unwrap();
        }

        assert_eq!(fast.tape(), slow.tape());
        assert_eq!(fast.step_count(), slow.step_count());
    }
}
