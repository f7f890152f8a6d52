//! Utilities to debug simulation.
//!
//! The [`Simulator`] only executes one instruction at a time.
//! This module holds the driver that runs it for longer:
//! - [`Breakpoint`]: a condition that stops a run.
//! - [`Driver`]: runs the simulator until it halts, hits a breakpoint, or finishes a step.
//!
//! ```
//! use lc3_workbench::asm::assemble;
//! use lc3_workbench::sim::Simulator;
//! use lc3_workbench::sim::os::OsImage;
//! use lc3_workbench::sim::debug::{Breakpoint, Driver, StopReason};
//!
//! let src = "
//!     .orig x3000
//!     ADD R0, R0, #0
//!     ADD R0, R0, #1
//!     ADD R0, R0, #2
//!     ADD R0, R0, #3
//!     HALT
//!     .end
//! ";
//! let obj_file = assemble(src).unwrap();
//!
//! let mut sim = Simulator::new(Default::default(), OsImage::standard());
//! sim.load_obj_file(&obj_file);
//!
//! let mut driver = Driver::new();
//! driver.breakpoints.push(Breakpoint::Pc(0x3002));
//! assert_eq!(driver.run(&mut sim), StopReason::Breakpoint);
//! assert_eq!(sim.pc(), 0x3002);
//!
//! assert_eq!(driver.run(&mut sim), StopReason::Halted);
//! assert!(!sim.is_running());
//! ```
use super::mem::RegId;
use super::Simulator;

/// A condition that stops a [`Driver`].
///
/// Breakpoints only observe the machine. Memory is read without going through
/// the device handler, so checking `KBDR` does not consume a key.
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
pub enum Breakpoint {
    /// Stops when the PC reaches this address.
    Pc(u16),
    /// Stops when a register's value satisfies the comparator.
    Reg {
        #[allow(missing_docs)]
        reg: RegId,
        #[allow(missing_docs)]
        value: Comparator
    },
    /// Stops when a memory word satisfies the comparator.
    Mem {
        #[allow(missing_docs)]
        addr: u16,
        #[allow(missing_docs)]
        value: Comparator
    },
}

impl Breakpoint {
    /// Tests this breakpoint against the current machine state.
    pub fn check(&self, sim: &Simulator) -> bool {
        match *self {
            Breakpoint::Pc(addr) => sim.pc() == addr,
            Breakpoint::Reg { reg, value } => value.check(sim.reg(reg)),
            Breakpoint::Mem { addr, value } => value.check(sim.store().mem(addr)),
        }
    }
}
impl std::fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Breakpoint::Pc(addr) => write!(f, "PC == x{addr:04X}"),
            Breakpoint::Reg { reg, value } => write!(f, "{reg} {value}"),
            Breakpoint::Mem { addr, value } => write!(f, "mem[x{addr:04X}] {value}"),
        }
    }
}

/// A predicate on a 16-bit value.
///
/// Values are compared unsigned.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum Comparator {
    #[allow(missing_docs)] Never,
    #[allow(missing_docs)] Lt(u16),
    #[allow(missing_docs)] Eq(u16),
    #[allow(missing_docs)] Le(u16),
    #[allow(missing_docs)] Gt(u16),
    #[allow(missing_docs)] Ne(u16),
    #[allow(missing_docs)] Ge(u16),
    #[allow(missing_docs)] Always
}
impl Comparator {
    /// The operator and right-hand side, for display.
    fn parts(self) -> Option<(&'static str, u16)> {
        match self {
            Comparator::Lt(rhs) => Some(("<", rhs)),
            Comparator::Eq(rhs) => Some(("==", rhs)),
            Comparator::Le(rhs) => Some(("<=", rhs)),
            Comparator::Gt(rhs) => Some((">", rhs)),
            Comparator::Ne(rhs) => Some(("!=", rhs)),
            Comparator::Ge(rhs) => Some((">=", rhs)),
            Comparator::Never | Comparator::Always => None,
        }
    }

    /// Tests `value` against this comparator.
    pub fn check(self, value: u16) -> bool {
        match self {
            Comparator::Never   => false,
            Comparator::Always  => true,
            Comparator::Lt(rhs) => value < rhs,
            Comparator::Eq(rhs) => value == rhs,
            Comparator::Le(rhs) => value <= rhs,
            Comparator::Gt(rhs) => value > rhs,
            Comparator::Ne(rhs) => value != rhs,
            Comparator::Ge(rhs) => value >= rhs,
        }
    }
}
impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.parts() {
            Some((op, rhs)) => write!(f, "{op} {rhs}"),
            None if *self == Comparator::Always => f.write_str("always"),
            None => f.write_str("never"),
        }
    }
}

/// Why a [`Driver`] stopped running the simulator.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StopReason {
    /// The machine's clock stopped (MCR bit 15 cleared).
    Halted,
    /// A breakpoint's condition was met.
    Breakpoint,
    /// The step limit was reached.
    StepLimit,
    /// The requested step finished.
    Completed,
}

/// Runs the simulator until a stopping condition.
///
/// Breakpoints are checked after each instruction.
/// Every run executes at least one instruction (if the machine is running),
/// so resuming from a breakpoint does not immediately stop again.
#[derive(Debug, Clone)]
pub struct Driver {
    /// The breakpoints to stop at.
    pub breakpoints: Vec<Breakpoint>,
    /// The maximum number of instructions a single run may execute.
    ///
    /// If `None`, runs are unbounded.
    pub step_limit: Option<u64>
}
impl Default for Driver {
    fn default() -> Self {
        Self {
            breakpoints: vec![],
            step_limit: Some(1_000_000)
        }
    }
}
impl Driver {
    /// Creates a driver with no breakpoints and the default step limit.
    pub fn new() -> Self {
        Default::default()
    }

    /// Runs until `done` holds, checking breakpoints and the step limit along the way.
    fn run_until(&self, sim: &mut Simulator, mut done: impl FnMut(&Simulator) -> bool) -> StopReason {
        let mut steps = 0u64;

        let reason = loop {
            if !sim.is_running() {
                break StopReason::Halted;
            }
            if self.step_limit.is_some_and(|limit| steps >= limit) {
                break StopReason::StepLimit;
            }

            sim.step();
            steps += 1;

            if done(sim) {
                break StopReason::Completed;
            }
            if self.breakpoints.iter().any(|bp| bp.check(sim)) {
                break StopReason::Breakpoint;
            }
        };

        tracing::info!(?reason, steps, pc = %crate::num::to_hex_string(sim.pc()), "simulation stopped");
        reason
    }

    /// Runs until the machine halts or a breakpoint is hit.
    pub fn run(&self, sim: &mut Simulator) -> StopReason {
        self.run_until(sim, |_| false)
    }

    /// Executes one instruction.
    pub fn step_in(&self, sim: &mut Simulator) -> StopReason {
        self.run_until(sim, |_| true)
    }

    /// Executes one instruction, running any subroutine or trap it calls to completion.
    pub fn step_over(&self, sim: &mut Simulator) -> StopReason {
        let depth = sim.call_depth();
        self.run_until(sim, |sim| sim.call_depth() <= depth)
    }

    /// Runs until the current subroutine returns.
    ///
    /// Outside of any subroutine, this completes immediately.
    pub fn step_out(&self, sim: &mut Simulator) -> StopReason {
        let depth = sim.call_depth();
        if depth == 0 {
            return StopReason::Completed;
        }
        self.run_until(sim, |sim| sim.call_depth() < depth)
    }
}

#[cfg(test)]
mod tests {
    use crate::asm::assemble;
    use crate::ast::reg_consts::R1;
    use crate::sim::os::OsImage;
    use crate::sim::Simulator;

    use super::{Breakpoint, Comparator, Driver, StopReason};

    const SRC: &str = "
        .orig x3000
        JSR SUB
        ADD R1, R1, #1
        HALT
        SUB ADD R1, R1, #2
            ADD R1, R1, #3
            RET
        .end
    ";

    fn setup() -> Simulator {
        let mut sim = Simulator::new(Default::default(), OsImage::standard());
        sim.load_obj_file(&assemble(SRC).unwrap());
        sim
    }

    #[test]
    fn test_step_over() {
        let mut sim = setup();
        let driver = Driver::new();

        assert_eq!(driver.step_over(&mut sim), StopReason::Completed);
        assert_eq!(sim.pc(), 0x3001);
        assert_eq!(sim.reg(R1.into()), 5);

        // not a call, so this is one step
        assert_eq!(driver.step_over(&mut sim), StopReason::Completed);
        assert_eq!(sim.pc(), 0x3002);

        // HALT never returns
        assert_eq!(driver.step_over(&mut sim), StopReason::Halted);
    }

    #[test]
    fn test_step_in_out() {
        let mut sim = setup();
        let driver = Driver::new();

        assert_eq!(driver.step_out(&mut sim), StopReason::Completed);
        assert_eq!(sim.pc(), 0x3000);

        assert_eq!(driver.step_in(&mut sim), StopReason::Completed);
        assert_eq!(sim.pc(), 0x3003);
        assert_eq!(sim.call_depth(), 1);

        assert_eq!(driver.step_out(&mut sim), StopReason::Completed);
        assert_eq!(sim.pc(), 0x3001);
        assert_eq!(sim.call_depth(), 0);
    }

    #[test]
    fn test_breakpoints() {
        let mut sim = setup();
        let mut driver = Driver::new();
        driver.breakpoints.push(Breakpoint::Reg { reg: R1.into(), value: Comparator::Ge(5) });

        assert_eq!(driver.run(&mut sim), StopReason::Breakpoint);
        assert_eq!(sim.pc(), 0x3005);

        driver.breakpoints.clear();
        driver.breakpoints.push(Breakpoint::Mem { addr: 0x3000, value: Comparator::Eq(0) });
        driver.breakpoints.push(Breakpoint::Pc(0x3002));
        assert_eq!(driver.run(&mut sim), StopReason::Breakpoint);
        assert_eq!(sim.pc(), 0x3002);
        assert_eq!(sim.reg(R1.into()), 6);

        // HALT's routine reuses R1, so only the stop reason is checked past here
        driver.breakpoints.pop();
        assert_eq!(driver.run(&mut sim), StopReason::Halted);

        assert_eq!(Breakpoint::Pc(0x3000).to_string(), "PC == x3000");
        assert_eq!(driver.breakpoints[0].to_string(), "mem[x3000] == 0");
    }

    #[test]
    fn test_comparator() {
        assert!(Comparator::Always.check(0));
        assert!(!Comparator::Never.check(0));
        assert!(Comparator::Lt(0x8000).check(0x7FFF));
        assert!(!Comparator::Lt(0x8000).check(0x8000));
        assert!(Comparator::Le(0x8000).check(0x8000));
        assert!(Comparator::Ge(0x8000).check(0xFFFF));
        assert!(Comparator::Ne(3).check(4));
        assert!(!Comparator::Gt(3).check(3));
        assert_eq!(Comparator::Ge(7).to_string(), ">= 7");
    }

    #[test]
    fn test_step_limit() {
        let mut sim = Simulator::new(Default::default(), OsImage::standard());
        sim.load_obj_file(&assemble(".orig x3000\nLOOP BR LOOP\n.end").unwrap());

        let driver = Driver { step_limit: Some(50), ..Default::default() };
        assert_eq!(driver.run(&mut sim), StopReason::StepLimit);
        assert_eq!(sim.instructions_run(), 50);
    }
}
