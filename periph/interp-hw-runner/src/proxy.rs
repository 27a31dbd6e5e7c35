//! Mirror of the software model onto a physical device
//!
//! Every operation is applied to the embedded software interpolator first and
//! then forwarded over the line protocol. Reads return the device's value,
//! and `diff` XORs the two register states, so any divergence between the
//! model and the silicon is observable.

use crate::protocol::{self, HwError, Transport};
use interp_emu::{Generation, InterpOps, InterpState, Interpolator};

pub struct HardwareInterp<T> {
    sim: Interpolator,
    port: T,
}

impl<T: Transport> HardwareInterp<T> {
    /// Query the device generation and build the matching software model for
    /// interpolator `n`.
    ///
    /// # Errors
    ///
    /// Fails if the generation exchange fails or `n` is not 0 or 1.
    pub fn connect(n: u8, mut port: T) -> Result<Self, HwError> {
        let (keyword, rest) = protocol::transact(&mut port, "generation 0")?;
        if keyword != "generation" || rest.is_empty() {
            return Err(HwError::Shape(format!(
                "expected 'generation', got '{keyword} {rest}'"
            )));
        }

        let generation =
            rest.parse::<Generation>().map_err(|err| HwError::InvalidGeneration(err.0))?;

        Ok(Self { sim: Interpolator::new(n, generation)?, port })
    }

    #[must_use]
    pub fn index(&self) -> u8 {
        self.sim.index()
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.sim.generation()
    }

    /// Snapshot the software model only; no device traffic.
    #[must_use]
    pub fn save_simulated(&mut self) -> InterpState {
        self.sim.save()
    }

    /// Dump the device's full register state.
    ///
    /// # Errors
    ///
    /// Fails on transport or protocol errors.
    pub fn save_hardware(&mut self) -> Result<InterpState, HwError> {
        let n = self.sim.index();
        let (keyword, rest) = protocol::transact(&mut self.port, &format!("dump {n}"))?;
        let values = protocol::expect_data(&keyword, &rest, 12)?;

        Ok(InterpState {
            accum: [values[0], values[1]],
            base: [values[2], values[3], values[4]],
            ctrl: [values[5], values[6]],
            peek: [values[7], values[8], values[9]],
            peekraw: [values[10], values[11]],
        })
    }

    /// XOR of the simulated and hardware states; a zero state means the model
    /// and the device agree on every register.
    ///
    /// # Errors
    ///
    /// Fails on transport or protocol errors.
    pub fn diff(&mut self) -> Result<InterpState, HwError> {
        let simulated = self.save_simulated();
        let hardware = self.save_hardware()?;

        Ok(simulated ^ hardware)
    }

    fn write_reg(&mut self, reg: &str, value: u32) -> Result<(), HwError> {
        let n = self.sim.index();
        let (keyword, rest) =
            protocol::transact(&mut self.port, &format!("write {n} {reg} {value:#x}"))?;
        protocol::expect_ok(&keyword, &rest)
    }

    fn read_reg(&mut self, reg: &str) -> Result<u32, HwError> {
        let n = self.sim.index();
        let (keyword, rest) = protocol::transact(&mut self.port, &format!("read {n} {reg}"))?;
        Ok(protocol::expect_data(&keyword, &rest, 1)?[0])
    }

    fn write_state(&mut self, state: &InterpState) -> Result<(), HwError> {
        let n = self.sim.index();
        let cmd = format!(
            "state {n} {:#x} {:#x} {:#x} {:#x} {:#x} {:#x} {:#x}",
            state.accum[0],
            state.accum[1],
            state.base[0],
            state.base[1],
            state.base[2],
            state.ctrl[0],
            state.ctrl[1],
        );
        let (keyword, rest) = protocol::transact(&mut self.port, &cmd)?;
        protocol::expect_ok(&keyword, &rest)
    }
}

impl<T: Transport> InterpOps for HardwareInterp<T> {
    type Error = HwError;

    fn set_accum(&mut self, i: usize, value: u32) -> Result<(), HwError> {
        self.sim.set_accum(i, value)?;
        self.write_reg(&format!("accum{i}"), value)
    }

    fn set_base(&mut self, i: usize, value: u32) -> Result<(), HwError> {
        self.sim.set_base(i, value)?;
        self.write_reg(&format!("base{i}"), value)
    }

    fn set_ctrl(&mut self, i: usize, value: u32) -> Result<(), HwError> {
        self.sim.set_ctrl(i, value)?;
        self.write_reg(&format!("ctrl{i}"), value)
    }

    fn add(&mut self, i: usize, value: u32) -> Result<(), HwError> {
        self.sim.add(i, value)?;
        self.write_reg(&format!("add{i}"), value)
    }

    fn base01(&mut self, value: u32) -> Result<(), HwError> {
        self.sim.base01(value);
        self.write_reg("base01", value)
    }

    fn peek(&mut self, i: usize) -> Result<u32, HwError> {
        self.sim.peek(i)?;
        self.read_reg(&format!("peek{i}"))
    }

    fn peekraw(&mut self, i: usize) -> Result<u32, HwError> {
        self.sim.peekraw(i)?;
        self.read_reg(&format!("peekraw{i}"))
    }

    fn pop(&mut self, i: usize) -> Result<u32, HwError> {
        self.sim.pop(i)?;
        self.read_reg(&format!("pop{i}"))
    }

    fn save(&mut self) -> Result<InterpState, HwError> {
        self.save_hardware()
    }

    fn restore(&mut self, state: &InterpState) -> Result<(), HwError> {
        self.sim.restore(state);
        self.write_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    struct ScriptedPort {
        sent: Vec<String>,
        responses: VecDeque<String>,
    }

    impl ScriptedPort {
        fn new(responses: &[&str]) -> Self {
            Self {
                sent: Vec::new(),
                responses: responses.iter().map(|&line| line.to_owned()).collect(),
            }
        }
    }

    impl Transport for ScriptedPort {
        fn send_line(&mut self, line: &str) -> io::Result<()> {
            self.sent.push(line.to_owned());
            Ok(())
        }

        fn recv_line(&mut self) -> io::Result<String> {
            Ok(self.responses.pop_front().expect("command sent with no scripted response"))
        }
    }

    const ZERO_DUMP: &str = "data 0x0 0x0 0x0 0x0 0x0 0x0 0x0 0x0 0x0 0x0 0x0 0x0";

    #[test]
    fn connect_queries_generation() {
        let port = ScriptedPort::new(&["generation RP2350"]);
        let interp = HardwareInterp::connect(0, port).unwrap();

        assert_eq!(interp.generation(), Generation::Rp2350);
        assert_eq!(interp.port.sent, vec!["generation 0"]);
    }

    #[test]
    fn connect_rejects_unknown_generation() {
        let port = ScriptedPort::new(&["generation RP1"]);
        assert!(matches!(
            HardwareInterp::connect(0, port),
            Err(HwError::InvalidGeneration(name)) if name == "RP1"
        ));
    }

    #[test]
    fn writes_mirror_to_device() {
        let port = ScriptedPort::new(&["generation RP2040", "ok", "ok", "ok"]);
        let mut interp = HardwareInterp::connect(1, port).unwrap();

        interp.set_accum(0, 0x1234).unwrap();
        interp.set_ctrl(1, 0xF0).unwrap();
        interp.base01(0x0002_0001).unwrap();

        assert_eq!(
            interp.port.sent[1..],
            ["write 1 accum0 0x1234", "write 1 ctrl1 0xf0", "write 1 base01 0x20001"]
        );
        assert_eq!(interp.save_simulated().base, [1, 2, 0]);
    }

    #[test]
    fn reads_return_device_value() {
        let port = ScriptedPort::new(&["generation RP2040", "data 0x55"]);
        let mut interp = HardwareInterp::connect(0, port).unwrap();

        assert_eq!(interp.pop(0).unwrap(), 0x55);
        assert_eq!(interp.port.sent[1], "read 0 pop0");
    }

    #[test]
    fn restore_mirrors_primary_state() {
        let port = ScriptedPort::new(&["generation RP2040", "ok"]);
        let mut interp = HardwareInterp::connect(0, port).unwrap();

        let state = InterpState {
            accum: [1, 2],
            base: [3, 4, 5],
            ctrl: [6, 7],
            ..InterpState::default()
        };
        interp.restore(&state).unwrap();

        assert_eq!(interp.port.sent[1], "state 0 0x1 0x2 0x3 0x4 0x5 0x6 0x7");
    }

    #[test]
    fn diff_is_zero_on_agreement() {
        let port = ScriptedPort::new(&["generation RP2040", ZERO_DUMP]);
        let mut interp = HardwareInterp::connect(0, port).unwrap();

        assert!(interp.diff().unwrap().is_zero());
        assert_eq!(interp.port.sent[1], "dump 0");
    }

    #[test]
    fn diff_isolates_disagreement() {
        let port = ScriptedPort::new(&[
            "generation RP2040",
            "data 0x0 0xff 0x0 0x0 0x0 0x0 0x0 0x0 0x0 0x0 0x0 0x0",
        ]);
        let mut interp = HardwareInterp::connect(0, port).unwrap();

        let diff = interp.diff().unwrap();
        assert_eq!(diff.accum, [0, 0xFF]);
        assert!(!diff.is_zero());
    }

    #[test]
    fn syntax_response_surfaces_as_error() {
        let port = ScriptedPort::new(&["generation RP2040", "syntax unknown register"]);
        let mut interp = HardwareInterp::connect(0, port).unwrap();

        assert!(matches!(
            interp.set_accum(0, 0),
            Err(HwError::Syntax(message)) if message == "unknown register"
        ));
    }

    #[test]
    fn malformed_responses_surface_as_shape_errors() {
        let port = ScriptedPort::new(&["generation RP2040", "ready"]);
        let mut interp = HardwareInterp::connect(0, port).unwrap();
        assert!(matches!(interp.set_accum(0, 0), Err(HwError::Shape(_))));

        let port = ScriptedPort::new(&["generation RP2040", "data 0x1 0x2"]);
        let mut interp = HardwareInterp::connect(0, port).unwrap();
        assert!(matches!(interp.peek(0), Err(HwError::Shape(_))));
    }
}
