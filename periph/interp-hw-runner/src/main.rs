//! Randomized cross-check of a physical interpolator against the software model
//!
//! Applies random register operations through the hardware proxy and dumps
//! both register states after every step; any XOR difference is reported
//! field by field.

use clap::Parser;
use env_logger::Env;
use interp_emu::{InterpOps, InterpState};
use interp_hw_runner::{HardwareInterp, HwError, SerialPort};
use std::path::PathBuf;

#[derive(Debug, Parser)]
struct Args {
    /// Serial device connected to the interpolator test firmware
    #[arg(long, default_value = "/dev/ttyACM0")]
    port: PathBuf,

    /// Interpolator index to exercise (0 or 1)
    #[arg(long, short = 'n', default_value_t = 0)]
    interp: u8,

    /// Number of random operations to apply
    #[arg(long, short = 'i', default_value_t = 1000)]
    iterations: u32,

    /// Echo every protocol exchange
    #[arg(long, short = 'd')]
    debug: bool,
}

macro_rules! diff_array {
    ($simulated:expr, $hardware:expr, $field:ident) => {
        for i in 0..$simulated.$field.len() {
            if $simulated.$field[i] != $hardware.$field[i] {
                log::info!(
                    "  {}[{i}]: simulated={:#010x}, hardware={:#010x}",
                    stringify!($field),
                    $simulated.$field[i],
                    $hardware.$field[i],
                );
            }
        }
    };
}

fn report_diff(simulated: &InterpState, hardware: &InterpState) {
    diff_array!(simulated, hardware, accum);
    diff_array!(simulated, hardware, base);
    diff_array!(simulated, hardware, ctrl);
    diff_array!(simulated, hardware, peek);
    diff_array!(simulated, hardware, peekraw);
}

fn random_index(limit: usize) -> usize {
    usize::from(rand::random::<u8>()) % limit
}

/// Apply one random operation; returns whether a read operation returned a
/// value the model disagrees with.
fn apply_random_op(interp: &mut HardwareInterp<SerialPort>) -> Result<bool, HwError> {
    match rand::random::<u8>() % 9 {
        0 => interp.set_accum(random_index(2), rand::random())?,
        1 => interp.set_base(random_index(3), rand::random())?,
        2 => interp.set_ctrl(random_index(2), rand::random())?,
        3 => interp.add(random_index(2), rand::random())?,
        4 => interp.base01(rand::random())?,
        5 => interp.restore(&InterpState::random())?,
        6 => {
            let i = random_index(3);
            let expected = interp.save_simulated().peek[i];
            let actual = interp.peek(i)?;
            if actual != expected {
                log::info!("peek{i}: simulated={expected:#010x}, hardware={actual:#010x}");
                return Ok(true);
            }
        }
        7 => {
            let i = random_index(2);
            let expected = interp.save_simulated().peekraw[i];
            let actual = interp.peekraw(i)?;
            if actual != expected {
                log::info!("peekraw{i}: simulated={expected:#010x}, hardware={actual:#010x}");
                return Ok(true);
            }
        }
        _ => {
            let i = random_index(3);
            let expected = interp.save_simulated().peek[i];
            let actual = interp.pop(i)?;
            if actual != expected {
                log::info!("pop{i}: simulated={expected:#010x}, hardware={actual:#010x}");
                return Ok(true);
            }
        }
    }

    Ok(false)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let port = SerialPort::open(&args.port)?;
    let mut interp = HardwareInterp::connect(args.interp, port)?;

    log::info!(
        "Connected to {} generation {} interpolator {}",
        args.port.display(),
        interp.generation(),
        interp.index()
    );

    let mut failure_count = 0_u32;
    for iteration in 0..args.iterations {
        let mut mismatch = apply_random_op(&mut interp)?;

        let diff = interp.diff()?;
        if !diff.is_zero() {
            log::info!("State mismatch after iteration {iteration}:");
            report_diff(&interp.save_simulated(), &interp.save_hardware()?);
            mismatch = true;
        }

        if mismatch {
            failure_count += 1;
        }
    }

    log::info!("{failure_count} mismatches out of {} iterations", args.iterations);

    if failure_count != 0 {
        anyhow::bail!("simulation and hardware disagree");
    }

    Ok(())
}
