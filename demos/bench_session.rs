//! Bench session example.
//!
//! Opens a bench on blank storage, adjusts a few parameters, persists them,
//! then drives one revolution on printing coil pins and sweeps a servo.
//!
//! Runs on the host; no hardware needed.

use std::convert::Infallible;
use std::time::Instant;

use motor_bench::{
    Clock, CoilDriver, CoilKind, DriveKind, MemoryStorage, MotionController, MotorBench, Move,
    MoveStatus, ServoDriver,
};

/// Monotonic clock backed by `std::time::Instant`.
struct HostClock(Instant);

impl Clock for HostClock {
    fn now_us(&mut self) -> u32 {
        self.0.elapsed().as_micros() as u32
    }
}

/// Coil pin that remembers its level.
struct DemoPin {
    high: bool,
}

impl embedded_hal::digital::ErrorType for DemoPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for DemoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}

/// PWM channel that prints each duty change.
struct DemoPwm;

impl embedded_hal::pwm::ErrorType for DemoPwm {
    type Error = Infallible;
}

impl embedded_hal::pwm::SetDutyCycle for DemoPwm {
    fn max_duty_cycle(&self) -> u16 {
        u16::MAX
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        println!("  pwm duty {duty}/{}", u16::MAX);
        Ok(())
    }

    fn set_duty_cycle_fraction(&mut self, num: u16, denom: u16) -> Result<(), Self::Error> {
        println!("  pwm pulse {num} us / {denom} us");
        Ok(())
    }
}

fn coil_levels(pins: &[DemoPin; 4]) -> String {
    pins.iter().map(|p| if p.high { '1' } else { '0' }).collect()
}

fn main() -> motor_bench::Result<()> {
    println!("=== Bench Session Example ===\n");

    let mut bench = MotorBench::open(MemoryStorage::new());
    println!("Loaded from: {:?}", bench.source());

    bench.set_rpm(120)?;
    bench.set_step_sequence(3)?;
    bench.save()?;
    println!("\n{}", bench.view_config(DriveKind::Darlington));

    if let Err(e) = bench.set_rpm(5_000) {
        println!("Rejected: {e}\n");
    }

    // One revolution, non-blocking
    let pin = || DemoPin { high: false };
    let coils = CoilDriver::new(CoilKind::Darlington, pin(), pin(), pin(), pin(), bench.stepper());
    let clock = HostClock(Instant::now());
    let mut motion = MotionController::new(coils, clock, bench.motor().step_delay());

    let steps = motion.run_move(Move::Revolutions(1), bench.motor())?;
    println!("Running {steps} steps at {} us per step", motion.step_delay());

    let mut polls = 0u32;
    loop {
        polls += 1;
        match motion.poll()? {
            MoveStatus::Complete | MoveStatus::Idle => break,
            _ => {}
        }
    }
    bench.record_phase(motion.output());
    let (coils, _) = motion.into_parts();
    println!(
        "Done after {polls} polls, phase {}, coils {}",
        coils.phase(),
        coil_levels(&coils.into_pins())
    );

    // Servo to both ends of travel
    println!("\nServo:");
    let mut servo = ServoDriver::new(DemoPwm, bench.servo().clone());
    servo.goto_angle(0)?;
    servo.goto_angle(180)?;
    bench.record_servo(&servo);
    println!("\n{}", bench.view_config(DriveKind::Servo));

    bench.save()?;
    println!("Saved.");
    Ok(())
}
