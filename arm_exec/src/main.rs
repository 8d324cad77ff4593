//! Arm executable entry point.
//!
//! # Architecture
//!
//! The executable drives the arm through exploration episodes:
//!
//!     - Initialise the session, logger and parameters
//!     - Initialise the servos (simulated, or a PCA9685 board on the Pi)
//!     - For each episode:
//!         - Reset the arm (to the middle of its range, or a random position
//!           for the six joint arm)
//!         - Apply random actions, recording each transition
//!         - Archive the transitions to the session
//!     - Park the arm back in the middle of its range
//!
//! The learner itself is not part of this executable, the random actions
//! stand in for its policy.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info};
use rand::rngs::StdRng;
use serde::Serialize;
use std::{io, str::FromStr, time::Instant};
use structopt::StructOpt;

// Internal
use arm_lib::{
    arm_ctrl::{
        Action, ArmCtrl, ArmState, JointAngle, Transition, NUM_SIX_JOINT_AXES,
        NUM_TWO_JOINT_AXES,
    },
    clock::{Clock, SimClock, ThreadClock},
    explore::Explorer,
    params::ArmExecParams,
    sensing::SensationCounter,
    servo_ctrl::JointDriver,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::{self, Session},
    time,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command line options.
#[derive(Debug, StructOpt)]
#[structopt(name = "arm_exec", about = "Drive the arm through random exploration episodes")]
struct Opts {
    /// Arm variant, either `two-joint` or `six-joint`
    #[structopt(long, default_value = "two-joint")]
    variant: Variant,

    /// Number of episodes to run
    #[structopt(long, default_value = "10")]
    episodes: usize,

    /// Number of actions applied in each episode
    #[structopt(long, default_value = "50")]
    steps: usize,

    /// Seed of the exploration random number generator
    #[structopt(long, default_value = "0")]
    seed: u64,

    /// Wait for the servos to settle in real time rather than simulating the
    /// delays
    #[structopt(long)]
    real_time: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    TwoJoint,
    SixJoint,
}

/// Statistics of one episode.
#[derive(Debug, Serialize)]
struct EpisodeSummary<A, const N: usize> {
    episode: usize,
    num_steps: usize,
    num_limited_steps: usize,
    actuator_faults: usize,
    wall_time_ms: u64,
    final_state: ArmState<A, N>,
}

/// Archived record of one episode.
#[derive(Debug, Serialize)]
struct EpisodeRecord<A, const N: usize> {
    summary: EpisodeSummary<A, N>,
    transitions: Vec<Transition<A, N>>,
}

type ExecArm<A, const N: usize> =
    ArmCtrl<A, Box<dyn JointDriver>, SensationCounter, Box<dyn Clock>, N>;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("arm_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger, the per-step output of the servos is only wanted
    // when debugging them
    logger_init(
        LevelFilter::Trace,
        &[
            ("arm_lib::arm_ctrl", LevelFilter::Debug),
            ("arm_lib::servo_ctrl", LevelFilter::Debug),
            ("arm_lib::sensing", LevelFilter::Debug),
        ],
        &session,
    )
    .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Arm Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let params: ArmExecParams = util::params::load(opts.variant.params_file())
        .wrap_err("Could not load arm params")?;

    info!("Exec parameters loaded");

    // Keep a copy of the parameters with the archives they produced
    session::save_with_timestamp("params/arm_exec_params.json", params.clone());

    // ---- INITIALISE MODULES ----

    let driver = init_driver(&params, opts.variant.num_joints())?;

    let clock: Box<dyn Clock> = if opts.real_time {
        Box::new(ThreadClock)
    } else {
        info!("Simulating servo settle times");
        Box::new(SimClock::default())
    };

    let mut explorer = Explorer::from_seed(opts.seed, params.arm.explore_step_limit_deg)
        .wrap_err("Failed to initialise the explorer")?;

    // ---- RUN EPISODES ----

    match opts.variant {
        Variant::TwoJoint => {
            let mut arm: ExecArm<i16, NUM_TWO_JOINT_AXES> = ArmCtrl::new(
                params.arm.clone(),
                driver,
                SensationCounter::default(),
                clock,
            )
            .wrap_err("Failed to initialise ArmCtrl")?;
            info!("ArmCtrl init complete");

            run_episodes(&mut arm, &mut explorer, &opts, &session, false, |e| {
                e.choose_random_symbolic_action()
            })?;
        }
        Variant::SixJoint => {
            let mut arm: ExecArm<u16, NUM_SIX_JOINT_AXES> = ArmCtrl::new(
                params.arm.clone(),
                driver,
                SensationCounter::default(),
                clock,
            )
            .wrap_err("Failed to initialise ArmCtrl")?;
            info!("ArmCtrl init complete");

            run_episodes(&mut arm, &mut explorer, &opts, &session, true, |e| {
                e.choose_random_action::<NUM_SIX_JOINT_AXES>()
            })?;
        }
    }

    info!("End of execution");

    session.exit();

    Ok(())
}

/// Run all episodes on the arm, archiving each one to the session.
fn run_episodes<A, T, F, const N: usize>(
    arm: &mut ExecArm<A, N>,
    explorer: &mut Explorer<StdRng>,
    opts: &Opts,
    session: &Session,
    random_reset: bool,
    mut choose_action: F,
) -> Result<(), Report>
where
    A: JointAngle + Send,
    T: Action<N>,
    F: FnMut(&mut Explorer<StdRng>) -> T,
{
    let stdout = io::stdout();

    arm.reset_arm();

    for episode in 0..opts.episodes {
        info!("Episode {}", episode);

        let reset_report = if random_reset {
            arm.reset_arm_to_random_position(explorer)
        } else {
            arm.reset_arm()
        };

        if reset_report.step_cap_reached {
            return Err(eyre!(
                "Arm did not reach its reset position, ended at {}",
                arm.current_state()
            ));
        }

        let start = Instant::now();
        let mut transitions = Vec::with_capacity(opts.steps);
        let mut num_limited_steps = 0;
        let mut actuator_faults = 0;

        for _ in 0..opts.steps {
            let action = choose_action(explorer);
            let report = arm.apply(&action);

            if report.abs_pos_limited.iter().any(|l| *l) {
                num_limited_steps += 1;
            }
            actuator_faults += report.actuator_faults;

            transitions.push(arm.transition());
        }

        arm.log_arm_state(&mut stdout.lock())
            .wrap_err("Failed to write the arm state")?;

        let summary = EpisodeSummary {
            episode,
            num_steps: transitions.len(),
            num_limited_steps,
            actuator_faults,
            wall_time_ms: time::std_duration_to_millis(start.elapsed()),
            final_state: arm.current_state(),
        };

        debug!("Episode summary: {}", serde_json::to_string(&summary)?);
        info!(
            "Episode {} complete: {} of {} steps limited, {} actuator faults",
            episode, num_limited_steps, opts.steps, actuator_faults
        );

        session.save(
            format!("episodes/episode_{:04}.json", episode),
            EpisodeRecord {
                summary,
                transitions,
            },
        );
    }

    info!("Parking arm");
    arm.reset_arm();

    info!("{} sensation refreshes", arm.sensing().num_refreshes);

    Ok(())
}

/// Simulated servos, used on every target but the Raspberry Pi.
#[cfg(not(target_arch = "arm"))]
fn init_driver(_params: &ArmExecParams, num_joints: usize) -> Result<Box<dyn JointDriver>, Report> {
    info!("Using simulated servos for {} joints", num_joints);

    Ok(Box::new(arm_lib::servo_ctrl::sim::SimServos::new(num_joints)))
}

/// PCA9685 servo board on the Raspberry Pi's I2C bus.
#[cfg(target_arch = "arm")]
fn init_driver(params: &ArmExecParams, num_joints: usize) -> Result<Box<dyn JointDriver>, Report> {
    use arm_lib::servo_ctrl::{pca9685, PwmServos};
    use pwm_pca9685::Pca9685;
    use rppal::i2c::I2c;

    if params.servos.joints.len() != num_joints {
        return Err(eyre!(
            "Expected {} servos in the parameters, found {}",
            num_joints,
            params.servos.joints.len()
        ));
    }

    let i2c = I2c::with_bus(params.board.i2c_bus)
        .wrap_err_with(|| format!("Could not open I2C bus {}", params.board.i2c_bus))?;

    let mut board = Pca9685::new(i2c, params.board.address)
        .map_err(|e| eyre!("Invalid PCA9685 address {}: {:?}", params.board.address, e))?;

    pca9685::init_board(&mut board, params.board.prescale)
        .wrap_err("Failed to initialise the PCA9685")?;

    info!("PCA9685 initialised");

    Ok(Box::new(PwmServos::new(board, params.servos.clone())))
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Variant {
    fn params_file(self) -> &'static str {
        match self {
            Variant::TwoJoint => "two_joint.toml",
            Variant::SixJoint => "six_joint.toml",
        }
    }

    fn num_joints(self) -> usize {
        match self {
            Variant::TwoJoint => NUM_TWO_JOINT_AXES,
            Variant::SixJoint => NUM_SIX_JOINT_AXES,
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "two-joint" => Ok(Variant::TwoJoint),
            "six-joint" => Ok(Variant::SixJoint),
            _ => Err(format!(
                "Unknown arm variant \"{}\", expected two-joint or six-joint",
                s
            )),
        }
    }
}
