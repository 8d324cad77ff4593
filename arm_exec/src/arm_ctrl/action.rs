//! Action model
//!
//! Two kinds of action exist: the symbolic commands of the two-joint arm,
//! which each move the base and elbow by one discrete step and set the
//! auxiliary output, and per-joint delta vectors for arms of any size.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize, Serializer};

// Internal
use super::{ArmState, Delta, JointAngle, DISCRETE_STEP_DEG, NUM_TWO_JOINT_AXES};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Direction of travel of (base, elbow) for each symbolic action, indexed by
/// the action's discriminant with the auxiliary bit shifted out.
///
/// `RightRight` increases the elbow. The original firmware table repeats the
/// `RightLeft` row there, which left the right/right combination unreachable.
const DIRECTION_TABLE: [[Delta; NUM_TWO_JOINT_AXES]; 8] = [
    [0, -1],  // StayLeft
    [0, 1],   // StayRight
    [-1, 0],  // LeftStay
    [-1, -1], // LeftLeft
    [-1, 1],  // LeftRight
    [1, 0],   // RightStay
    [1, -1],  // RightLeft
    [1, 1],   // RightRight
];

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Anything the engine can apply to an arm with `N` joints.
pub trait Action<const N: usize> {
    /// The signed change to make to each joint.
    fn joint_deltas(&self) -> [Delta; N];

    /// The auxiliary output demanded by this action, if it demands one.
    fn aux(&self) -> Option<bool> {
        None
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A per-joint delta vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointAction<const N: usize> {
    pub deltas: [Delta; N],
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Symbolic commands for the two-joint arm.
///
/// Named `{base}{elbow}{aux}`, where `Left` decreases a joint by one discrete
/// step, `Right` increases it, and `Stay` holds it. Holding both joints is
/// not an action. The auxiliary output is the lowest bit of the
/// discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SymbolicAction {
    StayLeftOff = 0,
    StayLeftOn = 1,
    StayRightOff = 2,
    StayRightOn = 3,
    LeftStayOff = 4,
    LeftStayOn = 5,
    LeftLeftOff = 6,
    LeftLeftOn = 7,
    LeftRightOff = 8,
    LeftRightOn = 9,
    RightStayOff = 10,
    RightStayOn = 11,
    RightLeftOff = 12,
    RightLeftOn = 13,
    RightRightOff = 14,
    RightRightOn = 15,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<const N: usize> JointAction<N> {
    pub fn new(deltas: [Delta; N]) -> Self {
        Self { deltas }
    }

    /// The action which moves no joint.
    pub fn zero() -> Self {
        Self { deltas: [0; N] }
    }

    /// True if the action would move no joint.
    pub fn is_zero(&self) -> bool {
        self.deltas.iter().all(|d| *d == 0)
    }

    /// Limit every delta to `[-rate, rate]`.
    pub fn rate_limited(&self, rate: Delta) -> Self {
        let mut deltas = self.deltas;
        for d in deltas.iter_mut() {
            *d = (*d).max(-rate).min(rate);
        }
        Self { deltas }
    }
}

impl<const N: usize> Action<N> for JointAction<N> {
    fn joint_deltas(&self) -> [Delta; N] {
        self.deltas
    }
}

impl<const N: usize> Serialize for JointAction<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.deltas[..].serialize(serializer)
    }
}

impl SymbolicAction {
    /// Every symbolic action, ordered by discriminant.
    pub const ALL: [SymbolicAction; 16] = [
        SymbolicAction::StayLeftOff,
        SymbolicAction::StayLeftOn,
        SymbolicAction::StayRightOff,
        SymbolicAction::StayRightOn,
        SymbolicAction::LeftStayOff,
        SymbolicAction::LeftStayOn,
        SymbolicAction::LeftLeftOff,
        SymbolicAction::LeftLeftOn,
        SymbolicAction::LeftRightOff,
        SymbolicAction::LeftRightOn,
        SymbolicAction::RightStayOff,
        SymbolicAction::RightStayOn,
        SymbolicAction::RightLeftOff,
        SymbolicAction::RightLeftOn,
        SymbolicAction::RightRightOff,
        SymbolicAction::RightRightOn,
    ];

    /// Get the action with the given discriminant, as chosen by a policy
    /// indexing its action values.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// The discriminant of this action.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// The state of the auxiliary output this action demands.
    pub fn aux_on(self) -> bool {
        self.index() & 1 == 1
    }

    /// Change in (base, elbow) this action makes.
    ///
    /// Units: degrees
    pub fn deltas(self) -> [Delta; NUM_TWO_JOINT_AXES] {
        let dir = DIRECTION_TABLE[(self.index() >> 1) as usize];
        [dir[0] * DISCRETE_STEP_DEG, dir[1] * DISCRETE_STEP_DEG]
    }
}

impl Action<NUM_TWO_JOINT_AXES> for SymbolicAction {
    fn joint_deltas(&self) -> [Delta; NUM_TWO_JOINT_AXES] {
        self.deltas()
    }

    fn aux(&self) -> Option<bool> {
        Some(self.aux_on())
    }
}

impl From<SymbolicAction> for JointAction<NUM_TWO_JOINT_AXES> {
    fn from(action: SymbolicAction) -> Self {
        JointAction::new(action.deltas())
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// The action which would move the arm from `from` to `to` in a single step.
///
/// No limit is put on the size of the deltas, callers which need a rate
/// limited action should use [`JointAction::rate_limited`] on the result.
pub fn action_between<A: JointAngle, const N: usize>(
    from: &ArmState<A, N>,
    to: &ArmState<A, N>,
) -> JointAction<N> {
    let mut deltas = [0; N];

    for (i, d) in deltas.iter_mut().enumerate() {
        *d = from.joint_angles[i].delta_to(to.joint_angles[i]);
    }

    JointAction { deltas }
}
