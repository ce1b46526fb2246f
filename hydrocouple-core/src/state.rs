//! Rolling multi-timestep state of a component.
//!
//! Numerical solvers often need the value of a state at previous timesteps. A
//! [`RollingState`] keeps a fixed number of snapshots addressed relative to the current
//! step: index `0` is the value being computed for the current step, `-1` the value of
//! the previous step, and so on back to `-(len - 1)`.
//!
//! ```rust
//! use hydrocouple_core::state::RollingState;
//! use ndarray::{arr1, ArrayD};
//!
//! let mut state = RollingState::new(vec![
//!     arr1(&[1.0]).into_dyn(),
//!     arr1(&[2.0]).into_dyn(),
//! ])
//! .unwrap();
//! assert_eq!(state[0][[0]], 2.0);
//! assert_eq!(state[-1][[0]], 1.0);
//!
//! state.advance();
//! assert_eq!(state[-1][[0]], 2.0);
//! assert_eq!(state[0][[0]], 0.0);
//! ```

use crate::errors::{CouplingError, CouplingResult};
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::{Index, IndexMut};

/// Rolling states of one component, keyed by state name.
pub type States = HashMap<String, RollingState>;

/// A fixed-length ring of state snapshots.
///
/// Advancing moves the head pointer onto the oldest slot and zeroes it in place, so no
/// array is allocated while stepping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RollingStateRepr")]
pub struct RollingState {
    slots: Vec<ArrayD<f64>>,
    /// Physical slot holding index 0.
    head: usize,
}

#[derive(Deserialize)]
struct RollingStateRepr {
    slots: Vec<ArrayD<f64>>,
    head: usize,
}

impl TryFrom<RollingStateRepr> for RollingState {
    type Error = CouplingError;

    fn try_from(repr: RollingStateRepr) -> CouplingResult<Self> {
        let mut state = Self::new(repr.slots)?;
        if repr.head >= state.len() {
            return Err(CouplingError::InvalidState(format!(
                "head {} is outside of a rolling state of length {}",
                repr.head,
                state.len()
            )));
        }
        state.head = repr.head;
        Ok(state)
    }
}

impl RollingState {
    /// Create a state from its history, oldest snapshot first and current snapshot last.
    pub fn new(history: Vec<ArrayD<f64>>) -> CouplingResult<Self> {
        let Some(first) = history.first() else {
            return Err(CouplingError::InvalidState(
                "a rolling state needs at least one snapshot".into(),
            ));
        };
        if history.iter().any(|s| s.shape() != first.shape()) {
            return Err(CouplingError::InvalidState(
                "all snapshots of a rolling state must share one shape".into(),
            ));
        }
        let head = history.len() - 1;
        Ok(Self {
            slots: history,
            head,
        })
    }

    /// Number of snapshots kept, the solver history of the owning component.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn shape(&self) -> &[usize] {
        self.slots[self.head].shape()
    }

    fn slot(&self, index: isize) -> Option<usize> {
        let n = self.slots.len() as isize;
        if index > 0 || index <= -n {
            return None;
        }
        Some((self.head as isize + index).rem_euclid(n) as usize)
    }

    pub fn get(&self, index: isize) -> Option<&ArrayD<f64>> {
        self.slot(index).map(|slot| &self.slots[slot])
    }

    pub fn get_mut(&mut self, index: isize) -> Option<&mut ArrayD<f64>> {
        self.slot(index).map(|slot| &mut self.slots[slot])
    }

    /// The snapshot being computed for the current step.
    pub fn current(&self) -> &ArrayD<f64> {
        &self.slots[self.head]
    }

    pub fn current_mut(&mut self) -> &mut ArrayD<f64> {
        &mut self.slots[self.head]
    }

    /// Shift every snapshot one step into the past and clear the new current snapshot.
    ///
    /// The oldest snapshot is discarded. With a single snapshot this only clears it.
    pub fn advance(&mut self) {
        self.head = (self.head + 1) % self.slots.len();
        self.slots[self.head].fill(0.0);
    }

    /// Snapshots from oldest to current.
    pub fn iter(&self) -> impl Iterator<Item = &ArrayD<f64>> {
        let n = self.slots.len();
        (1..=n).map(move |k| &self.slots[(self.head + k) % n])
    }
}

impl Index<isize> for RollingState {
    type Output = ArrayD<f64>;

    fn index(&self, index: isize) -> &Self::Output {
        match self.get(index) {
            Some(snapshot) => snapshot,
            None => panic!(
                "index {index} is outside of a rolling state of length {}",
                self.len()
            ),
        }
    }
}

impl IndexMut<isize> for RollingState {
    fn index_mut(&mut self, index: isize) -> &mut Self::Output {
        let len = self.len();
        match self.get_mut(index) {
            Some(snapshot) => snapshot,
            None => panic!("index {index} is outside of a rolling state of length {len}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array1};

    fn state(values: &[f64]) -> RollingState {
        RollingState::new(
            values
                .iter()
                .map(|v| Array1::from_elem(3, *v).into_dyn())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_addressing() {
        let state = state(&[1.0, 2.0, 3.0]);
        assert_eq!(state.len(), 3);
        assert_eq!(state[0][[0]], 3.0);
        assert_eq!(state[-1][[0]], 2.0);
        assert_eq!(state[-2][[0]], 1.0);
        assert!(state.get(-3).is_none());
        assert!(state.get(1).is_none());
    }

    #[test]
    fn test_advance_shifts_into_the_past() {
        let mut state = state(&[1.0, 2.0, 3.0]);
        state[0].fill(4.0);
        state.advance();

        assert_eq!(state.len(), 3);
        assert_eq!(state[-1][[0]], 4.0);
        assert_eq!(state[-2][[0]], 2.0);
        assert!(state[0].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_advancing_full_length_clears_everything() {
        let mut state = state(&[1.0, 2.0, 3.0]);
        for _ in 0..state.len() {
            state.advance();
        }
        for k in 0..3 {
            assert!(state[-k].iter().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn test_single_snapshot() {
        let mut state = state(&[5.0]);
        state.advance();
        assert_eq!(state.len(), 1);
        assert!(state[0].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_iter_oldest_first() {
        let mut state = state(&[1.0, 2.0]);
        state[0].fill(7.0);
        state.advance();
        let firsts: Vec<f64> = state.iter().map(|s| s[[0]]).collect();
        assert_eq!(firsts, vec![7.0, 0.0]);
    }

    #[test]
    fn test_in_place_update() {
        let mut state = state(&[1.0, 2.0]);
        let previous = state[-1].clone();
        *state.current_mut() += &previous;
        assert_eq!(state.current()[[1]], 3.0);
    }

    #[test]
    fn test_deserialised_state_is_checked() {
        let mut state = state(&[1.0, 2.0]);
        state.advance();
        let mut value = serde_json::to_value(&state).unwrap();
        let restored: RollingState = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(restored[-1][[0]], 2.0);

        value["head"] = serde_json::json!(2);
        assert!(serde_json::from_value::<RollingState>(value).is_err());
    }

    #[test]
    fn test_invalid_history() {
        assert!(matches!(
            RollingState::new(vec![]),
            Err(CouplingError::InvalidState(_))
        ));
        assert!(RollingState::new(vec![
            arr1(&[1.0]).into_dyn(),
            arr1(&[1.0, 2.0]).into_dyn()
        ])
        .is_err());
    }
}
