// Copyright (c) 2025 - Cowboy AI, Inc.
//! Query Store Lifecycle
//!
//! # States
//!
//! - Uninitialized: constructed, backend not yet bound
//! - Ready: backend bound, baseline persisted
//! - Wiped: backend destroyed; only `Initialize` leaves this state
//!
//! # Inputs
//!
//! - Initialize: Any → Ready
//! - Wipe: Any → Wiped
//! - Clear, Load, Mutate: Ready → Ready

use std::fmt;

use crate::state_machine::{StateMachine, TransitionError, TransitionResult};

/// Lifecycle state of a query store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreLifecycle {
    /// Not yet initialized
    #[default]
    Uninitialized,
    /// Usable
    Ready,
    /// Durable state destroyed
    Wiped,
}

/// Lifecycle command (FSM input)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCommand {
    /// Bind the backend and persist the baseline
    Initialize,
    /// Destroy the backend
    Wipe,
    /// Empty persisted data
    Clear,
    /// Read the persisted snapshot
    Load,
    /// Create, update or delete a resource
    Mutate,
}

impl StoreLifecycle {
    /// True once `Initialize` has succeeded and no `Wipe` followed
    pub fn is_ready(&self) -> bool {
        matches!(self, StoreLifecycle::Ready)
    }
}

impl fmt::Display for StoreLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreLifecycle::Uninitialized => "uninitialized",
            StoreLifecycle::Ready => "ready",
            StoreLifecycle::Wiped => "wiped",
        };
        write!(f, "{}", name)
    }
}

impl StateMachine for StoreLifecycle {
    type Input = LifecycleCommand;
    type Output = ();

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        use LifecycleCommand::*;
        use StoreLifecycle::*;

        match (self, input) {
            (_, Initialize) => Ok((Ready, ())),
            (_, Wipe) => Ok((Wiped, ())),
            (Ready, Clear | Load | Mutate) => Ok((Ready, ())),
            (state, command) => Err(TransitionError::PreconditionFailed(format!(
                "{:?} requires an initialized store, store is {}",
                command, state
            ))),
        }
    }

    fn valid_inputs(&self) -> Vec<Self::Input> {
        use LifecycleCommand::*;

        match self {
            StoreLifecycle::Ready => vec![Initialize, Wipe, Clear, Load, Mutate],
            StoreLifecycle::Uninitialized | StoreLifecycle::Wiped => vec![Initialize, Wipe],
        }
    }
}
