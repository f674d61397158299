//! Best-effort role-to-thread binding.
//!
//! The orchestrator role and the queue's single side must each be driven by
//! one thread for the queue's lifetime, and that thread must not migrate
//! between memory-visibility domains. Migration cannot be observed from
//! here; role sharing between threads can. The first call from a role binds
//! it to the calling thread and later calls from any other thread panic.

use crate::QueueError;
use std::sync::OnceLock;
use std::thread::{self, ThreadId};

/// Names a single-writer role for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    /// Caller of reset and (de)registration.
    Orchestrator,
    /// Lone SCMP consumer.
    Consumer,
    /// Lone MCSP producer.
    Producer,
}

impl Role {
    fn name(self) -> &'static str {
        match self {
            Role::Orchestrator => "orchestrator",
            Role::Consumer => "single consumer",
            Role::Producer => "single producer",
        }
    }
}

/// Thread binding for one role.
#[derive(Debug)]
pub(crate) struct RoleAffinity {
    role: Role,
    enabled: bool,
    owner: OnceLock<ThreadId>,
}

impl RoleAffinity {
    pub(crate) fn new(role: Role, enabled: bool) -> Self {
        Self {
            role,
            enabled,
            owner: OnceLock::new(),
        }
    }

    /// Binds on first use, then verifies the caller is the bound thread.
    #[inline]
    pub(crate) fn check(&self) -> Result<(), QueueError> {
        if !self.enabled {
            return Ok(());
        }
        let current = thread::current().id();
        if *self.owner.get_or_init(|| current) == current {
            Ok(())
        } else {
            Err(QueueError::RoleViolation {
                role: self.role.name(),
            })
        }
    }

    /// Panicking form of [`check`](Self::check).
    #[inline]
    pub(crate) fn assert(&self) {
        if let Err(err) = self.check() {
            panic!("{err}");
        }
    }

    /// Forgets the bound thread. Requires exclusive access.
    pub(crate) fn clear(&mut self) {
        self.owner = OnceLock::new();
    }
}
