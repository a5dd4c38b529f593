use std::time::Instant;

#[derive(Debug, Clone)]
pub enum BotState {
    Idle,
    Running {
        pid: Option<u32>,
        target: String,
        since: Instant,
    },
}

impl BotState {
    pub fn pid(&self) -> Option<u32> {
        match self {
            BotState::Running { pid, .. } => *pid,
            BotState::Idle => None,
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            BotState::Running { target, .. } => Some(target),
            BotState::Idle => None,
        }
    }

    pub fn uptime_secs(&self) -> Option<u64> {
        match self {
            BotState::Running { since, .. } => Some(since.elapsed().as_secs()),
            BotState::Idle => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BotState::Idle => "idle",
            BotState::Running { .. } => "running",
        }
    }
}
