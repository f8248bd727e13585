use std::time::Duration;

/// 建池重试策略：固定次数、固定间隔。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(5, Duration::from_secs(5))
    }
}

impl RetryPolicy {
    /// `max_attempts` 至少为 1。
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// 无间隔重试（测试用）。
    pub fn immediate(max_attempts: u32) -> Self {
        Self::fixed(max_attempts, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 第 `attempt` 次失败后的等待时间；最后一次失败后不再等待。
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        (attempt < self.max_attempts).then_some(self.delay)
    }
}
