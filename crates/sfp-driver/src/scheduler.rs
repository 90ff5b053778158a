//! 周期任务调度
//!
//! 单线程调度器：每个周期任务记录自己的下一次到期时间，
//! 到期后运行一次，再以当前时间为起点重新排期（无论任务结果如何）。
//!
//! ```text
//! ┌─────────────┐  due   ┌──────────────────────┐
//! │  Scheduler  │ ─────> │ run_autodiscovery()  │  每 discovery_interval
//! │ (next_due)  │ ─────> │ refresh_all()        │  每 diagnostics_interval
//! └─────────────┘        └──────────────────────┘
//! ```

use crate::config::MonitorConfig;
use crate::monitor::SfpMonitor;
use sfp_i2c::I2cTransport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// 单次休眠的最长时间，保证关闭信号能被及时观察到
pub const MAX_SLEEP_SLICE: Duration = Duration::from_millis(200);

/// 周期任务种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledTask {
    /// 扫描总线范围，注册新模块
    Autodiscovery,
    /// 刷新所有已注册模块的诊断数据
    DiagnosticsRefresh,
}

/// 带显式到期时间的周期任务
#[derive(Debug, Clone)]
pub struct PeriodicTask {
    task: ScheduledTask,
    interval: Duration,
    next_due: Instant,
}

impl PeriodicTask {
    /// 创建任务，`first_due` 为首次到期时间
    pub fn new(task: ScheduledTask, interval: Duration, first_due: Instant) -> Self {
        Self {
            task,
            interval,
            next_due: first_due,
        }
    }

    pub fn task(&self) -> ScheduledTask {
        self.task
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_due
    }

    fn reschedule(&mut self, now: Instant) {
        self.next_due = now + self.interval;
    }
}

/// 监控调度器
#[derive(Debug, Clone)]
pub struct Scheduler {
    tasks: Vec<PeriodicTask>,
}

impl Scheduler {
    /// 按配置创建调度器，所有任务在 `now` 立即到期
    ///
    /// 诊断刷新间隔为 0 时不创建刷新任务。
    pub fn new(config: &MonitorConfig, now: Instant) -> Self {
        let mut tasks = vec![PeriodicTask::new(
            ScheduledTask::Autodiscovery,
            config.discovery_interval(),
            now,
        )];
        if let Some(interval) = config.diagnostics_interval() {
            tasks.push(PeriodicTask::new(
                ScheduledTask::DiagnosticsRefresh,
                interval,
                now,
            ));
        }
        Self { tasks }
    }

    pub fn tasks(&self) -> &[PeriodicTask] {
        &self.tasks
    }

    /// 最早的到期时间
    pub fn next_due(&self) -> Option<Instant> {
        self.tasks.iter().map(PeriodicTask::next_due).min()
    }

    /// 运行所有已到期任务，返回本次运行的任务
    pub fn run_pending<T: I2cTransport>(
        &mut self,
        monitor: &mut SfpMonitor<T>,
        now: Instant,
    ) -> Vec<ScheduledTask> {
        let mut ran = Vec::new();

        for task in self.tasks.iter_mut().filter(|t| t.is_due(now)) {
            match task.task {
                ScheduledTask::Autodiscovery => {
                    let found = monitor.run_autodiscovery();
                    trace!("Autodiscovery tick done, {} new module(s)", found);
                },
                ScheduledTask::DiagnosticsRefresh => {
                    monitor.refresh_all();
                },
            }
            task.reschedule(now);
            ran.push(task.task);
        }
        ran
    }

    /// 运行调度循环，直到 `running` 被清除
    pub fn run<T: I2cTransport>(&mut self, monitor: &mut SfpMonitor<T>, running: &AtomicBool) {
        debug!("Scheduler started with {} task(s)", self.tasks.len());

        while running.load(Ordering::Relaxed) {
            self.run_pending(monitor, Instant::now());

            let Some(next_due) = self.next_due() else {
                break;
            };
            let now = Instant::now();
            if next_due > now {
                spin_sleep::sleep((next_due - now).min(MAX_SLEEP_SLICE));
            }
        }

        debug!("Scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfp_i2c::MockI2cTransport;

    fn monitor(config: &MonitorConfig) -> SfpMonitor<MockI2cTransport> {
        SfpMonitor::new(MockI2cTransport::new(), config.clone()).unwrap()
    }

    #[test]
    fn test_tasks_due_immediately() {
        let config = MonitorConfig::default();
        let start = Instant::now();
        let scheduler = Scheduler::new(&config, start);

        assert_eq!(scheduler.tasks().len(), 2);
        assert_eq!(scheduler.next_due(), Some(start));
        assert!(scheduler.tasks().iter().all(|t| t.is_due(start)));
    }

    #[test]
    fn test_refresh_task_disabled() {
        let config = MonitorConfig {
            diagnostics_interval_ms: 0,
            ..Default::default()
        };
        let scheduler = Scheduler::new(&config, Instant::now());
        assert_eq!(scheduler.tasks().len(), 1);
        assert_eq!(scheduler.tasks()[0].task(), ScheduledTask::Autodiscovery);
    }

    #[test]
    fn test_run_pending_reschedules() {
        let config = MonitorConfig {
            discovery_interval_ms: 10_000,
            diagnostics_interval_ms: 100,
            ..Default::default()
        };
        let mut monitor = monitor(&config);
        let start = Instant::now();
        let mut scheduler = Scheduler::new(&config, start);

        let ran = scheduler.run_pending(&mut monitor, start);
        assert_eq!(
            ran,
            vec![ScheduledTask::Autodiscovery, ScheduledTask::DiagnosticsRefresh]
        );
        assert_eq!(scheduler.next_due(), Some(start + Duration::from_millis(100)));

        // 只有刷新任务到期
        let ran = scheduler.run_pending(&mut monitor, start + Duration::from_millis(100));
        assert_eq!(ran, vec![ScheduledTask::DiagnosticsRefresh]);

        // 尚未到期
        let ran = scheduler.run_pending(&mut monitor, start + Duration::from_millis(150));
        assert!(ran.is_empty());

        let ran = scheduler.run_pending(&mut monitor, start + Duration::from_secs(10));
        assert!(ran.contains(&ScheduledTask::Autodiscovery));
        assert_eq!(
            scheduler.tasks()[0].next_due(),
            start + Duration::from_secs(20)
        );
    }

    #[test]
    fn test_run_stops_when_flag_cleared() {
        let config = MonitorConfig::default();
        let mut monitor = monitor(&config);
        let mut scheduler = Scheduler::new(&config, Instant::now());

        let running = AtomicBool::new(false);
        scheduler.run(&mut monitor, &running);
        // 标志已清除，循环不执行任何任务
        assert_eq!(monitor.metrics().snapshot().discovery_attempts, 0);
    }
}
