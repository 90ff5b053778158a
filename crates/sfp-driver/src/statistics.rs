//! 滚动统计模块
//!
//! 每个测量量维护一个固定容量的环形窗口，增量维护和与均值；
//! 最小/最大值只在被淘汰的样本恰好是当前极值时才重新扫描窗口。
//! 方差按需计算。

use serde::Serialize;
use sfp_protocol::Measurements;

/// 单个测量量的环形统计窗口
///
/// 不变量：
/// - `samples <= capacity`
/// - `sum` 为窗口内 `samples` 个样本之和
/// - `minimum` / `maximum` 为窗口内样本的极值（空窗口时分别为 +inf / -inf）
/// - `index` 为下一个被覆盖的槽位
#[derive(Debug, Clone)]
pub struct RollingWindow {
    buffer: Vec<f64>,
    samples: usize,
    index: usize,
    sum: f64,
    average: f64,
    minimum: f64,
    maximum: f64,
}

impl RollingWindow {
    /// 创建窗口（容量至少为 1）
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            samples: 0,
            index: 0,
            sum: 0.0,
            average: 0.0,
            minimum: f64::INFINITY,
            maximum: f64::NEG_INFINITY,
        }
    }

    /// 压入一个新样本
    pub fn push(&mut self, value: f64) {
        let capacity = self.buffer.len();
        let evicted = (self.samples == capacity).then(|| self.buffer[self.index]);

        if let Some(old) = evicted {
            self.sum -= old;
        }
        self.buffer[self.index] = value;
        self.sum += value;

        if self.samples < capacity {
            self.samples += 1;
        }
        self.index = (self.index + 1) % capacity;

        match evicted {
            // 淘汰的正是当前极值，窗口不记录次优值，只能重扫
            Some(old) if old <= self.minimum || old >= self.maximum => self.rescan(),
            _ => {
                self.minimum = self.minimum.min(value);
                self.maximum = self.maximum.max(value);
            },
        }

        self.average = self.sum / self.samples as f64;
    }

    /// 重新扫描窗口，同时消除累加和的浮点漂移
    fn rescan(&mut self) {
        let (sum, minimum, maximum) = self.values().iter().fold(
            (0.0, f64::INFINITY, f64::NEG_INFINITY),
            |(sum, min, max), &v| (sum + v, min.min(v), max.max(v)),
        );
        self.sum = sum;
        self.minimum = minimum;
        self.maximum = maximum;
    }

    /// 窗口内的样本（不保证时间顺序）
    pub fn values(&self) -> &[f64] {
        &self.buffer[..self.samples]
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    /// 总体方差（空窗口为 0）
    pub fn variance(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        let average = self.average;
        self.values()
            .iter()
            .map(|&v| (v - average) * (v - average))
            .sum::<f64>()
            / self.samples as f64
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            average: self.average,
            count: self.samples,
            variance: self.variance(),
            minimum: self.minimum,
            maximum: self.maximum,
        }
    }
}

/// 统计窗口快照
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowSnapshot {
    pub average: f64,
    pub count: usize,
    pub variance: f64,
    pub minimum: f64,
    pub maximum: f64,
}

/// 一个模块五个测量量的统计窗口
#[derive(Debug, Clone)]
pub struct ModuleStatistics {
    pub temperature: RollingWindow,
    pub vcc: RollingWindow,
    pub tx_bias: RollingWindow,
    pub tx_power: RollingWindow,
    pub rx_power: RollingWindow,
}

impl ModuleStatistics {
    pub fn new(capacity: usize) -> Self {
        Self {
            temperature: RollingWindow::new(capacity),
            vcc: RollingWindow::new(capacity),
            tx_bias: RollingWindow::new(capacity),
            tx_power: RollingWindow::new(capacity),
            rx_power: RollingWindow::new(capacity),
        }
    }

    /// 压入一组实时测量值
    pub fn push(&mut self, value: &Measurements) {
        self.temperature.push(value.temperature);
        self.vcc.push(value.vcc);
        self.tx_bias.push(value.tx_bias);
        self.tx_power.push(value.tx_power);
        self.rx_power.push(value.rx_power);
    }
}
