//! Periodic temperature sampling with bounded-history compaction.
//!
//! One task owns the loop: every period it takes a sample and appends it
//! to the RAM list. When the RAM list is full it first folds the list
//! into the persisted record — exactly if everything fits, decimated
//! otherwise — then starts filling the RAM list again. Shared state is
//! split from the task so status readers can take snapshots while the
//! loop runs.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Timer;
use log::{debug, error};
use thiserror_no_std::Error;

use crate::config::{LOG_CAPACITY, SAMPLING_PERIOD};
use crate::lock::lock_ordered;
use crate::sensors::{SensorError, TemperatureSensor};
use crate::storage::{
    load_history, store_history, BufferFull, CompactionEngine, CompactionError, KvStore, LogStats,
    Sample, StoreError, Temperature, TemperatureLog,
};
use crate::time::UptimeClock;

/// Any failure of one sampling cycle. Cycles are independent, so every
/// variant is non-fatal: the loop logs it and waits for the next tick.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerError {
    #[error("sensor failure: {0}")]
    Sensor(#[from] SensorError),
    #[error("persistent store failure: {0}")]
    Store(#[from] StoreError),
    #[error("compaction failure: {0}")]
    Compaction(#[from] CompactionError),
    #[error("history buffer is full")]
    Buffer(#[from] BufferFull),
}

type SharedLog = Mutex<CriticalSectionRawMutex, TemperatureLog>;

/// The shared, lock-protected sampling state: the RAM list, the scratch
/// list used to stage compaction, and the persistent store handle.
///
/// Only the periodic task mutates these; anything else may take short
/// locks to copy snapshots out. A single instance is constructed at
/// startup and owned by the application root.
pub struct SampleHistory<K> {
    ram: SharedLog,
    scratch: SharedLog,
    store: Mutex<CriticalSectionRawMutex, K>,
}

impl<K: KvStore> SampleHistory<K> {
    pub const fn new(store: K) -> Self {
        Self {
            ram: Mutex::new(TemperatureLog::new()),
            scratch: Mutex::new(TemperatureLog::new()),
            store: Mutex::new(store),
        }
    }

    /// Loads the persisted history into the RAM list. On first boot the
    /// record does not exist yet; it is created empty so later reads
    /// never see a missing key.
    pub async fn init(&self) -> Result<(), StoreError> {
        let mut ram = self.ram.lock().await;
        let mut store = self.store.lock().await;
        load_history(&mut *store, &mut ram)
    }

    /// Appends a sample to the RAM list.
    pub async fn append(&self, sample: Sample) -> Result<(), BufferFull> {
        self.ram.lock().await.append(sample)
    }

    pub async fn is_full(&self) -> bool {
        self.ram.lock().await.is_full()
    }

    /// Copy of the RAM list for display or reporting.
    pub async fn snapshot(&self) -> TemperatureLog {
        self.ram.lock().await.clone()
    }

    /// Summary of the RAM list.
    pub async fn stats(&self) -> Option<LogStats> {
        self.ram.lock().await.stats()
    }

    /// Folds the RAM list into the persisted record and resets the RAM
    /// list. Locks everything it touches — the two lists in address
    /// order, then the store — so it is safe to call from any task, not
    /// just the periodic one.
    ///
    /// On failure the RAM list is left untouched; a still-full list
    /// simply triggers another attempt on the next cycle.
    pub async fn compact(&self, engine: &mut CompactionEngine<LOG_CAPACITY>) -> Result<(), LoggerError> {
        let [mut ram, mut scratch] = lock_ordered([&self.ram, &self.scratch]).await;
        let mut store = self.store.lock().await;

        load_history(&mut *store, &mut scratch)?;
        engine.compact_in_place(&ram, &mut scratch)?;
        store_history(&mut *store, &scratch)?;
        ram.reset();
        Ok(())
    }
}

/// The periodic sampling task. Owns the sensor, the clock, and the
/// compaction engine; borrows the shared history.
pub struct SamplingCycle<'a, S, C, K> {
    history: &'a SampleHistory<K>,
    sensor: S,
    clock: C,
    engine: CompactionEngine<LOG_CAPACITY>,
}

impl<'a, S, C, K> SamplingCycle<'a, S, C, K>
where
    S: TemperatureSensor,
    C: UptimeClock,
    K: KvStore,
{
    /// Fails when the sensor did not come up. That is the only fatal
    /// condition of the subsystem; it is surfaced here instead of
    /// retried.
    pub fn init(history: &'a SampleHistory<K>, sensor: S, clock: C) -> Result<Self, SensorError> {
        if !sensor.is_ready() {
            error!("temperature sensor is not ready");
            return Err(SensorError::NotReady);
        }

        Ok(Self {
            history,
            sensor,
            clock,
            engine: CompactionEngine::new(),
        })
    }

    async fn acquire_sample(&mut self) -> Result<Sample, SensorError> {
        let reading = self.sensor.read().await?;
        let uptime = self.clock.uptime_minutes();
        Ok(Sample::new(
            Temperature::from_parts(reading.whole, reading.micros),
            uptime,
        ))
    }

    /// One sampling pass: compact when the RAM list is at capacity, then
    /// take a fresh sample and append it.
    pub async fn run_cycle(&mut self) -> Result<(), LoggerError> {
        debug!("performing sampling cycle");

        if self.history.is_full().await {
            self.history.compact(&mut self.engine).await?;
        }

        let sample = self.acquire_sample().await?;
        self.history.append(sample).await?;
        Ok(())
    }

    /// Drives the cycle forever. A failed cycle is logged and skipped —
    /// never retried early, never fatal — and the next tick always comes
    /// one sampling period later.
    pub async fn run(&mut self) -> ! {
        loop {
            if let Err(err) = self.run_cycle().await {
                error!("failed to complete sampling cycle: {}", err);
            }
            Timer::after(SAMPLING_PERIOD).await;
        }
    }
}
