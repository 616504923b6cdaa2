//! Observable screen state: snapshot boxes, cancellable periodic tasks,
//! lifecycle event logs, and the three screen controllers built on them.

pub mod clock;
pub mod counter;
pub mod event_log;
pub mod life_tracker;
pub mod lifecycle;
pub mod periodic;
pub mod readings;
pub mod sensor;
pub mod state_box;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use counter::CounterController;
pub use event_log::EventLog;
pub use life_tracker::{LifeTrackerController, NoticeReceiver};
pub use lifecycle::{LifecycleHost, LifecycleObserver, LifecycleRegistry, ObserverId, Registration};
pub use periodic::{PeriodicTask, RestartPolicy, StartOutcome};
pub use readings::{ReadingSource, ScriptedReadings, UniformReadings};
pub use sensor::{SensorController, SensorOptions};
pub use state_box::{StateBox, Subscription};
pub use types::{CounterSnapshot, LifeSnapshot, SensorSnapshot, TransientNotice};
