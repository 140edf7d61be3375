//! Schedule module - turns a delivery frequency into a concrete fire time.

mod schedule_calculator;

pub use schedule_calculator::{
    compute_next_fire, compute_next_fire_lenient, delivery_interval, ScheduleCalculator,
};
