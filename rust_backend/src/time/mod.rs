pub mod window;

pub use window::{
    day_before, graph_x, hours_between, resolve_window, traffic_day_start, Clock, DayWindow,
    FixedClock, SystemClock,
};
