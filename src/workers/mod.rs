pub mod bus_monitor;

pub use bus_monitor::run_bus_monitor;
