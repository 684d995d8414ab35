/// \[eV\] per \[keV\]
pub const EV_PER_KEV: f64 = 1000.0;

/// \[µs\] per \[s\]
pub const MICROSECONDS_PER_SECOND: f64 = 1e6;

/// \[ns\] per \[µs\]
pub const NANOSECONDS_PER_MICROSECOND: f64 = 1e3;

/// Converts electron-volts to kilo-electron-volts.
#[must_use]
pub fn ev_to_kev(ev: f64) -> f64 {
    ev / EV_PER_KEV
}

/// Converts kilo-electron-volts to electron-volts.
#[must_use]
pub fn kev_to_ev(kev: f64) -> f64 {
    kev * EV_PER_KEV
}
