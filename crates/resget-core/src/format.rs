//! Human-friendly durations, sizes and rates for console output.

use std::time::Duration;

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

fn unit(n: u64, name: &str) -> String {
    if n == 1 {
        format!("{n} {name}")
    } else {
        format!("{n} {name}s")
    }
}

/// `"N minute(s)[ M second(s)][ P millisecond(s)]"`; minutes are always shown.
pub fn friendly_time(d: Duration) -> String {
    let total_secs = d.as_secs();
    let mut out = unit(total_secs / 60, "minute");
    let secs = total_secs % 60;
    if secs > 0 {
        out.push(' ');
        out.push_str(&unit(secs, "second"));
    }
    let millis = u64::from(d.subsec_millis());
    if millis > 0 {
        out.push(' ');
        out.push_str(&unit(millis, "millisecond"));
    }
    out
}

/// `"x.xx MiB/s"` from 1 MiB/s upwards, `"x.xx KiB/s"` below.
pub fn friendly_bandwidth(bytes_per_sec: f64) -> String {
    if bytes_per_sec >= MIB {
        format!("{:.2} MiB/s", bytes_per_sec / MIB)
    } else {
        format!("{:.2} KiB/s", bytes_per_sec / KIB)
    }
}

pub fn friendly_bytes(n: u64) -> String {
    let f = n as f64;
    if f < KIB {
        format!("{n} bytes")
    } else if f < MIB {
        format!("{:.2} KB", f / KIB)
    } else if f < GIB {
        format!("{:.2} MB", f / MIB)
    } else {
        format!("{:.2} GB", f / GIB)
    }
}
