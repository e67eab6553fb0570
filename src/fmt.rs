//! Internal logging macros.
//!
//! Forward to `defmt` when that feature is enabled, to `tracing` under `std`,
//! and expand to nothing otherwise.

#![allow(unused_macros)]

macro_rules! trace {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::trace!($s $(, $x)*);
        #[cfg(all(feature = "std", not(feature = "defmt")))]
        ::tracing::trace!($s $(, $x)*);
        #[cfg(not(any(feature = "std", feature = "defmt")))]
        let _ = ($( & $x ),*);
    }};
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($s $(, $x)*);
        #[cfg(all(feature = "std", not(feature = "defmt")))]
        ::tracing::debug!($s $(, $x)*);
        #[cfg(not(any(feature = "std", feature = "defmt")))]
        let _ = ($( & $x ),*);
    }};
}

macro_rules! warn {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($s $(, $x)*);
        #[cfg(all(feature = "std", not(feature = "defmt")))]
        ::tracing::warn!($s $(, $x)*);
        #[cfg(not(any(feature = "std", feature = "defmt")))]
        let _ = ($( & $x ),*);
    }};
}
