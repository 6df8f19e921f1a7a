//! Logging shims: `tracing` with `std`, `defmt` on bare metal, otherwise nothing.
//!
//! Messages must stick to format syntax that both backends accept (`{}`,
//! `{:?}`, `{:#x}`).

#![allow(unused_macros)]

macro_rules! debug {
    ($($arg:tt)+) => {{
        #[cfg(feature = "std")]
        ::tracing::debug!($($arg)+);
        #[cfg(all(feature = "defmt", not(feature = "std")))]
        ::defmt::debug!($($arg)+);
        #[cfg(not(any(feature = "std", feature = "defmt")))]
        {
            let _ = ::core::format_args!($($arg)+);
        }
    }};
}

macro_rules! info {
    ($($arg:tt)+) => {{
        #[cfg(feature = "std")]
        ::tracing::info!($($arg)+);
        #[cfg(all(feature = "defmt", not(feature = "std")))]
        ::defmt::info!($($arg)+);
        #[cfg(not(any(feature = "std", feature = "defmt")))]
        {
            let _ = ::core::format_args!($($arg)+);
        }
    }};
}

macro_rules! warn {
    ($($arg:tt)+) => {{
        #[cfg(feature = "std")]
        ::tracing::warn!($($arg)+);
        #[cfg(all(feature = "defmt", not(feature = "std")))]
        ::defmt::warn!($($arg)+);
        #[cfg(not(any(feature = "std", feature = "defmt")))]
        {
            let _ = ::core::format_args!($($arg)+);
        }
    }};
}

macro_rules! error {
    ($($arg:tt)+) => {{
        #[cfg(feature = "std")]
        ::tracing::error!($($arg)+);
        #[cfg(all(feature = "defmt", not(feature = "std")))]
        ::defmt::error!($($arg)+);
        #[cfg(not(any(feature = "std", feature = "defmt")))]
        {
            let _ = ::core::format_args!($($arg)+);
        }
    }};
}
