pub mod cluster;
pub mod config;
pub mod error;
pub mod telemetry;
mod utils;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;
