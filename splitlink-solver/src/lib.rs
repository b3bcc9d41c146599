//! Reading timetabling instances for the `splitlink-solver` binary.
pub mod parsers;
