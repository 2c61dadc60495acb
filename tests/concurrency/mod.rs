//! Concurrency and scenario tests against the seat invariants

mod invariant_tests;
mod scenario_tests;
