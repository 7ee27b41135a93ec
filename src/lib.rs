//! stochcheck - statistical property checking for randomized programs
//!
//! A specification states what the outcomes of many independent runs of a
//! program should look like ("the probability over runs that Output is an
//! event equals 0.5"). This library runs the program-under-test many times
//! on a bounded worker pool, tabulates the outcomes into contingency tables
//! and accepts or rejects each clause with a chi-squared (power-divergence)
//! test at a configurable significance level.

pub mod cli;
pub mod config;
pub mod decision;
pub mod programs;
pub mod spec;
pub mod trial;
pub mod verify;
