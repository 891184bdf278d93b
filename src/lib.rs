//! Tolstack: one-dimensional tolerance stackup analysis
//!
//! A dimension chain is evaluated three ways: worst-case interval arithmetic,
//! root-sum-square statistics and Monte Carlo simulation. Results include a
//! histogram, per-dimension variance contributions and capability indices.

pub mod cli;
pub mod core;
pub mod entities;
