//! Colony Sim - turn-based colony management simulation engine

pub mod city;
pub mod core;
pub mod save;
pub mod simulation;
