//! Scenario-based tests for the workflow runner

mod default_coordinates;
mod failure_handling;
mod march_meetup;
mod success_chain;
