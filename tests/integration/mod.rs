//! Integration tests driving the devorch commands over temporary workspaces.

mod helpers;

mod phase_context;
mod plan_lifecycle;
mod state_flow;
mod verify_build;
