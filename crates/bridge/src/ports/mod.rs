//! Port traits - boundaries between the bridge and its collaborators

pub mod outbound;
